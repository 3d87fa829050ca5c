//! Collaborator backed by `ldapsearch`, `ldapmodify` and `ldapadd`
//!
//! Searches run `ldapsearch` with base scope and hand its LDIF output to the
//! core parser. Applies stage the compiled document in a temporary file and
//! feed it to `ldapmodify` or `ldapadd`.

use std::io::Write;
use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use ldapdn_core::directive::DirectiveDocument;
use ldapdn_core::error::{LdapDnError, LdapDnResult};
use ldapdn_core::traits::{DirectoryApply, DirectorySearch, SearchResponse};
use ldapdn_core::types::ApplyKind;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use crate::config::OpenLdapConfig;

/// Result code LDAP servers use for a missing base object.
pub const NO_SUCH_OBJECT_CODE: i32 = 32;

const NO_SUCH_OBJECT_TEXT: &str = "No such object (32)";

/// Search and apply through the OpenLDAP command-line tools.
#[derive(Debug, Clone, Default)]
pub struct OpenLdapTools {
    config: OpenLdapConfig,
}

impl OpenLdapTools {
    pub fn new(config: OpenLdapConfig) -> Self {
        Self { config }
    }

    /// Build from `LDAPDN_*` environment variables.
    pub fn from_env() -> LdapDnResult<Self> {
        Ok(Self::new(OpenLdapConfig::from_env()?))
    }

    pub fn config(&self) -> &OpenLdapConfig {
        &self.config
    }

    /// Path of the tool that carries out `kind`.
    pub fn apply_tool(&self, kind: ApplyKind) -> &Path {
        match kind {
            ApplyKind::Create => &self.config.ldapadd,
            ApplyKind::Modify => &self.config.ldapmodify,
        }
    }

    async fn run(&self, program: &Path, args: &[String]) -> std::io::Result<Output> {
        let mut command = Command::new(program);
        command.args(args).kill_on_drop(true);

        match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("{} did not finish within {:?}", program.display(), limit),
                    )
                })?,
            None => command.output().await,
        }
    }
}

/// Arguments for a base-scope search of `dn`.
pub fn search_args(uri: &str, dn: &str, auth_options: &[String]) -> Vec<String> {
    let mut args: Vec<String> = ["-H", uri, "-b", dn, "-s", "base", "-LLL", "-d", "0"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.extend(auth_options.iter().cloned());
    args
}

/// Arguments for applying the LDIF file at `file`.
pub fn apply_args(uri: &str, file: &Path, auth_options: &[String]) -> Vec<String> {
    let mut args = vec![
        "-H".to_string(),
        uri.to_string(),
        "-d".to_string(),
        "0".to_string(),
        "-f".to_string(),
        file.display().to_string(),
    ];
    args.extend(auth_options.iter().cloned());
    args
}

/// Classify a failed search run.
///
/// A missing base object is an ordinary answer; anything else means the
/// directory could not be read.
pub fn classify_search_failure(code: Option<i32>, output: &str) -> LdapDnResult<SearchResponse> {
    if code == Some(NO_SUCH_OBJECT_CODE) || output.contains(NO_SUCH_OBJECT_TEXT) {
        return Ok(SearchResponse::NoSuchObject);
    }

    let status = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
    let message = output.trim();
    Err(LdapDnError::unavailable(if message.is_empty() {
        format!("ldapsearch exited with status {status}")
    } else {
        format!("ldapsearch exited with status {status}: {message}")
    }))
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stderr).into_owned();
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stdout);
    }
    text
}

#[async_trait]
impl DirectorySearch for OpenLdapTools {
    #[instrument(skip(self, auth_options), fields(uri = %self.config.uri))]
    async fn search(&self, dn: &str, auth_options: &[String]) -> LdapDnResult<SearchResponse> {
        let args = search_args(&self.config.uri, dn, auth_options);
        debug!(program = %self.config.ldapsearch.display(), "Running ldapsearch");

        let output = self
            .run(&self.config.ldapsearch, &args)
            .await
            .map_err(|e| {
                LdapDnError::unavailable_with_source(
                    format!("failed to run {}", self.config.ldapsearch.display()),
                    e,
                )
            })?;

        if output.status.success() {
            let text = String::from_utf8_lossy(&output.stdout).into_owned();
            debug!(bytes = text.len(), "ldapsearch returned entry");
            return Ok(SearchResponse::Entry(text));
        }

        let response = classify_search_failure(output.status.code(), &combined_output(&output));
        match &response {
            Ok(_) => debug!("Could not find object"),
            Err(e) => warn!(error = %e, "ldapsearch failed"),
        }
        response
    }
}

#[async_trait]
impl DirectoryApply for OpenLdapTools {
    #[instrument(skip(self, document, auth_options), fields(dn = %document.dn(), kind = %document.kind()))]
    async fn apply(&self, document: &DirectiveDocument, auth_options: &[String]) -> LdapDnResult<()> {
        let kind = document.kind();
        let ldif = document.to_ldif();
        let failed = |details: String| LdapDnError::apply_failed(kind, document.dn(), &ldif, details);

        // The file is removed when `staged` drops, after the tool has exited.
        let mut staged = tempfile::Builder::new()
            .prefix("ldapdn-")
            .suffix(".ldif")
            .tempfile()
            .map_err(|e| failed(format!("failed to stage document: {e}")))?;
        staged
            .write_all(ldif.as_bytes())
            .map_err(|e| failed(format!("failed to stage document: {e}")))?;
        staged
            .flush()
            .map_err(|e| failed(format!("failed to stage document: {e}")))?;

        let program = self.apply_tool(kind);
        let args = apply_args(&self.config.uri, staged.path(), auth_options);
        debug!(program = %program.display(), document = %ldif, "Running apply tool");

        let output = self
            .run(program, &args)
            .await
            .map_err(|e| failed(format!("failed to run {}: {e}", program.display())))?;

        if !output.status.success() {
            let details = combined_output(&output);
            warn!(status = ?output.status.code(), "Apply tool failed");
            return Err(failed(details.trim_end().to_string()));
        }

        info!("Directive document applied");
        debug!(output = %String::from_utf8_lossy(&output.stdout), "Apply tool output");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn auth() -> Vec<String> {
        vec!["-QY".to_string(), "EXTERNAL".to_string()]
    }

    #[test]
    fn test_search_args() {
        let args = search_args("ldapi:///", "cn=admin,dc=example,dc=com", &auth());
        assert_eq!(
            args,
            vec![
                "-H",
                "ldapi:///",
                "-b",
                "cn=admin,dc=example,dc=com",
                "-s",
                "base",
                "-LLL",
                "-d",
                "0",
                "-QY",
                "EXTERNAL"
            ]
        );
    }

    #[test]
    fn test_apply_args() {
        let args = apply_args(
            "ldap://localhost",
            Path::new("/tmp/ldapdn-x.ldif"),
            &["-x".to_string(), "-w".to_string(), "secret".to_string()],
        );
        assert_eq!(
            args,
            vec![
                "-H",
                "ldap://localhost",
                "-d",
                "0",
                "-f",
                "/tmp/ldapdn-x.ldif",
                "-x",
                "-w",
                "secret"
            ]
        );
    }

    #[test]
    fn test_no_such_object_by_status() {
        let response = classify_search_failure(Some(32), "").unwrap();
        assert_eq!(response, SearchResponse::NoSuchObject);
    }

    #[test]
    fn test_no_such_object_by_text() {
        let response =
            classify_search_failure(Some(1), "ldap_search_ext: No such object (32)\n").unwrap();
        assert_eq!(response, SearchResponse::NoSuchObject);
    }

    #[test]
    fn test_other_failures_are_unavailable() {
        let err = classify_search_failure(
            Some(255),
            "ldap_sasl_interactive_bind: Can't contact LDAP server (-1)\n",
        )
        .unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("status 255"));
        assert!(err.to_string().contains("Can't contact LDAP server"));

        let err = classify_search_failure(None, "").unwrap_err();
        assert!(err.to_string().contains("status signal"));
    }

    #[test]
    fn test_apply_tool_selection() {
        let tools = OpenLdapTools::new(OpenLdapConfig::default().with_tools_dir("/opt/bin"));
        assert_eq!(tools.apply_tool(ApplyKind::Create), PathBuf::from("/opt/bin/ldapadd"));
        assert_eq!(
            tools.apply_tool(ApplyKind::Modify),
            PathBuf::from("/opt/bin/ldapmodify")
        );
    }

    #[tokio::test]
    async fn test_missing_search_tool_is_unavailable() {
        let tools = OpenLdapTools::new(
            OpenLdapConfig::default().with_tools_dir("/nonexistent/ldapdn-tools"),
        );
        let err = tools.search("cn=x", &auth()).await.unwrap_err();
        assert_eq!(err.error_code(), "DIRECTORY_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_missing_apply_tool_carries_document() {
        let tools = OpenLdapTools::new(
            OpenLdapConfig::default().with_tools_dir("/nonexistent/ldapdn-tools"),
        );
        let document = DirectiveDocument::Add {
            dn: "cn=x".to_string(),
            attributes: vec![("cn".to_string(), "x".to_string())],
        };
        match tools.apply(&document, &auth()).await.unwrap_err() {
            LdapDnError::ApplyFailed { kind, document, .. } => {
                assert_eq!(kind, ApplyKind::Create);
                assert_eq!(document, "dn: cn=x\ncn: x\n");
            }
            other => panic!("expected ApplyFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    mod process {
        use super::*;

        fn tools_running(search: &str, apply: &str) -> OpenLdapTools {
            let mut config = OpenLdapConfig::default().with_timeout_secs(10);
            config.ldapsearch = PathBuf::from(search);
            config.ldapmodify = PathBuf::from(apply);
            config.ldapadd = PathBuf::from(apply);
            OpenLdapTools::new(config)
        }

        fn modify_document() -> DirectiveDocument {
            DirectiveDocument::Modify {
                dn: "cn=x".to_string(),
                blocks: vec![ldapdn_core::directive::DirectiveBlock::Delete {
                    attribute: "description".to_string(),
                }],
            }
        }

        #[tokio::test]
        async fn test_successful_search_returns_stdout() {
            let tools = tools_running("true", "true");
            let response = tools.search("cn=x", &auth()).await.unwrap();
            assert_eq!(response, SearchResponse::Entry(String::new()));
        }

        #[tokio::test]
        async fn test_failing_search_is_unavailable() {
            let tools = tools_running("false", "true");
            let err = tools.search("cn=x", &auth()).await.unwrap_err();
            assert!(err.is_transient());
            assert!(err.to_string().contains("status 1"));
        }

        #[tokio::test]
        async fn test_successful_apply() {
            let tools = tools_running("true", "true");
            tools.apply(&modify_document(), &auth()).await.unwrap();
        }

        #[tokio::test]
        async fn test_failing_apply_carries_document() {
            let tools = tools_running("true", "false");
            match tools.apply(&modify_document(), &auth()).await.unwrap_err() {
                LdapDnError::ApplyFailed { kind, dn, document, .. } => {
                    assert_eq!(kind, ApplyKind::Modify);
                    assert_eq!(dn, "cn=x");
                    assert_eq!(
                        document,
                        "dn: cn=x\nchangetype: modify\ndelete: description\n-\n"
                    );
                }
                other => panic!("expected ApplyFailed, got {other:?}"),
            }
        }
    }
}
