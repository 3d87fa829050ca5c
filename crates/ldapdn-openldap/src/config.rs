//! OpenLDAP tools configuration
//!
//! Where the command-line tools live, which server they talk to and how long
//! a single tool run may take.

use std::path::PathBuf;
use std::time::Duration;

use ldapdn_core::error::{LdapDnError, LdapDnResult};
use serde::{Deserialize, Serialize};

/// Configuration for [`OpenLdapTools`](crate::OpenLdapTools).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLdapConfig {
    /// Server URI passed to every tool with `-H`.
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_ldapsearch")]
    pub ldapsearch: PathBuf,

    #[serde(default = "default_ldapmodify")]
    pub ldapmodify: PathBuf,

    #[serde(default = "default_ldapadd")]
    pub ldapadd: PathBuf,

    /// Upper bound for one tool run, in seconds. `0` disables the limit.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_uri() -> String {
    "ldapi:///".to_string()
}

fn default_ldapsearch() -> PathBuf {
    PathBuf::from("/usr/bin/ldapsearch")
}

fn default_ldapmodify() -> PathBuf {
    PathBuf::from("/usr/bin/ldapmodify")
}

fn default_ldapadd() -> PathBuf {
    PathBuf::from("/usr/bin/ldapadd")
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for OpenLdapConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            ldapsearch: default_ldapsearch(),
            ldapmodify: default_ldapmodify(),
            ldapadd: default_ldapadd(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OpenLdapConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> LdapDnResult<Self> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Lets tests supply variables without touching the process environment.
    pub fn from_reader<F>(reader: F) -> LdapDnResult<Self>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let defaults = Self::default();

        let uri = reader("LDAPDN_URI").unwrap_or(defaults.uri);
        if uri.trim().is_empty() {
            return Err(LdapDnError::invalid_configuration(
                "LDAPDN_URI must not be empty",
            ));
        }

        let timeout_secs = match reader("LDAPDN_TIMEOUT_SECS") {
            Ok(value) => value.trim().parse::<u64>().map_err(|e| {
                LdapDnError::invalid_configuration(format!(
                    "invalid value for LDAPDN_TIMEOUT_SECS: {e}"
                ))
            })?,
            Err(_) => defaults.timeout_secs,
        };

        Ok(Self {
            uri,
            ldapsearch: reader("LDAPDN_LDAPSEARCH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ldapsearch),
            ldapmodify: reader("LDAPDN_LDAPMODIFY")
                .map(PathBuf::from)
                .unwrap_or(defaults.ldapmodify),
            ldapadd: reader("LDAPDN_LDAPADD")
                .map(PathBuf::from)
                .unwrap_or(defaults.ldapadd),
            timeout_secs,
        })
    }

    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    /// Point all three tools at binaries in `dir`.
    #[must_use]
    pub fn with_tools_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.ldapsearch = dir.join("ldapsearch");
        self.ldapmodify = dir.join("ldapmodify");
        self.ldapadd = dir.join("ldapadd");
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// The per-run limit, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
