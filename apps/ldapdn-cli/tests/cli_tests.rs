//! Integration tests for the ldapdn binary
//!
//! The OpenLDAP tools are replaced by small shell scripts that keep the entry
//! in a file, so every command runs end to end without a directory server.
//!
//! Tests cover:
//! - plan/check/apply on a missing entry
//! - convergence after apply
//! - dry runs
//! - exit codes for invalid manifests, unreachable directories and
//!   rejected applies

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const MANIFEST: &str = r#"
entries:
  - name: cn=admin,dc=example,dc=com
    attributes:
      - "objectClass: organizationalRole"
      - "cn: admin"
      - "mail: admin@example.com"
    unique_attributes: [mail]
"#;

/// A scratch directory holding fake tools, their state and a manifest.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let sandbox = Self {
            dir: TempDir::new().unwrap(),
        };
        let state = sandbox.state_file();
        let modify_log = sandbox.path("modify.log");

        sandbox.script(
            "ldapsearch",
            &format!(
                "if [ -f '{state}' ]; then cat '{state}'; exit 0; fi\n\
                 echo 'No such object (32)' >&2\n\
                 exit 32\n",
                state = state.display()
            ),
        );
        sandbox.script(
            "ldapadd",
            &format!(
                "while [ $# -gt 0 ]; do\n\
                 if [ \"$1\" = \"-f\" ]; then cp \"$2\" '{state}'; fi\n\
                 shift\n\
                 done\n",
                state = state.display()
            ),
        );
        sandbox.script(
            "ldapmodify",
            &format!(
                "while [ $# -gt 0 ]; do\n\
                 if [ \"$1\" = \"-f\" ]; then cat \"$2\" >> '{log}'; fi\n\
                 shift\n\
                 done\n",
                log = modify_log.display()
            ),
        );
        fs::write(sandbox.manifest(), MANIFEST).unwrap();
        sandbox
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn state_file(&self) -> PathBuf {
        self.path("entry.ldif")
    }

    fn manifest(&self) -> PathBuf {
        self.path("manifest.yaml")
    }

    fn script(&self, name: &str, body: &str) {
        let path = self.path(name);
        fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn run(&self, args: &[&str]) -> Output {
        let tool = |name: &str| self.path(name);
        Command::new(env!("CARGO_BIN_EXE_ldapdn"))
            .args(args)
            .arg("-f")
            .arg(self.manifest())
            .env("LDAPDN_LDAPSEARCH", tool("ldapsearch"))
            .env("LDAPDN_LDAPADD", tool("ldapadd"))
            .env("LDAPDN_LDAPMODIFY", tool("ldapmodify"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("LDAPDN_URI")
            .output()
            .expect("Failed to execute command")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn write_entry(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
}

#[test]
fn test_plan_missing_entry_shows_ldif() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["plan"]);

    assert!(output.status.success(), "plan should succeed");
    let text = stdout(&output);
    assert!(text.contains("Create: cn=admin,dc=example,dc=com"));
    assert!(text.contains("dn: cn=admin,dc=example,dc=com"));
    assert!(text.contains("mail: admin@example.com"));
    assert!(!sandbox.state_file().exists());
}

#[test]
fn test_plan_json() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["plan", "--json"]);

    assert!(output.status.success());
    let report = json(&output);
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["entries"][0]["action"], "create");
    assert_eq!(report["entries"][0]["signal"], "action_required");
    assert_eq!(report["entries"][0]["plan"]["kind"], "create");
    assert_eq!(report["summary"]["changed"], 1);
}

#[test]
fn test_check_reports_drift() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["check"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_apply_creates_then_converges() {
    let sandbox = Sandbox::new();

    let output = sandbox.run(&["apply"]);
    assert!(output.status.success(), "apply should succeed");
    assert!(stdout(&output).contains("(applied)"));

    let created = fs::read_to_string(sandbox.state_file()).unwrap();
    assert_eq!(
        created,
        "dn: cn=admin,dc=example,dc=com\n\
         objectClass: organizationalRole\n\
         cn: admin\n\
         mail: admin@example.com\n"
    );

    let output = sandbox.run(&["check"]);
    assert!(output.status.success(), "check should pass after apply");

    let output = sandbox.run(&["apply", "--json"]);
    assert!(output.status.success());
    let report = json(&output);
    assert_eq!(report["entries"][0]["action"], "unchanged");
    assert!(!sandbox.path("modify.log").exists());
}

#[test]
fn test_apply_dry_run_changes_nothing() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["apply", "--dry-run"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Dry run"));
    assert!(!sandbox.state_file().exists());
}

#[test]
fn test_apply_replaces_unique_drift() {
    let sandbox = Sandbox::new();
    write_entry(
        &sandbox.state_file(),
        "dn: cn=admin,dc=example,dc=com\n\
         objectClass: organizationalRole\n\
         cn: admin\n\
         mail: old@example.com\n\n",
    );

    let output = sandbox.run(&["apply"]);
    assert!(output.status.success());

    let submitted = fs::read_to_string(sandbox.path("modify.log")).unwrap();
    assert_eq!(
        submitted,
        "dn: cn=admin,dc=example,dc=com\n\
         changetype: modify\n\
         replace: mail\n\
         mail: admin@example.com\n\
         -\n"
    );
}

#[test]
fn test_rejected_apply_exit_code() {
    let sandbox = Sandbox::new();
    write_entry(
        &sandbox.state_file(),
        "dn: cn=admin,dc=example,dc=com\ncn: admin\n\n",
    );
    sandbox.script(
        "ldapmodify",
        "echo 'ldap_modify: Insufficient access (50)' >&2\nexit 50\n",
    );

    let output = sandbox.run(&["apply", "--json"]);
    assert_eq!(output.status.code(), Some(5));

    let report = json(&output);
    assert_eq!(report["entries"][0]["action"], "failed");
    assert_eq!(report["entries"][0]["error_code"], "APPLY_FAILED");
    assert_eq!(report["summary"]["failed"], 1);
}

#[test]
fn test_unreachable_directory_exit_code() {
    let sandbox = Sandbox::new();
    sandbox.script(
        "ldapsearch",
        "echo \"ldap_sasl_interactive_bind: Can't contact LDAP server (-1)\" >&2\nexit 255\n",
    );

    let output = sandbox.run(&["check"]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Can't contact LDAP server"));
}

#[test]
fn test_invalid_manifest_exit_code() {
    let sandbox = Sandbox::new();
    fs::write(
        sandbox.manifest(),
        "entries:\n  - name: cn=x\n    attributes: [\"nocolon\"]\n",
    )
    .unwrap();

    let output = sandbox.run(&["plan"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_missing_manifest_exit_code() {
    let sandbox = Sandbox::new();
    fs::remove_file(sandbox.manifest()).unwrap();

    let output = sandbox.run(&["check"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("File not found"));
}
