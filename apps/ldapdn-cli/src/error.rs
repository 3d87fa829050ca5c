//! CLI error types and exit codes

use ldapdn_core::error::LdapDnError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Entries out of sync (`check`)
/// - 3: Directory unavailable
/// - 4: Validation error
/// - 5: Apply failed
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("{0}")]
    ApplyFailed(String),

    #[error("{0} entry(ies) out of sync")]
    Drift(usize),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => 1,
            CliError::Drift(_) => 2,
            CliError::DirectoryUnavailable(_) => 3,
            CliError::Validation(_) | CliError::Config(_) => 4,
            CliError::ApplyFailed(_) => 5,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::DirectoryUnavailable(_) => {
                Some("Check that the directory answers on the URI given by --uri or LDAPDN_URI.")
            }
            CliError::Drift(_) => Some("Run 'ldapdn apply' to converge the entries."),
            _ => None,
        }
    }
}

impl From<LdapDnError> for CliError {
    fn from(e: LdapDnError) -> Self {
        match e {
            LdapDnError::MalformedAttributeToken { .. }
            | LdapDnError::InvalidEntry { .. }
            | LdapDnError::Serialization { .. } => CliError::Validation(e.to_string()),
            LdapDnError::InvalidConfiguration { message } => CliError::Config(message),
            LdapDnError::DirectoryUnavailable { message, .. } => {
                CliError::DirectoryUnavailable(message)
            }
            LdapDnError::ApplyFailed { .. } => CliError::ApplyFailed(e.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldapdn_core::types::ApplyKind;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Io("x".to_string()).exit_code(), 1);
        assert_eq!(CliError::Drift(2).exit_code(), 2);
        assert_eq!(CliError::DirectoryUnavailable("x".to_string()).exit_code(), 3);
        assert_eq!(CliError::Validation("x".to_string()).exit_code(), 4);
        assert_eq!(CliError::Config("x".to_string()).exit_code(), 4);
        assert_eq!(CliError::ApplyFailed("x".to_string()).exit_code(), 5);
    }

    #[test]
    fn test_from_core_errors() {
        let err: CliError = LdapDnError::malformed_token("nocolon").into();
        assert_eq!(err.exit_code(), 4);

        let err: CliError = LdapDnError::unavailable("Can't contact LDAP server").into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("Can't contact LDAP server"));

        let err: CliError =
            LdapDnError::apply_failed(ApplyKind::Create, "cn=x", "dn: cn=x\n", "denied").into();
        assert_eq!(err.exit_code(), 5);
        assert!(err.to_string().starts_with("ldap add failed for cn=x"));
    }

    #[test]
    fn test_drift_display() {
        assert_eq!(CliError::Drift(3).to_string(), "3 entry(ies) out of sync");
    }
}
