//! ldapdn error types
//!
//! Error definitions with transient/permanent classification so callers can
//! decide on their own retry policy. The core never retries.

use thiserror::Error;

use crate::types::ApplyKind;

/// Error that can occur while evaluating or applying a reconciliation pass.
#[derive(Debug, Error)]
pub enum LdapDnError {
    // Declarative input errors (permanent)
    /// A `name:value` attribute token could not be split.
    #[error("malformed attribute token '{token}': expected 'name:value'")]
    MalformedAttributeToken { token: String },

    /// The declared entry is unusable (empty DN, ...).
    #[error("invalid entry: {message}")]
    InvalidEntry { message: String },

    // Directory errors
    /// The search collaborator failed for a reason other than "no such object".
    #[error("directory unavailable: {message}")]
    DirectoryUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The apply collaborator rejected the compiled directive document.
    #[error("ldap {kind} failed for {dn}:\n\n{document}\nerror details:\n{details}")]
    ApplyFailed {
        kind: ApplyKind,
        dn: String,
        document: String,
        details: String,
    },

    // Configuration errors (permanent)
    /// Manifest or environment configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// A manifest or document could not be decoded.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl LdapDnError {
    /// Check if this error is transient and the pass may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, LdapDnError::DirectoryUnavailable { .. })
    }

    /// Check if this error is permanent and retry won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            LdapDnError::MalformedAttributeToken { .. } => "MALFORMED_ATTRIBUTE_TOKEN",
            LdapDnError::InvalidEntry { .. } => "INVALID_ENTRY",
            LdapDnError::DirectoryUnavailable { .. } => "DIRECTORY_UNAVAILABLE",
            LdapDnError::ApplyFailed { .. } => "APPLY_FAILED",
            LdapDnError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            LdapDnError::Serialization { .. } => "SERIALIZATION_ERROR",
        }
    }

    // Convenience constructors

    /// Create a malformed token error.
    pub fn malformed_token(token: impl Into<String>) -> Self {
        LdapDnError::MalformedAttributeToken {
            token: token.into(),
        }
    }

    /// Create an invalid entry error.
    pub fn invalid_entry(message: impl Into<String>) -> Self {
        LdapDnError::InvalidEntry {
            message: message.into(),
        }
    }

    /// Create a directory unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        LdapDnError::DirectoryUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Create a directory unavailable error with source.
    pub fn unavailable_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LdapDnError::DirectoryUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an apply failure carrying the attempted document.
    pub fn apply_failed(
        kind: ApplyKind,
        dn: impl Into<String>,
        document: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        LdapDnError::ApplyFailed {
            kind,
            dn: dn.into(),
            document: document.into(),
            details: details.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        LdapDnError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

impl From<serde_yaml::Error> for LdapDnError {
    fn from(e: serde_yaml::Error) -> Self {
        LdapDnError::Serialization {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for LdapDnError {
    fn from(e: serde_json::Error) -> Self {
        LdapDnError::Serialization {
            message: e.to_string(),
        }
    }
}

/// Result type for ldapdn operations.
pub type LdapDnResult<T> = Result<T, LdapDnError>;
