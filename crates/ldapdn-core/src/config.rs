//! Declarative entry configuration
//!
//! The serde shape of a declared entry and of a manifest of entries, and
//! their conversion into [`DesiredEntry`] values.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{LdapDnError, LdapDnResult};
use crate::model::{parse_attribute_tokens, DesiredEntry};
use crate::types::Ensure;

/// One declared entry as written in a manifest.
///
/// ```yaml
/// name: olcDatabase={1}mdb,cn=config
/// attributes:
///   - "olcRootDN: cn=admin,dc=example,dc=com"
///   - "olcRootPW: {SSHA}placeholder"
/// unique_attributes: [olcRootDN]
/// indifferent_attributes: [olcRootPW]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDeclaration {
    /// Name of the declaration; also the DN when `dn` is not set.
    pub name: String,

    /// Distinguished name of the managed entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dn: Option<String>,

    #[serde(default)]
    pub ensure: Ensure,

    /// Flat `"name: value"` tokens.
    #[serde(default)]
    pub attributes: Vec<String>,

    #[serde(default)]
    pub unique_attributes: Vec<String>,

    #[serde(default)]
    pub indifferent_attributes: Vec<String>,

    /// Options passed to the directory tools for authentication.
    /// Defaults to `-QY EXTERNAL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_opts: Option<Vec<String>>,
}

impl EntryDeclaration {
    /// Create a declaration with `ensure: present` and no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dn: None,
            ensure: Ensure::Present,
            attributes: Vec::new(),
            unique_attributes: Vec::new(),
            indifferent_attributes: Vec::new(),
            auth_opts: None,
        }
    }

    /// Add a `"name: value"` token.
    pub fn with_attribute(mut self, token: impl Into<String>) -> Self {
        self.attributes.push(token.into());
        self
    }

    #[must_use]
    pub fn with_ensure(mut self, ensure: Ensure) -> Self {
        self.ensure = ensure;
        self
    }

    /// The DN this declaration manages.
    pub fn dn(&self) -> &str {
        self.dn.as_deref().unwrap_or(&self.name)
    }

    /// Convert into the engine's input.
    pub fn to_desired(&self) -> LdapDnResult<DesiredEntry> {
        let attributes = parse_attribute_tokens(&self.attributes)?;
        let mut entry = DesiredEntry::new(self.dn(), attributes)?
            .with_ensure(self.ensure)
            .with_unique_attributes(self.unique_attributes.iter().cloned())
            .with_indifferent_attributes(self.indifferent_attributes.iter().cloned());
        if let Some(options) = &self.auth_opts {
            entry = entry.with_auth_options(options.iter().cloned());
        }
        Ok(entry)
    }
}

/// A list of entries, reconciled in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub entries: Vec<EntryDeclaration>,
}

impl Manifest {
    /// Parse a manifest from YAML text.
    pub fn from_yaml(text: &str) -> LdapDnResult<Self> {
        let manifest: Manifest = serde_yaml::from_str(text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest from a YAML file.
    pub fn load(path: &Path) -> LdapDnResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LdapDnError::invalid_configuration(format!(
                "failed to read manifest {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&text)
    }

    /// Check every declaration converts and no DN is declared twice.
    pub fn validate(&self) -> LdapDnResult<()> {
        let mut seen = std::collections::HashSet::new();
        for declaration in &self.entries {
            declaration.to_desired()?;
            if !seen.insert(declaration.dn()) {
                return Err(LdapDnError::invalid_configuration(format!(
                    "entry '{}' is declared more than once",
                    declaration.dn()
                )));
            }
        }
        Ok(())
    }

    /// Convert every declaration, in manifest order.
    pub fn desired_entries(&self) -> LdapDnResult<Vec<DesiredEntry>> {
        self.entries.iter().map(EntryDeclaration::to_desired).collect()
    }
}
