//! Attribute model
//!
//! Desired-side value types: the ordered multi-valued [`AttributeSet`] and
//! the [`DesiredEntry`] that carries it together with its classification
//! sets.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

use crate::error::{LdapDnError, LdapDnResult};
use crate::types::Ensure;

/// Auth options handed to the directory tools when none are declared:
/// SASL EXTERNAL, i.e. the local peer credentials of the `ldapi:///` socket.
pub const DEFAULT_AUTH_OPTIONS: &[&str] = &["-QY", "EXTERNAL"];

/// Ordered mapping of attribute name to its values.
///
/// Names keep their first-insertion order and are compared case-sensitively.
/// Values keep insertion order and are never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    entries: Vec<(String, Vec<String>)>,
}

impl AttributeSet {
    /// Create a new empty attribute set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a value to an attribute, creating the attribute if needed.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Append a value using builder pattern.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Get the values of an attribute.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Check if an attribute is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Attribute names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over attributes and their values in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(n, values)| (n.as_str(), values.as_slice()))
    }

    /// Iterate over every `(name, value)` pair in declaration order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(n, values)| values.iter().map(move |v| (n.as_str(), v.as_str())))
    }

    /// Number of distinct attribute names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut set = AttributeSet::new();
        for (name, value) in iter {
            set.push(name, value);
        }
        set
    }
}

impl Serialize for AttributeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, values) in &self.entries {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

/// Parse flat `"name:value"` tokens into an [`AttributeSet`].
///
/// Tokens are split on the first colon; the value is trimmed. A token with
/// no colon, an empty name, or a line break inside the name or value is
/// rejected.
pub fn parse_attribute_tokens<I, S>(tokens: I) -> LdapDnResult<AttributeSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = AttributeSet::new();
    for token in tokens {
        let token = token.as_ref();
        let (name, value) = token
            .split_once(':')
            .ok_or_else(|| LdapDnError::malformed_token(token))?;
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() || is_multiline(name) || is_multiline(value) {
            return Err(LdapDnError::malformed_token(token));
        }
        set.push(name, value);
    }
    Ok(set)
}

/// Each value is written as one LDIF line, so it must not span lines.
fn is_multiline(text: &str) -> bool {
    text.contains(['\n', '\r'])
}

/// The declared state of one directory entry for a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredEntry {
    dn: String,
    ensure: Ensure,
    attributes: AttributeSet,
    unique_attributes: BTreeSet<String>,
    indifferent_attributes: BTreeSet<String>,
    auth_options: Vec<String>,
}

impl DesiredEntry {
    /// Create a desired entry with `ensure: present`, no classifications and
    /// the default auth options.
    pub fn new(dn: impl Into<String>, attributes: AttributeSet) -> LdapDnResult<Self> {
        let dn = dn.into();
        if dn.trim().is_empty() {
            return Err(LdapDnError::invalid_entry("distinguished name is empty"));
        }
        if is_multiline(&dn) {
            return Err(LdapDnError::invalid_entry("distinguished name spans lines"));
        }
        if let Some((name, _)) = attributes
            .pairs()
            .find(|(name, value)| is_multiline(name) || is_multiline(value))
        {
            return Err(LdapDnError::invalid_entry(format!(
                "attribute '{}' spans lines",
                name.escape_debug()
            )));
        }

        Ok(Self {
            dn,
            ensure: Ensure::Present,
            attributes,
            unique_attributes: BTreeSet::new(),
            indifferent_attributes: BTreeSet::new(),
            auth_options: DEFAULT_AUTH_OPTIONS.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[must_use]
    pub fn with_ensure(mut self, ensure: Ensure) -> Self {
        self.ensure = ensure;
        self
    }

    /// Mark attributes as unique: a drifted value is replaced, not added to.
    pub fn with_unique_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_attributes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Mark attributes as indifferent: once present they are never corrected.
    pub fn with_indifferent_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indifferent_attributes
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Replace the auth options passed through to the directory tools.
    pub fn with_auth_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.auth_options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn dn(&self) -> &str {
        &self.dn
    }

    pub fn ensure(&self) -> Ensure {
        self.ensure
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn auth_options(&self) -> &[String] {
        &self.auth_options
    }

    pub fn is_unique(&self, name: &str) -> bool {
        self.unique_attributes.contains(name)
    }

    pub fn is_indifferent(&self, name: &str) -> bool {
        self.indifferent_attributes.contains(name)
    }
}
