//! Shared helpers for ldapdn-core integration tests.
//!
//! Provides an in-memory directory that answers searches with LDIF text and
//! applies compiled directive documents the way an LDAP server would.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

use ldapdn_core::async_trait;
use ldapdn_core::prelude::*;

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

/// Apply a compiled document to an entry held as `(name, value)` pairs.
pub fn apply_document(state: &mut Vec<(String, String)>, document: &DirectiveDocument) {
    match document {
        DirectiveDocument::Add { attributes, .. } => {
            state.clear();
            state.extend(attributes.iter().cloned());
        }
        DirectiveDocument::Modify { blocks, .. } => {
            for block in blocks {
                match block {
                    DirectiveBlock::Add { attribute, value } => {
                        state.push((attribute.clone(), value.clone()));
                    }
                    DirectiveBlock::Replace { attribute, values } => {
                        state.retain(|(n, _)| n != attribute);
                        state.extend(values.iter().map(|v| (attribute.clone(), v.clone())));
                    }
                    DirectiveBlock::Delete { attribute } => {
                        state.retain(|(n, _)| n != attribute);
                    }
                }
            }
        }
    }
}

/// Render an entry the way `ldapsearch -LLL` prints it.
pub fn render_entry(dn: &str, pairs: &[(String, String)]) -> String {
    let mut text = format!("dn: {dn}\n");
    for (name, value) in pairs {
        text.push_str(&format!("{name}: {value}\n"));
    }
    text.push('\n');
    text
}

/// In-memory directory with switchable failures and call counters.
#[derive(Default)]
pub struct MockDirectory {
    entries: Mutex<HashMap<String, Vec<(String, String)>>>,
    unavailable: AtomicBool,
    reject_apply: AtomicBool,
    search_calls: AtomicUsize,
    apply_calls: AtomicUsize,
    applied: Mutex<Vec<String>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, dn: &str, pairs: &[(&str, &str)]) -> Self {
        self.entries.lock().unwrap().insert(
            dn.to_string(),
            pairs
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn unavailable(self) -> Self {
        self.unavailable.store(true, Ordering::SeqCst);
        self
    }

    pub fn rejecting_applies(self) -> Self {
        self.reject_apply.store(true, Ordering::SeqCst);
        self
    }

    pub fn entry(&self, dn: &str) -> Option<Vec<(String, String)>> {
        self.entries.lock().unwrap().get(dn).cloned()
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn apply_calls(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }

    pub fn applied_documents(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectorySearch for MockDirectory {
    async fn search(&self, dn: &str, _auth_options: &[String]) -> LdapDnResult<SearchResponse> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LdapDnError::unavailable(
                "ldap_sasl_interactive_bind: Can't contact LDAP server (-1)",
            ));
        }

        Ok(match self.entries.lock().unwrap().get(dn) {
            Some(pairs) => SearchResponse::Entry(render_entry(dn, pairs)),
            None => SearchResponse::NoSuchObject,
        })
    }
}

#[async_trait]
impl DirectoryApply for MockDirectory {
    async fn apply(
        &self,
        document: &DirectiveDocument,
        _auth_options: &[String],
    ) -> LdapDnResult<()> {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        self.applied.lock().unwrap().push(document.to_ldif());
        if self.reject_apply.load(Ordering::SeqCst) {
            return Err(LdapDnError::unavailable(
                "ldap_modify: Insufficient access (50)",
            ));
        }

        let mut entries = self.entries.lock().unwrap();
        match document.kind() {
            ApplyKind::Create => {
                let state = entries.entry(document.dn().to_string()).or_default();
                apply_document(state, document);
            }
            ApplyKind::Modify => {
                let state = entries
                    .get_mut(document.dn())
                    .ok_or_else(|| LdapDnError::unavailable("No such object (32)"))?;
                apply_document(state, document);
            }
        }
        Ok(())
    }
}
