//! # ldapdn
//!
//! Declarative reconciliation of one LDAP entry.
//!
//! A [`DesiredEntry`](model::DesiredEntry) lists attribute values that must
//! (or must not) be present on an entry. Each pass searches the live entry,
//! diffs it against the declaration and compiles the minimal LDIF that
//! converges it. Re-running a pass on a converged entry yields no work.
//!
//! ## Architecture
//!
//! ```text
//!  search text ──► observed ──┐
//!                              ├─► reconcile ──► WorkPlan ──► directive ──► apply
//!  declaration ──► model ─────┘                     │
//!                                                   └──► signal ──► host loop
//! ```
//!
//! - [`model`] - attribute sets and the declared entry
//! - [`observed`] - parser for base-scope search output
//! - [`reconcile`] - the diff algorithm
//! - [`directive`] - LDIF compilation of a work plan
//! - [`signal`] - present/absent signal for a host convergence loop
//! - [`traits`] - search/apply collaborator seams
//! - [`provider`] - one-pass driver over a collaborator
//! - [`config`] - manifest and entry declarations
//! - [`trace`] - injectable diagnostic observer
//!
//! ## Example
//!
//! ```
//! use ldapdn_core::prelude::*;
//!
//! let desired = DesiredEntry::new(
//!     "cn=admin,dc=example,dc=com",
//!     AttributeSet::new().with("mail", "new@example.com"),
//! )?
//! .with_unique_attributes(["mail"]);
//!
//! let observed = parse_search_output("dn: cn=admin,dc=example,dc=com\nmail: old@example.com\n");
//! let plan = reconcile(&desired, &observed);
//!
//! let document = compile(desired.dn(), &plan).expect("work to do");
//! assert_eq!(
//!     document.to_ldif(),
//!     "dn: cn=admin,dc=example,dc=com\nchangetype: modify\nreplace: mail\nmail: new@example.com\n-\n"
//! );
//! # Ok::<(), ldapdn_core::error::LdapDnError>(())
//! ```

pub mod config;
pub mod directive;
pub mod error;
pub mod ids;
pub mod model;
pub mod observed;
pub mod operation;
pub mod provider;
pub mod reconcile;
pub mod signal;
pub mod trace;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{EntryDeclaration, Manifest};
    pub use crate::directive::{compile, compile_attribute, DirectiveBlock, DirectiveDocument};
    pub use crate::error::{LdapDnError, LdapDnResult};
    pub use crate::ids::PassId;
    pub use crate::model::{parse_attribute_tokens, AttributeSet, DesiredEntry};
    pub use crate::observed::{parse_search_output, strip_scheme, ObservedEntry, ObservedValue};
    pub use crate::operation::{AttributeWork, Operation, WorkPlan};
    pub use crate::provider::{Evaluation, LdapDnProvider};
    pub use crate::reconcile::{reconcile, reconcile_traced};
    pub use crate::signal::{host_would_apply, needs_sync, Signal};
    pub use crate::trace::{NoopObserver, ReconcileObserver, TraceEvent, TracingObserver};
    pub use crate::traits::{Directory, DirectoryApply, DirectorySearch, SearchResponse};
    pub use crate::types::{ApplyKind, Ensure};
}

// Re-export async_trait for collaborator implementors
pub use async_trait::async_trait;
