//! # ldapdn-openldap
//!
//! [`DirectorySearch`](ldapdn_core::traits::DirectorySearch) and
//! [`DirectoryApply`](ldapdn_core::traits::DirectoryApply) implemented with
//! the OpenLDAP command-line tools.
//!
//! ```no_run
//! use ldapdn_core::prelude::*;
//! use ldapdn_openldap::{OpenLdapConfig, OpenLdapTools};
//!
//! # async fn run() -> LdapDnResult<()> {
//! let tools = OpenLdapTools::new(OpenLdapConfig::default().with_uri("ldap://localhost"));
//! let provider = LdapDnProvider::new(tools);
//!
//! let desired = DesiredEntry::new(
//!     "dc=example,dc=com",
//!     AttributeSet::new().with("objectClass", "dcObject").with("dc", "example"),
//! )?;
//! let evaluation = provider.evaluate(&desired).await?;
//! if host_would_apply(evaluation.signal, evaluation.ensure) {
//!     provider.apply(&desired, &evaluation).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod tools;

pub use config::OpenLdapConfig;
pub use tools::{apply_args, classify_search_failure, search_args, OpenLdapTools};
