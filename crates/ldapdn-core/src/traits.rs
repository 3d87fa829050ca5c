//! Directory collaborator traits
//!
//! The core never talks to a directory itself. A pass searches through a
//! [`DirectorySearch`] and writes through a [`DirectoryApply`]; both are
//! awaited in order, one call at a time.

use async_trait::async_trait;

use crate::directive::DirectiveDocument;
use crate::error::LdapDnResult;

/// Successful outcome of a base-scope search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResponse {
    /// The entry exists; raw LDIF text of the entry.
    Entry(String),
    /// The directory answered "no such object".
    NoSuchObject,
}

/// Capability for reading the live state of one entry.
#[async_trait]
pub trait DirectorySearch: Send + Sync {
    /// Search the entry at `dn` with base scope.
    ///
    /// "No such object" is an ordinary [`SearchResponse::NoSuchObject`];
    /// every other failure is `LdapDnError::DirectoryUnavailable`.
    async fn search(&self, dn: &str, auth_options: &[String]) -> LdapDnResult<SearchResponse>;
}

/// Capability for writing a compiled directive document.
#[async_trait]
pub trait DirectoryApply: Send + Sync {
    /// Submit `document` verbatim. The apply kind is `document.kind()`.
    async fn apply(&self, document: &DirectiveDocument, auth_options: &[String])
        -> LdapDnResult<()>;
}

/// A collaborator that can both search and apply.
pub trait Directory: DirectorySearch + DirectoryApply {}

impl<T: DirectorySearch + DirectoryApply> Directory for T {}
