//! DocumentStore - the hosted backend the leaderboard delegates to.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  insert/update   ┌──────────────────────┐
//! │ ScoreWriter  │ ───────────────► │    DocumentStore     │
//! └──────────────┘                  │ get/insert/update/   │
//! ┌──────────────┐  query           │ query + ACL checks   │
//! │ Leaderboard  │ ───────────────► │                      │
//! └──────────────┘                  └──────────┬───────────┘
//!                                              │ CommitNotice (after each write)
//!                                              ▼
//!                                   ┌──────────────────────┐
//!                                   │   CommitHook(s)      │
//!                                   │ e.g. RecalcQueue     │
//!                                   └──────────────────────┘
//! ```
//!
//! `InMemoryDocumentStore` is the included implementation. Adapters for a
//! real hosted platform implement the same trait.

mod in_memory;
mod query;

use std::sync::Arc;

use crate::document::{Acl, Credential, Document, Stored};
use crate::error::StoreError;

pub use in_memory::InMemoryDocumentStore;
pub use query::Query;

/// Whether a commit created the document or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    Created,
    Updated,
}

/// Notification delivered to hooks once per successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitNotice {
    pub collection: String,
    pub id: String,
    pub version: u64,
    pub kind: CommitKind,
    /// The write was made with a master credential, by the recalculator or
    /// by any other holder of the key.
    pub elevated: bool,
}

/// Reaction to committed writes (the store's "after save" trigger).
///
/// Hooks run on the writing thread after the store has released its
/// internal locks, so they may read from or write to the store.
pub trait CommitHook: Send + Sync {
    fn after_commit(&self, notice: &CommitNotice);
}

impl<F> CommitHook for F
where
    F: Fn(&CommitNotice) + Send + Sync,
{
    fn after_commit(&self, notice: &CommitNotice) {
        self(notice)
    }
}

/// Abstract document storage with per-document access control.
pub trait DocumentStore: Send + Sync {
    /// Get a document by id. Returns `None` if it does not exist.
    /// Fails with `PermissionDenied` if it exists but is not readable.
    fn get<D: Document>(&self, cred: &Credential, id: &str)
        -> Result<Option<Stored<D>>, StoreError>;

    /// Insert a new document. An empty id is replaced by a store-assigned one.
    /// Fails if a document with the same id already exists.
    fn insert<D: Document>(
        &self,
        cred: &Credential,
        doc: &D,
        acl: Acl,
    ) -> Result<Stored<D>, StoreError>;

    /// Update an existing document with optimistic concurrency control.
    fn update<D: Document>(
        &self,
        cred: &Credential,
        doc: &D,
        expected_version: u64,
    ) -> Result<Stored<D>, StoreError>;

    /// Run a query over the documents of `D`'s collection readable by `cred`.
    fn query<D: Document>(
        &self,
        cred: &Credential,
        query: &Query<D>,
    ) -> Result<Vec<Stored<D>>, StoreError>;

    /// Replace a document's access control. Owner or master only.
    fn set_acl<D: Document>(&self, cred: &Credential, id: &str, acl: Acl)
        -> Result<(), StoreError>;

    /// Register a hook fired after every successful insert or update.
    fn subscribe(&self, hook: Arc<dyn CommitHook>) -> Result<(), StoreError>;
}
