//! Documents - typed records held by a hosted document store.
//!
//! Every record the leaderboard persists (score records, achievements,
//! player profiles) is a `Document`: a serde-serializable struct with a
//! collection name and a string id. The store wraps what it returns in
//! `Stored<T>`, which carries the store-owned metadata (version and creation
//! sequence) alongside the data.
//!
//! ## Example
//!
//! ```ignore
//! use highscore::Document;
//!
//! #[derive(Serialize, Deserialize, Clone, Document)]
//! #[document(collection = "game_views")]
//! struct GameView {
//!     #[document(id)]
//!     pub id: String,
//!     pub score: u32,
//! }
//! ```

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that can be stored in a document store.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection name for this document type (e.g., "high_scores").
    /// Maps to a class on a hosted backend, a table in SQL, a key prefix in KV stores, etc.
    const COLLECTION: &'static str;

    /// Returns the unique identifier for this document. Empty until assigned.
    fn id(&self) -> &str;

    /// Overwrite the identifier. Used by stores when assigning ids on insert.
    fn set_id(&mut self, id: String);
}

/// A document as returned by a store, with store-owned metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub data: T,
    /// Starts at 1 on insert and grows by one on every committed write.
    pub version: u64,
    /// Store-wide creation sequence. Never changes after insert, so it is a
    /// stable secondary ordering key.
    pub created: u64,
}

/// Per-document access control.
///
/// Only the owner may write. Reads are allowed to the owner, or to anyone
/// when `public_read` is set. A valid master credential bypasses both checks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Acl {
    pub owner: Option<String>,
    pub public_read: bool,
}

impl Acl {
    /// Owner-only access.
    pub fn private(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            public_read: false,
        }
    }

    /// Owner writes, everyone reads.
    pub fn public_read(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            public_read: true,
        }
    }

    pub fn readable_by(&self, user: &str) -> bool {
        self.public_read || self.writable_by(user)
    }

    pub fn writable_by(&self, user: &str) -> bool {
        self.owner.as_deref() == Some(user)
    }
}

/// Secret that grants elevated (ACL-bypassing) access to a store.
///
/// Passed explicitly to the components that need it; there is no global
/// "use master key" switch.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterKey(String);

impl MasterKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(***)")
    }
}

/// Who is performing a store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// A signed-in user, identified by the id the auth provider gave them.
    User(String),
    /// Elevated access. Only honored if the key matches the store's.
    Master(MasterKey),
}

impl Credential {
    pub fn user(id: impl Into<String>) -> Self {
        Credential::User(id.into())
    }

    pub fn master(key: MasterKey) -> Self {
        Credential::Master(key)
    }
}
