use std::fmt;

/// Error type for document store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Optimistic concurrency conflict: the document changed since it was read.
    ConcurrencyConflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },
    /// The credential may not perform the operation on this document.
    PermissionDenied {
        collection: String,
        id: String,
        operation: &'static str,
    },
    /// Document not found.
    NotFound { collection: String, id: String },
    /// Serialization/deserialization error.
    Serde(String),
    /// Storage-level error.
    Storage(String),
}

impl StoreError {
    /// Whether retrying after a fresh read could succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::ConcurrencyConflict { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ConcurrencyConflict {
                collection,
                id,
                expected,
                actual,
            } => write!(
                f,
                "concurrency conflict on {}:{} (expected version {}, actual {})",
                collection, id, expected, actual
            ),
            StoreError::PermissionDenied {
                collection,
                id,
                operation,
            } => write!(f, "permission denied: {} on {}:{}", operation, collection, id),
            StoreError::NotFound { collection, id } => {
                write!(f, "document not found: {}:{}", collection, id)
            }
            StoreError::Serde(msg) => write!(f, "document serialization error: {}", msg),
            StoreError::Storage(msg) => write!(f, "document storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Error type for the player-facing client operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The underlying store operation failed.
    Store(StoreError),
    /// The operation needs a signed-in player.
    NotSignedIn,
    /// The player has no score record.
    MissingScoreRecord { owner: String },
    /// Another player already uses this username.
    UsernameTaken { username: String },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Store(e) => write!(f, "store error: {}", e),
            ClientError::NotSignedIn => write!(f, "no player is signed in"),
            ClientError::MissingScoreRecord { owner } => {
                write!(f, "player {} has no score record", owner)
            }
            ClientError::UsernameTaken { username } => {
                write!(f, "username already taken: {}", username)
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ClientError {
    fn from(err: StoreError) -> Self {
        ClientError::Store(err)
    }
}
