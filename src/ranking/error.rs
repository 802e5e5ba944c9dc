use std::error::Error;
use std::fmt;

use crate::error::StoreError;

/// Error type for a recalculation pass.
///
/// Only a failed read aborts a pass. Failed corrective writes are reported
/// in the `PassReport` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecalcError {
    /// The full ordered scan of score records failed; nothing was written.
    Read(StoreError),
}

impl fmt::Display for RecalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecalcError::Read(e) => write!(f, "reading score records failed: {}", e),
        }
    }
}

impl Error for RecalcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RecalcError::Read(e) => Some(e),
        }
    }
}
