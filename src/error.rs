//! Error types for the style cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for storage, registry and cookie operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The backing store rejected a write because it is full
    #[error("Storage quota exceeded writing {0}")]
    QuotaExceeded(String),

    /// No value stored under the given storage key
    #[error("Key not found: {0}")]
    Missing(String),

    /// A stored value could not be parsed
    #[error("Corrupt payload for {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Writing the name registry failed
    #[error("Failed to persist name registry: {0}")]
    RegistryPersist(String),

    /// The cookie jar refused the finalized cookie
    #[error("Cookie write failed: {0}")]
    CookieWrite(String),
}

// == Error Kind ==
/// Discriminant used by the controller to branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    QuotaExceeded,
    Missing,
    Corrupt,
    RegistryPersist,
    CookieWrite,
}

impl CacheError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CacheError::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            CacheError::Missing(_) => ErrorKind::Missing,
            CacheError::Corrupt { .. } => ErrorKind::Corrupt,
            CacheError::RegistryPersist(_) => ErrorKind::RegistryPersist,
            CacheError::CookieWrite(_) => ErrorKind::CookieWrite,
        }
    }

    /// True for `Missing` and `Corrupt`, the failures a restore can hit.
    pub fn is_read_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::Missing | ErrorKind::Corrupt)
    }
}

// == Result Type Alias ==
/// Convenience Result type for the style cache.
pub type Result<T> = std::result::Result<T, CacheError>;
