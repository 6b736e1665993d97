//! Error types for tag documents.

use thiserror::Error;

/// Errors raised while reading or encoding a [`CompoundTag`](crate::tag::CompoundTag).
#[derive(Debug, Error)]
pub enum TagError {
    /// Key not present in the document
    #[error("Missing tag entry: {0}")]
    Missing(String),

    /// Entry exists but holds another kind of value
    #[error("Tag entry {key} is {found}, expected {expected}")]
    WrongType {
        /// Entry key
        key: String,
        /// Expected kind
        expected: &'static str,
        /// Kind actually stored
        found: &'static str,
    },

    /// Numeric value does not fit the requested type
    #[error("Tag entry {key} out of range: {value}")]
    OutOfRange {
        /// Entry key
        key: String,
        /// Stored value
        value: i64,
    },

    /// Binary or JSON encoding failure
    #[error("Tag encoding error: {0}")]
    Encoding(String),

    /// Buffer does not start with the tag magic bytes
    #[error("Invalid tag document format")]
    InvalidFormat,

    /// Schema version mismatch
    #[error("Tag schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Actual version found
        actual: String,
    },
}

/// Result type alias for tag operations.
pub type TagResult<T> = Result<T, TagError>;
