//! Error types for storage operations.

use crate::media::{CodecError, MediaType};
use crate::validate::ValidationError;
use thiserror::Error;

/// Errors that can occur while writing or reading task results.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Input did not match the expected result shape
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Media type tag outside the supported set
    #[error("unknown media type: {0}")]
    UnknownMediaType(String),

    /// Two outputs of one category resolve to the same archive member
    #[error("duplicate archive member '{filename}' (titles '{first_title}' and '{title}')")]
    DuplicateFilename {
        filename: String,
        first_title: String,
        title: String,
    },

    /// Archive key not present in the blob store
    #[error("blob not found: {0}")]
    BlobNotFound(String),

    /// Manifest names a member the archive does not contain
    #[error("archive member not found: {0}")]
    MissingMember(String),

    /// Output data could not be encoded for its media type
    #[error("cannot encode '{title}' as {media_type}: {source}")]
    Encode {
        title: String,
        media_type: MediaType,
        #[source]
        source: CodecError,
    },

    /// Member bytes do not match the encoding of the declared media type
    #[error("cannot decode '{filename}' as {media_type}: {source}")]
    Decode {
        filename: String,
        media_type: MediaType,
        #[source]
        source: CodecError,
    },

    /// Blob key is not usable by the store
    #[error("invalid blob key: {0}")]
    InvalidKey(String),

    /// Operation needs a blob store but none is configured
    #[error("no blob store configured (set a bucket or disable upload)")]
    StoreUnavailable,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    /// Stable error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            StorageError::Validation(e) => e.code(),
            StorageError::UnknownMediaType(_) => 70,
            StorageError::DuplicateFilename { .. } => 71,
            StorageError::BlobNotFound(_) => 72,
            StorageError::MissingMember(_) => 73,
            StorageError::Encode { .. } => 74,
            StorageError::Decode { .. } => 75,
            StorageError::InvalidKey(_) => 76,
            StorageError::StoreUnavailable => 77,
            StorageError::Io(_) => 80,
            StorageError::Zip(_) => 81,
            StorageError::Json(_) => 82,
        }
    }
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
