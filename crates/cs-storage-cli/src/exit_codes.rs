//! Exit codes for the cs-storage CLI.
//!
//! Exit code ranges:
//! - 0: success
//! - 10-19: input/environment errors (recoverable by the caller)
//! - 20-29: internal errors

use cs_storage::StorageError;

/// Exit codes for cs-storage operations. Stable for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Invalid arguments or input document
    InvalidInput = 10,

    /// Archive or member not found
    NotFound = 11,

    /// Archive content does not match its manifest
    CorruptArchive = 12,

    /// No blob store configured for an operation that needs one
    ConfigError = 13,

    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Success => "OK",
            ExitCode::InvalidInput => "ERR_INPUT",
            ExitCode::NotFound => "ERR_NOT_FOUND",
            ExitCode::CorruptArchive => "ERR_CORRUPT",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<&StorageError> for ExitCode {
    fn from(err: &StorageError) -> Self {
        match err {
            StorageError::Validation(_)
            | StorageError::DuplicateFilename { .. }
            | StorageError::InvalidKey(_)
            | StorageError::Json(_) => ExitCode::InvalidInput,
            StorageError::BlobNotFound(_) | StorageError::MissingMember(_) => ExitCode::NotFound,
            StorageError::Decode { .. } | StorageError::Zip(_) => ExitCode::CorruptArchive,
            StorageError::StoreUnavailable => ExitCode::ConfigError,
            StorageError::Io(_) => ExitCode::IoError,
            StorageError::UnknownMediaType(_) | StorageError::Encode { .. } => {
                ExitCode::InternalError
            }
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
