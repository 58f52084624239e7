use std::path::PathBuf;

use thiserror::Error;

/// Process exit code when the office application cannot be started.
pub const EXIT_SESSION_UNAVAILABLE: i32 = 1001;
/// Process exit code when the source path is empty or does not exist.
pub const EXIT_SOURCE_MISSING: i32 = 1002;
/// Process exit code when a document failed to convert.
pub const EXIT_CONVERSION_FAILED: i32 = 1003;

/// Errors that can occur while resolving or converting documents.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("source path missing")]
    SourcePathMissing,

    #[error("source path not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("invalid include filter: {0}")]
    InvalidFilter(String),

    #[error("unsupported target format: {0}")]
    UnsupportedFormat(String),

    #[error("office application unavailable: {0}")]
    SessionUnavailable(String),

    #[error("failed to open {}: {message}", path.display())]
    Open { path: PathBuf, message: String },

    #[error("failed to save {}: {message}", path.display())]
    Save { path: PathBuf, message: String },

    #[error("destination equals source: {}", .0.display())]
    SamePath(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Process exit code the CLI reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SessionUnavailable(_) => EXIT_SESSION_UNAVAILABLE,
            Self::SourcePathMissing | Self::SourceNotFound(_) => EXIT_SOURCE_MISSING,
            Self::Open { .. } | Self::Save { .. } | Self::SamePath(_) | Self::Io(_) => {
                EXIT_CONVERSION_FAILED
            }
            Self::InvalidFilter(_) | Self::UnsupportedFormat(_) => 1,
        }
    }

    /// Whether the error belongs to a single document rather than the whole run.
    ///
    /// Only these are skipped when the run continues on error.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::Open { .. } | Self::Save { .. } | Self::SamePath(_) | Self::Io(_)
        )
    }
}
