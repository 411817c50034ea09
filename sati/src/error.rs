//! Error types for sati.
//!
//! Only fatal conditions are represented here. A PDF entry that cannot be
//! opened with the supplied password is not an error of the run: it is
//! reported as [`crate::io::SkipReason`] inside a
//! [`crate::io::DecryptResult::Skipped`] and processing continues.
//!
//! # Error Categories
//!
//! - **Input errors**: archive missing, not a file, not a valid ZIP
//! - **Output errors**: output directory missing or read-only, write failures
//! - **Merge errors**: nothing to merge, broken page tree
//! - **Configuration errors**: conflicting or invalid options

use std::io;
use std::path::PathBuf;

/// Result type alias for sati operations.
pub type Result<T> = std::result::Result<T, SatiError>;

/// Fatal errors that abort a decode-and-merge run.
#[derive(Debug, thiserror::Error)]
pub enum SatiError {
    /// The ZIP archive does not exist.
    #[error("Archive not found: {}", path.display())]
    ArchiveNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The archive path exists but cannot be opened.
    #[error("Cannot access archive: {}\n  Reason: {source}", path.display())]
    ArchiveNotAccessible {
        /// Path to the archive.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The archive path points at something other than a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// The file is not a readable ZIP archive.
    #[error("Invalid or corrupt ZIP archive: {}\n  Reason: {reason}", path.display())]
    InvalidArchive {
        /// Path to the archive.
        path: PathBuf,
        /// Reason reported by the ZIP reader.
        reason: String,
    },

    /// The output location cannot receive the merged document.
    #[error("Output path is not writable: {}\n  Reason: {reason}", path.display())]
    OutputNotWritable {
        /// Path to the output file.
        path: PathBuf,
        /// Why the location was rejected.
        reason: String,
    },

    /// Failed to create the output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write the output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// No entry of the archive could contribute pages.
    #[error(
        "Nothing to merge in {}: {skipped} of {seen} PDF entr{} skipped\n  \
         Use --on-empty write-empty to produce an empty document instead",
        archive.display(),
        if *seen == 1 { "y" } else { "ies" }
    )]
    NothingToMerge {
        /// Path to the archive.
        archive: PathBuf,
        /// Number of PDF entries found.
        seen: usize,
        /// Number of PDF entries skipped.
        skipped: usize,
    },

    /// Merge operation failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<anyhow::Error> for SatiError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(format!("{err:#}"))
    }
}

impl SatiError {
    /// Create an ArchiveNotFound error.
    pub fn archive_not_found(path: PathBuf) -> Self {
        Self::ArchiveNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an InvalidArchive error.
    pub fn invalid_archive(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::InvalidArchive {
            path,
            reason: reason.into(),
        }
    }

    /// Create an OutputNotWritable error.
    pub fn output_not_writable(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::OutputNotWritable {
            path,
            reason: reason.into(),
        }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error stems from the inputs rather than the output side.
    ///
    /// Input errors are raised before any output is attempted.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::ArchiveNotFound { .. }
                | Self::ArchiveNotAccessible { .. }
                | Self::NotAFile { .. }
                | Self::InvalidArchive { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ArchiveNotFound { .. } => 2,
            Self::ArchiveNotAccessible { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::InvalidArchive { .. } => 3,
            Self::NothingToMerge { .. } => 4,
            Self::OutputNotWritable { .. } => 5,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::MergeFailed { .. } => 6,
            Self::InvalidConfig { .. } => 1,
            Self::Other { .. } => 1,
        }
    }
}
