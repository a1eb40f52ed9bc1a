//! Error types for archive extraction operations.

use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Coarse classification of an [`ExtractionError`].
///
/// Every failure the driver can report falls into exactly one of these
/// three kinds, which is what callers that only need a status code match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Stream open, read, write or close failure.
    Io,
    /// Allocation failure for the file table, buffers or block cache.
    Memory,
    /// Corrupt archive structure, bad checksum, malformed name or short
    /// write.
    Format,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io => f.write_str("I/O error"),
            Self::Memory => f.write_str("memory error"),
            Self::Format => f.write_str("format error"),
        }
    }
}

/// Errors that can occur while extracting, listing or verifying an archive.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A buffer could not be grown.
    #[error("out of memory: {0}")]
    Memory(#[from] TryReserveError),

    /// Archive headers are corrupted or invalid.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Entry name is not valid UTF-16.
    #[error("malformed name for entry {index} at code unit {position}")]
    InvalidName {
        /// Index of the entry in the file table.
        index: usize,
        /// Position of the offending code unit.
        position: usize,
    },

    /// A compressed block failed to decode.
    #[error("corrupt block {block}: {reason}")]
    CorruptBlock {
        /// Index of the block.
        block: usize,
        /// Decoder message.
        reason: String,
    },

    /// Decoded data does not match the stored CRC.
    #[error("CRC mismatch for entry {index}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Index of the entry in the file table.
        index: usize,
        /// CRC stored in the archive.
        expected: u32,
        /// CRC of the decoded data.
        actual: u32,
    },

    /// Fewer bytes were written than were decoded.
    #[error("short write to {path}: wrote {written} of {expected} bytes")]
    ShortWrite {
        /// Destination file.
        path: PathBuf,
        /// Number of bytes decoded for the entry.
        expected: u64,
        /// Number of bytes the destination accepted.
        written: u64,
    },

    /// Entry name escapes the output directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry name.
        path: PathBuf,
    },
}

impl ExtractionError {
    /// Returns the coarse kind of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use szx_core::ErrorKind;
    /// use szx_core::ExtractionError;
    ///
    /// let err = ExtractionError::InvalidArchive("bad signature".to_string());
    /// assert_eq!(err.kind(), ErrorKind::Format);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Memory(_) => ErrorKind::Memory,
            Self::InvalidArchive(_)
            | Self::InvalidName { .. }
            | Self::CorruptBlock { .. }
            | Self::ChecksumMismatch { .. }
            | Self::ShortWrite { .. }
            | Self::PathTraversal { .. } => ErrorKind::Format,
        }
    }

    /// Returns `true` if the archive itself is damaged, as opposed to the
    /// environment failing around it.
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::InvalidArchive(_) | Self::CorruptBlock { .. } | Self::ChecksumMismatch { .. }
        )
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use szx_core::ExtractionError;
    ///
    /// let err = ExtractionError::InvalidArchive("bad header".to_string());
    /// assert_eq!(err.context(), Some("bad header"));
    ///
    /// let err = ExtractionError::Io(std::io::Error::other("gone"));
    /// assert_eq!(err.context(), None);
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidArchive(msg) => Some(msg),
            Self::CorruptBlock { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
