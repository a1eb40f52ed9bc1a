//! Error conversion utilities for CLI.
//!
//! Converts szx-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use std::path::Path;
use szx_core::ExtractionError;

/// Converts `ExtractionError` to user-friendly anyhow error with context
pub fn convert_extraction_error(err: ExtractionError, archive: &Path) -> anyhow::Error {
    match err {
        ExtractionError::PathTraversal { path } => {
            anyhow!(
                "Archive '{}' contains an entry escaping the output directory: '{}'\n\
                 HINT: Use --flat to extract file names without their directories.",
                archive.display(),
                path.display()
            )
        }
        ExtractionError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                archive.display(),
                io_err
            )
        }
        ExtractionError::Memory(reserve_err) => {
            anyhow!(
                "Out of memory while processing '{}': {}\n\
                 HINT: The archive may contain a block larger than available memory.",
                archive.display(),
                reserve_err
            )
        }
        ExtractionError::InvalidArchive(reason) => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: The archive may be corrupted, encrypted or not a 7z file.",
                archive.display(),
                reason
            )
        }
        ExtractionError::CorruptBlock { block, reason } => {
            anyhow!(
                "Data error in '{}', block {}: {}\n\
                 HINT: The archive is damaged. Run 'szx verify' to check it.",
                archive.display(),
                block,
                reason
            )
        }
        ExtractionError::ChecksumMismatch {
            index,
            expected,
            actual,
        } => {
            anyhow!(
                "CRC failed in '{}' for entry {}: expected {:08X}, got {:08X}\n\
                 HINT: The archive is damaged.",
                archive.display(),
                index,
                expected,
                actual
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, ExtractionError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, archive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_path_traversal_error() {
        let err = ExtractionError::PathTraversal {
            path: PathBuf::from("../../../etc/passwd"),
        };
        let converted = convert_extraction_error(err, Path::new("malicious.7z"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("escaping the output directory"));
        assert!(msg.contains("malicious.7z"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_checksum_error() {
        let err = ExtractionError::ChecksumMismatch {
            index: 3,
            expected: 0xCBF4_3926,
            actual: 0x1234_5678,
        };
        let converted = convert_extraction_error(err, Path::new("broken.7z"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("CRC failed"));
        assert!(msg.contains("CBF43926"));
    }

    #[test]
    fn test_convert_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ExtractionError::Io(io_err);
        let converted = convert_extraction_error(err, Path::new("archive.7z"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
    }

    #[test]
    fn test_other_errors_keep_source() {
        let err = ExtractionError::InvalidName {
            index: 1,
            position: 4,
        };
        let converted = convert_extraction_error(err, Path::new("names.7z"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("names.7z"));
        assert!(msg.contains("malformed name"));
    }
}
