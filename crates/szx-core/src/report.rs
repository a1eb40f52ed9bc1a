//! Operation reports and progress callbacks.

use std::path::Path;
use std::time::Duration;

/// Report of an archive extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of files written.
    pub files_extracted: usize,

    /// Number of directory entries created. Zero when flattening.
    pub directories_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Number of compressed blocks decoded.
    pub blocks_decoded: usize,

    /// Duration of the extraction.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries materialized on disk.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }
}

/// Outcome of a list operation.
///
/// The report text itself lives in the caller's buffer; this records how
/// much of it was used and how many lines did not fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListSummary {
    /// Bytes of the buffer holding complete lines.
    pub bytes_used: usize,

    /// Number of lines written.
    pub lines_written: usize,

    /// Number of lines dropped for lack of space.
    pub lines_dropped: usize,
}

impl ListSummary {
    /// Returns `true` if every entry made it into the buffer.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.lines_dropped == 0
    }
}

/// Report of a verify (test) operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Number of file entries whose data decoded and matched its CRC.
    pub files_verified: usize,

    /// Total decoded bytes checked.
    pub bytes_verified: u64,

    /// Number of compressed blocks decoded.
    pub blocks_decoded: usize,
}

/// Callback trait for progress reporting during extraction.
///
/// The trait requires `Send` so an implementation can be handed to a
/// worker thread together with the session.
///
/// # Examples
///
/// ```
/// use szx_core::ProgressCallback;
/// use std::path::Path;
///
/// struct SimpleProgress;
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
///         println!("Processing {}/{}: {}", current, total, path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, path: &Path) {
///         println!("Completed: {}", path.display());
///     }
///
///     fn on_complete(&mut self) {
///         println!("Extraction complete");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called when starting to process an entry.
    ///
    /// # Arguments
    ///
    /// * `path` - Stored name of the entry
    /// * `total` - Total number of entries in the archive
    /// * `current` - Current entry number (1-indexed)
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called after bytes of the current entry are written.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called when an entry has been completely processed.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once after the last entry.
    fn on_complete(&mut self);
}

/// `ProgressCallback` that does nothing.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
