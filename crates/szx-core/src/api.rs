//! High-level public API: one call per operation on a 7z file.

use std::path::Path;

use crate::ExtractOptions;
use crate::ExtractionReport;
use crate::ListOptions;
use crate::ListSummary;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::VerifyReport;
use crate::driver::Session;
use crate::fs::HostFs;

/// Extracts a 7z archive.
///
/// Entries are written below `options.output_dir`, which must exist.
///
/// # Arguments
///
/// * `archive_path` - Path to the archive file
/// * `options` - Destination and path handling
///
/// # Errors
///
/// Returns an error if:
/// - The archive file cannot be opened (`Io`)
/// - The header or a block is corrupt, or a CRC does not match (`Format`)
/// - A buffer cannot be allocated (`Memory`)
/// - A directory or file cannot be created or written (`Io`)
///
/// # Examples
///
/// ```no_run
/// use szx_core::ExtractOptions;
/// use szx_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract_archive("archive.7z", &ExtractOptions::new("/tmp/output"))?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>>(
    archive_path: P,
    options: &ExtractOptions,
) -> Result<ExtractionReport> {
    let mut progress = NoopProgress;
    extract_archive_with_progress(archive_path, options, &mut progress)
}

/// Extracts a 7z archive, reporting progress per entry.
///
/// # Errors
///
/// See [`extract_archive`].
///
/// # Examples
///
/// ```no_run
/// use szx_core::ExtractOptions;
/// use szx_core::NoopProgress;
/// use szx_core::extract_archive_with_progress;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut progress = NoopProgress;
/// let report =
///     extract_archive_with_progress("archive.7z", &ExtractOptions::default(), &mut progress)?;
/// println!("Wrote {} bytes", report.bytes_written);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive_with_progress<P: AsRef<Path>>(
    archive_path: P,
    options: &ExtractOptions,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let mut session = Session::open(archive_path.as_ref())?;
    session.extract(&mut HostFs, options, progress)
}

/// Lists a 7z archive into `buf`.
///
/// One line per entry is written while it fits; lines that do not fit are
/// dropped. Only `buf[..summary.bytes_used]` is meaningful afterwards.
///
/// # Errors
///
/// Returns `Io` if the archive cannot be opened, `InvalidArchive` if its
/// header is corrupt and `InvalidName` for a malformed entry name.
///
/// # Examples
///
/// ```no_run
/// use szx_core::ListOptions;
/// use szx_core::list_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut buf = vec![0u8; 64 * 1024];
/// let summary = list_archive("archive.7z", &mut buf, &ListOptions::default())?;
/// print!("{}", String::from_utf8_lossy(&buf[..summary.bytes_used]));
/// # Ok(())
/// # }
/// ```
pub fn list_archive<P: AsRef<Path>>(
    archive_path: P,
    buf: &mut [u8],
    options: &ListOptions,
) -> Result<ListSummary> {
    let mut session = Session::open(archive_path.as_ref())?;
    session.list(buf, options)
}

/// Decodes every file of a 7z archive and checks its CRC.
///
/// # Errors
///
/// Returns `Io` if the archive cannot be opened and a `Format` kind error
/// for any corrupt block or checksum mismatch.
///
/// # Examples
///
/// ```no_run
/// use szx_core::verify_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = verify_archive("archive.7z")?;
/// println!("{} files OK", report.files_verified);
/// # Ok(())
/// # }
/// ```
pub fn verify_archive<P: AsRef<Path>>(archive_path: P) -> Result<VerifyReport> {
    let mut session = Session::open(archive_path.as_ref())?;
    session.verify()
}
