//! Extraction session: one pass over the file table in archive order.
//!
//! A [`Session`] owns the archive source, the block cache and the name
//! scratch buffer. Each operation walks every entry once:
//!
//! - [`extract`](Session::extract) writes files and directories through a
//!   [`FileSystem`]
//! - [`list`](Session::list) renders one tab-separated line per entry into a
//!   caller-owned buffer, without decoding anything
//! - [`verify`](Session::verify) decodes every file and discards the bytes
//!
//! The first error aborts the operation. Files written before the error stay
//! on disk.

use std::fmt;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use crate::ExtractionError;
use crate::Result;
use crate::cache::DecodeCursor;
use crate::checksum;
use crate::codec::CodecError;
use crate::codec::TranscodeBuffer;
use crate::codec::Utf8Codec;
use crate::config::ExtractOptions;
use crate::config::ListOptions;
use crate::format;
use crate::format::AttributeStyle;
use crate::fs::FileSystem;
use crate::fs::ensure_dir;
use crate::path::VirtualPath;
use crate::report::ExtractionReport;
use crate::report::ListSummary;
use crate::report::ProgressCallback;
use crate::report::VerifyReport;
use crate::source::ArchiveEntry;
use crate::source::ArchiveSource;
use crate::source::SevenZSource;

/// Read buffer size for archive input.
pub const INPUT_BUF_SIZE: usize = 1 << 18;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The archive file is being opened.
    Opening,
    /// The file table is parsed and buffers are ready.
    Initialized,
    /// Walking the file table.
    Iterating,
    /// Writing entries to the filesystem.
    Extracting,
    /// Rendering the list report.
    Listing,
    /// Decoding entries without output.
    Verifying,
    /// The last operation finished successfully.
    Closed,
    /// The last operation failed.
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Opening => "opening",
            Self::Initialized => "initialized",
            Self::Iterating => "iterating",
            Self::Extracting => "extracting",
            Self::Listing => "listing",
            Self::Verifying => "verifying",
            Self::Closed => "closed",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Caller-owned report buffer with a write cursor.
///
/// Only whole lines are appended. A line that does not fit in the space
/// left is dropped and the cursor stays where it was.
#[derive(Debug)]
pub struct ReportBuffer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ReportBuffer<'a> {
    /// Wraps `buf` with the cursor at its start.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Appends `line` if it fits completely. Returns whether it did.
    ///
    /// # Examples
    ///
    /// ```
    /// use szx_core::driver::ReportBuffer;
    ///
    /// let mut storage = [0u8; 8];
    /// let mut report = ReportBuffer::new(&mut storage);
    /// assert!(report.try_append(b"abcd\n"));
    /// assert!(!report.try_append(b"efgh\n"));
    /// assert_eq!(report.as_bytes(), b"abcd\n");
    /// ```
    pub fn try_append(&mut self, line: &[u8]) -> bool {
        let Some(end) = self.pos.checked_add(line.len()) else {
            return false;
        };
        match self.buf.get_mut(self.pos..end) {
            Some(dest) => {
                dest.copy_from_slice(line);
                self.pos = end;
                true
            }
            None => false,
        }
    }

    /// Bytes written so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Space left.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// The complete lines written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

/// One driver invocation over an archive source.
///
/// The block cache and name buffer are reused across entries and released
/// when the session is dropped.
///
/// # Examples
///
/// ```
/// use szx_core::ListOptions;
/// use szx_core::driver::Session;
/// use szx_core::test_utils::MemoryArchive;
///
/// let archive = MemoryArchive::builder().file("hello.txt", b"hi").build();
/// let mut session = Session::new(archive);
///
/// let mut buf = vec![0u8; 256];
/// let summary = session.list(&mut buf, &ListOptions::default())?;
/// assert_eq!(summary.lines_written, 1);
/// # Ok::<(), szx_core::ExtractionError>(())
/// ```
#[derive(Debug)]
pub struct Session<S: ArchiveSource> {
    source: S,
    cursor: DecodeCursor,
    names: TranscodeBuffer,
    state: SessionState,
}

impl Session<SevenZSource<BufReader<File>>> {
    /// Opens and parses the 7z archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be opened and `InvalidArchive` if its
    /// header cannot be parsed.
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!(state = %SessionState::Opening, path = %path.display(), "session state");
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(INPUT_BUF_SIZE, file);
        checksum::ensure_initialized();
        let source = SevenZSource::open(reader)?;
        Ok(Self::new(source))
    }
}

impl<S: ArchiveSource> Session<S> {
    /// Starts a session over an already parsed source.
    pub fn new(source: S) -> Self {
        let session = Self {
            source,
            cursor: DecodeCursor::new(),
            names: TranscodeBuffer::new(),
            state: SessionState::Initialized,
        };
        tracing::debug!(
            state = %session.state,
            format = session.source.format_name(),
            entries = session.source.entries().len(),
            "session state"
        );
        session
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The underlying source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Ends the session and returns the source.
    #[must_use]
    pub fn into_source(self) -> S {
        self.source
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = %self.state, to = %next, "session state");
        self.state = next;
    }

    fn begin(&mut self, mode: SessionState) {
        self.transition(SessionState::Iterating);
        self.transition(mode);
    }

    fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.transition(SessionState::Closed),
            Err(e) => {
                tracing::debug!(error = %e, kind = %e.kind(), "operation failed");
                self.transition(SessionState::Error);
            }
        }
        result
    }

    /// Extracts every entry below `options.output_dir`.
    ///
    /// # Errors
    ///
    /// Returns the first decode, name, filesystem or write failure.
    pub fn extract<F: FileSystem + ?Sized>(
        &mut self,
        fs: &mut F,
        options: &ExtractOptions,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        self.begin(SessionState::Extracting);
        let result = self.extract_entries(fs, options, progress);
        self.finish(result)
    }

    fn extract_entries<F: FileSystem + ?Sized>(
        &mut self,
        fs: &mut F,
        options: &ExtractOptions,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let start = Instant::now();
        let decoded_before = self.cursor.blocks_decoded();
        let mut report = ExtractionReport::new();
        let total = self.source.entries().len();

        for index in 0..total {
            let Some(entry) = self.source.entries().get(index) else {
                break;
            };
            let is_dir = entry.is_dir;
            let attributes = entry.attributes;
            let label = PathBuf::from(entry.display_name());

            if is_dir {
                if !options.preserve_full_paths {
                    tracing::trace!(index, "skipping directory while flattening");
                    continue;
                }
                progress.on_entry_start(&label, total, index + 1);
                let path = destination(&mut self.names, entry, index, options, fs)?;
                ensure_dir(fs, &path)?;
                report.directories_created += 1;
                progress.on_entry_complete(&label);
                continue;
            }

            progress.on_entry_start(&label, total, index + 1);
            let range = self.cursor.decode(&mut self.source, index)?;

            let Some(entry) = self.source.entries().get(index) else {
                break;
            };
            let path = destination(&mut self.names, entry, index, options, fs)?;
            tracing::trace!(index, path = %path.display(), len = range.len(), "writing file");

            let data = self.cursor.data(range);
            let mut file = fs.create_file(&path)?;
            write_exact(&mut file, data, &path)?;
            fs.close_file(file)?;

            if options.apply_attributes
                && let Some(attributes) = attributes
            {
                fs.set_attributes(&path, attributes)?;
            }

            report.files_extracted += 1;
            report.bytes_written += data.len() as u64;
            progress.on_bytes_written(data.len() as u64);
            progress.on_entry_complete(&label);
        }

        progress.on_complete();
        report.blocks_decoded = self.cursor.blocks_decoded() - decoded_before;
        report.duration = start.elapsed();
        tracing::debug!(
            files = report.files_extracted,
            directories = report.directories_created,
            bytes = report.bytes_written,
            blocks = report.blocks_decoded,
            "extraction complete"
        );
        Ok(report)
    }

    /// Renders one line per entry into `buf`.
    ///
    /// Each line is `timestamp \t attributes \t size \t name \n`, with 19
    /// spaces for a missing timestamp and an empty attribute column unless
    /// [`AttributeStyle::Windows`] is selected. Lines that do not fit are
    /// dropped; the returned summary says how many bytes are valid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` if a name cannot be converted and `Memory` if
    /// the line buffer cannot grow.
    pub fn list(&mut self, buf: &mut [u8], options: &ListOptions) -> Result<ListSummary> {
        self.begin(SessionState::Listing);
        let result = self.list_entries(buf, options);
        self.finish(result)
    }

    fn list_entries(&mut self, buf: &mut [u8], options: &ListOptions) -> Result<ListSummary> {
        let codec = options.code_page.codec();
        let capacity = buf.len();
        let mut report = ReportBuffer::new(buf);
        let mut summary = ListSummary::default();
        let mut line = Vec::new();

        for (index, entry) in self.source.entries().iter().enumerate() {
            line.clear();
            match entry.modified {
                Some(ticks) => line.extend_from_slice(format::filetime_to_string(ticks).as_bytes()),
                None => line.extend_from_slice(format::BLANK_TIMESTAMP.as_bytes()),
            }
            line.push(b'\t');
            if options.attribute_style == AttributeStyle::Windows {
                let attributes = entry.attributes.unwrap_or(0);
                line.extend_from_slice(format::attrib_string(attributes, entry.is_dir).as_bytes());
            }
            line.push(b'\t');
            line.extend_from_slice(format::u64_to_string(entry.size).as_bytes());
            line.push(b'\t');
            let name = self
                .names
                .encode(codec, &entry.name)
                .map_err(|e| name_error(index, e))?;
            line.try_reserve(name.len() + 1)?;
            line.extend_from_slice(name);
            line.push(b'\n');

            if report.try_append(&line) {
                summary.lines_written += 1;
            } else {
                tracing::trace!(index, len = line.len(), "report line dropped");
                summary.lines_dropped += 1;
            }
        }

        summary.bytes_used = report.position();
        if summary.lines_dropped > 0 {
            tracing::warn!(
                dropped = summary.lines_dropped,
                capacity,
                "report buffer too small, lines dropped"
            );
        }
        Ok(summary)
    }

    /// Decodes every file and checks it against its stored CRC.
    ///
    /// Nothing is written anywhere.
    ///
    /// # Errors
    ///
    /// Returns the first decode or checksum failure.
    pub fn verify(&mut self) -> Result<VerifyReport> {
        self.begin(SessionState::Verifying);
        let result = self.verify_entries();
        self.finish(result)
    }

    fn verify_entries(&mut self) -> Result<VerifyReport> {
        let decoded_before = self.cursor.blocks_decoded();
        let mut report = VerifyReport::default();

        for index in 0..self.source.entries().len() {
            if self.source.entries().get(index).is_none_or(|e| e.is_dir) {
                continue;
            }
            let range = self.cursor.decode(&mut self.source, index)?;
            tracing::trace!(index, len = range.len(), "verified entry");
            report.files_verified += 1;
            report.bytes_verified += range.len() as u64;
        }

        report.blocks_decoded = self.cursor.blocks_decoded() - decoded_before;
        Ok(report)
    }
}

/// Converts an entry name and resolves where it goes on disk.
fn destination<F: FileSystem + ?Sized>(
    names: &mut TranscodeBuffer,
    entry: &ArchiveEntry,
    index: usize,
    options: &ExtractOptions,
    fs: &mut F,
) -> Result<PathBuf> {
    let bytes = names
        .encode(&Utf8Codec, &entry.name)
        .map_err(|e| name_error(index, e))?;
    let name = std::str::from_utf8(bytes).map_err(|e| ExtractionError::InvalidName {
        index,
        position: e.valid_up_to(),
    })?;
    VirtualPath::parse(name)?.resolve(&options.output_dir, options.preserve_full_paths, fs)
}

fn name_error(index: usize, err: CodecError) -> ExtractionError {
    match err {
        CodecError::Malformed { position } => ExtractionError::InvalidName { index, position },
        CodecError::Memory(e) => ExtractionError::Memory(e),
    }
}

/// Writes all of `data`, treating a zero-length write as a short write.
fn write_exact<W: Write + ?Sized>(out: &mut W, data: &[u8], path: &Path) -> Result<()> {
    let mut written = 0;
    while written < data.len() {
        match out.write(&data[written..]) {
            Ok(0) => {
                return Err(ExtractionError::ShortWrite {
                    path: path.to_path_buf(),
                    expected: data.len() as u64,
                    written: written as u64,
                });
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
