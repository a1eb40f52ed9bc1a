//! 7z archive source backed by `sevenz-rust2`.
//!
//! The header is parsed once on open. Entries are converted into the
//! driver's [`ArchiveEntry`] form and each file with data is mapped to its
//! block and its offset inside the decoded block, so the driver can decode
//! a solid block once and slice every file out of it.
//!
//! # Examples
//!
//! ```no_run
//! use szx_core::source::ArchiveSource;
//! use szx_core::source::SevenZSource;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = BufReader::new(File::open("archive.7z")?);
//! let source = SevenZSource::open(file)?;
//! println!("{} entries", source.entries().len());
//! # Ok::<(), szx_core::ExtractionError>(())
//! ```

use std::io;
use std::io::Read;
use std::io::Seek;

use sevenz_rust2::Archive;
use sevenz_rust2::BlockDecoder;
use sevenz_rust2::Password;

use super::ArchiveEntry;
use super::ArchiveSource;
use super::BlockLocation;
use crate::ExtractionError;
use crate::Result;

/// 7z archive opened for block-level decoding.
///
/// Encrypted archives are rejected when the header is read.
pub struct SevenZSource<R: Read + Seek> {
    reader: R,
    archive: Archive,
    password: Password,
    entries: Vec<ArchiveEntry>,
    locations: Vec<Option<BlockLocation>>,
    block_sizes: Vec<u64>,
}

impl<R: Read + Seek> std::fmt::Debug for SevenZSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SevenZSource")
            .field("entries", &self.entries.len())
            .field("blocks", &self.block_sizes.len())
            .field("is_solid", &self.archive.is_solid)
            .finish_non_exhaustive()
    }
}

impl<R: Read + Seek> SevenZSource<R> {
    /// Reads the archive header and builds the file table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` for a bad signature, a bad header CRC,
    /// truncated structures or an encrypted header.
    pub fn open(mut reader: R) -> Result<Self> {
        let password = Password::empty();
        let archive = Archive::read(&mut reader, &password).map_err(|e| {
            if let Some(io_err) = stream_failure(&e) {
                return ExtractionError::Io(io_err);
            }
            let msg = e.to_string();
            let lower = msg.to_lowercase();
            if lower.contains("encrypt") || lower.contains("password") {
                return ExtractionError::InvalidArchive(
                    "encrypted 7z archives are not supported".into(),
                );
            }
            ExtractionError::InvalidArchive(format!("failed to open 7z archive: {msg}"))
        })?;

        let entries: Vec<ArchiveEntry> = archive
            .files
            .iter()
            .map(|e| ArchiveEntry {
                name: e.name.encode_utf16().collect(),
                is_dir: e.is_directory(),
                size: e.size,
                attributes: e.has_windows_attributes.then_some(e.windows_attributes),
                modified: e
                    .has_last_modified_date
                    .then(|| u64::from(e.last_modified_date)),
                crc: e.has_crc.then_some(e.crc as u32),
            })
            .collect();

        let (locations, block_sizes) = map_blocks(&archive, &entries)?;

        tracing::debug!(
            entries = entries.len(),
            blocks = block_sizes.len(),
            solid = archive.is_solid,
            "parsed 7z header"
        );

        Ok(Self {
            reader,
            archive,
            password,
            entries,
            locations,
            block_sizes,
        })
    }
}

/// Assigns every file with data its block and offset.
///
/// Files of one block are stored consecutively, so offsets are running
/// sums of sizes that reset whenever the block index changes.
fn map_blocks(
    archive: &Archive,
    entries: &[ArchiveEntry],
) -> Result<(Vec<Option<BlockLocation>>, Vec<u64>)> {
    let mut locations = Vec::with_capacity(entries.len());
    let mut block_sizes = vec![0u64; archive.blocks.len()];

    for (index, entry) in entries.iter().enumerate() {
        let block = archive
            .stream_map
            .file_block_index
            .get(index)
            .copied()
            .flatten();
        let Some(block) = block.filter(|_| !entry.is_dir) else {
            locations.push(None);
            continue;
        };
        let size_slot = block_sizes.get_mut(block).ok_or_else(|| {
            ExtractionError::InvalidArchive(format!("entry {index} refers to missing block {block}"))
        })?;

        let offset = usize::try_from(*size_slot).map_err(|_| oversized(index))?;
        let len = usize::try_from(entry.size).map_err(|_| oversized(index))?;
        *size_slot = size_slot
            .checked_add(entry.size)
            .ok_or_else(|| oversized(index))?;

        locations.push(Some(BlockLocation { block, offset, len }));
    }

    Ok((locations, block_sizes))
}

/// Whether an I/O error came from the underlying stream rather than from
/// decoding its bytes.
///
/// Decoders report bad data as `InvalidData`, truncation as `UnexpectedEof`
/// and CRC failures as `Other` without an OS code; those stay format errors.
fn is_stream_failure(err: &io::Error) -> bool {
    err.raw_os_error().is_some()
        || !matches!(
            err.kind(),
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof | io::ErrorKind::Other
        )
}

/// Finds a stream failure in the source chain of a decoder error.
fn stream_failure(err: &sevenz_rust2::Error) -> Option<io::Error> {
    let mut source: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(err);
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<io::Error>()
            && is_stream_failure(io_err)
        {
            return Some(match io_err.raw_os_error() {
                Some(code) => io::Error::from_raw_os_error(code),
                None => io::Error::new(io_err.kind(), io_err.to_string()),
            });
        }
        source = inner.source();
    }
    None
}

fn oversized(index: usize) -> ExtractionError {
    ExtractionError::InvalidArchive(format!("entry {index} does not fit in memory"))
}

impl<R: Read + Seek> ArchiveSource for SevenZSource<R> {
    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    fn block_location(&self, index: usize) -> Option<BlockLocation> {
        self.locations.get(index).copied().flatten()
    }

    fn decode_block(&mut self, block: usize, out: &mut Vec<u8>) -> Result<()> {
        self.reader.rewind()?;
        let mut read_error: Option<io::Error> = None;
        let decoder = BlockDecoder::new(1, block, &self.archive, &self.password, &mut self.reader);
        let result = decoder.for_each_entries(&mut |_entry, data| {
            if let Err(e) = data.read_to_end(out) {
                let reason = e.to_string();
                read_error = Some(e);
                return Err(sevenz_rust2::Error::Other(reason.into()));
            }
            Ok(true)
        });

        let Err(e) = result else {
            return Ok(());
        };
        if let Some(io_err) = read_error.filter(is_stream_failure) {
            return Err(ExtractionError::Io(io_err));
        }
        if let Some(io_err) = stream_failure(&e) {
            return Err(ExtractionError::Io(io_err));
        }
        Err(ExtractionError::CorruptBlock {
            block,
            reason: e.to_string(),
        })
    }

    fn block_size(&self, block: usize) -> Option<u64> {
        self.block_sizes.get(block).copied()
    }

    fn format_name(&self) -> &str {
        "7z"
    }
}
