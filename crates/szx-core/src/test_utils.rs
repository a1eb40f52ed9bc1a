//! Test utilities: an in-memory archive source.
//!
//! [`MemoryArchive`] implements [`ArchiveSource`] over blocks held in
//! memory, counts how often blocks are decoded and can be damaged on
//! purpose to exercise error paths.
//!
//! # Panics
//!
//! Builder methods may panic on out-of-range arguments since they are meant
//! for test code only.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use crate::ExtractionError;
use crate::Result;
use crate::checksum;
use crate::source::ArchiveEntry;
use crate::source::ArchiveSource;
use crate::source::BlockLocation;

/// In-memory archive with explicit block layout.
///
/// # Examples
///
/// ```
/// use szx_core::source::ArchiveSource;
/// use szx_core::test_utils::MemoryArchive;
///
/// let archive = MemoryArchive::builder()
///     .directory("docs")
///     .block(&[("docs/a.txt", b"one"), ("docs/b.txt", b"two")])
///     .build();
/// assert_eq!(archive.entries().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: Vec<ArchiveEntry>,
    locations: Vec<Option<BlockLocation>>,
    blocks: Vec<Vec<u8>>,
    corrupt: Vec<bool>,
    decode_calls: usize,
}

impl MemoryArchive {
    /// Starts building an archive.
    #[must_use]
    pub fn builder() -> MemoryArchiveBuilder {
        MemoryArchiveBuilder::default()
    }

    /// Number of `decode_block` calls so far.
    #[must_use]
    pub fn decode_calls(&self) -> usize {
        self.decode_calls
    }

    /// Makes every later decode of `block` fail.
    pub fn corrupt_block(&mut self, block: usize) {
        self.corrupt[block] = true;
    }

    /// Inverts one byte of a block so its CRC no longer matches.
    pub fn flip_byte(&mut self, block: usize, offset: usize) {
        self.blocks[block][offset] ^= 0xFF;
    }

    /// Shortens a block to `len` bytes.
    pub fn truncate_block(&mut self, block: usize, len: usize) {
        self.blocks[block].truncate(len);
    }
}

impl ArchiveSource for MemoryArchive {
    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    fn block_location(&self, index: usize) -> Option<BlockLocation> {
        self.locations.get(index).copied().flatten()
    }

    fn decode_block(&mut self, block: usize, out: &mut Vec<u8>) -> Result<()> {
        self.decode_calls += 1;
        if self.corrupt[block] {
            return Err(ExtractionError::CorruptBlock {
                block,
                reason: "data error".into(),
            });
        }
        out.extend_from_slice(&self.blocks[block]);
        Ok(())
    }

    fn block_size(&self, block: usize) -> Option<u64> {
        self.blocks.get(block).map(|b| b.len() as u64)
    }

    fn format_name(&self) -> &str {
        "memory"
    }
}

/// Builder for [`MemoryArchive`].
#[derive(Debug, Default)]
pub struct MemoryArchiveBuilder {
    archive: MemoryArchive,
}

impl MemoryArchiveBuilder {
    /// Adds one block holding `files` back to back.
    pub fn block(mut self, files: &[(&str, &[u8])]) -> Self {
        let block = self.archive.blocks.len();
        let mut data = Vec::new();
        for (name, bytes) in files {
            let mut entry = ArchiveEntry::file(name, bytes.len() as u64);
            entry.crc = Some(checksum::crc32(bytes));
            self.archive.entries.push(entry);
            self.archive.locations.push(Some(BlockLocation {
                block,
                offset: data.len(),
                len: bytes.len(),
            }));
            data.extend_from_slice(bytes);
        }
        self.archive.blocks.push(data);
        self.archive.corrupt.push(false);
        self
    }

    /// Adds a file with its own block.
    pub fn file(self, name: &str, data: &[u8]) -> Self {
        self.block(&[(name, data)])
    }

    /// Adds a zero-length file with no block.
    pub fn empty_file(self, name: &str) -> Self {
        self.entry(ArchiveEntry::file(name, 0))
    }

    /// Adds a directory entry.
    pub fn directory(self, name: &str) -> Self {
        self.entry(ArchiveEntry::directory(name))
    }

    /// Adds an entry without data, as given.
    pub fn entry(mut self, entry: ArchiveEntry) -> Self {
        self.archive.entries.push(entry);
        self.archive.locations.push(None);
        self
    }

    /// Adjusts the most recently added entry.
    pub fn with_last(mut self, f: impl FnOnce(&mut ArchiveEntry)) -> Self {
        f(self.archive.entries.last_mut().unwrap());
        self
    }

    /// Finishes the archive.
    #[must_use]
    pub fn build(self) -> MemoryArchive {
        self.archive
    }
}
