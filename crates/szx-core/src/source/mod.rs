//! Archive sources: the parsed file table plus a whole-block decoder.
//!
//! The driver never parses container structures itself. It asks an
//! [`ArchiveSource`] for the entries, for the block backing each entry, and
//! for the decoded bytes of that block.

mod sevenz;

use crate::Result;

pub use sevenz::SevenZSource;

/// One record of the archive's file table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArchiveEntry {
    /// Stored name as UTF-16 code units, `/`-separated.
    pub name: Vec<u16>,
    /// Directory entries carry no payload.
    pub is_dir: bool,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Windows attribute bits, with Unix mode in the high half when bit
    /// 0x8000 is set.
    pub attributes: Option<u32>,
    /// Modification time in 100 ns ticks since 1601-01-01.
    pub modified: Option<u64>,
    /// CRC-32 of the uncompressed data.
    pub crc: Option<u32>,
}

impl ArchiveEntry {
    /// Creates a file entry from a UTF-8 name.
    #[must_use]
    pub fn file(name: &str, size: u64) -> Self {
        Self {
            name: name.encode_utf16().collect(),
            size,
            ..Self::default()
        }
    }

    /// Creates a directory entry from a UTF-8 name.
    #[must_use]
    pub fn directory(name: &str) -> Self {
        Self {
            name: name.encode_utf16().collect(),
            is_dir: true,
            ..Self::default()
        }
    }

    /// Name decoded for display, with unpaired surrogates replaced.
    #[must_use]
    pub fn display_name(&self) -> String {
        String::from_utf16_lossy(&self.name)
    }
}

/// Where an entry's bytes live inside its decoded block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLocation {
    /// Index of the compressed block.
    pub block: usize,
    /// Byte offset of the entry within the decoded block.
    pub offset: usize,
    /// Number of bytes belonging to the entry.
    pub len: usize,
}

/// A parsed archive that can decode its blocks.
pub trait ArchiveSource {
    /// The file table, in archive order.
    fn entries(&self) -> &[ArchiveEntry];

    /// Location of the entry's data, or `None` when it has no stream
    /// (directories and empty files).
    fn block_location(&self, index: usize) -> Option<BlockLocation>;

    /// Decodes block `block` in full, appending its bytes to `out`.
    ///
    /// `out` is empty on entry and has at least the block's unpacked size
    /// reserved.
    fn decode_block(&mut self, block: usize, out: &mut Vec<u8>) -> Result<()>;

    /// Unpacked size of a block, used to reserve the output buffer.
    fn block_size(&self, block: usize) -> Option<u64>;

    /// Short format name.
    fn format_name(&self) -> &str;
}
