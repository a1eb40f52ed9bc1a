//! Single-block decode cache.
//!
//! Solid archives pack many files into one compressed block. Entries are
//! visited in table order, so consecutive files usually share a block; the
//! cursor keeps the last decoded block and only slices a new range out of it
//! when the next entry lives in the same block.

use std::ops::Range;

use crate::ExtractionError;
use crate::Result;
use crate::checksum;
use crate::source::ArchiveSource;

/// Last decoded block and its bytes.
///
/// The buffer grows to the largest block seen and is released when the
/// cursor is dropped.
#[derive(Debug, Default)]
pub struct DecodeCursor {
    block: Option<usize>,
    buffer: Vec<u8>,
    blocks_decoded: usize,
}

impl DecodeCursor {
    /// Creates a cursor with nothing cached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block currently held, if any.
    #[must_use]
    pub fn cached_block(&self) -> Option<usize> {
        self.block
    }

    /// Number of blocks decoded so far, i.e. cache misses.
    #[must_use]
    pub fn blocks_decoded(&self) -> usize {
        self.blocks_decoded
    }

    /// Bytes of the cached block in `range`.
    ///
    /// Only meaningful for a range just returned by [`decode`](Self::decode).
    #[must_use]
    pub fn data(&self, range: Range<usize>) -> &[u8] {
        &self.buffer[range]
    }

    /// Makes entry `index` available and returns its range in the buffer.
    ///
    /// Entries without data yield an empty range and leave the cache as it
    /// is. The decoded range is checked against the entry's stored CRC.
    ///
    /// # Errors
    ///
    /// Returns `Memory` if the buffer cannot grow, `CorruptBlock` if the
    /// block fails to decode or is shorter than the entry requires, and
    /// `ChecksumMismatch` if the CRC does not match. After any error the
    /// cursor holds no block.
    pub fn decode<S: ArchiveSource + ?Sized>(
        &mut self,
        source: &mut S,
        index: usize,
    ) -> Result<Range<usize>> {
        let Some(location) = source.block_location(index) else {
            return Ok(0..0);
        };

        if self.block == Some(location.block) {
            tracing::trace!(index, block = location.block, "block cache hit");
        } else {
            self.block = None;
            self.buffer.clear();
            if let Some(size) = source.block_size(location.block) {
                let size = usize::try_from(size).map_err(|_| ExtractionError::CorruptBlock {
                    block: location.block,
                    reason: format!("unpacked size {size} exceeds address space"),
                })?;
                self.buffer.try_reserve(size)?;
            }
            tracing::trace!(index, block = location.block, "decoding block");
            source.decode_block(location.block, &mut self.buffer)?;
            self.blocks_decoded += 1;
            self.block = Some(location.block);
        }

        let range = location.offset..location.offset.saturating_add(location.len);
        if range.end > self.buffer.len() {
            self.block = None;
            return Err(ExtractionError::CorruptBlock {
                block: location.block,
                reason: format!(
                    "decoded {} bytes, entry {index} needs {}",
                    self.buffer.len(),
                    range.end
                ),
            });
        }

        if let Some(expected) = source.entries().get(index).and_then(|e| e.crc) {
            let actual = checksum::crc32(&self.buffer[range.clone()]);
            if actual != expected {
                self.block = None;
                return Err(ExtractionError::ChecksumMismatch {
                    index,
                    expected,
                    actual,
                });
            }
        }

        Ok(range)
    }
}
