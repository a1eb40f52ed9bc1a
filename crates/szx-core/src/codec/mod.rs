//! Conversion of stored entry names (UTF-16 code units) to local bytes.
//!
//! Two interchangeable implementations sit behind [`TextCodec`]:
//!
//! - [`Utf8Codec`]: strict UTF-16 to UTF-8, rejecting malformed surrogates
//! - [`CodePageCodec`]: single-byte ANSI (Windows-1252) or OEM (code page 437)
//!   conversion that substitutes `_` for anything it cannot map
//!
//! The session picks one through [`CodePage`] and only ever talks to the
//! trait. Output paths always use [`Utf8Codec`]; the selection applies to
//! report text.

mod code_page;
mod utf8;

use std::collections::TryReserveError;

use thiserror::Error;

pub use code_page::CodePageCodec;
pub use utf8::Utf8Codec;

/// Failure of a [`TextCodec`] operation.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Unpaired or misordered surrogate at the given code unit.
    #[error("malformed UTF-16 at code unit {position}")]
    Malformed {
        /// Position of the offending code unit.
        position: usize,
    },

    /// The destination buffer could not be grown.
    #[error("out of memory: {0}")]
    Memory(#[from] TryReserveError),
}

/// Two-pass conversion from 16-bit code units to bytes.
pub trait TextCodec {
    /// Returns the number of bytes `src` encodes to.
    fn measure(&self, src: &[u16]) -> Result<usize, CodecError>;

    /// Replaces the contents of `dest` with the encoding of `src`.
    ///
    /// On error `dest` holds no output from this call. The allocation of
    /// `dest` is reused; it is never shrunk.
    fn transcode(&self, src: &[u16], dest: &mut Vec<u8>) -> Result<usize, CodecError>;
}

/// Text encoding selected once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePage {
    /// UTF-8.
    Utf8,
    /// The Windows "ANSI" code page (Windows-1252).
    Ansi,
    /// The Windows "OEM" console code page (437).
    Oem,
}

impl Default for CodePage {
    /// OEM on Windows, where console output uses it; UTF-8 elsewhere.
    fn default() -> Self {
        if cfg!(windows) { Self::Oem } else { Self::Utf8 }
    }
}

impl CodePage {
    /// Returns the codec for this code page.
    #[must_use]
    pub fn codec(self) -> &'static dyn TextCodec {
        static UTF8: Utf8Codec = Utf8Codec;
        static ANSI: CodePageCodec = CodePageCodec::ansi();
        static OEM: CodePageCodec = CodePageCodec::oem();
        match self {
            Self::Utf8 => &UTF8,
            Self::Ansi => &ANSI,
            Self::Oem => &OEM,
        }
    }
}

impl std::str::FromStr for CodePage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "ansi" | "cp1252" => Ok(Self::Ansi),
            "oem" | "cp437" => Ok(Self::Oem),
            _ => Err(format!("unknown code page: {s}")),
        }
    }
}

/// Session-owned scratch buffer for transcoded names.
///
/// Grows to the longest name seen and keeps that allocation until the
/// session ends.
#[derive(Debug, Default)]
pub struct TranscodeBuffer {
    buf: Vec<u8>,
}

impl TranscodeBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `name` with `codec` and returns the encoded bytes.
    pub fn encode(&mut self, codec: &dyn TextCodec, name: &[u16]) -> Result<&[u8], CodecError> {
        let len = codec.transcode(name, &mut self.buf)?;
        Ok(&self.buf[..len])
    }

    /// Current capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}
