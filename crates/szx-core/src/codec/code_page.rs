//! Single-byte Windows code pages with default-character substitution.

use encoding_rs::EncoderResult;
use encoding_rs::WINDOWS_1252;

use super::CodecError;
use super::TextCodec;

/// Byte written for characters the code page cannot represent.
const DEFAULT_CHAR: u8 = b'_';

/// Code page 437 bytes 0x80..=0xFF.
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{A0}',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Windows1252,
    Cp437,
}

/// Lossy conversion to a single-byte code page.
///
/// Every character produces exactly one byte; anything outside the code
/// page, including unpaired surrogates, becomes `_`. This codec never
/// reports a malformed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePageCodec {
    table: Table,
}

impl CodePageCodec {
    /// Windows "ANSI" code page 1252.
    #[must_use]
    pub const fn ansi() -> Self {
        Self {
            table: Table::Windows1252,
        }
    }

    /// Windows "OEM" code page 437.
    #[must_use]
    pub const fn oem() -> Self {
        Self {
            table: Table::Cp437,
        }
    }

    fn map_oem(c: char) -> u8 {
        let code = u32::from(c);
        if code < 0x80 {
            return code as u8;
        }
        CP437_HIGH
            .iter()
            .position(|&m| m == c)
            .map_or(DEFAULT_CHAR, |i| 0x80 + i as u8)
    }
}

/// Appends the Windows-1252 encoding of `src` to the empty `dest`.
fn encode_ansi(src: &[u16], dest: &mut Vec<u8>) -> Result<(), CodecError> {
    let mut encoder = WINDOWS_1252.new_encoder();
    let capacity = encoder
        .max_buffer_length_from_utf16_without_replacement(src.len())
        .unwrap_or(src.len());
    dest.try_reserve(capacity)?;
    dest.resize(capacity, 0);

    let mut read = 0;
    let mut written = 0;
    loop {
        let (Some(input), Some(output)) = (src.get(read..), dest.get_mut(written..)) else {
            break;
        };
        let (result, r, w) = encoder.encode_from_utf16_without_replacement(input, output, true);
        read += r;
        written += w;
        match result {
            EncoderResult::Unmappable(_) => match dest.get_mut(written) {
                Some(slot) => {
                    *slot = DEFAULT_CHAR;
                    written += 1;
                }
                None => break,
            },
            EncoderResult::InputEmpty | EncoderResult::OutputFull => break,
        }
    }
    dest.truncate(written);
    Ok(())
}

impl TextCodec for CodePageCodec {
    fn measure(&self, src: &[u16]) -> Result<usize, CodecError> {
        Ok(char::decode_utf16(src.iter().copied()).count())
    }

    fn transcode(&self, src: &[u16], dest: &mut Vec<u8>) -> Result<usize, CodecError> {
        dest.clear();
        match self.table {
            Table::Windows1252 => encode_ansi(src, dest)?,
            Table::Cp437 => {
                let len = self.measure(src)?;
                dest.try_reserve(len)?;
                dest.extend(
                    char::decode_utf16(src.iter().copied())
                        .map(|c| c.map_or(DEFAULT_CHAR, Self::map_oem)),
                );
            }
        }
        Ok(dest.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode(codec: CodePageCodec, s: &str) -> Vec<u8> {
        let src: Vec<u16> = s.encode_utf16().collect();
        let mut out = Vec::new();
        let len = codec.transcode(&src, &mut out).unwrap();
        assert_eq!(len, out.len());
        out
    }

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode(CodePageCodec::ansi(), "a/b.txt"), b"a/b.txt");
        assert_eq!(encode(CodePageCodec::oem(), "a/b.txt"), b"a/b.txt");
    }

    #[test]
    fn test_ansi_mapping() {
        assert_eq!(encode(CodePageCodec::ansi(), "é"), [0xE9]);
        assert_eq!(encode(CodePageCodec::ansi(), "€"), [0x80]);
        assert_eq!(encode(CodePageCodec::ansi(), "Ÿ"), [0x9F]);
        assert_eq!(encode(CodePageCodec::ansi(), "Ж"), b"_");
    }

    #[test]
    fn test_ansi_c1_slots() {
        // Unassigned slots round-trip as the C1 control of the same value.
        assert_eq!(encode(CodePageCodec::ansi(), "\u{81}\u{8D}"), [0x81, 0x8D]);
        assert_eq!(encode(CodePageCodec::ansi(), "‚ƒ„…"), [0x82, 0x83, 0x84, 0x85]);
    }

    #[test]
    fn test_ansi_unmappable_runs() {
        assert_eq!(encode(CodePageCodec::ansi(), "a日本b"), b"a__b");
        assert_eq!(encode(CodePageCodec::ansi(), "𝄞"), b"_");

        let mut out = Vec::new();
        let codec = CodePageCodec::ansi();
        assert_eq!(codec.transcode(&[0x61, 0xDC00, 0x62], &mut out).unwrap(), 3);
        assert_eq!(out, b"a_b");
    }

    #[test]
    fn test_oem_mapping() {
        assert_eq!(encode(CodePageCodec::oem(), "é"), [0x82]);
        assert_eq!(encode(CodePageCodec::oem(), "░"), [0xB0]);
        assert_eq!(encode(CodePageCodec::oem(), "\u{A0}"), [0xFF]);
        assert_eq!(encode(CodePageCodec::oem(), "€"), b"_");
    }

    #[test]
    fn test_surrogates_become_default_char() {
        let codec = CodePageCodec::oem();
        // Paired surrogates decode to one character outside the table.
        let mut out = Vec::new();
        assert_eq!(codec.transcode(&[0xD834, 0xDD1E], &mut out).unwrap(), 1);
        assert_eq!(out, b"_");

        // Unpaired surrogates are substituted, not rejected.
        assert_eq!(codec.transcode(&[0x61, 0xDC00, 0x62], &mut out).unwrap(), 3);
        assert_eq!(out, b"a_b");
    }
}
