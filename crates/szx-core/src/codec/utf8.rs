//! Strict UTF-16 to UTF-8 conversion.

use super::CodecError;
use super::TextCodec;

/// Lead byte offsets indexed by the number of continuation bytes minus one.
const UTF8_LIMITS: [u8; 5] = [0xC0, 0xE0, 0xF0, 0xF8, 0xFC];

/// Destination of the shared scan: a byte counter or a byte vector.
trait Sink {
    fn put(&mut self, byte: u8);
}

struct Count(usize);

impl Sink for Count {
    fn put(&mut self, _byte: u8) {
        self.0 += 1;
    }
}

impl Sink for Vec<u8> {
    fn put(&mut self, byte: u8) {
        self.push(byte);
    }
}

/// Walks `src` once, feeding encoded bytes to `sink`.
///
/// Stops at the first malformed unit and returns its position.
fn scan<S: Sink>(src: &[u16], sink: &mut S) -> Result<(), usize> {
    let mut pos = 0;
    while pos < src.len() {
        let start = pos;
        let mut value = u32::from(src[pos]);
        pos += 1;

        if value < 0x80 {
            sink.put(value as u8);
            continue;
        }

        if (0xD800..0xE000).contains(&value) {
            if value >= 0xDC00 || pos == src.len() {
                return Err(start);
            }
            let low = u32::from(src[pos]);
            if !(0xDC00..0xE000).contains(&low) {
                return Err(start);
            }
            pos += 1;
            value = (((value - 0xD800) << 10) | (low - 0xDC00)) + 0x10000;
        }

        let mut adds = 1;
        while adds < 5 && value >= 1 << (adds * 5 + 6) {
            adds += 1;
        }
        sink.put(UTF8_LIMITS[adds - 1].wrapping_add((value >> (6 * adds)) as u8));
        while adds != 0 {
            adds -= 1;
            sink.put(0x80 | ((value >> (6 * adds)) & 0x3F) as u8);
        }
    }
    Ok(())
}

/// UTF-16 to UTF-8 codec that rejects unpaired surrogates.
///
/// # Examples
///
/// ```
/// use szx_core::codec::TextCodec;
/// use szx_core::codec::Utf8Codec;
///
/// let name: Vec<u16> = "dir/𝄞.txt".encode_utf16().collect();
/// let mut out = Vec::new();
/// let len = Utf8Codec.transcode(&name, &mut out).unwrap();
/// assert_eq!(&out[..len], "dir/𝄞.txt".as_bytes());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Codec;

impl TextCodec for Utf8Codec {
    fn measure(&self, src: &[u16]) -> Result<usize, CodecError> {
        let mut count = Count(0);
        scan(src, &mut count).map_err(|position| CodecError::Malformed { position })?;
        Ok(count.0)
    }

    fn transcode(&self, src: &[u16], dest: &mut Vec<u8>) -> Result<usize, CodecError> {
        dest.clear();
        let len = self.measure(src)?;
        dest.try_reserve(len)?;
        scan(src, dest).map_err(|position| CodecError::Malformed { position })?;
        Ok(len)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode(src: &[u16]) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        let len = Utf8Codec.transcode(src, &mut out)?;
        assert_eq!(len, out.len());
        Ok(out)
    }

    #[test]
    fn test_ascii() {
        let src: Vec<u16> = "hello.txt".encode_utf16().collect();
        assert_eq!(Utf8Codec.measure(&src).unwrap(), 9);
        assert_eq!(encode(&src).unwrap(), b"hello.txt");
    }

    #[test]
    fn test_boundaries() {
        // Last value of each encoded length and the first of the next.
        let cases: [(u16, &[u8]); 6] = [
            (0x007F, &[0x7F]),
            (0x0080, &[0xC2, 0x80]),
            (0x07FF, &[0xDF, 0xBF]),
            (0x0800, &[0xE0, 0xA0, 0x80]),
            (0xD7FF, &[0xED, 0x9F, 0xBF]),
            (0xFFFF, &[0xEF, 0xBF, 0xBF]),
        ];
        for (unit, expected) in cases {
            assert_eq!(encode(&[unit]).unwrap(), expected, "unit {unit:#06x}");
        }
    }

    #[test]
    fn test_surrogate_pair() {
        // U+1D11E MUSICAL SYMBOL G CLEF
        let out = encode(&[0xD834, 0xDD1E]).unwrap();
        assert_eq!(out, [0xF0, 0x9D, 0x84, 0x9E]);

        // Highest code point
        let out = encode(&[0xDBFF, 0xDFFF]).unwrap();
        assert_eq!(out, [0xF4, 0x8F, 0xBF, 0xBF]);
    }

    #[test]
    fn test_lone_low_surrogate() {
        let err = Utf8Codec.measure(&[0x41, 0xDC00]).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { position: 1 }));
    }

    #[test]
    fn test_high_surrogate_at_end() {
        let err = Utf8Codec.measure(&[0x41, 0x42, 0xD800]).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { position: 2 }));
    }

    #[test]
    fn test_high_surrogate_followed_by_non_low() {
        let err = Utf8Codec.measure(&[0xD800, 0x0041]).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { position: 0 }));

        let err = Utf8Codec.measure(&[0xD800, 0xD800]).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { position: 0 }));
    }

    #[test]
    fn test_failed_transcode_leaves_no_output() {
        let mut out = b"stale".to_vec();
        assert!(Utf8Codec.transcode(&[0x61, 0x62, 0xDFFF], &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty() {
        assert_eq!(Utf8Codec.measure(&[]).unwrap(), 0);
        assert!(encode(&[]).unwrap().is_empty());
    }
}
