//! CRC-32 (IEEE) of decoded entry data, computed with `crc32fast`.
//!
//! Every session calls [`ensure_initialized`] before parsing. The first call
//! runs the implementation self-check and selects the hardware or table
//! backend once; repeated calls are free.

use std::sync::OnceLock;

/// Standard check input and its CRC-32.
const CHECK_INPUT: &[u8] = b"123456789";
const CHECK_VALUE: u32 = 0xCBF4_3926;

static READY: OnceLock<bool> = OnceLock::new();

/// Prepares the CRC backend if no session has done so yet.
///
/// Idempotent and safe to call from independent sessions on different
/// threads. Returns whether the backend produced the standard check value.
pub fn ensure_initialized() -> bool {
    *READY.get_or_init(|| {
        let ok = crc32fast::hash(CHECK_INPUT) == CHECK_VALUE;
        tracing::debug!(ok, "crc32 backend initialized");
        ok
    })
}

/// Running CRC-32 over data fed in pieces.
pub type Hasher = crc32fast::Hasher;

/// CRC-32 of `data`.
///
/// # Examples
///
/// ```
/// assert_eq!(szx_core::checksum::crc32(b"123456789"), 0xCBF4_3926);
/// ```
#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
