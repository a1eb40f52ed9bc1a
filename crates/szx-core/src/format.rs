//! Fixed-width text rendering for list reports.
//!
//! Sizes, 100 ns file times and attribute flags are rendered byte-exactly so
//! that report columns line up and output is identical across hosts.

/// Ticks (100 ns) per second.
const TICKS_PER_SECOND: u64 = 10_000_000;

/// First year of the file-time epoch.
const EPOCH_YEAR: u32 = 1601;

const PERIOD_4: u32 = 4 * 365 + 1;
const PERIOD_100: u32 = PERIOD_4 * 25 - 1;
const PERIOD_400: u32 = PERIOD_100 * 4 + 1;

/// Width of a rendered timestamp.
pub const TIMESTAMP_WIDTH: usize = 19;

/// Placeholder for entries without a modification time.
pub const BLANK_TIMESTAMP: &str = "                   ";

const FILE_ATTRIBUTE_READONLY: u32 = 0x01;
const FILE_ATTRIBUTE_HIDDEN: u32 = 0x02;
const FILE_ATTRIBUTE_SYSTEM: u32 = 0x04;
const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x10;
const FILE_ATTRIBUTE_ARCHIVE: u32 = 0x20;

/// Appends the decimal digits of `value` to `out`.
fn push_digits(out: &mut String, mut value: u64, min_digits: usize) {
    let mut temp = [0u8; 20];
    let mut pos = 0;
    loop {
        temp[pos] = b'0' + (value % 10) as u8;
        pos += 1;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    for _ in pos..min_digits {
        out.push('0');
    }
    while pos > 0 {
        pos -= 1;
        out.push(char::from(temp[pos]));
    }
}

/// Renders `value` in decimal without leading zeros.
///
/// # Examples
///
/// ```
/// use szx_core::format::u64_to_string;
///
/// assert_eq!(u64_to_string(0), "0");
/// assert_eq!(u64_to_string(18_446_744_073_709_551_615), "18446744073709551615");
/// ```
#[must_use]
pub fn u64_to_string(value: u64) -> String {
    let mut out = String::with_capacity(20);
    push_digits(&mut out, value, 0);
    out
}

/// Renders `value` left-padded with zeros to at least `min_digits` digits.
///
/// Values needing more digits are never truncated.
///
/// # Examples
///
/// ```
/// use szx_core::format::uint_to_padded;
///
/// assert_eq!(uint_to_padded(7, 2), "07");
/// assert_eq!(uint_to_padded(12345, 4), "12345");
/// ```
#[must_use]
pub fn uint_to_padded(value: u32, min_digits: usize) -> String {
    let mut out = String::with_capacity(min_digits.max(10));
    push_digits(&mut out, u64::from(value), min_digits);
    out
}

/// Calendar fields of a file time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    /// Year, 1601 or later.
    pub year: u32,
    /// Month, 1-12.
    pub month: u32,
    /// Day of month, 1-31.
    pub day: u32,
    /// Hour, 0-23.
    pub hour: u32,
    /// Minute, 0-59.
    pub minute: u32,
    /// Second, 0-59.
    pub second: u32,
}

const fn is_leap_year(year: u32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

impl DateTime {
    /// Decomposes a tick count since 1601-01-01 00:00:00 (proleptic
    /// Gregorian).
    #[must_use]
    pub fn from_filetime(ticks: u64) -> Self {
        let mut v64 = ticks / TICKS_PER_SECOND;
        let second = (v64 % 60) as u32;
        v64 /= 60;
        let minute = (v64 % 60) as u32;
        v64 /= 60;
        let hour = (v64 % 24) as u32;
        v64 /= 24;

        // At most ~21.4 million days fit in a u64 tick count.
        let mut days = v64 as u32;

        let mut year = EPOCH_YEAR + days / PERIOD_400 * 400;
        days %= PERIOD_400;

        // The last day of each long period belongs to its final short period.
        let t = (days / PERIOD_100).min(3);
        year += t * 100;
        days -= t * PERIOD_100;

        let t = (days / PERIOD_4).min(24);
        year += t * 4;
        days -= t * PERIOD_4;

        let t = (days / 365).min(3);
        year += t;
        days -= t * 365;

        let mut month_lengths = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        if is_leap_year(year) {
            month_lengths[1] = 29;
        }
        let mut month = 0;
        for len in month_lengths {
            if days < len {
                break;
            }
            days -= len;
            month += 1;
        }

        Self {
            year,
            month: month + 1,
            day: days + 1,
            hour,
            minute,
            second,
        }
    }
}

impl std::fmt::Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::with_capacity(TIMESTAMP_WIDTH);
        push_digits(&mut s, u64::from(self.year), 4);
        s.push('-');
        push_digits(&mut s, u64::from(self.month), 2);
        s.push('-');
        push_digits(&mut s, u64::from(self.day), 2);
        s.push(' ');
        push_digits(&mut s, u64::from(self.hour), 2);
        s.push(':');
        push_digits(&mut s, u64::from(self.minute), 2);
        s.push(':');
        push_digits(&mut s, u64::from(self.second), 2);
        f.write_str(&s)
    }
}

/// Renders a file time as `YYYY-MM-DD HH:MM:SS`.
///
/// # Examples
///
/// ```
/// use szx_core::format::filetime_to_string;
///
/// assert_eq!(filetime_to_string(0), "1601-01-01 00:00:00");
/// // 1970-01-01, the Unix epoch
/// assert_eq!(filetime_to_string(116_444_736_000_000_000), "1970-01-01 00:00:00");
/// ```
#[must_use]
pub fn filetime_to_string(ticks: u64) -> String {
    DateTime::from_filetime(ticks).to_string()
}

/// Which attribute column a report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeStyle {
    /// Five `DRHSA` flag characters.
    Windows,
    /// An empty column.
    None,
}

impl Default for AttributeStyle {
    /// Flags on Windows, where they are meaningful; empty elsewhere.
    fn default() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::None }
    }
}

/// Renders Windows attribute flags as five `D R H S A` / `.` characters.
///
/// # Examples
///
/// ```
/// use szx_core::format::attrib_string;
///
/// assert_eq!(attrib_string(0x21, false), ".R..A");
/// assert_eq!(attrib_string(0, true), "D....");
/// ```
#[must_use]
pub fn attrib_string(attributes: u32, is_dir: bool) -> String {
    let flag = |mask: u32, c: char| if attributes & mask != 0 { c } else { '.' };
    let mut s = String::with_capacity(5);
    s.push(if is_dir { 'D' } else { flag(FILE_ATTRIBUTE_DIRECTORY, 'D') });
    s.push(flag(FILE_ATTRIBUTE_READONLY, 'R'));
    s.push(flag(FILE_ATTRIBUTE_HIDDEN, 'H'));
    s.push(flag(FILE_ATTRIBUTE_SYSTEM, 'S'));
    s.push(flag(FILE_ATTRIBUTE_ARCHIVE, 'A'));
    s
}
