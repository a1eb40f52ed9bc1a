//! Options for extraction and listing.

use std::path::PathBuf;

use crate::codec::CodePage;
use crate::format::AttributeStyle;

/// Extraction options.
///
/// # Examples
///
/// ```
/// use szx_core::ExtractOptions;
///
/// // Extract into ./out, dropping directory structure
/// let options = ExtractOptions {
///     output_dir: "out".into(),
///     preserve_full_paths: false,
///     ..Default::default()
/// };
/// assert!(options.apply_attributes);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Root under which entries are written.
    pub output_dir: PathBuf,

    /// Recreate the stored directory structure. When `false`, every file
    /// lands directly in `output_dir` under its last name segment and
    /// directory entries are skipped.
    pub preserve_full_paths: bool,

    /// Apply stored attribute bits to extracted files where the host can.
    pub apply_attributes: bool,
}

impl Default for ExtractOptions {
    /// Current directory, full paths, attributes applied.
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            preserve_full_paths: true,
            apply_attributes: true,
        }
    }
}

impl ExtractOptions {
    /// Options extracting with full paths into `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }
}

/// List report options.
///
/// Both fields default from the host platform: OEM text and a flag column
/// on Windows, UTF-8 and an empty column elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Encoding of names in the report.
    pub code_page: CodePage,

    /// Content of the attribute column.
    pub attribute_style: AttributeStyle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_defaults() {
        let options = ExtractOptions::default();
        assert_eq!(options.output_dir, PathBuf::from("."));
        assert!(options.preserve_full_paths);
        assert!(options.apply_attributes);
    }

    #[test]
    fn test_extract_new() {
        let options = ExtractOptions::new("/tmp/out");
        assert_eq!(options.output_dir, PathBuf::from("/tmp/out"));
        assert!(options.preserve_full_paths);
    }

    #[test]
    fn test_list_defaults_follow_host() {
        let options = ListOptions::default();
        if cfg!(windows) {
            assert_eq!(options.code_page, CodePage::Oem);
            assert_eq!(options.attribute_style, AttributeStyle::Windows);
        } else {
            assert_eq!(options.code_page, CodePage::Utf8);
            assert_eq!(options.attribute_style, AttributeStyle::None);
        }
    }
}
