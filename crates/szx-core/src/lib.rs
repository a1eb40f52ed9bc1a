//! Block-caching 7z extraction driver.
//!
//! `szx-core` walks the file table of a parsed archive in order and, per
//! entry, either writes it to disk ([`extract_archive`]), renders a line of a
//! text report ([`list_archive`]) or decodes it and checks its CRC
//! ([`verify_archive`]). Files stored in the same compressed block share one
//! decode.
//!
//! # Examples
//!
//! ```no_run
//! use szx_core::ExtractOptions;
//! use szx_core::extract_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = extract_archive("archive.7z", &ExtractOptions::new("/output/dir"))?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```
//!
//! Lower layers are public for callers that bring their own archive
//! source or filesystem: see [`driver::Session`], [`source::ArchiveSource`]
//! and [`fs::FileSystem`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod cache;
pub mod checksum;
pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod format;
pub mod fs;
pub mod path;
pub mod report;
pub mod source;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use api::extract_archive;
pub use api::extract_archive_with_progress;
pub use api::list_archive;
pub use api::verify_archive;
pub use codec::CodePage;
pub use config::ExtractOptions;
pub use config::ListOptions;
pub use driver::Session;
pub use error::ErrorKind;
pub use error::ExtractionError;
pub use error::Result;
pub use format::AttributeStyle;
pub use report::ExtractionReport;
pub use report::ListSummary;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use report::VerifyReport;
