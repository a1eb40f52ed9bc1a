//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use szx_core::ExtractionReport;
use szx_core::ListSummary;
use szx_core::VerifyReport;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format extraction result
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()>;

    /// Format a list report. `report` holds the complete lines.
    fn format_listing(&self, report: &[u8], summary: &ListSummary) -> Result<()>;

    /// Format verify result
    fn format_verify_result(&self, report: &VerifyReport) -> Result<()>;

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
        }
    }
}
