//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use szx_core::ExtractionReport;
use szx_core::ListSummary;
use szx_core::VerifyReport;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

/// One parsed line of the list report.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct ListEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<String>,
    size: u64,
    name: String,
}

/// Splits report lines back into their four columns.
fn parse_report(report: &[u8]) -> Vec<ListEntry> {
    String::from_utf8_lossy(report)
        .lines()
        .filter_map(|line| {
            let mut columns = line.splitn(4, '\t');
            let modified = columns.next()?.trim();
            let attributes = columns.next()?;
            let size = columns.next()?.parse().ok()?;
            let name = columns.next()?;
            Some(ListEntry {
                modified: (!modified.is_empty()).then(|| modified.to_string()),
                attributes: (!attributes.is_empty()).then(|| attributes.to_string()),
                size,
                name: name.to_string(),
            })
        })
        .collect()
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractionOutput {
            files_extracted: usize,
            directories_created: usize,
            bytes_written: u64,
            blocks_decoded: usize,
            duration_ms: u128,
        }

        let data = ExtractionOutput {
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            bytes_written: report.bytes_written,
            blocks_decoded: report.blocks_decoded,
            duration_ms: report.duration.as_millis(),
        };

        let output = JsonOutput::success("extract", data);
        Self::output(&output)
    }

    fn format_listing(&self, report: &[u8], summary: &ListSummary) -> Result<()> {
        #[derive(Serialize)]
        struct ListOutput {
            entries: Vec<ListEntry>,
            bytes_used: usize,
            lines_dropped: usize,
        }

        let data = ListOutput {
            entries: parse_report(report),
            bytes_used: summary.bytes_used,
            lines_dropped: summary.lines_dropped,
        };

        let output = JsonOutput::success("list", data);
        Self::output(&output)
    }

    fn format_verify_result(&self, report: &VerifyReport) -> Result<()> {
        #[derive(Serialize)]
        struct VerifyOutput {
            files_verified: usize,
            bytes_verified: u64,
            blocks_decoded: usize,
        }

        let data = VerifyOutput {
            files_verified: report.files_verified,
            bytes_verified: report.bytes_verified,
            blocks_decoded: report.blocks_decoded,
        };

        let output = JsonOutput::success("verify", data);
        Self::output(&output)
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report() {
        let report = b"2015-03-22 00:00:00\t.R..A\t12\tdir/a b.txt\n                   \t\t0\tdir\n";
        let entries = parse_report(report);
        assert_eq!(
            entries,
            [
                ListEntry {
                    modified: Some("2015-03-22 00:00:00".to_string()),
                    attributes: Some(".R..A".to_string()),
                    size: 12,
                    name: "dir/a b.txt".to_string(),
                },
                ListEntry {
                    modified: None,
                    attributes: None,
                    size: 0,
                    name: "dir".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_name_keeps_tabs() {
        let entries = parse_report(b"                   \t\t1\ta\tb\n");
        assert_eq!(entries[0].name, "a\tb");
    }

    #[test]
    fn test_json_output_structure() {
        let output = JsonOutput::success(
            "verify",
            ListEntry {
                modified: None,
                attributes: None,
                size: 1,
                name: "x".to_string(),
            },
        );
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"operation\":\"verify\""));
        assert!(json.contains("\"status\":\"success\""));
        assert!(!json.contains("modified"));
    }
}
