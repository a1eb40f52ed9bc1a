//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use std::io::Write;
use std::io::{self};
use szx_core::ExtractionReport;
use szx_core::ListSummary;
use szx_core::VerifyReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn write_header(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.write_header("Extraction complete");

        let _ = self.term.write_line(&format!(
            "  Files extracted: {}",
            Self::format_number(report.files_extracted)
        ));
        let _ = self.term.write_line(&format!(
            "  Directories: {}",
            Self::format_number(report.directories_created)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(report.bytes_written)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Blocks decoded: {}", report.blocks_decoded));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        Ok(())
    }

    fn format_listing(&self, report: &[u8], summary: &ListSummary) -> Result<()> {
        // Names are in the selected code page, so the bytes go out as is.
        let mut stdout = io::stdout().lock();
        stdout.write_all(report)?;
        stdout.flush()?;

        if self.verbose && !self.quiet {
            let _ = self.term.write_line("");
            let _ = self.term.write_line(&format!(
                "Total: {} entries, {} of report",
                Self::format_number(summary.lines_written),
                Self::format_size(summary.bytes_used as u64)
            ));
        }

        Ok(())
    }

    fn format_verify_result(&self, report: &VerifyReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.write_header("Everything is Ok");

        let _ = self.term.write_line(&format!(
            "  Files verified: {}",
            Self::format_number(report.files_verified)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(report.bytes_verified)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Blocks decoded: {}", report.blocks_decoded));
        }

        Ok(())
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = term.write_line(&format!("WARNING: {message}"));
        }
    }
}
