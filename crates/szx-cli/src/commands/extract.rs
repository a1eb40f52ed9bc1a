//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use std::env;
use szx_core::ExtractOptions;
use szx_core::NoopProgress;
use szx_core::extract_archive_with_progress;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter, quiet: bool) -> Result<()> {
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let options = ExtractOptions {
        output_dir,
        preserve_full_paths: !args.flat,
        apply_attributes: !args.no_attributes,
    };

    // Progress bar only on an interactive terminal
    let report = if !quiet && CliProgress::should_show() {
        let mut progress = CliProgress::new("Extracting");
        add_archive_context(
            extract_archive_with_progress(&args.archive, &options, &mut progress),
            &args.archive,
        )?
    } else {
        let mut noop = NoopProgress;
        add_archive_context(
            extract_archive_with_progress(&args.archive, &options, &mut noop),
            &args.archive,
        )?
    };

    formatter.format_extraction_result(&report)?;

    Ok(())
}
