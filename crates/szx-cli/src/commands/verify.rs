//! Verify command implementation

use crate::cli::VerifyArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use szx_core::verify_archive;

pub fn execute(args: &VerifyArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let report = add_archive_context(verify_archive(&args.archive), &args.archive)?;

    formatter.format_verify_result(&report)?;

    Ok(())
}
