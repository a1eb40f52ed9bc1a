//! List command implementation

use crate::cli::DEFAULT_LIST_CAPACITY;
use crate::cli::ListArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use szx_core::AttributeStyle;
use szx_core::ListOptions;
use szx_core::list_archive;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let capacity = match args.capacity {
        Some(bytes) => usize::try_from(bytes).context("report capacity too large")?,
        None => DEFAULT_LIST_CAPACITY,
    };

    let options = ListOptions {
        code_page: args.code_page.unwrap_or_default(),
        attribute_style: if args.attributes {
            AttributeStyle::Windows
        } else {
            AttributeStyle::default()
        },
    };

    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .context("failed to allocate report buffer")?;
    buf.resize(capacity, 0);

    let summary = add_archive_context(list_archive(&args.archive, &mut buf, &options), &args.archive)?;

    formatter.format_listing(&buf[..summary.bytes_used], &summary)?;

    if !summary.is_complete() {
        formatter.format_warning(&format!(
            "{} entries did not fit in the {capacity}-byte report; use --capacity to raise it",
            summary.lines_dropped
        ));
    }

    Ok(())
}
