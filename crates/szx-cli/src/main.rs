//! szx - extract, list and verify 7z archives.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Diagnostics go to stderr so JSON on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match &cli.command {
        cli::Commands::Extract(args) => commands::extract::execute(args, &*formatter, cli.quiet),
        cli::Commands::List(args) => commands::list::execute(args, &*formatter),
        cli::Commands::Verify(args) => commands::verify::execute(args, &*formatter),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    }
}
