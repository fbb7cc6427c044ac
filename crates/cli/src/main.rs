//! gdrive - Google Drive CLI client
//!
//! A command-line interface for Google Drive: authorize once, then create
//! folders, upload, query and delete files.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod exit_code;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // -l/--log raises the filter to debug; otherwise RUST_LOG decides.
    // Diagnostics go to stderr so --json output on stdout stays parseable.
    let filter = if cli.log {
        EnvFilter::new("gdrive=debug,gdrive_cli=debug,gd_core=debug,gd_drive=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
