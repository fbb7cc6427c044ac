//! CLI command definitions and execution
//!
//! The subcommand set is a tagged enum dispatched exhaustively; adding a
//! subcommand without wiring it up is a compile error.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use gd_core::{ConfigManager, Defaults};

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

mod auth;
mod completions;
mod create;
mod delete;
mod query;
mod upload;

/// gdrive - Google Drive CLI client
///
/// Authorize once with `gdrive auth`, then create folders, upload, query and
/// delete files on your Drive.
#[derive(Parser, Debug)]
#[command(name = "gdrive")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose diagnostic logging
    #[arg(short = 'l', long = "log", global = true, default_value = "false")]
    pub log: bool,

    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the one-time browser consent flow and store credentials
    Auth(auth::AuthArgs),

    /// Create a folder on your Drive
    Create(create::CreateArgs),

    /// Delete a file or folder by id
    Delete(delete::DeleteArgs),

    /// List files whose name contains a substring
    Query(query::QueryArgs),

    /// Upload a local file
    Upload(upload::UploadArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Auth(args) => auth::execute(args, output_config).await,
        Commands::Create(args) => create::execute(args, output_config).await,
        Commands::Delete(args) => delete::execute(args, output_config).await,
        Commands::Query(args) => query::execute(args, output_config).await,
        Commands::Upload(args) => upload::execute(args, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Load the configured defaults, falling back to built-ins
///
/// A broken config file only costs the defaults, never the command.
pub(crate) fn config_defaults() -> Defaults {
    let config = ConfigManager::new().and_then(|manager| manager.load());
    match config {
        Ok(config) => config.defaults,
        Err(e) => {
            tracing::warn!("ignoring unreadable config file: {e}");
            Defaults::default()
        }
    }
}

/// Resolve the credential file path: flag wins over config default
pub(crate) fn resolve_credential_file(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| config_defaults().credential_file)
}
