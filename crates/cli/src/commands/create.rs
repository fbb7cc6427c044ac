//! create command - Create a folder
//!
//! Creates a folder on the remote drive and prints its id.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use gd_core::{CredentialStore, DriveStore as _};
use gd_drive::DriveClient;

use crate::commands::resolve_credential_file;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Create a folder on your Drive
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Name of the folder to create
    #[arg(value_name = "FolderName")]
    pub name: String,

    /// Authorized credential file
    #[arg(short = 'c', long = "credentials", value_name = "CredentialFile")]
    pub credentials: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CreateOutput {
    status: &'static str,
    id: String,
    name: String,
}

/// Execute the create command
pub async fn execute(args: CreateArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    // Credentials are loaded before any network activity.
    let creds_path = resolve_credential_file(args.credentials);
    let creds = match CredentialStore::new(&creds_path).load() {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let client = match DriveClient::new(creds).await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    match client.create_folder(&args.name).await {
        Ok(folder) => {
            if formatter.is_json() {
                formatter.json(&CreateOutput {
                    status: "success",
                    id: folder.id.clone(),
                    name: folder.name.clone(),
                });
            } else {
                formatter.success(&format!(
                    "Folder '{}' created with id {}",
                    folder.name, folder.id
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to create folder: {e}"));
            ExitCode::from_error(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_credential_file_fails_fast() {
        let temp_dir = TempDir::new().unwrap();
        let args = CreateArgs {
            name: "X".into(),
            credentials: Some(temp_dir.path().join("credentials.json")),
        };

        // No credential file on disk: the command must fail before any
        // remote call is attempted.
        let code = execute(args, OutputConfig::default()).await;
        assert_eq!(code, ExitCode::NotFound);
    }

    #[tokio::test]
    async fn test_malformed_credential_file_is_general_error() {
        let temp_dir = TempDir::new().unwrap();
        let creds_path = temp_dir.path().join("credentials.json");
        std::fs::write(&creds_path, "garbage").unwrap();

        let args = CreateArgs {
            name: "X".into(),
            credentials: Some(creds_path),
        };

        let code = execute(args, OutputConfig::default()).await;
        assert_eq!(code, ExitCode::GeneralError);
    }
}
