//! delete command - Delete a file by id
//!
//! Deletes a remote file or folder. The provider's confirmation is empty,
//! so success is just the exit code.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use gd_core::{CredentialStore, DriveStore as _};
use gd_drive::DriveClient;

use crate::commands::resolve_credential_file;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Delete a file or folder by id
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Id of the file to delete
    #[arg(value_name = "FileID")]
    pub file_id: String,

    /// Authorized credential file
    #[arg(short = 'c', long = "credentials", value_name = "CredentialFile")]
    pub credentials: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct DeleteOutput {
    status: &'static str,
    id: String,
}

/// Execute the delete command
pub async fn execute(args: DeleteArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

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

    match client.delete_file(&args.file_id).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&DeleteOutput {
                    status: "success",
                    id: args.file_id.clone(),
                });
            } else {
                formatter.success(&format!("Deleted {}", args.file_id));
            }
            ExitCode::Success
        }
        Err(e) => {
            // The provider's message is passed through untouched.
            formatter.error(&e.to_string());
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
        let args = DeleteArgs {
            file_id: "abc123".into(),
            credentials: Some(temp_dir.path().join("credentials.json")),
        };

        let code = execute(args, OutputConfig::default()).await;
        assert_eq!(code, ExitCode::NotFound);
    }
}
