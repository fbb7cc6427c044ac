//! upload command - Upload a local file
//!
//! Uploads a local file, optionally renamed and into a specific folder,
//! and prints the new file's id.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use gd_core::{CredentialStore, DriveStore as _, UploadRequest};
use gd_drive::DriveClient;

use crate::commands::resolve_credential_file;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Upload a local file
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file to upload
    #[arg(value_name = "filename")]
    pub filename: PathBuf,

    /// Upload the file under a new name
    #[arg(short = 't', long = "rename", value_name = "RenameTo")]
    pub rename_to: Option<String>,

    /// Upload the file into a specific folder
    #[arg(short = 'p', long = "parent", value_name = "FolderId")]
    pub folder_id: Option<String>,

    /// Authorized credential file
    #[arg(short = 'c', long = "credentials", value_name = "CredentialFile")]
    pub credentials: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct UploadOutput {
    status: &'static str,
    id: String,
    name: String,
    size_bytes: u64,
    size_human: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if !args.filename.is_file() {
        formatter.error(&format!("Source not found: {}", args.filename.display()));
        return ExitCode::NotFound;
    }

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

    let size_bytes = std::fs::metadata(&args.filename).map(|m| m.len()).unwrap_or(0);

    let request = UploadRequest {
        source: args.filename.clone(),
        folder_id: args.folder_id.clone(),
        rename_to: args.rename_to.clone(),
    };

    match client.upload_file(&request).await {
        Ok(file) => {
            let size_human = humansize::format_size(size_bytes, humansize::BINARY);
            if formatter.is_json() {
                formatter.json(&UploadOutput {
                    status: "success",
                    id: file.id.clone(),
                    name: file.name.clone(),
                    size_bytes,
                    size_human,
                    parent: file.parents.as_ref().and_then(|p| p.first().cloned()),
                });
            } else {
                formatter.success(&format!(
                    "Uploaded '{}' ({}) with id {}",
                    file.name, size_human, file.id
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Upload failed: {e}"));
            ExitCode::from_error(&e)
        }
    }
}
