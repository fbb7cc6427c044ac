//! query command - List files by name substring
//!
//! Fetches one provider page of files whose name contains the given
//! substring. When the provider reports more results, the truncation is
//! surfaced instead of silently dropped.

use std::path::PathBuf;

use clap::Args;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use gd_core::{CredentialStore, DriveFile, DriveStore as _};
use gd_drive::DriveClient;

use crate::commands::resolve_credential_file;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List files whose name contains a substring
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Name substring to search for
    #[arg(value_name = "FileName")]
    pub name: String,

    /// Sort order for results
    #[arg(long = "order-by", value_name = "Field", default_value = gd_core::DEFAULT_ORDER)]
    pub order_by: String,

    /// Authorized credential file
    #[arg(short = 'c', long = "credentials", value_name = "CredentialFile")]
    pub credentials: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct QueryOutput {
    files: Vec<DriveFile>,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_page_token: Option<String>,
}

/// Execute the query command
pub async fn execute(args: QueryArgs, output_config: OutputConfig) -> ExitCode {
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

    match client.query_files(&args.name, &args.order_by).await {
        Ok(result) => {
            if result.next_page_token.is_some() {
                formatter.warning(
                    "More results exist than one page; refine the query to see the rest.",
                );
            }

            if formatter.is_json() {
                formatter.json(&QueryOutput {
                    total: result.files.len(),
                    files: result.files,
                    next_page_token: result.next_page_token,
                });
            } else if result.files.is_empty() {
                formatter.println(&format!("No files matching '{}'", args.name));
            } else {
                formatter.println(&render_table(&result.files));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Query failed: {e}"));
            ExitCode::from_error(&e)
        }
    }
}

fn render_table(files: &[DriveFile]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "NAME", "CREATED"]);

    for file in files {
        let created = file
            .created_time
            .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        table.add_row(vec![file.id.clone(), file.name.clone(), created]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_credential_file_fails_fast() {
        let temp_dir = TempDir::new().unwrap();
        let args = QueryArgs {
            name: "report".into(),
            order_by: gd_core::DEFAULT_ORDER.into(),
            credentials: Some(temp_dir.path().join("credentials.json")),
        };

        let code = execute(args, OutputConfig::default()).await;
        assert_eq!(code, ExitCode::NotFound);
    }

    #[test]
    fn test_render_table_lists_ids_and_names() {
        let files = vec![
            DriveFile {
                id: "a1".into(),
                name: "annual report.pdf".into(),
                mime_type: Some("application/pdf".into()),
                created_time: Some("2024-01-15T10:00:00Z".parse().unwrap()),
                parents: None,
            },
            DriveFile {
                id: "b2".into(),
                name: "report-final.txt".into(),
                mime_type: None,
                created_time: None,
                parents: None,
            },
        ];

        let rendered = render_table(&files);
        assert!(rendered.contains("a1"));
        assert!(rendered.contains("annual report.pdf"));
        assert!(rendered.contains("b2"));
        assert!(rendered.contains("2024-01-15"));
    }
}
