//! DriveStore trait definition
//!
//! This trait defines the interface for the remote file-storage operations.
//! It allows the CLI to be decoupled from the concrete Drive API adapter and
//! mocked for testing.

use std::path::PathBuf;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// MIME type the provider uses to mark folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Default sort order for queries
pub const DEFAULT_ORDER: &str = "createdTime";

/// A remote file or folder reference
///
/// The id is the sole handle the CLI operates on; everything else is
/// display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Opaque id assigned by the remote service
    pub id: String,

    /// File or folder name
    pub name: String,

    /// MIME type; folders carry [`FOLDER_MIME_TYPE`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Creation timestamp, RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<Timestamp>,

    /// Parent folder ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
}

impl DriveFile {
    /// Whether this reference is a folder
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}

/// Result of a query operation
///
/// Exactly one provider page. When the provider reports more results,
/// `next_page_token` is set so callers can tell the listing was truncated;
/// the token is surfaced, never followed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Matching files in the requested order
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Continuation token, present when the listing was truncated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Parameters for an upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Local file to upload
    pub source: PathBuf,

    /// Destination folder id; the provider's root when absent
    pub folder_id: Option<String>,

    /// Name to store the file under; the source file name when absent
    pub rename_to: Option<String>,
}

impl UploadRequest {
    /// Create an upload request for a local file
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            folder_id: None,
            rename_to: None,
        }
    }

    /// The name the file will be stored under remotely
    pub fn target_name(&self) -> String {
        match &self.rename_to {
            Some(name) => name.clone(),
            None => self
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// Trait for the remote storage operations
///
/// Each method is a single round trip with no retry and no pagination.
/// Implemented by the Drive adapter and mocked or faked in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DriveStore: Send + Sync {
    /// Create a folder, returning its reference
    async fn create_folder(&self, name: &str) -> Result<DriveFile>;

    /// Upload a local file, returning the new file's reference
    async fn upload_file(&self, request: &UploadRequest) -> Result<DriveFile>;

    /// Delete a file by id; the provider's confirmation is empty
    async fn delete_file(&self, file_id: &str) -> Result<()>;

    /// List one page of files whose name contains the given substring
    async fn query_files(&self, name_contains: &str, order_by: &str) -> Result<QueryResult>;
}
