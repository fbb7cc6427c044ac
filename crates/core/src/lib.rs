//! gd-core: Core library for the gdrive CLI client
//!
//! This crate provides the core functionality for the gdrive CLI, including:
//! - Configuration management
//! - Credential persistence
//! - Client-secret file parsing
//! - DriveStore trait for the remote storage operations
//!
//! This crate is designed to be independent of any HTTP or OAuth
//! implementation, allowing for easy testing of everything above the
//! vendor adapter.

pub mod config;
pub mod credentials;
pub mod error;
pub mod secret;
pub mod traits;

pub use config::{Config, ConfigManager, Defaults};
pub use credentials::{CredentialStore, StoredCredentials, DRIVE_SCOPE};
pub use error::{Error, Result};
pub use secret::{AppSecret, ClientSecrets};
pub use traits::{DriveFile, DriveStore, QueryResult, UploadRequest, DEFAULT_ORDER, FOLDER_MIME_TYPE};
