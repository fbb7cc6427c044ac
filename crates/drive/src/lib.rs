//! gd-drive: Google Drive adapter for the gdrive CLI
//!
//! Implements the two pieces that talk to Google:
//! - the OAuth2 installed-app consent flow with a local callback listener
//! - the DriveStore trait from gd-core over the Drive v3 REST API

pub mod auth;
pub mod client;

pub use auth::{InstalledFlow, PendingAuthorization};
pub use client::DriveClient;
