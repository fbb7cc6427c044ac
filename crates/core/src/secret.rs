//! Client-secret file parsing
//!
//! The client-secret file is the provider-issued JSON descriptor identifying
//! the calling application. It is only consumed by the consent flow; the
//! relevant fields live under an "installed" (desktop app) or "web" section.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Parsed client-secret file
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    #[serde(default)]
    installed: Option<AppSecret>,
    #[serde(default)]
    web: Option<AppSecret>,
}

/// Application identity within a client-secret file
#[derive(Debug, Clone, Deserialize)]
pub struct AppSecret {
    pub client_id: String,
    pub client_secret: String,

    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl ClientSecrets {
    /// Load and parse a client-secret file
    ///
    /// Missing file and malformed JSON are both fatal; parsing happens before
    /// the auth flow binds its callback listener.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "Client secret file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let secrets: ClientSecrets = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid client secret file: {e}")))?;

        // Validate the section now so later stages can assume it exists.
        secrets.app()?;
        Ok(secrets)
    }

    /// The application identity, from whichever section is present
    pub fn app(&self) -> Result<&AppSecret> {
        self.installed.as_ref().or(self.web.as_ref()).ok_or_else(|| {
            Error::Config("Client secret file has no \"installed\" or \"web\" section".into())
        })
    }
}
