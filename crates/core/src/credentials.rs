//! Credential persistence
//!
//! Stores an authorized-user token set on disk in the JSON shape the OAuth
//! provider issues: access token, refresh token, token endpoint and client
//! identity, plus granted scopes and expiry. The file is written verbatim and
//! re-read verbatim; token freshness is not validated here. Refreshing an
//! expired token is delegated to the auth layer at call time.

use std::path::{Path, PathBuf};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The Drive scope requested during authorization
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// An authorized-user credential set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Access token used as the bearer token on API calls
    pub token: String,

    /// Refresh token used to mint a new access token once expired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token endpoint the refresh grant is sent to
    pub token_uri: String,

    /// OAuth client id of the calling application
    pub client_id: String,

    /// OAuth client secret of the calling application
    pub client_secret: String,

    /// Scopes granted to this token set
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Access token expiry, RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<Timestamp>,
}

impl StoredCredentials {
    /// Build a credential set from the raw authorized-user JSON document
    pub fn from_authorized_user_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a credential set from a completed token grant
    #[allow(clippy::too_many_arguments)]
    pub fn from_token_grant(
        token: String,
        refresh_token: Option<String>,
        token_uri: String,
        client_id: String,
        client_secret: String,
        scopes: Vec<String>,
        expiry: Option<Timestamp>,
    ) -> Self {
        Self {
            token,
            refresh_token,
            token_uri,
            client_id,
            client_secret,
            scopes,
            expiry,
        }
    }

    /// Whether the access token has expired (with a small clock-skew margin)
    ///
    /// Credentials without a recorded expiry are treated as still valid; the
    /// provider rejects them with 401 if they are not.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= now + jiff::SignedDuration::from_secs(60),
            None => false,
        }
    }
}

/// Reads and writes the credential file
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Create a store for the given credential file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the credential file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load credentials from disk
    ///
    /// Fails with [`Error::CredentialsNotFound`] when the file is missing and
    /// with a JSON error when it is malformed. Every non-auth subcommand calls
    /// this before touching the network.
    pub fn load(&self) -> Result<StoredCredentials> {
        if !self.path.exists() {
            return Err(Error::CredentialsNotFound(self.path.display().to_string()));
        }

        let content = std::fs::read_to_string(&self.path)?;
        let creds = StoredCredentials::from_authorized_user_json(&content)?;
        tracing::debug!(path = %self.path.display(), "loaded credentials");
        Ok(creds)
    }

    /// Save credentials to disk, overwriting any existing file
    ///
    /// Sets file permissions to 600 (owner read/write only).
    pub fn save(&self, creds: &StoredCredentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(creds)?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)?;
        }

        tracing::debug!(path = %self.path.display(), "saved credentials");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_credentials() -> StoredCredentials {
        StoredCredentials::from_token_grant(
            "ya29.access".into(),
            Some("1//refresh".into()),
            "https://oauth2.googleapis.com/token".into(),
            "client-id.apps.googleusercontent.com".into(),
            "client-secret".into(),
            vec![DRIVE_SCOPE.to_string()],
            Some("2030-01-01T00:00:00Z".parse().unwrap()),
        )
    }

    #[test]
    fn test_round_trip_preserves_token_set() {
        let temp_dir = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path().join("credentials.json"));

        let creds = sample_credentials();
        store.save(&creds).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, creds);
        assert_eq!(loaded.token, "ya29.access");
        assert_eq!(loaded.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(loaded.scopes, vec![DRIVE_SCOPE.to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path().join("credentials.json"));

        let result = store.load();
        assert!(matches!(result, Err(Error::CredentialsNotFound(_))));
        assert_eq!(result.unwrap_err().exit_code(), 5);
    }

    #[test]
    fn test_load_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = CredentialStore::new(path).load();
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_from_authorized_user_json_ignores_extra_fields() {
        // Providers include bookkeeping fields the CLI does not model.
        let json = r#"{
            "token": "t",
            "refresh_token": "r",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "c",
            "client_secret": "s",
            "scopes": ["https://www.googleapis.com/auth/drive"],
            "type": "authorized_user",
            "universe_domain": "googleapis.com"
        }"#;

        let creds = StoredCredentials::from_authorized_user_json(json).unwrap();
        assert_eq!(creds.token, "t");
        assert!(creds.expiry.is_none());
    }

    #[test]
    fn test_is_expired() {
        let now: Timestamp = "2026-01-01T00:00:00Z".parse().unwrap();
        let mut creds = sample_credentials();

        creds.expiry = Some("2026-01-01T01:00:00Z".parse().unwrap());
        assert!(!creds.is_expired(now));

        creds.expiry = Some("2025-12-31T23:00:00Z".parse().unwrap());
        assert!(creds.is_expired(now));

        // Inside the 60s skew margin counts as expired.
        creds.expiry = Some("2026-01-01T00:00:30Z".parse().unwrap());
        assert!(creds.is_expired(now));

        creds.expiry = None;
        assert!(!creds.is_expired(now));
    }

    #[test]
    fn test_save_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path().join("credentials.json"));

        let mut creds = sample_credentials();
        store.save(&creds).unwrap();

        creds.token = "ya29.newer".into();
        store.save(&creds).unwrap();

        assert_eq!(store.load().unwrap().token, "ya29.newer");
    }
}
