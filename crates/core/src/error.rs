//! Error types for gd-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for gd-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gd-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration or client-secret file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential file is missing
    #[error("Credential file not found: {0} (run `gdrive auth` first)")]
    CredentialsNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Permission denied by the provider
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider quota or rate limit exceeded
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,                                   // UsageError
            Error::Network(_) => 3,                                  // NetworkError
            Error::Auth(_) | Error::PermissionDenied(_) => 4,        // AuthError
            Error::NotFound(_) | Error::CredentialsNotFound(_) => 5, // NotFound
            Error::QuotaExceeded(_) => 6,                            // QuotaExceeded
            _ => 1,                                                  // GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::PermissionDenied("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::CredentialsNotFound("creds.json".into()).exit_code(), 5);
        assert_eq!(Error::QuotaExceeded("test".into()).exit_code(), 6);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Error::CredentialsNotFound("credentials.json".into());
        assert!(err.to_string().contains("credentials.json"));
        assert!(err.to_string().contains("gdrive auth"));

        let err = Error::NotFound("File not found: abc123.".into());
        assert_eq!(err.to_string(), "Not found: File not found: abc123.");
    }
}
