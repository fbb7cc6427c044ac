//! auth command - One-time browser consent flow
//!
//! Parses the client-secret file, binds the local callback listener, walks
//! the user through the provider's consent screen and stores the resulting
//! token set. Every other subcommand reads that file.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use gd_core::{ClientSecrets, CredentialStore};
use gd_drive::InstalledFlow;

use crate::commands::config_defaults;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Run the one-time browser consent flow and store credentials
#[derive(Args, Debug)]
pub struct AuthArgs {
    /// Client secret file issued for your Google application
    #[arg(short = 's', long = "secret", value_name = "SecretFile")]
    pub secret: Option<PathBuf>,

    /// Where to write the authorized user credentials
    #[arg(short = 'o', long = "output", value_name = "CredentialFile")]
    pub credentials: Option<PathBuf>,

    /// Port for the local callback listener launched during authentication
    #[arg(short = 'p', long = "port", value_name = "Port")]
    pub port: Option<u16>,
}

#[derive(Debug, Serialize)]
struct AuthOutput {
    status: &'static str,
    credential_file: String,
    scopes: Vec<String>,
}

/// Execute the auth command
pub async fn execute(args: AuthArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let defaults = config_defaults();

    let secret_path = args.secret.unwrap_or(defaults.secret_file);
    let creds_path = args.credentials.unwrap_or(defaults.credential_file);
    let port = args.port.unwrap_or(defaults.port);

    // The secret file is parsed before anything touches the network or binds
    // a socket; a malformed file never reaches the listener.
    let secrets = match ClientSecrets::load(&secret_path) {
        Ok(s) => s,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let flow = match InstalledFlow::new(&secrets) {
        Ok(f) => f,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let pending = match flow.begin(port).await {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    formatter.prompt(&format!(
        "Open this URL in your browser to authorize gdrive:\n\n  {}\n",
        pending.authorize_url()
    ));
    formatter.prompt("Waiting for the browser redirect...");

    let creds = match pending.finish().await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let store = CredentialStore::new(&creds_path);
    if let Err(e) = store.save(&creds) {
        formatter.error(&format!("Failed to write credential file: {e}"));
        return ExitCode::from_error(&e);
    }

    if formatter.is_json() {
        formatter.json(&AuthOutput {
            status: "success",
            credential_file: creds_path.display().to_string(),
            scopes: creds.scopes.clone(),
        });
    } else {
        formatter.success(&format!(
            "Authorization complete. Credentials written to {}",
            creds_path.display()
        ));
    }

    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_secret_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let args = AuthArgs {
            secret: Some(temp_dir.path().join("missing_secret.json")),
            credentials: Some(temp_dir.path().join("creds.json")),
            port: Some(0),
        };

        let code = execute(args, OutputConfig::default()).await;
        assert_eq!(code, ExitCode::NotFound);
    }

    #[tokio::test]
    async fn test_malformed_secret_file_is_usage_error() {
        // A parse failure must surface before the listener bind step.
        let temp_dir = TempDir::new().unwrap();
        let secret_path = temp_dir.path().join("client_secret.json");
        std::fs::write(&secret_path, "{ definitely not json").unwrap();

        let args = AuthArgs {
            secret: Some(secret_path),
            credentials: Some(temp_dir.path().join("creds.json")),
            port: Some(0),
        };

        let code = execute(args, OutputConfig::default()).await;
        assert_eq!(code, ExitCode::UsageError);
    }

    #[tokio::test]
    async fn test_secret_without_app_section_is_usage_error() {
        let temp_dir = TempDir::new().unwrap();
        let secret_path = temp_dir.path().join("client_secret.json");
        std::fs::write(&secret_path, r#"{"unexpected": {}}"#).unwrap();

        let args = AuthArgs {
            secret: Some(secret_path),
            credentials: Some(temp_dir.path().join("creds.json")),
            port: Some(0),
        };

        let code = execute(args, OutputConfig::default()).await;
        assert_eq!(code, ExitCode::UsageError);
    }
}
