//! Configuration management
//!
//! This module handles loading and saving the gdrive configuration file.
//! The configuration file is stored in TOML format at ~/.config/gdrive/config.toml
//! (or under $GDRIVE_CONFIG_DIR when set) and only carries defaults for the
//! per-invocation settings: the client-secret file, the credential file and the
//! callback listener port. Command-line flags always win over the file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Default client-secret file path
pub const DEFAULT_SECRET_FILE: &str = "client_secret.json";

/// Default credential file path
pub const DEFAULT_CREDENTIAL_FILE: &str = "credentials.json";

/// Default port for the local OAuth callback listener
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "GDRIVE_CONFIG_DIR";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,
}

/// Default settings for CLI behavior
///
/// This is the explicit `{secret_file, credential_file, port}` bundle handed
/// to the auth and API components instead of process-wide constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Client-secret file used by `auth`
    #[serde(default = "default_secret_file")]
    pub secret_file: PathBuf,

    /// Credential file read by every non-auth subcommand
    #[serde(default = "default_credential_file")]
    pub credential_file: PathBuf,

    /// Local callback listener port used by `auth`
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_secret_file() -> PathBuf {
    PathBuf::from(DEFAULT_SECRET_FILE)
}

fn default_credential_file() -> PathBuf {
    PathBuf::from(DEFAULT_CREDENTIAL_FILE)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            secret_file: default_secret_file(),
            credential_file: default_credential_file(),
            port: default_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
        }
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    ///
    /// Honors `GDRIVE_CONFIG_DIR` when set, otherwise uses the platform
    /// configuration directory.
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("gdrive"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade gdrive.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(config)
    }

    /// Save configuration to disk
    ///
    /// Creates parent directories if they don't exist.
    /// Sets file permissions to 600 (owner read/write only).
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.config_path, permissions)?;
        }

        Ok(())
    }
}
