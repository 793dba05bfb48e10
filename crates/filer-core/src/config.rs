// crates/filer-core/src/config.rs - Configuration System
//
// This module provides the configuration schema and loading mechanism for the
// filer CLI tool.
//
// CONFIGURATION HIERARCHY (highest to lowest priority):
// 1. Command-line arguments (--config, --app, etc.)
// 2. Environment variables (TERMINUS_FILER_*_LOC, FILER_TERMINUS_BIN)
// 3. Config file ($FILER_CONFIG or ~/.config/filer/config.toml)
// 4. Built-in defaults
//
// Missing config files are fine; broken ones are reported with the file name
// so the user knows what to fix.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::platform::KnownClient;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "FILER_CONFIG";
/// Environment variable overriding the Terminus binary
pub const TERMINUS_BIN_ENV: &str = "FILER_TERMINUS_BIN";

/// Errors that can occur during configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid TOML syntax in {file}: {error}")]
    ParseError { file: String, error: String },

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("Invalid site environment '{0}': expected the format <site>.<env>")]
    InvalidTarget(String),

    #[error("I/O error reading config: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Complete configuration schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilerConfig {
    /// Install path overrides for path-based clients
    #[serde(default)]
    pub clients: ClientPaths,

    /// How SFTP endpoints and public domains are derived
    #[serde(default)]
    pub hosting: HostingConfig,

    /// Site lookup through the Terminus CLI
    #[serde(default)]
    pub terminus: TerminusConfig,

    /// Locally catalogued sites, keyed by site name
    #[serde(default)]
    pub sites: BTreeMap<String, SiteEntry>,
}

/// Install path overrides, one per path-based client
///
/// `None` means "use the platform default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientPaths {
    #[serde(default)]
    pub bitkinex: Option<String>,
    #[serde(default)]
    pub cyberduck: Option<String>,
    #[serde(default)]
    pub filezilla: Option<String>,
    #[serde(default)]
    pub winscp: Option<String>,
    #[serde(default)]
    pub sftp: Option<String>,
}

impl ClientPaths {
    pub fn get(&self, client: KnownClient) -> Option<&str> {
        self.slot(client).as_deref()
    }

    pub fn set(&mut self, client: KnownClient, path: String) {
        *self.slot_mut(client) = Some(path);
    }

    fn slot(&self, client: KnownClient) -> &Option<String> {
        match client {
            KnownClient::BitKinex => &self.bitkinex,
            KnownClient::Cyberduck => &self.cyberduck,
            KnownClient::FileZilla => &self.filezilla,
            KnownClient::WinScp => &self.winscp,
            KnownClient::Sftp => &self.sftp,
        }
    }

    fn slot_mut(&mut self, client: KnownClient) -> &mut Option<String> {
        match client {
            KnownClient::BitKinex => &mut self.bitkinex,
            KnownClient::Cyberduck => &mut self.cyberduck,
            KnownClient::FileZilla => &mut self.filezilla,
            KnownClient::WinScp => &mut self.winscp,
            KnownClient::Sftp => &mut self.sftp,
        }
    }
}

/// Hosting platform conventions
///
/// `<env>-<site-name>.<domain_suffix>` is the public environment domain for
/// every site. The endpoint fields only apply to sites catalogued under
/// `[sites]`, which are named `appserver.<env>.<site-id>.<appserver_suffix>`
/// on `ssh_port`; Terminus reports its own endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostingConfig {
    /// Suffix of public environment domains
    #[serde(default = "default_domain_suffix")]
    pub domain_suffix: String,

    /// Suffix of application server hostnames
    #[serde(default = "default_appserver_suffix")]
    pub appserver_suffix: String,

    /// SFTP port on the application servers
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,

    /// Single SSH gateway used instead of per-environment hosts
    #[serde(default)]
    pub ssh_host: Option<String>,
}

/// Terminus CLI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminusConfig {
    /// Binary used for site lookups
    #[serde(default = "default_terminus_binary")]
    pub binary: String,
}

/// A site known without asking the hosting platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteEntry {
    /// Site UUID
    pub id: String,

    /// Environments that may be opened; empty means any
    #[serde(default)]
    pub environments: Vec<String>,
}

/// Configuration loading and management
pub struct ConfigManager;

impl ConfigManager {
    /// Load complete configuration from all sources
    ///
    /// LOADING STRATEGY:
    /// 1. Start with built-in defaults
    /// 2. Override with the config file (explicit path, $FILER_CONFIG, or the
    ///    per-user default location) if it exists
    /// 3. Override with environment variables
    /// 4. Validate
    pub fn load_config(explicit: Option<&Path>) -> ConfigResult<FilerConfig> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(Self::config_path);

        let mut config = match path {
            Some(path) => Self::try_load_file(&path)?.unwrap_or_default(),
            None => FilerConfig::default(),
        };

        Self::apply_env_overrides(&mut config, |key| env::var(key).ok());
        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Location of the config file when none is given on the command line
    ///
    /// - $FILER_CONFIG when set
    /// - Linux: ~/.config/filer/config.toml
    /// - macOS: ~/Library/Application Support/filer/config.toml
    /// - Windows: %APPDATA%\filer\config.toml
    pub fn config_path() -> Option<PathBuf> {
        env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|dir| dir.join("filer").join("config.toml")))
    }

    /// Parse a config file, returning `None` when it does not exist
    pub fn try_load_file(path: &Path) -> ConfigResult<Option<FilerConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path).map(Some)
    }

    fn parse(content: &str, path: &Path) -> ConfigResult<FilerConfig> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            file: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Apply environment variable overrides
    ///
    /// - TERMINUS_FILER_<CLIENT>_LOC -> clients.<client>
    /// - FILER_TERMINUS_BIN -> terminus.binary
    ///
    /// Empty values are ignored, as if the variable were unset.
    pub fn apply_env_overrides<F>(config: &mut FilerConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.is_empty());

        for client in KnownClient::ALL {
            if let Some(path) = read(client.env_var()) {
                config.clients.set(client, path);
            }
        }

        if let Some(binary) = read(TERMINUS_BIN_ENV) {
            config.terminus.binary = binary;
        }
    }

    /// Validate the final configuration
    pub fn validate_config(config: &FilerConfig) -> ConfigResult<()> {
        if config.hosting.ssh_port == 0 {
            return Err(ConfigError::ValidationError(
                "hosting.ssh_port must be between 1 and 65535".to_string(),
            ));
        }

        if config.hosting.domain_suffix.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "hosting.domain_suffix cannot be empty".to_string(),
            ));
        }

        if config.terminus.binary.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "terminus.binary cannot be empty".to_string(),
            ));
        }

        for (name, entry) in &config.sites {
            if entry.id.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "sites.{name}.id cannot be empty"
                )));
            }
        }

        Ok(())
    }

    /// Generate a default configuration file with comments
    pub fn generate_default_config() -> String {
        r#"# Filer Configuration File
#
# Lines starting with # are comments and are ignored.

[clients]
# Install path overrides. Each can also be set with an environment variable:
# TERMINUS_FILER_BITKINEX_LOC, TERMINUS_FILER_CYBERDUCK_LOC,
# TERMINUS_FILER_FILEZILLA_LOC, TERMINUS_FILER_WINSCP_LOC, TERMINUS_FILER_SFTP_LOC
# filezilla = "/usr/bin/filezilla"
# sftp = "sftp"

[hosting]
# Public environment domains are <env>-<site>.<domain_suffix>
domain_suffix = "pantheon.io"

# Endpoints of catalogued [sites] (Terminus reports its own):
# application servers are appserver.<env>.<site-id>.<appserver_suffix>
appserver_suffix = "drush.in"

# SFTP port on the application servers
ssh_port = 2222

# Route every connection through a single SSH gateway
# ssh_host = "ssh.example.com"

[terminus]
# Binary used to look up sites (also FILER_TERMINUS_BIN)
binary = "terminus"

# Sites listed here are resolved without calling Terminus.
# [sites.my-site]
# id = "00000000-0000-0000-0000-000000000000"
# environments = ["dev", "test", "live"]
"#
        .to_string()
    }
}

// Default value functions for serde
fn default_domain_suffix() -> String {
    "pantheon.io".to_string()
}
fn default_appserver_suffix() -> String {
    "drush.in".to_string()
}
fn default_ssh_port() -> u16 {
    2222
}
fn default_terminus_binary() -> String {
    "terminus".to_string()
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            domain_suffix: default_domain_suffix(),
            appserver_suffix: default_appserver_suffix(),
            ssh_port: default_ssh_port(),
            ssh_host: None,
        }
    }
}

impl Default for TerminusConfig {
    fn default() -> Self {
        Self {
            binary: default_terminus_binary(),
        }
    }
}
