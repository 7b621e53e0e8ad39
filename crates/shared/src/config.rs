//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Ledger behaviour.
    #[serde(default)]
    pub ledger: LedgerSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Blob storage configuration.
///
/// `provider` is one of `local`, `s3` or `memory`. S3 credentials are taken
/// from the environment by the SDK chain when not given explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Storage backend name.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Root directory for the local filesystem backend.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Bucket name for the S3 backend.
    pub bucket: Option<String>,
    /// Bucket region for the S3 backend.
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services.
    pub endpoint: Option<String>,
    /// Access key ID for the S3 backend.
    pub access_key_id: Option<String>,
    /// Secret access key for the S3 backend.
    pub secret_access_key: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            root: default_root(),
            bucket: None,
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from("./data")
}

/// Ledger behaviour settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    /// How many months back a single-month fetch searches for a previous close.
    #[serde(default = "default_lookback_months")]
    pub lookback_months: u32,
    /// Categories offered when none have been stored yet.
    #[serde(default = "default_categories")]
    pub default_categories: Vec<String>,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            lookback_months: default_lookback_months(),
            default_categories: default_categories(),
        }
    }
}

fn default_lookback_months() -> u32 {
    6
}

/// Category labels offered before any custom category has been saved.
#[must_use]
pub fn default_categories() -> Vec<String> {
    [
        "Membership",
        "Event Fee",
        "Equipment",
        "Reimbursement",
        "Sponsorship",
        "Misc",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("COMMITTEE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
