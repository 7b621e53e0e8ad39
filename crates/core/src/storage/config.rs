//! Storage configuration types.

use committee_shared::config::{default_categories, StorageSettings};
use committee_shared::AppConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: AWS S3, Cloudflare R2, MinIO
    S3 {
        /// S3 bucket name.
        bucket: String,
        /// AWS region; taken from the environment when absent.
        region: Option<String>,
        /// Custom endpoint URL; AWS when absent.
        endpoint: Option<String>,
        /// Static access key ID; the default credential chain when absent.
        access_key_id: Option<String>,
        /// Static secret access key.
        secret_access_key: Option<String>,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// Process memory (tests only)
    Memory,
}

impl StorageProvider {
    /// Create S3 provider using the default credential chain.
    #[must_use]
    pub fn s3(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self::S3 {
            bucket: bucket.into(),
            region: Some(region.into()),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Create in-memory provider (tests only).
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory
    }

    /// Build a provider from the `[storage]` settings section.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown provider name or an S3 provider
    /// without a bucket.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        match settings.provider.trim().to_ascii_lowercase().as_str() {
            "local" | "fs" => Ok(Self::local_fs(settings.root.clone())),
            "memory" => Ok(Self::Memory),
            "s3" => {
                let bucket = settings
                    .bucket
                    .clone()
                    .filter(|b| !b.trim().is_empty())
                    .ok_or_else(|| StorageError::configuration("s3 provider requires a bucket"))?;
                Ok(Self::S3 {
                    bucket,
                    region: settings.region.clone(),
                    endpoint: settings.endpoint.clone(),
                    access_key_id: settings.access_key_id.clone(),
                    secret_access_key: settings.secret_access_key.clone(),
                })
            }
            other => Err(StorageError::configuration(format!(
                "unknown storage provider '{other}'"
            ))),
        }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }

    /// Get the bucket name or root directory.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
            Self::Memory => "memory",
        }
    }
}

/// Ledger store configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// How many months a single-month fetch searches back for a previous close.
    pub lookback_months: u32,
    /// Categories served while none are stored.
    pub default_categories: Vec<String>,
}

impl StorageConfig {
    /// Default lookback: 6 months.
    pub const DEFAULT_LOOKBACK_MONTHS: u32 = 6;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            lookback_months: Self::DEFAULT_LOOKBACK_MONTHS,
            default_categories: default_categories(),
        }
    }

    /// Build the store configuration from application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider settings are invalid.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, StorageError> {
        Ok(Self::new(StorageProvider::from_settings(&config.storage)?)
            .with_lookback_months(config.ledger.lookback_months)
            .with_default_categories(config.ledger.default_categories.clone()))
    }

    /// Set the lookback window.
    #[must_use]
    pub fn with_lookback_months(mut self, months: u32) -> Self {
        self.lookback_months = months;
        self
    }

    /// Set the default categories.
    #[must_use]
    pub fn with_default_categories(mut self, categories: Vec<String>) -> Self {
        self.default_categories = categories;
        self
    }
}
