//! Runtime configuration of a ledger client.

use std::path::Path;

use committee_core::clock::SystemClock;
use committee_shared::{AppError, AppResult};
use serde::Deserialize;

/// Client settings, read from a JSON file such as:
///
/// ```json
/// { "apiBaseUrl": "https://api.example.org", "timezone": "Australia/Perth" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the ledger API.
    #[serde(default)]
    pub api_base_url: String,
    /// IANA time zone deciding the current month. UTC when absent.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl ClientConfig {
    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] if the file cannot be read or
    /// parsed, or if `apiBaseUrl` is empty.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).format(config::FileFormat::Json))
            .build()?;
        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Parses and validates configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] if the text is not valid JSON or
    /// `apiBaseUrl` is empty.
    pub fn from_json(text: &str) -> AppResult<Self> {
        let parsed: Self = serde_json::from_str(text)
            .map_err(|e| AppError::Configuration(format!("invalid client config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> AppResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(AppError::Configuration(
                "apiBaseUrl is missing in config.json".to_string(),
            ));
        }
        Ok(())
    }

    /// Wall clock in the configured time zone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidTimezone`] for an unknown zone name.
    pub fn clock(&self) -> AppResult<SystemClock> {
        match self.timezone.as_deref().map(str::trim) {
            None | Some("") => Ok(SystemClock::default()),
            Some(name) => SystemClock::from_name(name),
        }
    }
}
