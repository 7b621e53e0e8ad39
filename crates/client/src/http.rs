//! Ledger store backed by the ledger HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use committee_core::ledger::{AccountType, CategoryList, MonthlyLedger};
use committee_core::storage::{LedgerStore, StorageError};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`LedgerStore`] that reads and writes through `/ledger` endpoints.
#[derive(Debug, Clone)]
pub struct HttpLedgerStore {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpLedgerStore {
    /// Store talking to the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] for an empty URL or if the
    /// HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, StorageError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(StorageError::configuration("API base URL is empty"));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StorageError::configuration(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Store for the API named in a client configuration.
    ///
    /// # Errors
    ///
    /// See [`HttpLedgerStore::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, StorageError> {
        Self::new(config.api_base_url.as_str())
    }

    /// Sends `token` as a bearer credential on every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// API base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StorageError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StorageError::operation(format!("request failed: {e}")))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, status);
        warn!(status = status.as_u16(), %message, "Ledger API request rejected");
        if status == StatusCode::UNAUTHORIZED {
            return Err(StorageError::Unauthorized(message));
        }
        Err(StorageError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StorageError> {
        let response = self.send(self.http.get(self.url(path))).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| StorageError::operation(format!("reading response failed: {e}")))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Human-readable message from an error body: its `message` or `error`
/// field when the body is JSON, the raw text otherwise.
fn error_message(body: &str, status: StatusCode) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body).ok().and_then(|value| {
        ["message", "error"]
            .iter()
            .find_map(|field| value.get(field).and_then(|v| v.as_str()).map(str::to_string))
    });
    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

#[async_trait]
impl LedgerStore for HttpLedgerStore {
    async fn fetch(&self, ledger_type: AccountType) -> Result<Vec<MonthlyLedger>, StorageError> {
        debug!(%ledger_type, "Fetching ledgers");
        self.get_json(&format!("/ledger?type={ledger_type}")).await
    }

    async fn save(&self, ledger_type: AccountType, ledgers: &[MonthlyLedger]) -> Result<(), StorageError> {
        debug!(%ledger_type, months = ledgers.len(), "Saving ledgers");
        let request = self
            .http
            .post(self.url(&format!("/ledger?type={ledger_type}")))
            .json(ledgers);
        self.send(request).await?;
        Ok(())
    }

    async fn fetch_categories(&self) -> Result<CategoryList, StorageError> {
        self.get_json("/ledger/categories").await
    }

    async fn save_categories(&self, categories: &CategoryList) -> Result<(), StorageError> {
        debug!(count = categories.len(), "Saving categories");
        let request = self.http.post(self.url("/ledger/categories")).json(categories);
        self.send(request).await?;
        Ok(())
    }
}
