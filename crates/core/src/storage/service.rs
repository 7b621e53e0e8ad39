//! Ledger store implementation using Apache OpenDAL.

use async_trait::async_trait;
use committee_shared::types::Month;
use opendal::{services, ErrorKind, Operator};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use super::LedgerStore;
use crate::ledger::{close_month, AccountType, CategoryList, MonthlyLedger};

const LEDGER_PREFIX: &str = "ledger";
const CATEGORIES_KEY: &str = "categories.json";

/// Directory holding every month of one account type.
///
/// Format: `ledger/{TYPE}/`
#[must_use]
pub fn ledger_dir(ledger_type: AccountType) -> String {
    format!("{LEDGER_PREFIX}/{ledger_type}/")
}

/// Storage key of one monthly ledger.
///
/// Format: `ledger/{TYPE}/{YYYY-MM}.json`
#[must_use]
pub fn ledger_key(ledger_type: AccountType, month: Month) -> String {
    format!("{LEDGER_PREFIX}/{ledger_type}/{month}.json")
}

/// Ledger store over a blob container: one JSON document per month.
pub struct BlobLedgerStore {
    operator: Operator,
    config: StorageConfig,
}

impl BlobLedgerStore {
    /// Create a new ledger store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        info!(
            provider = config.provider.name(),
            bucket = config.provider.bucket(),
            "Ledger store initialized"
        );
        Ok(Self { operator, config })
    }

    /// In-memory store with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory backend cannot be initialized.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::from_config(StorageConfig::new(StorageProvider::memory()))
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                bucket,
                region,
                endpoint,
                access_key_id,
                secret_access_key,
            } => {
                let mut builder = services::S3::default().bucket(bucket);
                if let Some(region) = region {
                    builder = builder.region(region);
                }
                if let Some(endpoint) = endpoint {
                    builder = builder.endpoint(endpoint);
                }
                if let Some(key) = access_key_id {
                    builder = builder.access_key_id(key);
                }
                if let Some(secret) = secret_access_key {
                    builder = builder.secret_access_key(secret);
                }
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                Operator::new(services::Fs::default().root(root))
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
        };
        Ok(operator)
    }

    /// Reads one stored month, `None` if it was never saved.
    async fn read_ledger(
        &self,
        ledger_type: AccountType,
        month: Month,
    ) -> Result<Option<MonthlyLedger>, StorageError> {
        let key = ledger_key(ledger_type, month);
        let bytes = match self.operator.read(&key).await {
            Ok(buffer) => buffer.to_vec(),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let ledger: MonthlyLedger = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Serialization(format!("{key}: {e}")))?;
        if ledger.ledger_type != ledger_type || ledger.month != month {
            return Err(StorageError::InvalidKey(format!(
                "{key} holds {}",
                ledger.key()
            )));
        }
        Ok(Some(ledger))
    }

    /// Months stored for an account type, ascending.
    async fn stored_months(&self, ledger_type: AccountType) -> Result<Vec<Month>, StorageError> {
        let entries = match self.operator.list(&ledger_dir(ledger_type)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut months: Vec<Month> = entries
            .iter()
            .filter_map(|entry| entry.name().strip_suffix(".json"))
            .filter_map(|name| name.parse().ok())
            .collect();
        months.sort_unstable();
        Ok(months)
    }

    /// Every stored month of an account type, ascending, as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if listing or reading fails or a blob is malformed.
    pub async fn fetch_all(&self, ledger_type: AccountType) -> Result<Vec<MonthlyLedger>, StorageError> {
        let months = self.stored_months(ledger_type).await?;
        let mut ledgers = Vec::with_capacity(months.len());
        for month in months {
            if let Some(ledger) = self.read_ledger(ledger_type, month).await? {
                ledgers.push(ledger);
            }
        }
        debug!(%ledger_type, count = ledgers.len(), "Fetched ledgers");
        Ok(ledgers)
    }

    /// Closing balance of the nearest stored month before `month`, searching
    /// back at most `lookback_months`.
    ///
    /// # Errors
    ///
    /// Returns an error if a previous month exists but cannot be read.
    pub async fn previous_closing(
        &self,
        ledger_type: AccountType,
        month: Month,
    ) -> Result<Option<Decimal>, StorageError> {
        let mut candidate = month;
        for _ in 0..self.config.lookback_months {
            candidate = candidate.pred();
            if let Some(previous) = self.read_ledger(ledger_type, candidate).await? {
                debug!(%ledger_type, %month, previous = %candidate, "Found previous closing balance");
                return Ok(Some(previous.closing_balance));
            }
        }
        Ok(None)
    }

    /// One month with its opening balance carried over from the nearest
    /// previous stored month.
    ///
    /// A month that was never saved comes back empty, opening and closing at
    /// the carried balance (or zero).
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or a blob is malformed.
    pub async fn fetch_month(
        &self,
        ledger_type: AccountType,
        month: Month,
    ) -> Result<MonthlyLedger, StorageError> {
        let ledger = match self.read_ledger(ledger_type, month).await? {
            Some(ledger) => ledger,
            None => {
                debug!(%ledger_type, %month, "Ledger not stored, returning empty month");
                MonthlyLedger::new(ledger_type, month, Decimal::ZERO)
            }
        };
        self.carry_into(ledger).await
    }

    /// Like [`fetch_month`](Self::fetch_month), but a month that was never
    /// saved is an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] for an unsaved month, or an error if
    /// reading fails or a blob is malformed.
    pub async fn fetch_stored_month(
        &self,
        ledger_type: AccountType,
        month: Month,
    ) -> Result<MonthlyLedger, StorageError> {
        let ledger = self
            .read_ledger(ledger_type, month)
            .await?
            .ok_or_else(|| StorageError::not_found(ledger_key(ledger_type, month)))?;
        self.carry_into(ledger).await
    }

    /// Opens `ledger` at the nearest previous closing balance and recomputes it.
    async fn carry_into(&self, mut ledger: MonthlyLedger) -> Result<MonthlyLedger, StorageError> {
        let (ledger_type, month) = (ledger.ledger_type, ledger.month);
        let carried = self.previous_closing(ledger_type, month).await?;
        let opening = carried.unwrap_or(ledger.opening_balance);
        close_month(&mut ledger, opening).map_err(|e| {
            warn!(%ledger_type, %month, error = %e, "Stored ledger cannot be closed");
            StorageError::Serialization(e.to_string())
        })?;
        Ok(ledger)
    }

    /// Writes each ledger to its month key, leaving other months untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if a ledger belongs to another
    /// account type, or an error if a write fails.
    pub async fn save_all(
        &self,
        ledger_type: AccountType,
        ledgers: &[MonthlyLedger],
    ) -> Result<(), StorageError> {
        if let Some(foreign) = ledgers.iter().find(|l| l.ledger_type != ledger_type) {
            return Err(StorageError::InvalidKey(format!(
                "{} cannot be saved under {}",
                foreign.key(),
                ledger_dir(ledger_type)
            )));
        }

        for ledger in ledgers {
            let key = ledger_key(ledger_type, ledger.month);
            let body = serde_json::to_vec(ledger)?;
            self.operator.write(&key, body).await?;
        }
        info!(%ledger_type, count = ledgers.len(), "Saved ledgers");
        Ok(())
    }

    /// Stored category list, or the configured defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the blob is malformed.
    pub async fn load_categories(&self) -> Result<CategoryList, StorageError> {
        match self.operator.read(CATEGORIES_KEY).await {
            Ok(buffer) => Ok(serde_json::from_slice(&buffer.to_vec())?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Ok(CategoryList::new(&self.config.default_categories))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the stored category list.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn store_categories(&self, categories: &CategoryList) -> Result<(), StorageError> {
        let body = serde_json::to_vec(categories)?;
        self.operator.write(CATEGORIES_KEY, body).await?;
        info!(count = categories.len(), "Saved categories");
        Ok(())
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

#[async_trait]
impl LedgerStore for BlobLedgerStore {
    async fn fetch(&self, ledger_type: AccountType) -> Result<Vec<MonthlyLedger>, StorageError> {
        self.fetch_all(ledger_type).await
    }

    async fn save(&self, ledger_type: AccountType, ledgers: &[MonthlyLedger]) -> Result<(), StorageError> {
        self.save_all(ledger_type, ledgers).await
    }

    async fn fetch_categories(&self) -> Result<CategoryList, StorageError> {
        self.load_categories().await
    }

    async fn save_categories(&self, categories: &CategoryList) -> Result<(), StorageError> {
        self.store_categories(categories).await
    }
}
