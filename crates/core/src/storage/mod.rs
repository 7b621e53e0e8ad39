//! Ledger persistence using Apache OpenDAL.
//!
//! Every monthly ledger is one JSON blob, and the category list is one more:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                              │
//! │          (S3 in production, local fs in dev, memory in tests)    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ ledger/BANK/2025-01.json   │ ledger/CASH/2025-01.json           │
//! │ ledger/BANK/2025-02.json   │ categories.json                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`LedgerStore`] is the seam the ledger session talks to. The blob store
//! implements it on the server side; the HTTP client implements it remotely.

mod config;
mod error;
mod service;

use std::sync::Arc;

use async_trait::async_trait;

use crate::ledger::{AccountType, CategoryList, MonthlyLedger};

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{ledger_dir, ledger_key, BlobLedgerStore};

/// Async persistence boundary for month sets and the category list.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetches every stored month of one account type.
    async fn fetch(&self, ledger_type: AccountType) -> Result<Vec<MonthlyLedger>, StorageError>;

    /// Saves the given months of one account type.
    async fn save(&self, ledger_type: AccountType, ledgers: &[MonthlyLedger]) -> Result<(), StorageError>;

    /// Fetches the category list, defaults when none is stored.
    async fn fetch_categories(&self) -> Result<CategoryList, StorageError>;

    /// Replaces the category list.
    async fn save_categories(&self, categories: &CategoryList) -> Result<(), StorageError>;
}

#[async_trait]
impl<S: LedgerStore + ?Sized> LedgerStore for Arc<S> {
    async fn fetch(&self, ledger_type: AccountType) -> Result<Vec<MonthlyLedger>, StorageError> {
        (**self).fetch(ledger_type).await
    }

    async fn save(&self, ledger_type: AccountType, ledgers: &[MonthlyLedger]) -> Result<(), StorageError> {
        (**self).save(ledger_type, ledgers).await
    }

    async fn fetch_categories(&self) -> Result<CategoryList, StorageError> {
        (**self).fetch_categories().await
    }

    async fn save_categories(&self, categories: &CategoryList) -> Result<(), StorageError> {
        (**self).save_categories(categories).await
    }
}
