//! Core business logic for the committee ledger.
//!
//! This crate contains the ledger engine with ZERO web dependencies.
//! Domain types, validation rules, and balance calculations live here,
//! alongside the storage boundary the engine persists through.
//!
//! # Modules
//!
//! - `ledger` - Monthly ledgers, reconciliation, entry, categories, bank import
//! - `clock` - Injected source of the current month
//! - `storage` - `LedgerStore` trait and the OpenDAL blob store
//! - `session` - Type-switch race guarding and optimistic saves

pub mod clock;
pub mod ledger;
pub mod session;
pub mod storage;
