//! Client side of the committee ledger.
//!
//! This crate provides:
//! - [`ClientConfig`], read from the runtime `config.json`
//! - [`HttpLedgerStore`], a [`LedgerStore`](committee_core::storage::LedgerStore)
//!   that talks to the ledger API over HTTP

mod config;
mod http;

pub use config::ClientConfig;
pub use http::HttpLedgerStore;
