//! Shared types, errors, and configuration for the committee ledger.
//!
//! This crate provides common types used across all other crates:
//! - Calendar month and currency rounding types
//! - Transaction identifiers
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
