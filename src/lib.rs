//! budget-ledger - income/expense ledger with category budgets
//!
//! Users record income and expense transactions under categories and set
//! budgets that cap spending in one category over a date window. Each
//! budget's spent amount is kept equal to the sum of matching expense
//! transactions as the ledger changes.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and persisted settings
//! - `error`: Custom error types
//! - `models`: Core data models (users, categories, transactions, budgets)
//! - `storage`: The `LedgerStore` trait and its JSON file implementation
//! - `services`: Aggregation engine, mutation coordinator, and lifecycle logic
//! - `audit`: Audit logging system
//! - `display`: Terminal tables and detail views
//! - `cli`: Command handlers for the `ledger` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use budget_ledger::config::paths::LedgerPaths;
//! use budget_ledger::services::{BudgetService, TransactionService};
//! use budget_ledger::storage::Storage;
//!
//! let mut storage = Storage::new(LedgerPaths::new()?)?;
//! storage.load_all()?;
//! let budget = BudgetService::new(&storage).create(input)?;
//! TransactionService::new(&storage).create(expense)?; // budget now reflects it
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber once.
///
/// Honors `RUST_LOG`; defaults to warnings from this crate. Output goes to
/// stderr so command output on stdout stays clean.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("budget_ledger=warn"));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}
