//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod budget;
pub mod category;
pub mod transaction;
pub mod user;

pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};
pub use user::{handle_user_command, UserCommands};

use crate::display::{category_names, CategoryNames};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, UserId};
use crate::services::CategoryService;
use crate::storage::Storage;

/// Resolve a category by name or ID for the current user
fn resolve_category(storage: &Storage, user: UserId, identifier: &str) -> LedgerResult<Category> {
    CategoryService::new(storage)
        .find(user, identifier)?
        .ok_or_else(|| LedgerError::category_not_found(identifier))
}

fn user_category_names(storage: &Storage, user: UserId) -> LedgerResult<CategoryNames> {
    let categories = CategoryService::new(storage).list(user, None)?;
    Ok(category_names(&categories))
}
