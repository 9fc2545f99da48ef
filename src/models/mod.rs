//! Core data models for the budget ledger
//!
//! Users own categories, transactions, and budgets. Budgets track how much
//! of their cap has been spent by expense transactions in their window.

pub mod budget;
pub mod category;
pub mod ids;
pub mod money;
pub mod period;
pub mod transaction;
pub mod user;

pub use budget::{Budget, BudgetValidationError};
pub use category::{Category, CategoryType, CategoryValidationError};
pub use ids::{BudgetId, CategoryId, TransactionId, UserId};
pub use money::{Money, MoneyParseError};
pub use period::BudgetPeriod;
pub use transaction::{Transaction, TransactionType, TransactionValidationError};
pub use user::{User, UserValidationError};
