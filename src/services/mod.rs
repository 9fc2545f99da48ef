//! Service layer for the budget ledger
//!
//! The service layer provides business logic on top of the storage layer.
//! [`AggregationEngine`] and [`MutationCoordinator`] keep budget aggregates
//! equal to the ledger; the other services drive them.

pub mod aggregation;
pub mod budget;
pub mod category;
pub mod coordinator;
pub mod transaction;
pub mod user;

pub use aggregation::AggregationEngine;
pub use budget::{BudgetService, BudgetSummary, BudgetUpdate, CreateBudgetInput};
pub use category::{CategoryService, CategoryUpdate};
pub use coordinator::MutationCoordinator;
pub use transaction::{
    CreateTransactionInput, TransactionFilter, TransactionService, TransactionTotals,
    TransactionUpdate,
};
pub use user::UserService;
