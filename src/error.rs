//! Custom error types for the budget ledger
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{
    BudgetValidationError, CategoryValidationError, Money, TransactionValidationError,
    UserValidationError,
};

/// The main error type for ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// An active budget with this name already exists for the user
    #[error("Active budget with name '{0}' already exists")]
    DuplicateName(String),

    /// Budget window ends before it starts
    #[error("Invalid date range: end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Amount that is not positive or exceeds `Money::MAX_AMOUNT`
    #[error("Invalid amount: {0} (must be greater than zero and at most $1000000000000.00)")]
    InvalidAmount(Money),

    /// Storage errors, passed through unchanged to the caller
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for users
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "User",
            identifier: identifier.into(),
        }
    }

    /// A ledger total that no longer fits in the money representation
    pub fn total_overflow(what: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{} exceeds the largest representable amount", what))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an input validation error.
    ///
    /// Validation errors are raised before anything is persisted, so the
    /// caller can correct the input and retry.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::DuplicateName(_)
                | Self::InvalidRange { .. }
                | Self::InvalidAmount(_)
        )
    }

    /// Check if this error came from the store
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io(_) | Self::Json(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<BudgetValidationError> for LedgerError {
    fn from(err: BudgetValidationError) -> Self {
        match err {
            BudgetValidationError::NonPositiveAmount(amount)
            | BudgetValidationError::AmountTooLarge(amount) => Self::InvalidAmount(amount),
            BudgetValidationError::EndBeforeStart { start, end } => {
                Self::InvalidRange { start, end }
            }
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<TransactionValidationError> for LedgerError {
    fn from(err: TransactionValidationError) -> Self {
        match err {
            TransactionValidationError::NonPositiveAmount(amount)
            | TransactionValidationError::AmountTooLarge(amount) => Self::InvalidAmount(amount),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<CategoryValidationError> for LedgerError {
    fn from(err: CategoryValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<UserValidationError> for LedgerError {
    fn from(err: UserValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = LedgerError::budget_not_found("bud-1234abcd");
        assert_eq!(err.to_string(), "Budget not found: bud-1234abcd");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_duplicate_name_error() {
        let err = LedgerError::DuplicateName("Groceries".into());
        assert_eq!(
            err.to_string(),
            "Active budget with name 'Groceries' already exists"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_range_error() {
        let err = LedgerError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: end date 2024-01-01 is before start date 2024-02-01"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_amount_error() {
        let err = LedgerError::InvalidAmount(Money::from_cents(-500));
        assert_eq!(
            err.to_string(),
            "Invalid amount: -$5.00 (must be greater than zero and at most $1000000000000.00)"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let ledger_err: LedgerError = io_err.into();
        assert!(matches!(ledger_err, LedgerError::Io(_)));
        assert!(ledger_err.is_storage());
    }

    #[test]
    fn test_budget_validation_maps_to_taxonomy() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let err: LedgerError = BudgetValidationError::EndBeforeStart { start, end }.into();
        assert!(matches!(err, LedgerError::InvalidRange { .. }));

        let err: LedgerError = BudgetValidationError::NonPositiveAmount(Money::zero()).into();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));

        let too_large = Money::from_cents(Money::MAX_AMOUNT.cents() + 1);
        let err: LedgerError = TransactionValidationError::AmountTooLarge(too_large).into();
        assert!(matches!(err, LedgerError::InvalidAmount(amount) if amount == too_large));

        let err: LedgerError = BudgetValidationError::EmptyName.into();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
}
