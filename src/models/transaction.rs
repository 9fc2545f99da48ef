//! Transaction model
//!
//! A transaction is a single income or expense entry in a user's ledger.
//! Amounts are always positive; the direction lives in `kind`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{CategoryId, TransactionId, UserId};
use super::money::Money;

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn is_expense(&self) -> bool {
        matches!(self, Self::Expense)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "INCOME"),
            Self::Expense => write!(f, "EXPENSE"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" | "i" => Ok(Self::Income),
            "expense" | "out" | "e" => Ok(Self::Expense),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Owning user
    pub user_id: UserId,

    /// Category this transaction is filed under
    pub category_id: CategoryId,

    /// Short description (e.g. payee)
    pub description: String,

    /// Positive amount
    pub amount: Money,

    /// Transaction date
    pub date: NaiveDate,

    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Memo/notes
    #[serde(default)]
    pub notes: String,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(
        user_id: UserId,
        category_id: CategoryId,
        kind: TransactionType,
        date: NaiveDate,
        amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            user_id,
            category_id,
            description: String::new(),
            amount,
            date,
            kind,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an expense with a description
    pub fn expense(
        user_id: UserId,
        category_id: CategoryId,
        date: NaiveDate,
        amount: Money,
        description: impl Into<String>,
    ) -> Self {
        let mut txn = Self::new(user_id, category_id, TransactionType::Expense, date, amount);
        txn.description = description.into();
        txn
    }

    /// Create an income entry with a description
    pub fn income(
        user_id: UserId,
        category_id: CategoryId,
        date: NaiveDate,
        amount: Money,
        description: impl Into<String>,
    ) -> Self {
        let mut txn = Self::new(user_id, category_id, TransactionType::Income, date, amount);
        txn.description = description.into();
        txn
    }

    /// Whether this entry counts against budgets
    pub fn is_expense(&self) -> bool {
        self.kind.is_expense()
    }

    /// Case-insensitive keyword match over description and notes
    pub fn mentions(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.description.to_lowercase().contains(&keyword)
            || self.notes.to_lowercase().contains(&keyword)
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }

        if self.amount > Money::MAX_AMOUNT {
            return Err(TransactionValidationError::AmountTooLarge(self.amount));
        }

        if self.description.trim().is_empty() {
            return Err(TransactionValidationError::EmptyDescription);
        }

        if self.description.len() > 255 {
            return Err(TransactionValidationError::DescriptionTooLong(
                self.description.len(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_expense() { "-" } else { "+" };
        write!(
            f,
            "{} {} {}{}",
            self.date.format("%Y-%m-%d"),
            self.description,
            sign,
            self.amount
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    EmptyDescription,
    DescriptionTooLong(usize),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Transaction amount must be positive, got {}", amount)
            }
            Self::AmountTooLarge(amount) => {
                let max = Money::MAX_AMOUNT;
                write!(f, "Transaction amount {} exceeds the maximum of {}", amount, max)
            }
            Self::EmptyDescription => write!(f, "Transaction description cannot be empty"),
            Self::DescriptionTooLong(len) => {
                write!(f, "Transaction description too long ({} chars, max 255)", len)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_expense_constructor() {
        let txn = Transaction::expense(
            UserId::new(),
            CategoryId::new(),
            test_date(),
            Money::from_cents(12_000),
            "Market",
        );
        assert!(txn.is_expense());
        assert_eq!(txn.description, "Market");
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_non_positive() {
        let txn = Transaction::income(
            UserId::new(),
            CategoryId::new(),
            test_date(),
            Money::zero(),
            "Paycheck",
        );
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::NonPositiveAmount(Money::zero()))
        );
    }

    #[test]
    fn test_validation_caps_amount() {
        let mut txn = Transaction::expense(
            UserId::new(),
            CategoryId::new(),
            test_date(),
            Money::MAX_AMOUNT,
            "Everything",
        );
        assert!(txn.validate().is_ok());

        txn.amount = Money::parse("50000000000000000.00").unwrap();
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::AmountTooLarge(txn.amount))
        );
    }

    #[test]
    fn test_validation_rejects_empty_description() {
        let txn = Transaction::new(
            UserId::new(),
            CategoryId::new(),
            TransactionType::Expense,
            test_date(),
            Money::from_cents(100),
        );
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::EmptyDescription)
        );
    }

    #[test]
    fn test_mentions() {
        let mut txn = Transaction::expense(
            UserId::new(),
            CategoryId::new(),
            test_date(),
            Money::from_cents(100),
            "Corner Bakery",
        );
        txn.notes = "birthday cake".into();
        assert!(txn.mentions("bakery"));
        assert!(txn.mentions("CAKE"));
        assert!(!txn.mentions("coffee"));
    }

    #[test]
    fn test_type_parse() {
        assert_eq!("expense".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert_eq!("INCOME".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_display() {
        let txn = Transaction::expense(
            UserId::new(),
            CategoryId::new(),
            test_date(),
            Money::from_cents(1050),
            "Lunch",
        );
        assert_eq!(txn.to_string(), "2024-01-15 Lunch -$10.50");
    }
}
