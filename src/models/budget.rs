//! Budget model
//!
//! A budget caps spending in one category over an inclusive date window.
//! `spent_amount` is derived from the ledger and is only ever written by
//! the aggregation engine, so it has no public setter.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, CategoryId, UserId};
use super::money::Money;
use super::period::BudgetPeriod;

/// A spending cap for a category over a date window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Unique identifier
    pub id: BudgetId,

    /// Owning user
    pub user_id: UserId,

    /// Category whose expenses count against this budget
    pub category_id: CategoryId,

    /// Display name, unique among the user's active budgets
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Spending cap
    pub amount: Money,

    /// First day of the window (inclusive)
    pub start_date: NaiveDate,

    /// Last day of the window (inclusive)
    pub end_date: NaiveDate,

    /// Advisory period label
    pub period: BudgetPeriod,

    /// Sum of matching expenses, maintained by the aggregation engine
    #[serde(default)]
    spent_amount: Money,

    #[serde(default = "default_active")]
    active: bool,

    /// When the budget was created
    pub created_at: DateTime<Utc>,

    /// When the budget was last modified
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Budget {
    /// Create a new active budget with nothing spent yet
    pub fn new(
        user_id: UserId,
        category_id: CategoryId,
        name: impl Into<String>,
        amount: Money,
        start_date: NaiveDate,
        end_date: NaiveDate,
        period: BudgetPeriod,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            user_id,
            category_id,
            name: name.into().trim().to_string(),
            description: String::new(),
            amount,
            start_date,
            end_date,
            period,
            spent_amount: Money::zero(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn spent_amount(&self) -> Money {
        self.spent_amount
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether `date` falls inside the inclusive window
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Whether the window closed before `today`
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }

    /// Cap minus spent; negative once over budget
    pub fn remaining(&self) -> Money {
        self.amount - self.spent_amount
    }

    /// Spent as hundredths of a percent of the cap, rounded half up.
    ///
    /// Zero when the cap is zero.
    pub fn spent_percentage_bp(&self) -> i64 {
        self.spent_amount.percent_of_bp(self.amount)
    }

    /// Spent as a percentage of the cap with two decimal places
    pub fn spent_percentage(&self) -> f64 {
        self.spent_percentage_bp() as f64 / 100.0
    }

    pub fn is_over_budget(&self) -> bool {
        self.spent_amount > self.amount
    }

    /// Active, not yet over the cap, but at or above `threshold_percent`
    pub fn is_near_limit(&self, threshold_percent: u8) -> bool {
        self.active
            && !self.is_over_budget()
            && self.spent_percentage_bp() >= i64::from(threshold_percent) * 100
    }

    pub(crate) fn record_spent(&mut self, spent: Money) {
        self.spent_amount = spent;
        self.updated_at = Utc::now();
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
        self.updated_at = Utc::now();
    }

    /// Validate fields that do not depend on other budgets
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.name.trim().is_empty() {
            return Err(BudgetValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(BudgetValidationError::NameTooLong(self.name.len()));
        }

        if self.description.len() > 500 {
            return Err(BudgetValidationError::DescriptionTooLong(
                self.description.len(),
            ));
        }

        if !self.amount.is_positive() {
            return Err(BudgetValidationError::NonPositiveAmount(self.amount));
        }

        if self.amount > Money::MAX_AMOUNT {
            return Err(BudgetValidationError::AmountTooLarge(self.amount));
        }

        if self.end_date < self.start_date {
            return Err(BudgetValidationError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} .. {}): {} of {}",
            self.name, self.start_date, self.end_date, self.spent_amount, self.amount
        )
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    EmptyName,
    NameTooLong(usize),
    DescriptionTooLong(usize),
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Budget name cannot be empty"),
            Self::NameTooLong(len) => write!(f, "Budget name too long ({} chars, max 100)", len),
            Self::DescriptionTooLong(len) => {
                write!(f, "Budget description too long ({} chars, max 500)", len)
            }
            Self::NonPositiveAmount(amount) => {
                write!(f, "Budget amount must be greater than zero, got {}", amount)
            }
            Self::AmountTooLarge(amount) => {
                write!(f, "Budget amount {} exceeds the maximum of {}", amount, Money::MAX_AMOUNT)
            }
            Self::EndBeforeStart { start, end } => {
                write!(f, "Budget ends ({}) before it starts ({})", end, start)
            }
        }
    }
}

impl std::error::Error for BudgetValidationError {}
