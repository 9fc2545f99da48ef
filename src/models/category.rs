//! Category model
//!
//! Categories group a user's transactions and are the key a budget is
//! scoped to. Each category is either an income or an expense category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, UserId};
use super::transaction::TransactionType;

/// Categories share the income/expense split with transactions
pub type CategoryType = TransactionType;

/// A user-owned transaction category (e.g., "Food", "Salary")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Owning user
    pub user_id: UserId,

    /// Category name, unique per user
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Whether this category holds income or expenses
    #[serde(rename = "type")]
    pub kind: CategoryType,

    /// Display color (e.g. "#4caf50"), free-form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last modified
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Category {
    /// Create a new category
    pub fn new(user_id: UserId, name: impl Into<String>, kind: CategoryType) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            user_id,
            name: name.into().trim().to_string(),
            description: String::new(),
            kind,
            color: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rename the category
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into().trim().to_string();
        self.updated_at = Utc::now();
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if self.name.len() > 50 {
            return Err(CategoryValidationError::NameTooLong(self.name.len()));
        }

        if self.description.len() > 255 {
            return Err(CategoryValidationError::DescriptionTooLong(
                self.description.len(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    DescriptionTooLong(usize),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 50)", len)
            }
            Self::DescriptionTooLong(len) => {
                write!(f, "Category description too long ({} chars, max 255)", len)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category() {
        let user = UserId::new();
        let category = Category::new(user, " Food ", CategoryType::Expense);
        assert_eq!(category.name, "Food");
        assert_eq!(category.user_id, user);
        assert!(category.active);
        assert!(category.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let user = UserId::new();
        let empty = Category::new(user, "   ", CategoryType::Expense);
        assert_eq!(empty.validate(), Err(CategoryValidationError::EmptyName));

        let long = Category::new(user, "x".repeat(51), CategoryType::Income);
        assert_eq!(
            long.validate(),
            Err(CategoryValidationError::NameTooLong(51))
        );
    }

    #[test]
    fn test_type_serialized_as_type_field() {
        let category = Category::new(UserId::new(), "Salary", CategoryType::Income);
        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["type"], "INCOME");
        let back: Category = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, CategoryType::Income);
    }
}
