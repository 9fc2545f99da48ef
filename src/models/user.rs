//! User model
//!
//! A user is an opaque owner of categories, transactions and budgets.
//! Ledger data of different users never interacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::UserId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    /// Unique login-style handle
    pub username: String,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            username: username.into().trim().to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.username.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if self.username.len() > 50 {
            return Err(UserValidationError::UsernameTooLong(self.username.len()));
        }
        if self.username.chars().any(char::is_whitespace) {
            return Err(UserValidationError::WhitespaceInUsername);
        }
        Ok(())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooLong(usize),
    WhitespaceInUsername,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "Username cannot be empty"),
            Self::UsernameTooLong(len) => {
                write!(f, "Username too long ({} chars, max 50)", len)
            }
            Self::WhitespaceInUsername => write!(f, "Username cannot contain whitespace"),
        }
    }
}

impl std::error::Error for UserValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_trims() {
        let user = User::new("  alice ");
        assert_eq!(user.username, "alice");
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            User::new("").validate(),
            Err(UserValidationError::EmptyUsername)
        );
        assert_eq!(
            User::new("a b").validate(),
            Err(UserValidationError::WhitespaceInUsername)
        );
        assert_eq!(
            User::new("x".repeat(51)).validate(),
            Err(UserValidationError::UsernameTooLong(51))
        );
    }
}
