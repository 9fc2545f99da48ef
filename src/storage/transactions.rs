//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json and
//! answers the ledger sums budgets are aggregated from.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{CategoryId, Money, Transaction, TransactionId, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::{commit_or_restore, read_lock_failed, write_lock_failed};

#[derive(Debug, Default, Serialize, Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Repository for transaction persistence
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
}

/// Newest first, ties broken by creation time
fn newest_first(a: &Transaction, b: &Transaction) -> std::cmp::Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: TransactionData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(write_lock_failed)?;

        data.clear();
        for txn in file_data.transactions {
            data.insert(txn.id, txn);
        }
        Ok(())
    }

    /// Save transactions to disk
    pub fn save(&self) -> LedgerResult<()> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Self::write_file(&self.path, &data)
    }

    fn write_file(
        path: &PathBuf,
        data: &HashMap<TransactionId, Transaction>,
    ) -> LedgerResult<()> {
        let mut transactions: Vec<_> = data.values().cloned().collect();
        transactions.sort_by(newest_first);
        write_json_atomic(path, &TransactionData { transactions })
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Ok(data.get(&id).cloned())
    }

    /// A user's transactions, newest first
    pub fn get_by_user(&self, user: UserId) -> LedgerResult<Vec<Transaction>> {
        let data = self.data.read().map_err(read_lock_failed)?;
        let mut transactions: Vec<_> = data
            .values()
            .filter(|t| t.user_id == user)
            .cloned()
            .collect();
        transactions.sort_by(newest_first);
        Ok(transactions)
    }

    /// Sum of EXPENSE amounts for `(user, category)` dated within
    /// `[start, end]`; zero when nothing matches, an error on overflow
    pub fn sum_expense(
        &self,
        user: UserId,
        category: CategoryId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<Money> {
        let data = self.data.read().map_err(read_lock_failed)?;
        let matching = data.values().filter(|t| {
            t.is_expense()
                && t.user_id == user
                && t.category_id == category
                && t.date >= start
                && t.date <= end
        });
        Money::checked_sum(matching.map(|t| t.amount)).ok_or_else(|| {
            LedgerError::total_overflow(format!("Expense total for category {}", category))
        })
    }

    /// Whether any transaction is filed under `category`
    pub fn any_in_category(&self, category: CategoryId) -> LedgerResult<bool> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Ok(data.values().any(|t| t.category_id == category))
    }

    /// Insert or replace a transaction and write the file
    pub fn persist(&self, txn: &Transaction) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(write_lock_failed)?;
        let previous = data.insert(txn.id, txn.clone());
        commit_or_restore(&mut *data, txn.id, previous, |d| {
            Self::write_file(&self.path, d)
        })
        .map_err(|e| {
            warn!(transaction = %txn.id, error = %e, "transaction write failed, row restored");
            e
        })
    }

    /// Remove a transaction and write the file
    pub fn remove(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        let mut data = self.data.write().map_err(write_lock_failed)?;
        let removed = data.remove(&id);
        if removed.is_none() {
            return Ok(None);
        }
        commit_or_restore(&mut *data, id, removed.clone(), |d| {
            Self::write_file(&self.path, d)
        })
        .map_err(|e| {
            warn!(transaction = %id, error = %e, "transaction delete failed, restored row");
            e
        })?;
        Ok(removed)
    }

    /// Count transactions
    pub fn count(&self) -> LedgerResult<usize> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        let repo = TransactionRepository::new(path);
        (temp_dir, repo)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_sum_expense_filters() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let food = CategoryId::new();
        let rent = CategoryId::new();

        let cents = Money::from_cents;
        for txn in [
            Transaction::expense(user, food, d(2024, 1, 1), cents(1_000), "first day"),
            Transaction::expense(user, food, d(2024, 1, 31), cents(2_000), "last day"),
            Transaction::expense(user, food, d(2024, 2, 1), cents(4_000), "next month"),
            Transaction::expense(user, rent, d(2024, 1, 10), cents(8_000), "other category"),
            Transaction::income(user, food, d(2024, 1, 10), cents(16_000), "refund"),
            Transaction::expense(UserId::new(), food, d(2024, 1, 10), cents(32_000), "other user"),
        ] {
            repo.persist(&txn).unwrap();
        }

        let sum = repo
            .sum_expense(user, food, d(2024, 1, 1), d(2024, 1, 31))
            .unwrap();
        assert_eq!(sum, cents(3_000));
    }

    #[test]
    fn test_sum_expense_empty_is_zero() {
        let (_temp_dir, repo) = create_test_repo();
        let sum = repo
            .sum_expense(UserId::new(), CategoryId::new(), d(2024, 1, 1), d(2024, 1, 31))
            .unwrap();
        assert_eq!(sum, Money::zero());
    }

    #[test]
    fn test_sum_expense_overflow_is_an_error() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let food = CategoryId::new();
        let huge = Money::parse("50000000000000000.00").unwrap();
        for description in ["first", "second"] {
            repo.persist(&Transaction::expense(user, food, d(2024, 1, 5), huge, description))
                .unwrap();
        }

        let err = repo
            .sum_expense(user, food, d(2024, 1, 1), d(2024, 1, 31))
            .unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_failed_write_restores_row() {
        let (temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let txn = Transaction::expense(
            user,
            CategoryId::new(),
            d(2024, 1, 5),
            Money::from_cents(500),
            "Coffee",
        );
        repo.persist(&txn).unwrap();

        let path = temp_dir.path().join("transactions.json");
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("blocker"), "x").unwrap();

        let mut edited = txn.clone();
        edited.amount = Money::from_cents(900);
        assert!(repo.persist(&edited).is_err());
        assert_eq!(repo.get(txn.id).unwrap().unwrap().amount, Money::from_cents(500));

        assert!(repo.remove(txn.id).is_err());
        assert!(repo.get(txn.id).unwrap().is_some());
    }

    #[test]
    fn test_get_by_user_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let cat = CategoryId::new();
        repo.persist(&Transaction::expense(user, cat, d(2024, 1, 1), Money::from_cents(1), "old"))
            .unwrap();
        repo.persist(&Transaction::expense(user, cat, d(2024, 3, 1), Money::from_cents(1), "new"))
            .unwrap();

        let descriptions: Vec<_> = repo
            .get_by_user(user)
            .unwrap()
            .into_iter()
            .map(|t| t.description)
            .collect();
        assert_eq!(descriptions, vec!["new", "old"]);
        assert_eq!(repo.count().unwrap(), 2);
    }
}
