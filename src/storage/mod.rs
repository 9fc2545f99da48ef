//! Storage layer for the budget ledger
//!
//! The ledger engine talks to storage through the [`LedgerStore`] trait.
//! [`Storage`] implements it over JSON files with atomic writes and
//! per-user serialization locks.

pub mod budgets;
pub mod categories;
pub mod file_io;
pub mod locks;
#[cfg(test)]
pub(crate) mod memory;
pub mod transactions;
pub mod users;

pub use budgets::BudgetRepository;
pub use categories::CategoryRepository;
pub use file_io::{read_json, write_json_atomic};
pub use locks::{in_user_scope, UserLocks, UserScope};
pub use transactions::TransactionRepository;
pub use users::UserRepository;

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, BudgetId, CategoryId, Money, Transaction, TransactionId, UserId};

/// The ledger operations budget aggregation depends on
pub trait LedgerStore {
    /// Sum of EXPENSE amounts for `(user, category)` within `[start, end]`
    fn sum_expense_amount(
        &self,
        user: UserId,
        category: CategoryId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<Money>;

    /// Budgets of any state for `(user, category)` whose window contains `date`
    fn find_budgets_covering(
        &self,
        user: UserId,
        category: CategoryId,
        date: NaiveDate,
    ) -> LedgerResult<Vec<Budget>>;

    /// A user's budgets, all of them when `active` is `None`
    fn find_budgets(&self, user: UserId, active: Option<bool>) -> LedgerResult<Vec<Budget>>;

    /// Active budgets whose window ended before `today`
    fn find_expired(&self, user: UserId, today: NaiveDate) -> LedgerResult<Vec<Budget>>;

    fn exists_active_budget_name(
        &self,
        user: UserId,
        name: &str,
        excluding: Option<BudgetId>,
    ) -> LedgerResult<bool>;

    fn get_budget(&self, id: BudgetId) -> LedgerResult<Option<Budget>>;

    /// Insert or replace; on error the stored row is unchanged
    fn persist_budget(&self, budget: &Budget) -> LedgerResult<()>;

    /// Remove and return the row, `None` if it did not exist
    fn delete_budget(&self, id: BudgetId) -> LedgerResult<Option<Budget>>;

    fn get_transaction(&self, id: TransactionId) -> LedgerResult<Option<Transaction>>;

    /// Mutex serializing every operation on `user`'s ledger
    fn user_lock(&self, user: UserId) -> Arc<Mutex<()>>;
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub transactions: TransactionRepository,
    pub budgets: BudgetRepository,
    locks: UserLocks,
    audit: Option<AuditLogger>,
}

impl Storage {
    /// Create a new Storage instance with auditing enabled
    pub fn new(paths: LedgerPaths) -> LedgerResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            users: UserRepository::new(paths.users_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            locks: UserLocks::new(),
            audit: Some(AuditLogger::new(paths.audit_log())),
            paths,
        })
    }

    /// Turn the audit trail on or off
    pub fn set_audit_enabled(&mut self, enabled: bool) {
        self.audit = enabled.then(|| AuditLogger::new(self.paths.audit_log()));
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    pub fn audit_logger(&self) -> Option<&AuditLogger> {
        self.audit.as_ref()
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> LedgerResult<()> {
        self.users.load()?;
        self.categories.load()?;
        self.transactions.load()?;
        self.budgets.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> LedgerResult<()> {
        self.users.save()?;
        self.categories.save()?;
        self.transactions.save()?;
        self.budgets.save()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    // The data change is already committed when these run, so a failed
    // audit append is reported but not returned.

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Display,
        entity_name: Option<String>,
        entity: &T,
    ) {
        self.append(AuditEntry::create(
            entity_type,
            entity_id.to_string(),
            entity_name,
            entity,
        ));
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Display,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) {
        self.append(AuditEntry::update(
            entity_type,
            entity_id.to_string(),
            entity_name,
            before,
            after,
        ));
    }

    pub fn log_deactivate<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Display,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) {
        self.append(AuditEntry::deactivate(
            entity_type,
            entity_id.to_string(),
            entity_name,
            before,
            after,
        ));
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Display,
        entity_name: Option<String>,
        entity: &T,
    ) {
        self.append(AuditEntry::delete(
            entity_type,
            entity_id.to_string(),
            entity_name,
            entity,
        ));
    }

    /// Append several entries in one write
    pub fn log_batch(&self, entries: &[AuditEntry]) {
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.append(entries) {
                warn!(error = %e, count = entries.len(), "failed to append audit entries");
            }
        }
    }

    fn append(&self, entry: AuditEntry) {
        self.log_batch(std::slice::from_ref(&entry));
    }
}

impl LedgerStore for Storage {
    fn sum_expense_amount(
        &self,
        user: UserId,
        category: CategoryId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<Money> {
        self.transactions.sum_expense(user, category, start, end)
    }

    fn find_budgets_covering(
        &self,
        user: UserId,
        category: CategoryId,
        date: NaiveDate,
    ) -> LedgerResult<Vec<Budget>> {
        self.budgets.find_covering(user, category, date)
    }

    fn find_budgets(&self, user: UserId, active: Option<bool>) -> LedgerResult<Vec<Budget>> {
        self.budgets.get_by_user(user, active)
    }

    fn find_expired(&self, user: UserId, today: NaiveDate) -> LedgerResult<Vec<Budget>> {
        self.budgets.find_expired(user, today)
    }

    fn exists_active_budget_name(
        &self,
        user: UserId,
        name: &str,
        excluding: Option<BudgetId>,
    ) -> LedgerResult<bool> {
        self.budgets.exists_active_name(user, name, excluding)
    }

    fn get_budget(&self, id: BudgetId) -> LedgerResult<Option<Budget>> {
        self.budgets.get(id)
    }

    fn persist_budget(&self, budget: &Budget) -> LedgerResult<()> {
        self.budgets.persist(budget)
    }

    fn delete_budget(&self, id: BudgetId) -> LedgerResult<Option<Budget>> {
        self.budgets.remove(id)
    }

    fn get_transaction(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        self.transactions.get(id)
    }

    fn user_lock(&self, user: UserId) -> Arc<Mutex<()>> {
        self.locks.for_user(user)
    }
}

/// Run `write` against the updated map; if it fails, put `previous` back
/// under `key` (or drop the key when there was no previous row).
pub(crate) fn commit_or_restore<K, V, F>(
    data: &mut HashMap<K, V>,
    key: K,
    previous: Option<V>,
    write: F,
) -> LedgerResult<()>
where
    K: Eq + Hash,
    F: FnOnce(&HashMap<K, V>) -> LedgerResult<()>,
{
    if let Err(err) = write(&*data) {
        match previous {
            Some(row) => {
                data.insert(key, row);
            }
            None => {
                data.remove(&key);
            }
        }
        return Err(err);
    }
    Ok(())
}

pub(crate) fn read_lock_failed<E: Display>(e: E) -> LedgerError {
    LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
}

pub(crate) fn write_lock_failed<E: Display>(e: E) -> LedgerError {
    LedgerError::Storage(format!("Failed to acquire write lock: {}", e))
}
