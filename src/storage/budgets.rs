//! Budget repository for JSON storage
//!
//! Manages loading and saving budgets to budgets.json. A failed write
//! leaves the in-memory row exactly as it was before the call.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::LedgerResult;
use crate::models::{Budget, BudgetId, CategoryId, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::{commit_or_restore, read_lock_failed, write_lock_failed};

#[derive(Debug, Default, Serialize, Deserialize)]
struct BudgetData {
    budgets: Vec<Budget>,
}

/// Repository for budget persistence
pub struct BudgetRepository {
    path: PathBuf,
    data: RwLock<HashMap<BudgetId, Budget>>,
}

fn by_window(a: &Budget, b: &Budget) -> std::cmp::Ordering {
    a.start_date
        .cmp(&b.start_date)
        .then_with(|| a.name.cmp(&b.name))
}

impl BudgetRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load budgets from disk
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: BudgetData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(write_lock_failed)?;

        data.clear();
        for budget in file_data.budgets {
            data.insert(budget.id, budget);
        }
        Ok(())
    }

    /// Save budgets to disk
    pub fn save(&self) -> LedgerResult<()> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Self::write_file(&self.path, &data)
    }

    fn write_file(path: &PathBuf, data: &HashMap<BudgetId, Budget>) -> LedgerResult<()> {
        let mut budgets: Vec<_> = data.values().cloned().collect();
        budgets.sort_by(|a, b| a.user_id.cmp(&b.user_id).then_with(|| by_window(a, b)));
        write_json_atomic(path, &BudgetData { budgets })
    }

    pub fn get(&self, id: BudgetId) -> LedgerResult<Option<Budget>> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Ok(data.get(&id).cloned())
    }

    fn select(&self, keep: impl Fn(&Budget) -> bool) -> LedgerResult<Vec<Budget>> {
        let data = self.data.read().map_err(read_lock_failed)?;
        let mut budgets: Vec<_> = data.values().filter(|b| keep(b)).cloned().collect();
        budgets.sort_by(by_window);
        Ok(budgets)
    }

    /// A user's budgets, optionally filtered by active flag
    pub fn get_by_user(&self, user: UserId, active: Option<bool>) -> LedgerResult<Vec<Budget>> {
        self.select(|b| b.user_id == user && active.map_or(true, |a| b.is_active() == a))
    }

    /// Budgets of any state for `(user, category)` whose window contains `date`
    pub fn find_covering(
        &self,
        user: UserId,
        category: CategoryId,
        date: NaiveDate,
    ) -> LedgerResult<Vec<Budget>> {
        self.select(|b| b.user_id == user && b.category_id == category && b.contains(date))
    }

    /// Budgets of any state whose window contains `date`
    pub fn find_on(&self, user: UserId, date: NaiveDate) -> LedgerResult<Vec<Budget>> {
        self.select(|b| b.user_id == user && b.contains(date))
    }

    /// Active budgets whose window closed before `today`
    pub fn find_expired(&self, user: UserId, today: NaiveDate) -> LedgerResult<Vec<Budget>> {
        self.select(|b| b.user_id == user && b.is_active() && b.is_expired(today))
    }

    /// Whether another active budget of `user` is called `name`
    pub fn exists_active_name(
        &self,
        user: UserId,
        name: &str,
        excluding: Option<BudgetId>,
    ) -> LedgerResult<bool> {
        let data = self.data.read().map_err(read_lock_failed)?;
        let name = name.trim();
        Ok(data.values().any(|b| {
            b.user_id == user && b.is_active() && b.name == name && Some(b.id) != excluding
        }))
    }

    /// Whether any budget is scoped to `category`
    pub fn any_in_category(&self, category: CategoryId) -> LedgerResult<bool> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Ok(data.values().any(|b| b.category_id == category))
    }

    /// Insert or replace a budget and write the file
    pub fn persist(&self, budget: &Budget) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(write_lock_failed)?;
        let previous = data.insert(budget.id, budget.clone());
        commit_or_restore(&mut *data, budget.id, previous, |d| {
            Self::write_file(&self.path, d)
        })
        .map_err(|e| {
            warn!(budget = %budget.id, error = %e, "budget write failed, row restored");
            e
        })
    }

    /// Remove a budget and write the file
    pub fn remove(&self, id: BudgetId) -> LedgerResult<Option<Budget>> {
        let mut data = self.data.write().map_err(write_lock_failed)?;
        let removed = data.remove(&id);
        if removed.is_none() {
            return Ok(None);
        }
        commit_or_restore(&mut *data, id, removed.clone(), |d| {
            Self::write_file(&self.path, d)
        })
        .map_err(|e| {
            warn!(budget = %id, error = %e, "budget delete failed, restored row");
            e
        })?;
        Ok(removed)
    }

    pub fn count(&self) -> LedgerResult<usize> {
        let data = self.data.read().map_err(read_lock_failed)?;
        Ok(data.len())
    }
}
