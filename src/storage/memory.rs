//! In-memory ledger store for engine tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, BudgetId, CategoryId, Money, Transaction, TransactionId, UserId};

use super::{LedgerStore, UserLocks};

#[derive(Default)]
pub struct MemoryStore {
    pub budgets: Mutex<HashMap<BudgetId, Budget>>,
    pub transactions: Mutex<HashMap<TransactionId, Transaction>>,
    /// When set, every budget write fails
    pub fail_writes: Mutex<bool>,
    locks: UserLocks,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_budget(&self, budget: &Budget) {
        self.budgets.lock().unwrap().insert(budget.id, budget.clone());
    }

    pub fn add_transaction(&self, txn: &Transaction) {
        self.transactions.lock().unwrap().insert(txn.id, txn.clone());
    }

    pub fn remove_transaction(&self, id: TransactionId) -> Option<Transaction> {
        self.transactions.lock().unwrap().remove(&id)
    }

    pub fn budget(&self, id: BudgetId) -> Budget {
        self.budgets.lock().unwrap()[&id].clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }
}

impl LedgerStore for MemoryStore {
    fn sum_expense_amount(
        &self,
        user: UserId,
        category: CategoryId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<Money> {
        let transactions = self.transactions.lock().unwrap();
        let matching = transactions.values().filter(|t| {
            t.is_expense()
                && t.user_id == user
                && t.category_id == category
                && t.date >= start
                && t.date <= end
        });
        Money::checked_sum(matching.map(|t| t.amount))
            .ok_or_else(|| LedgerError::total_overflow("Expense total"))
    }

    fn find_budgets_covering(
        &self,
        user: UserId,
        category: CategoryId,
        date: NaiveDate,
    ) -> LedgerResult<Vec<Budget>> {
        Ok(self
            .budgets
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.user_id == user && b.category_id == category && b.contains(date))
            .cloned()
            .collect())
    }

    fn find_budgets(&self, user: UserId, active: Option<bool>) -> LedgerResult<Vec<Budget>> {
        Ok(self
            .budgets
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.user_id == user && active.map_or(true, |a| b.is_active() == a))
            .cloned()
            .collect())
    }

    fn find_expired(&self, user: UserId, today: NaiveDate) -> LedgerResult<Vec<Budget>> {
        Ok(self
            .budgets
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.user_id == user && b.is_active() && b.is_expired(today))
            .cloned()
            .collect())
    }

    fn exists_active_budget_name(
        &self,
        user: UserId,
        name: &str,
        excluding: Option<BudgetId>,
    ) -> LedgerResult<bool> {
        Ok(self.budgets.lock().unwrap().values().any(|b| {
            b.user_id == user && b.is_active() && b.name == name && Some(b.id) != excluding
        }))
    }

    fn get_budget(&self, id: BudgetId) -> LedgerResult<Option<Budget>> {
        Ok(self.budgets.lock().unwrap().get(&id).cloned())
    }

    fn persist_budget(&self, budget: &Budget) -> LedgerResult<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(LedgerError::Storage("simulated write failure".into()));
        }
        self.add_budget(budget);
        Ok(())
    }

    fn delete_budget(&self, id: BudgetId) -> LedgerResult<Option<Budget>> {
        Ok(self.budgets.lock().unwrap().remove(&id))
    }

    fn get_transaction(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        Ok(self.transactions.lock().unwrap().get(&id).cloned())
    }

    fn user_lock(&self, user: UserId) -> Arc<Mutex<()>> {
        self.locks.for_user(user)
    }
}
