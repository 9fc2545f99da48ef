//! Aggregation engine
//!
//! Recomputes a budget's `spent_amount` from the ledger and commits it.
//! The value is always rebuilt from a full sum, never adjusted by deltas,
//! so any earlier drift is corrected by the next recompute.

use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, BudgetId, Money};
use crate::storage::{in_user_scope, LedgerStore, UserScope};

/// Keeps budget aggregates equal to their ledger sums
pub struct AggregationEngine<'a, S: LedgerStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: LedgerStore + ?Sized> AggregationEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Recompute one budget as its own atomic unit
    pub fn recompute(&self, id: BudgetId) -> LedgerResult<Budget> {
        let owner = self
            .store
            .get_budget(id)?
            .ok_or_else(|| LedgerError::budget_not_found(id.to_string()))?
            .user_id;

        in_user_scope(self.store, owner, |scope| self.recompute_in(scope, id))
    }

    /// Recompute inside a unit the caller already holds.
    ///
    /// Sums EXPENSE transactions for the budget's user and category dated
    /// within its inclusive window and persists the total. If the persist
    /// fails the stored budget keeps its previous value.
    pub fn recompute_in(&self, scope: &UserScope, id: BudgetId) -> LedgerResult<Budget> {
        let mut budget = self
            .store
            .get_budget(id)?
            .ok_or_else(|| LedgerError::budget_not_found(id.to_string()))?;
        let spent = self.expense_total_in(scope, &budget)?;

        if spent == budget.spent_amount() {
            debug!(budget = %budget.id, spent = %spent, "aggregate unchanged");
            return Ok(budget);
        }

        let previous = budget.spent_amount();
        budget.record_spent(spent);
        self.store.persist_budget(&budget)?;

        debug!(
            budget = %budget.id,
            from = %previous,
            to = %spent,
            "recomputed budget aggregate"
        );
        Ok(budget)
    }

    /// Ledger total for `budget`'s category and window, without writing.
    ///
    /// Lifecycle edits use this to store a row and its aggregate in a
    /// single persist.
    pub fn expense_total_in(&self, scope: &UserScope, budget: &Budget) -> LedgerResult<Money> {
        debug_assert_eq!(budget.user_id, scope.user());
        self.store.sum_expense_amount(
            budget.user_id,
            budget.category_id,
            budget.start_date,
            budget.end_date,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetPeriod, CategoryId, Money, Transaction, UserId};
    use crate::storage::memory::MemoryStore;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn setup() -> (MemoryStore, UserId, CategoryId, BudgetId) {
        let store = MemoryStore::new();
        let user = UserId::new();
        let food = CategoryId::new();
        let budget = Budget::new(
            user,
            food,
            "Food",
            Money::from_cents(50_000),
            d(2024, 1, 1),
            d(2024, 1, 31),
            BudgetPeriod::Monthly,
        );
        store.add_budget(&budget);
        (store, user, food, budget.id)
    }

    #[test]
    fn test_recompute_sums_matching_expenses() {
        let (store, user, food, id) = setup();
        store.add_transaction(&Transaction::expense(
            user,
            food,
            d(2024, 1, 15),
            Money::from_cents(12_000),
            "Market",
        ));
        store.add_transaction(&Transaction::income(
            user,
            food,
            d(2024, 1, 15),
            Money::from_cents(99_999),
            "Refund",
        ));

        let budget = AggregationEngine::new(&store).recompute(id).unwrap();
        assert_eq!(budget.spent_amount(), Money::from_cents(12_000));
        assert_eq!(store.budget(id).spent_amount(), Money::from_cents(12_000));
        assert_eq!(budget.spent_percentage(), 24.0);
    }

    #[test]
    fn test_no_rows_is_zero() {
        let (store, _, _, id) = setup();
        let budget = AggregationEngine::new(&store).recompute(id).unwrap();
        assert_eq!(budget.spent_amount(), Money::zero());
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let (store, user, food, id) = setup();
        store.add_transaction(&Transaction::expense(
            user,
            food,
            d(2024, 1, 31),
            Money::from_cents(700),
            "Snack",
        ));

        let engine = AggregationEngine::new(&store);
        let first = engine.recompute(id).unwrap();
        let second = engine.recompute(id).unwrap();
        assert_eq!(first.spent_amount(), second.spent_amount());
        assert_eq!(first.updated_at, second.updated_at);
    }

    #[test]
    fn test_missing_budget_is_not_found() {
        let store = MemoryStore::new();
        let err = AggregationEngine::new(&store)
            .recompute(BudgetId::new())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_failed_persist_keeps_prior_value() {
        let (store, user, food, id) = setup();
        let engine = AggregationEngine::new(&store);
        store.add_transaction(&Transaction::expense(
            user,
            food,
            d(2024, 1, 2),
            Money::from_cents(1_000),
            "Bread",
        ));
        engine.recompute(id).unwrap();

        store.add_transaction(&Transaction::expense(
            user,
            food,
            d(2024, 1, 3),
            Money::from_cents(2_000),
            "Cheese",
        ));
        store.set_fail_writes(true);
        let err = engine.recompute(id).unwrap_err();
        assert!(err.is_storage());
        assert_eq!(store.budget(id).spent_amount(), Money::from_cents(1_000));

        store.set_fail_writes(false);
        assert_eq!(
            engine.recompute(id).unwrap().spent_amount(),
            Money::from_cents(3_000)
        );
    }

    #[test]
    fn test_overflowing_total_leaves_budget_alone() {
        let (store, user, food, id) = setup();
        let engine = AggregationEngine::new(&store);
        let huge = Money::parse("50000000000000000.00").unwrap();
        for label in ["First", "Second"] {
            store.add_transaction(&Transaction::expense(user, food, d(2024, 1, 4), huge, label));
        }

        let err = engine.recompute(id).unwrap_err();
        assert!(err.is_storage());
        assert_eq!(store.budget(id).spent_amount(), Money::zero());
    }
}
