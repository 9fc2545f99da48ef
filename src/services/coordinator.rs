//! Mutation coordinator
//!
//! After a transaction is created, edited, or removed, every budget whose
//! aggregate the old or new row could touch is recomputed. An edit may
//! move a transaction out of one budget and into another, so both sides
//! count.

use std::collections::BTreeSet;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, BudgetId, Transaction};
use crate::storage::{in_user_scope, LedgerStore, UserScope};

use super::aggregation::AggregationEngine;

pub struct MutationCoordinator<'a, S: LedgerStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: LedgerStore + ?Sized> MutationCoordinator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// React to a transaction write as its own atomic unit.
    ///
    /// `before` is `None` for a create and `after` is `None` for a delete.
    /// Returns the recomputed budgets.
    pub fn on_transaction_written(
        &self,
        before: Option<&Transaction>,
        after: Option<&Transaction>,
    ) -> LedgerResult<Vec<Budget>> {
        let Some(user) = after.or(before).map(|t| t.user_id) else {
            return Ok(Vec::new());
        };
        in_user_scope(self.store, user, |scope| {
            self.on_transaction_written_in(scope, before, after)
        })
    }

    /// Same as [`on_transaction_written`](Self::on_transaction_written)
    /// inside a unit the caller already holds
    pub fn on_transaction_written_in(
        &self,
        scope: &UserScope,
        before: Option<&Transaction>,
        after: Option<&Transaction>,
    ) -> LedgerResult<Vec<Budget>> {
        let engine = AggregationEngine::new(self.store);
        self.affected_budgets(before, after)?
            .into_iter()
            .map(|id| engine.recompute_in(scope, id))
            .collect()
    }

    /// Union of budgets covering the EXPENSE side(s) of the write.
    ///
    /// Inactive budgets are included so their aggregates stay exact too.
    pub fn affected_budgets(
        &self,
        before: Option<&Transaction>,
        after: Option<&Transaction>,
    ) -> LedgerResult<Vec<BudgetId>> {
        if let (Some(b), Some(a)) = (before, after) {
            if b.user_id != a.user_id {
                return Err(LedgerError::Validation(
                    "A transaction cannot move between users".into(),
                ));
            }
        }

        let mut affected = BTreeSet::new();
        for txn in [before, after].into_iter().flatten() {
            if !txn.is_expense() {
                continue;
            }
            for budget in self
                .store
                .find_budgets_covering(txn.user_id, txn.category_id, txn.date)?
            {
                affected.insert(budget.id);
            }
        }
        Ok(affected.into_iter().collect())
    }
}
