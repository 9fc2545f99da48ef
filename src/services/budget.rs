//! Budget service
//!
//! Budget lifecycle: creation with validation, edits, deactivation, the
//! expiration sweep, and deletion. Every mutation runs as one atomic unit
//! for the budget's owner and finishes with a fresh aggregate.
//!
//! ```text
//! create --> ACTIVE --deactivate / sweep--> INACTIVE
//!              |                               |
//!              +----------- delete ------------+--> (removed)
//! ```

use chrono::NaiveDate;
use tracing::info;

use crate::audit::{AuditEntry, EntityType};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, BudgetId, BudgetPeriod, CategoryId, Money, UserId};
use crate::storage::{in_user_scope, LedgerStore, Storage, UserScope};

use super::aggregation::AggregationEngine;

/// Service for budget lifecycle management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new budget
#[derive(Debug, Clone)]
pub struct CreateBudgetInput {
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub name: String,
    pub amount: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Classified from the window when omitted
    pub period: Option<BudgetPeriod>,
    pub description: Option<String>,
}

/// Fields that can be changed on an existing budget
#[derive(Debug, Clone, Default)]
pub struct BudgetUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub category_id: Option<CategoryId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub period: Option<BudgetPeriod>,
    /// `Some(true)` reactivates; the name must then be free again
    pub active: Option<bool>,
}

/// Totals across a user's budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetSummary {
    /// Sum of caps of active budgets
    pub total_budgeted: Money,
    /// Sum of spent amounts of active budgets
    pub total_spent: Money,
    /// Budgets of any state currently over their cap
    pub over_budget_count: usize,
}

impl BudgetSummary {
    pub fn total_remaining(&self) -> Money {
        self.total_budgeted - self.total_spent
    }
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn engine(&self) -> AggregationEngine<'a, Storage> {
        AggregationEngine::new(self.storage)
    }

    /// Create an active budget; the row is stored together with its
    /// initial aggregate in one write
    pub fn create(&self, input: CreateBudgetInput) -> LedgerResult<Budget> {
        self.storage
            .users
            .get(input.user_id)?
            .ok_or_else(|| LedgerError::user_not_found(input.user_id.to_string()))?;
        self.check_category(input.user_id, input.category_id)?;

        let period = input
            .period
            .unwrap_or_else(|| Self::suggest_period(input.start_date, input.end_date));
        let mut budget = Budget::new(
            input.user_id,
            input.category_id,
            input.name,
            input.amount,
            input.start_date,
            input.end_date,
            period,
        );
        if let Some(description) = input.description {
            budget.description = description;
        }

        let user = budget.user_id;
        let budget = in_user_scope(self.storage, user, move |scope| {
            if self
                .storage
                .exists_active_budget_name(user, &budget.name, None)?
            {
                return Err(LedgerError::DuplicateName(budget.name.clone()));
            }
            budget.validate()?;

            let spent = self.engine().expense_total_in(scope, &budget)?;
            budget.record_spent(spent);
            self.storage.persist_budget(&budget)?;
            Ok(budget)
        })?;

        self.storage.log_create(
            EntityType::Budget,
            budget.id,
            Some(budget.name.clone()),
            &budget,
        );
        info!(
            budget = %budget.id,
            name = %budget.name,
            spent = %budget.spent_amount(),
            "created budget"
        );

        Ok(budget)
    }

    /// Apply field changes, re-validate against the user's other active
    /// budgets, and store the row with a fresh aggregate in one write
    pub fn update(&self, id: BudgetId, changes: BudgetUpdate) -> LedgerResult<Budget> {
        let owner = self.require(id)?.user_id;

        let (before, after) = in_user_scope(self.storage, owner, |scope| {
            let mut budget = self.require(id)?;
            let before = budget.clone();

            if let Some(name) = changes.name {
                budget.name = name.trim().to_string();
            }
            if let Some(description) = changes.description {
                budget.description = description;
            }
            if let Some(amount) = changes.amount {
                budget.amount = amount;
            }
            if let Some(category_id) = changes.category_id {
                self.check_category(owner, category_id)?;
                budget.category_id = category_id;
            }
            if let Some(start) = changes.start_date {
                budget.start_date = start;
            }
            if let Some(end) = changes.end_date {
                budget.end_date = end;
            }
            let window_changed =
                budget.start_date != before.start_date || budget.end_date != before.end_date;
            match changes.period {
                Some(period) => budget.period = period,
                None if window_changed => {
                    budget.period = Self::suggest_period(budget.start_date, budget.end_date)
                }
                None => {}
            }
            if let Some(active) = changes.active {
                budget.set_active(active);
            }

            if budget.is_active()
                && self
                    .storage
                    .exists_active_budget_name(owner, &budget.name, Some(id))?
            {
                return Err(LedgerError::DuplicateName(budget.name.clone()));
            }
            budget.validate()?;

            let spent = self.engine().expense_total_in(scope, &budget)?;
            budget.record_spent(spent);
            self.storage.persist_budget(&budget)?;
            Ok((before, budget))
        })?;

        self.storage.log_update(
            EntityType::Budget,
            after.id,
            Some(after.name.clone()),
            &before,
            &after,
        );
        Ok(after)
    }

    /// Switch a budget off. Already inactive budgets are returned unchanged.
    pub fn deactivate(&self, id: BudgetId) -> LedgerResult<Budget> {
        let owner = self.require(id)?.user_id;

        let change = in_user_scope(self.storage, owner, |scope| self.deactivate_in(scope, id))?;
        match change {
            Some((before, after)) => {
                self.storage.log_deactivate(
                    EntityType::Budget,
                    after.id,
                    Some(after.name.clone()),
                    &before,
                    &after,
                );
                info!(budget = %after.id, name = %after.name, "deactivated budget");
                Ok(after)
            }
            None => self.require(id),
        }
    }

    /// Flip the flag inside a held unit; `None` when nothing changed
    fn deactivate_in(
        &self,
        _scope: &UserScope,
        id: BudgetId,
    ) -> LedgerResult<Option<(Budget, Budget)>> {
        let mut budget = self.require(id)?;
        if !budget.is_active() {
            return Ok(None);
        }
        let before = budget.clone();
        budget.set_active(false);
        self.storage.persist_budget(&budget)?;
        Ok(Some((before, budget)))
    }

    /// Deactivate every active budget of `user` whose window ended before
    /// `today`. Returns the budgets switched off by this run.
    pub fn sweep_expired(&self, user: UserId, today: NaiveDate) -> LedgerResult<Vec<Budget>> {
        let changes = in_user_scope(self.storage, user, |scope| {
            let mut changes = Vec::new();
            for expired in self.storage.find_expired(user, today)? {
                if let Some(change) = self.deactivate_in(scope, expired.id)? {
                    changes.push(change);
                }
            }
            Ok(changes)
        })?;

        if changes.is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<_> = changes
            .iter()
            .map(|(before, after)| {
                AuditEntry::deactivate(
                    EntityType::Budget,
                    after.id.to_string(),
                    Some(after.name.clone()),
                    before,
                    after,
                )
            })
            .collect();
        self.storage.log_batch(&entries);
        info!(user = %user, today = %today, count = changes.len(), "swept expired budgets");

        Ok(changes.into_iter().map(|(_, after)| after).collect())
    }

    /// Remove a budget in either state
    pub fn delete(&self, id: BudgetId) -> LedgerResult<Budget> {
        let owner = self.require(id)?.user_id;

        let removed = in_user_scope(self.storage, owner, |_| {
            self.storage
                .delete_budget(id)?
                .ok_or_else(|| LedgerError::budget_not_found(id.to_string()))
        })?;

        self.storage.log_delete(
            EntityType::Budget,
            removed.id,
            Some(removed.name.clone()),
            &removed,
        );
        info!(budget = %removed.id, name = %removed.name, "deleted budget");
        Ok(removed)
    }

    /// Recompute one budget's aggregate
    pub fn recompute(&self, id: BudgetId) -> LedgerResult<Budget> {
        self.engine().recompute(id)
    }

    /// Recompute every active budget of `user` in one unit
    pub fn recompute_all_active(&self, user: UserId) -> LedgerResult<Vec<Budget>> {
        in_user_scope(self.storage, user, |scope| {
            let engine = self.engine();
            self.storage
                .find_budgets(user, Some(true))?
                .into_iter()
                .map(|b| engine.recompute_in(scope, b.id))
                .collect()
        })
    }

    pub fn get(&self, id: BudgetId) -> LedgerResult<Option<Budget>> {
        self.storage.get_budget(id)
    }

    fn require(&self, id: BudgetId) -> LedgerResult<Budget> {
        self.get(id)?
            .ok_or_else(|| LedgerError::budget_not_found(id.to_string()))
    }

    /// Resolve a user's budget by name or ID reference. An active budget
    /// wins when several share a name.
    pub fn find(&self, user: UserId, identifier: &str) -> LedgerResult<Option<Budget>> {
        let budgets = self.list(user)?;
        let name = identifier.trim();
        let mut named: Vec<_> = budgets.iter().filter(|b| b.name == name).collect();
        named.sort_by_key(|b| !b.is_active());
        if let Some(budget) = named.first() {
            return Ok(Some((*budget).clone()));
        }
        Ok(budgets.into_iter().find(|b| b.id.matches(identifier)))
    }

    /// All of a user's budgets, ordered by start date
    pub fn list(&self, user: UserId) -> LedgerResult<Vec<Budget>> {
        self.storage.find_budgets(user, None)
    }

    pub fn list_active(&self, user: UserId) -> LedgerResult<Vec<Budget>> {
        self.storage.find_budgets(user, Some(true))
    }

    /// All of a user's budgets, soonest ending first
    pub fn list_ordered_by_end_date(&self, user: UserId) -> LedgerResult<Vec<Budget>> {
        let mut budgets = self.list(user)?;
        budgets.sort_by(|a, b| a.end_date.cmp(&b.end_date).then_with(|| a.name.cmp(&b.name)));
        Ok(budgets)
    }

    /// Active budgets whose window contains `date`
    pub fn list_active_on(&self, user: UserId, date: NaiveDate) -> LedgerResult<Vec<Budget>> {
        let mut budgets = self.storage.budgets.find_on(user, date)?;
        budgets.retain(Budget::is_active);
        Ok(budgets)
    }

    /// Active budgets spending more than their cap
    pub fn over_budget(&self, user: UserId) -> LedgerResult<Vec<Budget>> {
        let mut budgets = self.list_active(user)?;
        budgets.retain(Budget::is_over_budget);
        Ok(budgets)
    }

    /// Active budgets not over their cap but at or above `percent` of it
    pub fn near_limit(&self, user: UserId, percent: u8) -> LedgerResult<Vec<Budget>> {
        let mut budgets = self.list_active(user)?;
        budgets.retain(|b| b.is_near_limit(percent));
        Ok(budgets)
    }

    pub fn summary(&self, user: UserId) -> LedgerResult<BudgetSummary> {
        let budgets = self.list(user)?;
        let active: Vec<_> = budgets.iter().filter(|b| b.is_active()).collect();

        Ok(BudgetSummary {
            total_budgeted: Money::checked_sum(active.iter().map(|b| b.amount))
                .ok_or_else(|| LedgerError::total_overflow("Total budgeted"))?,
            total_spent: Money::checked_sum(active.iter().map(|b| b.spent_amount()))
                .ok_or_else(|| LedgerError::total_overflow("Total spent"))?,
            over_budget_count: budgets.iter().filter(|b| b.is_over_budget()).count(),
        })
    }

    /// Advisory period label for a window
    pub fn suggest_period(start: NaiveDate, end: NaiveDate) -> BudgetPeriod {
        BudgetPeriod::classify(start, end)
    }

    fn check_category(&self, user: UserId, category_id: CategoryId) -> LedgerResult<()> {
        match self.storage.categories.get(category_id)? {
            Some(category) if category.user_id == user => Ok(()),
            _ => Err(LedgerError::category_not_found(category_id.to_string())),
        }
    }
}
