//! Transaction service
//!
//! Provides business logic for ledger entries. Every create, edit, and
//! delete persists the row and then brings the affected budgets back in
//! line, all inside the owner's atomic unit.

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{CategoryId, Money, Transaction, TransactionId, TransactionType, UserId};
use crate::storage::{in_user_scope, LedgerStore, Storage, UserScope};

use super::coordinator::MutationCoordinator;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Options for filtering transactions
#[derive(Debug, Clone)]
pub struct TransactionFilter {
    pub user_id: UserId,
    pub category_id: Option<CategoryId>,
    pub kind: Option<TransactionType>,
    /// Filter by date range start
    pub start_date: Option<NaiveDate>,
    /// Filter by date range end
    pub end_date: Option<NaiveDate>,
    /// Maximum number of transactions to return
    pub limit: Option<usize>,
}

impl TransactionFilter {
    /// Everything belonging to `user`
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            category_id: None,
            kind: None,
            start_date: None,
            end_date: None,
            limit: None,
        }
    }

    /// Filter by category
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Filter by date range
    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub kind: TransactionType,
    pub date: NaiveDate,
    pub amount: Money,
    pub description: String,
    pub notes: Option<String>,
}

/// Fields that can be changed on an existing transaction
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub category_id: Option<CategoryId>,
    pub kind: Option<TransactionType>,
    pub date: Option<NaiveDate>,
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// Income and expense totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionTotals {
    pub income: Money,
    pub expense: Money,
}

impl TransactionTotals {
    /// Income minus expense
    pub fn net(&self) -> Money {
        self.income - self.expense
    }
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a new transaction and update covering budgets
    pub fn create(&self, input: CreateTransactionInput) -> LedgerResult<Transaction> {
        self.check_category(input.user_id, input.category_id)?;

        let mut txn = Transaction::new(
            input.user_id,
            input.category_id,
            input.kind,
            input.date,
            input.amount,
        );
        txn.description = input.description.trim().to_string();
        if let Some(notes) = input.notes {
            txn.notes = notes;
        }
        txn.validate()?;

        in_user_scope(self.storage, txn.user_id, |scope| {
            self.storage.transactions.persist(&txn)?;
            self.coordinate_or_revert(scope, None, Some(&txn))
        })?;

        self.storage.log_create(
            EntityType::Transaction,
            txn.id,
            Some(txn.description.clone()),
            &txn,
        );
        info!(transaction = %txn.id, amount = %txn.amount, kind = %txn.kind, "created transaction");

        Ok(txn)
    }

    /// Edit a transaction; budgets covering the old and the new version
    /// are both recomputed
    pub fn update(
        &self,
        id: TransactionId,
        changes: TransactionUpdate,
    ) -> LedgerResult<Transaction> {
        let owner = self.require(id)?.user_id;

        let (before, after) = in_user_scope(self.storage, owner, |scope| {
            let mut txn = self.require(id)?;
            let before = txn.clone();

            if let Some(category_id) = changes.category_id {
                self.check_category(owner, category_id)?;
                txn.category_id = category_id;
            }
            if let Some(kind) = changes.kind {
                txn.kind = kind;
            }
            if let Some(date) = changes.date {
                txn.date = date;
            }
            if let Some(amount) = changes.amount {
                txn.amount = amount;
            }
            if let Some(description) = changes.description {
                txn.description = description.trim().to_string();
            }
            if let Some(notes) = changes.notes {
                txn.notes = notes;
            }
            txn.validate()?;
            txn.updated_at = Utc::now();

            self.storage.transactions.persist(&txn)?;
            self.coordinate_or_revert(scope, Some(&before), Some(&txn))?;
            Ok((before, txn))
        })?;

        self.storage.log_update(
            EntityType::Transaction,
            after.id,
            Some(after.description.clone()),
            &before,
            &after,
        );
        Ok(after)
    }

    /// Remove a transaction and update the budgets it counted toward
    pub fn delete(&self, id: TransactionId) -> LedgerResult<Transaction> {
        let owner = self.require(id)?.user_id;

        let removed = in_user_scope(self.storage, owner, |scope| {
            let removed = self
                .storage
                .transactions
                .remove(id)?
                .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;
            self.coordinate_or_revert(scope, Some(&removed), None)?;
            Ok(removed)
        })?;

        self.storage.log_delete(
            EntityType::Transaction,
            removed.id,
            Some(removed.description.clone()),
            &removed,
        );
        info!(transaction = %removed.id, "deleted transaction");
        Ok(removed)
    }

    /// Recompute budgets for a write that has already been persisted. If
    /// that fails, the ledger row goes back to `before` and the budgets are
    /// recomputed against the restored ledger.
    fn coordinate_or_revert(
        &self,
        scope: &UserScope,
        before: Option<&Transaction>,
        after: Option<&Transaction>,
    ) -> LedgerResult<()> {
        let coordinator = MutationCoordinator::new(self.storage);
        let Err(err) = coordinator.on_transaction_written_in(scope, before, after) else {
            return Ok(());
        };

        let reverted = match (before, after) {
            (Some(previous), _) => self.storage.transactions.persist(previous),
            (None, Some(written)) => self.storage.transactions.remove(written.id).map(|_| ()),
            (None, None) => Ok(()),
        };
        match reverted {
            Ok(()) => {
                if let Err(e) = coordinator.on_transaction_written_in(scope, after, before) {
                    warn!(error = %e, "budgets not recomputed after reverting transaction");
                }
            }
            Err(e) => warn!(error = %e, "could not revert transaction after failed aggregation"),
        }
        Err(err)
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        self.storage.get_transaction(id)
    }

    fn require(&self, id: TransactionId) -> LedgerResult<Transaction> {
        self.get(id)?
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))
    }

    /// Find one of `user`'s transactions by ID reference
    pub fn find(&self, user: UserId, identifier: &str) -> LedgerResult<Option<Transaction>> {
        Ok(self
            .storage
            .transactions
            .get_by_user(user)?
            .into_iter()
            .find(|t| t.id.matches(identifier)))
    }

    /// List transactions with filtering, newest first
    pub fn list(&self, filter: TransactionFilter) -> LedgerResult<Vec<Transaction>> {
        let mut transactions = self.storage.transactions.get_by_user(filter.user_id)?;

        if let Some(category_id) = filter.category_id {
            transactions.retain(|t| t.category_id == category_id);
        }
        if let Some(kind) = filter.kind {
            transactions.retain(|t| t.kind == kind);
        }
        if let Some(start) = filter.start_date {
            transactions.retain(|t| t.date >= start);
        }
        if let Some(end) = filter.end_date {
            transactions.retain(|t| t.date <= end);
        }
        if let Some(limit) = filter.limit {
            transactions.truncate(limit);
        }

        Ok(transactions)
    }

    /// Case-insensitive keyword search over description and notes
    pub fn search(&self, user: UserId, keyword: &str) -> LedgerResult<Vec<Transaction>> {
        let mut transactions = self.storage.transactions.get_by_user(user)?;
        transactions.retain(|t| t.mentions(keyword));
        Ok(transactions)
    }

    /// Income and expense totals, optionally within an inclusive range
    pub fn totals(
        &self,
        user: UserId,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> LedgerResult<TransactionTotals> {
        let mut filter = TransactionFilter::for_user(user);
        if let Some((start, end)) = range {
            filter = filter.date_range(start, end);
        }

        let mut totals = TransactionTotals {
            income: Money::zero(),
            expense: Money::zero(),
        };
        for txn in self.list(filter)? {
            let slot = match txn.kind {
                TransactionType::Income => &mut totals.income,
                TransactionType::Expense => &mut totals.expense,
            };
            *slot = slot
                .checked_add(txn.amount)
                .ok_or_else(|| LedgerError::total_overflow(format!("{} total", txn.kind)))?;
        }
        Ok(totals)
    }

    /// Expense total for one category within an inclusive range
    pub fn expense_for_category(
        &self,
        user: UserId,
        category: CategoryId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<Money> {
        self.storage.sum_expense_amount(user, category, start, end)
    }

    pub fn count(&self) -> LedgerResult<usize> {
        self.storage.transactions.count()
    }

    fn check_category(&self, user: UserId, category_id: CategoryId) -> LedgerResult<()> {
        match self.storage.categories.get(category_id)? {
            Some(category) if category.user_id == user => Ok(()),
            _ => Err(LedgerError::category_not_found(category_id.to_string())),
        }
    }
}
