//! Transaction CLI commands
//!
//! Every write here goes through the transaction service, so budgets
//! covering the entry are up to date when the command returns.

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::display::{format_totals, format_transaction_details, format_transaction_table};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, Transaction, TransactionType, User};
use crate::services::{
    CreateTransactionInput, TransactionFilter, TransactionService, TransactionUpdate,
};
use crate::storage::Storage;

use super::{resolve_category, user_category_names};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a transaction
    Add {
        /// Positive amount (e.g., "12.50")
        amount: Money,
        /// Short description or payee
        description: String,
        /// Category name or ID
        #[arg(short, long)]
        category: String,
        /// INCOME or EXPENSE
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionType,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List transactions, newest first
    List {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Filter by type
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
        /// First date to include
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last date to include
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show one transaction
    Show {
        /// Transaction ID
        id: String,
    },

    /// Edit a transaction
    Edit {
        /// Transaction ID
        id: String,
        #[arg(short, long)]
        amount: Option<Money>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a transaction
    Remove {
        /// Transaction ID
        id: String,
    },

    /// Search descriptions and notes
    Search {
        keyword: String,
    },

    /// Income, expense, and net totals
    Totals {
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
}

fn resolve_transaction(
    service: &TransactionService,
    user: &User,
    id: &str,
) -> LedgerResult<Transaction> {
    service
        .find(user.id, id)?
        .ok_or_else(|| LedgerError::transaction_not_found(id))
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    user: &User,
    cmd: TransactionCommands,
) -> LedgerResult<()> {
    let service = TransactionService::new(storage);

    match cmd {
        TransactionCommands::Add {
            amount,
            description,
            category,
            kind,
            date,
            notes,
        } => {
            let category = resolve_category(storage, user.id, &category)?;
            let txn = service.create(CreateTransactionInput {
                user_id: user.id,
                category_id: category.id,
                kind,
                date: date.unwrap_or_else(|| Local::now().date_naive()),
                amount,
                description,
                notes,
            })?;
            println!("Recorded: {}", txn);
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::List {
            category,
            kind,
            from,
            to,
            limit,
        } => {
            let mut filter = TransactionFilter::for_user(user.id).limit(limit);
            if let Some(category) = category {
                filter = filter.category(resolve_category(storage, user.id, &category)?.id);
            }
            if let Some(kind) = kind {
                filter = filter.kind(kind);
            }
            filter.start_date = from;
            filter.end_date = to;

            let transactions = service.list(filter)?;
            let names = user_category_names(storage, user.id)?;
            println!("{}", format_transaction_table(&transactions, &names));
        }

        TransactionCommands::Show { id } => {
            let txn = resolve_transaction(&service, user, &id)?;
            let names = user_category_names(storage, user.id)?;
            let category = names.get(&txn.category_id).cloned().unwrap_or_default();
            print!("{}", format_transaction_details(&txn, &category));
        }

        TransactionCommands::Edit {
            id,
            amount,
            description,
            category,
            kind,
            date,
            notes,
        } => {
            let txn = resolve_transaction(&service, user, &id)?;
            let category_id = match category {
                Some(category) => Some(resolve_category(storage, user.id, &category)?.id),
                None => None,
            };
            let updated = service.update(
                txn.id,
                TransactionUpdate {
                    category_id,
                    kind,
                    date,
                    amount,
                    description,
                    notes,
                },
            )?;
            println!("Updated: {}", updated);
        }

        TransactionCommands::Remove { id } => {
            let txn = resolve_transaction(&service, user, &id)?;
            let removed = service.delete(txn.id)?;
            println!("Deleted: {}", removed);
        }

        TransactionCommands::Search { keyword } => {
            let transactions = service.search(user.id, &keyword)?;
            let names = user_category_names(storage, user.id)?;
            println!("{}", format_transaction_table(&transactions, &names));
        }

        TransactionCommands::Totals { from, to } => {
            let range = from.zip(to);
            let totals = service.totals(user.id, range)?;
            print!("{}", format_totals(&totals));
        }
    }

    Ok(())
}
