//! Budget CLI commands
//!
//! Implements CLI commands for the budget lifecycle and budget queries.

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_budget_details, format_budget_summary, format_budget_table};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, BudgetPeriod, Money, User};
use crate::services::{BudgetService, BudgetUpdate, CreateBudgetInput};
use crate::storage::Storage;

use super::{resolve_category, user_category_names};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a budget for a category
    Create {
        /// Budget name, unique among active budgets
        name: String,
        /// Spending cap (e.g., "500" or "500.00")
        amount: Money,
        /// Category name or ID
        #[arg(short, long)]
        category: String,
        /// First day (YYYY-MM-DD)
        #[arg(short, long)]
        start: NaiveDate,
        /// Last day (YYYY-MM-DD); derived from --period when omitted
        #[arg(short, long)]
        end: Option<NaiveDate>,
        /// weekly, monthly, quarterly, yearly, or custom
        #[arg(short, long)]
        period: Option<BudgetPeriod>,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List budgets
    List {
        /// Include inactive budgets
        #[arg(short, long)]
        all: bool,
        /// Order by end date instead of start date
        #[arg(long)]
        by_end: bool,
        /// Only budgets whose window contains this date
        #[arg(long, conflicts_with = "all")]
        on: Option<NaiveDate>,
    },

    /// Show a budget with freshly computed figures
    Show {
        /// Budget name or ID
        budget: String,
    },

    /// Edit a budget
    Edit {
        /// Budget name or ID
        budget: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        amount: Option<Money>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        start: Option<NaiveDate>,
        #[arg(short, long)]
        end: Option<NaiveDate>,
        #[arg(short, long)]
        period: Option<BudgetPeriod>,
        #[arg(short, long)]
        description: Option<String>,
        /// Reactivate an inactive budget
        #[arg(long)]
        activate: bool,
    },

    /// Deactivate a budget (keeps its data)
    Deactivate {
        /// Budget name or ID
        budget: String,
    },

    /// Delete a budget permanently
    Delete {
        /// Budget name or ID
        budget: String,
    },

    /// Deactivate budgets whose window has ended
    Sweep {
        /// Treat this date as today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Recompute spent amounts from the ledger
    Recompute {
        /// Budget name or ID; all active budgets when omitted
        budget: Option<String>,
    },

    /// Active budgets over their cap
    Over,

    /// Active budgets close to their cap
    Near {
        /// Threshold percentage; defaults to the configured value
        #[arg(short, long)]
        percent: Option<u8>,
    },

    /// Totals across budgets
    Summary,
}

fn resolve_budget(service: &BudgetService, user: &User, identifier: &str) -> LedgerResult<Budget> {
    service
        .find(user.id, identifier)?
        .ok_or_else(|| LedgerError::budget_not_found(identifier))
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    user: &User,
    cmd: BudgetCommands,
) -> LedgerResult<()> {
    let service = BudgetService::new(storage);

    match cmd {
        BudgetCommands::Create {
            name,
            amount,
            category,
            start,
            end,
            period,
            description,
        } => {
            let category = resolve_category(storage, user.id, &category)?;
            let end = match end {
                Some(end) => end,
                None => period
                    .unwrap_or_default()
                    .default_end(start)
                    .ok_or_else(|| {
                        LedgerError::Validation("--end is required for custom budgets".into())
                    })?,
            };
            let budget = service.create(CreateBudgetInput {
                user_id: user.id,
                category_id: category.id,
                name,
                amount,
                start_date: start,
                end_date: end,
                period,
                description,
            })?;
            println!("Created budget: {}", budget.name);
            println!("  ID:     {}", budget.id);
            println!("  Window: {} .. {} ({})", budget.start_date, budget.end_date, budget.period);
            println!("  Spent:  {} of {}", budget.spent_amount(), budget.amount);
        }

        BudgetCommands::List { all, by_end, on } => {
            let budgets = match (on, all, by_end) {
                (Some(date), _, _) => service.list_active_on(user.id, date)?,
                (None, _, true) => {
                    let mut budgets = service.list_ordered_by_end_date(user.id)?;
                    if !all {
                        budgets.retain(Budget::is_active);
                    }
                    budgets
                }
                (None, true, false) => service.list(user.id)?,
                (None, false, false) => service.list_active(user.id)?,
            };
            let names = user_category_names(storage, user.id)?;
            println!("{}", format_budget_table(&budgets, &names));
        }

        BudgetCommands::Show { budget } => {
            let budget = resolve_budget(&service, user, &budget)?;
            let budget = service.recompute(budget.id)?;
            let names = user_category_names(storage, user.id)?;
            let category = names.get(&budget.category_id).cloned().unwrap_or_default();
            print!("{}", format_budget_details(&budget, &category));
        }

        BudgetCommands::Edit {
            budget,
            name,
            amount,
            category,
            start,
            end,
            period,
            description,
            activate,
        } => {
            let budget = resolve_budget(&service, user, &budget)?;
            let category_id = match category {
                Some(category) => Some(resolve_category(storage, user.id, &category)?.id),
                None => None,
            };
            let updated = service.update(
                budget.id,
                BudgetUpdate {
                    name,
                    description,
                    amount,
                    category_id,
                    start_date: start,
                    end_date: end,
                    period,
                    active: activate.then_some(true),
                },
            )?;
            println!("Updated budget: {}", updated);
        }

        BudgetCommands::Deactivate { budget } => {
            let budget = resolve_budget(&service, user, &budget)?;
            let budget = service.deactivate(budget.id)?;
            println!("Deactivated budget: {}", budget.name);
        }

        BudgetCommands::Delete { budget } => {
            let budget = resolve_budget(&service, user, &budget)?;
            let removed = service.delete(budget.id)?;
            println!("Deleted budget: {}", removed.name);
        }

        BudgetCommands::Sweep { today } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let swept = service.sweep_expired(user.id, today)?;
            if swept.is_empty() {
                println!("No expired budgets.");
            }
            for budget in swept {
                println!("Deactivated expired budget: {} (ended {})", budget.name, budget.end_date);
            }
        }

        BudgetCommands::Recompute { budget } => {
            let recomputed = match budget {
                Some(budget) => {
                    let budget = resolve_budget(&service, user, &budget)?;
                    vec![service.recompute(budget.id)?]
                }
                None => service.recompute_all_active(user.id)?,
            };
            let names = user_category_names(storage, user.id)?;
            println!("{}", format_budget_table(&recomputed, &names));
        }

        BudgetCommands::Over => {
            let budgets = service.over_budget(user.id)?;
            let names = user_category_names(storage, user.id)?;
            println!("{}", format_budget_table(&budgets, &names));
        }

        BudgetCommands::Near { percent } => {
            let percent = percent.unwrap_or(settings.near_limit_percent);
            let budgets = service.near_limit(user.id, percent)?;
            let names = user_category_names(storage, user.id)?;
            println!("{}", format_budget_table(&budgets, &names));
        }

        BudgetCommands::Summary => {
            let summary = service.summary(user.id)?;
            print!("{}", format_budget_summary(&summary));
        }
    }

    Ok(())
}
