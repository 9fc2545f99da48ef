//! Budget display formatting

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::Budget;
use crate::services::BudgetSummary;

use super::{name_of, truncate, CategoryNames};

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Window")]
    window: String,
    #[tabled(rename = "Budgeted")]
    amount: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "%")]
    percent: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

fn status(budget: &Budget) -> &'static str {
    match (budget.is_active(), budget.is_over_budget()) {
        (false, _) => "inactive",
        (true, true) => "OVER",
        (true, false) => "ok",
    }
}

/// Format budgets as a table
pub fn format_budget_table(budgets: &[Budget], categories: &CategoryNames) -> String {
    if budgets.is_empty() {
        return "No budgets found.".to_string();
    }

    let rows = budgets.iter().map(|b| BudgetRow {
        id: b.id.to_string(),
        name: truncate(&b.name, 24),
        category: truncate(&name_of(categories, b.category_id), 16),
        window: format!("{} .. {}", b.start_date, b.end_date),
        amount: b.amount.to_string(),
        spent: b.spent_amount().to_string(),
        remaining: b.remaining().to_string(),
        percent: format!("{:.2}", b.spent_percentage()),
        status: status(b),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::new(4..8), Alignment::right());
    table.to_string()
}

/// Format budget details for display
pub fn format_budget_details(budget: &Budget, category_name: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Budget: {}\n", budget.name));
    output.push_str(&format!("  ID:          {}\n", budget.id));
    output.push_str(&format!("  Category:    {}\n", category_name));
    output.push_str(&format!(
        "  Window:      {} .. {} ({})\n",
        budget.start_date, budget.end_date, budget.period
    ));
    output.push_str(&format!("  Budgeted:    {}\n", budget.amount));
    output.push_str(&format!("  Spent:       {}\n", budget.spent_amount()));
    output.push_str(&format!("  Remaining:   {}\n", budget.remaining()));
    output.push_str(&format!("  Used:        {:.2}%\n", budget.spent_percentage()));
    output.push_str(&format!(
        "  Status:      {}\n",
        if budget.is_active() { "active" } else { "inactive" }
    ));
    if budget.is_over_budget() {
        output.push_str("  ** Over budget **\n");
    }
    if !budget.description.is_empty() {
        output.push_str(&format!("  Description: {}\n", budget.description));
    }

    output
}

pub fn format_budget_summary(summary: &BudgetSummary) -> String {
    format!(
        "Total budgeted:  {}\nTotal spent:     {}\nRemaining:       {}\nOver budget:     {}\n",
        summary.total_budgeted,
        summary.total_spent,
        summary.total_remaining(),
        summary.over_budget_count
    )
}
