//! Transaction display formatting

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::Transaction;
use crate::services::TransactionTotals;

use super::{name_of, truncate, CategoryNames};

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Format transactions as a register table. Expenses show as negative.
pub fn format_transaction_table(
    transactions: &[Transaction],
    categories: &CategoryNames,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.".to_string();
    }

    let rows = transactions.iter().map(|t| TransactionRow {
        id: t.id.to_string(),
        date: t.date.format("%Y-%m-%d").to_string(),
        description: truncate(&t.description, 30),
        category: truncate(&name_of(categories, t.category_id), 16),
        amount: if t.is_expense() {
            (-t.amount).to_string()
        } else {
            t.amount.to_string()
        },
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::single(4), Alignment::right());
    table.to_string()
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, category_name: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.date.format("%Y-%m-%d")));
    output.push_str(&format!("Type:        {}\n", txn.kind));
    output.push_str(&format!("Amount:      {}\n", txn.amount));
    output.push_str(&format!("Description: {}\n", txn.description));
    output.push_str(&format!("Category:    {}\n", category_name));
    if !txn.notes.is_empty() {
        output.push_str(&format!("Notes:       {}\n", txn.notes));
    }

    output
}

pub fn format_totals(totals: &TransactionTotals) -> String {
    format!(
        "Income:   {}\nExpense:  {}\nNet:      {}\n",
        totals.income,
        totals.expense,
        totals.net()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryId, Money, UserId};
    use chrono::NaiveDate;

    #[test]
    fn test_expenses_render_negative() {
        let category = CategoryId::new();
        let txn = Transaction::expense(
            UserId::new(),
            category,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Money::from_cents(1050),
            "Lunch",
        );
        let names = CategoryNames::from([(category, "Food".to_string())]);
        let table = format_transaction_table(&[txn], &names);
        assert!(table.contains("-$10.50"));
        assert!(table.contains("Food"));
        assert!(table.contains("2024-01-15"));
    }

    #[test]
    fn test_totals() {
        let totals = TransactionTotals {
            income: Money::from_cents(100_000),
            expense: Money::from_cents(2_450),
        };
        assert!(format_totals(&totals).contains("Net:      $975.50"));
    }
}
