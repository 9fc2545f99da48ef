//! Display formatting for terminal output
//!
//! List views are rendered as tables; detail views as aligned key/value
//! blocks.

pub mod budget;
pub mod category;
pub mod transaction;

pub use budget::{format_budget_details, format_budget_summary, format_budget_table};
pub use category::format_category_table;
pub use transaction::{format_totals, format_transaction_details, format_transaction_table};

use std::collections::HashMap;

use crate::models::{Category, CategoryId};

/// Category names keyed by id, for resolving names in tables
pub type CategoryNames = HashMap<CategoryId, String>;

pub fn category_names(categories: &[Category]) -> CategoryNames {
    categories.iter().map(|c| (c.id, c.name.clone())).collect()
}

fn name_of(names: &CategoryNames, id: CategoryId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

/// Shorten to at most `max_chars` characters, marking the cut with "..."
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Lunch", 10), "Lunch");
        assert_eq!(truncate("Weekly farmers market", 10), "Weekly ...");
        assert_eq!(truncate("Café crème brûlée", 8), "Café ...");
    }
}
