//! Category display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Category;

use super::truncate;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Format categories as a table
pub fn format_category_table(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.".to_string();
    }

    let rows = categories.iter().map(|c| CategoryRow {
        id: c.id.to_string(),
        name: c.name.clone(),
        kind: c.kind.to_string(),
        description: truncate(&c.description, 40),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}
