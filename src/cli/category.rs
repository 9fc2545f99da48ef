//! Category CLI commands

use clap::Subcommand;

use crate::display::format_category_table;
use crate::error::LedgerResult;
use crate::models::{CategoryType, User};
use crate::services::{CategoryService, CategoryUpdate};
use crate::storage::Storage;

use super::resolve_category;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a new category
    Add {
        /// Category name
        name: String,
        /// INCOME or EXPENSE
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: CategoryType,
        #[arg(short, long)]
        description: Option<String>,
        /// Display color, e.g. "#4caf50"
        #[arg(long)]
        color: Option<String>,
    },

    /// List categories
    List {
        /// Only show this type
        #[arg(short = 't', long = "type")]
        kind: Option<CategoryType>,
    },

    /// Rename a category
    Rename {
        /// Category name or ID
        category: String,
        /// New name
        name: String,
    },

    /// Delete a category that nothing refers to
    Remove {
        /// Category name or ID
        category: String,
    },
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    user: &User,
    cmd: CategoryCommands,
) -> LedgerResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::Add {
            name,
            kind,
            description,
            color,
        } => {
            let mut category = service.create(user.id, &name, kind)?;
            if description.is_some() || color.is_some() {
                category = service.update(
                    category.id,
                    CategoryUpdate {
                        description,
                        color,
                        ..Default::default()
                    },
                )?;
            }
            println!("Created category: {} ({})", category.name, category.kind);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::List { kind } => {
            let categories = service.list(user.id, kind)?;
            println!("{}", format_category_table(&categories));
        }

        CategoryCommands::Rename { category, name } => {
            let category = resolve_category(storage, user.id, &category)?;
            let old_name = category.name.clone();
            let renamed = service.update(
                category.id,
                CategoryUpdate {
                    name: Some(name),
                    ..Default::default()
                },
            )?;
            println!("Renamed category: {} -> {}", old_name, renamed.name);
        }

        CategoryCommands::Remove { category } => {
            let category = resolve_category(storage, user.id, &category)?;
            let removed = service.delete(category.id)?;
            println!("Deleted category: {}", removed.name);
        }
    }

    Ok(())
}
