//! User CLI commands

use clap::Subcommand;

use crate::config::paths::LedgerPaths;
use crate::config::settings::Settings;
use crate::error::LedgerResult;
use crate::services::UserService;
use crate::storage::Storage;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Add {
        /// Username (no spaces)
        username: String,
        /// Also make this the default user
        #[arg(long)]
        default: bool,
    },

    /// List users
    List,
}

/// Handle a user command
pub fn handle_user_command(
    storage: &Storage,
    paths: &LedgerPaths,
    settings: &mut Settings,
    cmd: UserCommands,
) -> LedgerResult<()> {
    let service = UserService::new(storage);

    match cmd {
        UserCommands::Add { username, default } => {
            let user = service.create(&username)?;
            println!("Created user: {}", user.username);
            println!("  ID: {}", user.id);

            if default || settings.default_user.is_none() {
                settings.default_user = Some(user.username.clone());
                settings.save(paths)?;
                println!("  Set as default user");
            }
        }

        UserCommands::List => {
            let users = service.list()?;
            if users.is_empty() {
                println!("No users found. Add one with 'ledger user add <name>'.");
            }
            for user in users {
                let marker = if settings.default_user.as_deref() == Some(user.username.as_str()) {
                    " (default)"
                } else {
                    ""
                };
                println!("{}  {}{}", user.id, user.username, marker);
            }
        }
    }

    Ok(())
}
