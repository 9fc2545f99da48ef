use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use budget_ledger::cli::{
    handle_budget_command, handle_category_command, handle_transaction_command,
    handle_user_command, BudgetCommands, CategoryCommands, TransactionCommands, UserCommands,
};
use budget_ledger::config::{paths::LedgerPaths, settings::Settings};
use budget_ledger::models::User;
use budget_ledger::services::{BudgetService, UserService};
use budget_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "ledger",
    author = "Kaylee Beyene",
    version,
    about = "Income/expense ledger with category budgets",
    long_about = "Track income and expense transactions by category and set \
                  budgets over date windows. Budget spending is recomputed \
                  from the ledger whenever a transaction changes."
)]
struct Cli {
    /// Act as this user instead of the configured default
    #[arg(short, long, global = true, env = "BUDGET_LEDGER_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory, optionally creating a first user
    Init {
        /// Username to create and make the default
        username: Option<String>,
    },

    /// Show current configuration and paths
    Config,

    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "transaction")]
    Txn(TransactionCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Show recent audit log entries
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },
}

/// The user selected by `--user` or the configured default
fn current_user(storage: &Storage, settings: &Settings, flag: Option<&str>) -> Result<User> {
    let username = flag
        .or(settings.default_user.as_deref())
        .context("No user selected. Pass --user NAME or run 'ledger user add NAME'.")?;
    Ok(UserService::new(storage).require(username)?)
}

/// Resolve the user and run the expiration sweep if configured
fn prepare_user(storage: &Storage, settings: &Settings, flag: Option<&str>) -> Result<User> {
    let user = current_user(storage, settings, flag)?;
    if settings.sweep_on_start {
        BudgetService::new(storage).sweep_expired(user.id, Local::now().date_naive())?;
    }
    Ok(user)
}

fn main() -> Result<()> {
    budget_ledger::init_tracing();
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = LedgerPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.set_audit_enabled(settings.audit_enabled);
    storage.load_all()?;

    let user_flag = cli.user.as_deref();

    match cli.command {
        Some(Commands::Init { username }) => {
            println!("Initializing budget ledger at: {}", paths.base_dir().display());
            if let Some(username) = username {
                let user = UserService::new(&storage).create(&username)?;
                settings.default_user = Some(user.username.clone());
                println!("Created user '{}' and set it as the default.", user.username);
            }
            settings.save(&paths)?;
            println!("Initialization complete!");
        }
        Some(Commands::Config) => {
            println!("Budget Ledger Configuration");
            println!("===========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Near-limit threshold: {}%", settings.near_limit_percent);
            println!("  Sweep on start:       {}", settings.sweep_on_start);
            println!("  Audit enabled:        {}", settings.audit_enabled);
            println!(
                "  Default user:         {}",
                settings.default_user.as_deref().unwrap_or("(none)")
            );
            println!();
            println!("Data:");
            println!("  Users:        {}", storage.users.count()?);
            println!("  Transactions: {}", storage.transactions.count()?);
            println!("  Budgets:      {}", storage.budgets.count()?);
        }
        Some(Commands::User(cmd)) => {
            handle_user_command(&storage, &paths, &mut settings, cmd)?;
        }
        Some(Commands::Category(cmd)) => {
            let user = current_user(&storage, &settings, user_flag)?;
            handle_category_command(&storage, &user, cmd)?;
        }
        Some(Commands::Txn(cmd)) => {
            let user = prepare_user(&storage, &settings, user_flag)?;
            handle_transaction_command(&storage, &user, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            let user = prepare_user(&storage, &settings, user_flag)?;
            handle_budget_command(&storage, &settings, &user, cmd)?;
        }
        Some(Commands::History { count }) => match storage.audit_logger() {
            Some(audit) => {
                let entries = audit.tail(count)?;
                if entries.is_empty() {
                    println!("No audit entries yet.");
                }
                for entry in entries {
                    println!("{}", entry.format_human_readable());
                }
            }
            None => println!("Audit logging is disabled."),
        },
        None => {
            println!("budget-ledger - income/expense ledger with category budgets");
            println!();
            println!("Run 'ledger --help' for usage information.");
        }
    }

    Ok(())
}
