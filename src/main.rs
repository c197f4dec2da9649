use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

use billtracker::audit::{resolve_actor, CurrentUser};
use billtracker::cli::{
    handle_account_command, handle_audit_command, handle_bill_command, handle_lookup_command,
    handle_user_command, AccountCommands, AuditCommands, BillCommands, LookupCommands,
    UserCommands,
};
use billtracker::config::{paths::BillTrackerPaths, settings::Settings};
use billtracker::logging::init_logging;
use billtracker::services::UserService;
use billtracker::storage::Storage;

#[derive(Parser)]
#[command(
    name = "billtracker",
    version,
    about = "Track bills and bank balances with a full audit trail",
    long_about = "BillTracker keeps your bank accounts, balance snapshots, bills and \
                  due bills in local JSON files. Every change to them is recorded in \
                  an append-only audit log, together with the user who made it."
)]
struct Cli {
    /// Acting user (username)
    #[arg(short, long, global = true, env = "BILLTRACKER_USER")]
    user: Option<String>,

    /// Diagnostic log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init {
        /// Username to act as when --user is not given
        #[arg(long)]
        default_user: Option<String>,
    },

    /// Show current configuration and paths
    Config,

    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Bank account commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Bill and due bill commands
    #[command(subcommand)]
    Bill(BillCommands),

    /// Status, recurrence, and category lookups
    #[command(subcommand)]
    Lookup(LookupCommands),

    /// Audit log commands
    #[command(subcommand)]
    Audit(AuditCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = BillTrackerPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    init_logging(cli.log_level.as_deref().unwrap_or(&settings.log_level))?;

    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let username = cli.user.clone().or_else(|| settings.default_user.clone());
    let actor = resolve_actor(current_user(&storage, username.as_deref()));
    if let (Some(name), None) = (&username, actor) {
        warn!(username = %name, "Unknown user; acting as system");
    }

    match cli.command {
        Some(Commands::Init { default_user }) => {
            println!("Initializing BillTracker at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            if default_user.is_some() {
                settings.default_user = default_user;
            }
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  billtracker user add <username>");
            println!("  billtracker --user <username> bill add <name> <amount>");
        }
        Some(Commands::Config) => {
            println!("BillTracker Configuration");
            println!("=========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Log level:       {}", settings.log_level);
            println!(
                "  Default user:    {}",
                settings.default_user.as_deref().unwrap_or("(none)")
            );
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Date format:     {}", settings.date_format);
        }
        Some(Commands::User(cmd)) => handle_user_command(&storage, cmd)?,
        Some(Commands::Account(cmd)) => handle_account_command(&storage, &settings, actor, cmd)?,
        Some(Commands::Bill(cmd)) => handle_bill_command(&storage, &settings, actor, cmd)?,
        Some(Commands::Lookup(cmd)) => handle_lookup_command(&storage, actor, cmd)?,
        Some(Commands::Audit(cmd)) => handle_audit_command(&storage, actor, cmd)?,
        None => {
            println!("BillTracker - bills and balances with an audit trail");
            println!();
            println!("Run 'billtracker --help' for usage information.");
        }
    }

    Ok(())
}

/// The named user, looked up only when the actor is resolved
fn current_user<'a>(storage: &'a Storage, username: Option<&'a str>) -> CurrentUser<'a> {
    match username {
        None => CurrentUser::Absent,
        Some(name) => CurrentUser::deferred(move || {
            let user = UserService::new(storage).require(name)?;
            Ok(CurrentUser::authenticated(user))
        }),
    }
}
