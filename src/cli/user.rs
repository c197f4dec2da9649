//! User CLI commands

use clap::Subcommand;

use crate::error::BillTrackerResult;
use crate::services::UserService;
use crate::storage::Storage;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Add {
        /// Username
        username: String,
    },
    /// List all users
    List,
}

/// Handle a user command
pub fn handle_user_command(storage: &Storage, cmd: UserCommands) -> BillTrackerResult<()> {
    let service = UserService::new(storage);

    match cmd {
        UserCommands::Add { username } => {
            let user = service.register(&username)?;
            println!("Registered user: {}", user.username);
            if let Some(id) = user.id {
                println!("  ID: {}", id);
            }
        }

        UserCommands::List => {
            let users = service.list()?;
            if users.is_empty() {
                println!("No users registered.");
            }
            for user in users {
                let id = user.id.map(|id| id.to_string()).unwrap_or_default();
                println!("{:>4}  {}", id, user.username);
            }
        }
    }

    Ok(())
}
