// CLI module for operator tasks against the roster database

pub mod migrate;
pub mod purge;
pub mod users;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;

/// Roster CLI; without a subcommand the HTTP server starts
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "Roster identity and access-control backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run pending database migrations and exit
    Migrate,

    /// Create an account with a generated password
    CreateUser {
        /// Email address of the new account
        #[arg(long)]
        email: String,

        /// admin, editor, content_manager, viewer or member
        #[arg(long, default_value = "member")]
        role: String,
    },

    /// Purge accounts soft-deleted more than 30 days ago
    PurgeSweep,

    /// Issue a password reset token for an account
    ResetToken {
        #[arg(long)]
        email: String,
    },
}

/// Execute a CLI command that needs the full application wiring
///
/// `Migrate` is handled before AppData exists and is a no-op here.
///
/// # Arguments
/// * `command` - Parsed subcommand
/// * `app_data` - Application data containing all stores and services
pub async fn execute_command(
    command: Commands,
    app_data: Arc<AppData>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Migrate => {}
        Commands::CreateUser { email, role } => {
            users::create_user(&app_data, &email, &role).await?;
        }
        Commands::PurgeSweep => {
            purge::purge_sweep(&app_data).await?;
        }
        Commands::ResetToken { email } => {
            users::issue_reset_token(app_data, &email).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_server() {
        let cli = Cli::try_parse_from(["roster"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_create_user() {
        let cli = Cli::try_parse_from(["roster", "create-user", "--email", "a@x.org", "--role", "editor"]).unwrap();

        assert_eq!(
            cli.command,
            Some(Commands::CreateUser {
                email: "a@x.org".to_string(),
                role: "editor".to_string(),
            })
        );
    }

    #[test]
    fn test_create_user_role_defaults_to_member() {
        let cli = Cli::try_parse_from(["roster", "create-user", "--email", "a@x.org"]).unwrap();

        assert!(matches!(cli.command, Some(Commands::CreateUser { role, .. }) if role == "member"));
    }

    #[test]
    fn test_parse_other_subcommands() {
        assert_eq!(Cli::try_parse_from(["roster", "migrate"]).unwrap().command, Some(Commands::Migrate));
        assert_eq!(Cli::try_parse_from(["roster", "purge-sweep"]).unwrap().command, Some(Commands::PurgeSweep));
        assert!(Cli::try_parse_from(["roster", "reset-token"]).is_err());
    }
}
