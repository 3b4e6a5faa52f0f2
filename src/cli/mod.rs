//! CLI interface for Staffdesk

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "staffdesk")]
#[command(author = "Krakaw")]
#[command(version)]
#[command(about = "Employee ticket service with JWT authentication", long_about = None)]
pub struct Cli {
    /// Path to the configuration file (defaults to searching for staffdesk.toml)
    #[arg(short, long, global = true, env = "STAFFDESK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new staffdesk.toml configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage user accounts in the configured database
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Print the bcrypt hash of a password
    HashPassword {
        /// Password to hash; prompted for when omitted
        password: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Create a user account
    Add {
        #[arg(short, long)]
        username: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        email: String,

        /// Roles to grant, repeatable
        #[arg(short, long = "role")]
        roles: Vec<String>,
    },

    /// Set a user's password
    Passwd {
        /// Username of the account
        username: String,
    },

    /// List user accounts
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}
