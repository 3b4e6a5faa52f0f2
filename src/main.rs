use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use staffdesk::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "staffdesk=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init { force } => cli::commands::init(force).await,
        Commands::Serve { host, port } => cli::commands::serve(config_path, host, port).await,
        Commands::User { action } => cli::commands::user(config_path, action).await,
        Commands::HashPassword { password } => {
            cli::commands::hash_password_command(config_path, password).await
        }
    }
}
