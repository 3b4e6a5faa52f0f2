//! CLI command implementations

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::auth::hash_password;
use crate::cli::{
    info, print_user_detail, print_user_table, prompt_password, success, warn, OutputFormat,
    UserAction,
};
use crate::config::{self, loader::CONFIG_FILENAME, Config};
use crate::models::{NewUser, PasswordChange, UserChanges, UserResponse, Validate};
use crate::store::{Page, PgStore, Store};

/// Initialize a new staffdesk.toml configuration file
pub async fn init(force: bool) -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() && !force {
        warn(&format!(
            "{} already exists (use --force to overwrite)",
            CONFIG_FILENAME
        ));
        return Ok(());
    }

    let secret = config::loader::generate_secret_key();
    let content = config::loader::default_config_content(&secret);
    fs::write(config_path, content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILENAME))?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Change the seeded admin password, then run 'staffdesk serve'");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    info(&format!(
        "Starting server at http://{}{}",
        config.bind_address(),
        config.root_path()
    ));

    crate::api::run_server(config).await?;
    Ok(())
}

/// User account management commands
pub async fn user(config_path: Option<&Path>, action: UserAction) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_database(&config).await?;

    match action {
        UserAction::Add {
            username,
            first_name,
            last_name,
            phone,
            email,
            roles,
        } => {
            let password = prompt_password("Password")?;
            let new_user = NewUser {
                username,
                first_name,
                last_name,
                phone,
                email,
                role: roles,
                disabled: false,
                login_denied: false,
                password,
            };
            new_user.validate()?;

            let hashed = hash_password(&new_user.password, config.auth.bcrypt_cost)?;
            let user = store.create_user(&new_user, &hashed).await?;
            success(&format!("Created user '{}'", user.username));
            print_user_detail(&user.into());
        }
        UserAction::Passwd { username } => {
            let Some(user) = store.get_user_by_username(&username).await? else {
                bail!("User '{}' not found", username);
            };

            let password = prompt_password("New password")?;
            let changes = UserChanges {
                hashed_password: Some(hash_new_password(password, config.auth.bcrypt_cost)?),
                ..Default::default()
            };
            store.update_user(user.id, changes).await?;
            success(&format!("Password updated for '{}'", username));
        }
        UserAction::List { format } => {
            let users: Vec<UserResponse> = store
                .list_users(Page::new(0, u32::MAX))
                .await?
                .into_iter()
                .map(UserResponse::from)
                .collect();

            match format {
                OutputFormat::Table => print_user_table(&users),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&users)?),
                OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&users)?),
            }
        }
    }

    Ok(())
}

/// Print a bcrypt hash for a password
pub async fn hash_password_command(
    config_path: Option<&Path>,
    password: Option<String>,
) -> Result<()> {
    // Fall back to the default cost when no config file is around
    let cost = load_config(config_path)
        .map(|config| config.auth.bcrypt_cost)
        .unwrap_or(bcrypt::DEFAULT_COST);

    let password = match password {
        Some(password) => password,
        None => prompt_password("Password")?,
    };
    println!("{}", hash_new_password(password, cost)?);
    Ok(())
}

// Helper functions

/// Hash a password after the checks the API applies to password changes
fn hash_new_password(password: String, cost: u32) -> Result<String> {
    let change = PasswordChange { password };
    change.validate()?;
    Ok(hash_password(&change.password, cost)?)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    config::load_config(path).map_err(|e| anyhow::anyhow!("{}", e))
}

async fn open_database(config: &Config) -> Result<PgStore> {
    let Some(url) = config.database.connection_url() else {
        bail!("User commands need a database; set database.url in {}", CONFIG_FILENAME);
    };
    PgStore::connect(url)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
}
