//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "staffdesk.toml";

/// Load configuration from an explicit path, or search for staffdesk.toml
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config_from_path(path),
        None => load_config_from_path(&find_config_file()?),
    }
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    parse_config(&content)
}

/// Parse configuration text after interpolating environment variables
pub fn parse_config(content: &str) -> Result<Config> {
    let content = interpolate_env_vars(content);
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("env interpolation pattern is valid");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Secret built from two v4 UUIDs: 64 hex characters carrying 244 random bits
pub fn generate_secret_key() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Generate a default configuration file content with the given signing secret
pub fn default_config_content(secret_key: &str) -> String {
    format!(
        r#"# Staffdesk Configuration

[server]
host = "0.0.0.0"
port = 8000
root_path = ""
body_response_items_limit = 100

[auth]
# Override with STAFFDESK_SECRET_KEY in production
secret_key = "${{STAFFDESK_SECRET_KEY:-{secret_key}}}"
algorithm = "HS256"
access_token_expire_minutes = 30
bcrypt_cost = 12

[cors]
allow_origins = ["*"]
allow_credentials = false
allow_methods = ["*"]
allow_headers = ["*"]

[database]
# Leave empty to keep data in memory
url = "${{DATABASE_URL:-}}"

# Role lists allowed per endpoint. Unlisted endpoints use the built-in defaults.
[permissions]
POST_user = ["admin"]
DELETE_user_user_id = ["admin"]
PATCH_user_password = ["admin", "manager", "user"]

# Accounts created at start-up if they do not exist yet
[[seed.users]]
username = "admin"
password = "${{STAFFDESK_ADMIN_PASSWORD:-admin}}"
first_name = "Admin"
last_name = "Admin"
phone = "+10000000000"
email = "admin@example.com"
role = ["admin"]
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_env_interpolation() {
        env::set_var("STAFFDESK_TEST_VAR", "hello");
        let content = "value = \"${STAFFDESK_TEST_VAR}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"hello\"");
        env::remove_var("STAFFDESK_TEST_VAR");
    }

    #[test]
    fn test_env_interpolation_with_default() {
        let content = "value = \"${NONEXISTENT_VAR:-default_value}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"default_value\"");
    }

    #[test]
    fn test_default_content_parses() {
        let secret = generate_secret_key();
        let config = parse_config(&default_config_content(&secret)).unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.seed.users.len(), 1);
        assert_eq!(config.seed.users[0].role, vec!["admin"]);
        assert_eq!(
            config.permissions.get("POST_user"),
            Some(&vec!["admin".to_string()])
        );
    }

    #[test]
    fn test_generated_secret_is_hex() {
        let secret = generate_secret_key();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(secret, generate_secret_key());

        for half in [&secret[..32], &secret[32..]] {
            let id = uuid::Uuid::parse_str(half).unwrap();
            assert_eq!(id.get_version_num(), 4);
        }
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9100\n[auth]\nbcrypt_cost = 4").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.auth.bcrypt_cost, 4);
        assert_eq!(config.auth.algorithm, "HS256");
    }

    #[test]
    fn test_missing_file_is_config_not_found() {
        let result = load_config(Some(Path::new("/nonexistent/staffdesk.toml")));
        assert!(matches!(result, Err(Error::ConfigNotFound)));
    }
}
