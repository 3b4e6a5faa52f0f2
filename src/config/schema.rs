//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::NewUser;

/// Secret shipped in the defaults; the server warns when it is still in use
pub const DEFAULT_SECRET_KEY: &str = "staffdesk-secret-key-change-in-production";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// ACL overrides keyed by endpoint, e.g. `POST_user = ["admin"]`
    #[serde(default)]
    pub permissions: HashMap<String, Vec<String>>,

    #[serde(default)]
    pub seed: SeedConfig,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix every route is mounted under, e.g. "/api/v1"
    #[serde(default)]
    pub root_path: String,

    /// Default page size for list endpoints
    #[serde(default = "default_items_limit")]
    pub body_response_items_limit: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_items_limit() -> u32 {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            root_path: String::new(),
            body_response_items_limit: default_items_limit(),
        }
    }
}

/// Token signing and password hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    /// HMAC algorithm name: HS256, HS384 or HS512
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    #[serde(default = "default_expire_minutes")]
    pub access_token_expire_minutes: i64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_secret_key() -> String {
    DEFAULT_SECRET_KEY.to_string()
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_expire_minutes() -> i64 {
    30
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            algorithm: default_algorithm(),
            access_token_expire_minutes: default_expire_minutes(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// Cross-origin resource sharing policy; "*" means any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "wildcard")]
    pub allow_origins: Vec<String>,

    #[serde(default)]
    pub allow_credentials: bool,

    #[serde(default = "wildcard")]
    pub allow_methods: Vec<String>,

    #[serde(default = "wildcard")]
    pub allow_headers: Vec<String>,
}

fn wildcard() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: wildcard(),
            allow_credentials: false,
            allow_methods: wildcard(),
            allow_headers: wildcard(),
        }
    }
}

/// Database connection. Without a url the server keeps data in memory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
}

impl DatabaseConfig {
    /// Connection string, if a real database is configured
    pub fn connection_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != "memory")
    }
}

/// Accounts created at start-up when missing
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeedConfig {
    #[serde(default)]
    pub users: Vec<NewUser>,
}

impl Config {
    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Root path normalised to "" or "/segment[/segment...]"
    pub fn root_path(&self) -> String {
        let trimmed = self.server.root_path.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}
