//! HTTP API server

use axum::{
    http::{HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{password::hash_password_blocking, Rbac, TokenIssuer};
use crate::config::{Config, CorsConfig, DEFAULT_SECRET_KEY};
use crate::error::{Error, Result};
use crate::store::{self, Page, SharedStore};

use super::{assets, employees, routes, tickets, users};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub store: SharedStore,
    pub tokens: TokenIssuer,
    pub rbac: Rbac,
}

pub type SharedState = Arc<AppState>;

/// `?skip=&limit=` query of list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl AppState {
    pub fn new(config: Config, store: SharedStore) -> Result<Self> {
        let tokens = TokenIssuer::new(&config.auth)?;
        let rbac = Rbac::with_overrides(&config.permissions);

        if config.auth.secret_key == DEFAULT_SECRET_KEY {
            tracing::warn!("Using the built-in JWT secret; set auth.secret_key for production");
        }

        Ok(Self {
            config,
            store,
            tokens,
            rbac,
        })
    }

    /// Resolve a page query against the configured default limit
    pub fn page(&self, query: &PageQuery) -> Page {
        Page::new(
            query.skip.unwrap_or(0),
            query
                .limit
                .unwrap_or(self.config.server.body_response_items_limit),
        )
    }
}

/// Create the configured seed accounts that do not exist yet
pub async fn seed_users(state: &AppState) -> Result<usize> {
    let mut created = 0;
    for seed in &state.config.seed.users {
        if state.store.get_user_by_username(&seed.username).await?.is_some() {
            tracing::debug!("Seed user '{}' already exists", seed.username);
            continue;
        }

        let hashed =
            hash_password_blocking(seed.password.clone(), state.config.auth.bcrypt_cost).await?;
        state.store.create_user(seed, &hashed).await?;
        tracing::info!("Created seed user '{}'", seed.username);
        created += 1;
    }
    Ok(created)
}

/// Build state for a configuration: open the store and seed accounts
pub async fn build_state(config: Config) -> Result<SharedState> {
    let store = store::connect(&config.database).await?;
    let state = AppState::new(config, store)?;
    seed_users(&state).await?;
    Ok(Arc::new(state))
}

/// Run the HTTP API server
pub async fn run_server(config: Config) -> Result<()> {
    let addr = config.bind_address();
    let state = build_state(config).await?;
    let app = create_router(state)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Create the router with all routes, mounted under the configured root path
pub fn create_router(state: SharedState) -> Result<Router> {
    let cors = build_cors(&state.config.cors)?;
    let root_path = state.config.root_path();

    let api = Router::new()
        .route("/favicon.ico", get(assets::favicon))
        .route("/health", get(routes::health))
        // Authentication
        .route("/token", post(routes::login_for_access_token))
        .route("/token/scope_example", get(routes::read_scope_example))
        .route("/me", get(routes::read_about_me))
        .route("/status", get(routes::read_my_status))
        .merge(users::router())
        .merge(employees::router())
        .merge(tickets::router())
        .fallback(routes::not_found);

    let app = if root_path.is_empty() {
        api
    } else {
        Router::new().nest(&root_path, api)
    };

    Ok(app
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Translate the CORS section into a layer. "*" entries allow anything;
/// with credentials enabled the request values are mirrored instead.
pub fn build_cors(config: &CorsConfig) -> Result<CorsLayer> {
    let wildcard = |values: &[String]| values.iter().any(|v| v == "*");
    let credentials = config.allow_credentials;

    let origins = if wildcard(&config.allow_origins) {
        if credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::any()
        }
    } else {
        let values = config
            .allow_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| Error::Config(format!("Invalid CORS origin: {}", origin)))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(values)
    };

    let methods = if wildcard(&config.allow_methods) {
        if credentials {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::any()
        }
    } else {
        let values = config
            .allow_methods
            .iter()
            .map(|method| {
                Method::from_bytes(method.to_uppercase().as_bytes())
                    .map_err(|_| Error::Config(format!("Invalid CORS method: {}", method)))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowMethods::list(values)
    };

    let headers = if wildcard(&config.allow_headers) {
        if credentials {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::any()
        }
    } else {
        let values = config
            .allow_headers
            .iter()
            .map(|name| {
                HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| Error::Config(format!("Invalid CORS header: {}", name)))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowHeaders::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(credentials))
}
