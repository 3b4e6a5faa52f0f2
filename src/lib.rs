//! Staffdesk - employee ticket service with JWT authentication
//!
//! This is the library interface for Staffdesk: the HTTP router, the
//! authentication and authorization layer, and the storage backends.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use api::{create_router, AppState, SharedState};
pub use config::Config;
pub use error::Error;
