//! Configuration management for Staffdesk

pub mod loader;
mod schema;

pub use loader::{load_config, parse_config};
pub use schema::*;
