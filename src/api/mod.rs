//! HTTP API server

mod assets;
pub mod employees;
mod extract;
pub mod routes;
pub mod server;
pub mod tickets;
pub mod users;

pub use server::*;
