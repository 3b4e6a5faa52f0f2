//! Embedded static files

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "static/"]
struct Assets;

pub async fn favicon() -> Response {
    match Assets::get("favicon.ico") {
        Some(file) => ([(header::CONTENT_TYPE, "image/x-icon")], file.data).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
