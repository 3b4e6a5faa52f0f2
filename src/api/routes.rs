//! Authentication and service route handlers

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::extract::Form;
use super::server::SharedState;
use crate::auth::{authenticate_user, ActiveUser, CurrentUser, TokenRequest, TokenResponse};
use crate::error::{Error, Result};
use crate::models::UserResponse;

/// Scope `/token/scope_example` asks for
pub const EXAMPLE_SCOPE: &str = "scope_example";

// Health check

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!("No route for {}", uri);
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}

// Authentication

/// OAuth2 password flow: exchange username and password for a bearer token
pub async fn login_for_access_token(
    State(state): State<SharedState>,
    Form(form): Form<TokenRequest>,
) -> Result<Json<TokenResponse>> {
    let scopes = form.scopes();
    let account = state.store.get_user_by_username(&form.username).await?;

    let Some(user) = authenticate_user(account, form.password).await else {
        tracing::warn!("Failed login attempt for '{}'", form.username);
        return Err(Error::IncorrectCredentials);
    };

    let token = state.tokens.issue(&user.username, scopes)?;
    tracing::info!("Issued access token for '{}'", user.username);

    Ok(Json(TokenResponse::bearer(token)))
}

pub async fn read_about_me(current: CurrentUser) -> Json<UserResponse> {
    Json(current.user.into())
}

pub async fn read_my_status(_active: ActiveUser) -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Only reachable with a token issued for [`EXAMPLE_SCOPE`].
/// The scope is checked before the account state.
pub async fn read_scope_example(current: CurrentUser) -> Result<impl IntoResponse> {
    current.require_scopes(&[EXAMPLE_SCOPE])?;
    ActiveUser::try_from(current)?;
    Ok(Json(json!({
        "status": format!("Access allowed for token scope '{}'", EXAMPLE_SCOPE)
    })))
}
