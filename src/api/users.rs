//! User route handlers

use axum::{
    extract::State,
    routing::{get, patch},
    Router,
};

use super::extract::{Json, Path, Query};
use super::server::{PageQuery, SharedState};
use crate::auth::{endpoint, password::hash_password_blocking, Authorized};
use crate::error::{Error, Result};
use crate::models::{
    ContactsChange, DisabledChange, LoginDeniedChange, Message, NewUser, PasswordChange,
    RoleChange, User, UserChanges, UserResponse, UsernameChange, Validate,
};

pub fn router() -> Router<SharedState> {
    let collection = get(list_users).post(create_user);

    Router::new()
        .route("/user", collection.clone())
        .route("/user/", collection)
        .route("/user/password", patch(change_my_password))
        .route("/user/username/{username}", get(read_user_by_username))
        .route("/user/phone/{phone}", get(read_user_by_phone))
        .route("/user/email/{email}", get(read_user_by_email))
        .route(
            "/user/{user_id}",
            get(read_user).put(update_user).delete(delete_user),
        )
        .route("/user/{user_id}/contacts", patch(update_contacts))
        .route("/user/{user_id}/password", patch(update_password))
        .route("/user/{user_id}/username", patch(update_username))
        .route("/user/{user_id}/role", patch(update_role))
        .route("/user/{user_id}/disabled", patch(update_disabled))
        .route("/user/{user_id}/login_denied", patch(update_login_denied))
}

fn found(user: Option<User>) -> Result<Json<UserResponse>> {
    user.map(|u| Json(u.into())).ok_or(Error::UserNotFound)
}

async fn apply_changes(
    state: &SharedState,
    user_id: i64,
    changes: UserChanges,
) -> Result<Json<UserResponse>> {
    changes.validate()?;
    let user = state.store.update_user(user_id, changes).await?;
    tracing::info!("Updated user {} ({})", user.id, user.username);
    Ok(Json(user.into()))
}

async fn set_password(
    state: &SharedState,
    user_id: i64,
    payload: PasswordChange,
) -> Result<Json<Message>> {
    payload.validate()?;
    let hashed = hash_password_blocking(payload.password, state.config.auth.bcrypt_cost).await?;
    let changes = UserChanges {
        hashed_password: Some(hashed),
        ..Default::default()
    };
    state.store.update_user(user_id, changes).await?;
    tracing::info!("Password changed for user {}", user_id);
    Ok(Json(Message::new("Password updated successfully")))
}

pub async fn create_user(
    State(state): State<SharedState>,
    auth: Authorized<endpoint::CreateUser>,
    Json(payload): Json<NewUser>,
) -> Result<Json<UserResponse>> {
    payload.validate()?;
    let hashed =
        hash_password_blocking(payload.password.clone(), state.config.auth.bcrypt_cost).await?;
    let user = state.store.create_user(&payload, &hashed).await?;

    tracing::info!(
        "User '{}' created by '{}'",
        user.username,
        auth.user().username
    );
    Ok(Json(user.into()))
}

pub async fn list_users(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ListUsers>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<UserResponse>>> {
    let users = state.store.list_users(state.page(&query)).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn read_user(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ReadUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>> {
    found(state.store.get_user(user_id).await?)
}

pub async fn read_user_by_username(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ReadUserByUsername>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>> {
    found(state.store.get_user_by_username(&username).await?)
}

pub async fn read_user_by_phone(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ReadUserByPhone>,
    Path(phone): Path<String>,
) -> Result<Json<UserResponse>> {
    found(state.store.get_user_by_phone(&phone).await?)
}

pub async fn read_user_by_email(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ReadUserByEmail>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>> {
    found(state.store.get_user_by_email(&email).await?)
}

pub async fn update_user(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ReplaceUser>,
    Path(user_id): Path<i64>,
    Json(changes): Json<UserChanges>,
) -> Result<Json<UserResponse>> {
    apply_changes(&state, user_id, changes).await
}

pub async fn delete_user(
    State(state): State<SharedState>,
    auth: Authorized<endpoint::DeleteUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<Message>> {
    state.store.delete_user(user_id).await?;
    tracing::info!("User {} deleted by '{}'", user_id, auth.user().username);
    Ok(Json(Message::new("User deleted successfully")))
}

/// Caller changes their own password
pub async fn change_my_password(
    State(state): State<SharedState>,
    auth: Authorized<endpoint::ChangeOwnPassword>,
    Json(payload): Json<PasswordChange>,
) -> Result<Json<Message>> {
    set_password(&state, auth.user().id, payload).await
}

pub async fn update_contacts(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ChangeUserContacts>,
    Path(user_id): Path<i64>,
    Json(payload): Json<ContactsChange>,
) -> Result<Json<UserResponse>> {
    apply_changes(&state, user_id, payload.into()).await
}

pub async fn update_password(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ChangeUserPassword>,
    Path(user_id): Path<i64>,
    Json(payload): Json<PasswordChange>,
) -> Result<Json<Message>> {
    set_password(&state, user_id, payload).await
}

pub async fn update_username(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ChangeUserUsername>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UsernameChange>,
) -> Result<Json<UserResponse>> {
    apply_changes(&state, user_id, payload.into()).await
}

pub async fn update_role(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ChangeUserRole>,
    Path(user_id): Path<i64>,
    Json(payload): Json<RoleChange>,
) -> Result<Json<UserResponse>> {
    apply_changes(&state, user_id, payload.into()).await
}

pub async fn update_disabled(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ChangeUserDisabled>,
    Path(user_id): Path<i64>,
    Json(payload): Json<DisabledChange>,
) -> Result<Json<UserResponse>> {
    apply_changes(&state, user_id, payload.into()).await
}

pub async fn update_login_denied(
    State(state): State<SharedState>,
    _auth: Authorized<endpoint::ChangeUserLoginDenied>,
    Path(user_id): Path<i64>,
    Json(payload): Json<LoginDeniedChange>,
) -> Result<Json<UserResponse>> {
    apply_changes(&state, user_id, payload.into()).await
}
