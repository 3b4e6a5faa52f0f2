//! Shared helpers for the integration tests
#![allow(dead_code)]

use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};
use std::sync::Arc;

use staffdesk::api::{create_router, seed_users, AppState};
use staffdesk::config::Config;
use staffdesk::models::NewUser;
use staffdesk::store::MemoryStore;

pub const PASSWORD: &str = "s3cret-pass";

pub fn seed(username: &str, roles: &[&str]) -> NewUser {
    NewUser {
        username: username.to_string(),
        first_name: username.to_string(),
        last_name: "Tester".to_string(),
        phone: format!("+1{}", username.bytes().map(u32::from).sum::<u32>()),
        email: format!("{}@example.com", username),
        role: roles.iter().map(|r| r.to_string()).collect(),
        disabled: false,
        login_denied: false,
        password: PASSWORD.to_string(),
    }
}

/// Config with a cheap bcrypt cost and one account per role
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.secret_key = "integration-test-secret".to_string();
    config.auth.bcrypt_cost = 4;
    config.seed.users = vec![
        seed("admin", &["admin"]),
        seed("manager", &["manager"]),
        seed("clerk", &["user"]),
        seed("nobody", &[]),
    ];
    config
}

pub async fn server_with(config: Config) -> TestServer {
    let state = AppState::new(config, Arc::new(MemoryStore::new())).unwrap();
    seed_users(&state).await.unwrap();
    let router = create_router(Arc::new(state)).unwrap();
    TestServer::new(router).unwrap()
}

pub async fn server() -> TestServer {
    server_with(test_config()).await
}

pub async fn login_with_scope(server: &TestServer, username: &str, scope: &str) -> TestResponse {
    server
        .post("/token")
        .form(&[
            ("username", username),
            ("password", PASSWORD),
            ("scope", scope),
        ])
        .await
}

/// Log in and return the access token
pub async fn token(server: &TestServer, username: &str) -> String {
    let response = login_with_scope(server, username, "").await;
    assert_eq!(response.status_code(), 200, "login failed: {}", response.text());
    response.json::<Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

pub async fn get(server: &TestServer, path: &str, token: &str) -> TestResponse {
    server
        .get(path)
        .add_header(AUTHORIZATION, bearer(token))
        .await
}

pub async fn delete(server: &TestServer, path: &str, token: &str) -> TestResponse {
    server
        .delete(path)
        .add_header(AUTHORIZATION, bearer(token))
        .await
}

pub async fn post_json(server: &TestServer, path: &str, token: &str, body: Value) -> TestResponse {
    server
        .post(path)
        .add_header(AUTHORIZATION, bearer(token))
        .json(&body)
        .await
}

pub async fn put_json(server: &TestServer, path: &str, token: &str, body: Value) -> TestResponse {
    server
        .put(path)
        .add_header(AUTHORIZATION, bearer(token))
        .json(&body)
        .await
}

pub async fn patch_json(server: &TestServer, path: &str, token: &str, body: Value) -> TestResponse {
    server
        .patch(path)
        .add_header(AUTHORIZATION, bearer(token))
        .json(&body)
        .await
}

pub fn employee_body(nick_name: &str) -> Value {
    json!({
        "first_name": "Ivan",
        "last_name": "Petrenko",
        "nick_name": nick_name,
        "phone": format!("+380{}", nick_name.bytes().map(u32::from).sum::<u32>()),
        "email": format!("{}@example.com", nick_name),
        "birthday": "1990-01-01",
        "country": "UA",
        "city": "Kyiv",
        "address": "Main st. 1",
    })
}

pub fn ticket_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Laptop does not boot",
        "status": "open",
    })
}
