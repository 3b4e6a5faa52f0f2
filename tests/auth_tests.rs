//! Authentication and authorization tests against the full router

mod common;

use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::HeaderValue;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use common::*;
use staffdesk::auth::{Claims, TokenResponse};

#[tokio::test]
async fn test_login_issues_bearer_token() {
    let server = server().await;

    let response = login_with_scope(&server, "admin", "").await;
    assert_eq!(response.status_code(), 200);

    let body: TokenResponse = response.json();
    assert_eq!(body.token_type, "bearer");
    assert_eq!(body.access_token.split('.').count(), 3);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let server = server().await;

    let response = server
        .post("/token")
        .form(&[("username", "admin"), ("password", "wrong")])
        .await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "Incorrect username or password" })
    );
    assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
}

#[tokio::test]
async fn test_login_unknown_user() {
    let server = server().await;

    let response = login_with_scope(&server, "ghost", "").await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_me_returns_current_user_without_hash() {
    let server = server().await;
    let token = token(&server, "manager").await;

    let response = get(&server, "/me", &token).await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["username"], "manager");
    assert_eq!(body["role"], json!(["manager"]));
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn test_me_without_token() {
    let server = server().await;

    let response = server.get("/me").await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "Not authenticated" })
    );
    assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
}

#[tokio::test]
async fn test_me_with_wrong_scheme() {
    let server = server().await;
    let token = token(&server, "admin").await;

    let response = server
        .get("/me")
        .add_header(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {}", token)).unwrap(),
        )
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let server = server().await;

    let response = get(&server, "/me", "not.a.jwt").await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "Could not validate credentials" })
    );
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let server = server().await;

    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: "admin".to_string(),
        scopes: Vec::new(),
        iat: now - 3600,
        exp: now - 60,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"integration-test-secret"),
    )
    .unwrap();

    let response = get(&server, "/me", &token).await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "Token has expired" })
    );
}

#[tokio::test]
async fn test_token_for_deleted_user_rejected() {
    let server = server().await;
    let admin = token(&server, "admin").await;
    let clerk = token(&server, "clerk").await;

    let me: Value = get(&server, "/me", &clerk).await.json();
    let path = format!("/user/{}", me["id"]);
    assert_eq!(delete(&server, &path, &admin).await.status_code(), 200);

    let response = get(&server, "/me", &clerk).await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "Could not validate credentials" })
    );
}

#[tokio::test]
async fn test_status_for_active_user() {
    let server = server().await;
    let token = token(&server, "clerk").await;

    let response = get(&server, "/status", &token).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_disabled_user_is_not_active() {
    let server = server().await;
    let admin = token(&server, "admin").await;
    let clerk = token(&server, "clerk").await;

    let me: Value = get(&server, "/me", &clerk).await.json();
    let response = patch_json(
        &server,
        &format!("/user/{}/disabled", me["id"]),
        &admin,
        json!({ "disabled": true }),
    )
    .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["disabled"], true);

    // Identity still resolves, activity checks do not pass
    assert_eq!(get(&server, "/me", &clerk).await.status_code(), 200);

    let response = get(&server, "/status", &clerk).await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>(), json!({ "detail": "User disabled" }));

    let response = get(&server, "/ticket/", &clerk).await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_login_denied_blocks_new_tokens() {
    let server = server().await;
    let admin = token(&server, "admin").await;
    let clerk = token(&server, "clerk").await;

    let me: Value = get(&server, "/me", &clerk).await.json();
    let response = patch_json(
        &server,
        &format!("/user/{}/login_denied", me["id"]),
        &admin,
        json!({ "login_denied": true }),
    )
    .await;
    assert_eq!(response.status_code(), 200);

    let response = login_with_scope(&server, "clerk", "").await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "Incorrect username or password" })
    );

    // Tokens issued before the flag was set keep working
    assert_eq!(get(&server, "/status", &clerk).await.status_code(), 200);
}

#[tokio::test]
async fn test_scope_example_requires_scope() {
    let server = server().await;

    let plain = token(&server, "clerk").await;
    let response = get(&server, "/token/scope_example", &plain).await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "Not enough permissions" })
    );
    assert_eq!(
        response.headers().get(WWW_AUTHENTICATE).unwrap(),
        "Bearer scope=\"scope_example\""
    );

    let response = login_with_scope(&server, "clerk", "other scope_example").await;
    let scoped: TokenResponse = response.json();
    let response = get(&server, "/token/scope_example", &scoped.access_token).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.json::<Value>()["status"],
        "Access allowed for token scope 'scope_example'"
    );
}

#[tokio::test]
async fn test_role_without_acl_entry_is_denied() {
    let server = server().await;
    let clerk = token(&server, "clerk").await;

    let response = get(&server, "/user/", &clerk).await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "Not enough permissions" })
    );
    assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
}

#[tokio::test]
async fn test_user_without_roles_is_denied_everywhere() {
    let server = server().await;
    let nobody = token(&server, "nobody").await;

    assert_eq!(get(&server, "/me", &nobody).await.status_code(), 200);
    assert_eq!(get(&server, "/ticket/", &nobody).await.status_code(), 401);
    assert_eq!(get(&server, "/employee/", &nobody).await.status_code(), 401);
}

#[tokio::test]
async fn test_manager_reads_but_cannot_create_users() {
    let server = server().await;
    let manager = token(&server, "manager").await;

    assert_eq!(get(&server, "/user/", &manager).await.status_code(), 200);

    let response = post_json(
        &server,
        "/user/",
        &manager,
        json!({
            "username": "intruder",
            "first_name": "I",
            "last_name": "N",
            "phone": "+999",
            "email": "intruder@example.com",
            "password": "pw",
        }),
    )
    .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_permission_overrides_from_config() {
    let mut config = test_config();
    config
        .permissions
        .insert("GET_user".to_string(), vec!["user".to_string()]);
    config
        .permissions
        .insert("GET_ticket".to_string(), vec!["admin".to_string()]);
    let server = server_with(config).await;
    let clerk = token(&server, "clerk").await;

    assert_eq!(get(&server, "/user/", &clerk).await.status_code(), 200);
    assert_eq!(get(&server, "/ticket/", &clerk).await.status_code(), 401);
}

/// Sign arbitrary claims with the test secret
fn forge(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"integration-test-secret"),
    )
    .unwrap()
}

#[tokio::test]
async fn test_token_missing_claims_rejected() {
    let server = server().await;
    let now = chrono::Utc::now().timestamp();

    let no_subject = forge(json!({ "scopes": [], "iat": now, "exp": now + 600 }));
    let no_expiry = forge(json!({ "sub": "admin", "scopes": [], "iat": now }));

    for token in [no_subject, no_expiry] {
        let response = get(&server, "/me", &token).await;
        assert_eq!(response.status_code(), 401);
        assert_eq!(
            response.json::<Value>(),
            json!({ "detail": "Could not validate credentials" })
        );
        assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
    }
}

#[tokio::test]
async fn test_scope_checked_before_disabled_flag() {
    let server = server().await;
    let admin = token(&server, "admin").await;
    let plain = token(&server, "clerk").await;
    let scoped: TokenResponse = login_with_scope(&server, "clerk", "scope_example")
        .await
        .json();

    let me: Value = get(&server, "/me", &plain).await.json();
    let response = patch_json(
        &server,
        &format!("/user/{}/disabled", me["id"]),
        &admin,
        json!({ "disabled": true }),
    )
    .await;
    assert_eq!(response.status_code(), 200);

    let response = get(&server, "/token/scope_example", &plain).await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "Not enough permissions" })
    );

    let response = get(&server, "/token/scope_example", &scoped.access_token).await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>(), json!({ "detail": "User disabled" }));
}
