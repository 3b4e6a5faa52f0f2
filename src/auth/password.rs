//! Password hashing

use crate::error::{Error, Result};
use crate::models::User;

/// Hash a password with bcrypt
pub fn hash_password(plain: &str, cost: u32) -> Result<String> {
    Ok(bcrypt::hash(plain, cost)?)
}

/// Check a password against a stored hash. Malformed hashes never match.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    match bcrypt::verify(plain, hashed) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!("Stored password hash could not be checked: {}", e);
            false
        }
    }
}

/// Hash on the blocking pool so request workers are not stalled
pub async fn hash_password_blocking(plain: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain, cost))
        .await
        .map_err(|e| Error::Other(format!("Password hashing task failed: {}", e)))?
}

/// Resolve a login attempt.
///
/// Fails when the account is missing, when its login is denied or when the
/// password does not match.
pub async fn authenticate_user(user: Option<User>, password: String) -> Option<User> {
    let user = user?;

    if user.login_denied {
        tracing::debug!("Login denied for user '{}'", user.username);
        return None;
    }

    tokio::task::spawn_blocking(move || {
        verify_password(&password, &user.hashed_password).then_some(user)
    })
    .await
    .ok()
    .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    fn user_with_password(password: &str) -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            email: String::new(),
            role: vec!["user".to_string()],
            disabled: false,
            login_denied: false,
            hashed_password: hash_password(password, TEST_COST).unwrap(),
            created: String::new(),
            updated: None,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("s3cret", TEST_COST).unwrap();
        assert_ne!(hashed, "s3cret");
        assert!(verify_password("s3cret", &hashed));
        assert!(!verify_password("wrong", &hashed));
    }

    #[test]
    fn test_malformed_hash_does_not_match() {
        assert!(!verify_password("s3cret", "not-a-bcrypt-hash"));
    }

    #[tokio::test]
    async fn test_authenticate_valid_password() {
        let user = user_with_password("pw");
        let result = authenticate_user(Some(user), "pw".to_string()).await;
        assert_eq!(result.map(|u| u.username), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn test_authenticate_rejections() {
        assert!(authenticate_user(None, "pw".to_string()).await.is_none());

        let user = user_with_password("pw");
        assert!(authenticate_user(Some(user.clone()), "bad".to_string())
            .await
            .is_none());

        let mut denied = user;
        denied.login_denied = true;
        assert!(authenticate_user(Some(denied), "pw".to_string())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_hash_on_blocking_pool() {
        let hashed = hash_password_blocking("pw".to_string(), TEST_COST)
            .await
            .unwrap();
        assert!(verify_password("pw", &hashed));
    }
}
