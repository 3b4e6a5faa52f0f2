//! JWT token handling

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Scopes requested at login
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: &str, scopes: Vec<String>, lifetime: chrono::Duration) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: subject.to_string(),
            scopes,
            iat: now,
            exp: now + lifetime.num_seconds(),
        }
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// Longest accepted token lifetime, ten years
pub const MAX_TOKEN_LIFETIME_MINUTES: i64 = 10 * 365 * 24 * 60;

/// Signs and verifies access tokens with a shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: chrono::Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let algorithm: Algorithm = config
            .algorithm
            .parse()
            .map_err(|_| Error::Config(format!("Unknown JWT algorithm: {}", config.algorithm)))?;

        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(Error::Config(format!(
                "Only HMAC algorithms are supported with a shared secret, got {}",
                config.algorithm
            )));
        }
        if config.secret_key.is_empty() {
            return Err(Error::Config("auth.secret_key must not be empty".to_string()));
        }
        if !(1..=MAX_TOKEN_LIFETIME_MINUTES).contains(&config.access_token_expire_minutes) {
            return Err(Error::Config(format!(
                "auth.access_token_expire_minutes must be between 1 and {}",
                MAX_TOKEN_LIFETIME_MINUTES
            )));
        }
        let lifetime = chrono::Duration::try_minutes(config.access_token_expire_minutes)
            .ok_or_else(|| {
                Error::Config("auth.access_token_expire_minutes is out of range".to_string())
            })?;

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            lifetime,
        })
    }

    /// Create a JWT token
    pub fn issue(&self, subject: &str, scopes: Vec<String>) -> Result<String> {
        self.encode(&Claims::new(subject, scopes, self.lifetime))
    }

    pub(crate) fn encode(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| Error::TokenEncoding(e.to_string()))
    }

    /// Validate and decode a JWT token
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => Error::TokenExpired,
                _ => {
                    tracing::debug!("Rejected token: {}", e);
                    Error::InvalidCredentials
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthConfig::default()).unwrap()
    }

    #[test]
    fn test_create_and_validate_token() {
        let tokens = issuer();
        let token = tokens.issue("testuser", vec![]).expect("Failed to create token");
        let claims = tokens.verify(&token).expect("Failed to validate token");

        assert_eq!(claims.sub, "testuser");
        assert!(claims.scopes.is_empty());
        assert!(claims.exp > chrono::Utc::now().timestamp());
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_scopes_round_trip() {
        let tokens = issuer();
        let token = tokens
            .issue("alice", vec!["scope_example".to_string()])
            .unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert!(claims.has_scope("scope_example"));
        assert!(!claims.has_scope("admin"));
    }

    #[test]
    fn test_invalid_token() {
        let result = issuer().verify("invalid.token.here");
        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }

    #[test]
    fn test_expired_token() {
        let tokens = issuer();
        let now = chrono::Utc::now().timestamp();
        let token = tokens
            .encode(&Claims {
                sub: "old".to_string(),
                scopes: vec![],
                iat: now - 3600,
                exp: now - 10,
            })
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(Error::TokenExpired)));
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = issuer().issue("alice", vec![]).unwrap();
        let other = TokenIssuer::new(&AuthConfig {
            secret_key: "another-secret".to_string(),
            ..AuthConfig::default()
        })
        .unwrap();

        assert!(matches!(other.verify(&token), Err(Error::InvalidCredentials)));
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let token = issuer().issue("alice", vec![]).unwrap();
        let hs512 = TokenIssuer::new(&AuthConfig {
            algorithm: "HS512".to_string(),
            ..AuthConfig::default()
        })
        .unwrap();

        assert!(hs512.verify(&token).is_err());
    }

    fn raw_token(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(AuthConfig::default().secret_key.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_token_without_subject_is_invalid() {
        let exp = chrono::Utc::now().timestamp() + 600;
        let token = raw_token(serde_json::json!({ "scopes": [], "iat": 0, "exp": exp }));
        assert!(matches!(issuer().verify(&token), Err(Error::InvalidCredentials)));
    }

    #[test]
    fn test_token_without_expiry_is_invalid() {
        let token = raw_token(serde_json::json!({ "sub": "alice", "iat": 0 }));
        assert!(matches!(issuer().verify(&token), Err(Error::InvalidCredentials)));
    }

    #[test]
    fn test_lifetime_bounds() {
        for minutes in [0, -5, MAX_TOKEN_LIFETIME_MINUTES + 1, i64::MAX] {
            let result = TokenIssuer::new(&AuthConfig {
                access_token_expire_minutes: minutes,
                ..AuthConfig::default()
            });
            assert!(matches!(result, Err(Error::Config(_))), "minutes = {}", minutes);
        }

        let longest = TokenIssuer::new(&AuthConfig {
            access_token_expire_minutes: MAX_TOKEN_LIFETIME_MINUTES,
            ..AuthConfig::default()
        })
        .unwrap();
        let claims = longest.verify(&longest.issue("alice", vec![]).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_LIFETIME_MINUTES * 60);
    }

    #[test]
    fn test_rejects_asymmetric_algorithm() {
        let result = TokenIssuer::new(&AuthConfig {
            algorithm: "RS256".to_string(),
            ..AuthConfig::default()
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
