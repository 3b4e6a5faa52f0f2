//! Token endpoint request and response shapes

use serde::{Deserialize, Serialize};

/// OAuth2 password-flow form sent to `POST /token`
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
    /// Space separated list of requested scopes
    #[serde(default)]
    pub scope: String,
}

impl TokenRequest {
    pub fn scopes(&self) -> Vec<String> {
        self.scope.split_whitespace().map(str::to_string).collect()
    }
}

/// Login response with token
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_split_on_whitespace() {
        let request = TokenRequest {
            username: "u".to_string(),
            password: "p".to_string(),
            scope: " scope_example  me ".to_string(),
        };
        assert_eq!(request.scopes(), vec!["scope_example", "me"]);
    }
}
