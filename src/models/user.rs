//! User accounts

use serde::{Deserialize, Serialize};

use super::{check_len, check_opt_len, Validate};
use crate::error::Result;

/// Stored user account
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    /// Role names checked against endpoint ACLs
    pub role: Vec<String>,
    pub disabled: bool,
    /// Blocks issuing new tokens; existing tokens stay valid until expiry
    pub login_denied: bool,
    pub hashed_password: String,
    pub created: String,
    pub updated: Option<String>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.iter().any(|r| r == role)
    }
}

/// User information in responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub role: Vec<String>,
    pub disabled: bool,
    pub login_denied: bool,
    pub created: String,
    pub updated: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            email: user.email,
            role: user.role,
            disabled: user.disabled,
            login_denied: user.login_denied,
            created: user.created,
            updated: user.updated,
        }
    }
}

/// Body of `POST /user/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub role: Vec<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub login_denied: bool,
    pub password: String,
}

impl Validate for NewUser {
    fn validate(&self) -> Result<()> {
        check_len("username", &self.username, 16)?;
        check_len("first_name", &self.first_name, 64)?;
        check_len("last_name", &self.last_name, 64)?;
        check_len("phone", &self.phone, 20)?;
        check_len("email", &self.email, 64)?;
        check_password(&self.password)
    }
}

fn check_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(crate::error::Error::Validation(
            "password must not be empty".to_string(),
        ));
    }
    // bcrypt only looks at the first 72 bytes
    if password.len() > 72 {
        return Err(crate::error::Error::Validation(
            "password must be at most 72 bytes".to_string(),
        ));
    }
    Ok(())
}

/// Partial update of a user; `None` leaves the column untouched.
///
/// This is also the body of `PUT /user/{user_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserChanges {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Vec<String>>,
    #[serde(default)]
    pub disabled: Option<bool>,
    #[serde(default)]
    pub login_denied: Option<bool>,
    #[serde(skip)]
    pub hashed_password: Option<String>,
}

impl Validate for UserChanges {
    fn validate(&self) -> Result<()> {
        check_opt_len("username", self.username.as_ref(), 16)?;
        check_opt_len("first_name", self.first_name.as_ref(), 64)?;
        check_opt_len("last_name", self.last_name.as_ref(), 64)?;
        check_opt_len("phone", self.phone.as_ref(), 20)?;
        check_opt_len("email", self.email.as_ref(), 64)
    }
}

impl UserChanges {
    /// Apply the present fields to a stored record
    pub fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(disabled) = self.disabled {
            user.disabled = disabled;
        }
        if let Some(login_denied) = self.login_denied {
            user.login_denied = login_denied;
        }
        if let Some(hashed_password) = self.hashed_password {
            user.hashed_password = hashed_password;
        }
    }
}

/// Body of `PATCH /user/{user_id}/contacts`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactsChange {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<ContactsChange> for UserChanges {
    fn from(change: ContactsChange) -> Self {
        Self {
            first_name: change.first_name,
            last_name: change.last_name,
            phone: change.phone,
            email: change.email,
            ..Default::default()
        }
    }
}

/// Body of `PATCH /user/{user_id}/username`
#[derive(Debug, Clone, Deserialize)]
pub struct UsernameChange {
    pub username: String,
}

impl From<UsernameChange> for UserChanges {
    fn from(change: UsernameChange) -> Self {
        Self {
            username: Some(change.username),
            ..Default::default()
        }
    }
}

/// Body of `PATCH /user/{user_id}/role`
#[derive(Debug, Clone, Deserialize)]
pub struct RoleChange {
    pub role: Vec<String>,
}

impl From<RoleChange> for UserChanges {
    fn from(change: RoleChange) -> Self {
        Self {
            role: Some(change.role),
            ..Default::default()
        }
    }
}

/// Body of `PATCH /user/{user_id}/disabled`
#[derive(Debug, Clone, Deserialize)]
pub struct DisabledChange {
    pub disabled: bool,
}

impl From<DisabledChange> for UserChanges {
    fn from(change: DisabledChange) -> Self {
        Self {
            disabled: Some(change.disabled),
            ..Default::default()
        }
    }
}

/// Body of `PATCH /user/{user_id}/login_denied`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginDeniedChange {
    pub login_denied: bool,
}

impl From<LoginDeniedChange> for UserChanges {
    fn from(change: LoginDeniedChange) -> Self {
        Self {
            login_denied: Some(change.login_denied),
            ..Default::default()
        }
    }
}

/// Body of the password change endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    pub password: String,
}

impl Validate for PasswordChange {
    fn validate(&self) -> Result<()> {
        check_password(&self.password)
    }
}
