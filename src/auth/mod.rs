//! Authentication and authorization

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rbac;

pub use jwt::{Claims, TokenIssuer};
pub use middleware::{bearer_token, ActiveUser, Authorized, CurrentUser};
pub use models::{TokenRequest, TokenResponse};
pub use password::{authenticate_user, hash_password, verify_password};
pub use rbac::{endpoint, Permission, Rbac};
