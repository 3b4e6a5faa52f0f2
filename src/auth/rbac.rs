//! Role-based access control.
//!
//! Every protected endpoint has a key such as `POST_user`. The key resolves
//! to an ACL, a list of role names; a caller is let through when at least one
//! of their roles appears in that list.

use std::collections::HashMap;

use crate::error::{Error, Result};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_USER: &str = "user";

/// An endpoint guarded by an ACL
pub trait Permission {
    const KEY: &'static str;
}

macro_rules! endpoints {
    ($($(#[$meta:meta])* $name:ident => $key:literal : [$($role:expr),* $(,)?]),* $(,)?) => {
        /// Marker types naming each guarded endpoint
        pub mod endpoint {
            $(
                $(#[$meta])*
                #[derive(Debug, Clone, Copy)]
                pub struct $name;

                impl super::Permission for $name {
                    const KEY: &'static str = $key;
                }
            )*
        }

        /// Every endpoint key together with its built-in ACL
        pub fn default_acls() -> HashMap<String, Vec<String>> {
            let mut acls = HashMap::new();
            $(
                acls.insert(
                    $key.to_string(),
                    vec![$($role.to_string()),*],
                );
            )*
            acls
        }
    };
}

endpoints! {
    CreateUser => "POST_user": [ROLE_ADMIN],
    ListUsers => "GET_user": [ROLE_ADMIN, ROLE_MANAGER],
    ReadUser => "GET_user_user_id": [ROLE_ADMIN, ROLE_MANAGER],
    ReadUserByUsername => "GET_user_username": [ROLE_ADMIN, ROLE_MANAGER],
    ReadUserByPhone => "GET_user_phone": [ROLE_ADMIN, ROLE_MANAGER],
    ReadUserByEmail => "GET_user_email": [ROLE_ADMIN, ROLE_MANAGER],
    ReplaceUser => "PUT_user_user_id": [ROLE_ADMIN],
    DeleteUser => "DELETE_user_user_id": [ROLE_ADMIN],
    /// Caller changes their own password
    ChangeOwnPassword => "PATCH_user_password": [ROLE_ADMIN, ROLE_MANAGER, ROLE_USER],
    ChangeUserContacts => "PATCH_user_user_id_contacts": [ROLE_ADMIN, ROLE_MANAGER],
    ChangeUserPassword => "PATCH_user_user_id_password": [ROLE_ADMIN],
    ChangeUserUsername => "PATCH_user_user_id_username": [ROLE_ADMIN],
    ChangeUserRole => "PATCH_user_user_id_role": [ROLE_ADMIN],
    ChangeUserDisabled => "PATCH_user_user_id_disabled": [ROLE_ADMIN],
    ChangeUserLoginDenied => "PATCH_user_user_id_login_denied": [ROLE_ADMIN],
    CreateEmployee => "POST_employee": [ROLE_ADMIN, ROLE_MANAGER, ROLE_USER],
    ListEmployees => "GET_employee": [ROLE_ADMIN, ROLE_MANAGER, ROLE_USER],
    ReadEmployee => "GET_employee_employee_id": [ROLE_ADMIN, ROLE_MANAGER, ROLE_USER],
    ReplaceEmployee => "PUT_employee_employee_id": [ROLE_ADMIN, ROLE_MANAGER, ROLE_USER],
    DeleteEmployee => "DELETE_employee_employee_id": [ROLE_ADMIN, ROLE_MANAGER],
    CreateTicket => "POST_ticket": [ROLE_ADMIN, ROLE_MANAGER, ROLE_USER],
    /// Shared by the list, "my tickets" and single ticket reads
    ReadTickets => "GET_ticket": [ROLE_ADMIN, ROLE_MANAGER, ROLE_USER],
    ReplaceTicket => "PUT_ticket_ticket_id": [ROLE_ADMIN, ROLE_MANAGER, ROLE_USER],
    DeleteTicket => "DELETE_ticket_ticket_id": [ROLE_ADMIN, ROLE_MANAGER, ROLE_USER],
}

/// True when any ACL entry is one of the caller's roles
pub fn is_allowed(acl: &[String], roles: &[String]) -> bool {
    acl.iter().any(|permission| roles.contains(permission))
}

/// Resolved endpoint → ACL table
#[derive(Debug, Clone)]
pub struct Rbac {
    acls: HashMap<String, Vec<String>>,
}

impl Default for Rbac {
    fn default() -> Self {
        Self {
            acls: default_acls(),
        }
    }
}

impl Rbac {
    /// Built-in ACLs with the configured overrides applied on top
    pub fn with_overrides(overrides: &HashMap<String, Vec<String>>) -> Self {
        let mut acls = default_acls();
        for (key, roles) in overrides {
            if !acls.contains_key(key) {
                tracing::warn!("Permission override for unknown endpoint '{}' ignored", key);
                continue;
            }
            acls.insert(key.clone(), roles.clone());
        }
        Self { acls }
    }

    /// ACL of an endpoint; unknown endpoints have an empty ACL
    pub fn acl(&self, key: &str) -> &[String] {
        self.acls.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn check(&self, key: &str, roles: &[String]) -> bool {
        is_allowed(self.acl(key), roles)
    }

    pub fn authorize(&self, key: &str, roles: &[String]) -> Result<()> {
        if self.check(key, roles) {
            Ok(())
        } else {
            tracing::debug!("Roles {:?} not in ACL of '{}'", roles, key);
            Err(Error::PermissionDenied)
        }
    }

    pub fn authorize_for<P: Permission>(&self, roles: &[String]) -> Result<()> {
        self.authorize(P::KEY, roles)
    }
}
