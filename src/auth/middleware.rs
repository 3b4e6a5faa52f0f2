//! Authentication extractors

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::api::SharedState;
use crate::auth::rbac::Permission;
use crate::auth::Claims;
use crate::error::{Error, Result};
use crate::models::User;

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Caller holding a valid token for an existing account.
///
/// Disabled accounts are still accepted here.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub claims: Claims,
}

impl CurrentUser {
    /// Every scope in `required` must have been granted to the token
    pub fn require_scopes(&self, required: &[&str]) -> Result<()> {
        if required.iter().all(|scope| self.claims.has_scope(scope)) {
            Ok(())
        } else {
            Err(Error::MissingScopes(required.join(" ")))
        }
    }
}

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self> {
        let token = bearer_token(&parts.headers).ok_or(Error::NotAuthenticated)?;
        let claims = state.tokens.verify(token)?;

        let user = state
            .store
            .get_user_by_username(&claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!("Token subject '{}' no longer exists", claims.sub);
                Error::InvalidCredentials
            })?;

        Ok(CurrentUser { user, claims })
    }
}

/// [`CurrentUser`] whose account is not disabled
#[derive(Debug, Clone)]
pub struct ActiveUser(pub CurrentUser);

impl FromRequestParts<SharedState> for ActiveUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        ActiveUser::try_from(current)
    }
}

impl TryFrom<CurrentUser> for ActiveUser {
    type Error = Error;

    fn try_from(current: CurrentUser) -> Result<Self> {
        if current.user.disabled {
            return Err(Error::UserDisabled);
        }
        Ok(ActiveUser(current))
    }
}

/// [`ActiveUser`] whose roles pass the ACL of endpoint `P`
pub struct Authorized<P> {
    pub current: CurrentUser,
    _endpoint: PhantomData<fn() -> P>,
}

impl<P> Authorized<P> {
    pub fn user(&self) -> &User {
        &self.current.user
    }
}

impl<P> FromRequestParts<SharedState> for Authorized<P>
where
    P: Permission,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self> {
        let ActiveUser(current) = ActiveUser::from_request_parts(parts, state).await?;
        state.rbac.authorize_for::<P>(&current.user.role)?;

        Ok(Authorized {
            current,
            _endpoint: PhantomData,
        })
    }
}
