use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::cookies::ACCESS_TOKEN_COOKIE;
use crate::utils::jwt::{self, AccessClaims};

/// Authenticated user taken from the `accessToken` cookie or an
/// `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl AuthUser {
    /// `Ok(())` when the user owns the resource, `Err(PermissionDenied)` otherwise.
    pub fn require_owner(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl From<AccessClaims> for AuthUser {
    fn from(claims: AccessClaims) -> Self {
        Self { user_id: claims.sub }
    }
}

/// The raw access token of a request, if one was presented.
///
/// The cookie wins over the header. A non-Bearer `Authorization` header is
/// an invalid token, not a missing one.
fn presented_token(parts: &Parts) -> Result<Option<String>, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE)
        && !cookie.value().is_empty()
    {
        return Ok(Some(cookie.value().to_owned()));
    }

    let Some(auth_header) = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(None);
    };

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::TokenInvalid)?;
    Ok(Some(token.to_owned()))
}

fn authenticate(token: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let claims: AccessClaims = jwt::verify(token, &state.config.auth.access_token_secret)
        .map_err(|_| AppError::TokenInvalid)?;
    Ok(claims.into())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = presented_token(parts)?.ok_or(AppError::TokenMissing)?;
        authenticate(&token, state)
    }
}

/// Optional authentication for public endpoints.
///
/// No token yields `None`; a token that fails verification is still rejected
/// so clients learn they must refresh.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|u| u.user_id)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match presented_token(parts)? {
            Some(token) => Ok(MaybeAuthUser(Some(authenticate(&token, state)?))),
            None => Ok(MaybeAuthUser(None)),
        }
    }
}
