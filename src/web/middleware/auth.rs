//! Session token authentication.
//!
//! Clients send the session token from the login response as a bearer token.
//! Handlers take [`SessionUser`] to require an active session.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, header::USER_AGENT, request::Parts, HeaderMap},
};
use std::sync::Arc;

use crate::auth::{AuthenticatedUser, ClientInfo};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Header carrying the proxy chain of client addresses.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Header carrying the client address set by a proxy.
pub const X_REAL_IP: &str = "x-real-ip";

/// Read the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Client IP and user agent from request headers.
///
/// The IP is the first `X-Forwarded-For` entry, else `X-Real-IP`.
pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let ip = header(X_FORWARDED_FOR)
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| header(X_REAL_IP));

    ClientInfo::new(ip, header(USER_AGENT.as_str()))
}

/// Bearer token of the request, without checking the session.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers)
            .map(BearerToken)
            .ok_or_else(|| ApiError::unauthorized("Missing authorization"))
    }
}

/// User of an active session.
///
/// Extraction touches the session, so every authenticated request counts
/// as activity.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// Session token.
    pub token: String,
    /// The session's user.
    pub user: AuthenticatedUser,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

        match state.session_manager().resume(&token).await? {
            Some(user) => Ok(SessionUser { token, user }),
            None => {
                tracing::debug!("Rejected request with inactive session");
                Err(ApiError::unauthorized("Session is not active"))
            }
        }
    }
}
