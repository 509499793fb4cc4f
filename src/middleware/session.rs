use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::app::AppState;
use crate::auth::{verify_owner, OwnerCheck, Session};
use crate::error::ApiError;

/// Access token from `Authorization: Bearer` or, failing that, the session cookie.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// The request's verified session, if any. Bad or expired tokens count as none.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_token(&parts.headers, &state.auth.cookie_name) else {
            return Ok(MaybeSession(None));
        };

        match state.auth.verify(&token) {
            Ok(session) => Ok(MaybeSession(Some(session))),
            Err(e) => {
                tracing::debug!("Ignoring session token: {}", e);
                Ok(MaybeSession(None))
            }
        }
    }
}

impl MaybeSession {
    pub fn owner_check(&self, state: &AppState) -> OwnerCheck {
        verify_owner(self.0.as_ref(), state.auth.owner_id.as_deref())
    }
}

/// Proof that the request comes from the site owner. Mutating handlers take
/// this first so nothing runs for anyone else.
#[derive(Debug, Clone)]
pub struct OwnerGuard {
    pub session: Session,
    pub check: OwnerCheck,
}

#[async_trait]
impl FromRequestParts<AppState> for OwnerGuard {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let MaybeSession(session) = match MaybeSession::from_request_parts(parts, state).await {
            Ok(session) => session,
            Err(never) => match never {},
        };
        let check = verify_owner(session.as_ref(), state.auth.owner_id.as_deref());

        match session {
            Some(session) if check.is_owner => Ok(OwnerGuard { session, check }),
            _ => {
                let message = check.error.clone().unwrap_or_else(|| "Unauthorized".to_string());
                tracing::warn!("Rejected {} {}: {}", parts.method, parts.uri.path(), message);
                Err(ApiError::forbidden(message))
            }
        }
    }
}
