use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::{ApiError, JsonBody};
use crate::identity::IdentityError;
use crate::middleware::{ApiResponse, MaybeSession};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// GET /api/auth/is-owner - whether the caller's session belongs to the owner.
/// Never errors; anything short of a verified owner is `false`.
pub async fn is_owner(State(state): State<AppState>, session: MaybeSession) -> Json<Value> {
    let check = session.owner_check(&state);
    Json(json!({ "isOwner": check.is_owner }))
}

/// POST /auth/login - password sign-in through the identity provider.
///
/// On success the access token is also set as an HttpOnly session cookie so
/// server-rendered pages and same-origin API calls see the session.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Response, ApiError> {
    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let provider = state.identity.as_ref().ok_or(IdentityError::NotConfigured)?;
    let tokens = provider.sign_in_with_password(email, &request.password).await?;

    // A token we cannot verify would never pass an owner check.
    let session = state.auth.verify(&tokens.access_token).map_err(|e| {
        tracing::error!("Identity provider token failed local verification: {}", e);
        ApiError::service_unavailable("Session could not be verified")
    })?;
    let check = crate::auth::verify_owner(Some(&session), state.auth.owner_id.as_deref());
    tracing::info!("Signed in {} (owner: {})", session.user_id, check.is_owner);

    let max_age = tokens.expires_in.unwrap_or_else(|| state.auth.session_max_age());
    let cookie = state.auth.session_cookie(&tokens.access_token, max_age);

    let body = ApiResponse::success(json!({
        "access_token": tokens.access_token,
        "expires_in": max_age,
        "user": tokens.user,
        "isOwner": check.is_owner,
    }));
    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

/// POST /auth/logout - best-effort provider sign-out, then clear the cookie.
pub async fn logout(State(state): State<AppState>, MaybeSession(session): MaybeSession) -> Response {
    if let (Some(provider), Some(session)) = (state.identity.as_ref(), session.as_ref()) {
        if let Err(e) = provider.sign_out(&session.access_token).await {
            tracing::warn!("Identity provider sign-out failed: {}", e);
        }
    }

    ([(header::SET_COOKIE, state.auth.clear_cookie())], ApiResponse::empty()).into_response()
}
