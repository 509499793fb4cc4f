use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::{ApiError, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, OwnerGuard};
use crate::services::{EnsureOutcome, SettingsUpdate};

/// POST /api/settings/update - `{key, value}` or `{updates: {k: v, ...}}`.
pub async fn update(
    _owner: OwnerGuard,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Value> {
    let update = SettingsUpdate::from_request(&body).map_err(|e| ApiError::settings("Invalid settings update", e))?;
    let context = if update.is_bulk() {
        "Failed to update settings"
    } else {
        "Failed to update setting"
    };

    let written = state
        .settings
        .update(&update)
        .await
        .map_err(|e| ApiError::settings(context, e))?;

    if update.is_bulk() {
        let count = written.len();
        Ok(ApiResponse::success(json!(written)).with_field("updated", count))
    } else {
        Ok(ApiResponse::success(json!(written.into_iter().next())))
    }
}

/// POST /api/settings/ensure - fill in default keys the store lacks.
pub async fn ensure(owner: OwnerGuard, State(state): State<AppState>) -> ApiResult<EnsureOutcome> {
    let outcome = state.settings.ensure_settings(&owner.check).await;
    Ok(ApiResponse::success(outcome).with_field("ensured", outcome.ensured))
}
