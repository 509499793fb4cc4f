use axum::extract::State;
use serde_json::json;

use crate::app::AppState;
use crate::database::Project;
use crate::error::{ApiError, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, OwnerGuard};
use crate::services::{CreateProject, DeleteProject, UpdateProject};

/// POST /api/projects/create
pub async fn create(
    _owner: OwnerGuard,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateProject>,
) -> ApiResult<Project> {
    let project = state
        .projects
        .create(request)
        .await
        .map_err(|e| ApiError::project("Failed to create project", e))?;
    Ok(ApiResponse::success(project))
}

/// POST /api/projects/update
pub async fn update(
    _owner: OwnerGuard,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdateProject>,
) -> ApiResult<Project> {
    let project = state
        .projects
        .update(request)
        .await
        .map_err(|e| ApiError::project("Failed to update project", e))?;
    Ok(ApiResponse::success(project))
}

/// POST /api/projects/delete
pub async fn delete(
    _owner: OwnerGuard,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<DeleteProject>,
) -> ApiResult<()> {
    let id = state
        .projects
        .delete(request)
        .await
        .map_err(|e| ApiError::project("Failed to delete project", e))?;
    Ok(ApiResponse::empty().with_field("id", json!(id)))
}
