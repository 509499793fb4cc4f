use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::{Project, ProjectFilter};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    pub featured: Option<bool>,
}

/// GET /api/settings - every content key, defaults filled in.
pub async fn settings_get(State(state): State<AppState>) -> ApiResult<BTreeMap<String, String>> {
    let settings = state
        .settings
        .get_settings()
        .await
        .map_err(|e| ApiError::settings("Failed to load settings", e))?;
    Ok(ApiResponse::success(settings))
}

/// GET /api/projects[?featured=bool] - listing order matches the pages.
pub async fn projects_list(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<Vec<Project>> {
    let projects = state
        .projects
        .list(ProjectFilter {
            featured: query.featured,
        })
        .await
        .map_err(|e| ApiError::project("Failed to load projects", e))?;
    Ok(ApiResponse::success(projects))
}

/// GET /api/projects/:slug
pub async fn project_get(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Project> {
    let project = state
        .projects
        .get_by_slug(&slug)
        .await
        .map_err(|e| ApiError::project("Failed to load project", e))?;
    Ok(ApiResponse::success(project))
}
