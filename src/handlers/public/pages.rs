use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
};

use crate::app::AppState;
use crate::database::{Project, ProjectFilter};
use crate::error::ApiError;
use crate::middleware::MaybeSession;
use crate::site::{pages, OWNER_SCRIPT};

async fn load_projects(state: &AppState, filter: ProjectFilter) -> Result<Vec<Project>, ApiError> {
    state
        .projects
        .list(filter)
        .await
        .map_err(|e| ApiError::project("Failed to load projects", e))
}

async fn load_settings(state: &AppState) -> Result<std::collections::BTreeMap<String, String>, ApiError> {
    state
        .settings
        .get_settings()
        .await
        .map_err(|e| ApiError::settings("Failed to load settings", e))
}

/// GET /
pub async fn home(State(state): State<AppState>, session: MaybeSession) -> Result<Html<String>, ApiError> {
    let is_owner = session.owner_check(&state).is_owner;
    let (settings, featured) = futures::try_join!(
        load_settings(&state),
        load_projects(&state, ProjectFilter { featured: Some(true) })
    )?;
    Ok(Html(pages::home(&settings, &featured, is_owner)))
}

/// GET /projects
pub async fn projects(State(state): State<AppState>, session: MaybeSession) -> Result<Html<String>, ApiError> {
    let is_owner = session.owner_check(&state).is_owner;
    let (settings, projects) = futures::try_join!(
        load_settings(&state),
        load_projects(&state, ProjectFilter::default())
    )?;
    Ok(Html(pages::projects(&settings, &projects, is_owner)))
}

/// GET /contact
pub async fn contact(State(state): State<AppState>, session: MaybeSession) -> Result<Html<String>, ApiError> {
    let is_owner = session.owner_check(&state).is_owner;
    let settings = load_settings(&state).await?;
    Ok(Html(pages::contact_page(&settings, is_owner)))
}

/// GET /assets/owner.js
pub async fn owner_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        OWNER_SCRIPT,
    )
}
