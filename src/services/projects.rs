use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

use crate::database::{NewProject, Project, ProjectFilter, ProjectPatch, ProjectStore, StoreError};

/// Slug used when a title has no slug-safe characters at all.
const FALLBACK_SLUG: &str = "project";

/// Attempts at allocating a slug when a concurrent insert takes the probed one.
const SLUG_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Body of `projects/create`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProject {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tech_stack: Option<Value>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Body of `projects/update`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tech_stack: Option<Value>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub slug: Option<String>,
    /// `null` clears the order; absent keeps it.
    #[serde(default, deserialize_with = "double_option")]
    pub sort_order: Option<Option<i32>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteProject {
    #[serde(default)]
    pub id: Option<String>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Lowercase, collapse every run of non `[a-z0-9]` into `-`, trim `-` at both ends.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Accept a JSON list or a comma-separated string; trim entries and drop blanks.
pub fn normalize_tech_stack(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };

    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// First of `base`, `base-2`, `base-3`, ... not in `taken`.
pub fn next_free_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn parse_id(raw: Option<&str>) -> Result<Uuid, ProjectError> {
    let raw = match raw.map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => return Err(ProjectError::Validation("Project ID is required".into())),
    };
    Uuid::parse_str(raw).map_err(|_| ProjectError::Validation(format!("Invalid project id: {}", raw)))
}

pub struct ProjectService {
    store: Arc<dyn ProjectStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: ProjectFilter) -> Result<Vec<Project>, ProjectError> {
        Ok(self.store.list(filter).await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Project, ProjectError> {
        self.store
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| ProjectError::NotFound(format!("Project not found: {}", slug)))
    }

    /// Probe `base` and its numbered suffixes against stored slugs, ignoring `exclude`.
    pub async fn unique_slug(&self, base: &str, exclude: Option<Uuid>) -> Result<String, ProjectError> {
        let taken: HashSet<String> = self
            .store
            .slugs_with_prefix(base)
            .await?
            .into_iter()
            .filter(|(id, _)| Some(*id) != exclude)
            .map(|(_, slug)| slug)
            .collect();
        Ok(next_free_slug(base, &taken))
    }

    pub async fn create(&self, request: CreateProject) -> Result<Project, ProjectError> {
        let title = request.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(ProjectError::Validation("Title is required".into()));
        }

        let base = base_slug(request.slug.as_deref(), title);
        let mut project = NewProject {
            title: title.to_string(),
            description: request.description.unwrap_or_default(),
            url: request.url.unwrap_or_default(),
            image_url: request.image_url.unwrap_or_default(),
            tech_stack: request.tech_stack.as_ref().map(normalize_tech_stack).unwrap_or_default(),
            featured: request.featured.unwrap_or(false),
            slug: String::new(),
        };

        let mut attempt = 1;
        loop {
            project.slug = self.unique_slug(&base, None).await?;
            match self.store.insert(project.clone()).await {
                Ok(created) => {
                    tracing::info!("Created project '{}' ({})", created.slug, created.id);
                    return Ok(created);
                }
                Err(StoreError::Conflict(msg)) if attempt < SLUG_ATTEMPTS => {
                    tracing::debug!("Slug '{}' taken concurrently, retrying: {}", project.slug, msg);
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub async fn update(&self, request: UpdateProject) -> Result<Project, ProjectError> {
        let id = parse_id(request.id.as_deref())?;

        let title = match request.title {
            Some(title) if title.trim().is_empty() => {
                return Err(ProjectError::Validation("Title is required".into()))
            }
            Some(title) => Some(title.trim().to_string()),
            None => None,
        };

        let slug = match request.slug.as_deref() {
            None => None,
            Some(raw) => {
                let fallback_title = match &title {
                    Some(t) => t.clone(),
                    None => self.existing(id).await?.title,
                };
                let base = base_slug(Some(raw), &fallback_title);
                Some(self.unique_slug(&base, Some(id)).await?)
            }
        };

        let patch = ProjectPatch {
            title,
            description: request.description,
            url: request.url,
            image_url: request.image_url,
            tech_stack: request.tech_stack.as_ref().map(normalize_tech_stack),
            featured: request.featured,
            slug,
            sort_order: request.sort_order,
        };

        self.store
            .update(id, patch)
            .await?
            .ok_or_else(|| ProjectError::NotFound(format!("Project not found: {}", id)))
    }

    /// Hard delete by id. A row that is already gone still counts as success.
    pub async fn delete(&self, request: DeleteProject) -> Result<Uuid, ProjectError> {
        let id = parse_id(request.id.as_deref())?;
        if !self.store.delete(id).await? {
            tracing::debug!("Delete of missing project {}", id);
        }
        Ok(id)
    }

    async fn existing(&self, id: Uuid) -> Result<Project, ProjectError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ProjectError::NotFound(format!("Project not found: {}", id)))
    }
}

/// Explicit slug when it has slug-safe content, else the title's.
fn base_slug(explicit: Option<&str>, title: &str) -> String {
    explicit
        .map(slugify)
        .filter(|s| !s.is_empty())
        .or_else(|| Some(slugify(title)).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| FALLBACK_SLUG.to_string())
}
