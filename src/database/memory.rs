//! In-process stores for local runs (`STORE_BACKEND=memory`) and tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::StoreError;
use super::models::{NewProject, Project, ProjectFilter, ProjectPatch, Setting};
use super::projects::ProjectStore;
use super::settings::SettingsStore;

#[derive(Default)]
pub struct MemorySettingsStore {
    rows: RwLock<BTreeMap<String, Setting>>,
    writes: AtomicUsize,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows written since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn all(&self) -> Result<Vec<Setting>, StoreError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.rows.read().await.keys().cloned().collect())
    }

    async fn get(&self, key: &str) -> Result<Option<Setting>, StoreError> {
        Ok(self.rows.read().await.get(key).cloned())
    }

    async fn upsert(&self, entries: &[(String, String)]) -> Result<Vec<Setting>, StoreError> {
        let now = Utc::now();
        let mut rows = self.rows.write().await;
        let mut written = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let setting = Setting {
                key: key.clone(),
                value: value.clone(),
                updated_at: now,
            };
            rows.insert(key.clone(), setting.clone());
            written.push(setting);
        }
        self.writes.fetch_add(written.len(), Ordering::SeqCst);
        Ok(written)
    }

    async fn insert_missing(&self, entries: &[(String, String)]) -> Result<Vec<Setting>, StoreError> {
        let now = Utc::now();
        let mut rows = self.rows.write().await;
        let mut inserted = Vec::new();
        for (key, value) in entries {
            if rows.contains_key(key) {
                continue;
            }
            let setting = Setting {
                key: key.clone(),
                value: value.clone(),
                updated_at: now,
            };
            rows.insert(key.clone(), setting.clone());
            inserted.push(setting);
        }
        self.writes.fetch_add(inserted.len(), Ordering::SeqCst);
        Ok(inserted)
    }
}

#[derive(Default)]
pub struct MemoryProjectStore {
    rows: RwLock<Vec<Project>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn list(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError> {
        let rows = self.rows.read().await;
        let mut projects: Vec<Project> = rows
            .iter()
            .filter(|p| filter.featured.map_or(true, |f| p.featured == f))
            .cloned()
            .collect();
        let featured_first = filter.featured.is_none();
        projects.sort_by(|a, b| a.listing_cmp(b, featured_first));
        Ok(projects)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(self.rows.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.rows.read().await.iter().find(|p| p.slug == slug).cloned())
    }

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>, StoreError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|p| p.slug.starts_with(prefix))
            .map(|p| (p.id, p.slug.clone()))
            .collect())
    }

    async fn insert(&self, project: NewProject) -> Result<Project, StoreError> {
        // Allocation and insert share one write guard, so orders never collide.
        let mut rows = self.rows.write().await;

        if !project.slug.is_empty() && rows.iter().any(|p| p.slug == project.slug) {
            return Err(StoreError::Conflict(format!("slug '{}' already exists", project.slug)));
        }

        let sort_order = project.featured.then(|| {
            rows.iter().filter_map(|p| p.sort_order).max().unwrap_or(0) + 1
        });

        let now = Utc::now();
        let row = Project {
            id: Uuid::new_v4(),
            title: project.title,
            description: project.description,
            url: project.url,
            image_url: project.image_url,
            tech_stack: project.tech_stack,
            featured: project.featured,
            slug: project.slug,
            sort_order,
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: ProjectPatch) -> Result<Option<Project>, StoreError> {
        let mut rows = self.rows.write().await;

        if let Some(slug) = patch.slug.as_deref() {
            if !slug.is_empty() && rows.iter().any(|p| p.id != id && p.slug == slug) {
                return Err(StoreError::Conflict(format!("slug '{}' already exists", slug)));
            }
        }

        let Some(row) = rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            row.title = title;
        }
        if let Some(description) = patch.description {
            row.description = description;
        }
        if let Some(url) = patch.url {
            row.url = url;
        }
        if let Some(image_url) = patch.image_url {
            row.image_url = image_url;
        }
        if let Some(tech_stack) = patch.tech_stack {
            row.tech_stack = tech_stack;
        }
        if let Some(featured) = patch.featured {
            row.featured = featured;
        }
        if let Some(slug) = patch.slug {
            row.slug = slug;
        }
        if let Some(sort_order) = patch.sort_order {
            row.sort_order = sort_order;
        }
        row.updated_at = Utc::now();

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_project(title: &str, slug: &str, featured: bool) -> NewProject {
        NewProject {
            title: title.to_string(),
            slug: slug.to_string(),
            featured,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn insert_missing_keeps_existing_values() {
        let store = MemorySettingsStore::new();
        store
            .upsert(&[("hero_headline".to_string(), "Mine".to_string())])
            .await
            .unwrap();

        let inserted = store
            .insert_missing(&[
                ("hero_headline".to_string(), "Default".to_string()),
                ("hero_subtext".to_string(), "Default".to_string()),
            ])
            .await
            .unwrap();

        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].key, "hero_subtext");
        assert_eq!(store.get("hero_headline").await.unwrap().unwrap().value, "Mine");
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn featured_inserts_get_increasing_orders() {
        let store = MemoryProjectStore::new();
        let a = store.insert(new_project("A", "a", true)).await.unwrap();
        let plain = store.insert(new_project("B", "b", false)).await.unwrap();
        let c = store.insert(new_project("C", "c", true)).await.unwrap();

        assert_eq!(a.sort_order, Some(1));
        assert_eq!(plain.sort_order, None);
        assert_eq!(c.sort_order, Some(2));
    }

    #[tokio::test]
    async fn full_listing_puts_featured_first() {
        let store = MemoryProjectStore::new();
        store.insert(new_project("Plain", "plain", false)).await.unwrap();
        store.insert(new_project("Ordered 1", "ordered-1", true)).await.unwrap();
        store.insert(new_project("Ordered 2", "ordered-2", true)).await.unwrap();

        let titles: Vec<String> = store
            .list(ProjectFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Ordered 1", "Ordered 2", "Plain"]);

        let featured = store.list(ProjectFilter { featured: Some(true) }).await.unwrap();
        assert_eq!(featured.len(), 2);
    }

    #[tokio::test]
    async fn update_leaves_absent_fields_alone() {
        let store = MemoryProjectStore::new();
        let created = store.insert(new_project("Title", "title", false)).await.unwrap();

        let patch = ProjectPatch {
            description: Some("new".into()),
            ..Default::default()
        };
        let updated = store.update(created.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "Title");
        assert_eq!(updated.description, "new");
        assert!(updated.updated_at >= created.updated_at);

        assert!(store.update(Uuid::new_v4(), ProjectPatch::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_overwrites_by_key_and_counts_writes() {
        let store = MemorySettingsStore::new();
        store.upsert(&[("a".into(), "1".into())]).await.unwrap();
        store.upsert(&[("a".into(), "2".into()), ("b".into(), "3".into())]).await.unwrap();

        assert_eq!(store.get("a").await.unwrap().unwrap().value, "2");
        assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);
        assert_eq!(store.write_count(), 3);
    }
}
