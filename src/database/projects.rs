use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::StoreError;
use super::models::{NewProject, Project, ProjectFilter, ProjectPatch};

/// Advisory lock key serializing featured-project order allocation.
const SORT_ORDER_LOCK: i64 = 0x7072_6f6a_5f73_6f72;

/// Portfolio project table (`projects`).
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Project>, StoreError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Project>, StoreError>;

    /// Stored slugs starting with `prefix`, with the id that owns each.
    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>, StoreError>;

    /// Insert a project. When `featured` is set the store assigns
    /// `max(sort_order) + 1` (1 on an empty table) in the same atomic step.
    async fn insert(&self, project: NewProject) -> Result<Project, StoreError>;

    /// Overwrite the present fields and refresh `updated_at`. `None` if no such id.
    async fn update(&self, id: Uuid, patch: ProjectPatch) -> Result<Option<Project>, StoreError>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PROJECT_COLUMNS: &str = "id, title, description, url, image_url, tech_stack, featured, slug, sort_order, created_at, updated_at";

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn list(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError> {
        let sql = match filter.featured {
            None => format!(
                "SELECT {PROJECT_COLUMNS} FROM projects \
                 ORDER BY featured DESC, sort_order ASC NULLS LAST, created_at DESC"
            ),
            Some(_) => format!(
                "SELECT {PROJECT_COLUMNS} FROM projects WHERE featured = $1 \
                 ORDER BY sort_order ASC NULLS LAST, created_at DESC"
            ),
        };

        let mut query = sqlx::query_as::<_, Project>(&sql);
        if let Some(featured) = filter.featured {
            query = query.bind(featured);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Project>, StoreError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE slug = $1 LIMIT 1");
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>, StoreError> {
        // Normalized slugs only contain [a-z0-9-], so no LIKE metacharacters to escape.
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, slug FROM projects WHERE slug LIKE $1",
        )
        .bind(format!("{prefix}%"))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, project: NewProject) -> Result<Project, StoreError> {
        let mut tx = self.pool.begin().await?;

        if project.featured {
            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(SORT_ORDER_LOCK)
                .execute(&mut *tx)
                .await?;
        }

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO projects ({PROJECT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                     CASE WHEN $7 THEN (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM projects) END, \
                     $9, $9) \
             RETURNING {PROJECT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(Uuid::new_v4())
            .bind(&project.title)
            .bind(&project.description)
            .bind(&project.url)
            .bind(&project.image_url)
            .bind(&project.tech_stack)
            .bind(project.featured)
            .bind(&project.slug)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: ProjectPatch) -> Result<Option<Project>, StoreError> {
        let sql = format!(
            "UPDATE projects SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                url = COALESCE($4, url), \
                image_url = COALESCE($5, image_url), \
                tech_stack = COALESCE($6, tech_stack), \
                featured = COALESCE($7, featured), \
                slug = COALESCE($8, slug), \
                sort_order = CASE WHEN $9 THEN $10 ELSE sort_order END, \
                updated_at = $11 \
             WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        );
        let (set_sort_order, sort_order) = match patch.sort_order {
            Some(order) => (true, order),
            None => (false, None),
        };

        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.url)
            .bind(patch.image_url)
            .bind(patch.tech_stack)
            .bind(patch.featured)
            .bind(patch.slug)
            .bind(set_sort_order)
            .bind(sort_order)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
