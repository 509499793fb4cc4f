use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::manager::StoreError;
use super::models::Setting;

/// Key-value content table (`site_settings`).
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Every stored row, in key order.
    async fn all(&self) -> Result<Vec<Setting>, StoreError>;

    async fn keys(&self) -> Result<Vec<String>, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<Setting>, StoreError>;

    /// Upsert by key (`ON CONFLICT (key)`), stamping `updated_at`. Returns the written rows.
    async fn upsert(&self, entries: &[(String, String)]) -> Result<Vec<Setting>, StoreError>;

    /// Insert rows whose key is not stored yet (`ON CONFLICT (key) DO NOTHING`).
    /// Existing rows are left untouched; returns only the rows inserted.
    async fn insert_missing(&self, entries: &[(String, String)]) -> Result<Vec<Setting>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct PgSettingsStore {
    pool: PgPool,
}

impl PgSettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn all(&self) -> Result<Vec<Setting>, StoreError> {
        let rows = sqlx::query_as::<_, Setting>(
            "SELECT key, value, updated_at FROM site_settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let keys = sqlx::query_scalar::<_, String>("SELECT key FROM site_settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Option<Setting>, StoreError> {
        let row = sqlx::query_as::<_, Setting>(
            "SELECT key, value, updated_at FROM site_settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert(&self, entries: &[(String, String)]) -> Result<Vec<Setting>, StoreError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = entries.iter().map(|(k, _)| k.clone()).collect();
        let values: Vec<String> = entries.iter().map(|(_, v)| v.clone()).collect();

        // One statement for the whole batch; keys must be distinct.
        let rows = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO site_settings (key, value, updated_at)
            SELECT k, v, $3 FROM UNNEST($1::text[], $2::text[]) AS t(k, v)
            ON CONFLICT (key) DO UPDATE
                SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            RETURNING key, value, updated_at
            "#,
        )
        .bind(&keys)
        .bind(&values)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_missing(&self, entries: &[(String, String)]) -> Result<Vec<Setting>, StoreError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = entries.iter().map(|(k, _)| k.clone()).collect();
        let values: Vec<String> = entries.iter().map(|(_, v)| v.clone()).collect();

        let rows = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO site_settings (key, value, updated_at)
            SELECT k, v, $3 FROM UNNEST($1::text[], $2::text[]) AS t(k, v)
            ON CONFLICT (key) DO NOTHING
            RETURNING key, value, updated_at
            "#,
        )
        .bind(&keys)
        .bind(&values)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
