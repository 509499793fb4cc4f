use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::auth::OwnerCheck;
use crate::content::{self, ContentError, DEFAULT_SETTINGS};
use crate::database::{Setting, SettingsStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ContentError> for SettingsError {
    fn from(err: ContentError) -> Self {
        SettingsError::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnsureOutcome {
    pub ensured: usize,
}

/// A validated settings write: one `{key, value}` pair or a bulk `{updates}` map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsUpdate {
    Single { key: String, value: String },
    Bulk(Vec<(String, String)>),
}

impl SettingsUpdate {
    /// Normalize a request body. An `updates` object takes precedence over
    /// `key`/`value`; any other `updates` value is ignored.
    pub fn from_request(body: &Value) -> Result<Self, SettingsError> {
        if let Some(Value::Object(map)) = body.get("updates") {
            if map.is_empty() {
                return Err(SettingsError::Validation("No updates provided".into()));
            }
            if map.keys().any(|k| k.trim().is_empty()) {
                return Err(SettingsError::Validation("Setting key is required".into()));
            }
            let entries = map
                .iter()
                .map(|(k, v)| (k.clone(), coerce_value(v)))
                .collect();
            return Ok(SettingsUpdate::Bulk(entries));
        }

        let key = match body.get("key").and_then(Value::as_str).map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Err(SettingsError::Validation("Setting key is required".into())),
        };
        let value = match body.get("value") {
            None | Some(Value::Null) => {
                return Err(SettingsError::Validation("Setting value is required".into()))
            }
            Some(value) => coerce_value(value),
        };
        Ok(SettingsUpdate::Single { key, value })
    }

    pub fn is_bulk(&self) -> bool {
        matches!(self, SettingsUpdate::Bulk(_))
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        match self {
            SettingsUpdate::Single { key, value } => vec![(key.clone(), value.clone())],
            SettingsUpdate::Bulk(entries) => entries.clone(),
        }
    }
}

/// Stored values are strings; anything else is rendered as JSON text.
pub fn coerce_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Stored rows win; every default key missing from them is filled in.
pub fn merge_defaults(stored: impl IntoIterator<Item = Setting>) -> BTreeMap<String, String> {
    let mut merged = content::default_settings();
    merged.extend(stored.into_iter().map(|s| (s.key, s.value)));
    merged
}

pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Full key to value map with defaults merged in. Never writes.
    pub async fn get_settings(&self) -> Result<BTreeMap<String, String>, SettingsError> {
        Ok(merge_defaults(self.store.all().await?))
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, SettingsError> {
        match self.store.get(key).await? {
            Some(setting) => Ok(Some(setting.value)),
            None => Ok(content::default_value(key).map(str::to_string)),
        }
    }

    /// Insert exactly the default keys the store lacks. Reports 0 for non-owners
    /// and on any store failure.
    pub async fn ensure_settings(&self, check: &OwnerCheck) -> EnsureOutcome {
        if !check.is_owner {
            return EnsureOutcome { ensured: 0 };
        }

        let existing = match self.store.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!("Failed to read setting keys: {}", e);
                return EnsureOutcome { ensured: 0 };
            }
        };

        let missing: Vec<(String, String)> = DEFAULT_SETTINGS
            .iter()
            .filter(|(key, _)| !existing.iter().any(|k| k == key))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        if missing.is_empty() {
            return EnsureOutcome { ensured: 0 };
        }

        // A key saved after the read above stays as saved.
        match self.store.insert_missing(&missing).await {
            Ok(written) => {
                tracing::info!("Ensured {} default settings", written.len());
                EnsureOutcome { ensured: written.len() }
            }
            Err(e) => {
                tracing::error!("Failed to ensure default settings: {}", e);
                EnsureOutcome { ensured: 0 }
            }
        }
    }

    /// Validate structured keys, then upsert every entry in one store call.
    pub async fn update(&self, update: &SettingsUpdate) -> Result<Vec<Setting>, SettingsError> {
        let entries = update.entries();
        for (key, value) in &entries {
            content::validate_setting(key, value)?;
        }
        Ok(self.store.upsert(&entries).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::keys;
    use crate::database::MemorySettingsStore;
    use serde_json::json;

    fn owner() -> OwnerCheck {
        OwnerCheck {
            is_owner: true,
            user_id: Some("owner".into()),
            error: None,
        }
    }

    #[test]
    fn parses_single_and_bulk_shapes() {
        let single = SettingsUpdate::from_request(&json!({"key": "about_title", "value": 42})).unwrap();
        assert_eq!(
            single,
            SettingsUpdate::Single {
                key: "about_title".into(),
                value: "42".into()
            }
        );

        let bulk = SettingsUpdate::from_request(&json!({"updates": {"a": "x", "b": true}})).unwrap();
        assert_eq!(
            bulk.entries(),
            vec![("a".to_string(), "x".to_string()), ("b".to_string(), "true".to_string())]
        );
    }

    #[test]
    fn rejects_missing_fields() {
        let err = SettingsUpdate::from_request(&json!({"value": "x"})).unwrap_err();
        assert_eq!(err.to_string(), "Setting key is required");

        let err = SettingsUpdate::from_request(&json!({"key": "k", "value": null})).unwrap_err();
        assert_eq!(err.to_string(), "Setting value is required");

        let err = SettingsUpdate::from_request(&json!({"updates": {}})).unwrap_err();
        assert_eq!(err.to_string(), "No updates provided");
    }

    #[test]
    fn non_object_updates_fall_back_to_single_form() {
        let single = SettingsUpdate::from_request(&json!({"updates": null, "key": "about_title", "value": "x"})).unwrap();
        assert!(!single.is_bulk());
        assert_eq!(single.entries(), vec![("about_title".to_string(), "x".to_string())]);

        let single = SettingsUpdate::from_request(&json!({"updates": ["a"], "key": "about_title", "value": "x"})).unwrap();
        assert!(!single.is_bulk());

        let err = SettingsUpdate::from_request(&json!({"updates": "a"})).unwrap_err();
        assert_eq!(err.to_string(), "Setting key is required");
    }

    #[test]
    fn bulk_rejects_blank_keys_like_single() {
        for key in ["", "  "] {
            let err = SettingsUpdate::from_request(&json!({"updates": {key: "x", "about_title": "y"}})).unwrap_err();
            assert_eq!(err.to_string(), "Setting key is required");

            let err = SettingsUpdate::from_request(&json!({"key": key, "value": "x"})).unwrap_err();
            assert_eq!(err.to_string(), "Setting key is required");
        }
    }

    #[test]
    fn coerces_structured_values_to_json_text() {
        assert_eq!(coerce_value(&json!([{"label": "a", "href": "b"}])), r#"[{"href":"b","label":"a"}]"#);
        assert_eq!(coerce_value(&json!("plain")), "plain");
    }

    #[tokio::test]
    async fn empty_store_reads_exact_defaults() {
        let service = SettingsService::new(Arc::new(MemorySettingsStore::new()));
        assert_eq!(service.get_settings().await.unwrap(), content::default_settings());
    }

    #[tokio::test]
    async fn stored_value_overrides_one_default() {
        let store = Arc::new(MemorySettingsStore::new());
        store
            .upsert(&[(keys::HERO_HEADLINE.to_string(), "Mine".to_string())])
            .await
            .unwrap();
        let service = SettingsService::new(store);

        let merged = service.get_settings().await.unwrap();
        let mut expected = content::default_settings();
        expected.insert(keys::HERO_HEADLINE.into(), "Mine".into());
        assert_eq!(merged, expected);
        assert_eq!(service.get_setting(keys::ABOUT_TITLE).await.unwrap().as_deref(), Some("About"));
    }

    #[tokio::test]
    async fn ensure_is_idempotent_and_never_overwrites() {
        let store = Arc::new(MemorySettingsStore::new());
        store
            .upsert(&[(keys::ABOUT_TITLE.to_string(), "Custom".to_string())])
            .await
            .unwrap();
        let service = SettingsService::new(store.clone());

        let first = service.ensure_settings(&owner()).await;
        assert_eq!(first.ensured, DEFAULT_SETTINGS.len() - 1);
        let writes = store.write_count();

        let second = service.ensure_settings(&owner()).await;
        assert_eq!(second.ensured, 0);
        assert_eq!(store.write_count(), writes);
        assert_eq!(store.get(keys::ABOUT_TITLE).await.unwrap().unwrap().value, "Custom");
    }

    /// Answers `keys()` from a snapshot taken before the owner's last save.
    struct LaggingKeys {
        inner: Arc<MemorySettingsStore>,
        snapshot: Vec<String>,
    }

    #[async_trait::async_trait]
    impl SettingsStore for LaggingKeys {
        async fn all(&self) -> Result<Vec<Setting>, StoreError> {
            self.inner.all().await
        }

        async fn keys(&self) -> Result<Vec<String>, StoreError> {
            Ok(self.snapshot.clone())
        }

        async fn get(&self, key: &str) -> Result<Option<Setting>, StoreError> {
            self.inner.get(key).await
        }

        async fn upsert(&self, entries: &[(String, String)]) -> Result<Vec<Setting>, StoreError> {
            self.inner.upsert(entries).await
        }

        async fn insert_missing(&self, entries: &[(String, String)]) -> Result<Vec<Setting>, StoreError> {
            self.inner.insert_missing(entries).await
        }
    }

    #[tokio::test]
    async fn ensure_keeps_a_value_saved_after_keys_were_read() {
        let inner = Arc::new(MemorySettingsStore::new());
        inner
            .upsert(&[(keys::HERO_HEADLINE.to_string(), "Saved meanwhile".to_string())])
            .await
            .unwrap();
        let service = SettingsService::new(Arc::new(LaggingKeys {
            inner: inner.clone(),
            snapshot: Vec::new(),
        }));

        let outcome = service.ensure_settings(&owner()).await;
        assert_eq!(outcome.ensured, DEFAULT_SETTINGS.len() - 1);
        assert_eq!(
            inner.get(keys::HERO_HEADLINE).await.unwrap().unwrap().value,
            "Saved meanwhile"
        );
    }

    #[tokio::test]
    async fn ensure_does_nothing_for_visitors() {
        let store = Arc::new(MemorySettingsStore::new());
        let service = SettingsService::new(store.clone());
        let visitor = OwnerCheck {
            is_owner: false,
            user_id: None,
            error: Some("nope".into()),
        };
        assert_eq!(service.ensure_settings(&visitor).await.ensured, 0);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn update_rejects_invalid_structured_json() {
        let store = Arc::new(MemorySettingsStore::new());
        let service = SettingsService::new(store.clone());
        let update = SettingsUpdate::Single {
            key: keys::EXPERIENCE_JSON.into(),
            value: "[{".into(),
        };
        assert!(matches!(service.update(&update).await, Err(SettingsError::Validation(_))));
        assert_eq!(store.write_count(), 0);
    }
}
