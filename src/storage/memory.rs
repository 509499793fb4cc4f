use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BucketOptions, ObjectStorage, StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
struct Bucket {
    options: Option<BucketOptions>,
    objects: BTreeMap<String, StoredObject>,
}

/// Bucket store kept in memory; public URLs are rooted at `base_url`.
pub struct MemoryObjectStorage {
    base_url: String,
    buckets: RwLock<HashMap<String, Bucket>>,
}

impl MemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            buckets: RwLock::new(HashMap::new()),
        }
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .and_then(|b| b.objects.get(key).cloned())
    }

    pub async fn object_keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .map(|b| b.objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn bucket_options(&self, bucket: &str) -> Option<BucketOptions> {
        self.buckets.read().await.get(bucket).and_then(|b| b.options.clone())
    }
}

impl Default for MemoryObjectStorage {
    fn default() -> Self {
        Self::new("http://localhost:3000/storage")
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError> {
        Ok(self.buckets.read().await.contains_key(bucket))
    }

    async fn create_bucket(&self, bucket: &str, options: &BucketOptions) -> Result<(), StorageError> {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default()
            .options = Some(options.clone());
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().await;
        let bucket = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;

        if !upsert && bucket.objects.contains_key(key) {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        bucket.objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> Option<String> {
        Some(format!("{}/{}/{}", self.base_url, bucket, key))
    }
}
