//! Public object bucket holding uploaded site assets.

pub mod http;
pub mod memory;

use async_trait::async_trait;

pub use http::HttpObjectStorage;
pub use memory::MemoryObjectStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object storage is not configured")]
    NotConfigured,

    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Object storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid storage URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unexpected storage response ({status}): {body}")]
    Unexpected { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketOptions {
    pub public: bool,
    pub file_size_limit: u64,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError>;

    async fn create_bucket(&self, bucket: &str, options: &BucketOptions) -> Result<(), StorageError>;

    /// Store `bytes` under `key`. With `upsert == false` an existing key is an error.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError>;

    /// Public URL of an object, if the backend can produce one.
    fn public_url(&self, bucket: &str, key: &str) -> Option<String>;
}

/// Stand-in when no storage backend is configured; every call fails.
pub struct DisabledStorage;

#[async_trait]
impl ObjectStorage for DisabledStorage {
    async fn bucket_exists(&self, _bucket: &str) -> Result<bool, StorageError> {
        Err(StorageError::NotConfigured)
    }

    async fn create_bucket(&self, _bucket: &str, _options: &BucketOptions) -> Result<(), StorageError> {
        Err(StorageError::NotConfigured)
    }

    async fn upload(
        &self,
        _bucket: &str,
        _key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
        _upsert: bool,
    ) -> Result<(), StorageError> {
        Err(StorageError::NotConfigured)
    }

    fn public_url(&self, _bucket: &str, _key: &str) -> Option<String> {
        None
    }
}
