use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use url::Url;

use super::{BucketOptions, ObjectStorage, StorageError};

/// Hosted storage REST API, authenticated with the privileged service key.
pub struct HttpObjectStorage {
    client: reqwest::Client,
    base_url: Url,
    service_key: String,
}

impl HttpObjectStorage {
    pub fn new(base_url: &str, service_key: impl Into<String>) -> Result<Self, StorageError> {
        // Trailing slash so `join` appends instead of replacing the last segment.
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: Url::parse(&base)?,
            service_key: service_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, StorageError> {
        Ok(self.base_url.join(&format!("storage/v1/{}", path))?)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError> {
        let response = self
            .authorized(self.client.get(self.endpoint(&format!("bucket/{}", bucket))?))
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(true),
            // The storage API answers a missing bucket with 400 or 404 depending on version.
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(false),
            status => Err(StorageError::Unexpected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn create_bucket(&self, bucket: &str, options: &BucketOptions) -> Result<(), StorageError> {
        let response = self
            .authorized(self.client.post(self.endpoint("bucket")?))
            .json(&json!({
                "id": bucket,
                "name": bucket,
                "public": options.public,
                "file_size_limit": options.file_size_limit,
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("Created storage bucket '{}'", bucket);
            return Ok(());
        }
        Err(StorageError::Unexpected {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        let response = self
            .authorized(self.client.post(self.endpoint(&format!("object/{}/{}", bucket, key))?))
            .header("content-type", content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(StorageError::AlreadyExists(key.to_string())),
            status => Err(StorageError::Unexpected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    fn public_url(&self, bucket: &str, key: &str) -> Option<String> {
        self.endpoint(&format!("object/public/{}/{}", bucket, key))
            .ok()
            .map(String::from)
    }
}
