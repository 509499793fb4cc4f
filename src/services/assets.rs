use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::storage::{BucketOptions, ObjectStorage, StorageError};

pub const DEFAULT_FOLDER: &str = "uploads";
pub const DEFAULT_FILE_NAME: &str = "image";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("File exceeds the {limit} byte limit ({size} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("Invalid folder: {0}")]
    InvalidFolder(String),

    #[error("Failed to initialize storage bucket: {0}")]
    Bucket(StorageError),

    #[error("Upload failed: {0}")]
    Upload(StorageError),

    #[error("Failed to get public URL")]
    PublicUrl,
}

/// One file pulled out of an upload form.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAsset {
    pub url: String,
    pub path: String,
}

/// Replace everything outside `[A-Za-z0-9_.-]` with `_`.
pub fn sanitize_file_name(name: Option<&str>) -> String {
    let sanitized: String = name
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        sanitized
    }
}

/// Sanitize each `/`-separated segment; traversal segments are an error.
pub fn sanitize_folder(folder: Option<&str>) -> Result<String, AssetError> {
    let raw = folder.map(|f| f.trim().trim_matches('/')).unwrap_or_default();
    if raw.is_empty() {
        return Ok(DEFAULT_FOLDER.to_string());
    }

    let mut segments = Vec::new();
    for segment in raw.split('/').filter(|s| !s.is_empty()) {
        if segment == ".." || segment == "." {
            return Err(AssetError::InvalidFolder(raw.to_string()));
        }
        segments.push(sanitize_file_name(Some(segment)));
    }
    Ok(segments.join("/"))
}

pub struct AssetService {
    storage: Arc<dyn ObjectStorage>,
    bucket: String,
    file_size_limit: u64,
}

impl AssetService {
    pub fn new(storage: Arc<dyn ObjectStorage>, bucket: impl Into<String>, file_size_limit: u64) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
            file_size_limit,
        }
    }

    /// Create the public bucket on first use.
    async fn ensure_bucket(&self) -> Result<(), AssetError> {
        if self.storage.bucket_exists(&self.bucket).await.map_err(AssetError::Bucket)? {
            return Ok(());
        }

        let options = BucketOptions {
            public: true,
            file_size_limit: self.file_size_limit,
        };
        match self.storage.create_bucket(&self.bucket, &options).await {
            Ok(()) => Ok(()),
            // Another request may have created it in between.
            Err(e) => match self.storage.bucket_exists(&self.bucket).await {
                Ok(true) => Ok(()),
                _ => Err(AssetError::Bucket(e)),
            },
        }
    }

    /// Store the file under `{folder}/{uuid}-{name}` without overwriting and
    /// return its public URL and key.
    pub async fn upload(&self, request: UploadRequest) -> Result<StoredAsset, AssetError> {
        let size = request.bytes.len() as u64;
        if size > self.file_size_limit {
            return Err(AssetError::TooLarge {
                size,
                limit: self.file_size_limit,
            });
        }

        let folder = sanitize_folder(request.folder.as_deref())?;
        let name = sanitize_file_name(request.file_name.as_deref());
        let path = format!("{}/{}-{}", folder, Uuid::new_v4(), name);
        let content_type = request
            .content_type
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        self.ensure_bucket().await?;

        self.storage
            .upload(&self.bucket, &path, request.bytes, &content_type, false)
            .await
            .map_err(AssetError::Upload)?;

        let url = self
            .storage
            .public_url(&self.bucket, &path)
            .ok_or(AssetError::PublicUrl)?;

        tracing::info!("Uploaded asset {} ({} bytes)", path, size);
        Ok(StoredAsset { url, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStorage;

    fn request(name: &str, folder: Option<&str>) -> UploadRequest {
        UploadRequest {
            file_name: Some(name.to_string()),
            content_type: Some("image/png".into()),
            bytes: vec![1, 2, 3],
            folder: folder.map(str::to_string),
        }
    }

    #[test]
    fn sanitizes_file_names() {
        assert_eq!(sanitize_file_name(Some("my photo (1).png")), "my_photo__1_.png");
        assert_eq!(sanitize_file_name(None), "image");
    }

    #[test]
    fn folders_default_and_reject_traversal() {
        assert_eq!(sanitize_folder(None).unwrap(), "uploads");
        assert_eq!(sanitize_folder(Some("/avatars/2024/")).unwrap(), "avatars/2024");
        assert_eq!(sanitize_folder(Some("my files")).unwrap(), "my_files");
        assert!(matches!(sanitize_folder(Some("../secrets")), Err(AssetError::InvalidFolder(_))));
    }

    #[tokio::test]
    async fn first_upload_creates_public_bucket() {
        let storage = Arc::new(MemoryObjectStorage::default());
        let service = AssetService::new(storage.clone(), "site-assets", 1024);

        let asset = service.upload(request("a b.png", None)).await.unwrap();

        let options = storage.bucket_options("site-assets").await.unwrap();
        assert!(options.public);
        assert_eq!(options.file_size_limit, 1024);

        let (folder, rest) = asset.path.split_once('/').unwrap();
        assert_eq!(folder, "uploads");
        let (id, name) = rest.split_at(36);
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(name, "-a_b.png");
        assert!(asset.url.ends_with(&asset.path));

        let stored = storage.object("site-assets", &asset.path).await.unwrap();
        assert_eq!(stored.content_type, "image/png");
    }

    #[tokio::test]
    async fn oversized_files_never_reach_storage() {
        let storage = Arc::new(MemoryObjectStorage::default());
        let service = AssetService::new(storage.clone(), "site-assets", 2);

        let err = service.upload(request("big.bin", None)).await.unwrap_err();
        assert!(matches!(err, AssetError::TooLarge { size: 3, limit: 2 }));
        assert!(!storage.bucket_exists("site-assets").await.unwrap());
    }

    #[tokio::test]
    async fn missing_content_type_defaults() {
        let storage = Arc::new(MemoryObjectStorage::default());
        let service = AssetService::new(storage.clone(), "site-assets", 1024);
        let mut req = request("x", Some("docs"));
        req.content_type = None;

        let asset = service.upload(req).await.unwrap();
        let stored = storage.object("site-assets", &asset.path).await.unwrap();
        assert_eq!(stored.content_type, DEFAULT_CONTENT_TYPE);
        assert!(asset.path.starts_with("docs/"));
    }
}
