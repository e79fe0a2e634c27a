use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Error)]
pub enum PhotoStoreError {
    #[error("empty upload")]
    Empty,
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("invalid public id: {0}")]
    InvalidId(String),
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUploadResult {
    pub public_id: String,
    pub url: String,
}

/// Where uploaded photos live. The app only needs upload and delete.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn upload(&self, upload: PhotoUpload) -> Result<PhotoUploadResult, PhotoStoreError>;
    async fn delete(&self, public_id: &str) -> Result<(), PhotoStoreError>;
}

/// Stores photos on the local disk; files are served under `public_base`.
pub struct LocalPhotoStore {
    root: PathBuf,
    public_base: String,
}

impl LocalPhotoStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }
}

fn extension_for(upload: &PhotoUpload) -> Result<String, PhotoStoreError> {
    let from_name = Path::new(&upload.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let from_type = upload
        .content_type
        .as_deref()
        .and_then(|t| t.strip_prefix("image/"))
        .map(str::to_ascii_lowercase);

    from_name
        .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
        .or_else(|| from_type.filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str())))
        .ok_or_else(|| PhotoStoreError::UnsupportedType(upload.file_name.clone()))
}

fn is_safe_public_id(public_id: &str) -> bool {
    !public_id.is_empty()
        && public_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        && !public_id.starts_with('.')
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn upload(&self, upload: PhotoUpload) -> Result<PhotoUploadResult, PhotoStoreError> {
        if upload.bytes.is_empty() {
            return Err(PhotoStoreError::Empty);
        }
        let ext = extension_for(&upload)?;
        let public_id = format!("{}.{}", Uuid::new_v4(), ext);

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&public_id), &upload.bytes).await?;
        debug!(public_id = %public_id, size = upload.bytes.len(), "photo stored");

        Ok(PhotoUploadResult {
            url: format!("{}/{}", self.public_base, public_id),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), PhotoStoreError> {
        if !is_safe_public_id(public_id) {
            return Err(PhotoStoreError::InvalidId(public_id.to_string()));
        }
        match tokio::fs::remove_file(self.root.join(public_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(public_id, "photo file already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, bytes: &[u8]) -> PhotoUpload {
        PhotoUpload {
            file_name: name.to_string(),
            content_type: None,
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn upload_writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path(), "/uploads/");

        let result = store.upload(upload("me.PNG", b"pixels")).await.unwrap();

        assert!(result.public_id.ends_with(".png"));
        assert_eq!(result.url, format!("/uploads/{}", result.public_id));
        let written = std::fs::read(dir.path().join(&result.public_id)).unwrap();
        assert_eq!(written, b"pixels");
    }

    #[tokio::test]
    async fn rejects_empty_and_non_image_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path(), "/uploads");

        assert!(matches!(
            store.upload(upload("me.png", b"")).await,
            Err(PhotoStoreError::Empty)
        ));
        assert!(matches!(
            store.upload(upload("notes.txt", b"text")).await,
            Err(PhotoStoreError::UnsupportedType(_))
        ));
    }

    #[tokio::test]
    async fn content_type_is_used_when_name_has_no_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path(), "/uploads");
        let mut file = upload("blob", b"x");
        file.content_type = Some("image/jpeg".into());

        let result = store.upload(file).await.unwrap();
        assert!(result.public_id.ends_with(".jpeg"));
    }

    #[tokio::test]
    async fn delete_removes_file_and_refuses_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path(), "/uploads");
        let result = store.upload(upload("a.gif", b"gif")).await.unwrap();

        store.delete(&result.public_id).await.unwrap();
        assert!(!dir.path().join(&result.public_id).exists());
        store.delete(&result.public_id).await.unwrap();

        assert!(matches!(
            store.delete("../secret").await,
            Err(PhotoStoreError::InvalidId(_))
        ));
    }
}
