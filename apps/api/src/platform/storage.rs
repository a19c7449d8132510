//! File storage collaborator: uploads, reads, deletes and lists blobs.
//!
//! Paths are flat keys at the storage root (`<short-id>-<name>`), so
//! `read_dir("./")` sees every file this service has written.

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::FileHandle;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Handle returned by a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub path: String,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub path: String,
    pub size: u64,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn upload(&self, file: &FileHandle) -> Result<StoredFile, StorageError>;
    async fn read(&self, path: &str) -> Result<Bytes, StorageError>;
    /// Size of a stored file without fetching its contents.
    async fn stat(&self, path: &str) -> Result<DirEntry, StorageError>;
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, StorageError>;
}

/// Builds a fresh storage key for an uploaded file.
pub fn storage_key(name: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", &id[..12], sanitize_name(name))
}

fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Maps a directory argument to a key prefix. The root has no prefix.
fn dir_prefix(path: &str) -> String {
    let trimmed = path.trim_start_matches("./").trim_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// S3 / MinIO
// ────────────────────────────────────────────────────────────────────────────

pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl FileStorage for S3Storage {
    async fn upload(&self, file: &FileHandle) -> Result<StoredFile, StorageError> {
        let key = storage_key(&file.name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.bytes.clone()))
            .content_type(&file.content_type)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 upload failed: {e}")))?;

        info!("Uploaded {} to s3://{}/{}", file.name, self.bucket, key);
        Ok(StoredFile {
            path: key,
            name: file.name.clone(),
            size: file.size(),
        })
    }

    async fn read(&self, path: &str) -> Result<Bytes, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_no_such_key()) == Some(true) {
                    StorageError::NotFound(path.to_string())
                } else {
                    StorageError::Backend(format!("S3 read failed: {e}"))
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 body read failed: {e}")))?;
        Ok(data.into_bytes())
    }

    async fn stat(&self, path: &str) -> Result<DirEntry, StorageError> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_not_found()) == Some(true) {
                    StorageError::NotFound(path.to_string())
                } else {
                    StorageError::Backend(format!("S3 head failed: {e}"))
                }
            })?;

        Ok(DirEntry {
            path: path.to_string(),
            size: output.content_length().unwrap_or_default().max(0) as u64,
        })
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 delete failed: {e}")))?;
        debug!("Deleted s3://{}/{}", self.bucket, path);
        Ok(())
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, StorageError> {
        let prefix = dir_prefix(path);
        let mut entries = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix)
                .delimiter("/")
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StorageError::Backend(format!("S3 list failed: {e}")))?;

            for object in output.contents() {
                if let Some(key) = object.key() {
                    entries.push(DirEntry {
                        path: key.to_string(),
                        size: object.size().unwrap_or_default().max(0) as u64,
                    });
                }
            }

            match output.next_continuation_token() {
                Some(token) if output.is_truncated() == Some(true) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(entries)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStorage {
    files: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }
}

#[async_trait]
impl FileStorage for MemoryStorage {
    async fn upload(&self, file: &FileHandle) -> Result<StoredFile, StorageError> {
        let key = storage_key(&file.name);
        self.files
            .write()
            .await
            .insert(key.clone(), file.bytes.clone());
        Ok(StoredFile {
            path: key,
            name: file.name.clone(),
            size: file.size(),
        })
    }

    async fn read(&self, path: &str) -> Result<Bytes, StorageError> {
        self.files
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn stat(&self, path: &str) -> Result<DirEntry, StorageError> {
        self.files
            .read()
            .await
            .get(path)
            .map(|bytes| DirEntry {
                path: path.to_string(),
                size: bytes.len() as u64,
            })
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.files
            .write()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, StorageError> {
        let prefix = dir_prefix(path);
        let files = self.files.read().await;
        Ok(files
            .iter()
            .filter_map(|(key, bytes)| {
                let rest = key.strip_prefix(&prefix)?;
                (!rest.contains('/')).then(|| DirEntry {
                    path: key.clone(),
                    size: bytes.len() as u64,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::file::PDF_MIME;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("My CV (final).pdf"), "My_CV__final_.pdf");
        assert_eq!(sanitize_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_name("..."), "file");
    }

    #[test]
    fn test_storage_key_is_unique_and_keeps_name() {
        let a = storage_key("cv.pdf");
        let b = storage_key("cv.pdf");
        assert_ne!(a, b);
        assert!(a.ends_with("-cv.pdf"));
        assert_eq!(a.len(), 12 + 1 + "cv.pdf".len());
    }

    #[test]
    fn test_dir_prefix_root_forms() {
        assert_eq!(dir_prefix("./"), "");
        assert_eq!(dir_prefix("/"), "");
        assert_eq!(dir_prefix("."), "");
        assert_eq!(dir_prefix("exports"), "exports/");
    }

    #[tokio::test]
    async fn test_memory_storage_lifecycle() {
        let storage = MemoryStorage::new();
        let file = FileHandle::new("cv.pdf", PDF_MIME, Bytes::from_static(b"%PDF-1.7"));
        let stored = storage.upload(&file).await.unwrap();
        assert_eq!(stored.size, 8);
        assert_eq!(stored.name, "cv.pdf");

        assert_eq!(storage.read(&stored.path).await.unwrap(), file.bytes);
        assert_eq!(storage.stat(&stored.path).await.unwrap().size, 8);
        let listing = storage.read_dir("./").await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].path, stored.path);

        storage.delete(&stored.path).await.unwrap();
        assert!(matches!(
            storage.read(&stored.path).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(storage.read_dir("./").await.unwrap().is_empty());
        assert!(matches!(
            storage.stat(&stored.path).await,
            Err(StorageError::NotFound(_))
        ));
    }
}
