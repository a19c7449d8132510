use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::platform::{KvError, Platform, StorageError};

/// Directory enumerated by the clear: the storage root.
const STORAGE_ROOT: &str = "./";

#[derive(Debug, Error)]
pub enum ClearError {
    #[error("listing stored files failed: {0}")]
    List(#[source] StorageError),

    #[error("deleting {path} failed: {source}")]
    Delete {
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("flushing key-value data failed: {0}")]
    Flush(#[source] KvError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearReport {
    pub deleted_files: usize,
    /// The client should reload to show the empty state.
    pub reload: bool,
}

/// Deletes every stored file one by one, then flushes the key-value store.
///
/// Stops at the first failing delete; later files are left in place and
/// the key-value store is not flushed.
pub async fn clear_all_data(platform: &Platform) -> Result<ClearReport, ClearError> {
    let files = platform
        .fs
        .read_dir(STORAGE_ROOT)
        .await
        .map_err(ClearError::List)?;

    for file in &files {
        platform
            .fs
            .delete(&file.path)
            .await
            .map_err(|source| ClearError::Delete {
                path: file.path.clone(),
                source,
            })?;
    }

    platform.kv.flush().await.map_err(ClearError::Flush)?;

    info!("Cleared {} stored files and all key-value data", files.len());
    Ok(ClearReport {
        deleted_files: files.len(),
        reload: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::{pdf, test_platform, FlakyStorage};

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let t = test_platform().build();
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            t.platform.fs.upload(&pdf(name)).await.unwrap();
        }
        t.platform.kv.set("resume:1", "{}").await.unwrap();

        let report = clear_all_data(&t.platform).await.unwrap();

        assert_eq!(report, ClearReport { deleted_files: 3, reload: true });
        assert!(t.platform.fs.read_dir("./").await.unwrap().is_empty());
        assert!(t.platform.kv.list("*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_of_empty_store_succeeds() {
        let t = test_platform().build();
        let report = clear_all_data(&t.platform).await.unwrap();
        assert_eq!(report.deleted_files, 0);
    }

    #[tokio::test]
    async fn test_failed_delete_stops_and_keeps_kv() {
        let t = test_platform().build();
        let mut paths = Vec::new();
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            paths.push(t.platform.fs.upload(&pdf(name)).await.unwrap().path);
        }
        paths.sort();
        t.fs.fail_delete_of.lock().unwrap().insert(paths[1].clone());
        t.platform.kv.set("resume:1", "{}").await.unwrap();

        let err = clear_all_data(&t.platform).await.unwrap_err();

        assert!(matches!(err, ClearError::Delete { ref path, .. } if *path == paths[1]));
        assert_eq!(*t.fs.deletes_attempted.lock().unwrap(), paths[..2].to_vec());
        assert_eq!(t.platform.fs.read_dir("./").await.unwrap().len(), 2);
        assert_eq!(t.platform.kv.list("*").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_is_reported() {
        let storage = FlakyStorage {
            fail_read_dir: true,
            ..Default::default()
        };
        let t = test_platform().storage(storage).build();
        assert!(matches!(
            clear_all_data(&t.platform).await,
            Err(ClearError::List(_))
        ));
    }
}
