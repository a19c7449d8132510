//! Key-value collaborator holding the serialized resume records.

use std::collections::BTreeMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("key-value backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for KvError {
    fn from(e: redis::RedisError) -> Self {
        KvError::Backend(e.to_string())
    }
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;
    /// Keys matching `pattern`. Only a trailing `*` wildcard is supported.
    async fn list(&self, pattern: &str) -> Result<Vec<String>, KvError>;
    /// Removes every key in this store's namespace.
    async fn flush(&self) -> Result<(), KvError>;
}

fn matches_pattern(key: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Redis
// ────────────────────────────────────────────────────────────────────────────

/// Redis-backed store. Every key is prefixed with `<namespace>:` so a flush
/// never touches data owned by other applications on the same server.
pub struct RedisKv {
    client: redis::Client,
    namespace: String,
}

impl RedisKv {
    pub fn new(client: redis::Client, namespace: String) -> Self {
        Self { client, namespace }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>, KvError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let mut iter: redis::AsyncIter<String> = conn.scan_match(self.namespaced(pattern)).await?;
        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }
}

#[async_trait]
impl KvStore for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn.get(self.namespaced(key)).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(self.namespaced(key), value).await?;
        Ok(())
    }

    async fn list(&self, pattern: &str) -> Result<Vec<String>, KvError> {
        let prefix = self.namespaced("");
        let mut keys: Vec<String> = self
            .scan(pattern)
            .await?
            .into_iter()
            .filter_map(|k| k.strip_prefix(&prefix).map(String::from))
            .collect();
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn flush(&self) -> Result<(), KvError> {
        let keys = self.scan("*").await?;
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(&keys).await?;
        info!("Flushed {} keys from namespace '{}'", keys.len(), self.namespace);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryKv {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn list(&self, pattern: &str) -> Result<Vec<String>, KvError> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|k| matches_pattern(k, pattern))
            .cloned()
            .collect())
    }

    async fn flush(&self) -> Result<(), KvError> {
        self.entries.write().await.clear();
        Ok(())
    }
}
