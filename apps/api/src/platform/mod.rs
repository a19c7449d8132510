//! The external platform as an explicitly constructed service context.
//!
//! Handlers and the workflow receive a `Platform` and never reach for a
//! global client. Each collaborator sits behind a trait so the remote
//! services, the in-memory backend and test fakes are interchangeable.

pub mod auth;
pub mod ids;
pub mod kv;
pub mod raster;
pub mod storage;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tracing::{info, warn};

use crate::config::{Backend, Config, RemoteConfig};
use crate::llm_client::{self, AnthropicFeedback, FeedbackService};

pub use auth::{AuthService, Session, TokenAuth};
pub use ids::{IdGenerator, UuidIds};
pub use kv::{KvError, KvStore, MemoryKv, RedisKv};
pub use raster::{PdfRasterizer, Pdftoppm, RasterError};
pub use storage::{DirEntry, FileStorage, MemoryStorage, S3Storage, StorageError, StoredFile};

#[derive(Clone)]
pub struct Platform {
    pub auth: Arc<dyn AuthService>,
    pub fs: Arc<dyn FileStorage>,
    pub kv: Arc<dyn KvStore>,
    pub ai: Arc<dyn FeedbackService>,
    pub raster: Arc<dyn PdfRasterizer>,
    pub ids: Arc<dyn IdGenerator>,
}

impl Platform {
    /// Wires the configured backend.
    pub async fn connect(config: &Config) -> Result<Self> {
        let (fs, kv): (Arc<dyn FileStorage>, Arc<dyn KvStore>) = match (config.backend, &config.remote) {
            (Backend::Remote, Some(remote)) => {
                let redis = redis::Client::open(remote.redis_url.clone())
                    .context("Invalid REDIS_URL")?;
                info!("Redis client initialized (namespace: {})", config.kv_namespace);

                let s3 = build_s3_client(remote).await;
                info!("S3 client initialized (bucket: {})", remote.s3_bucket);

                (
                    Arc::new(S3Storage::new(s3, remote.s3_bucket.clone())),
                    Arc::new(RedisKv::new(redis, config.kv_namespace.clone())),
                )
            }
            (Backend::Remote, None) => anyhow::bail!("remote backend selected without remote settings"),
            (Backend::Memory, _) => {
                warn!("Using in-memory storage; all data is lost on restart");
                (Arc::new(MemoryStorage::new()), Arc::new(MemoryKv::new()))
            }
        };

        let auth = TokenAuth::new(&config.auth_tokens);
        if auth.is_open() {
            warn!("AUTH_TOKENS is empty; the API accepts unauthenticated requests");
        }

        let ai = AnthropicFeedback::new(config.anthropic_api_key.clone(), fs.clone())
            .context("Failed to build HTTP client")?;
        info!("AI feedback client initialized (model: {})", llm_client::MODEL);

        Ok(Self {
            auth: Arc::new(auth),
            fs,
            kv,
            ai: Arc::new(ai),
            raster: Arc::new(Pdftoppm::new(config.pdftoppm_path.as_deref(), config.raster_dpi)),
            ids: Arc::new(UuidIds),
        })
    }
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(remote: &RemoteConfig) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &remote.aws_access_key_id,
        &remote.aws_secret_access_key,
        None,
        None,
        "hireflow-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&remote.s3_endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
