use anyhow::{bail, Context, Result};

/// Which implementations back the platform service context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// S3 / MinIO for files, Redis for key-value data.
    Remote,
    /// Process-local storage. Everything is lost on restart.
    Memory,
}

/// Credentials and endpoints only needed by the remote backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub remote: Option<RemoteConfig>,
    pub kv_namespace: String,
    pub anthropic_api_key: String,
    /// Bearer tokens accepted by the auth gate. Empty means the API runs open.
    pub auth_tokens: Vec<String>,
    pub pdftoppm_path: Option<String>,
    pub raster_dpi: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let backend = parse_backend(&optional_env("PLATFORM_BACKEND").unwrap_or_default())?;
        let remote = match backend {
            Backend::Remote => Some(RemoteConfig {
                redis_url: require_env("REDIS_URL")?,
                s3_bucket: require_env("S3_BUCKET")?,
                s3_endpoint: require_env("S3_ENDPOINT")?,
                aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            Backend::Memory => None,
        };

        Ok(Config {
            backend,
            remote,
            kv_namespace: optional_env("KV_NAMESPACE").unwrap_or_else(|| "hireflow".to_string()),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            auth_tokens: parse_tokens(&optional_env("AUTH_TOKENS").unwrap_or_default()),
            pdftoppm_path: optional_env("PDFTOPPM_PATH"),
            raster_dpi: optional_env("RASTER_DPI")
                .unwrap_or_else(|| "150".to_string())
                .parse::<u32>()
                .context("RASTER_DPI must be a positive integer")?,
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_backend(raw: &str) -> Result<Backend> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "remote" => Ok(Backend::Remote),
        "memory" => Ok(Backend::Memory),
        other => bail!("PLATFORM_BACKEND must be 'remote' or 'memory', got '{other}'"),
    }
}

fn parse_tokens(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
