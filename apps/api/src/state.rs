use crate::platform::Platform;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Auth, file storage, key-value store, AI, rasterizer and id generator.
    pub platform: Platform,
}
