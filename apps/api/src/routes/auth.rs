use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// Gate for every `/api/v1` route. Resolves the bearer token into a
/// `Session` request extension or answers 401 with a login redirect.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());

    match state.platform.auth.session(token.as_deref()).await {
        Some(session) => {
            request.extensions_mut().insert(session);
            Ok(next.run(request).await)
        }
        None => {
            let path = request.uri().path().to_string();
            warn!("Unauthenticated request to {path}");
            Err(AppError::Unauthorized {
                redirect: format!("/auth?next={path}"),
            })
        }
    }
}
