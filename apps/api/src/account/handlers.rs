//! Axum route handlers for the navigation bar actions.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use crate::account::{clear_all_data, ClearReport};
use crate::errors::AppError;
use crate::platform::Session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    #[serde(default)]
    pub confirm: bool,
}

/// DELETE /api/v1/data
///
/// Requires `{"confirm": true}`; anything else is refused before touching
/// storage.
pub async fn handle_clear_data(
    State(state): State<AppState>,
    request: Option<Json<ClearRequest>>,
) -> Result<Json<ClearReport>, AppError> {
    let confirmed = request.map(|Json(r)| r.confirm).unwrap_or(false);
    if !confirmed {
        return Err(AppError::Validation(
            "Clearing all data requires explicit confirmation".to_string(),
        ));
    }
    Ok(Json(clear_all_data(&state.platform).await?))
}

/// POST /api/v1/auth/sign-out
pub async fn handle_sign_out(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> StatusCode {
    state.platform.auth.sign_out(&session).await;
    StatusCode::NO_CONTENT
}
