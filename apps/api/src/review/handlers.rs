//! Axum route handlers for the review screen and stored blobs.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::errors::AppError;
use crate::review::loader::{content_type_for, list_records, load_review, ResumeListItem, ReviewPage};
use crate::state::AppState;

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeListItem>>, AppError> {
    Ok(Json(list_records(&state.platform).await?))
}

/// GET /api/v1/resumes/:id
///
/// Returns `null` when the record or one of its files is missing.
pub async fn handle_get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<ReviewPage>>, AppError> {
    Ok(Json(load_review(&state.platform, &id).await?))
}

/// GET /api/v1/files/*path
pub async fn handle_get_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let path = path.trim_start_matches('/').to_string();
    let bytes = state.platform.fs.read(&path).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(&path))], bytes))
}
