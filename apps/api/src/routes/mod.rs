pub mod auth;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::account::handlers as account;
use crate::analysis::handlers as analysis;
use crate::review::handlers as review;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Upload + home screens
        .route(
            "/api/v1/resumes",
            get(review::handle_list_resumes)
                .post(analysis::handle_analyze)
                .layer(DefaultBodyLimit::max(analysis::UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/v1/uploads/stream",
            post(analysis::handle_analyze_stream)
                .layer(DefaultBodyLimit::max(analysis::UPLOAD_BODY_LIMIT)),
        )
        // Review screen
        .route("/api/v1/resumes/:id", get(review::handle_get_review))
        .route("/api/v1/files/*path", get(review::handle_get_file))
        // Navigation bar
        .route("/api/v1/auth/sign-out", post(account::handle_sign_out))
        .route("/api/v1/data", delete(account::handle_clear_data))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(api)
        .with_state(state)
}
