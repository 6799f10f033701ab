pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch},
    Router,
};

use crate::applications::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Intake + lookup share a path: POST takes a job id, GET an application id.
        .route(
            "/api/v1/applications/:id",
            get(handlers::handle_get).post(handlers::handle_submit),
        )
        .route(
            "/api/v1/applications/:id/accept",
            patch(handlers::handle_accept),
        )
        .route(
            "/api/v1/applications/:id/reject",
            patch(handlers::handle_reject).delete(handlers::handle_reject),
        )
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(handlers::handle_list_for_job),
        )
        .route(
            "/api/v1/applicants/:applicant_id/applications",
            get(handlers::handle_list_for_applicant),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
