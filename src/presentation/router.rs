use crate::presentation::dto::post_dto::HealthStatus;
use crate::presentation::handlers::post_handler;
use crate::presentation::http;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::time::Duration;

pub const SERVICE_NAME: &str = "post-feed";

pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/v1/posts",
            get(post_handler::get_feed).post(post_handler::create_post),
        )
        .route("/v1/posts/:post_id", get(post_handler::get_post))
        .route("/v1/posts/:post_id/like", post(post_handler::like_post))
        .route("/v1/posts/:post_id/unlike", post(post_handler::unlike_post))
        .route(
            "/v1/posts/:post_id/comments",
            post(post_handler::comment_post),
        )
        .route("/v1/posts/:post_id/share", post(post_handler::share_post))
        .with_state(state);

    http::apply_standard_layers(router, SERVICE_NAME, request_timeout)
}

async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.read_all().await {
        Ok(_) => (StatusCode::OK, Json(HealthStatus { status: "ok".into() })),
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: "unavailable".into(),
                }),
            )
        }
    }
}
