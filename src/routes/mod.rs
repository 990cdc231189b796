//! Router assembly: chat and solution endpoints, problem admin, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - chat (`/chat`, `/chat/stream`) and solution evaluation (`/solution`, `/solution/stream`)
/// - problem queries under `/problems` and admin operations under `/admin`
/// - CORS (allow any origin/method/headers) so the widget can be embedded anywhere
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(http::http_health))
        .route("/chat", post(http::http_post_chat))
        .route("/chat/stream", post(http::http_post_chat_stream))
        .route("/solution", post(http::http_post_solution))
        .route("/solution/stream", post(http::http_post_solution_stream))
        .route("/problems", get(http::http_get_problems))
        .route("/problems/active", get(http::http_get_active_problem))
        .route("/admin/problems/active", post(http::http_post_active_problem))
        .route("/admin/ai-flow", get(http::http_get_ai_flow))
        .route("/admin/context/reload", post(http::http_post_context_reload))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
