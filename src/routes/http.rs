//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs input sizes and basic result info.

use std::sync::Arc;

use axum::{
  body::Body,
  extract::State,
  http::{header, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use tracing::{error, info, instrument, warn};

use crate::catalog::ProblemError;
use crate::config::AiFlowGuidance;
use crate::context::ContextError;
use crate::domain::ProblemDefinition;
use crate::llm::{LlmError, TextStream};
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorOut>);

fn api_error(status: StatusCode, detail: impl ToString) -> ApiError {
  (status, Json(ErrorOut { detail: detail.to_string() }))
}

fn chat_error_status(e: &ChatError) -> StatusCode {
  match e {
    ChatError::Llm(LlmError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
    _ => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

fn text_stream(chunks: TextStream) -> Response {
  (
    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
    Body::from_stream(chunks),
  )
    .into_response()
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

/// Merge the daily context with the user's input and return the model reply.
#[instrument(level = "info", skip(state, body), fields(input_len = body.user_input.len()))]
pub async fn http_post_chat(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
  match do_chat(&state, &body.user_input).await {
    Ok(resp) => {
      info!(target: "reasoning_chatbot", out_of_scope = resp.out_of_scope, "HTTP chat answered");
      Ok(Json(resp))
    }
    Err(e) => {
      error!(target: "reasoning_chatbot", error = %e, "HTTP chat failed");
      Err(api_error(chat_error_status(&e), e))
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(input_len = body.user_input.len()))]
pub async fn http_post_chat_stream(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChatRequest>,
) -> Response {
  text_stream(do_chat_stream(&state, &body.user_input).await)
}

#[instrument(level = "info", skip(state, body), fields(input_len = body.user_input.len()))]
pub async fn http_post_solution(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChatRequest>,
) -> Json<SolutionResponse> {
  let resp = do_solution(&state, &body.user_input);
  info!(target: "problem", evaluated = resp.solution_evaluated, status = ?resp.status, "HTTP solution handled");
  Json(resp)
}

#[instrument(level = "info", skip(state, body), fields(input_len = body.user_input.len()))]
pub async fn http_post_solution_stream(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChatRequest>,
) -> Response {
  text_stream(do_solution_stream(&state, &body.user_input))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_problems(State(state): State<Arc<AppState>>) -> Json<Vec<ProblemSummary>> {
  Json(state.problems.list_problems())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_active_problem(State(state): State<Arc<AppState>>) -> Json<Option<ProblemInfo>> {
  Json(state.problems.active_problem_info())
}

#[instrument(level = "info", skip(state), fields(problem_id = %body.problem_id))]
pub async fn http_post_active_problem(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SetActiveIn>,
) -> Result<Json<ProblemDefinition>, ApiError> {
  match state.problems.set_active_problem(&body.problem_id) {
    Ok(p) => {
      info!(target: "problem", id = %p.id, "HTTP active problem set");
      Ok(Json(p.as_ref().clone()))
    }
    Err(e @ ProblemError::NotFound(_)) => {
      warn!(target: "problem", id = %body.problem_id, "HTTP active problem: unknown id");
      Err(api_error(StatusCode::NOT_FOUND, e))
    }
    Err(e) => Err(api_error(StatusCode::BAD_REQUEST, e)),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_ai_flow(State(state): State<Arc<AppState>>) -> Json<AiFlowGuidance> {
  Json(state.ai_flow.clone())
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_context_reload(
  State(state): State<Arc<AppState>>,
) -> Result<Json<ContextReloadOut>, ApiError> {
  match state.context.reload() {
    Ok(ctx) => Ok(Json(ContextReloadOut { ok: true, roles: ctx.roles.len() })),
    Err(e) => {
      error!(target: "reasoning_chatbot", error = %e, "Context reload failed");
      let status = match e {
        ContextError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
      };
      Err(api_error(status, e))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::Request;
  use tower::ServiceExt;

  use crate::config::AppConfig;
  use crate::context::ContextStore;
  use crate::feedback::FeedbackSelector;
  use crate::routes::build_router;

  fn app() -> axum::Router {
    let state = AppState::new(
      AppConfig::default(),
      ContextStore::new("/missing/context.yaml"),
      None,
      FeedbackSelector::seeded(9),
    )
    .unwrap();
    build_router(Arc::new(state))
  }

  fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }

  fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
  }

  async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  #[tokio::test]
  async fn health_ok() {
    let resp = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["ok"], true);
  }

  #[tokio::test]
  async fn solution_is_evaluated() {
    let resp = app()
      .oneshot(json_post("/solution", serde_json::json!({ "user_input": "identify the pattern in this sequence" })))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["solution_evaluated"], true);
    assert_eq!(v["status"], "approved");
    assert!(v["response"].as_str().unwrap().contains("Identify the pattern in the sequence"));
  }

  #[tokio::test]
  async fn solution_stream_matches_info_text() {
    let resp = app()
      .oneshot(json_post("/solution/stream", serde_json::json!({ "user_input": "show problem" })))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    let text = body_text(resp).await;
    assert!(text.starts_with("Current problem: Mathematical Sequence Problem (math_sequence)"));
  }

  #[tokio::test]
  async fn problems_listed_in_order() {
    let resp = app().oneshot(get("/problems")).await.unwrap();
    let v = body_json(resp).await;
    let ids: Vec<_> = v.as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap().to_string()).collect();
    assert_eq!(ids, vec!["math_sequence", "business_strategy", "coding_algorithm", "creative_writing", "scientific_method"]);
  }

  #[tokio::test]
  async fn set_active_problem_and_read_back() {
    let app = app();
    let resp = app
      .clone()
      .oneshot(json_post("/admin/problems/active", serde_json::json!({ "problem_id": "creative_writing" })))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["id"], "creative_writing");

    let v = body_json(app.oneshot(get("/problems/active")).await.unwrap()).await;
    assert_eq!(v["id"], "creative_writing");
    assert_eq!(v["total_steps"], 6);
  }

  #[tokio::test]
  async fn unknown_problem_is_404_and_keeps_active() {
    let app = app();
    let resp = app
      .clone()
      .oneshot(json_post("/admin/problems/active", serde_json::json!({ "problem_id": "nonexistent" })))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["detail"], "Problem nonexistent not found");

    let v = body_json(app.oneshot(get("/problems/active")).await.unwrap()).await;
    assert_eq!(v["id"], "math_sequence");
  }

  #[tokio::test]
  async fn chat_without_context_is_500() {
    let resp = app().oneshot(json_post("/chat", serde_json::json!({ "user_input": "hello" }))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(resp).await["detail"].as_str().unwrap().contains("Context file not found"));
  }

  #[tokio::test]
  async fn chat_stream_reports_error_chunk() {
    let resp = app().oneshot(json_post("/chat/stream", serde_json::json!({ "user_input": "hello" }))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.starts_with("[ERROR] "));
  }

  #[tokio::test]
  async fn ai_flow_guidance_is_served() {
    let v = body_json(app().oneshot(get("/admin/ai-flow")).await.unwrap()).await;
    assert!(v["suggestion_types"]["hint"].is_string());
  }

  #[tokio::test]
  async fn context_reload_without_file_is_404() {
    let resp = app().oneshot(json_post("/admin/context/reload", serde_json::json!({}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
