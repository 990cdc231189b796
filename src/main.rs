//! Reasoning Chatbot · Backend
//!
//! - Axum HTTP API: LLM chat merged with a daily context, plus keyword-based
//!   solution evaluation against one globally active problem
//! - OpenAI or Gemini chat backends (via environment variables)
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   PROBLEMS_CONFIG_PATH : TOML problem bank (custom problems + AI flow guidance)
//!   CONTEXT_PATH         : daily context file (.yaml/.yml/.json/.toml, default ./context.yaml)
//!   LLM_PROVIDER         : "gemini" (default) or "openai"
//!   OPENAI_API_KEY       : enables the OpenAI backend
//!   OPENAI_BASE_URL      : default "https://api.openai.com/v1"
//!   OPENAI_MODEL         : default "gpt-4o"
//!   GEMINI_API_KEY       : enables the Gemini backend
//!   GEMINI_API_URL       : generateContent URL (default gemini-1.5-flash)
//!   LLM_TIMEOUT_SECS     : upstream request timeout (default 20)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod catalog;
mod config;
mod context;
mod domain;
mod evaluator;
mod feedback;
mod llm;
mod logic;
mod protocol;
mod routes;
mod scoring;
mod seeds;
mod session;
mod state;
mod telemetry;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Catalog, active problem, context store and chat backend. Bad problem config is fatal.
  let state = match AppState::from_env() {
    Ok(s) => Arc::new(s),
    Err(e) => {
      error!(target: "reasoning_chatbot", error = %e, "Configuration error; refusing to start");
      return Err(e.into());
    }
  };

  let app = build_router(state);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "reasoning_chatbot", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!(target: "reasoning_chatbot", error = %e, "Failed to listen for shutdown signal");
  }
  info!(target: "reasoning_chatbot", "Shutdown signal received");
}
