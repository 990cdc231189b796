//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Chat: merge the daily context, guard out-of-scope questions, call the backend
//!   - Streaming chat: upstream deltas, errors reported inline
//!   - Solutions: the problem orchestrator, complete or as a single chunk

use futures::stream::{self, StreamExt};
use tracing::{error, info, instrument, warn};

use crate::context::ContextError;
use crate::llm::{LlmError, TextStream};
use crate::protocol::{ChatResponse, SolutionResponse};
use crate::state::AppState;

pub const OUT_OF_SCOPE_REPLY: &str = "Out of scope. Please ask about today's topic only.";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
  #[error(transparent)]
  Context(#[from] ContextError),

  #[error(transparent)]
  Llm(#[from] LlmError),
}

#[instrument(level = "info", skip(state, user_input), fields(input_len = user_input.len()))]
pub async fn do_chat(state: &AppState, user_input: &str) -> Result<ChatResponse, ChatError> {
  let context = state.context.get()?;
  let input = user_input.trim();

  if context.is_out_of_scope(input) {
    warn!(target: "reasoning_chatbot", "Chat input rejected as out of scope");
    return Ok(ChatResponse { response: OUT_OF_SCOPE_REPLY.into(), out_of_scope: true });
  }

  let backend = state
    .llm
    .as_ref()
    .ok_or_else(|| LlmError::NotConfigured("set LLM_PROVIDER and its API key".into()))?;

  let response = backend.chat(&context, input, &state.chat_options).await?;
  info!(target: "reasoning_chatbot", provider = %backend.name(), reply_len = response.len(), "Chat answered");
  Ok(ChatResponse { response, out_of_scope: false })
}

/// Chunks for the streaming chat endpoint. Failures become a final `[ERROR] ...` chunk.
#[instrument(level = "info", skip(state, user_input), fields(input_len = user_input.len()))]
pub async fn do_chat_stream(state: &AppState, user_input: &str) -> TextStream {
  let input = user_input.trim();
  let context = match state.context.get() {
    Ok(c) => c,
    Err(e) => return error_chunk(e.to_string()),
  };
  let Some(backend) = state.llm.as_ref() else {
    return error_chunk(LlmError::NotConfigured("set LLM_PROVIDER and its API key".into()).to_string());
  };

  match backend.chat_stream(&context, input, &state.chat_options).await {
    Ok(chunks) => chunks
      .map(|c| match c {
        Ok(text) => Ok(text),
        Err(e) => {
          error!(target: "reasoning_chatbot", error = %e, "Chat stream interrupted");
          Ok(format!("[ERROR] {}", e))
        }
      })
      .boxed(),
    Err(e) => {
      error!(target: "reasoning_chatbot", error = %e, "Chat stream failed to start");
      error_chunk(e.to_string())
    }
  }
}

fn error_chunk(message: String) -> TextStream {
  stream::once(async move { Ok(format!("[ERROR] {}", message)) }).boxed()
}

#[instrument(level = "info", skip(state, user_input), fields(input_len = user_input.len()))]
pub fn do_solution(state: &AppState, user_input: &str) -> SolutionResponse {
  state.problems.handle(user_input.trim()).into_response()
}

/// The orchestrator has no partial output: the whole reply is one chunk.
pub fn do_solution_stream(state: &AppState, user_input: &str) -> TextStream {
  let text = do_solution(state, user_input).response;
  stream::once(async move { Ok(text) }).boxed()
}
