//! Chat backends for the conversational mode.
//!
//! Every vendor implements `ChatBackend`: the daily context roles go first, then the
//! user's turn. `chat` returns the full reply; `chat_stream` yields text deltas as the
//! vendor produces them.
//!
//! LLM_PROVIDER selects the vendor ("gemini" by default, or "openai"). Without the
//! matching API key no backend is built and chat endpoints report unavailability.

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::context::DailyContext;

pub mod gemini;
pub mod openai;

pub use gemini::Gemini;
pub use openai::OpenAI;

#[derive(Debug, Error)]
pub enum LlmError {
  #[error("HTTP request failed: {0}")]
  Http(String),

  #[error("{vendor} HTTP {status}: {message}")]
  Api { vendor: &'static str, status: u16, message: String },

  #[error("response parse error: {0}")]
  Parse(String),

  #[error("no chat backend configured: {0}")]
  NotConfigured(String),
}

impl From<reqwest::Error> for LlmError {
  fn from(e: reqwest::Error) -> Self {
    LlmError::Http(e.to_string())
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChatOptions {
  pub temperature: f32,
  pub max_tokens: u32,
}

impl Default for ChatOptions {
  fn default() -> Self {
    Self { temperature: 0.3, max_tokens: 512 }
  }
}

pub type TextStream = BoxStream<'static, Result<String, LlmError>>;

#[async_trait]
pub trait ChatBackend: Send + Sync {
  /// Vendor name for logs.
  fn name(&self) -> &str;

  async fn chat(&self, context: &DailyContext, user_input: &str, options: &ChatOptions) -> Result<String, LlmError>;

  async fn chat_stream(
    &self,
    context: &DailyContext,
    user_input: &str,
    options: &ChatOptions,
  ) -> Result<TextStream, LlmError>;
}

/// Build the backend named by LLM_PROVIDER, if its credentials are present.
pub fn backend_from_env() -> Option<Arc<dyn ChatBackend>> {
  let provider = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "gemini".into()).to_lowercase();
  let backend: Option<Arc<dyn ChatBackend>> = match provider.as_str() {
    "openai" => OpenAI::from_env().map(|c| Arc::new(c) as Arc<dyn ChatBackend>),
    "gemini" => Gemini::from_env().map(|c| Arc::new(c) as Arc<dyn ChatBackend>),
    other => {
      warn!(target: "reasoning_chatbot", provider = %other, "Unknown LLM_PROVIDER; chat disabled");
      None
    }
  };
  match &backend {
    Some(b) => info!(target: "reasoning_chatbot", provider = %b.name(), "Chat backend enabled."),
    None => info!(target: "reasoning_chatbot", %provider, "Chat backend disabled (missing API key)."),
  }
  backend
}

pub(crate) fn timeout_from_env() -> std::time::Duration {
  let secs = std::env::var("LLM_TIMEOUT_SECS").ok().and_then(|s| s.parse::<u64>().ok()).unwrap_or(20);
  std::time::Duration::from_secs(secs)
}

/// Try to extract a clean error message from a vendor error body.
/// OpenAI and Gemini both use `{"error": {"message": ...}}`.
pub(crate) fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

/// Fail with a readable message on non-2xx responses.
pub(crate) async fn check_status(vendor: &'static str, res: reqwest::Response) -> Result<reqwest::Response, LlmError> {
  if res.status().is_success() {
    return Ok(res);
  }
  let status = res.status().as_u16();
  let body = res.text().await.unwrap_or_default();
  let message = extract_api_error(&body).unwrap_or(body);
  Err(LlmError::Api { vendor, status, message })
}

/// Split a byte stream into text lines (without the trailing `\n`/`\r\n`).
/// A final unterminated line is still emitted.
pub(crate) fn line_stream<S, B, E>(bytes: S) -> BoxStream<'static, Result<String, LlmError>>
where
  S: Stream<Item = Result<B, E>> + Send + 'static,
  B: AsRef<[u8]> + Send + 'static,
  E: Display + Send + 'static,
{
  let bytes = bytes.boxed();
  stream::unfold((bytes, Vec::<u8>::new(), false), |(mut bytes, mut buf, mut done)| async move {
    loop {
      if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
        let rest = buf.split_off(pos + 1);
        let line = String::from_utf8_lossy(&buf).trim_end_matches(['\n', '\r']).to_string();
        return Some((Ok(line), (bytes, rest, done)));
      }
      if done {
        if buf.is_empty() {
          return None;
        }
        let line = String::from_utf8_lossy(&buf).trim_end_matches('\r').to_string();
        return Some((Ok(line), (bytes, Vec::new(), done)));
      }
      match bytes.next().await {
        Some(Ok(chunk)) => buf.extend_from_slice(chunk.as_ref()),
        Some(Err(e)) => {
          done = true;
          return Some((Err(LlmError::Http(e.to_string())), (bytes, buf, done)));
        }
        None => done = true,
      }
    }
  })
  .boxed()
}
