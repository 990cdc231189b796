//! Minimal OpenAI client for the chat mode.
//!
//! We only call chat.completions, either plain or with `stream: true` (SSE).
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::Instant;

use async_trait::async_trait;
use futures::{future, StreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{check_status, line_stream, timeout_from_env, ChatBackend, ChatOptions, LlmError, TextStream};
use crate::context::DailyContext;

const VENDOR: &str = "OpenAI";

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".into());

    let client = reqwest::Client::builder().timeout(timeout_from_env()).build().ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  fn request(&self, context: &DailyContext, user_input: &str, options: &ChatOptions, stream: bool) -> ChatCompletionRequest {
    ChatCompletionRequest {
      model: self.model.clone(),
      messages: build_messages(context, user_input),
      temperature: options.temperature,
      max_tokens: Some(options.max_tokens),
      stream,
    }
  }

  async fn send(&self, req: &ChatCompletionRequest) -> Result<reqwest::Response, LlmError> {
    let url = format!("{}/chat/completions", self.base_url);
    let res = self.client.post(&url)
      .header(USER_AGENT, "reasoning-chatbot/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(req).send().await?;
    check_status(VENDOR, res).await
  }
}

#[async_trait]
impl ChatBackend for OpenAI {
  fn name(&self) -> &str {
    "openai"
  }

  #[instrument(level = "info", skip(self, context, user_input), fields(input_len = user_input.len()))]
  async fn chat(&self, context: &DailyContext, user_input: &str, options: &ChatOptions) -> Result<String, LlmError> {
    let start = Instant::now();
    let res = self.send(&self.request(context, user_input, options, false)).await?;
    let body: ChatCompletionResponse = res.json().await.map_err(|e| LlmError::Parse(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .unwrap_or_default();
    info!(model = %self.model, elapsed = ?start.elapsed(), reply_len = text.len(), "OpenAI reply received");
    Ok(text)
  }

  #[instrument(level = "info", skip(self, context, user_input), fields(input_len = user_input.len()))]
  async fn chat_stream(&self, context: &DailyContext, user_input: &str, options: &ChatOptions) -> Result<TextStream, LlmError> {
    let res = self.send(&self.request(context, user_input, options, true)).await?;
    Ok(sse_deltas(line_stream(res.bytes_stream())))
  }
}

/// System and assistant roles from the context, then the user's turn.
fn build_messages(context: &DailyContext, user_input: &str) -> Vec<ChatMessageReq> {
  let mut messages: Vec<ChatMessageReq> = context
    .roles
    .iter()
    .flat_map(|role| role.iter())
    .filter(|(k, _)| k.as_str() == "system" || k.as_str() == "assistant")
    .map(|(k, v)| ChatMessageReq { role: k.clone(), content: v.clone() })
    .collect();
  messages.push(ChatMessageReq { role: "user".into(), content: user_input.into() });
  messages
}

#[derive(Debug, PartialEq)]
enum SseEvent {
  Delta(String),
  Done,
  Skip,
}

fn parse_sse_line(line: &str) -> SseEvent {
  let Some(data) = line.strip_prefix("data: ") else {
    return SseEvent::Skip;
  };
  let data = data.trim();
  if data == "[DONE]" {
    return SseEvent::Done;
  }
  match serde_json::from_str::<ChatCompletionChunk>(data) {
    Ok(chunk) => chunk
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.delta.content)
      .filter(|t| !t.is_empty())
      .map(SseEvent::Delta)
      .unwrap_or(SseEvent::Skip),
    Err(_) => SseEvent::Skip,
  }
}

/// Content deltas up to `[DONE]`; unparsable lines are skipped.
fn sse_deltas(lines: TextStream) -> TextStream {
  lines
    .map(|line| line.map(|l| parse_sse_line(&l)))
    .take_while(|ev| future::ready(!matches!(ev, Ok(SseEvent::Done))))
    .filter_map(|ev| {
      future::ready(match ev {
        Ok(SseEvent::Delta(text)) => Some(Ok(text)),
        Ok(_) => None,
        Err(e) => Some(Err(e)),
      })
    })
    .boxed()
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
  stream: bool,
}
#[derive(Serialize, Debug, PartialEq)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatCompletionChunk { choices: Vec<ChunkChoice> }
#[derive(Deserialize)]
struct ChunkChoice { delta: ChunkDelta }
#[derive(Deserialize)]
struct ChunkDelta { #[serde(default)] content: Option<String> }
