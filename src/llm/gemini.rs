//! Gemini `generateContent` client.
//!
//! System roles become `systemInstruction`, assistant turns are sent as `model`.
//! Streaming uses `streamGenerateContent?alt=sse`; each line carries a full JSON
//! candidate and lines that fail to parse are skipped.

use std::time::Instant;

use async_trait::async_trait;
use futures::{future, StreamExt};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{check_status, line_stream, timeout_from_env, ChatBackend, ChatOptions, LlmError, TextStream};
use crate::context::DailyContext;

const VENDOR: &str = "Gemini";
const DEFAULT_URL: &str =
  "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
const SAFETY_CATEGORIES: &[&str] = &[
  "HARM_CATEGORY_DANGEROUS_CONTENT",
  "HARM_CATEGORY_HARASSMENT",
  "HARM_CATEGORY_HATE_SPEECH",
  "HARM_CATEGORY_SEXUALLY_EXPLICIT",
];

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub url: String,
}

impl Gemini {
  /// Construct the client if we find GEMINI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok()?;
    let url = std::env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_URL.into());
    let client = reqwest::Client::builder().timeout(timeout_from_env()).build().ok()?;
    Some(Self { client, api_key, url })
  }

  fn stream_url(&self) -> String {
    match self.url.strip_suffix(":generateContent") {
      Some(base) => format!("{}:streamGenerateContent?alt=sse", base),
      None => self.url.clone(),
    }
  }

  async fn send(&self, url: &str, req: &GenerateRequest) -> Result<reqwest::Response, LlmError> {
    let res = self.client.post(url)
      .header(USER_AGENT, "reasoning-chatbot/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header("x-goog-api-key", &self.api_key)
      .json(req).send().await?;
    check_status(VENDOR, res).await
  }
}

#[async_trait]
impl ChatBackend for Gemini {
  fn name(&self) -> &str {
    "gemini"
  }

  #[instrument(level = "info", skip(self, context, user_input), fields(input_len = user_input.len()))]
  async fn chat(&self, context: &DailyContext, user_input: &str, options: &ChatOptions) -> Result<String, LlmError> {
    let start = Instant::now();
    let res = self.send(&self.url, &build_request(context, user_input, options)).await?;
    let body: GenerateResponse = res.json().await.map_err(|e| LlmError::Parse(e.to_string()))?;
    let text = body.first_text().unwrap_or_default();
    info!(elapsed = ?start.elapsed(), reply_len = text.len(), "Gemini reply received");
    Ok(text)
  }

  #[instrument(level = "info", skip(self, context, user_input), fields(input_len = user_input.len()))]
  async fn chat_stream(&self, context: &DailyContext, user_input: &str, options: &ChatOptions) -> Result<TextStream, LlmError> {
    let res = self.send(&self.stream_url(), &build_request(context, user_input, options)).await?;
    Ok(stream_texts(line_stream(res.bytes_stream())))
  }
}

fn build_request(context: &DailyContext, user_input: &str, options: &ChatOptions) -> GenerateRequest {
  let mut system = Vec::new();
  let mut contents = Vec::new();
  for (role, text) in context.roles.iter().flat_map(|r| r.iter()) {
    match role.as_str() {
      "system" => system.push(Part { text: text.clone() }),
      "assistant" | "model" => contents.push(Content { role: "model".into(), parts: vec![Part { text: text.clone() }] }),
      _ => contents.push(Content { role: "user".into(), parts: vec![Part { text: text.clone() }] }),
    }
  }
  contents.push(Content { role: "user".into(), parts: vec![Part { text: user_input.into() }] });

  GenerateRequest {
    system_instruction: if system.is_empty() { None } else { Some(SystemInstruction { parts: system }) },
    contents,
    generation_config: GenerationConfig { temperature: options.temperature, max_output_tokens: options.max_tokens },
    safety_settings: SAFETY_CATEGORIES
      .iter()
      .map(|c| SafetySetting { category: c.to_string(), threshold: "BLOCK_MEDIUM_AND_ABOVE".into() })
      .collect(),
  }
}

/// Text of one streamed line, accepting both SSE (`data: {...}`) and bare JSON lines.
fn parse_stream_line(line: &str) -> Option<String> {
  let line = line.trim();
  let data = line.strip_prefix("data:").map(str::trim).unwrap_or(line);
  if data.is_empty() {
    return None;
  }
  serde_json::from_str::<GenerateResponse>(data)
    .ok()
    .and_then(|r| r.first_text())
    .filter(|t| !t.is_empty())
}

fn stream_texts(lines: TextStream) -> TextStream {
  lines
    .filter_map(|line| {
      future::ready(match line {
        Ok(l) => parse_stream_line(&l).map(Ok),
        Err(e) => Some(Err(e)),
      })
    })
    .boxed()
}

// --- DTOs ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
  #[serde(skip_serializing_if = "Option::is_none")]
  system_instruction: Option<SystemInstruction>,
  contents: Vec<Content>,
  generation_config: GenerationConfig,
  safety_settings: Vec<SafetySetting>,
}
#[derive(Serialize)]
struct SystemInstruction { parts: Vec<Part> }
#[derive(Serialize, Deserialize)]
struct Content { #[serde(default)] role: String, #[serde(default)] parts: Vec<Part> }
#[derive(Serialize, Deserialize)]
struct Part { #[serde(default)] text: String }
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig { temperature: f32, max_output_tokens: u32 }
#[derive(Serialize)]
struct SafetySetting { category: String, threshold: String }

#[derive(Deserialize)]
struct GenerateResponse { #[serde(default)] candidates: Vec<Candidate> }
#[derive(Deserialize)]
struct Candidate { content: Option<Content> }

impl GenerateResponse {
  fn first_text(self) -> Option<String> {
    self.candidates.into_iter().next()?.content?.parts.into_iter().next().map(|p| p.text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures::stream;
  use std::collections::BTreeMap;

  fn role(k: &str, v: &str) -> BTreeMap<String, String> {
    let mut m = BTreeMap::new();
    m.insert(k.to_string(), v.to_string());
    m
  }

  #[test]
  fn request_shape() {
    let ctx = DailyContext { roles: vec![role("system", "Stay on topic."), role("assistant", "Ready.")] };
    let req = build_request(&ctx, "Explain photosynthesis", &ChatOptions::default());
    let v = serde_json::to_value(&req).unwrap();

    assert_eq!(v["systemInstruction"]["parts"][0]["text"], "Stay on topic.");
    assert_eq!(v["contents"][0]["role"], "model");
    assert_eq!(v["contents"][1]["role"], "user");
    assert_eq!(v["contents"][1]["parts"][0]["text"], "Explain photosynthesis");
    assert_eq!(v["generationConfig"]["maxOutputTokens"], 512);
    assert_eq!(v["safetySettings"].as_array().unwrap().len(), 4);
  }

  #[test]
  fn no_system_instruction_when_context_has_none() {
    let req = build_request(&DailyContext::default(), "hi", &ChatOptions::default());
    let v = serde_json::to_value(&req).unwrap();
    assert!(v.get("systemInstruction").is_none());
    assert_eq!(v["contents"].as_array().unwrap().len(), 1);
  }

  #[test]
  fn stream_url_switches_method() {
    let g = Gemini { client: reqwest::Client::new(), api_key: "k".into(), url: DEFAULT_URL.into() };
    assert!(g.stream_url().ends_with("gemini-1.5-flash:streamGenerateContent?alt=sse"));
  }

  #[tokio::test]
  async fn stream_lines_skip_garbage() {
    let lines: Vec<Result<String, LlmError>> = vec![
      Ok(r#"data: {"candidates":[{"content":{"parts":[{"text":"Light "}]}}]}"#.into()),
      Ok("not json".into()),
      Ok(String::new()),
      Ok(r#"{"candidates":[{"content":{"parts":[{"text":"energy"}]}}]}"#.into()),
    ];
    let out: Vec<_> = stream_texts(stream::iter(lines).boxed()).map(|r| r.unwrap()).collect().await;
    assert_eq!(out, vec!["Light ", "energy"]);
  }
}
