//! Daily context: the preset conversation roles merged in front of every chat turn.
//!
//! Loaded lazily from CONTEXT_PATH (`.yaml`/`.yml`, `.json` or `.toml`) and cached
//! until an explicit reload.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum ContextError {
  #[error("Context file not found: {}", .0.display())]
  NotFound(PathBuf),

  #[error("Context file must be .yaml, .yml, .json or .toml: {}", .0.display())]
  UnsupportedFormat(PathBuf),

  #[error("failed to read context file: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid YAML context: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("invalid JSON context: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid TOML context: {0}")]
  Toml(#[from] toml::de::Error),
}

/// Each role entry maps a role name (`system`, `assistant`, `user`, `model`) to its text.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct DailyContext {
  #[serde(default)]
  pub roles: Vec<BTreeMap<String, String>>,
}

impl DailyContext {
  /// System text of the first role entry, if any.
  pub fn primary_system_prompt(&self) -> Option<&str> {
    self.roles.first().and_then(|r| r.get("system")).map(String::as_str)
  }

  /// The day's topic when the system prompt asks to refuse out-of-scope questions.
  /// Taken from the text following `topic:` (case-insensitive) up to the end of that line.
  pub fn restricted_topic(&self) -> Option<String> {
    let lower = self.primary_system_prompt()?.to_lowercase();
    if !lower.contains("out-of-scope") {
      return None;
    }
    let (_, after) = lower.rsplit_once("topic:")?;
    let topic = after.lines().next().unwrap_or("").trim().trim_end_matches('.').trim();
    if topic.is_empty() { None } else { Some(topic.to_string()) }
  }

  /// True when a restricted topic is configured and `input` doesn't mention it.
  pub fn is_out_of_scope(&self, input: &str) -> bool {
    match self.restricted_topic() {
      Some(topic) => !input.to_lowercase().contains(&topic),
      None => false,
    }
  }
}

pub fn parse_context(path: &Path, raw: &str) -> Result<DailyContext, ContextError> {
  let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
  match ext.as_deref() {
    Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(raw)?),
    Some("json") => Ok(serde_json::from_str(raw)?),
    Some("toml") => Ok(toml::from_str(raw)?),
    _ => Err(ContextError::UnsupportedFormat(path.to_path_buf())),
  }
}

pub struct ContextStore {
  path: PathBuf,
  cache: RwLock<Option<Arc<DailyContext>>>,
}

impl ContextStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), cache: RwLock::new(None) }
  }

  /// CONTEXT_PATH, defaulting to `./context.yaml`.
  pub fn from_env() -> Self {
    Self::new(std::env::var("CONTEXT_PATH").unwrap_or_else(|_| "context.yaml".into()))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Cached context, loading it on first use.
  pub fn get(&self) -> Result<Arc<DailyContext>, ContextError> {
    if let Some(ctx) = self.cache.read().as_ref() {
      return Ok(ctx.clone());
    }
    self.reload()
  }

  /// Drop the cache and read the file again.
  #[instrument(level = "info", skip(self), fields(path = %self.path.display()))]
  pub fn reload(&self) -> Result<Arc<DailyContext>, ContextError> {
    if !self.path.exists() {
      return Err(ContextError::NotFound(self.path.clone()));
    }
    let raw = std::fs::read_to_string(&self.path)?;
    let ctx = Arc::new(parse_context(&self.path, &raw)?);
    *self.cache.write() = Some(ctx.clone());
    info!(target: "reasoning_chatbot", roles = ctx.roles.len(), "Daily context loaded");
    Ok(ctx)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_file(name: &str, body: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("reasoning-chatbot-ctx-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
  }

  #[test]
  fn parses_yaml_json_and_toml() {
    let yaml = "roles:\n  - system: You are a tutor.\n  - assistant: Hello!\n";
    let json = r#"{"roles":[{"system":"You are a tutor."},{"assistant":"Hello!"}]}"#;
    let toml = "[[roles]]\nsystem = \"You are a tutor.\"\n[[roles]]\nassistant = \"Hello!\"\n";

    let a = parse_context(Path::new("c.yaml"), yaml).unwrap();
    let b = parse_context(Path::new("c.JSON"), json).unwrap();
    let c = parse_context(Path::new("c.toml"), toml).unwrap();
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(a.primary_system_prompt(), Some("You are a tutor."));
  }

  #[test]
  fn unsupported_extension_is_rejected() {
    let err = parse_context(Path::new("context.txt"), "roles: []").unwrap_err();
    assert!(matches!(err, ContextError::UnsupportedFormat(_)));
  }

  #[test]
  fn missing_file_is_not_found() {
    let store = ContextStore::new("/no/such/context.yaml");
    assert!(matches!(store.get(), Err(ContextError::NotFound(_))));
  }

  #[test]
  fn get_caches_until_reload() {
    let path = temp_file("cache.yaml", "roles:\n  - system: first\n");
    let store = ContextStore::new(&path);
    assert_eq!(store.get().unwrap().primary_system_prompt(), Some("first"));

    std::fs::write(&path, "roles:\n  - system: second\n").unwrap();
    assert_eq!(store.get().unwrap().primary_system_prompt(), Some("first"));
    assert_eq!(store.reload().unwrap().primary_system_prompt(), Some("second"));
    assert_eq!(store.get().unwrap().primary_system_prompt(), Some("second"));
  }

  #[test]
  fn out_of_scope_guard_uses_topic() {
    let mut role = BTreeMap::new();
    role.insert(
      "system".to_string(),
      "Answer only about today's lesson; refuse out-of-scope questions.\nTopic: Photosynthesis".to_string(),
    );
    let ctx = DailyContext { roles: vec![role] };
    assert_eq!(ctx.restricted_topic().as_deref(), Some("photosynthesis"));
    assert!(ctx.is_out_of_scope("Who won the match yesterday?"));
    assert!(!ctx.is_out_of_scope("How does PHOTOSYNTHESIS use light?"));
  }

  #[test]
  fn no_guard_without_marker() {
    let mut role = BTreeMap::new();
    role.insert("system".to_string(), "Topic: chemistry".to_string());
    let ctx = DailyContext { roles: vec![role] };
    assert!(ctx.restricted_topic().is_none());
    assert!(!ctx.is_out_of_scope("anything"));
    assert!(!DailyContext::default().is_out_of_scope("anything"));
  }
}
