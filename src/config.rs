//! Loading the problem bank (custom problems + global AI flow guidance) from TOML.
//!
//! Expected schema:
//!
//! ```toml
//! include_defaults = true        # keep the built-in problems (default: true)
//!
//! [[problems]]
//! id = "my_problem"
//! title = "My Problem"
//! description = "..."
//! reference_steps = ["Step one", "Step two"]
//! required_steps = 2
//! difficulty_level = "beginner"
//! category = "misc"
//!
//! [problems.ai_flow]
//! evaluation_criteria = ["..."]
//! suggestions = ["..."]
//! hints = ["..."]
//!
//! [ai_flow.evaluation_prompts]   # optional, overrides the built-in guidance
//! initial_assessment = "..."
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{ProblemCatalog, ProblemError};
use crate::domain::ProblemDefinition;
use crate::seeds::default_problems;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse config file {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error(transparent)]
  Catalog(#[from] ProblemError),
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
  #[serde(default = "default_true")]
  pub include_defaults: bool,
  #[serde(default)]
  pub problems: Vec<ProblemDefinition>,
  #[serde(default)]
  pub ai_flow: AiFlowGuidance,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self { include_defaults: true, problems: Vec::new(), ai_flow: AiFlowGuidance::default() }
  }
}

fn default_true() -> bool {
  true
}

/// Global guidance for LLM-assisted feedback. Served as-is to admin clients.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AiFlowGuidance {
  #[serde(default)] pub evaluation_prompts: BTreeMap<String, String>,
  #[serde(default)] pub suggestion_types: BTreeMap<String, String>,
  #[serde(default)] pub response_templates: BTreeMap<String, String>,
}

fn table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
  pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

impl Default for AiFlowGuidance {
  fn default() -> Self {
    Self {
      evaluation_prompts: table(&[
        ("initial_assessment", "Analyze the user's solution step and provide constructive feedback."),
        ("detailed_feedback", "Provide specific suggestions for improvement based on the reference framework."),
        ("encouragement", "Acknowledge progress and encourage continued effort."),
      ]),
      suggestion_types: table(&[
        ("hint", "Provide a subtle hint without giving away the complete answer"),
        ("clarification", "Ask clarifying questions to better understand the user's approach"),
        ("alternative_approach", "Suggest alternative methods or perspectives"),
        ("next_step", "Guide the user toward the next logical step"),
      ]),
      response_templates: table(&[
        ("positive", "Great work! Your approach shows good understanding of {concept}."),
        ("needs_improvement", "You're on the right track. Consider focusing on {specific_area}."),
        ("encouragement", "Keep going! You're making progress toward the solution."),
      ]),
    }
  }
}

impl AppConfig {
  pub fn from_toml_str(s: &str, path: &Path) -> Result<Self, ConfigError> {
    toml::from_str(s).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
  }

  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let s = std::fs::read_to_string(path)
      .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    let cfg = Self::from_toml_str(&s, path)?;
    info!(target: "reasoning_chatbot", path = %path.display(), custom = cfg.problems.len(), "Loaded problem config (TOML)");
    Ok(cfg)
  }

  /// Built-in problems (unless disabled) followed by custom ones.
  pub fn build_catalog(&self) -> Result<ProblemCatalog, ConfigError> {
    let mut defs = if self.include_defaults { default_problems() } else { Vec::new() };
    for p in &self.problems {
      if p.reference_steps.is_empty() {
        warn!(target: "problem", id = %p.id, "Problem has no reference steps; evaluations will always be rejected");
      }
    }
    defs.extend(self.problems.iter().cloned());
    Ok(ProblemCatalog::load(defs)?)
  }
}

/// Read PROBLEMS_CONFIG_PATH if set. A set-but-broken file is an error, not a fallback.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
  match std::env::var("PROBLEMS_CONFIG_PATH") {
    Ok(path) => AppConfig::from_path(Path::new(&path)),
    Err(_) => {
      info!(target: "reasoning_chatbot", "PROBLEMS_CONFIG_PATH not set; using built-in problems");
      Ok(AppConfig::default())
    }
  }
}
