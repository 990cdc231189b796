//! Application state: problem manager, daily context, chat backend, and guidance config.
//!
//! This module owns:
//!   - the problem catalog and its active-problem session (via `ProblemManager`)
//!   - the daily context store (lazy, reloadable)
//!   - the optional chat backend (OpenAI or Gemini)
//!   - the global AI flow guidance served to admins

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::{load_app_config_from_env, AiFlowGuidance, AppConfig, ConfigError};
use crate::context::ContextStore;
use crate::evaluator::ProblemManager;
use crate::feedback::FeedbackSelector;
use crate::llm::{backend_from_env, ChatBackend, ChatOptions};

pub struct AppState {
  pub problems: ProblemManager,
  pub context: ContextStore,
  pub llm: Option<Arc<dyn ChatBackend>>,
  pub ai_flow: AiFlowGuidance,
  pub chat_options: ChatOptions,
}

impl AppState {
  /// Build state from env. A broken problem config stops startup.
  #[instrument(level = "info", skip_all)]
  pub fn from_env() -> Result<Self, ConfigError> {
    let config = load_app_config_from_env()?;
    let state = Self::new(config, ContextStore::from_env(), backend_from_env(), FeedbackSelector::from_entropy())?;
    info!(
      target: "reasoning_chatbot",
      problems = state.problems.list_problems().len(),
      context_path = %state.context.path().display(),
      chat_enabled = state.llm.is_some(),
      "Application state ready"
    );
    Ok(state)
  }

  pub fn new(
    config: AppConfig,
    context: ContextStore,
    llm: Option<Arc<dyn ChatBackend>>,
    feedback: FeedbackSelector,
  ) -> Result<Self, ConfigError> {
    let catalog = Arc::new(config.build_catalog()?);
    Ok(Self {
      problems: ProblemManager::new(catalog, feedback),
      context,
      llm,
      ai_flow: config.ai_flow,
      chat_options: ChatOptions::default(),
    })
  }
}
