//! Public HTTP request/response structs (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ProblemDefinition, SolutionStatus};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
  /// User's freeform thought or question.
  pub user_input: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
  pub response: String,
  #[serde(default)]
  pub out_of_scope: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SolutionResponse {
  pub response: String,
  pub solution_evaluated: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<SolutionStatus>,
}

impl SolutionResponse {
  /// Informational reply, no evaluation performed.
  pub fn text(response: String) -> Self {
    Self { response, solution_evaluated: false, status: None }
  }
}

/// Summary of the active problem.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProblemInfo {
  pub id: String,
  pub title: String,
  pub description: String,
  pub difficulty_level: String,
  pub category: String,
  pub total_steps: u32,
}

impl From<&ProblemDefinition> for ProblemInfo {
  fn from(p: &ProblemDefinition) -> Self {
    Self {
      id: p.id.clone(),
      title: p.title.clone(),
      description: p.description.clone(),
      difficulty_level: p.difficulty_level.clone(),
      category: p.category.clone(),
      total_steps: p.required_steps,
    }
  }
}

/// Catalog listing entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProblemSummary {
  pub id: String,
  pub title: String,
  pub difficulty_level: String,
  pub category: String,
}

impl From<&ProblemDefinition> for ProblemSummary {
  fn from(p: &ProblemDefinition) -> Self {
    Self {
      id: p.id.clone(),
      title: p.title.clone(),
      difficulty_level: p.difficulty_level.clone(),
      category: p.category.clone(),
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct SetActiveIn {
  pub problem_id: String,
}

#[derive(Serialize)]
pub struct ContextReloadOut {
  pub ok: bool,
  pub roles: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
  pub detail: String,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}
