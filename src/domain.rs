//! Domain models: problem definitions, their evaluation config, and evaluation outcomes.

use serde::{Deserialize, Serialize};

/// Hint/suggestion pools attached to a problem.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
  /// Descriptive only; not consumed by scoring.
  #[serde(default)] pub evaluation_criteria: Vec<String>,
  #[serde(default)] pub suggestions: Vec<String>,
  #[serde(default)] pub hints: Vec<String>,
}

/// A problem users can submit solutions for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProblemDefinition {
  pub id: String,
  pub title: String,
  pub description: String,
  /// Expected solution steps, in order. Only the first one is used for evaluation.
  pub reference_steps: Vec<String>,
  #[serde(default)] pub required_steps: u32,
  #[serde(default)] pub difficulty_level: String,   // e.g. "beginner", "intermediate", "advanced"
  #[serde(default)] pub category: String,
  #[serde(default)] pub ai_flow: Option<EvaluationConfig>,
}

impl ProblemDefinition {
  /// The step a submission is compared against.
  pub fn evaluation_step(&self) -> &str {
    self.reference_steps.first().map(String::as_str).unwrap_or("")
  }
}

/// Verdict of a single evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
  Approved,
  NeedsRefinement,
  Rejected,
  Pending,
}

impl SolutionStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      SolutionStatus::Approved => "approved",
      SolutionStatus::NeedsRefinement => "needs_refinement",
      SolutionStatus::Rejected => "rejected",
      SolutionStatus::Pending => "pending",
    }
  }
}

impl std::fmt::Display for SolutionStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Transient result of scoring plus feedback selection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvaluationOutcome {
  pub status: SolutionStatus,
  pub match_ratio: f64,
  pub feedback: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_serializes_snake_case() {
    let s = serde_json::to_string(&SolutionStatus::NeedsRefinement).unwrap();
    assert_eq!(s, "\"needs_refinement\"");
    assert_eq!(SolutionStatus::Approved.to_string(), "approved");
  }

  #[test]
  fn evaluation_step_is_first_reference_step() {
    let p = ProblemDefinition {
      id: "p".into(),
      title: "t".into(),
      description: "d".into(),
      reference_steps: vec!["first step".into(), "second step".into()],
      required_steps: 2,
      difficulty_level: "beginner".into(),
      category: "misc".into(),
      ai_flow: None,
    };
    assert_eq!(p.evaluation_step(), "first step");

    let empty = ProblemDefinition { reference_steps: vec![], ..p };
    assert_eq!(empty.evaluation_step(), "");
  }
}
