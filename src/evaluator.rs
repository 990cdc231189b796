//! Turns raw user text into a structured reply: "show problem" and "list problems"
//! intents are answered from the catalog, anything else is scored against the
//! active problem's first reference step.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::catalog::{ProblemCatalog, ProblemError};
use crate::domain::{EvaluationOutcome, ProblemDefinition};
use crate::feedback::FeedbackSelector;
use crate::protocol::{ProblemInfo, ProblemSummary, SolutionResponse};
use crate::scoring;
use crate::session::ProblemSession;

const INFO_TRIGGERS: &[&str] = &["show problem", "current problem", "what problem", "problem info"];
const LIST_TRIGGERS: &[&str] = &["available problems", "list problems", "all problems"];

pub const NO_ACTIVE_PROBLEM: &str = "No active problem set. Please contact an administrator.";
pub const NO_ACTIVE_PROBLEM_INFO: &str = "No active problem is currently set.";
pub const SET_ACTIVE_GUIDANCE: &str =
  "An administrator can change the active problem with POST /admin/problems/active {\"problem_id\": \"<id>\"}.";

#[derive(Clone, Debug, PartialEq)]
pub enum OrchestratorResult {
  Info(Option<ProblemInfo>),
  List(Vec<ProblemSummary>),
  /// `None` when there is no active problem to evaluate against.
  Evaluation(Option<Evaluation>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
  pub problem_id: String,
  pub outcome: EvaluationOutcome,
}

impl OrchestratorResult {
  /// Flatten into the wire response shared by the complete and chunked endpoints.
  pub fn into_response(self) -> SolutionResponse {
    match self {
      OrchestratorResult::Info(Some(info)) => SolutionResponse::text(render_info(&info)),
      OrchestratorResult::Info(None) => SolutionResponse::text(NO_ACTIVE_PROBLEM_INFO.into()),
      OrchestratorResult::List(items) => SolutionResponse::text(render_list(&items)),
      OrchestratorResult::Evaluation(None) => SolutionResponse::text(NO_ACTIVE_PROBLEM.into()),
      OrchestratorResult::Evaluation(Some(ev)) => SolutionResponse {
        response: ev.outcome.feedback,
        solution_evaluated: true,
        status: Some(ev.outcome.status),
      },
    }
  }
}

fn render_info(info: &ProblemInfo) -> String {
  format!(
    "Current problem: {} ({})\n{}\nDifficulty: {}\nCategory: {}\nSteps: {}",
    info.title, info.id, info.description, info.difficulty_level, info.category, info.total_steps
  )
}

fn render_list(items: &[ProblemSummary]) -> String {
  let mut out = String::from("Available problems:");
  if items.is_empty() {
    out.push_str("\n(none)");
  }
  for p in items {
    out.push_str(&format!("\n- {} ({})", p.title, p.id));
  }
  out.push_str("\n\n");
  out.push_str(SET_ACTIVE_GUIDANCE);
  out
}

fn matches_any(lower: &str, triggers: &[&str]) -> bool {
  triggers.iter().any(|t| lower.contains(t))
}

pub struct ProblemManager {
  session: ProblemSession,
  feedback: FeedbackSelector,
}

impl ProblemManager {
  pub fn new(catalog: Arc<ProblemCatalog>, feedback: FeedbackSelector) -> Self {
    Self { session: ProblemSession::new(catalog), feedback }
  }

  /// Route user text to the info, list or evaluation path (checked in that order).
  #[instrument(level = "info", skip(self, user_input), fields(input_len = user_input.len()))]
  pub fn handle(&self, user_input: &str) -> OrchestratorResult {
    let lower = user_input.to_lowercase();
    if matches_any(&lower, INFO_TRIGGERS) {
      debug!(target: "problem", "Info intent");
      OrchestratorResult::Info(self.active_problem_info())
    } else if matches_any(&lower, LIST_TRIGGERS) {
      debug!(target: "problem", "List intent");
      OrchestratorResult::List(self.list_problems())
    } else {
      OrchestratorResult::Evaluation(self.evaluate_solution(user_input))
    }
  }

  /// Score against the active problem's first reference step.
  #[instrument(level = "info", skip(self, user_input), fields(input_len = user_input.len()))]
  pub fn evaluate_solution(&self, user_input: &str) -> Option<Evaluation> {
    let problem = self.session.get_active()?;
    let step = problem.evaluation_step();
    let score = scoring::score(user_input, step);
    let feedback = self.feedback.select(score.status, problem.ai_flow.as_ref(), step);

    info!(
      target: "problem",
      id = %problem.id,
      status = %score.status,
      matches = score.matches,
      keywords = score.keywords,
      "Solution evaluated"
    );

    Some(Evaluation {
      problem_id: problem.id.clone(),
      outcome: EvaluationOutcome { status: score.status, match_ratio: score.match_ratio, feedback },
    })
  }

  pub fn active_problem_info(&self) -> Option<ProblemInfo> {
    self.session.get_active().map(|p| ProblemInfo::from(p.as_ref()))
  }

  pub fn list_problems(&self) -> Vec<ProblemSummary> {
    self.session.catalog().list().iter().map(|p| ProblemSummary::from(p.as_ref())).collect()
  }

  pub fn set_active_problem(&self, id: &str) -> Result<Arc<ProblemDefinition>, ProblemError> {
    self.session.set_active(id)
  }

  pub fn active_problem(&self) -> Option<Arc<ProblemDefinition>> {
    self.session.get_active()
  }
}
