//! Feedback text for an evaluation: a fixed base message per status plus, when the
//! problem is configured with pools, one suggestion (approved) or hint (otherwise).

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::domain::{EvaluationConfig, SolutionStatus};

pub const SUGGESTION_LABEL: &str = "💡 Suggestion: ";
pub const HINT_LABEL: &str = "💡 Hint: ";

/// Base message; `step` is echoed verbatim.
pub fn base_message(status: SolutionStatus, step: &str) -> String {
  match status {
    SolutionStatus::Approved => format!("Good solution! Your approach addresses the key elements: {}", step),
    SolutionStatus::NeedsRefinement => format!(
      "Your solution is on the right track but could be more comprehensive. Consider: {}",
      step
    ),
    SolutionStatus::Rejected => format!("Your solution doesn't seem to address the expected approach: {}", step),
    SolutionStatus::Pending => format!("Your solution is awaiting evaluation: {}", step),
  }
}

/// Build the feedback text, drawing from the applicable pool with `rng`.
pub fn compose<R: Rng + ?Sized>(
  status: SolutionStatus,
  config: Option<&EvaluationConfig>,
  step: &str,
  rng: &mut R,
) -> String {
  let base = base_message(status, step);
  let (label, pool) = match (status, config) {
    (SolutionStatus::Approved, Some(cfg)) => (SUGGESTION_LABEL, cfg.suggestions.as_slice()),
    (SolutionStatus::NeedsRefinement | SolutionStatus::Rejected, Some(cfg)) => (HINT_LABEL, cfg.hints.as_slice()),
    _ => return base,
  };

  match pool.choose(rng) {
    Some(pick) => format!("{}\n\n{}{}", base, label, pick),
    None => base,
  }
}

/// Owns the randomness source used for pool selection.
pub struct FeedbackSelector {
  rng: Mutex<StdRng>,
}

impl FeedbackSelector {
  pub fn from_entropy() -> Self {
    Self { rng: Mutex::new(StdRng::from_entropy()) }
  }

  /// Reproducible selection, for tests and replays.
  pub fn seeded(seed: u64) -> Self {
    Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
  }

  pub fn select(&self, status: SolutionStatus, config: Option<&EvaluationConfig>, step: &str) -> String {
    let mut rng = self.rng.lock();
    compose(status, config, step, &mut *rng)
  }
}
