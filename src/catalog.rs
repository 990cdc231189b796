//! Problem catalog: built once at startup, read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::domain::ProblemDefinition;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProblemError {
  #[error("duplicate problem id '{0}' in configuration")]
  DuplicateId(String),

  #[error("Problem {0} not found")]
  NotFound(String),
}

/// Insertion-ordered id → definition map.
#[derive(Debug, Default)]
pub struct ProblemCatalog {
  entries: Vec<Arc<ProblemDefinition>>,
  by_id: HashMap<String, usize>,
}

impl ProblemCatalog {
  /// Build the catalog; a repeated id is a configuration error.
  #[instrument(level = "info", skip_all, fields(count = definitions.len()))]
  pub fn load(definitions: Vec<ProblemDefinition>) -> Result<Self, ProblemError> {
    let mut entries = Vec::with_capacity(definitions.len());
    let mut by_id = HashMap::with_capacity(definitions.len());

    for def in definitions {
      if by_id.contains_key(&def.id) {
        return Err(ProblemError::DuplicateId(def.id));
      }
      by_id.insert(def.id.clone(), entries.len());
      entries.push(Arc::new(def));
    }

    info!(target: "problem", problems = entries.len(), "Problem catalog loaded");
    Ok(Self { entries, by_id })
  }

  pub fn get(&self, id: &str) -> Result<Arc<ProblemDefinition>, ProblemError> {
    self.by_id
      .get(id)
      .map(|&idx| self.entries[idx].clone())
      .ok_or_else(|| ProblemError::NotFound(id.to_string()))
  }

  /// All definitions in insertion order.
  pub fn list(&self) -> &[Arc<ProblemDefinition>] {
    &self.entries
  }

  pub fn first(&self) -> Option<&Arc<ProblemDefinition>> {
    self.entries.first()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
pub(crate) fn test_problem(id: &str, step: &str) -> ProblemDefinition {
  ProblemDefinition {
    id: id.into(),
    title: format!("Title {id}"),
    description: format!("Description {id}"),
    reference_steps: vec![step.into()],
    required_steps: 1,
    difficulty_level: "beginner".into(),
    category: "testing".into(),
    ai_flow: None,
  }
}
