//! The single, process-wide active problem.
//!
//! Holds a shared reference into the catalog behind one read/write guard; a reader
//! observes either the old or the new problem, never a mix.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, instrument, warn};

use crate::catalog::{ProblemCatalog, ProblemError};
use crate::domain::ProblemDefinition;

pub struct ProblemSession {
  catalog: Arc<ProblemCatalog>,
  active: RwLock<Option<Arc<ProblemDefinition>>>,
}

impl ProblemSession {
  /// Starts on the catalog's first entry, or unset if the catalog is empty.
  pub fn new(catalog: Arc<ProblemCatalog>) -> Self {
    let active = catalog.first().cloned();
    match &active {
      Some(p) => info!(target: "problem", id = %p.id, "Initial active problem"),
      None => warn!(target: "problem", "Catalog is empty; no active problem"),
    }
    Self { catalog, active: RwLock::new(active) }
  }

  pub fn catalog(&self) -> &ProblemCatalog {
    &self.catalog
  }

  /// Swap the active problem. An unknown id leaves the current one in place.
  #[instrument(level = "info", skip(self))]
  pub fn set_active(&self, id: &str) -> Result<Arc<ProblemDefinition>, ProblemError> {
    let next = self.catalog.get(id)?;
    *self.active.write() = Some(next.clone());
    info!(target: "problem", %id, "Active problem changed");
    Ok(next)
  }

  pub fn get_active(&self) -> Option<Arc<ProblemDefinition>> {
    self.active.read().clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::test_problem;

  fn session(ids: &[&str]) -> ProblemSession {
    let defs = ids.iter().map(|id| test_problem(id, "some step")).collect();
    ProblemSession::new(Arc::new(ProblemCatalog::load(defs).unwrap()))
  }

  #[test]
  fn starts_on_first_entry() {
    let s = session(&["b", "a"]);
    assert_eq!(s.get_active().unwrap().id, "b");
  }

  #[test]
  fn empty_catalog_starts_unset() {
    assert!(session(&[]).get_active().is_none());
  }

  #[test]
  fn set_then_get_returns_new_problem() {
    let s = session(&["a", "b"]);
    let set = s.set_active("b").unwrap();
    assert_eq!(set.id, "b");
    assert_eq!(s.get_active().unwrap().id, "b");
  }

  #[test]
  fn unknown_id_keeps_previous_problem() {
    let s = session(&["a", "b"]);
    s.set_active("b").unwrap();
    let err = s.set_active("nonexistent").unwrap_err();
    assert_eq!(err, ProblemError::NotFound("nonexistent".into()));
    assert_eq!(s.get_active().unwrap().id, "b");
  }

  #[test]
  fn active_is_shared_with_catalog() {
    let s = session(&["a"]);
    let active = s.get_active().unwrap();
    assert!(Arc::ptr_eq(&active, &s.catalog().get("a").unwrap()));
  }

  #[test]
  fn concurrent_readers_see_whole_problems() {
    let s = Arc::new(session(&["a", "b"]));
    let writer = {
      let s = s.clone();
      std::thread::spawn(move || {
        for i in 0..500 {
          s.set_active(if i % 2 == 0 { "a" } else { "b" }).unwrap();
        }
      })
    };
    let readers: Vec<_> = (0..4)
      .map(|_| {
        let s = s.clone();
        std::thread::spawn(move || {
          for _ in 0..500 {
            let p = s.get_active().unwrap();
            assert_eq!(p.title, format!("Title {}", p.id));
          }
        })
      })
      .collect();
    writer.join().unwrap();
    for r in readers {
      r.join().unwrap();
    }
  }
}
