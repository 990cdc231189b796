//! Keyword-overlap scoring of a submitted solution against a reference step.
//!
//! This is a crude relevance heuristic, not linguistic analysis:
//!   1) the reference step is reduced to at most five "keywords"
//!   2) the share of those keywords found as substrings of the submission is the match ratio
//!   3) the ratio maps to a status (>= 0.6 approved, >= 0.3 needs refinement, else rejected)

use crate::domain::SolutionStatus;

const STOP_WORDS: &[&str] = &[
  "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

pub const MAX_KEYWORDS: usize = 5;

/// Tokens of this many chars or fewer never count as keywords.
const MIN_TOKEN_CHARS: usize = 3;

// Thresholds expressed as tenths so boundaries compare exactly.
const APPROVE_TENTHS: usize = 6;
const REFINE_TENTHS: usize = 3;

/// Lower-case, split on whitespace, drop stop words and short tokens, keep the first five.
/// Punctuation stays attached to its token and repeats are kept.
pub fn extract_keywords(text: &str) -> Vec<String> {
  text
    .to_lowercase()
    .split_whitespace()
    .filter(|w| w.chars().count() > MIN_TOKEN_CHARS && !STOP_WORDS.contains(w))
    .take(MAX_KEYWORDS)
    .map(str::to_string)
    .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Score {
  pub status: SolutionStatus,
  pub matches: usize,
  pub keywords: usize,
  pub match_ratio: f64,
}

/// Score `user_input` against `reference_step`. Total over all inputs.
pub fn score(user_input: &str, reference_step: &str) -> Score {
  let keywords = extract_keywords(reference_step);
  let input = user_input.to_lowercase();
  let matches = keywords.iter().filter(|k| input.contains(k.as_str())).count();
  let k = keywords.len();

  let (status, match_ratio) = if k == 0 {
    (SolutionStatus::Rejected, 0.0)
  } else {
    (classify(matches, k), matches as f64 / k as f64)
  };

  Score { status, matches, keywords: k, match_ratio }
}

fn classify(matches: usize, keywords: usize) -> SolutionStatus {
  if matches * 10 >= keywords * APPROVE_TENTHS {
    SolutionStatus::Approved
  } else if matches * 10 >= keywords * REFINE_TENTHS {
    SolutionStatus::NeedsRefinement
  } else {
    SolutionStatus::Rejected
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // Extracts to: identify, pattern, sequence, recognize, geometric
  const FIVE: &str = "Identify the pattern in the sequence and recognize geometric growth";

  #[test]
  fn extract_filters_and_truncates() {
    assert_eq!(
      extract_keywords(FIVE),
      vec!["identify", "pattern", "sequence", "recognize", "geometric"]
    );
    assert_eq!(
      extract_keywords("Formulate a clear, testable hypothesis"),
      vec!["formulate", "clear,", "testable", "hypothesis"]
    );
  }

  #[test]
  fn extract_keeps_repeats_and_drops_short_words() {
    assert_eq!(extract_keywords("data data and more data"), vec!["data", "data", "more", "data"]);
    assert!(extract_keywords("a an the of by cat dog").is_empty());
    assert!(extract_keywords("").is_empty());
    assert!(extract_keywords("   \t\n ").is_empty());
  }

  #[test]
  fn extract_never_yields_stop_words_or_short_tokens() {
    let samples = [
      "With the best of intentions, and by the light of the moon",
      "THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG AGAIN AND AGAIN",
      "Établir une hypothèse claire et vérifiable avant tout",
      "x y z with with with without within",
    ];
    for s in samples {
      let kws = extract_keywords(s);
      assert!(kws.len() <= MAX_KEYWORDS);
      for k in kws {
        assert!(k.chars().count() > 3, "{k}");
        assert!(!STOP_WORDS.contains(&k.as_str()), "{k}");
      }
    }
  }

  #[test]
  fn three_of_five_is_approved() {
    let s = score("I would identify the PATTERN across the sequence", FIVE);
    assert_eq!((s.matches, s.keywords), (3, 5));
    assert_eq!(s.match_ratio, 0.6);
    assert_eq!(s.status, SolutionStatus::Approved);
  }

  #[test]
  fn two_of_five_needs_refinement() {
    let s = score("find the pattern of this sequence", FIVE);
    assert_eq!((s.matches, s.keywords), (2, 5));
    assert_eq!(s.status, SolutionStatus::NeedsRefinement);
  }

  #[test]
  fn one_of_five_is_rejected() {
    let s = score("there is some pattern", FIVE);
    assert_eq!((s.matches, s.keywords), (1, 5));
    assert_eq!(s.status, SolutionStatus::Rejected);
  }

  #[test]
  fn keywords_match_as_substrings() {
    // "pattern" inside "patterns", "identify" inside "identifying"
    let s = score("identifying patterns", "identify pattern");
    assert_eq!(s.matches, 2);
    assert_eq!(s.status, SolutionStatus::Approved);
  }

  #[test]
  fn empty_reference_is_rejected_without_dividing() {
    for input in ["", "anything at all", "the of and"] {
      let s = score(input, "");
      assert_eq!(s.keywords, 0);
      assert_eq!(s.match_ratio, 0.0);
      assert_eq!(s.status, SolutionStatus::Rejected);
    }
    assert_eq!(score("whatever", "a to of by").status, SolutionStatus::Rejected);
  }

  #[test]
  fn score_is_deterministic() {
    let a = score("recognize the geometric pattern", FIVE);
    let b = score("recognize the geometric pattern", FIVE);
    assert_eq!(a, b);
  }
}
