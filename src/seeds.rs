//! Built-in problem definitions that make the service useful without a config file.

use crate::domain::{EvaluationConfig, ProblemDefinition};

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

fn problem(
  id: &str,
  title: &str,
  description: &str,
  steps: &[&str],
  difficulty_level: &str,
  category: &str,
  ai_flow: EvaluationConfig,
) -> ProblemDefinition {
  ProblemDefinition {
    id: id.into(),
    title: title.into(),
    description: description.into(),
    reference_steps: strings(steps),
    required_steps: steps.len() as u32,
    difficulty_level: difficulty_level.into(),
    category: category.into(),
    ai_flow: Some(ai_flow),
  }
}

/// Default catalog, in the order it is presented to users.
pub fn default_problems() -> Vec<ProblemDefinition> {
  vec![
    problem(
      "math_sequence",
      "Mathematical Sequence Problem",
      "Find the next number in the sequence: 2, 4, 8, 16, ?",
      &[
        "Identify the pattern in the sequence",
        "Recognize it's a geometric sequence",
        "Calculate the common ratio",
        "Apply the pattern to find the next term",
        "Verify the solution fits the pattern",
      ],
      "intermediate",
      "mathematics",
      EvaluationConfig {
        evaluation_criteria: strings(&[
          "Pattern recognition accuracy",
          "Mathematical reasoning clarity",
          "Solution verification approach",
        ]),
        suggestions: strings(&[
          "Look for relationships between consecutive terms",
          "Consider if the pattern involves multiplication or addition",
          "Test your solution by applying the pattern backwards",
        ]),
        hints: strings(&[
          "What operation transforms 2 to 4?",
          "Is this pattern consistent throughout the sequence?",
          "How can you verify your answer is correct?",
        ]),
      },
    ),
    problem(
      "business_strategy",
      "Business Strategy Development",
      "Develop a strategy for a new product launch in a competitive market",
      &[
        "Conduct market research and analysis",
        "Identify target audience and positioning",
        "Analyze competitive landscape",
        "Develop unique value proposition",
        "Create marketing and launch plan",
        "Define success metrics and KPIs",
      ],
      "advanced",
      "business",
      EvaluationConfig {
        evaluation_criteria: strings(&[
          "Market analysis depth",
          "Strategic thinking quality",
          "Practical implementation feasibility",
        ]),
        suggestions: strings(&[
          "Consider both quantitative and qualitative market data",
          "Focus on unique differentiators from competitors",
          "Ensure your strategy is measurable and actionable",
        ]),
        hints: strings(&[
          "What makes your product different from existing solutions?",
          "How will you measure the success of your strategy?",
          "What are the biggest risks to your launch plan?",
        ]),
      },
    ),
    problem(
      "coding_algorithm",
      "Algorithm Design Challenge",
      "Design an efficient algorithm to find the longest common subsequence",
      &[
        "Understand the problem requirements",
        "Identify input constraints and edge cases",
        "Design a brute force approach first",
        "Optimize using dynamic programming",
        "Analyze time and space complexity",
        "Test with various test cases",
      ],
      "advanced",
      "programming",
      EvaluationConfig {
        evaluation_criteria: strings(&[
          "Problem understanding completeness",
          "Algorithm design efficiency",
          "Complexity analysis accuracy",
        ]),
        suggestions: strings(&[
          "Start with a simple example to understand the pattern",
          "Consider how overlapping subproblems can be optimized",
          "Think about edge cases like empty strings or single characters",
        ]),
        hints: strings(&[
          "What happens when you have overlapping subproblems?",
          "How can you build the solution from smaller subproblems?",
          "What's the relationship between the current cell and previous cells?",
        ]),
      },
    ),
    problem(
      "creative_writing",
      "Creative Story Development",
      "Create a compelling short story with a twist ending",
      &[
        "Develop a unique premise or concept",
        "Create well-defined characters with clear motivations",
        "Establish the setting and atmosphere",
        "Build tension and conflict throughout the story",
        "Craft a surprising but logical twist ending",
        "Revise for clarity and impact",
      ],
      "intermediate",
      "creative",
      EvaluationConfig {
        evaluation_criteria: strings(&[
          "Creativity and originality",
          "Character development depth",
          "Narrative structure effectiveness",
        ]),
        suggestions: strings(&[
          "Show character motivations through actions, not just descriptions",
          "Use sensory details to create immersive settings",
          "Plant subtle clues for the twist throughout the story",
        ]),
        hints: strings(&[
          "What does your character want most? What's stopping them?",
          "How can you make the twist both surprising and inevitable?",
          "What details can you add to make the setting more vivid?",
        ]),
      },
    ),
    problem(
      "scientific_method",
      "Scientific Experiment Design",
      "Design an experiment to test a hypothesis about plant growth",
      &[
        "Formulate a clear, testable hypothesis",
        "Identify independent and dependent variables",
        "Design control and experimental groups",
        "Plan data collection methods and timeline",
        "Consider potential confounding factors",
        "Outline expected results and analysis methods",
      ],
      "intermediate",
      "science",
      EvaluationConfig {
        evaluation_criteria: strings(&[
          "Hypothesis clarity and testability",
          "Experimental design rigor",
          "Control of variables effectiveness",
        ]),
        suggestions: strings(&[
          "Ensure your hypothesis is specific and measurable",
          "Include multiple control groups for better comparison",
          "Consider environmental factors that might affect results",
        ]),
        hints: strings(&[
          "What exactly are you changing between groups?",
          "How will you measure the effect of your independent variable?",
          "What other factors might influence your results?",
        ]),
      },
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn default_ids_are_unique_and_evaluable() {
    let problems = default_problems();
    let ids: HashSet<_> = problems.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids.len(), problems.len());
    for p in &problems {
      assert!(!p.reference_steps.is_empty(), "{} has no reference steps", p.id);
      assert_eq!(p.required_steps as usize, p.reference_steps.len());
      let flow = p.ai_flow.as_ref().expect("seeded problems carry an ai_flow");
      assert!(!flow.suggestions.is_empty());
      assert!(!flow.hints.is_empty());
    }
  }
}
