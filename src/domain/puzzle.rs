// Puzzle challenges for the puzzle-style variants.

use serde::{Deserialize, Serialize};

/// Notice surfaced when the remote puzzle could not be used.
pub const FALLBACK_NOTICE: &str = "Using demo puzzle due to API limitations.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    /// Question text or an image reference, as delivered by the source.
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub solution: String,
    /// Fixed reward; when absent the difficulty's base points apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<i64>,
}

impl Puzzle {
    pub fn new(question: impl Into<String>, solution: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            image: None,
            solution: solution.into(),
            reward: None,
        }
    }

    pub fn with_reward(mut self, reward: i64) -> Self {
        self.reward = Some(reward);
        self
    }

    /// Built-in puzzle used whenever the remote source fails.
    pub fn fallback() -> Self {
        Self::new("What is 15 + 27?", "42")
    }

    /// Answers match ignoring case and whitespace; an empty answer never matches.
    pub fn accepts(&self, answer: &str) -> bool {
        let answer = normalize(answer);
        !answer.is_empty() && answer == normalize(&self.solution)
    }

    pub fn hint(&self) -> String {
        match self.solution.trim().parse::<i64>() {
            Ok(n) => format!(
                "The answer is between {} and {}",
                n.saturating_sub(5).max(0),
                n.saturating_add(5)
            ),
            Err(_) => match self.solution.trim().chars().next() {
                Some(first) => format!("The answer starts with '{first}'"),
                None => "No hint available".to_string(),
            },
        }
    }
}

fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
