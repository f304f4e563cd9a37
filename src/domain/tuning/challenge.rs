use serde::{Deserialize, Serialize};

use crate::domain::puzzle::Puzzle;

/// Where a variant's puzzles come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "puzzles", rename_all = "snake_case")]
pub enum PuzzleDeck {
    None,
    /// Fixed list played in order; the run ends after the last one.
    Builtin(Vec<Puzzle>),
    /// Fetched one at a time, with the built-in fallback on failure.
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WrongAnswerPolicy {
    /// Score removed (clamped per the scoring rules).
    pub penalty: i64,
    pub lose_life: bool,
    /// Move on to the next puzzle instead of retrying.
    pub advance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeTuning {
    pub deck: PuzzleDeck,
    pub wrong_answer: WrongAnswerPolicy,

    /// Bonus per consecutive solve.
    pub streak_bonus: i64,

    /// Bonus per second left on the clock.
    pub time_bonus_per_second: i64,

    pub hints: u32,

    /// Chance of dropping a power-up whenever the puzzle advances.
    pub power_up_chance_on_advance: f32,

    /// Deal a builtin deck again from the top instead of ending the run.
    #[serde(default)]
    pub repeat_deck: bool,

    /// One countdown for the whole run; advancing does not refill the clock.
    #[serde(default)]
    pub shared_clock: bool,
}

impl ChallengeTuning {
    pub fn none() -> Self {
        Self {
            deck: PuzzleDeck::None,
            wrong_answer: WrongAnswerPolicy {
                penalty: 0,
                lose_life: false,
                advance: false,
            },
            streak_bonus: 0,
            time_bonus_per_second: 0,
            hints: 0,
            power_up_chance_on_advance: 0.0,
            repeat_deck: false,
            shared_clock: false,
        }
    }

    pub fn has_puzzles(&self) -> bool {
        !matches!(self.deck, PuzzleDeck::None)
    }
}
