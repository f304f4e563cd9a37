// Session-level state: lifecycle, counters, render events and snapshots.

use crate::domain::entity::{Entity, EntityId, EntityKind, Position, PowerUpEffect};
use crate::domain::puzzle::Puzzle;
use crate::domain::tuning::{GameVariant, ScoringRules};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Menu,
    Playing,
    Paused,
    GameOver,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Menu => "menu",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::GameOver => "game-over",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Counters {
    pub score: i64,
    pub lives: i32,
    pub max_lives: i32,
    pub time_remaining: u32,
    pub level: u32,
    pub speed_multiplier: f32,
}

impl Counters {
    pub fn new(scoring: &ScoringRules, time_limit_secs: u32) -> Self {
        Self {
            score: 0,
            lives: scoring.initial_lives,
            max_lives: scoring.max_lives,
            time_remaining: time_limit_secs,
            level: 1,
            speed_multiplier: 1.0,
        }
    }

    pub fn add_score(&mut self, points: i64) {
        self.score = self.score.saturating_add(points);
    }

    pub fn subtract_score(&mut self, points: i64, clamp_at_zero: bool) {
        self.score = self.score.saturating_sub(points);
        if clamp_at_zero {
            self.score = self.score.max(0);
        }
    }

    /// Adds lives without ever exceeding the cap.
    pub fn gain_lives(&mut self, lives: i32) {
        self.lives = self.lives.saturating_add(lives).min(self.max_lives);
    }

    pub fn lose_lives(&mut self, lives: i32) {
        self.lives = self.lives.saturating_sub(lives);
    }

    pub fn is_out_of_lives(&self) -> bool {
        self.lives <= 0
    }
}

/// Things that happened since the last snapshot; the render side turns them into effects.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Collected {
        entity_id: EntityId,
        label: String,
        points: i64,
    },
    Hit {
        entity_id: EntityId,
        label: String,
        damage: i64,
    },
    PowerUpUsed {
        entity_id: EntityId,
        effect: PowerUpEffect,
    },
    LevelUp {
        level: u32,
    },
    PuzzleSolved {
        points: i64,
    },
    /// The solution is only revealed when the puzzle moves on.
    WrongAnswer {
        solution: Option<String>,
    },
    TimesUp,
    GameOver {
        score: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub cost: i64,
    pub targeting: bool,
}

impl From<&Entity> for EntitySnapshot {
    fn from(e: &Entity) -> Self {
        Self {
            id: e.id,
            kind: e.kind,
            label: e.label.clone(),
            x: e.position.x,
            y: e.position.y,
            cost: e.cost,
            targeting: e.targeting,
        }
    }
}

/// Puzzle as shown to the player; the solution never leaves the session.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleView {
    pub question: String,
    pub image: Option<String>,
}

impl From<&Puzzle> for PuzzleView {
    fn from(p: &Puzzle) -> Self {
        Self {
            question: p.question.clone(),
            image: p.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub tick: u64,
    pub variant: GameVariant,
    pub state: SessionState,
    pub score: i64,
    pub lives: i32,
    pub time_remaining: u32,
    pub level: u32,
    pub speed_multiplier: f32,
    pub player: Position,
    pub entities: Vec<EntitySnapshot>,
    pub puzzle: Option<PuzzleView>,
    pub streak: u32,
    pub hints_remaining: u32,
    pub puzzles_solved: u32,
    pub notice: Option<String>,
    pub events: Vec<GameEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_gaining_lives_at_the_cap_then_lives_stay_at_the_cap() {
        let mut counters = Counters::new(&ScoringRules::default(), 60);
        counters.gain_lives(10);
        assert_eq!(counters.lives, counters.max_lives);
    }

    #[test]
    fn when_subtracting_with_clamp_then_score_never_goes_negative() {
        let mut counters = Counters::new(&ScoringRules::default(), 60);
        counters.add_score(20);
        counters.subtract_score(50, true);
        assert_eq!(counters.score, 0);

        counters.subtract_score(5, false);
        assert_eq!(counters.score, -5);
    }

    #[test]
    fn when_score_is_already_at_the_limit_then_further_changes_saturate() {
        let mut counters = Counters::new(&ScoringRules::default(), 60);
        counters.score = i64::MAX;
        counters.add_score(50);
        assert_eq!(counters.score, i64::MAX);

        counters.score = i64::MIN;
        counters.subtract_score(50, false);
        assert_eq!(counters.score, i64::MIN);

        counters.lose_lives(i32::MAX);
        counters.lose_lives(i32::MAX);
        assert_eq!(counters.lives, i32::MIN);
    }
}
