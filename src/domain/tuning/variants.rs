use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::challenge::{ChallengeTuning, PuzzleDeck, WrongAnswerPolicy};
use super::playfield::Playfield;
use super::scoring::ScoringRules;
use super::spawn::{MotionRange, SpawnTuning, collectible, hazard, power_up, priced_power_up};
use crate::domain::entity::{PowerUpEffect, Rarity};
use crate::domain::errors::ConfigError;
use crate::domain::puzzle::Puzzle;

/// The four games the engine is configured into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameVariant {
    #[default]
    CodeCollection,
    Mashup,
    LogicPuzzle,
    HeartPuzzle,
}

impl GameVariant {
    pub const ALL: [GameVariant; 4] = [
        GameVariant::CodeCollection,
        GameVariant::Mashup,
        GameVariant::LogicPuzzle,
        GameVariant::HeartPuzzle,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            GameVariant::CodeCollection => "code-collection",
            GameVariant::Mashup => "mashup",
            GameVariant::LogicPuzzle => "logic-puzzle",
            GameVariant::HeartPuzzle => "heart-puzzle",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|v| v.slug() == value)
    }
}

/// Per-difficulty knobs selected by `start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub time_limit_secs: u32,
    /// Reward for a solved puzzle without its own reward.
    pub base_points: i64,
    /// Multiplies every spawn probability.
    pub spawn_scale: f32,
}

/// What happens when the countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TimesUpPolicy {
    GameOver,
    /// Apply the score penalty and move to the next puzzle with a fresh clock.
    AdvanceChallenge { penalty: i64 },
}

/// Everything that distinguishes one game variant from another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub playfield: Playfield,
    pub spawn: SpawnTuning,
    pub scoring: ScoringRules,
    pub difficulties: BTreeMap<String, DifficultyProfile>,
    pub times_up: TimesUpPolicy,
    pub challenges: ChallengeTuning,
}

const DEFAULT_DIFFICULTY: &str = "normal";

impl EngineConfig {
    pub fn for_variant(variant: GameVariant) -> Self {
        match variant {
            GameVariant::CodeCollection => Self::code_collection(),
            GameVariant::Mashup => Self::mashup(),
            GameVariant::LogicPuzzle => Self::logic_puzzle(),
            GameVariant::HeartPuzzle => Self::heart_puzzle(),
        }
    }

    /// Falling tech items to collect and bugs to dodge; some bugs home in.
    pub fn code_collection() -> Self {
        Self {
            playfield: Playfield::default(),
            spawn: SpawnTuning {
                collectible_chance: 0.02,
                hazard_chance: 0.015,
                power_up_chance: 0.0,
                targeting_chance: 0.3,
                max_power_ups: 0,
                collectible_motion: MotionRange {
                    min_speed: 0.5,
                    max_speed: 2.0,
                    cone_degrees: 60.0,
                },
                hazard_motion: MotionRange {
                    min_speed: 1.0,
                    max_speed: 3.0,
                    cone_degrees: 70.0,
                },
                collectibles: vec![
                    collectible("React", 10, Rarity::Common),
                    collectible("JavaScript", 15, Rarity::Common),
                    collectible("Node.js", 20, Rarity::Uncommon),
                    collectible("TypeScript", 25, Rarity::Uncommon),
                    collectible("Vite", 30, Rarity::Rare),
                    collectible("AI/ML", 50, Rarity::Legendary),
                    collectible("Innovation", 100, Rarity::Legendary),
                ],
                hazards: vec![
                    hazard("Syntax Error", 1),
                    hazard("Logic Bug", 2),
                    hazard("Memory Leak", 3),
                ],
                power_ups: Vec::new(),
            },
            scoring: ScoringRules::default(),
            difficulties: difficulties(&[
                ("easy", 90, 0, 0.75),
                ("normal", 60, 0, 1.0),
                ("hard", 45, 0, 1.25),
                ("expert", 30, 0, 1.5),
            ]),
            times_up: TimesUpPolicy::GameOver,
            challenges: ChallengeTuning::none(),
        }
    }

    /// Collection play plus stationary power-ups and quick questions. A wrong
    /// answer costs a life; the run still ends on the clock.
    pub fn mashup() -> Self {
        let mut config = Self::code_collection();
        config.spawn.power_up_chance = 0.005;
        config.spawn.max_power_ups = 3;
        config.spawn.targeting_chance = 0.0;
        config.spawn.collectible_motion = MotionRange {
            min_speed: 1.0,
            max_speed: 3.0,
            cone_degrees: 60.0,
        };
        config.spawn.hazard_motion = MotionRange {
            min_speed: 1.5,
            max_speed: 3.5,
            cone_degrees: 70.0,
        };
        config.spawn.collectibles = vec![
            collectible("React", 10, Rarity::Common),
            collectible("JavaScript", 15, Rarity::Common),
            collectible("Node.js", 20, Rarity::Common),
        ];
        config.spawn.hazards = vec![hazard("Bug", 1)];
        config.spawn.power_ups = vec![
            power_up("Heart Boost", PowerUpEffect::ExtraLife),
            power_up("Logic Boost", PowerUpEffect::AddScore(100)),
            power_up("Time Freeze", PowerUpEffect::ExtendTime(15)),
            power_up("Score Multiplier", PowerUpEffect::DoubleScore),
        ];
        config.challenges = ChallengeTuning {
            deck: PuzzleDeck::Builtin(vec![
                Puzzle::new("2 + 2 = ?", "4").with_reward(50),
                Puzzle::new("What is the capital of France?", "Paris").with_reward(50),
                Puzzle::new("Binary: 1010 = ?", "10").with_reward(50),
            ]),
            wrong_answer: WrongAnswerPolicy {
                penalty: 0,
                lose_life: true,
                advance: false,
            },
            streak_bonus: 0,
            time_bonus_per_second: 0,
            hints: 0,
            power_up_chance_on_advance: 0.0,
            repeat_deck: true,
            shared_clock: true,
        };
        config
    }

    /// Three fixed logic puzzles against a 30 second clock per puzzle.
    pub fn logic_puzzle() -> Self {
        Self {
            playfield: Playfield::default(),
            spawn: SpawnTuning {
                power_ups: vec![
                    power_up("Time Freeze", PowerUpEffect::ExtendTime(10)),
                    power_up("Logic Boost", PowerUpEffect::AddScore(50)),
                    power_up("Memory Flash", PowerUpEffect::RevealHint),
                    power_up("Quantum Leap", PowerUpEffect::SkipChallenge),
                ],
                ..SpawnTuning::disabled()
            },
            scoring: ScoringRules {
                level_threshold: 0,
                ..ScoringRules::default()
            },
            difficulties: difficulties(&[
                ("easy", 45, 0, 1.0),
                ("normal", 30, 0, 1.0),
                ("hard", 20, 0, 1.0),
                ("expert", 15, 0, 1.0),
            ]),
            times_up: TimesUpPolicy::AdvanceChallenge { penalty: 50 },
            challenges: ChallengeTuning {
                deck: PuzzleDeck::Builtin(vec![
                    Puzzle::new("Binary Logic Gate: create a working AND gate", "1,3,2,3,4")
                        .with_reward(100),
                    Puzzle::new("Memory Sequence: recreate the sequence", "2,3,4,5")
                        .with_reward(150),
                    Puzzle::new("Quantum Superposition: collapse the state", "1,2,3")
                        .with_reward(200),
                ]),
                wrong_answer: WrongAnswerPolicy {
                    penalty: 25,
                    lose_life: false,
                    advance: false,
                },
                streak_bonus: 10,
                time_bonus_per_second: 2,
                hints: 3,
                power_up_chance_on_advance: 0.3,
                repeat_deck: false,
                shared_clock: false,
            },
        }
    }

    /// Remote image puzzles, one after another until the player stops.
    pub fn heart_puzzle() -> Self {
        Self {
            playfield: Playfield::default(),
            spawn: SpawnTuning {
                // Bought with score.
                power_ups: vec![
                    priced_power_up("Time Boost", PowerUpEffect::ExtendTime(10), 50),
                    priced_power_up("Hint", PowerUpEffect::RevealHint, 100),
                    priced_power_up("Skip", PowerUpEffect::SkipChallenge, 150),
                    priced_power_up("Double Points", PowerUpEffect::DoubleScore, 200),
                ],
                ..SpawnTuning::disabled()
            },
            scoring: ScoringRules {
                level_threshold: 0,
                ..ScoringRules::default()
            },
            difficulties: difficulties(&[
                ("easy", 45, 50, 1.0),
                ("normal", 30, 100, 1.0),
                ("hard", 20, 200, 1.0),
                ("expert", 15, 500, 1.0),
            ]),
            times_up: TimesUpPolicy::AdvanceChallenge { penalty: 0 },
            challenges: ChallengeTuning {
                deck: PuzzleDeck::Remote,
                wrong_answer: WrongAnswerPolicy {
                    penalty: 0,
                    lose_life: false,
                    advance: true,
                },
                streak_bonus: 10,
                time_bonus_per_second: 2,
                hints: 3,
                power_up_chance_on_advance: 0.3,
                repeat_deck: false,
                shared_clock: false,
            },
        }
    }

    /// Looks up a difficulty by key, ignoring case and surrounding whitespace.
    pub fn difficulty(&self, key: &str) -> Result<&DifficultyProfile, ConfigError> {
        let key = key.trim().to_lowercase();
        self.difficulties
            .get(&key)
            .ok_or(ConfigError::UnknownDifficulty(key))
    }

    /// Profile used before the first `start`.
    pub fn default_difficulty(&self) -> Option<&DifficultyProfile> {
        self.difficulties
            .get(DEFAULT_DIFFICULTY)
            .or_else(|| self.difficulties.values().next())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let spawn = &self.spawn;
        for (field, chance) in [
            ("spawn.collectible_chance", spawn.collectible_chance),
            ("spawn.hazard_chance", spawn.hazard_chance),
            ("spawn.power_up_chance", spawn.power_up_chance),
            ("spawn.targeting_chance", spawn.targeting_chance),
            (
                "challenges.power_up_chance_on_advance",
                self.challenges.power_up_chance_on_advance,
            ),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be a probability between 0 and 1",
                });
            }
        }

        if spawn.collectible_chance > 0.0 && spawn.collectibles.is_empty() {
            return Err(ConfigError::EmptySpawnTable("collectibles"));
        }
        if spawn.hazard_chance > 0.0 && spawn.hazards.is_empty() {
            return Err(ConfigError::EmptySpawnTable("hazards"));
        }
        if (spawn.power_up_chance > 0.0 || self.challenges.power_up_chance_on_advance > 0.0)
            && spawn.power_ups.is_empty()
        {
            return Err(ConfigError::EmptySpawnTable("power_ups"));
        }

        if spawn.power_ups.iter().any(|p| p.cost < 0) {
            return Err(ConfigError::InvalidValue {
                field: "spawn.power_ups.cost",
                reason: "must not be negative",
            });
        }

        for (field, motion) in [
            ("spawn.collectible_motion", spawn.collectible_motion),
            ("spawn.hazard_motion", spawn.hazard_motion),
        ] {
            if !(motion.min_speed >= 0.0 && motion.min_speed <= motion.max_speed) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "speeds must satisfy 0 <= min_speed <= max_speed",
                });
            }
            if !(0.0..=180.0).contains(&motion.cone_degrees) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "cone_degrees must be between 0 and 180",
                });
            }
        }

        let playfield = &self.playfield;
        let bounds = playfield.bounds;
        if !(bounds.min_x <= bounds.max_x && bounds.min_y <= bounds.max_y) {
            return Err(ConfigError::InvalidValue {
                field: "playfield.bounds",
                reason: "minimums must not exceed maximums",
            });
        }
        if playfield.spawn_min_x > playfield.spawn_max_x {
            return Err(ConfigError::InvalidValue {
                field: "playfield.spawn_min_x",
                reason: "spawn band is inverted",
            });
        }
        if !(playfield.tick_scale > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "playfield.tick_scale",
                reason: "must be positive",
            });
        }

        let scoring = &self.scoring;
        if !(scoring.collision_radius > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "scoring.collision_radius",
                reason: "must be positive",
            });
        }
        if scoring.initial_lives <= 0 || scoring.initial_lives > scoring.max_lives {
            return Err(ConfigError::InvalidValue {
                field: "scoring.initial_lives",
                reason: "must be positive and no more than max_lives",
            });
        }
        if scoring.level_threshold < 0 {
            return Err(ConfigError::InvalidValue {
                field: "scoring.level_threshold",
                reason: "must not be negative",
            });
        }

        if self.difficulties.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "difficulties",
                reason: "at least one difficulty is required",
            });
        }
        for profile in self.difficulties.values() {
            if profile.time_limit_secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "difficulties.time_limit_secs",
                    reason: "must be at least one second",
                });
            }
            if !(profile.spawn_scale >= 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: "difficulties.spawn_scale",
                    reason: "must not be negative",
                });
            }
        }

        match &self.challenges.deck {
            PuzzleDeck::Builtin(puzzles) if puzzles.is_empty() => {
                return Err(ConfigError::InvalidValue {
                    field: "challenges.deck",
                    reason: "builtin deck has no puzzles",
                });
            }
            PuzzleDeck::None if matches!(self.times_up, TimesUpPolicy::AdvanceChallenge { .. }) => {
                return Err(ConfigError::InvalidValue {
                    field: "times_up",
                    reason: "advancing on time-out requires a puzzle deck",
                });
            }
            _ => {}
        }

        Ok(())
    }
}

fn difficulties(rows: &[(&str, u32, i64, f32)]) -> BTreeMap<String, DifficultyProfile> {
    rows.iter()
        .map(|&(name, time_limit_secs, base_points, spawn_scale)| {
            (
                name.to_string(),
                DifficultyProfile {
                    time_limit_secs,
                    base_points,
                    spawn_scale,
                },
            )
        })
        .collect()
}
