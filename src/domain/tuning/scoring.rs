use serde::{Deserialize, Serialize};

/// Contact, reward and progression rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Contact distance in playfield units, shared by every entity kind.
    pub collision_radius: f32,

    pub rare_multiplier: f32,
    pub legendary_multiplier: f32,

    /// Extra lives granted per legendary pickup (still capped by `max_lives`).
    pub legendary_life_bonus: i32,

    pub initial_lives: i32,
    pub max_lives: i32,

    /// Level n ends once score exceeds `n * level_threshold`; 0 disables levelling.
    pub level_threshold: i64,

    /// Seconds added to the countdown on level up.
    pub level_time_bonus: u32,

    /// Added to the speed multiplier on level up.
    pub speed_step: f32,

    pub clamp_score_at_zero: bool,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            collision_radius: 15.0,
            rare_multiplier: 1.5,
            legendary_multiplier: 2.0,
            legendary_life_bonus: 1,
            initial_lives: 3,
            max_lives: 5,
            level_threshold: 100,
            level_time_bonus: 10,
            speed_step: 0.2,
            clamp_score_at_zero: true,
        }
    }
}
