// Spawn tables and per-tick spawn probabilities.

use serde::{Deserialize, Serialize};

use crate::domain::entity::{PowerUpEffect, Rarity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectibleTemplate {
    pub label: String,
    pub points: i64,
    pub rarity: Rarity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardTemplate {
    pub label: String,
    /// Lives removed on contact (1..=3).
    pub damage: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpTemplate {
    pub label: String,
    pub effect: PowerUpEffect,
    /// Score spent on activation; free when zero.
    #[serde(default)]
    pub cost: i64,
}

/// Launch speed range and spread for a moving kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionRange {
    pub min_speed: f32,
    pub max_speed: f32,

    /// Full width of the launch cone around straight down, in degrees.
    pub cone_degrees: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnTuning {
    /// Base per-tick probabilities, scaled by level and difficulty.
    pub collectible_chance: f32,
    pub hazard_chance: f32,
    pub power_up_chance: f32,

    /// Probability that a new hazard homes in on the player.
    pub targeting_chance: f32,

    /// Stationary power-ups allowed on the field at once.
    pub max_power_ups: usize,

    pub collectible_motion: MotionRange,
    pub hazard_motion: MotionRange,

    pub collectibles: Vec<CollectibleTemplate>,
    pub hazards: Vec<HazardTemplate>,
    pub power_ups: Vec<PowerUpTemplate>,
}

impl SpawnTuning {
    /// Nothing spawns; used by the puzzle variants.
    pub fn disabled() -> Self {
        Self {
            collectible_chance: 0.0,
            hazard_chance: 0.0,
            power_up_chance: 0.0,
            targeting_chance: 0.0,
            max_power_ups: 3,
            collectible_motion: MotionRange {
                min_speed: 0.0,
                max_speed: 0.0,
                cone_degrees: 0.0,
            },
            hazard_motion: MotionRange {
                min_speed: 0.0,
                max_speed: 0.0,
                cone_degrees: 0.0,
            },
            collectibles: Vec::new(),
            hazards: Vec::new(),
            power_ups: Vec::new(),
        }
    }
}

pub(crate) fn collectible(label: &str, points: i64, rarity: Rarity) -> CollectibleTemplate {
    CollectibleTemplate {
        label: label.to_string(),
        points,
        rarity,
    }
}

pub(crate) fn hazard(label: &str, damage: u8) -> HazardTemplate {
    HazardTemplate {
        label: label.to_string(),
        damage,
    }
}

pub(crate) fn power_up(label: &str, effect: PowerUpEffect) -> PowerUpTemplate {
    PowerUpTemplate {
        label: label.to_string(),
        effect,
        cost: 0,
    }
}

pub(crate) fn priced_power_up(
    label: &str,
    effect: PowerUpEffect,
    cost: i64,
) -> PowerUpTemplate {
    PowerUpTemplate {
        cost,
        ..power_up(label, effect)
    }
}
