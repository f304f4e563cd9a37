// Gameplay tuning, kept apart from runtime configuration (tick rates, ports, URLs).

pub mod catalog;
pub mod challenge;
pub mod playfield;
pub mod scoring;
pub mod spawn;
pub mod variants;

pub use catalog::VariantCatalog;
pub use challenge::{ChallengeTuning, PuzzleDeck, WrongAnswerPolicy};
pub use playfield::{PlayerBounds, Playfield};
pub use scoring::ScoringRules;
pub use spawn::{CollectibleTemplate, HazardTemplate, MotionRange, PowerUpTemplate, SpawnTuning};
pub use variants::{DifficultyProfile, EngineConfig, GameVariant, TimesUpPolicy};
