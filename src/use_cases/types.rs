// Use-case level inputs for a running session.

use crate::domain::{Direction, EntityId};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Start { difficulty: String },
    Pause,
    Resume,
    Move { direction: Direction },
    MoveTo { x: f32, y: f32 },
    UsePowerUp { id: EntityId },
    SubmitAnswer { answer: String },
}
