// Wire protocol DTOs and conversions for the public session API.

use serde::{Deserialize, Serialize};

use crate::domain::tuning::GameVariant;
use crate::domain::{
    Direction, EntityId, EntityKind, EntitySnapshot, GameEvent, Position, PowerUpEffect,
    PuzzleView, SessionSnapshot,
};
use crate::use_cases::SessionCommand;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Session this connection is attached to.
    Identity {
        session_id: String,
        variant: GameVariant,
    },
    // Latest published state of the session.
    Snapshot(SessionSnapshotDto),
    // A client message that could not be used; the connection stays open.
    Rejected { error: String },
}

/// Commands a client sends, over the WebSocket or `POST /sessions/{id}/commands`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientCommand {
    Start(StartPayload),
    Pause,
    Resume,
    Move(MovePayload),
    MoveTo(MoveToPayload),
    UsePowerUp(PowerUpPayload),
    SubmitAnswer(AnswerPayload),
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartPayload {
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_difficulty() -> String {
    "normal".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovePayload {
    pub direction: Direction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveToPayload {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PowerUpPayload {
    pub id: EntityId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerPayload {
    pub answer: String,
}

impl From<ClientCommand> for SessionCommand {
    fn from(command: ClientCommand) -> Self {
        match command {
            ClientCommand::Start(p) => SessionCommand::Start {
                difficulty: p.difficulty,
            },
            ClientCommand::Pause => SessionCommand::Pause,
            ClientCommand::Resume => SessionCommand::Resume,
            ClientCommand::Move(p) => SessionCommand::Move {
                direction: p.direction,
            },
            ClientCommand::MoveTo(p) => SessionCommand::MoveTo { x: p.x, y: p.y },
            ClientCommand::UsePowerUp(p) => SessionCommand::UsePowerUp { id: p.id },
            ClientCommand::SubmitAnswer(p) => SessionCommand::SubmitAnswer { answer: p.answer },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub variant: GameVariant,
}

/// Full session state for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshotDto {
    pub tick: u64,
    pub variant: GameVariant,
    pub state: &'static str,
    pub score: i64,
    pub lives: i32,
    pub time_remaining: u32,
    pub level: u32,
    pub speed_multiplier: f32,
    pub player: Position,
    pub entities: Vec<EntityStateDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub puzzle: Option<PuzzleDto>,
    pub streak: u32,
    pub hints_remaining: u32,
    pub puzzles_solved: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub events: Vec<EventDto>,
}

impl From<SessionSnapshot> for SessionSnapshotDto {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            tick: snapshot.tick,
            variant: snapshot.variant,
            state: snapshot.state.as_str(),
            score: snapshot.score,
            lives: snapshot.lives,
            time_remaining: snapshot.time_remaining,
            level: snapshot.level,
            speed_multiplier: snapshot.speed_multiplier,
            player: snapshot.player,
            entities: snapshot.entities.iter().map(EntityStateDto::from).collect(),
            puzzle: snapshot.puzzle.map(PuzzleDto::from),
            streak: snapshot.streak,
            hints_remaining: snapshot.hints_remaining,
            puzzles_solved: snapshot.puzzles_solved,
            notice: snapshot.notice,
            events: snapshot.events.into_iter().map(EventDto::from).collect(),
        }
    }
}

/// Flattened entity state; `kind` and its attributes sit beside the position.
#[derive(Debug, Clone, Serialize)]
pub struct EntityStateDto {
    pub id: EntityId,
    #[serde(flatten)]
    pub kind: EntityKind,
    pub label: String,
    pub x: f32,
    pub y: f32,
    #[serde(skip_serializing_if = "is_free")]
    pub cost: i64,
    pub targeting: bool,
}

fn is_free(cost: &i64) -> bool {
    *cost == 0
}

impl From<&EntitySnapshot> for EntityStateDto {
    fn from(entity: &EntitySnapshot) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind,
            label: entity.label.clone(),
            x: entity.x,
            y: entity.y,
            cost: entity.cost,
            targeting: entity.targeting,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PuzzleDto {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<PuzzleView> for PuzzleDto {
    fn from(view: PuzzleView) -> Self {
        Self {
            question: view.question,
            image: view.image,
        }
    }
}

/// Render hooks for one-shot effects (pickup flashes, hit shakes, banners).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventDto {
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
    WrongAnswer {
        #[serde(skip_serializing_if = "Option::is_none")]
        solution: Option<String>,
    },
    TimesUp,
    GameOver {
        score: i64,
    },
}

impl From<GameEvent> for EventDto {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::Collected {
                entity_id,
                label,
                points,
            } => EventDto::Collected {
                entity_id,
                label,
                points,
            },
            GameEvent::Hit {
                entity_id,
                label,
                damage,
            } => EventDto::Hit {
                entity_id,
                label,
                damage,
            },
            GameEvent::PowerUpUsed { entity_id, effect } => {
                EventDto::PowerUpUsed { entity_id, effect }
            }
            GameEvent::LevelUp { level } => EventDto::LevelUp { level },
            GameEvent::PuzzleSolved { points } => EventDto::PuzzleSolved { points },
            GameEvent::WrongAnswer { solution } => EventDto::WrongAnswer { solution },
            GameEvent::TimesUp => EventDto::TimesUp,
            GameEvent::GameOver { score } => EventDto::GameOver { score },
        }
    }
}
