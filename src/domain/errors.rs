// Domain-level errors for engine setup and session transitions.

use std::fmt;

use crate::domain::state::SessionState;

/// Setup problems. The engine refuses to build or start rather than run half-configured.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptySpawnTable(&'static str),
    UnknownDifficulty(String),
    UnknownVariant(String),
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    Tuning(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptySpawnTable(table) => {
                write!(f, "spawn table `{table}` is empty but has a spawn chance")
            }
            ConfigError::UnknownDifficulty(key) => write!(f, "unknown difficulty `{key}`"),
            ConfigError::UnknownVariant(key) => write!(f, "unknown game variant `{key}`"),
            ConfigError::InvalidValue { field, reason } => write!(f, "invalid `{field}`: {reason}"),
            ConfigError::Tuning(message) => write!(f, "tuning file rejected: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    Config(ConfigError),
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },
}

impl From<ConfigError> for SessionError {
    fn from(e: ConfigError) -> Self {
        SessionError::Config(e)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Config(e) => e.fmt(f),
            SessionError::InvalidTransition { from, action } => {
                write!(f, "cannot {action} while session is {}", from.as_str())
            }
        }
    }
}

impl std::error::Error for SessionError {}
