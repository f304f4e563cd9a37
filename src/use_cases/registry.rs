// Session registry: one driver per concurrent game instance.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand_pcg::Pcg32;
use tokio::sync::RwLock;
use tracing::info;

use super::game::{DriverSettings, SessionClosed, SessionHandle, spawn_session};
use super::session::Session;
use super::types::SessionCommand;
use crate::domain::tuning::{GameVariant, VariantCatalog};
use crate::domain::{ConfigError, PuzzleSource, SessionSnapshot};

/// Errors returned by session registry operations.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// Session id is already in use.
    AlreadyExists,
    NotFound,
    /// The session's driver has already stopped.
    SessionClosed,
    Config(ConfigError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AlreadyExists => write!(f, "session already exists"),
            RegistryError::NotFound => write!(f, "session not found"),
            RegistryError::SessionClosed => write!(f, "session is closed"),
            RegistryError::Config(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<ConfigError> for RegistryError {
    fn from(e: ConfigError) -> Self {
        RegistryError::Config(e)
    }
}

impl From<SessionClosed> for RegistryError {
    fn from(_: SessionClosed) -> Self {
        RegistryError::SessionClosed
    }
}

/// Thread-safe registry for active sessions.
pub struct SessionRegistry {
    /// Settings applied to newly spawned drivers.
    settings: DriverSettings,
    catalog: VariantCatalog,
    puzzles: Option<Arc<dyn PuzzleSource>>,
    /// Seeds each session's RNG; entropy-seeded when not configured.
    seeds: Mutex<Pcg32>,
    /// Map of session id to active handle.
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(
        settings: DriverSettings,
        catalog: VariantCatalog,
        puzzles: Option<Arc<dyn PuzzleSource>>,
        seed: Option<u64>,
    ) -> Self {
        let seeds = match seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_os_rng(),
        };
        Self {
            settings,
            catalog,
            puzzles,
            seeds: Mutex::new(seeds),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Builds a session for `variant` and spawns its driver.
    pub async fn create_session(
        &self,
        session_id: String,
        variant: GameVariant,
    ) -> Result<SessionHandle, RegistryError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session_id) {
            return Err(RegistryError::AlreadyExists);
        }

        let config = self
            .catalog
            .get(variant)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownVariant(variant.slug().to_string()))?;
        let session = Session::new(variant, config, Box::new(self.next_rng()))?;
        let handle = spawn_session(
            session_id.clone(),
            session,
            self.puzzles.clone(),
            &self.settings,
        );

        info!(session_id = %session_id, variant = variant.slug(), "session created");
        sessions.insert(session_id, handle.clone());
        Ok(handle)
    }

    /// Returns a session handle for the provided id, if it exists.
    pub async fn get_session(&self, session_id: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    pub async fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, RegistryError> {
        let handle = self
            .get_session(session_id)
            .await
            .ok_or(RegistryError::NotFound)?;
        Ok(handle.latest())
    }

    pub async fn send(
        &self,
        session_id: &str,
        command: SessionCommand,
    ) -> Result<(), RegistryError> {
        let handle = self
            .get_session(session_id)
            .await
            .ok_or(RegistryError::NotFound)?;
        handle.send(command).await?;
        Ok(())
    }

    /// Removes the session and waits for its driver to stop.
    pub async fn remove_session(&self, session_id: &str) -> Result<(), RegistryError> {
        let handle = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(session_id).ok_or(RegistryError::NotFound)?
        };
        handle.stop().await;
        info!(session_id, "session removed");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Stops every driver. Used on server shutdown.
    pub async fn shutdown(&self) {
        let handles: Vec<SessionHandle> = {
            let mut sessions = self.sessions.write().await;
            sessions.drain().map(|(_, handle)| handle).collect()
        };
        for handle in handles {
            handle.stop().await;
        }
    }

    fn next_rng(&self) -> Pcg32 {
        match self.seeds.lock() {
            Ok(mut seeds) => Pcg32::from_rng(&mut *seeds),
            Err(poisoned) => Pcg32::from_rng(&mut *poisoned.into_inner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionState;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(
            DriverSettings::default(),
            VariantCatalog::presets(),
            None,
            Some(7),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn when_id_is_reused_then_create_is_rejected() {
        let registry = registry();
        registry
            .create_session("a".to_string(), GameVariant::CodeCollection)
            .await
            .expect("first create");

        let err = registry
            .create_session("a".to_string(), GameVariant::Mashup)
            .await
            .err();

        assert_eq!(err, Some(RegistryError::AlreadyExists));
        assert_eq!(registry.len().await, 1);
        registry.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn when_session_is_removed_then_its_driver_stops() {
        let registry = registry();
        let handle = registry
            .create_session("b".to_string(), GameVariant::LogicPuzzle)
            .await
            .expect("create");

        registry.remove_session("b").await.expect("remove");

        assert!(handle.is_closed());
        assert!(registry.is_empty().await);
        assert_eq!(
            registry.remove_session("b").await,
            Err(RegistryError::NotFound)
        );
        assert_eq!(
            registry.send("b", SessionCommand::Pause).await,
            Err(RegistryError::NotFound)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn when_commands_are_sent_then_snapshot_reflects_them() {
        let registry = registry();
        let handle = registry
            .create_session("c".to_string(), GameVariant::Mashup)
            .await
            .expect("create");

        registry
            .send(
                "c",
                SessionCommand::Start {
                    difficulty: "easy".to_string(),
                },
            )
            .await
            .expect("send");
        let mut rx = handle.subscribe();
        rx.wait_for(|s| s.state == SessionState::Playing)
            .await
            .expect("driver alive");

        let snapshot = registry.snapshot("c").await.expect("snapshot");
        assert_eq!(snapshot.variant, GameVariant::Mashup);
        assert_eq!(snapshot.time_remaining, 90);
        registry.shutdown().await;
    }
}
