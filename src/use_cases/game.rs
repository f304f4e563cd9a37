use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Notify, mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, info, info_span, warn};

use super::puzzle::{PuzzleDelivery, fetch_puzzle_or_fallback};
use super::session::Session;
use super::types::SessionCommand;
use crate::domain::tuning::GameVariant;
use crate::domain::{FALLBACK_NOTICE, Puzzle, PuzzleSource, SessionSnapshot, SessionState};

/// Timing and channel sizing shared by every session driver.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    /// Capacity for inbound session commands.
    pub command_channel_capacity: usize,
    /// Fast tick: spawn, motion, collision.
    pub tick_interval: Duration,
    /// Slow tick: one second of countdown.
    pub countdown_interval: Duration,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            command_channel_capacity: 64,
            tick_interval: Duration::from_millis(50),
            countdown_interval: Duration::from_millis(1000),
        }
    }
}

/// Returned when the driver behind a handle has already shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClosed;

// Owns the driver task. Dropping the last handle aborts it.
struct DriverGuard {
    shutdown: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DriverGuard {
    fn drop(&mut self) {
        if let Ok(task) = self.task.get_mut() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
    }
}

/// Cloneable access to one running session.
#[derive(Clone)]
pub struct SessionHandle {
    /// Identifier clients use to target this session.
    pub session_id: Arc<str>,
    pub variant: GameVariant,
    command_tx: mpsc::Sender<SessionCommand>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    driver: Arc<DriverGuard>,
}

impl SessionHandle {
    pub async fn send(&self, command: SessionCommand) -> Result<(), SessionClosed> {
        self.command_tx.send(command).await.map_err(|_| SessionClosed)
    }

    /// Receiver that observes every published snapshot. Closes when the driver stops.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn latest(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Signals the driver and waits for it to exit. Safe to call more than once.
    pub async fn stop(&self) {
        self.driver.shutdown.notify_one();
        let task = self
            .driver
            .task
            .lock()
            .ok()
            .and_then(|mut task| task.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                if e.is_panic() {
                    warn!(session_id = %self.session_id, "session driver panicked");
                }
            }
        }
    }
}

/// Spawns the driver task for `session` and returns its handle.
pub fn spawn_session(
    session_id: impl Into<Arc<str>>,
    mut session: Session,
    puzzles: Option<Arc<dyn PuzzleSource>>,
    settings: &DriverSettings,
) -> SessionHandle {
    let session_id: Arc<str> = session_id.into();
    let variant = session.variant();
    let (command_tx, command_rx) = mpsc::channel(settings.command_channel_capacity);
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
    let shutdown = Arc::new(Notify::new());

    let span = info_span!("session", session_id = %session_id, variant = variant.slug());
    let task = tokio::spawn(
        session_task(
            session,
            command_rx,
            snapshot_tx,
            puzzles,
            settings.clone(),
            shutdown.clone(),
        )
        .instrument(span),
    );

    SessionHandle {
        session_id,
        variant,
        command_tx,
        snapshot_rx,
        driver: Arc::new(DriverGuard {
            shutdown,
            task: Mutex::new(Some(task)),
        }),
    }
}

/// Owns `session` exclusively and drives it until shutdown, abort, or the
/// command channel closing.
///
/// Timers are only polled while the session is playing and are reset whenever
/// play (re)starts, so a pause never produces catch-up ticks.
pub async fn session_task(
    mut session: Session,
    mut command_rx: mpsc::Receiver<SessionCommand>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    puzzles: Option<Arc<dyn PuzzleSource>>,
    settings: DriverSettings,
    shutdown: Arc<Notify>,
) {
    let mut fast = tokio::time::interval(settings.tick_interval);
    fast.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut slow = tokio::time::interval(settings.countdown_interval);
    slow.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // In-flight remote puzzle fetches; dropped (and aborted) with the task.
    let mut fetches: JoinSet<(u64, PuzzleDelivery)> = JoinSet::new();

    info!("session driver started");
    loop {
        let running = session.state() == SessionState::Playing;

        tokio::select! {
            _ = shutdown.notified() => {
                break;
            }
            command = command_rx.recv() => {
                let Some(command) = command else {
                    debug!("command channel closed");
                    break;
                };
                apply_command(&mut session, command);
                if !running && session.state() == SessionState::Playing {
                    fast.reset();
                    slow.reset();
                }
            }
            _ = fast.tick(), if running => {
                session.fast_tick();
            }
            _ = slow.tick(), if running => {
                session.slow_tick();
            }
            Some(done) = fetches.join_next(), if !fetches.is_empty() => {
                match done {
                    Ok((request_id, delivery)) => {
                        session.install_puzzle(request_id, delivery.puzzle, delivery.notice);
                    }
                    Err(e) => warn!(error = %e, "puzzle fetch task failed"),
                }
            }
        }

        if let Some(request_id) = session.take_puzzle_request() {
            match &puzzles {
                Some(source) => {
                    let source = source.clone();
                    fetches.spawn(async move {
                        (request_id, fetch_puzzle_or_fallback(source.as_ref()).await)
                    });
                }
                None => {
                    session.install_puzzle(
                        request_id,
                        Puzzle::fallback(),
                        Some(FALLBACK_NOTICE.to_string()),
                    );
                }
            }
        }

        snapshot_tx.send_replace(session.snapshot());
    }
    info!("session driver stopped");
}

fn apply_command(session: &mut Session, command: SessionCommand) {
    match command {
        SessionCommand::Start { difficulty } => {
            if let Err(e) = session.start(&difficulty) {
                warn!(error = %e, "start rejected");
            }
        }
        SessionCommand::Pause => {
            session.pause();
        }
        SessionCommand::Resume => {
            session.resume();
        }
        SessionCommand::Move { direction } => session.move_player(direction),
        SessionCommand::MoveTo { x, y } => session.move_player_to(x, y),
        SessionCommand::UsePowerUp { id } => {
            session.use_power_up(id);
        }
        SessionCommand::SubmitAnswer { answer } => {
            session.submit_answer(&answer);
        }
    }
}
