// One game instance: lifecycle, counters, entities and puzzle progress.

use tracing::{debug, info};

use crate::domain::systems::{activate_power_up, integrate, resolve_contacts, spawn_power_up, spawn_tick};
use crate::domain::tuning::{DifficultyProfile, EngineConfig, GameVariant, PuzzleDeck, TimesUpPolicy};
use crate::domain::{
    ConfigError, Counters, Direction, EntityId, EntityKind, EntitySnapshot, EntityStore, GameEvent,
    Position, PowerUpEffect, Puzzle, PuzzleView, RandomSource, SessionError, SessionSnapshot,
    SessionState,
};

#[derive(Debug, Default)]
struct ChallengeProgress {
    current: Option<Puzzle>,
    // Next index into a builtin deck.
    cursor: usize,
    streak: u32,
    hints_remaining: u32,
    solved: u32,
    notice: Option<String>,
    // Remote puzzle the session is waiting on, and whether the driver has picked it up.
    awaiting: Option<u64>,
    fetch_requested: bool,
    next_request_id: u64,
}

/// State machine for a single player's run.
///
/// The session never sleeps or performs I/O. The driver calls [`Session::fast_tick`]
/// and [`Session::slow_tick`] on its timers and fulfils remote puzzle requests.
pub struct Session {
    variant: GameVariant,
    config: EngineConfig,
    rng: Box<dyn RandomSource + Send>,
    state: SessionState,
    difficulty: DifficultyProfile,
    counters: Counters,
    store: EntityStore,
    tick: u64,
    challenge: ChallengeProgress,
    events: Vec<GameEvent>,
}

impl Session {
    /// Builds a session in `menu`. Refuses configs that fail validation.
    pub fn new(
        variant: GameVariant,
        config: EngineConfig,
        rng: Box<dyn RandomSource + Send>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let difficulty = *config
            .default_difficulty()
            .ok_or(ConfigError::InvalidValue {
                field: "difficulties",
                reason: "at least one difficulty is required",
            })?;
        let counters = Counters::new(&config.scoring, difficulty.time_limit_secs);
        let store = EntityStore::new(config.playfield.bounds, config.playfield.player_start);
        let challenge = ChallengeProgress {
            hints_remaining: config.challenges.hints,
            ..ChallengeProgress::default()
        };

        Ok(Self {
            variant,
            config,
            rng,
            state: SessionState::Menu,
            difficulty,
            counters,
            store,
            tick: 0,
            challenge,
            events: Vec::new(),
        })
    }

    pub fn variant(&self) -> GameVariant {
        self.variant
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Begins a fresh run from `menu` or `game-over`.
    pub fn start(&mut self, difficulty: &str) -> Result<(), SessionError> {
        if matches!(self.state, SessionState::Playing | SessionState::Paused) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "start",
            });
        }
        let profile = *self.config.difficulty(difficulty)?;

        self.difficulty = profile;
        self.counters = Counters::new(&self.config.scoring, profile.time_limit_secs);
        self.store.clear();
        self.store.set_player_position(self.config.playfield.player_start);
        let next_request_id = self.challenge.next_request_id;
        self.challenge = ChallengeProgress {
            hints_remaining: self.config.challenges.hints,
            next_request_id,
            ..ChallengeProgress::default()
        };
        self.events.clear();
        self.state = SessionState::Playing;

        info!(
            variant = self.variant.slug(),
            difficulty = difficulty.trim(),
            time_limit = profile.time_limit_secs,
            "session started"
        );
        self.next_challenge();
        Ok(())
    }

    /// Returns true when the session actually paused.
    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        self.state = SessionState::Paused;
        true
    }

    /// Returns true when the session actually resumed.
    pub fn resume(&mut self) -> bool {
        if self.state != SessionState::Paused {
            return false;
        }
        self.state = SessionState::Playing;
        true
    }

    pub fn move_player(&mut self, direction: Direction) {
        if self.state != SessionState::Playing {
            return;
        }
        let (dx, dy) = direction.offset(self.config.playfield.move_step);
        let current = self.store.player();
        self.store
            .set_player_position(Position::new(current.x + dx, current.y + dy));
    }

    pub fn move_player_to(&mut self, x: f32, y: f32) {
        if self.state != SessionState::Playing || !x.is_finite() || !y.is_finite() {
            return;
        }
        self.store.set_player_position(Position::new(x, y));
    }

    /// Activates a power-up on the field. Unknown ids are ignored, and hint or
    /// skip power-ups stay put while no puzzle is on screen.
    pub fn use_power_up(&mut self, id: EntityId) -> Option<PowerUpEffect> {
        if self.state != SessionState::Playing {
            return None;
        }
        let needs_puzzle = self.store.get(id).is_some_and(|e| {
            matches!(
                e.kind,
                EntityKind::PowerUp {
                    effect: PowerUpEffect::RevealHint | PowerUpEffect::SkipChallenge
                }
            )
        });
        if needs_puzzle && self.challenge.current.is_none() {
            debug!(entity_id = id, "no puzzle on screen, power-up kept");
            return None;
        }
        let effect = activate_power_up(&mut self.store, &mut self.counters, id)?;
        debug!(entity_id = id, ?effect, "power-up used");
        self.events.push(GameEvent::PowerUpUsed {
            entity_id: id,
            effect,
        });

        match effect {
            PowerUpEffect::RevealHint => self.reveal_hint(),
            PowerUpEffect::SkipChallenge => self.next_challenge(),
            _ => {}
        }
        Some(effect)
    }

    /// Checks an answer against the current puzzle. Returns true when it was correct.
    pub fn submit_answer(&mut self, answer: &str) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        let Some(puzzle) = self.challenge.current.as_ref() else {
            return false;
        };
        let challenges = &self.config.challenges;

        if puzzle.accepts(answer) {
            let reward = puzzle.reward.unwrap_or(self.difficulty.base_points);
            let points = reward
                + i64::from(self.challenge.streak) * challenges.streak_bonus
                + i64::from(self.counters.time_remaining) * challenges.time_bonus_per_second;
            self.counters.add_score(points);
            self.challenge.streak += 1;
            self.challenge.solved += 1;
            info!(
                points,
                streak = self.challenge.streak,
                score = self.counters.score,
                "puzzle solved"
            );
            self.events.push(GameEvent::PuzzleSolved { points });
            self.next_challenge();
            return true;
        }

        let policy = challenges.wrong_answer;
        let solution = policy.advance.then(|| puzzle.solution.clone());
        self.challenge.streak = 0;
        self.counters
            .subtract_score(policy.penalty, self.config.scoring.clamp_score_at_zero);
        self.events.push(GameEvent::WrongAnswer { solution });

        if policy.lose_life {
            self.counters.lose_lives(1);
            if self.counters.is_out_of_lives() {
                self.game_over();
                return false;
            }
        }
        if policy.advance {
            self.next_challenge();
        }
        false
    }

    /// Spawn, move, collide, then progression. Does nothing unless playing.
    pub fn fast_tick(&mut self) {
        if self.state != SessionState::Playing {
            return;
        }
        self.tick += 1;

        let playfield = self.config.playfield;
        spawn_tick(
            &mut self.store,
            &self.config.spawn,
            &playfield,
            self.counters.level,
            self.difficulty.spawn_scale,
            &mut *self.rng,
        );
        integrate(
            &mut self.store,
            playfield.tick_scale,
            self.counters.speed_multiplier,
            playfield.exit_y,
        );
        let contacts = resolve_contacts(&mut self.store, &mut self.counters, &self.config.scoring);
        self.events.extend(contacts);

        if self.counters.is_out_of_lives() {
            self.game_over();
            return;
        }

        let rules = self.config.scoring;
        if rules.level_threshold > 0
            && self.counters.score > i64::from(self.counters.level) * rules.level_threshold
        {
            self.counters.level += 1;
            self.counters.time_remaining = self
                .counters
                .time_remaining
                .saturating_add(rules.level_time_bonus);
            self.counters.speed_multiplier += rules.speed_step;
            info!(level = self.counters.level, score = self.counters.score, "level up");
            self.events.push(GameEvent::LevelUp {
                level: self.counters.level,
            });
        }
    }

    /// One second of countdown. The clock holds while a remote puzzle is loading.
    pub fn slow_tick(&mut self) {
        if self.state != SessionState::Playing || self.challenge.awaiting.is_some() {
            return;
        }
        self.counters.time_remaining = self.counters.time_remaining.saturating_sub(1);
        if self.counters.time_remaining > 0 {
            return;
        }

        self.events.push(GameEvent::TimesUp);
        match self.config.times_up {
            TimesUpPolicy::GameOver => self.game_over(),
            TimesUpPolicy::AdvanceChallenge { penalty } => {
                info!(penalty, "time's up, moving to the next puzzle");
                self.counters
                    .subtract_score(penalty, self.config.scoring.clamp_score_at_zero);
                self.challenge.streak = 0;
                self.next_challenge();
            }
        }
    }

    /// Hands the driver a remote puzzle request id, once per request.
    pub fn take_puzzle_request(&mut self) -> Option<u64> {
        if !self.challenge.fetch_requested {
            return None;
        }
        self.challenge.fetch_requested = false;
        self.challenge.awaiting
    }

    /// Installs a fetched puzzle. Stale deliveries (old request, run ended) are dropped.
    pub fn install_puzzle(
        &mut self,
        request_id: u64,
        puzzle: Puzzle,
        notice: Option<String>,
    ) -> bool {
        if self.state == SessionState::GameOver || self.challenge.awaiting != Some(request_id) {
            debug!(request_id, "dropping stale puzzle");
            return false;
        }
        self.challenge.awaiting = None;
        self.challenge.current = Some(puzzle);
        self.challenge.notice = notice;
        true
    }

    /// Current view of the session. Drains the pending events.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        SessionSnapshot {
            tick: self.tick,
            variant: self.variant,
            state: self.state,
            score: self.counters.score,
            lives: self.counters.lives,
            time_remaining: self.counters.time_remaining,
            level: self.counters.level,
            speed_multiplier: self.counters.speed_multiplier,
            player: self.store.player(),
            entities: self.store.all().iter().map(EntitySnapshot::from).collect(),
            puzzle: self.challenge.current.as_ref().map(PuzzleView::from),
            streak: self.challenge.streak,
            hints_remaining: self.challenge.hints_remaining,
            puzzles_solved: self.challenge.solved,
            notice: self.challenge.notice.clone(),
            events: std::mem::take(&mut self.events),
        }
    }

    // Moves to the next puzzle (or ends the run when a builtin deck runs out),
    // resets the clock, and may drop a power-up.
    fn next_challenge(&mut self) {
        let advanced_before = self.challenge.current.is_some() || self.challenge.solved > 0;
        self.challenge.notice = None;

        match &self.config.challenges.deck {
            PuzzleDeck::None => return,
            PuzzleDeck::Builtin(puzzles) => {
                let index = if self.config.challenges.repeat_deck && !puzzles.is_empty() {
                    self.challenge.cursor % puzzles.len()
                } else {
                    self.challenge.cursor
                };
                self.challenge.current = puzzles.get(index).cloned();
                self.challenge.cursor += 1;
            }
            PuzzleDeck::Remote => {
                self.challenge.current = None;
                self.challenge.next_request_id += 1;
                self.challenge.awaiting = Some(self.challenge.next_request_id);
                self.challenge.fetch_requested = true;
            }
        }

        let exhausted = self.challenge.current.is_none() && self.challenge.awaiting.is_none();
        if exhausted {
            info!(solved = self.challenge.solved, "puzzle deck exhausted");
            self.game_over();
            return;
        }

        if !self.config.challenges.shared_clock {
            self.counters.time_remaining = self.difficulty.time_limit_secs;
        }

        let drop_chance = self.config.challenges.power_up_chance_on_advance;
        if advanced_before && self.rng.chance(drop_chance) {
            if let Some(id) = spawn_power_up(
                &mut self.store,
                &self.config.spawn,
                &self.config.playfield,
                &mut *self.rng,
            ) {
                debug!(entity_id = id, "power-up dropped");
            }
        }
    }

    fn reveal_hint(&mut self) {
        if self.challenge.hints_remaining == 0 {
            return;
        }
        let Some(puzzle) = self.challenge.current.as_ref() else {
            return;
        };
        self.challenge.hints_remaining -= 1;
        self.challenge.notice = Some(puzzle.hint());
    }

    fn game_over(&mut self) {
        self.state = SessionState::GameOver;
        self.challenge.awaiting = None;
        self.challenge.fetch_requested = false;
        info!(
            variant = self.variant.slug(),
            score = self.counters.score,
            level = self.counters.level,
            "game over"
        );
        self.events.push(GameEvent::GameOver {
            score: self.counters.score,
        });
    }

    #[cfg(test)]
    pub(crate) fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{
        ScriptedRolls, collectible, hazard, power_up, priced_power_up,
    };
    use crate::domain::{FALLBACK_NOTICE, Rarity, Velocity};

    fn session_with(variant: GameVariant, config: EngineConfig, rolls: ScriptedRolls) -> Session {
        Session::new(variant, config, Box::new(rolls)).expect("valid config")
    }

    fn quiet(variant: GameVariant) -> Session {
        session_with(variant, EngineConfig::for_variant(variant), ScriptedRolls::quiet())
    }

    fn playing(variant: GameVariant) -> Session {
        let mut session = quiet(variant);
        session.start("normal").expect("start");
        session
    }

    fn at_player(session: &Session) -> Position {
        session.store().player()
    }

    #[test]
    fn when_hazard_sits_on_the_player_then_one_life_is_lost() {
        let mut session = playing(GameVariant::CodeCollection);
        let id = session.store_mut().allocate_id();
        let pos = at_player(&session);
        session.store_mut().add(hazard(id, 1, pos, Velocity::ZERO));

        session.fast_tick();

        assert_eq!(session.counters().lives, 2);
        assert!(!session.store().contains(id));
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn when_legendary_is_collected_then_score_doubles_and_a_life_is_granted() {
        let mut session = playing(GameVariant::CodeCollection);
        let id = session.store_mut().allocate_id();
        let pos = at_player(&session);
        session
            .store_mut()
            .add(collectible(id, Rarity::Legendary, 100, pos));

        session.fast_tick();

        assert_eq!(session.counters().score, 200);
        assert_eq!(session.counters().lives, 4);
    }

    #[test]
    fn when_last_second_runs_out_then_collection_game_ends() {
        let mut session = playing(GameVariant::CodeCollection);
        session.counters_mut().time_remaining = 1;

        session.slow_tick();

        assert_eq!(session.counters().time_remaining, 0);
        assert_eq!(session.state(), SessionState::GameOver);
        let events = session.snapshot().events;
        assert!(events.contains(&GameEvent::TimesUp));
        assert!(events.contains(&GameEvent::GameOver { score: 0 }));
    }

    #[test]
    fn when_game_is_over_then_ticks_and_commands_change_nothing() {
        let mut session = playing(GameVariant::CodeCollection);
        session.counters_mut().time_remaining = 1;
        session.slow_tick();
        let before = session.snapshot();

        session.fast_tick();
        session.slow_tick();
        session.move_player(Direction::Left);
        assert!(!session.pause());
        assert!(!session.resume());

        let after = session.snapshot();
        assert_eq!(after.score, before.score);
        assert_eq!(after.lives, before.lives);
        assert_eq!(after.time_remaining, before.time_remaining);
        assert_eq!(after.tick, before.tick);
        assert_eq!(after.player, before.player);
        assert_eq!(after.state, SessionState::GameOver);
    }

    #[test]
    fn when_lives_run_out_then_the_run_ends() {
        let mut session = playing(GameVariant::CodeCollection);
        session.counters_mut().lives = 1;
        let id = session.store_mut().allocate_id();
        let pos = at_player(&session);
        session.store_mut().add(hazard(id, 3, pos, Velocity::ZERO));

        session.fast_tick();

        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.counters().lives, -2);
    }

    #[test]
    fn when_score_passes_the_threshold_then_level_time_and_speed_rise() {
        let mut session = playing(GameVariant::CodeCollection);
        session.counters_mut().score = 95;
        let id = session.store_mut().allocate_id();
        let pos = at_player(&session);
        session
            .store_mut()
            .add(collectible(id, Rarity::Common, 10, pos));

        session.fast_tick();

        let counters = session.counters();
        assert_eq!(counters.level, 2);
        assert_eq!(counters.time_remaining, 70);
        assert!((counters.speed_multiplier - 1.2).abs() < 1e-6);
        assert!(session
            .snapshot()
            .events
            .contains(&GameEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn when_score_equals_the_threshold_then_level_holds() {
        let mut session = playing(GameVariant::CodeCollection);
        session.counters_mut().score = 100;

        session.fast_tick();

        assert_eq!(session.counters().level, 1);
    }

    #[test]
    fn when_only_collecting_then_score_never_decreases() {
        let mut config = EngineConfig::code_collection();
        config.spawn.hazard_chance = 0.0;
        config.spawn.collectible_chance = 1.0;
        let mut rolls = Vec::new();
        for i in 0..200 {
            // chance, pick, speed, angle, x
            rolls.extend([0.0, (i % 7) as f32 / 7.0, 0.5, 0.5, 0.5]);
        }
        let mut session = session_with(GameVariant::CodeCollection, config, ScriptedRolls::new(rolls));
        session.start("normal").expect("start");

        let mut last = 0;
        for tick in 0..2_000 {
            if tick % 50 == 0 {
                session.move_player(Direction::Up);
            }
            session.fast_tick();
            let score = session.counters().score;
            assert!(score >= last);
            last = score;
        }
    }

    #[test]
    fn when_difficulty_is_unknown_then_start_is_refused_and_state_is_kept() {
        let mut session = quiet(GameVariant::CodeCollection);

        let err = session.start("nightmare").expect_err("unknown difficulty");

        assert_eq!(
            err,
            SessionError::Config(ConfigError::UnknownDifficulty("nightmare".to_string()))
        );
        assert_eq!(session.state(), SessionState::Menu);
    }

    #[test]
    fn when_starting_twice_then_second_start_is_an_invalid_transition() {
        let mut session = playing(GameVariant::CodeCollection);
        session.pause();

        let err = session.start("easy").expect_err("already running");

        assert_eq!(
            err,
            SessionError::InvalidTransition {
                from: SessionState::Paused,
                action: "start"
            }
        );
    }

    #[test]
    fn when_restarting_after_game_over_then_counters_and_field_reset() {
        let mut session = playing(GameVariant::CodeCollection);
        session.counters_mut().score = 40;
        session.counters_mut().time_remaining = 1;
        let id = session.store_mut().allocate_id();
        session
            .store_mut()
            .add(collectible(id, Rarity::Common, 10, Position::new(10.0, 10.0)));
        session.move_player(Direction::Right);
        session.slow_tick();
        assert_eq!(session.state(), SessionState::GameOver);

        session.start("hard").expect("restart");

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Playing);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.lives, 3);
        assert_eq!(snapshot.time_remaining, 45);
        assert_eq!(snapshot.level, 1);
        assert!(snapshot.entities.is_empty());
        assert_eq!(snapshot.player, Position::new(50.0, 80.0));
    }

    #[test]
    fn when_paused_then_ticks_are_ignored_until_resume() {
        let mut session = playing(GameVariant::CodeCollection);
        assert!(session.pause());
        assert!(!session.pause());

        session.slow_tick();
        session.fast_tick();
        assert_eq!(session.counters().time_remaining, 60);
        assert_eq!(session.snapshot().tick, 0);

        assert!(session.resume());
        session.slow_tick();
        assert_eq!(session.counters().time_remaining, 59);
    }

    #[test]
    fn when_moving_past_the_edge_then_player_is_clamped() {
        let mut session = playing(GameVariant::CodeCollection);
        for _ in 0..30 {
            session.move_player(Direction::Down);
            session.move_player(Direction::Left);
        }
        assert_eq!(session.store().player(), Position::new(10.0, 90.0));

        session.move_player_to(500.0, -3.0);
        assert_eq!(session.store().player(), Position::new(90.0, 20.0));
    }

    #[test]
    fn when_logic_puzzle_is_solved_then_reward_includes_streak_and_time_bonus() {
        let mut session = playing(GameVariant::LogicPuzzle);
        assert!(session.snapshot().puzzle.is_some());

        assert!(session.submit_answer("1, 3, 2, 3, 4"));
        // 100 + 0 * 10 + 30 * 2
        assert_eq!(session.counters().score, 160);

        session.slow_tick();
        assert!(session.submit_answer("2,3,4,5"));
        // 150 + 1 * 10 + 29 * 2
        assert_eq!(session.counters().score, 160 + 218);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.streak, 2);
        assert_eq!(snapshot.puzzles_solved, 2);
        assert_eq!(snapshot.time_remaining, 30);
    }

    #[test]
    fn when_logic_answer_is_wrong_then_streak_resets_and_penalty_is_clamped() {
        let mut session = playing(GameVariant::LogicPuzzle);
        assert!(session.submit_answer("1,3,2,3,4"));
        let score = session.counters().score;

        assert!(!session.submit_answer("nope"));

        assert_eq!(session.counters().score, score - 25);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.streak, 0);
        assert!(snapshot
            .events
            .contains(&GameEvent::WrongAnswer { solution: None }));
        // Logic puzzles retry the same question.
        assert_eq!(
            snapshot.puzzle.map(|p| p.question),
            Some("Memory Sequence: recreate the sequence".to_string())
        );

        let mut fresh = playing(GameVariant::LogicPuzzle);
        fresh.submit_answer("wrong");
        assert_eq!(fresh.counters().score, 0);
    }

    #[test]
    fn when_logic_timer_expires_then_penalty_applies_and_clock_resets() {
        let mut session = playing(GameVariant::LogicPuzzle);
        session.counters_mut().score = 30;
        session.counters_mut().time_remaining = 1;

        session.slow_tick();

        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.counters().score, 0);
        assert_eq!(session.counters().time_remaining, 30);
        assert_eq!(
            session.snapshot().puzzle.map(|p| p.question),
            Some("Memory Sequence: recreate the sequence".to_string())
        );
    }

    #[test]
    fn when_builtin_deck_runs_out_then_the_run_ends() {
        let mut session = playing(GameVariant::LogicPuzzle);
        for answer in ["1,3,2,3,4", "2,3,4,5", "1,2,3"] {
            assert!(session.submit_answer(answer));
        }
        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.snapshot().puzzles_solved, 3);
    }

    #[test]
    fn when_puzzle_advances_and_drop_roll_hits_then_a_power_up_appears() {
        // First puzzle is dealt without a roll; the solve rolls 0.1 (< 0.3), then pick, x, y.
        let rolls = ScriptedRolls::new([0.1, 0.0, 0.5, 0.5]);
        let mut session = session_with(GameVariant::LogicPuzzle, EngineConfig::logic_puzzle(), rolls);
        session.start("normal").expect("start");

        session.submit_answer("1,3,2,3,4");

        assert_eq!(session.store().power_up_count(), 1);
        assert_eq!(session.store().all()[0].label, "Time Freeze");
    }

    #[test]
    fn when_hint_power_up_is_used_then_a_hint_is_shown_and_counted() {
        let mut session = playing(GameVariant::HeartPuzzle);
        let request = session.take_puzzle_request().expect("first puzzle requested");
        session.install_puzzle(request, Puzzle::new("img.png", "7"), None);
        let id = session.store_mut().allocate_id();
        session
            .store_mut()
            .add(power_up(id, PowerUpEffect::RevealHint, Position::new(40.0, 40.0)));

        assert_eq!(session.use_power_up(id), Some(PowerUpEffect::RevealHint));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.hints_remaining, 2);
        assert_eq!(
            snapshot.notice.as_deref(),
            Some("The answer is between 2 and 12")
        );
    }

    #[test]
    fn when_skip_power_up_is_used_then_next_puzzle_is_dealt_without_penalty() {
        let mut session = playing(GameVariant::LogicPuzzle);
        session.counters_mut().score = 80;
        let id = session.store_mut().allocate_id();
        session
            .store_mut()
            .add(power_up(id, PowerUpEffect::SkipChallenge, Position::new(40.0, 40.0)));

        session.use_power_up(id);

        assert_eq!(session.counters().score, 80);
        assert_eq!(
            session.snapshot().puzzle.map(|p| p.question),
            Some("Memory Sequence: recreate the sequence".to_string())
        );
    }

    #[test]
    fn when_heart_answer_is_wrong_then_solution_is_revealed_and_a_new_puzzle_is_requested() {
        let mut session = playing(GameVariant::HeartPuzzle);
        let first = session.take_puzzle_request().expect("request");
        assert!(session.install_puzzle(first, Puzzle::new("img.png", "9"), None));

        assert!(!session.submit_answer("4"));

        let second = session.take_puzzle_request().expect("next request");
        assert_ne!(first, second);
        let snapshot = session.snapshot();
        assert!(snapshot.puzzle.is_none());
        assert!(snapshot.events.contains(&GameEvent::WrongAnswer {
            solution: Some("9".to_string())
        }));
    }

    #[test]
    fn when_heart_puzzle_is_solved_then_difficulty_base_points_apply() {
        let mut session = quiet(GameVariant::HeartPuzzle);
        session.start("expert").expect("start");
        let request = session.take_puzzle_request().expect("request");
        session.install_puzzle(request, Puzzle::new("img.png", "3"), None);

        assert!(session.submit_answer("3"));

        // 500 + 0 streak + 15 s * 2
        assert_eq!(session.counters().score, 530);
    }

    #[test]
    fn when_remote_puzzle_is_loading_then_the_clock_holds() {
        let mut session = playing(GameVariant::HeartPuzzle);
        assert!(session.take_puzzle_request().is_some());
        assert!(session.take_puzzle_request().is_none());

        session.slow_tick();
        assert_eq!(session.counters().time_remaining, 30);
    }

    #[test]
    fn when_a_stale_puzzle_arrives_then_it_is_ignored() {
        let mut session = playing(GameVariant::HeartPuzzle);
        let first = session.take_puzzle_request().expect("request");
        session.install_puzzle(first, Puzzle::new("a.png", "1"), None);
        session.submit_answer("wrong");

        assert!(!session.install_puzzle(first, Puzzle::new("late.png", "2"), None));
        assert!(session.snapshot().puzzle.is_none());
    }

    #[test]
    fn when_fallback_puzzle_is_installed_then_notice_is_shown_and_play_continues() {
        let mut session = playing(GameVariant::HeartPuzzle);
        let request = session.take_puzzle_request().expect("request");

        session.install_puzzle(request, Puzzle::fallback(), Some(FALLBACK_NOTICE.to_string()));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Playing);
        assert_eq!(snapshot.notice.as_deref(), Some(FALLBACK_NOTICE));
        assert_eq!(
            snapshot.puzzle.map(|p| p.question),
            Some("What is 15 + 27?".to_string())
        );
        assert!(session.submit_answer("42"));
    }

    #[test]
    fn when_snapshot_is_taken_then_events_are_drained() {
        let mut session = playing(GameVariant::CodeCollection);
        session.counters_mut().time_remaining = 1;
        session.slow_tick();

        assert!(!session.snapshot().events.is_empty());
        assert!(session.snapshot().events.is_empty());
    }

    #[test]
    fn when_mashup_answer_is_wrong_on_the_last_life_then_the_run_ends() {
        let mut session = playing(GameVariant::Mashup);
        session.counters_mut().lives = 1;
        assert_eq!(
            session.snapshot().puzzle.map(|p| p.question),
            Some("2 + 2 = ?".to_string())
        );

        assert!(!session.submit_answer("5"));

        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.counters().lives, 0);
        let events = session.snapshot().events;
        assert!(events.contains(&GameEvent::WrongAnswer { solution: None }));
        assert!(events.contains(&GameEvent::GameOver { score: 0 }));
    }

    #[test]
    fn when_mashup_answer_is_wrong_with_lives_left_then_the_question_stays() {
        let mut session = playing(GameVariant::Mashup);

        assert!(!session.submit_answer("22"));

        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.counters().lives, 2);
        assert_eq!(
            session.snapshot().puzzle.map(|p| p.question),
            Some("2 + 2 = ?".to_string())
        );
    }

    #[test]
    fn when_mashup_questions_run_out_then_the_deck_repeats_on_the_same_clock() {
        let mut session = playing(GameVariant::Mashup);
        session.counters_mut().time_remaining = 40;

        assert!(session.submit_answer("4"));
        assert!(session.submit_answer("paris"));
        assert!(session.submit_answer("10"));

        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.counters().score, 150);
        assert_eq!(session.counters().time_remaining, 40);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.puzzles_solved, 3);
        assert_eq!(
            snapshot.puzzle.map(|p| p.question),
            Some("2 + 2 = ?".to_string())
        );
    }

    #[test]
    fn when_remote_puzzle_is_still_loading_then_skip_and_hint_stay_on_the_field() {
        let mut session = playing(GameVariant::HeartPuzzle);
        let request = session.take_puzzle_request().expect("first puzzle requested");
        let skip = session.store_mut().allocate_id();
        session
            .store_mut()
            .add(power_up(skip, PowerUpEffect::SkipChallenge, Position::new(40.0, 40.0)));
        let hint = session.store_mut().allocate_id();
        session
            .store_mut()
            .add(power_up(hint, PowerUpEffect::RevealHint, Position::new(60.0, 40.0)));

        assert_eq!(session.use_power_up(skip), None);
        assert_eq!(session.use_power_up(hint), None);
        assert!(session.store().contains(skip));
        assert!(session.store().contains(hint));
        assert_eq!(session.take_puzzle_request(), None);

        assert!(session.install_puzzle(request, Puzzle::new("img.png", "3"), None));
        assert_eq!(session.use_power_up(skip), Some(PowerUpEffect::SkipChallenge));
        assert!(session.take_puzzle_request().is_some());
    }

    #[test]
    fn when_heart_hint_is_bought_then_its_price_comes_off_the_score() {
        let mut session = playing(GameVariant::HeartPuzzle);
        let request = session.take_puzzle_request().expect("first puzzle requested");
        session.install_puzzle(request, Puzzle::new("img.png", "7"), None);
        let id = session.store_mut().allocate_id();
        session.store_mut().add(priced_power_up(
            id,
            PowerUpEffect::RevealHint,
            100,
            Position::new(40.0, 40.0),
        ));

        session.counters_mut().score = 60;
        assert_eq!(session.use_power_up(id), None);
        assert_eq!(session.snapshot().hints_remaining, 3);

        session.counters_mut().score = 160;
        assert_eq!(session.use_power_up(id), Some(PowerUpEffect::RevealHint));
        assert_eq!(session.counters().score, 60);
        assert_eq!(session.snapshot().hints_remaining, 2);
    }
}
