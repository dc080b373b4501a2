//! Run Controller: one attempt from aiming to landing.
//!
//! ## Phases
//!
//! ```text
//! Idle ──pointer-down near character──▶ Aiming ──pointer-up──▶ Launched ──stopped / gate──▶ Ended
//! ```
//!
//! The phase only ever moves forward. A run launches at most once; a release
//! too short to count snaps the character back to the anchor and leaves the
//! run in `Aiming` so the player can grab it again.
//!
//! ## Tick order
//!
//! Host callbacks (`on_pointer_*`, `on_stomp_input`, `on_overlap`) only queue.
//! [`RunController::on_tick`] then runs, to completion:
//!
//! 1. queued input, in arrival order
//! 2. scheduled tasks now due (stomp cooldown, magnet pulses)
//! 3. queued overlaps (ignored unless `Launched`)
//! 4. one flight step, and the termination check
//!
//! Entering `Ended` cancels every pending task and folds the run's session
//! currency and best distance into the [`ProgressionStore`] exactly once.

use std::collections::VecDeque;
use std::time::Duration;

use bevy::log::{debug, info};
use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::collision::{self, GateOutcome, PowerUp, ResolveContext, Resolution};
use crate::config::TuningConfig;
use crate::effects::{Effect, EffectCue, RunSnapshot};
use crate::error::GameResult;
use crate::flight::{FlightParams, FlightState, FlightStep};
use crate::launch;
use crate::level::{BodyRef, Level};
use crate::progression::{ProgressionStore, UpgradeLevels};
use crate::schedule::{Scheduler, TimerTask};
use crate::upgrades::UpgradeCategory;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunPhase {
    #[default]
    Idle,
    Aiming,
    Launched,
    Ended,
}

/// Why a run reached [`RunPhase::Ended`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    Stopped,
    GateUnlocked,
}

/// Queued host input, applied at the start of the next tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunInput {
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp(Vec2),
    Stomp,
}

/// Everything about the current run. Discarded when the next run starts.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub phase: RunPhase,
    pub character: FlightState,
    /// Where the character rests before launch; the slingshot origin.
    pub anchor: Vec2,
    /// Pointer position while a drag is held.
    pub pointer: Option<Vec2>,
    pub can_launch: bool,
    pub stomp_available: bool,
    pub session_currency: u32,
    pub distance: u32,
    pub best_distance: u32,
    pub end: Option<RunEnd>,
}

impl RunState {
    pub fn new(config: &TuningConfig) -> Self {
        let anchor = Vec2::new(config.start_x, config.start_y);
        Self {
            phase: RunPhase::Idle,
            character: FlightState::new(anchor, Vec2::ZERO),
            anchor,
            pointer: None,
            can_launch: true,
            stomp_available: true,
            session_currency: 0,
            distance: 0,
            best_distance: 0,
            end: None,
        }
    }
}

/// What the host needs to draw the slingshot while aiming.
#[derive(Debug, Clone, PartialEq)]
pub struct AimGuide {
    pub anchor: Vec2,
    pub character: Vec2,
    pub pointer: Vec2,
    pub power_ratio: f32,
    pub preview: Vec<Vec2>,
}

/// Owns the current [`RunState`], its level and its timers.
pub struct RunController {
    config: TuningConfig,
    rng: StdRng,
    level: Level,
    /// Bumped whenever `level` is replaced, so the host knows to respawn.
    level_generation: u64,
    state: RunState,
    scheduler: Scheduler,
    inputs: VecDeque<RunInput>,
    overlaps: VecDeque<BodyRef>,
    effects: Vec<Effect>,
    finalized: bool,
}

impl RunController {
    /// New controller seeded from `config.level_seed`, or from entropy.
    pub fn new(config: TuningConfig) -> Self {
        let rng = match config.level_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: TuningConfig, mut rng: StdRng) -> Self {
        let level = Level::generate(&mut rng, &config);
        Self::with_level(config, level, rng)
    }

    /// Start on a hand-built level; later runs are generated from `rng`.
    pub fn with_level(config: TuningConfig, level: Level, rng: StdRng) -> Self {
        let state = RunState::new(&config);
        Self {
            config,
            rng,
            level,
            level_generation: 0,
            state,
            scheduler: Scheduler::default(),
            inputs: VecDeque::new(),
            overlaps: VecDeque::new(),
            effects: Vec::new(),
            finalized: false,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    #[inline]
    pub fn config(&self) -> &TuningConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> &RunState {
        &self.state
    }

    #[inline]
    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    #[inline]
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[inline]
    pub fn level_generation(&self) -> u64 {
        self.level_generation
    }

    // ── Host callbacks ───────────────────────────────────────────────────────

    pub fn on_pointer_down(&mut self, position: Vec2) {
        self.inputs.push_back(RunInput::PointerDown(position));
    }

    pub fn on_pointer_move(&mut self, position: Vec2) {
        self.inputs.push_back(RunInput::PointerMove(position));
    }

    pub fn on_pointer_up(&mut self, position: Vec2) {
        self.inputs.push_back(RunInput::PointerUp(position));
    }

    pub fn on_stomp_input(&mut self) {
        self.inputs.push_back(RunInput::Stomp);
    }

    /// Broad-phase report that the character started overlapping `body`.
    pub fn on_overlap(&mut self, body: BodyRef) {
        self.overlaps.push_back(body);
    }

    /// Take the cues produced since the last call.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // ── Tick ─────────────────────────────────────────────────────────────────

    /// Advance the run by `dt`.
    pub fn on_tick(&mut self, dt: Duration, store: &mut ProgressionStore) {
        while let Some(input) = self.inputs.pop_front() {
            self.apply_input(input, store);
        }

        for task in self.scheduler.advance(dt) {
            self.fire(task);
        }

        while let Some(body) = self.overlaps.pop_front() {
            if self.state.phase != RunPhase::Launched {
                continue;
            }
            self.resolve(body, store);
        }

        if self.state.phase == RunPhase::Launched {
            self.fly(dt, store);
        }
    }

    fn apply_input(&mut self, input: RunInput, store: &ProgressionStore) {
        let upgrades = store.upgrades();
        match (self.state.phase, input) {
            (RunPhase::Idle | RunPhase::Aiming, RunInput::PointerDown(position)) => {
                self.begin_aim(position)
            }
            (RunPhase::Aiming, RunInput::PointerMove(position)) => self.update_aim(position),
            (RunPhase::Aiming, RunInput::PointerUp(position)) => self.release(position, upgrades),
            (RunPhase::Launched, RunInput::PointerDown(_) | RunInput::Stomp) => self.stomp(upgrades),
            _ => {}
        }
    }

    fn begin_aim(&mut self, position: Vec2) {
        if !self.state.can_launch
            || position.distance(self.state.character.position) >= self.config.aim_grab_radius
        {
            return;
        }
        // The character only moves once the pointer does.
        self.state.phase = RunPhase::Aiming;
        self.state.pointer = Some(position);
    }

    fn update_aim(&mut self, position: Vec2) {
        if self.state.pointer.is_none() {
            return;
        }
        self.state.pointer = Some(position);
        self.state.character.position =
            launch::pulled_position(self.state.anchor, position, &self.config);
    }

    fn release(&mut self, position: Vec2, upgrades: &UpgradeLevels) {
        if self.state.pointer.take().is_none() {
            return;
        }

        let drag_start = self.state.character.position;
        if let Err(err) = launch::validate_drag(drag_start, position, &self.config) {
            debug!("{err}; snapping back");
            self.state.character.position = self.state.anchor;
            return;
        }

        let solution = launch::compute_launch_velocity(
            drag_start,
            position,
            upgrades.get(UpgradeCategory::Power),
            &self.config,
        );
        self.state.character.velocity = solution.velocity;
        self.state.character.on_ground = false;
        self.state.phase = RunPhase::Launched;
        self.state.can_launch = false;

        info!(
            "Launch: base power {:.0}, final power {:.0}, velocity ({:.1}, {:.1})",
            solution.base_power, solution.final_power, solution.velocity.x, solution.velocity.y
        );
        self.push_effect(
            EffectCue::Launch {
                power_ratio: solution.power_ratio(&self.config),
            },
            drag_start,
        );
    }

    fn stomp(&mut self, upgrades: &UpgradeLevels) {
        if !self.state.stomp_available {
            return;
        }

        let velocity = &mut self.state.character.velocity;
        velocity.y =
            self.config.stomp_base_impulse * upgrades.multiplier(UpgradeCategory::StompPower);
        velocity.x *= self.config.stomp_forward_boost;
        self.state.character.on_ground = false;
        self.state.stomp_available = false;

        let cooldown = Duration::from_millis(self.config.stomp_base_cooldown_ms)
            .div_f32(upgrades.multiplier(UpgradeCategory::StompCooldown));
        self.scheduler.schedule(cooldown, TimerTask::StompReady);
        debug!("Stomp; ready again in {:?}", cooldown);
        self.push_effect(EffectCue::Stomp, self.state.character.position);
    }

    fn fire(&mut self, task: TimerTask) {
        match task {
            TimerTask::StompReady => self.state.stomp_available = true,
            TimerTask::MagnetPulse => {
                let moved =
                    collision::magnet_pulse(&mut self.level, self.state.character.position, &self.config);
                if moved > 0 {
                    debug!("Magnet pulled {moved} collectibles");
                }
            }
        }
    }

    /// Queue every pulse of a Gummy Magnet up front at fixed offsets.
    fn start_magnet(&mut self) {
        let interval = self.config.magnet_interval_ms.max(1);
        let pulses = self.config.magnet_duration_ms / interval;
        for k in 1..=pulses {
            self.scheduler
                .schedule(Duration::from_millis(interval * k), TimerTask::MagnetPulse);
        }
    }

    fn resolve(&mut self, body: BodyRef, store: &mut ProgressionStore) {
        let ctx = ResolveContext {
            bounce_multiplier: store.upgrades().multiplier(UpgradeCategory::Bounce),
            unlocked_level: store.record().unlocked_level,
        };
        let at = self
            .level
            .position_of(body)
            .unwrap_or(self.state.character.position);

        let resolution = collision::resolve_overlap(
            body,
            &mut self.level,
            &mut self.state.character,
            ctx,
            &mut self.rng,
            &self.config,
        );
        self.state.session_currency = self.state.session_currency.saturating_add(resolution.reward());

        match resolution {
            Resolution::Ignored => {}
            Resolution::Collected { .. } => self.push_effect(EffectCue::Collect, at),
            Resolution::Squished {
                intensity,
                power_up,
                ..
            } => {
                self.push_effect(EffectCue::Squish { intensity }, at);
                if let Some(power_up) = power_up {
                    debug!("Power-up: {:?}", power_up);
                    if power_up == PowerUp::GummyMagnet {
                        self.start_magnet();
                    }
                    self.push_effect(EffectCue::PowerUp(power_up), self.state.character.position);
                }
            }
            Resolution::Gate { outcome, .. } => match outcome {
                GateOutcome::Unlocked => {
                    let level = store.unlock_next_level();
                    info!("Gate broken: level {} unlocked", level);
                    self.push_effect(EffectCue::LevelUnlocked { level }, at);
                    self.end_run(RunEnd::GateUnlocked, store);
                }
                GateOutcome::PassedThrough => self.push_effect(EffectCue::GateBreak, at),
                GateOutcome::Blocked => self.push_effect(EffectCue::GateLocked, at),
            },
        }
    }

    fn fly(&mut self, dt: Duration, store: &mut ProgressionStore) {
        let params = FlightParams {
            gravity: self.config.launch_gravity,
            ground_bounce: store.upgrades().multiplier(UpgradeCategory::Bounce),
        };
        let step = self.state.character.step(dt.as_secs_f32(), &params, &self.config);

        self.state.distance = self.state.character.distance_metres(&self.config);
        self.state.best_distance = self.state.best_distance.max(self.state.distance);

        if step == FlightStep::Stopped {
            self.end_run(RunEnd::Stopped, store);
        }
    }

    fn end_run(&mut self, reason: RunEnd, store: &mut ProgressionStore) {
        self.state.phase = RunPhase::Ended;
        self.state.end = Some(reason);
        self.state.pointer = None;
        self.scheduler.cancel_all();
        self.finalize(store);
    }

    /// Fold the run summary into the persistent record. Runs at most once.
    fn finalize(&mut self, store: &mut ProgressionStore) {
        if self.finalized {
            return;
        }
        self.finalized = true;

        let (distance, session_currency) = (self.state.best_distance, self.state.session_currency);
        store.merge_run(session_currency, distance);
        info!(
            "Run over ({:?}): {}m, {} hearts earned",
            self.state.end, distance, session_currency
        );
        self.push_effect(
            EffectCue::RunComplete {
                distance,
                session_currency,
            },
            self.state.character.position,
        );
    }

    // ── Between runs ─────────────────────────────────────────────────────────

    /// Throw away the current run and start a fresh one on a new level.
    ///
    /// Currency earned so far is kept even when the run never ended.
    pub fn restart(&mut self, store: &mut ProgressionStore) {
        if !self.finalized && self.state.session_currency > 0 {
            info!(
                "Run abandoned; keeping {} hearts",
                self.state.session_currency
            );
            store.add_currency(self.state.session_currency);
        }

        self.scheduler.cancel_all();
        self.inputs.clear();
        self.overlaps.clear();
        self.effects.clear();
        self.level = Level::generate(&mut self.rng, &self.config);
        self.level_generation += 1;
        self.state = RunState::new(&self.config);
        self.finalized = false;
    }

    /// Buy an upgrade level, cueing the result either way.
    pub fn purchase(
        &mut self,
        category: UpgradeCategory,
        store: &mut ProgressionStore,
    ) -> GameResult<u32> {
        let result = store.apply_upgrade_purchase(category);
        let cue = match &result {
            Ok(_) => EffectCue::Purchase(category),
            Err(err) => EffectCue::PurchaseRejected(err.player_message()),
        };
        self.push_effect(cue, self.state.character.position);
        result
    }

    // ── Presentation ─────────────────────────────────────────────────────────

    pub fn snapshot(&self, store: &ProgressionStore) -> RunSnapshot {
        let record = store.record();
        RunSnapshot {
            phase: self.state.phase,
            position: self.state.character.position,
            velocity: self.state.character.velocity,
            distance: self.state.distance,
            best_distance_this_run: self.state.best_distance,
            session_currency: self.state.session_currency,
            total_currency: record.currency,
            best_distance: record.best_distance,
            unlocked_level: record.unlocked_level,
            can_launch: self.state.can_launch,
            stomp_available: self.state.stomp_available,
            stomp_cooldown: self.scheduler.remaining(TimerTask::StompReady),
            magnet_active: self.scheduler.magnet_active(),
        }
    }

    /// Slingshot guide while a drag is held.
    pub fn aim_guide(&self) -> Option<AimGuide> {
        let pointer = self.state.pointer?;
        let anchor = self.state.anchor;
        Some(AimGuide {
            anchor,
            character: self.state.character.position,
            pointer,
            power_ratio: launch::aim_power_ratio(anchor, pointer),
            preview: launch::trajectory_preview(anchor, pointer, self.config.pre_launch_gravity),
        })
    }

    fn push_effect(&mut self, cue: EffectCue, position: Vec2) {
        self.effects.push(Effect::new(cue, position));
    }
}
