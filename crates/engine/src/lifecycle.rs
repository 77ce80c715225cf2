//! Mode lifecycle and the per-tick driver.
//!
//! A [`ModeEngine`] owns the player simulation, the mode variant and every
//! queue between them. Phases only move forward:
//!
//! ```text
//! Idle --start()--> Active --condition--> Ended(Victory | Defeat)
//! ```
//!
//! Each active tick runs in a fixed order:
//!
//! 1. Drain inbound peer messages, then queued actions.
//! 2. Advance the player simulation by one timestep.
//! 3. Mode update (timers, deliveries, opponent cadence) and due scheduled events.
//! 4. Defeat conditions, first match ends the mode.
//! 5. Victory conditions, only when lines, score or an opponent defeat changed.
//! 6. Flush outgoing peer messages.
//!
//! Once ended, ticks and actions are ignored.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, info};

use crate::collab::{MemoryRecordStore, PeerMessage, RecordStore, Transport};
use crate::condition::{Condition, ConditionContext, ConditionList, OutcomeReason};
use crate::config::ModeConfig;
use crate::core::GameState;
use crate::modes::{ModeKind, ModeSettings, ModeVariant};
use crate::notify::Notification;
use crate::opponent::DecisionPolicy;
use crate::schedule::Schedule;
use crate::stats::StatsSnapshot;
use crate::types::GameAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Victory(OutcomeReason),
    Defeat(OutcomeReason),
}

impl Outcome {
    pub fn reason(&self) -> &OutcomeReason {
        match self {
            Outcome::Victory(reason) | Outcome::Defeat(reason) => reason,
        }
    }

    pub fn is_victory(&self) -> bool {
        matches!(self, Outcome::Victory(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Active,
    Ended(Outcome),
}

/// Lifecycle bookkeeping. Frozen once the phase is `Ended`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModeState {
    pub phase: Phase,
    pub start_ms: Option<u64>,
    pub end_ms: Option<u64>,
    pub target_lines: Option<u32>,
    pub target_score: Option<u32>,
    pub time_limit_ms: Option<u64>,
}

impl ModeState {
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn ended(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.phase {
            Phase::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Deferred mode events, keyed by simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledEvent {
    /// Reset the blitz streak unless another clear happened since.
    ResetStreak { clears_seen: u32 },
}

/// Side effects collected while a tick runs.
#[derive(Debug, Default)]
pub(crate) struct Effects {
    pub notifications: VecDeque<Notification>,
    pub outbox: Vec<PeerMessage>,
    pub schedule: Schedule<ScheduledEvent>,
    pub victory_check: bool,
}

impl Effects {
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    pub fn send(&mut self, message: PeerMessage) {
        self.outbox.push(message);
    }

    pub fn schedule(&mut self, due_ms: u64, event: ScheduledEvent) {
        self.schedule.push(due_ms, event);
    }

    pub fn request_victory_check(&mut self) {
        self.victory_check = true;
    }
}

/// What mode hooks get to touch.
pub(crate) struct ModeCtx<'a> {
    pub game: &'a mut GameState,
    pub fx: &'a mut Effects,
    pub now_ms: u64,
    pub start_ms: u64,
}

pub struct ModeEngineBuilder {
    config: ModeConfig,
    settings: Option<ModeSettings>,
    records: Option<Box<dyn RecordStore>>,
    transport: Option<Box<dyn Transport>>,
    policy: Option<Box<dyn DecisionPolicy>>,
    defeat: Vec<Condition>,
    victory: Vec<Condition>,
}

impl ModeEngineBuilder {
    /// Replace the mode's default settings.
    pub fn settings(mut self, settings: ModeSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn records(mut self, records: impl RecordStore + 'static) -> Self {
        self.records = Some(Box::new(records));
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Decision policy for a simulated battle opponent.
    pub fn policy(mut self, policy: impl DecisionPolicy + 'static) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Appended after the mode's own defeat conditions.
    pub fn defeat_condition(mut self, condition: Condition) -> Self {
        self.defeat.push(condition);
        self
    }

    /// Appended after the mode's own victory conditions.
    pub fn victory_condition(mut self, condition: Condition) -> Self {
        self.victory.push(condition);
        self
    }

    pub fn build(self) -> ModeEngine {
        let kind = self.config.kind();
        let mut settings = self
            .settings
            .unwrap_or_else(|| ModeSettings::for_kind(kind));
        if let Some(level) = self.config.start_level {
            settings.start_level = level;
        }

        let records = self
            .records
            .unwrap_or_else(|| Box::new(MemoryRecordStore::new()));
        let variant = ModeVariant::new(kind, &self.config, &settings, &*records, self.policy);

        let mut defeat = variant.hooks().defeat_conditions();
        self.defeat.into_iter().for_each(|c| defeat.push(c));
        let mut victory = variant.hooks().victory_conditions();
        self.victory.into_iter().for_each(|c| victory.push(c));

        let mut state = ModeState::default();
        variant.hooks().configure(&mut state);

        let game = GameState::with_rules(self.config.seed, settings.to_rules());
        let last_level = game.level();

        ModeEngine {
            config: self.config,
            settings,
            game,
            state,
            variant,
            defeat,
            victory,
            fx: Effects::default(),
            actions: VecDeque::new(),
            records,
            transport: self.transport,
            now_ms: 0,
            last_score: 0,
            last_level,
            destroyed: false,
        }
    }
}

/// One run of one mode.
pub struct ModeEngine {
    config: ModeConfig,
    settings: ModeSettings,
    game: GameState,
    state: ModeState,
    variant: ModeVariant,
    defeat: ConditionList,
    victory: ConditionList,
    fx: Effects,
    actions: VecDeque<GameAction>,
    records: Box<dyn RecordStore>,
    transport: Option<Box<dyn Transport>>,
    now_ms: u64,
    last_score: u32,
    last_level: u32,
    destroyed: bool,
}

impl fmt::Debug for ModeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeEngine")
            .field("mode", &self.kind())
            .field("state", &self.state)
            .field("now_ms", &self.now_ms)
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

impl ModeEngine {
    pub fn builder(config: ModeConfig) -> ModeEngineBuilder {
        ModeEngineBuilder {
            config,
            settings: None,
            records: None,
            transport: None,
            policy: None,
            defeat: Vec::new(),
            victory: Vec::new(),
        }
    }

    pub fn new(config: ModeConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn kind(&self) -> ModeKind {
        self.variant.kind()
    }

    pub fn config(&self) -> &ModeConfig {
        &self.config
    }

    pub fn settings(&self) -> &ModeSettings {
        &self.settings
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    pub fn variant(&self) -> &ModeVariant {
        &self.variant
    }

    pub fn records(&self) -> &dyn RecordStore {
        &*self.records
    }

    /// Simulation time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Idle -> Active. Spawns the first piece and emits `ModeStart`.
    pub fn start(&mut self) {
        if self.destroyed || self.state.phase != Phase::Idle {
            return;
        }

        self.game.start();
        self.state.phase = Phase::Active;
        self.state.start_ms = Some(self.now_ms);
        self.last_score = self.game.score();
        self.last_level = self.game.level();
        self.fx.notify(Notification::ModeStart {
            mode: self.kind().as_str().to_string(),
        });

        let mut ctx = ModeCtx {
            game: &mut self.game,
            fx: &mut self.fx,
            now_ms: self.now_ms,
            start_ms: self.now_ms,
        };
        self.variant.hooks_mut().on_start(&mut ctx);

        info!(mode = self.kind().as_str(), seed = self.config.seed, "mode started");
        self.evaluate();
        self.flush_outbox();
    }

    /// Queue an input for the next tick. Ignored once the mode has ended.
    pub fn push_action(&mut self, action: GameAction) {
        if self.destroyed || self.state.ended() {
            return;
        }
        self.actions.push_back(action);
    }

    /// Advance one fixed timestep.
    pub fn tick(&mut self) {
        if self.destroyed || !self.state.is_active() {
            return;
        }

        let dt = self.config.tick_ms;
        self.now_ms += dt as u64;

        self.drain_transport();
        while let Some(action) = self.actions.pop_front() {
            self.game.apply_action(action);
            self.process_game_events();
        }

        self.game.tick(dt, false);
        self.process_game_events();

        if !self.game.paused() {
            let start_ms = self.start_ms();
            let mut ctx = ModeCtx {
                game: &mut self.game,
                fx: &mut self.fx,
                now_ms: self.now_ms,
                start_ms,
            };
            self.variant.hooks_mut().update(&mut ctx, dt);
            while let Some(event) = ctx.fx.schedule.pop_due(self.now_ms) {
                self.variant.hooks_mut().on_scheduled(&mut ctx, event);
            }
            self.process_game_events();
        }

        self.evaluate();
        self.flush_outbox();
    }

    /// Run `n` ticks, stopping early if the mode ends.
    pub fn tick_n(&mut self, n: u32) {
        for _ in 0..n {
            if !self.state.is_active() || self.destroyed {
                break;
            }
            self.tick();
        }
    }

    /// Evaluate victory conditions now, regardless of what happened this tick.
    pub fn check_victory(&mut self) -> Option<&Outcome> {
        if self.destroyed || !self.state.is_active() {
            return self.state.outcome();
        }
        let reason = self.victory.first_match(&self.condition_context());
        if let Some(reason) = reason {
            self.end(Outcome::Victory(reason));
            self.flush_outbox();
        }
        self.state.outcome()
    }

    /// Cancel everything scheduled and stop reacting to ticks.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.fx.schedule.clear();
        self.actions.clear();
        self.variant.hooks_mut().destroy();
        debug!(mode = self.kind().as_str(), "mode destroyed");
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.fx.notifications.drain(..).collect()
    }

    pub fn stats(&self) -> StatsSnapshot {
        let end_ms = self.state.end_ms.unwrap_or(self.now_ms);
        let duration_ms = self
            .state
            .start_ms
            .map(|start| end_ms.saturating_sub(start))
            .unwrap_or(0);
        let counters = self.game.counters();
        let outcome = self.state.outcome();

        StatsSnapshot {
            mode: self.kind().as_str().to_string(),
            score: self.game.score(),
            lines: self.game.lines(),
            level: self.game.level(),
            duration_ms,
            pieces_placed: counters.pieces_placed,
            holds: counters.holds,
            tspins: counters.tspins,
            perfect_clears: counters.perfect_clears,
            victory: outcome.map(Outcome::is_victory),
            reason: outcome.map(|o| o.reason().as_str().to_string()),
            extras: self
                .variant
                .hooks()
                .extras(&self.game, &self.state, duration_ms),
        }
    }

    fn start_ms(&self) -> u64 {
        self.state.start_ms.unwrap_or(0)
    }

    fn drain_transport(&mut self) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        let start_ms = self.state.start_ms.unwrap_or(0);
        while let Some(message) = transport.try_recv() {
            let mut ctx = ModeCtx {
                game: &mut self.game,
                fx: &mut self.fx,
                now_ms: self.now_ms,
                start_ms,
            };
            self.variant.hooks_mut().on_peer_message(&mut ctx, message);
        }
    }

    /// Apply score overlays and hand the last lock event to the mode.
    fn process_game_events(&mut self) {
        let start_ms = self.start_ms();
        let score = self.game.score();

        let mut ctx = ModeCtx {
            game: &mut self.game,
            fx: &mut self.fx,
            now_ms: self.now_ms,
            start_ms,
        };

        if score > self.last_score {
            let gain = score - self.last_score;
            // Overlays only ever add points.
            let factor =
                (self.settings.score_multiplier * self.variant.hooks().score_factor()).max(1.0);
            let total = (gain as f64 * factor).floor() as u32;
            ctx.game.add_score(total.saturating_sub(gain));
            ctx.fx.request_victory_check();
            self.variant.hooks_mut().on_score_gain(&mut ctx, total);
        }

        if let Some(event) = ctx.game.take_last_event() {
            if event.cleared_lines() {
                ctx.fx.request_victory_check();
            }
            self.variant.hooks_mut().on_lock(&mut ctx, &event);
        }

        let level = ctx.game.level();
        if level > self.last_level {
            ctx.fx.notify(Notification::LevelUp { level });
            self.last_level = level;
        }

        self.last_score = self.game.score();
    }

    fn condition_context(&self) -> ConditionContext<'_> {
        let hooks = self.variant.hooks();
        ConditionContext {
            game: &self.game,
            mode: &self.state,
            now_ms: self.now_ms,
            time_remaining_ms: hooks.time_remaining_ms(),
            opponent_defeated: hooks.opponent_defeated(),
            ledger: hooks.ledger(),
        }
    }

    fn evaluate(&mut self) {
        if !self.state.is_active() {
            return;
        }
        let victory_check = std::mem::take(&mut self.fx.victory_check);

        let defeat = self.defeat.first_match(&self.condition_context());
        if let Some(reason) = defeat {
            self.end(Outcome::Defeat(reason));
            return;
        }

        if victory_check {
            let victory = self.victory.first_match(&self.condition_context());
            if let Some(reason) = victory {
                self.end(Outcome::Victory(reason));
            }
        }
    }

    fn end(&mut self, outcome: Outcome) {
        if !self.state.is_active() {
            return;
        }

        self.state.end_ms = Some(self.now_ms);
        self.state.phase = Phase::Ended(outcome.clone());

        let mut ctx = ModeCtx {
            game: &mut self.game,
            fx: &mut self.fx,
            now_ms: self.now_ms,
            start_ms: self.state.start_ms.unwrap_or(0),
        };
        self.variant
            .hooks_mut()
            .on_end(&mut ctx, &outcome, &mut *self.records);

        self.fx.schedule.clear();
        self.actions.clear();

        let stats = Box::new(self.stats());
        let reason = outcome.reason().as_str().to_string();
        info!(
            mode = self.kind().as_str(),
            reason = %reason,
            victory = outcome.is_victory(),
            score = stats.score,
            lines = stats.lines,
            "mode ended"
        );
        self.fx.notify(match outcome {
            Outcome::Victory(_) => Notification::Victory { reason, stats },
            Outcome::Defeat(_) => Notification::Defeat { reason, stats },
        });
    }

    fn flush_outbox(&mut self) {
        for message in self.fx.outbox.drain(..) {
            if let Some(transport) = self.transport.as_mut() {
                transport.send(message);
            }
        }
    }
}
