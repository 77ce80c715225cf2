use crate::collab::RecordStore;
use crate::condition::{Condition, ConditionList};
use crate::core::GameState;
use crate::lifecycle::{ModeCtx, ModeState, Outcome, ScheduledEvent};
use crate::notify::Notification;
use crate::stats::{BlitzExtras, ModeExtras};
use crate::types::LockEvent;

use super::classic::read_u32;
use super::ModeHooks;

const BEST_SCORE_KEY: &str = "tetris_blitz_best";

pub const BLITZ_TIME_LIMIT_MS: u64 = 120_000;

const TETRIS_BONUS_MS: u64 = 3_000;
const TSPIN_BONUS_MS: u64 = 2_000;
const PERFECT_CLEAR_BONUS_MS: u64 = 5_000;
/// A lock with no clear resets the streak after this long.
const STREAK_RESET_DELAY_MS: u64 = 50;

/// Score attack against a fixed time budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BlitzMode {
    time_limit_ms: u64,
    time_remaining_ms: u64,
    streak: u32,
    max_streak: u32,
    clears: u32,
    best_score: u32,
}

impl BlitzMode {
    pub(crate) fn new(records: &dyn RecordStore) -> Self {
        Self {
            time_limit_ms: BLITZ_TIME_LIMIT_MS,
            time_remaining_ms: BLITZ_TIME_LIMIT_MS,
            streak: 0,
            max_streak: 0,
            clears: 0,
            best_score: read_u32(records, BEST_SCORE_KEY),
        }
    }

    pub fn time_remaining_ms(&self) -> u64 {
        self.time_remaining_ms
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn max_streak(&self) -> u32 {
        self.max_streak
    }

    /// Streak bonus applied on top of the mode's score multiplier.
    pub fn bonus_multiplier(&self) -> f64 {
        1.0 + self.streak as f64 * 0.1
    }

    fn add_time_bonus(&mut self, ctx: &mut ModeCtx<'_>, ms: u64) {
        let before = self.time_remaining_ms;
        self.time_remaining_ms = (before + ms).min(self.time_limit_ms);
        let granted = self.time_remaining_ms - before;
        if granted > 0 {
            ctx.fx.notify(Notification::TimeBonus { ms: granted });
        }
    }
}

impl ModeHooks for BlitzMode {
    fn configure(&self, state: &mut ModeState) {
        state.time_limit_ms = Some(self.time_limit_ms);
    }

    fn defeat_conditions(&self) -> ConditionList {
        ConditionList::from([Condition::TopOut, Condition::TimeUp])
    }

    fn score_factor(&self) -> f64 {
        self.bonus_multiplier()
    }

    fn on_lock(&mut self, ctx: &mut ModeCtx<'_>, event: &LockEvent) {
        if !event.cleared_lines() {
            ctx.fx.schedule(
                ctx.now_ms + STREAK_RESET_DELAY_MS,
                ScheduledEvent::ResetStreak {
                    clears_seen: self.clears,
                },
            );
            return;
        }

        self.clears += 1;
        self.streak += 1;
        self.max_streak = self.max_streak.max(self.streak);

        if event.lines_cleared == 4 {
            self.add_time_bonus(ctx, TETRIS_BONUS_MS);
        } else if event.tspin.is_spin() {
            self.add_time_bonus(ctx, TSPIN_BONUS_MS);
        } else if event.perfect_clear {
            self.add_time_bonus(ctx, PERFECT_CLEAR_BONUS_MS);
        }
    }

    fn update(&mut self, _ctx: &mut ModeCtx<'_>, dt_ms: u32) {
        self.time_remaining_ms = self.time_remaining_ms.saturating_sub(dt_ms as u64);
    }

    fn on_scheduled(&mut self, _ctx: &mut ModeCtx<'_>, event: ScheduledEvent) {
        match event {
            ScheduledEvent::ResetStreak { clears_seen } => {
                if clears_seen == self.clears {
                    self.streak = 0;
                }
            }
        }
    }

    fn on_end(&mut self, ctx: &mut ModeCtx<'_>, _outcome: &Outcome, records: &mut dyn RecordStore) {
        let score = ctx.game.score();
        if score > self.best_score {
            self.best_score = score;
            records.set(BEST_SCORE_KEY, score as u64);
        }
    }

    fn time_remaining_ms(&self) -> Option<u64> {
        Some(self.time_remaining_ms)
    }

    fn extras(&self, game: &GameState, _state: &ModeState, _duration_ms: u64) -> ModeExtras {
        let minutes = self.time_limit_ms as f64 / 60_000.0;
        ModeExtras::Blitz(BlitzExtras {
            time_limit_ms: self.time_limit_ms,
            time_remaining_ms: self.time_remaining_ms,
            max_streak: self.max_streak,
            average_multiplier: 1.0 + self.max_streak as f64 * 0.05,
            score_per_minute: game.score() as f64 / minutes,
            best_score: self.best_score,
        })
    }
}
