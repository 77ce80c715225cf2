use crate::collab::RecordStore;
use crate::condition::{Condition, ConditionList};
use crate::core::GameState;
use crate::lifecycle::{ModeCtx, ModeState, Outcome};
use crate::stats::{per_second, ModeExtras, SprintExtras};

use super::ModeHooks;

const BEST_TIME_KEY: &str = "tetris_sprint_best";

pub const SPRINT_TARGET_LINES: u32 = 40;

/// Clear the target line count as fast as possible.
#[derive(Debug, Clone, PartialEq)]
pub struct SprintMode {
    target_lines: u32,
    final_time_ms: Option<u64>,
    best_time_ms: Option<u64>,
}

impl SprintMode {
    pub(crate) fn new(records: &dyn RecordStore) -> Self {
        Self {
            target_lines: SPRINT_TARGET_LINES,
            final_time_ms: None,
            best_time_ms: records.get(BEST_TIME_KEY),
        }
    }

    pub fn target_lines(&self) -> u32 {
        self.target_lines
    }

    pub fn final_time_ms(&self) -> Option<u64> {
        self.final_time_ms
    }

    pub fn best_time_ms(&self) -> Option<u64> {
        self.best_time_ms
    }
}

impl ModeHooks for SprintMode {
    fn configure(&self, state: &mut ModeState) {
        state.target_lines = Some(self.target_lines);
    }

    fn victory_conditions(&self) -> ConditionList {
        ConditionList::from([Condition::LinesReached(self.target_lines)])
    }

    fn on_end(&mut self, ctx: &mut ModeCtx<'_>, outcome: &Outcome, records: &mut dyn RecordStore) {
        if !outcome.is_victory() {
            return;
        }
        let time = ctx.now_ms.saturating_sub(ctx.start_ms);
        self.final_time_ms = Some(time);
        if self.best_time_ms.map_or(true, |best| time < best) {
            self.best_time_ms = Some(time);
            records.set(BEST_TIME_KEY, time);
        }
    }

    fn extras(&self, game: &GameState, _state: &ModeState, duration_ms: u64) -> ModeExtras {
        ModeExtras::Sprint(SprintExtras {
            target_lines: self.target_lines,
            final_time_ms: self.final_time_ms,
            best_time_ms: self.best_time_ms,
            pieces_per_second: per_second(game.counters().pieces_placed, duration_ms),
            lines_per_second: per_second(game.lines(), duration_ms),
        })
    }
}
