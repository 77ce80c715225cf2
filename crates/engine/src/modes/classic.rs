use crate::collab::RecordStore;
use crate::core::GameState;
use crate::lifecycle::{ModeCtx, ModeState, Outcome};
use crate::stats::{ClassicExtras, ModeExtras};

use super::{ModeHooks, ModeSettings};

const BEST_SCORE_KEY: &str = "tetris_marathon_best_score";
const BEST_LINES_KEY: &str = "tetris_marathon_best_lines";

/// Endless play on the frame-based speed curve. There is no way to win.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicMode {
    start_level: u32,
    best_score: u32,
    best_lines: u32,
}

impl ClassicMode {
    pub(crate) fn new(settings: &ModeSettings, records: &dyn RecordStore) -> Self {
        Self {
            start_level: settings.start_level,
            best_score: read_u32(records, BEST_SCORE_KEY),
            best_lines: read_u32(records, BEST_LINES_KEY),
        }
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn best_lines(&self) -> u32 {
        self.best_lines
    }
}

impl ModeHooks for ClassicMode {
    fn on_end(&mut self, ctx: &mut ModeCtx<'_>, _outcome: &Outcome, records: &mut dyn RecordStore) {
        let score = ctx.game.score();
        if score > self.best_score {
            self.best_score = score;
            records.set(BEST_SCORE_KEY, score as u64);
        }
        let lines = ctx.game.lines();
        if lines > self.best_lines {
            self.best_lines = lines;
            records.set(BEST_LINES_KEY, lines as u64);
        }
    }

    fn extras(&self, game: &GameState, _state: &ModeState, _duration_ms: u64) -> ModeExtras {
        let points_per_line = if game.lines() == 0 {
            0.0
        } else {
            game.score() as f64 / game.lines() as f64
        };
        ModeExtras::Classic(ClassicExtras {
            start_level: self.start_level,
            end_level: game.level(),
            best_score: self.best_score,
            best_lines: self.best_lines,
            points_per_line,
        })
    }
}

pub(super) fn read_u32(records: &dyn RecordStore, key: &str) -> u32 {
    records
        .get(key)
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
