//! End-of-run statistics.
//!
//! Computed on demand from engine state; once a mode has ended the snapshot is
//! the same on every call.

use serde::{Deserialize, Serialize};

use crate::config::{Difficulty, OpponentKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub mode: String,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub duration_ms: u64,
    pub pieces_placed: u32,
    pub holds: u32,
    pub tspins: u32,
    pub perfect_clears: u32,
    /// `None` while the run is still going.
    pub victory: Option<bool>,
    pub reason: Option<String>,
    pub extras: ModeExtras,
}

/// Mode-specific part of the stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModeExtras {
    Classic(ClassicExtras),
    Sprint(SprintExtras),
    Blitz(BlitzExtras),
    Infinity(InfinityExtras),
    Battle(BattleExtras),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassicExtras {
    pub start_level: u32,
    pub end_level: u32,
    pub best_score: u32,
    pub best_lines: u32,
    pub points_per_line: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintExtras {
    pub target_lines: u32,
    pub final_time_ms: Option<u64>,
    pub best_time_ms: Option<u64>,
    pub pieces_per_second: f64,
    pub lines_per_second: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlitzExtras {
    pub time_limit_ms: u64,
    pub time_remaining_ms: u64,
    pub max_streak: u32,
    pub average_multiplier: f64,
    pub score_per_minute: f64,
    pub best_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfinityExtras {
    pub infinity_level: u32,
    pub experience: u64,
    pub next_level_exp: u64,
    pub difficulty: f64,
    pub items: u32,
    pub skill_points: u32,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleExtras {
    pub opponent: OpponentKind,
    pub difficulty: Difficulty,
    pub lines_sent: u32,
    pub lines_received: u32,
    pub attacks_sent: u32,
    pub attacks_blocked: u32,
    pub opponent_score: u32,
    pub opponent_lines: u32,
}

/// `part / seconds`, 0 for an empty interval.
pub(crate) fn per_second(part: u32, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    part as f64 * 1000.0 / duration_ms as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_second_handles_zero_duration() {
        assert_eq!(per_second(10, 0), 0.0);
        assert_eq!(per_second(10, 2000), 5.0);
    }

    #[test]
    fn extras_are_tagged_by_mode() {
        let extras = ModeExtras::Battle(BattleExtras {
            opponent: OpponentKind::Simulated,
            difficulty: Difficulty::Hard,
            lines_sent: 4,
            lines_received: 2,
            attacks_sent: 1,
            attacks_blocked: 1,
            opponent_score: 200,
            opponent_lines: 2,
        });
        let json = serde_json::to_value(&extras).unwrap();
        assert_eq!(json["kind"], "battle");
        assert_eq!(json["opponent"], "simulated");
        assert_eq!(json["lines_sent"], 4);
    }
}
