//! Notifications produced by a running mode.
//!
//! Collected into a queue on every tick; callers drain them with
//! [`ModeEngine::drain_notifications`](crate::ModeEngine::drain_notifications).

use serde::{Deserialize, Serialize};

use crate::stats::StatsSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Notification {
    ModeStart { mode: String },
    Victory { reason: String, stats: Box<StatsSnapshot> },
    Defeat { reason: String, stats: Box<StatsSnapshot> },
    AttackSent { lines: u32 },
    AttackIncoming { lines: u32 },
    LevelUp { level: u32 },
    /// Blitz time bonus actually granted, after the cap.
    TimeBonus { ms: u64 },
    InfinityLevelUp { level: u32, next_exp: u64 },
    PerfectClear { bonus: u32, total: u32 },
    AchievementUnlocked { name: String },
}

impl Notification {
    /// True for the terminal `Victory`/`Defeat` pair.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Notification::Victory { .. } | Notification::Defeat { .. })
    }
}
