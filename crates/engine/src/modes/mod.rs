//! Game modes.
//!
//! Every mode runs on the same [`ModeEngine`](crate::ModeEngine); what differs
//! is a [`ModeSettings`] block (rules knobs) and a [`ModeVariant`] holding the
//! mode's own state and rule overlays.

mod battle;
mod blitz;
mod classic;
mod infinity;
mod sprint;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::collab::{PeerMessage, RecordStore};
use crate::condition::{Condition, ConditionList};
use crate::config::ModeConfig;
use crate::core::{GameState, RulesConfig, SpeedCurve};
use crate::garbage::GarbageLedger;
use crate::lifecycle::{ModeCtx, ModeState, Outcome, ScheduledEvent};
use crate::opponent::DecisionPolicy;
use crate::stats::ModeExtras;
use crate::types::{LockEvent, NEXT_QUEUE_LEN};

pub use battle::{BattleMode, OpponentSide};
pub use blitz::{BlitzMode, BLITZ_TIME_LIMIT_MS};
pub use classic::ClassicMode;
pub use infinity::InfinityMode;
pub use sprint::{SprintMode, SPRINT_TARGET_LINES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Classic,
    Sprint,
    Blitz,
    Infinity,
    Battle,
}

impl ModeKind {
    /// Registry lookup. `marathon` runs the infinity rules; unknown names fall
    /// back to classic.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "classic" => ModeKind::Classic,
            "marathon" | "infinity" => ModeKind::Infinity,
            "sprint" => ModeKind::Sprint,
            "blitz" => ModeKind::Blitz,
            "battle" => ModeKind::Battle,
            other => {
                warn!(mode = other, "unknown mode, falling back to classic");
                ModeKind::Classic
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Classic => "classic",
            ModeKind::Sprint => "sprint",
            ModeKind::Blitz => "blitz",
            ModeKind::Infinity => "infinity",
            ModeKind::Battle => "battle",
        }
    }
}

/// Menu-facing description of a registry name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeInfo {
    pub name: String,
    pub description: String,
    pub difficulty: String,
}

impl ModeInfo {
    pub fn for_name(name: &str) -> Self {
        let (title, description, difficulty) = match name {
            "marathon" => ("Marathon", "Endless mode with increasing difficulty", "Medium"),
            "infinity" => ("Infinity", "Endless mode with skills and items", "Hard"),
            "sprint" => ("Sprint", "Clear 40 lines as fast as possible", "Easy"),
            "blitz" => ("Blitz", "2-minute score attack", "Medium"),
            "battle" => ("Battle", "1v1 battle with garbage attacks", "Hard"),
            "classic" => ("Classic", "Traditional Tetris gameplay", "Easy"),
            other => (other, "Custom game mode", "Unknown"),
        };
        Self {
            name: title.to_string(),
            description: description.to_string(),
            difficulty: difficulty.to_string(),
        }
    }

    /// Names accepted by [`ModeKind::from_name`] without a fallback.
    pub fn available() -> [&'static str; 6] {
        ["marathon", "infinity", "sprint", "blitz", "battle", "classic"]
    }
}

/// Rules knobs a mode applies to the player simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeSettings {
    pub start_level: u32,
    pub max_level: u32,
    /// 0 disables level progression.
    pub lines_per_level: u32,
    /// Applied to every score gain.
    pub score_multiplier: f64,
    pub gravity_multiplier: f64,
    pub hold_enabled: bool,
    pub preview: usize,
    pub speed_curve: SpeedCurve,
}

impl Default for ModeSettings {
    fn default() -> Self {
        Self {
            start_level: 0,
            max_level: 19,
            lines_per_level: 10,
            score_multiplier: 1.0,
            gravity_multiplier: 1.0,
            hold_enabled: true,
            preview: NEXT_QUEUE_LEN,
            speed_curve: SpeedCurve::Modern,
        }
    }
}

impl ModeSettings {
    pub fn for_kind(kind: ModeKind) -> Self {
        let base = Self::default();
        match kind {
            ModeKind::Classic => Self {
                preview: 3,
                speed_curve: SpeedCurve::Classic,
                ..base
            },
            ModeKind::Sprint => Self {
                max_level: 0,
                lines_per_level: 0,
                gravity_multiplier: 0.5,
                ..base
            },
            ModeKind::Blitz => Self {
                score_multiplier: 1.5,
                ..base
            },
            ModeKind::Infinity => Self {
                max_level: u32::MAX,
                score_multiplier: 1.5,
                ..base
            },
            ModeKind::Battle => base,
        }
    }

    pub fn to_rules(&self) -> RulesConfig {
        RulesConfig {
            start_level: self.start_level,
            max_level: self.max_level.max(self.start_level),
            lines_per_level: self.lines_per_level,
            speed_curve: self.speed_curve,
            gravity_multiplier: self.gravity_multiplier,
            hold_enabled: self.hold_enabled,
            preview: self.preview.min(NEXT_QUEUE_LEN),
        }
    }
}

/// Per-mode reactions to engine events. Every hook defaults to doing nothing.
pub(crate) trait ModeHooks {
    /// Fill in the targets this mode tracks.
    fn configure(&self, _state: &mut ModeState) {}

    fn defeat_conditions(&self) -> ConditionList {
        ConditionList::from([Condition::TopOut])
    }

    fn victory_conditions(&self) -> ConditionList {
        ConditionList::new()
    }

    fn on_start(&mut self, _ctx: &mut ModeCtx<'_>) {}

    /// Extra factor on top of `ModeSettings::score_multiplier`.
    fn score_factor(&self) -> f64 {
        1.0
    }

    /// Score gained this step, after multipliers.
    fn on_score_gain(&mut self, _ctx: &mut ModeCtx<'_>, _gain: u32) {}

    fn on_lock(&mut self, _ctx: &mut ModeCtx<'_>, _event: &LockEvent) {}

    fn update(&mut self, _ctx: &mut ModeCtx<'_>, _dt_ms: u32) {}

    fn on_scheduled(&mut self, _ctx: &mut ModeCtx<'_>, _event: ScheduledEvent) {}

    fn on_peer_message(&mut self, _ctx: &mut ModeCtx<'_>, _message: PeerMessage) {}

    fn on_end(
        &mut self,
        _ctx: &mut ModeCtx<'_>,
        _outcome: &Outcome,
        _records: &mut dyn RecordStore,
    ) {
    }

    fn time_remaining_ms(&self) -> Option<u64> {
        None
    }

    fn opponent_defeated(&self) -> bool {
        false
    }

    fn ledger(&self) -> Option<&GarbageLedger> {
        None
    }

    /// Cancel anything the mode has in flight.
    fn destroy(&mut self) {}

    fn extras(&self, game: &GameState, state: &ModeState, duration_ms: u64) -> ModeExtras;
}

/// Mode-specific state, one variant per mode.
#[derive(Debug)]
pub enum ModeVariant {
    Classic(ClassicMode),
    Sprint(SprintMode),
    Blitz(BlitzMode),
    Infinity(InfinityMode),
    Battle(BattleMode),
}

impl ModeVariant {
    pub(crate) fn new(
        kind: ModeKind,
        config: &ModeConfig,
        settings: &ModeSettings,
        records: &dyn RecordStore,
        policy: Option<Box<dyn DecisionPolicy>>,
    ) -> Self {
        match kind {
            ModeKind::Classic => ModeVariant::Classic(ClassicMode::new(settings, records)),
            ModeKind::Sprint => ModeVariant::Sprint(SprintMode::new(records)),
            ModeKind::Blitz => ModeVariant::Blitz(BlitzMode::new(records)),
            ModeKind::Infinity => ModeVariant::Infinity(InfinityMode::new(config.seed)),
            ModeKind::Battle => ModeVariant::Battle(BattleMode::new(config, policy)),
        }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            ModeVariant::Classic(_) => ModeKind::Classic,
            ModeVariant::Sprint(_) => ModeKind::Sprint,
            ModeVariant::Blitz(_) => ModeKind::Blitz,
            ModeVariant::Infinity(_) => ModeKind::Infinity,
            ModeVariant::Battle(_) => ModeKind::Battle,
        }
    }

    pub(crate) fn hooks(&self) -> &dyn ModeHooks {
        match self {
            ModeVariant::Classic(m) => m,
            ModeVariant::Sprint(m) => m,
            ModeVariant::Blitz(m) => m,
            ModeVariant::Infinity(m) => m,
            ModeVariant::Battle(m) => m,
        }
    }

    pub(crate) fn hooks_mut(&mut self) -> &mut dyn ModeHooks {
        match self {
            ModeVariant::Classic(m) => m,
            ModeVariant::Sprint(m) => m,
            ModeVariant::Blitz(m) => m,
            ModeVariant::Infinity(m) => m,
            ModeVariant::Battle(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_names() {
        assert_eq!(ModeKind::from_name("classic"), ModeKind::Classic);
        assert_eq!(ModeKind::from_name("marathon"), ModeKind::Infinity);
        assert_eq!(ModeKind::from_name("Sprint"), ModeKind::Sprint);
        assert_eq!(ModeKind::from_name("zen"), ModeKind::Classic);
        for name in ModeInfo::available() {
            assert_eq!(ModeInfo::for_name(name).description.is_empty(), false);
        }
    }

    #[test]
    fn unknown_mode_info_is_custom() {
        let info = ModeInfo::for_name("zen");
        assert_eq!(info.name, "zen");
        assert_eq!(info.description, "Custom game mode");
        assert_eq!(info.difficulty, "Unknown");
        assert_eq!(ModeInfo::for_name("marathon").difficulty, "Medium");
    }

    #[test]
    fn sprint_keeps_a_fixed_level() {
        let rules = ModeSettings::for_kind(ModeKind::Sprint).to_rules();
        assert_eq!(rules.lines_per_level, 0);
        assert_eq!(rules.max_level, 0);
        assert_eq!(rules.gravity_multiplier, 0.5);
    }

    #[test]
    fn classic_uses_the_frame_curve() {
        let settings = ModeSettings::for_kind(ModeKind::Classic);
        assert_eq!(settings.speed_curve, SpeedCurve::Classic);
        assert_eq!(settings.to_rules().preview, 3);
    }
}
