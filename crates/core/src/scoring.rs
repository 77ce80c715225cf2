//! Scoring module - line clear points, level progression and gravity curves
//!
//! - T-Spin scoring uses the T-Spin tables (it does not add classic line-clear points).
//! - B2B applies a 3/2 multiplier to the base clear points (before combo bonus).
//! - Combo bonus is `combo_base * (chain - 1)` with no level multiplier.
//!
//! Mode overlays (blitz streaks, infinity experience) sit on top of these values
//! in the engine crate; nothing here knows about modes.

use serde::{Deserialize, Serialize};

use crate::types::{
    TSpinKind, B2B_DENOMINATOR, B2B_NUMERATOR, COMBO_BASE, DROP_INTERVALS,
    DROP_INTERVAL_FLOOR_MS, LINE_SCORES,
};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Base points for the clear (includes B2B multiplier, excludes combo bonus).
    pub line_clear_score: u32,
    /// Combo bonus added on top of `line_clear_score`.
    pub combo_bonus: u32,
    pub total: u32,
    pub qualifies_for_b2b: bool,
    /// Whether a B2B multiplier was applied to this clear.
    pub b2b_applied: bool,
}

/// Classic line clear points; `lines` above 4 score as a tetris.
pub fn calculate_line_score(lines: usize, level: u32) -> u32 {
    if lines == 0 {
        return 0;
    }
    LINE_SCORES[lines.min(4)] * (level + 1)
}

pub fn calculate_tspin_score(tspin: TSpinKind, lines: usize, level: u32) -> u32 {
    let base = match (tspin, lines) {
        (TSpinKind::Full, 0) => 400,
        (TSpinKind::Full, 1) => 800,
        (TSpinKind::Full, 2) => 1200,
        (TSpinKind::Full, _) => 1600,
        (TSpinKind::Mini, 0) => 100,
        (TSpinKind::Mini, 1) => 200,
        (TSpinKind::Mini, _) => 400,
        (TSpinKind::None, _) => 0,
    };
    base * (level + 1)
}

/// Combo bonus for the `chain`-th consecutive clearing lock (1 = first clear, no bonus).
pub fn calculate_combo_bonus(chain: u32) -> u32 {
    COMBO_BASE * chain.saturating_sub(1)
}

/// B2B applies to: T-spin full with any lines, or Tetris (4+ lines)
pub fn qualifies_for_b2b(tspin: TSpinKind, lines: usize) -> bool {
    matches!(
        (tspin, lines),
        (TSpinKind::Full, 1..) | (TSpinKind::None, 4..)
    )
}

/// Apply the B2B multiplier (3/2) to a point value.
pub fn apply_b2b_multiplier(points: u32) -> u32 {
    points.saturating_mul(B2B_NUMERATOR) / B2B_DENOMINATOR
}

/// Points for a lock that cleared `lines` rows.
///
/// `previous_b2b` is whether the last clearing lock qualified for back-to-back.
pub fn calculate_score(
    lines: usize,
    level: u32,
    tspin: TSpinKind,
    chain: u32,
    previous_b2b: bool,
) -> ScoreResult {
    let qualifies_b2b = qualifies_for_b2b(tspin, lines);

    let base_points = if tspin.is_spin() {
        calculate_tspin_score(tspin, lines, level)
    } else {
        calculate_line_score(lines, level)
    };

    let b2b_applied = qualifies_b2b && previous_b2b;
    let line_clear_score = if b2b_applied {
        apply_b2b_multiplier(base_points)
    } else {
        base_points
    };

    let combo_bonus = if lines > 0 {
        calculate_combo_bonus(chain)
    } else {
        0
    };

    ScoreResult {
        line_clear_score,
        combo_bonus,
        total: line_clear_score.saturating_add(combo_bonus),
        qualifies_for_b2b: qualifies_b2b,
        b2b_applied,
    }
}

/// soft drop: +1 per cell, hard drop: +2 per cell
pub fn calculate_drop_score(cells: u32, is_hard_drop: bool) -> u32 {
    if is_hard_drop {
        cells * 2
    } else {
        cells
    }
}

/// Level for a run that began at `start_level`.
///
/// `lines_per_level == 0` disables progression; the result never exceeds `max_level`.
pub fn calculate_level(
    total_lines: u32,
    start_level: u32,
    lines_per_level: u32,
    max_level: u32,
) -> u32 {
    let gained = total_lines.checked_div(lines_per_level).unwrap_or(0);
    start_level.saturating_add(gained).min(max_level.max(start_level))
}

/// NES gravity in frames per row, levels 0 through 29+.
const NES_GRAVITY_FRAMES: [u32; 30] = [
    48, 43, 38, 33, 28, 23, 18, 13, 8, 6, 5, 5, 5, 4, 4, 4, 3, 3, 3, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    1,
];

/// Frames are 60 Hz.
pub fn frames_to_ms(frames: u32) -> u32 {
    (frames * 1000 / 60).max(1)
}

/// How gravity speeds up with level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedCurve {
    /// Millisecond table with a 120 ms floor.
    #[default]
    Modern,
    /// NES frame table.
    Classic,
}

impl SpeedCurve {
    pub fn drop_interval_ms(&self, level: u32) -> u32 {
        match self {
            SpeedCurve::Modern => DROP_INTERVALS
                .get(level as usize)
                .copied()
                .unwrap_or(DROP_INTERVAL_FLOOR_MS),
            SpeedCurve::Classic => {
                let idx = (level as usize).min(NES_GRAVITY_FRAMES.len() - 1);
                frames_to_ms(NES_GRAVITY_FRAMES[idx])
            }
        }
    }
}

/// Scale a gravity interval; multipliers above 1 speed the fall up, below 1 slow it down.
pub fn scale_interval_ms(interval_ms: u32, multiplier: f64) -> u32 {
    if !(multiplier.is_finite() && multiplier > 0.0) {
        return interval_ms;
    }
    ((interval_ms as f64 / multiplier).round() as u32).max(1)
}

pub fn get_soft_drop_interval_ms(base_interval: u32, multiplier: u32) -> u32 {
    (base_interval / multiplier.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_line_scores() {
        assert_eq!(calculate_line_score(1, 0), 40);
        assert_eq!(calculate_line_score(2, 0), 100);
        assert_eq!(calculate_line_score(3, 0), 300);
        assert_eq!(calculate_line_score(4, 0), 1200);
        assert_eq!(calculate_line_score(4, 5), 1200 * 6);
    }

    #[test]
    fn test_tspin_scores() {
        assert_eq!(calculate_tspin_score(TSpinKind::Full, 0, 0), 400);
        assert_eq!(calculate_tspin_score(TSpinKind::Full, 2, 0), 1200);
        assert_eq!(calculate_tspin_score(TSpinKind::Mini, 1, 0), 200);
        assert_eq!(calculate_tspin_score(TSpinKind::Full, 1, 2), 800 * 3);
    }

    #[test]
    fn test_combo_bonus() {
        assert_eq!(calculate_combo_bonus(0), 0);
        assert_eq!(calculate_combo_bonus(1), 0);
        assert_eq!(calculate_combo_bonus(2), 50);
        assert_eq!(calculate_combo_bonus(4), 150);
    }

    #[test]
    fn test_b2b_qualification() {
        assert!(qualifies_for_b2b(TSpinKind::Full, 1));
        assert!(qualifies_for_b2b(TSpinKind::None, 4));
        assert!(!qualifies_for_b2b(TSpinKind::Mini, 1));
        assert!(!qualifies_for_b2b(TSpinKind::None, 3));
        assert!(!qualifies_for_b2b(TSpinKind::Full, 0));
    }

    #[test]
    fn test_full_score_calculation() {
        let result = calculate_score(1, 0, TSpinKind::Full, 1, false);
        assert_eq!(result.total, 800);

        let result = calculate_score(1, 0, TSpinKind::None, 2, false);
        assert_eq!(result.line_clear_score, 40);
        assert_eq!(result.combo_bonus, 50);
        assert_eq!(result.total, 90);

        let result = calculate_score(4, 0, TSpinKind::None, 2, true);
        assert_eq!(result.line_clear_score, 1800);
        assert_eq!(result.total, 1850);
        assert!(result.b2b_applied);
    }

    #[test]
    fn test_no_combo_bonus_without_clear() {
        let result = calculate_score(0, 0, TSpinKind::Full, 3, false);
        assert_eq!(result.combo_bonus, 0);
        assert_eq!(result.total, 400);
    }

    #[test]
    fn test_level_calculation() {
        assert_eq!(calculate_level(0, 0, 10, 20), 0);
        assert_eq!(calculate_level(29, 0, 10, 20), 2);
        assert_eq!(calculate_level(15, 5, 10, 20), 6);
        assert_eq!(calculate_level(1000, 0, 10, 20), 20);
        assert_eq!(calculate_level(1000, 3, 0, 20), 3);
    }

    #[test]
    fn test_speed_curves() {
        assert_eq!(SpeedCurve::Modern.drop_interval_ms(0), 1000);
        assert_eq!(SpeedCurve::Modern.drop_interval_ms(8), 160);
        assert_eq!(SpeedCurve::Modern.drop_interval_ms(20), 120);

        assert_eq!(SpeedCurve::Classic.drop_interval_ms(0), 800);
        assert_eq!(SpeedCurve::Classic.drop_interval_ms(9), 100);
        assert_eq!(SpeedCurve::Classic.drop_interval_ms(29), 16);
        assert_eq!(SpeedCurve::Classic.drop_interval_ms(99), 16);
    }

    #[test]
    fn test_scale_interval() {
        assert_eq!(scale_interval_ms(1000, 1.0), 1000);
        assert_eq!(scale_interval_ms(1000, 0.5), 2000);
        assert_eq!(scale_interval_ms(1000, 2.0), 500);
        assert_eq!(scale_interval_ms(1000, 0.0), 1000);
        assert_eq!(scale_interval_ms(1, 100.0), 1);
    }

    #[test]
    fn test_soft_drop_interval() {
        assert_eq!(get_soft_drop_interval_ms(1000, 10), 100);
        assert_eq!(get_soft_drop_interval_ms(5, 10), 1);
    }
}
