//! Victory and defeat predicates.
//!
//! A [`ConditionList`] is evaluated in registration order and the first
//! condition that reports a reason wins; the rest are not consulted. Conditions
//! read state and never mutate it.

use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::core::GameState;
use crate::garbage::GarbageLedger;
use crate::lifecycle::ModeState;

/// Why a mode ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeReason {
    TopOut,
    TargetReached,
    TimeUp,
    OpponentDefeated,
    GarbageOverflow,
    Custom(String),
}

impl OutcomeReason {
    /// Stable machine-readable name.
    pub fn as_str(&self) -> &str {
        match self {
            OutcomeReason::TopOut => "topped_out",
            OutcomeReason::TargetReached => "target_reached",
            OutcomeReason::TimeUp => "time_up",
            OutcomeReason::OpponentDefeated => "opponent_defeated",
            OutcomeReason::GarbageOverflow => "garbage_overflow",
            OutcomeReason::Custom(name) => name,
        }
    }
}

impl fmt::Display for OutcomeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeReason::GarbageOverflow => f.write_str("garbage overflow"),
            OutcomeReason::TopOut => f.write_str("topped out"),
            OutcomeReason::TargetReached => f.write_str("target reached"),
            OutcomeReason::TimeUp => f.write_str("time up"),
            OutcomeReason::OpponentDefeated => f.write_str("opponent defeated"),
            OutcomeReason::Custom(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConditionError {
    #[error("condition {name} failed: {message}")]
    Failed { name: String, message: String },
    #[error("condition {0} needs state this mode does not have")]
    MissingState(&'static str),
}

/// Everything a condition may look at.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    pub game: &'a GameState,
    pub mode: &'a ModeState,
    pub now_ms: u64,
    /// Remaining budget for timed modes.
    pub time_remaining_ms: Option<u64>,
    pub opponent_defeated: bool,
    /// The local side's ledger in a battle.
    pub ledger: Option<&'a GarbageLedger>,
}

pub type CustomCheck =
    Box<dyn Fn(&ConditionContext<'_>) -> Result<Option<OutcomeReason>, ConditionError>>;

pub enum Condition {
    /// A freshly spawned piece could not be placed.
    TopOut,
    LinesReached(u32),
    ScoreReached(u32),
    TimeUp,
    OpponentDefeated,
    GarbageOverflow,
    Custom { name: String, check: CustomCheck },
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::TopOut => f.write_str("TopOut"),
            Condition::LinesReached(n) => write!(f, "LinesReached({n})"),
            Condition::ScoreReached(n) => write!(f, "ScoreReached({n})"),
            Condition::TimeUp => f.write_str("TimeUp"),
            Condition::OpponentDefeated => f.write_str("OpponentDefeated"),
            Condition::GarbageOverflow => f.write_str("GarbageOverflow"),
            Condition::Custom { name, .. } => write!(f, "Custom({name})"),
        }
    }
}

impl Condition {
    pub fn custom(
        name: impl Into<String>,
        check: impl Fn(&ConditionContext<'_>) -> Result<Option<OutcomeReason>, ConditionError>
            + 'static,
    ) -> Self {
        Condition::Custom {
            name: name.into(),
            check: Box::new(check),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Condition::TopOut => "top_out",
            Condition::LinesReached(_) => "lines_reached",
            Condition::ScoreReached(_) => "score_reached",
            Condition::TimeUp => "time_up",
            Condition::OpponentDefeated => "opponent_defeated",
            Condition::GarbageOverflow => "garbage_overflow",
            Condition::Custom { name, .. } => name,
        }
    }

    pub fn evaluate(
        &self,
        ctx: &ConditionContext<'_>,
    ) -> Result<Option<OutcomeReason>, ConditionError> {
        let hit = |cond: bool, reason: OutcomeReason| -> Result<_, ConditionError> {
            Ok(cond.then_some(reason))
        };
        match self {
            Condition::TopOut => hit(ctx.game.game_over(), OutcomeReason::TopOut),
            Condition::LinesReached(target) => {
                hit(ctx.game.lines() >= *target, OutcomeReason::TargetReached)
            }
            Condition::ScoreReached(target) => {
                hit(ctx.game.score() >= *target, OutcomeReason::TargetReached)
            }
            Condition::TimeUp => {
                let remaining = ctx
                    .time_remaining_ms
                    .ok_or(ConditionError::MissingState("time_up"))?;
                hit(remaining == 0, OutcomeReason::TimeUp)
            }
            Condition::OpponentDefeated => {
                hit(ctx.opponent_defeated, OutcomeReason::OpponentDefeated)
            }
            Condition::GarbageOverflow => {
                let overflow = ctx.game.garbage_overflow()
                    || ctx.ledger.map(GarbageLedger::overflow).unwrap_or(false);
                hit(overflow, OutcomeReason::GarbageOverflow)
            }
            Condition::Custom { check, .. } => check(ctx),
        }
    }
}

/// Ordered predicates, first match wins.
#[derive(Debug, Default)]
pub struct ConditionList {
    conditions: Vec<Condition>,
}

impl ConditionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// First reason reported, in registration order.
    ///
    /// A failing condition is logged and counts as no result.
    pub fn first_match(&self, ctx: &ConditionContext<'_>) -> Option<OutcomeReason> {
        self.conditions.iter().find_map(|condition| {
            match condition.evaluate(ctx) {
                Ok(reason) => reason,
                Err(err) => {
                    warn!(condition = condition.name(), error = %err, "condition failed");
                    None
                }
            }
        })
    }
}

impl FromIterator<Condition> for ConditionList {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[Condition; N]> for ConditionList {
    fn from(conditions: [Condition; N]) -> Self {
        conditions.into_iter().collect()
    }
}
