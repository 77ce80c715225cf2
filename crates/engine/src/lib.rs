//! Mode engine - lifecycle, rule overlays and the garbage exchange
//!
//! Sits on top of the core simulation and turns a [`GameState`](core::GameState)
//! into a run of a specific mode: it decides when the run starts and ends, layers
//! each mode's scoring and timing rules over the board, and couples two boards
//! in battle through delayed garbage attacks.
//!
//! Everything is driven by [`ModeEngine::tick`] with simulation time only, so a
//! seed and an input script fully determine a run.
//!
//! # Module Structure
//!
//! - [`lifecycle`]: `ModeEngine`, its builder and the per-tick order
//! - [`condition`]: ordered victory/defeat predicates
//! - [`modes`]: mode registry, settings and per-mode overlays
//! - [`garbage`]: attack sizing and the per-side ledger
//! - [`opponent`] / [`policy`]: the embedded opponent and its default policy
//! - [`schedule`]: deadline-keyed deferred events
//! - [`collab`]: injected record store and peer transport
//! - [`config`], [`stats`], [`notify`]
//!
//! # Example
//!
//! ```
//! use tetris_arena_engine::{ModeConfig, ModeEngine, Notification};
//! use tetris_arena_engine::types::GameAction;
//!
//! let mut engine = ModeEngine::new(ModeConfig::new("sprint", 7));
//! engine.start();
//! engine.push_action(GameAction::HardDrop);
//! engine.tick();
//!
//! let notes = engine.drain_notifications();
//! assert!(matches!(notes[0], Notification::ModeStart { .. }));
//! assert_eq!(engine.stats().pieces_placed, 1);
//! ```

pub mod collab;
pub mod condition;
pub mod config;
pub mod garbage;
pub mod lifecycle;
pub mod modes;
pub mod notify;
pub mod opponent;
pub mod policy;
pub mod schedule;
pub mod stats;

pub use tetris_arena_core as core;
pub use tetris_arena_types as types;

pub use collab::{LoopbackTransport, MemoryRecordStore, PeerMessage, RecordStore, Transport};
pub use condition::{Condition, ConditionContext, ConditionError, ConditionList, OutcomeReason};
pub use config::{BattleConfig, ConfigError, Difficulty, ModeConfig, OpponentKind};
pub use garbage::{attack_size, ClearInfo, GarbageLedger, LedgerSnapshot};
pub use lifecycle::{ModeEngine, ModeEngineBuilder, ModeState, Outcome, Phase};
pub use modes::{
    BattleMode, BlitzMode, ClassicMode, InfinityMode, ModeInfo, ModeKind, ModeSettings, ModeVariant,
    OpponentSide, SprintMode,
};
pub use notify::Notification;
pub use opponent::{
    Decision, DecisionPolicy, OpponentEvent, OpponentSim, OpponentSnapshot, OpponentView,
};
pub use policy::{Autoplayer, HeuristicPolicy, Weights};
pub use schedule::Schedule;
pub use stats::{ModeExtras, StatsSnapshot};
