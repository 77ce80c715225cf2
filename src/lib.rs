//! Tetris arena (workspace facade crate).
//!
//! Re-exports `tetris_arena::{types, core, engine, adapter}` so callers depend on one
//! package while the implementation lives in dedicated crates under `crates/`.

pub use tetris_arena_adapter as adapter;
pub use tetris_arena_core as core;
pub use tetris_arena_engine as engine;
pub use tetris_arena_types as types;
