//! Core simulation - pure, deterministic, and testable
//!
//! This crate contains the board, piece and scoring rules shared by the player
//! simulation and the opponent simulator. It has **no dependencies** on I/O,
//! networking, or wall-clock time:
//!
//! - **Deterministic**: Same seed produces identical games, garbage holes included
//! - **Testable**: Comprehensive unit tests for all game rules
//! - **Portable**: Runs headless inside the mode engine or a bench harness
//! - **Fast**: Zero-allocation hot paths for game tick processing
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 game board with collision detection, line clearing and garbage rows
//! - [`game_state`]: The player simulation: active piece, hold, scoring, timing
//! - [`garbage`]: Garbage row injection shared by both boards
//! - [`pieces`]: Tetromino shapes, the falling piece, and SRS rotation with wall kicks
//! - [`rng`]: LCG and 7-bag random piece generation
//! - [`scoring`]: Score tables, level progression and gravity speed curves
//!
//! # Example
//!
//! ```
//! use tetris_arena_core::GameState;
//! use tetris_arena_types::GameAction;
//!
//! let mut game = GameState::new(12345);
//! game.start();
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::RotateCw);
//! game.apply_action(GameAction::HardDrop);
//!
//! assert!(game.score() > 0); // Hard drop awards points
//! let event = game.take_last_event().unwrap();
//! assert_eq!(event.lines_cleared, 0);
//! ```
//!
//! # Timing
//!
//! The simulation uses a fixed timestep system:
//! - **Tick Rate**: 16ms (approximately 60 FPS)
//! - **Gravity**: Depends on level and speed curve, or a mode override
//! - **Soft Drop**: 10x faster than normal gravity
//! - **Lock Delay**: 450ms when piece is grounded
//!
//! Call [`GameState::tick`](game_state::GameState::tick) every frame with elapsed time.

pub mod board;
pub mod game_state;
pub mod garbage;
pub mod pieces;
pub mod rng;
pub mod scoring;

pub use tetris_arena_types as types;

pub use board::Board;
pub use game_state::{GameState, PlayCounters, RulesConfig};
pub use garbage::{inject_rows, Injection};
pub use pieces::{get_shape, try_rotate, Tetromino, SPAWN_POSITION};
pub use rng::{PieceQueue, SimpleRng};
pub use scoring::{calculate_drop_score, calculate_score, ScoreResult, SpeedCurve};
