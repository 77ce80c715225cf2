//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the arena.
//! All types are plain data with no behavior beyond parsing and formatting, making
//! them usable in any context (player simulation, opponent simulator, mode engine,
//! peer protocol).
//!
//! # Board Dimensions
//!
//! Standard playfield dimensions, shared by the player board and the opponent board:
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 is the top)
//! - **Spawn position**: (3, 0) for every piece
//!
//! # Game Timing Constants
//!
//! Timing values are in milliseconds of simulation time:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `BASE_DROP_MS` | 1000 | Gravity at level 0 |
//! | `SOFT_DROP_MULTIPLIER` | 10 | Soft drop is 10x faster |
//! | `SOFT_DROP_GRACE_MS` | 150 | Soft drop state timeout |
//! | `LOCK_DELAY_MS` | 450 | Time before piece locks when grounded |
//! | `LOCK_RESET_LIMIT` | 15 | Max lock timer resets per piece |
//! | `LINE_CLEAR_PAUSE_MS` | 180 | Pause duration after line clear |
//!
//! # Examples
//!
//! ```
//! use tetris_arena_types::{GameAction, Material, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let parsed = PieceKind::from_str("t").unwrap();
//! assert_eq!(parsed, PieceKind::T);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
//!
//! assert_eq!(Material::Garbage.tag(), 8);
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

use serde::{Deserialize, Serialize};

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Base gravity interval at level 0 (1000ms = 1 second per row)
pub const BASE_DROP_MS: u32 = 1000;

/// Soft drop speed multiplier (10x normal speed).
pub const SOFT_DROP_MULTIPLIER: u32 = 10;

/// Soft drop state timeout.
pub const SOFT_DROP_GRACE_MS: u32 = 150;

/// Lock delay when piece is grounded (450ms).
pub const LOCK_DELAY_MS: u32 = 450;

/// Maximum number of lock timer resets per piece (15)
pub const LOCK_RESET_LIMIT: u8 = 15;

/// Pause duration after clearing lines (180ms)
pub const LINE_CLEAR_PAUSE_MS: u32 = 180;

/// Drop intervals by level (milliseconds per row)
///
/// Index 0 = Level 0, Index 8 = Level 8+
pub const DROP_INTERVALS: [u32; 9] = [1000, 800, 650, 500, 400, 320, 250, 200, 160];

/// Minimum drop interval floor (120ms)
pub const DROP_INTERVAL_FLOOR_MS: u32 = 120;

/// Number of upcoming pieces exposed by the preview queue.
pub const NEXT_QUEUE_LEN: usize = 5;


/// The seven tetromino piece kinds
///
/// - **I**: horizontal bar
/// - **O**: 2x2 square
/// - **T**: T-shaped
/// - **S** / **Z**: skew pieces (mirrors)
/// - **J** / **L**: hook pieces (mirrors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// Every kind, in bag order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetris_arena_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }
}

/// Rotation states following the Super Rotation System (SRS)
///
/// The rotation cycle goes: North → East → South → West → North.
/// `index()` maps them to 0–3 in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90°)
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Numeric rotation state (0 = North, clockwise).
    pub fn index(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Inverse of [`Rotation::index`]; values wrap modulo 4.
    pub fn from_index(i: u8) -> Self {
        match i % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }

    /// Parse rotation from string
    ///
    /// Accepts full names or single letters (case-insensitive):
    /// "north" | "n", "east" | "e", "south" | "s", "west" | "w"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "north" | "n" => Some(Rotation::North),
            "east" | "e" => Some(Rotation::East),
            "south" | "s" => Some(Rotation::South),
            "west" | "w" => Some(Rotation::West),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Discrete input intents fed into the simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Drop piece one cell down (with soft drop scoring)
    SoftDrop,
    /// Instantly drop piece to lowest valid position
    HardDrop,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Hold current piece (if available)
    Hold,
    /// Toggle pause state
    Pause,
}

impl GameAction {
    /// Parse action from its camelCase name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetris_arena_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("ROTATECW"), Some(GameAction::RotateCw));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "hold" => Some(GameAction::Hold),
            "pause" => Some(GameAction::Pause),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Hold => "hold",
            GameAction::Pause => "pause",
        }
    }
}

/// T-Spin detection result
///
/// - **None**: Not a T-spin
/// - **Mini**: 3+ corners filled but not both front corners
/// - **Full**: 3+ corners filled and both front corners filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TSpinKind {
    None,
    Mini,
    Full,
}

impl TSpinKind {
    /// Returns `None` for `TSpinKind::None`, `Some("mini")` / `Some("full")` otherwise.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            TSpinKind::None => None,
            TSpinKind::Mini => Some("mini"),
            TSpinKind::Full => Some("full"),
        }
    }

    pub fn is_spin(&self) -> bool {
        !matches!(self, TSpinKind::None)
    }
}

/// What a filled cell is made of.
///
/// The numeric tag is opaque to the rules; it only has to be nonzero and stable
/// so grids can be exported as `u8` arrays (0 = empty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Piece(PieceKind),
    /// Obstruction rows injected by an attack.
    Garbage,
}

impl Material {
    pub fn tag(&self) -> u8 {
        match self {
            Material::Piece(PieceKind::I) => 1,
            Material::Piece(PieceKind::O) => 2,
            Material::Piece(PieceKind::T) => 3,
            Material::Piece(PieceKind::S) => 4,
            Material::Piece(PieceKind::Z) => 5,
            Material::Piece(PieceKind::J) => 6,
            Material::Piece(PieceKind::L) => 7,
            Material::Garbage => 8,
        }
    }
}

impl From<PieceKind> for Material {
    fn from(kind: PieceKind) -> Self {
        Material::Piece(kind)
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(Material)`: Filled cell
pub type Cell = Option<Material>;

/// Event emitted by a simulation after a piece locks.
///
/// Consumed once by the mode engine; carries everything the scoring overlays and
/// the garbage subsystem need to react to the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub lines_cleared: u32,
    /// Points awarded for the clear (after B2B, including combo bonus).
    pub line_clear_score: u32,
    pub tspin: TSpinKind,
    /// Board is completely empty after the clear.
    pub perfect_clear: bool,
    pub combo: u32,
    pub back_to_back: bool,
}

impl LockEvent {
    pub fn cleared_lines(&self) -> bool {
        self.lines_cleared > 0
    }
}

/// Line clear scoring table (Classic Nintendo scoring)
///
/// Points are multiplied by (level + 1) for higher levels.
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Combo scoring base value (50 points per combo step)
pub const COMBO_BASE: u32 = 50;

/// Back-to-back bonus numerator (3/2 = 1.5x multiplier)
pub const B2B_NUMERATOR: u32 = 3;

/// Back-to-back bonus denominator
pub const B2B_DENOMINATOR: u32 = 2;
