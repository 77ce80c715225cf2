//! Embedded opponent simulator.
//!
//! A second board driven by an injected [`DecisionPolicy`]. Each update moves
//! the active piece at most one column and one clockwise rotation toward the
//! policy's target, and hard-drops once both match. Rotation is collision
//! checked without wall kicks. Gravity is applied separately by the caller on
//! its own cadence; a piece that cannot fall locks where it is.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{inject_rows, Board, Injection, PieceQueue, SimpleRng, Tetromino};
use crate::types::{PieceKind, Rotation};

/// Target placement chosen by a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Target piece origin column.
    pub column: i8,
    pub rotation: Rotation,
}

/// What a policy gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct OpponentView<'a> {
    pub board: &'a Board,
    pub active: Tetromino,
    pub next: PieceKind,
    /// Pieces locked so far; changes exactly when a new piece is in play.
    pub pieces_locked: u32,
}

/// Chooses where the opponent's active piece should go.
pub trait DecisionPolicy {
    fn decide(&mut self, view: &OpponentView<'_>) -> Option<Decision>;
}

impl<F> DecisionPolicy for F
where
    F: FnMut(&OpponentView<'_>) -> Option<Decision>,
{
    fn decide(&mut self, view: &OpponentView<'_>) -> Option<Decision> {
        self(view)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentEvent {
    LinesCleared(u32),
    ToppedOut,
    Overflowed,
}

/// Immutable view of the opponent for conditions and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpponentSnapshot {
    pub score: u32,
    pub lines: u32,
    pub pieces_locked: u32,
    pub topped_out: bool,
    pub overflowed: bool,
}

impl OpponentSnapshot {
    pub fn defeated(&self) -> bool {
        self.topped_out || self.overflowed
    }
}

pub struct OpponentSim {
    board: Board,
    active: Option<Tetromino>,
    queue: PieceQueue,
    garbage_rng: SimpleRng,
    policy: Box<dyn DecisionPolicy>,
    score: u32,
    lines: u32,
    pieces_locked: u32,
    topped_out: bool,
    overflowed: bool,
    events: Vec<OpponentEvent>,
}

impl std::fmt::Debug for OpponentSim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpponentSim")
            .field("active", &self.active)
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl OpponentSim {
    /// New simulator with its first piece already spawned.
    pub fn new(seed: u32, policy: Box<dyn DecisionPolicy>) -> Self {
        let mut sim = Self {
            board: Board::new(),
            active: None,
            queue: PieceQueue::new(seed),
            garbage_rng: SimpleRng::new(seed.rotate_left(16) ^ 0x5bd1_e995),
            policy,
            score: 0,
            lines: 0,
            pieces_locked: 0,
            topped_out: false,
            overflowed: false,
            events: Vec::new(),
        };
        sim.spawn();
        sim
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn defeated(&self) -> bool {
        self.topped_out || self.overflowed
    }

    /// One decision-and-execution step.
    pub fn update(&mut self) {
        let Some(piece) = self.active else {
            return;
        };

        let view = OpponentView {
            board: &self.board,
            active: piece,
            next: self.queue.peek(),
            pieces_locked: self.pieces_locked,
        };
        let Some(decision) = self.policy.decide(&view) else {
            return;
        };

        let mut piece = piece;
        let dx = (decision.column - piece.x).signum();
        if dx != 0 {
            let moved = piece.shifted(dx, 0);
            if moved.is_valid(&self.board) {
                piece = moved;
            }
        }

        if piece.rotation != decision.rotation {
            let rotated = piece.rotated_in_place(piece.rotation.rotate_cw());
            if rotated.is_valid(&self.board) {
                piece = rotated;
            }
        }

        self.active = Some(piece);

        if piece.x == decision.column && piece.rotation == decision.rotation {
            self.active = Some(piece.dropped(&self.board));
            self.lock();
        }
    }

    /// One gravity step; a piece that cannot fall locks in place.
    pub fn apply_gravity(&mut self) {
        let Some(piece) = self.active else {
            return;
        };
        let fallen = piece.shifted(0, 1);
        if fallen.is_valid(&self.board) {
            self.active = Some(fallen);
        } else {
            self.lock();
        }
    }

    /// Push garbage rows onto this board.
    pub fn inject_garbage(&mut self, rows: u32) -> Injection {
        if self.defeated() {
            return Injection::default();
        }
        let outcome = inject_rows(
            &mut self.board,
            self.active.as_mut(),
            rows,
            &mut self.garbage_rng,
        );
        if outcome.overflow {
            self.overflowed = true;
            self.active = None;
            self.events.push(OpponentEvent::Overflowed);
            debug!(rows, "opponent overflowed");
        }
        outcome
    }

    fn lock(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        self.board
            .lock_piece(&piece.shape(), piece.x, piece.y, piece.material());
        self.pieces_locked += 1;

        let cleared = self.board.clear_full_rows().len() as u32;
        if cleared > 0 {
            self.score += 100 * cleared;
            self.lines += cleared;
            self.events.push(OpponentEvent::LinesCleared(cleared));
        }

        self.spawn();
    }

    fn spawn(&mut self) {
        let piece = Tetromino::new(self.queue.draw());
        if piece.fits_in_bounds(&self.board) {
            self.active = Some(piece);
        } else {
            self.active = None;
            self.topped_out = true;
            self.events.push(OpponentEvent::ToppedOut);
            debug!(pieces = self.pieces_locked, "opponent topped out");
        }
    }

    /// Events raised since the last call.
    pub fn drain_events(&mut self) -> Vec<OpponentEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> OpponentSnapshot {
        OpponentSnapshot {
            score: self.score,
            lines: self.lines,
            pieces_locked: self.pieces_locked,
            topped_out: self.topped_out,
            overflowed: self.overflowed,
        }
    }
}
