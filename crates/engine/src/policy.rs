//! Default opponent policy: one-ply placement search with a weighted board score.

use crate::config::Difficulty;
use crate::core::{Board, GameState, Tetromino, SPAWN_POSITION};
use crate::opponent::{Decision, DecisionPolicy, OpponentView};
use crate::types::{GameAction, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

static ROTATIONS: [Rotation; 4] = [
    Rotation::North,
    Rotation::East,
    Rotation::South,
    Rotation::West,
];

/// Weights for the board evaluation. Larger is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub aggregate_height: f64,
    pub complete_lines: f64,
    pub holes: f64,
    pub bumpiness: f64,
}

impl Weights {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                aggregate_height: -0.25,
                complete_lines: 0.4,
                holes: -0.15,
                bumpiness: -0.05,
            },
            Difficulty::Medium | Difficulty::Hard => Self {
                aggregate_height: -0.51,
                complete_lines: 0.76,
                holes: -0.36,
                bumpiness: -0.18,
            },
        }
    }
}

/// Result of placing a piece on a scratch board.
#[derive(Debug, Clone)]
struct Placement {
    decision: Decision,
    board: Board,
    cleared: u32,
}

/// Greedy placement search. Hard difficulty also looks one piece ahead.
#[derive(Debug, Clone)]
pub struct HeuristicPolicy {
    weights: Weights,
    lookahead: bool,
    cached: Option<(u32, Decision)>,
}

impl HeuristicPolicy {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            weights: Weights::for_difficulty(difficulty),
            lookahead: difficulty == Difficulty::Hard,
            cached: None,
        }
    }

    pub fn with_weights(weights: Weights, lookahead: bool) -> Self {
        Self {
            weights,
            lookahead,
            cached: None,
        }
    }

    /// Best placement for `kind` on `board`, ignoring reachability.
    pub fn best_placement(
        &self,
        board: &Board,
        kind: PieceKind,
        next: Option<PieceKind>,
    ) -> Option<Decision> {
        let mut best: Option<(f64, Decision)> = None;

        for placement in placements(board, kind) {
            let mut score = self.evaluate(&placement.board, placement.cleared);
            if let Some(next) = next.filter(|_| self.lookahead) {
                let follow_up = placements(&placement.board, next)
                    .map(|p| self.evaluate(&p.board, p.cleared))
                    .fold(f64::NEG_INFINITY, f64::max);
                if follow_up.is_finite() {
                    score += follow_up;
                }
            }

            // Strictly greater keeps the first candidate on ties.
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, placement.decision));
            }
        }

        best.map(|(_, decision)| decision)
    }

    pub fn evaluate(&self, board: &Board, cleared: u32) -> f64 {
        let heights = board.column_heights();
        let aggregate: u32 = heights.iter().map(|&h| h as u32).sum();
        let bumpiness: u32 = heights
            .windows(2)
            .map(|w| (w[0] as i32 - w[1] as i32).unsigned_abs())
            .sum();

        self.weights.aggregate_height * aggregate as f64
            + self.weights.complete_lines * cleared as f64
            + self.weights.holes * count_holes(board) as f64
            + self.weights.bumpiness * bumpiness as f64
    }
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

impl DecisionPolicy for HeuristicPolicy {
    fn decide(&mut self, view: &OpponentView<'_>) -> Option<Decision> {
        if let Some((locked, decision)) = self.cached {
            if locked == view.pieces_locked {
                return Some(decision);
            }
        }

        let decision = self.best_placement(view.board, view.active.kind, Some(view.next))?;
        self.cached = Some((view.pieces_locked, decision));
        Some(decision)
    }
}

/// Drives a player board toward the policy's placement, one action per call.
///
/// Rotates clockwise first, then walks the column, then hard-drops. Blocked
/// moves are retried until gravity locks the piece.
#[derive(Debug, Clone)]
pub struct Autoplayer {
    policy: HeuristicPolicy,
    target: Option<(u32, Decision)>,
}

impl Autoplayer {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            policy: HeuristicPolicy::new(difficulty),
            target: None,
        }
    }

    pub fn next_action(&mut self, game: &GameState) -> Option<GameAction> {
        let piece = game.active()?;
        let placed = game.counters().pieces_placed;

        let decision = match self.target {
            Some((at, decision)) if at == placed => decision,
            _ => {
                let next = game.next_queue().first().copied();
                let decision = self.policy.best_placement(game.board(), piece.kind, next)?;
                self.target = Some((placed, decision));
                decision
            }
        };

        let action = if piece.rotation != decision.rotation {
            GameAction::RotateCw
        } else if piece.x < decision.column {
            GameAction::MoveRight
        } else if piece.x > decision.column {
            GameAction::MoveLeft
        } else {
            GameAction::HardDrop
        };
        Some(action)
    }
}

/// Rotation states that give distinct shapes.
fn rotations(kind: PieceKind) -> &'static [Rotation] {
    match kind {
        PieceKind::O => &ROTATIONS[..1],
        _ => &ROTATIONS,
    }
}

/// Every valid rotation x column drop of `kind` from the spawn row.
fn placements(board: &Board, kind: PieceKind) -> impl Iterator<Item = Placement> + '_ {
    rotations(kind).iter().copied().flat_map(move |rotation| {
        (-2..BOARD_WIDTH as i8).filter_map(move |column| {
            let piece = Tetromino {
                kind,
                rotation,
                x: column,
                y: SPAWN_POSITION.1,
            };
            if !piece.is_valid(board) {
                return None;
            }
            let landed = piece.dropped(board);
            let mut scratch = board.clone();
            scratch.lock_piece(&landed.shape(), landed.x, landed.y, landed.material());
            let cleared = scratch.clear_full_rows().len() as u32;
            Some(Placement {
                decision: Decision { column, rotation },
                board: scratch,
                cleared,
            })
        })
    })
}

/// Empty cells with a filled cell somewhere above them in the same column.
fn count_holes(board: &Board) -> u32 {
    let mut holes = 0;
    for x in 0..BOARD_WIDTH as i8 {
        let mut roofed = false;
        for y in 0..BOARD_HEIGHT as i8 {
            if board.is_occupied(x, y) {
                roofed = true;
            } else if roofed {
                holes += 1;
            }
        }
    }
    holes
}
