//! Pieces module - tetromino shapes, the falling piece, and SRS rotation
//!
//! Implements the Standard Rotation System (SRS) with wall kick tables for the
//! player simulation. The opponent simulator reuses the same shapes but rotates
//! without kicks (see [`Tetromino::rotated_in_place`]).
//! Reference: https://tetris.wiki/SRS

use crate::board::Board;
use crate::types::{Material, PieceKind, Rotation};

/// Offset of a single mino relative to piece origin
pub type MinoOffset = (i8, i8);

/// Shape of a piece - 4 mino offsets from piece origin
pub type PieceShape = [MinoOffset; 4];

/// Spawn position for new pieces (x, y)
pub const SPAWN_POSITION: (i8, i8) = (3, 0);

/// Get the shape (mino offsets) for a piece kind and rotation
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    use Rotation::*;
    match (kind, rotation) {
        (PieceKind::I, North) => [(0, 1), (1, 1), (2, 1), (3, 1)],
        (PieceKind::I, East) => [(2, 0), (2, 1), (2, 2), (2, 3)],
        (PieceKind::I, South) => [(0, 2), (1, 2), (2, 2), (3, 2)],
        (PieceKind::I, West) => [(1, 0), (1, 1), (1, 2), (1, 3)],

        (PieceKind::O, _) => [(1, 0), (2, 0), (1, 1), (2, 1)],

        (PieceKind::T, North) => [(1, 0), (0, 1), (1, 1), (2, 1)],
        (PieceKind::T, East) => [(1, 0), (1, 1), (2, 1), (1, 2)],
        (PieceKind::T, South) => [(0, 1), (1, 1), (2, 1), (1, 2)],
        (PieceKind::T, West) => [(1, 0), (0, 1), (1, 1), (1, 2)],

        (PieceKind::S, North) => [(1, 0), (2, 0), (0, 1), (1, 1)],
        (PieceKind::S, East) => [(1, 0), (1, 1), (2, 1), (2, 2)],
        (PieceKind::S, South) => [(1, 1), (2, 1), (0, 2), (1, 2)],
        (PieceKind::S, West) => [(0, 0), (0, 1), (1, 1), (1, 2)],

        (PieceKind::Z, North) => [(0, 0), (1, 0), (1, 1), (2, 1)],
        (PieceKind::Z, East) => [(2, 0), (1, 1), (2, 1), (1, 2)],
        (PieceKind::Z, South) => [(0, 1), (1, 1), (1, 2), (2, 2)],
        (PieceKind::Z, West) => [(1, 0), (0, 1), (1, 1), (0, 2)],

        (PieceKind::J, North) => [(0, 0), (0, 1), (1, 1), (2, 1)],
        (PieceKind::J, East) => [(1, 0), (2, 0), (1, 1), (1, 2)],
        (PieceKind::J, South) => [(0, 1), (1, 1), (2, 1), (2, 2)],
        (PieceKind::J, West) => [(1, 0), (1, 1), (0, 2), (1, 2)],

        (PieceKind::L, North) => [(2, 0), (0, 1), (1, 1), (2, 1)],
        (PieceKind::L, East) => [(1, 0), (1, 1), (1, 2), (2, 2)],
        (PieceKind::L, South) => [(0, 1), (1, 1), (2, 1), (0, 2)],
        (PieceKind::L, West) => [(0, 0), (1, 0), (1, 1), (1, 2)],
    }
}

/// SRS wall kick data: five (dx, dy) candidates per transition, first is "no kick".
pub type KickTable = [[(i8, i8); 5]; 8];

const O_KICKS: KickTable = [[(0, 0); 5]; 8];

/// Shared by J, L, S, T, Z
const JLSTZ_KICKS: KickTable = [
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)], // N->E
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],    // N->W
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],     // E->N
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],     // E->S
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)], // S->E
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],    // S->W
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],  // W->S
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],  // W->N
];

const I_KICKS: KickTable = [
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)], // N->E
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)], // N->W
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)], // E->N
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)], // E->S
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)], // S->E
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)], // S->W
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)], // W->S
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)], // W->N
];

pub fn get_kick_table(kind: PieceKind) -> &'static KickTable {
    match kind {
        PieceKind::O => &O_KICKS,
        PieceKind::I => &I_KICKS,
        _ => &JLSTZ_KICKS,
    }
}

fn get_kick_index(from: Rotation, clockwise: bool) -> usize {
    match (from, clockwise) {
        (Rotation::North, true) => 0,
        (Rotation::North, false) => 1,
        (Rotation::East, false) => 2,
        (Rotation::East, true) => 3,
        (Rotation::South, false) => 4,
        (Rotation::South, true) => 5,
        (Rotation::West, false) => 6,
        (Rotation::West, true) => 7,
    }
}

/// Try to rotate a piece with wall kicks
/// Returns Some(new_rotation, kick_offset) if successful, None if all kicks fail
pub fn try_rotate(
    kind: PieceKind,
    rotation: Rotation,
    x: i8,
    y: i8,
    clockwise: bool,
    is_valid: impl Fn(i8, i8) -> bool,
) -> Option<(Rotation, (i8, i8))> {
    let new_rotation = if clockwise {
        rotation.rotate_cw()
    } else {
        rotation.rotate_ccw()
    };

    let new_shape = get_shape(kind, new_rotation);
    let kicks = &get_kick_table(kind)[get_kick_index(rotation, clockwise)];

    kicks
        .iter()
        .find(|&&(dx, dy)| {
            new_shape
                .iter()
                .all(|&(mx, my)| is_valid(x + dx + mx, y + dy + my))
        })
        .map(|&kick| (new_rotation, kick))
}

/// A falling piece: kind, rotation state and origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// Create a new tetromino at spawn position
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            x: SPAWN_POSITION.0,
            y: SPAWN_POSITION.1,
        }
    }

    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    pub fn material(&self) -> Material {
        Material::Piece(self.kind)
    }

    /// Absolute board coordinates of the four minos.
    pub fn cells(&self) -> [(i8, i8); 4] {
        self.shape().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Check if all minos are at valid positions on the board
    ///
    /// Minos above row 0 count as valid; a lifted piece may hang over the top.
    pub fn is_valid(&self, board: &Board) -> bool {
        board.fits_open(&self.shape(), self.x, self.y)
    }

    /// Strict check used at spawn: every mino inside the visible board and empty.
    pub fn fits_in_bounds(&self, board: &Board) -> bool {
        board.fits(&self.shape(), self.x, self.y)
    }

    /// True when every mino sits above row 0.
    pub fn is_above_top(&self) -> bool {
        self.cells().iter().all(|&(_, y)| y < 0)
    }

    /// Check if the piece is resting on something
    pub fn is_grounded(&self, board: &Board) -> bool {
        !self.shifted(0, 1).is_valid(board)
    }

    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Same origin, new rotation state. No kicks are attempted.
    pub fn rotated_in_place(&self, rotation: Rotation) -> Self {
        Self { rotation, ..*self }
    }

    /// Number of rows the piece can fall before colliding.
    pub fn drop_distance(&self, board: &Board) -> u8 {
        let mut distance = 0u8;
        while self.shifted(0, distance as i8 + 1).is_valid(board) {
            distance += 1;
        }
        distance
    }

    /// Lowest valid resting position straight below.
    pub fn dropped(&self, board: &Board) -> Self {
        self.shifted(0, self.drop_distance(board) as i8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shape_has_four_distinct_minos() {
        for kind in PieceKind::ALL {
            for r in 0..4 {
                let shape = get_shape(kind, Rotation::from_index(r));
                for i in 0..4 {
                    for j in (i + 1)..4 {
                        assert_ne!(shape[i], shape[j], "{kind:?} r{r}");
                    }
                }
            }
        }
    }

    #[test]
    fn spawn_piece_is_valid_on_empty_board() {
        let board = Board::new();
        for kind in PieceKind::ALL {
            let p = Tetromino::new(kind);
            assert!(p.is_valid(&board));
            assert!(!p.is_grounded(&board));
        }
    }

    #[test]
    fn dropped_piece_rests_on_floor() {
        let board = Board::new();
        let p = Tetromino::new(PieceKind::O).dropped(&board);
        assert_eq!(p.y, 18);
        assert!(p.is_grounded(&board));
    }

    #[test]
    fn try_rotate_kicks_off_the_wall() {
        let board = Board::new();
        // Vertical I hugging the left wall: rotating needs a kick to stay in bounds.
        let piece = Tetromino {
            kind: PieceKind::I,
            rotation: Rotation::West,
            x: -1,
            y: 5,
        };
        assert!(piece.is_valid(&board));
        let result = try_rotate(piece.kind, piece.rotation, piece.x, piece.y, true, |x, y| {
            board.is_valid(x, y)
        });
        let (rot, (dx, _)) = result.expect("kick should resolve");
        assert_eq!(rot, Rotation::North);
        assert!(piece.x + dx >= 0);
    }

    #[test]
    fn rotated_in_place_keeps_origin() {
        let p = Tetromino::new(PieceKind::T).rotated_in_place(Rotation::South);
        assert_eq!((p.x, p.y), SPAWN_POSITION);
        assert_eq!(p.rotation, Rotation::South);
    }
}
