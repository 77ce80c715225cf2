//! Garbage row injection.
//!
//! Shared by the player simulation and the opponent simulator: each injected
//! line removes the top row and appends a garbage row with one random hole.
//! The active piece is lifted out of the way when it can be, and the caller is
//! told when it cannot (overflow).

use crate::board::Board;
use crate::pieces::Tetromino;
use crate::rng::SimpleRng;
use crate::types::{Material, BOARD_WIDTH};

/// What an injection did to the board and active piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Injection {
    /// Rows actually pushed.
    pub rows: u32,
    /// The active piece was shifted up to make room.
    pub lifted: bool,
    /// After lifting, the active piece still overlaps the stack or sits
    /// entirely above row 0.
    pub overflow: bool,
}

/// Push `rows` garbage rows into `board` and reconcile `active` with the new stack.
///
/// `rows == 0` leaves everything untouched.
pub fn inject_rows(
    board: &mut Board,
    active: Option<&mut Tetromino>,
    rows: u32,
    rng: &mut SimpleRng,
) -> Injection {
    if rows == 0 {
        return Injection::default();
    }

    for _ in 0..rows {
        let hole = rng.next_range(BOARD_WIDTH as u32) as usize;
        board.push_garbage_row(hole, Material::Garbage);
    }

    let mut outcome = Injection {
        rows,
        ..Injection::default()
    };

    if let Some(piece) = active {
        if !piece.is_valid(board) {
            let lift = rows.min(i8::MAX as u32) as i8;
            *piece = piece.shifted(0, -lift);
            outcome.lifted = true;
            // Hanging over the top is fine; overlapping the stack or leaving
            // the board entirely is not.
            outcome.overflow = !piece.is_valid(board) || piece.is_above_top();
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PieceKind, BOARD_HEIGHT};

    fn filled_count(board: &Board) -> usize {
        board.cells().iter().filter(|c| c.is_some()).count()
    }

    #[test]
    fn zero_rows_mutates_nothing() {
        let mut board = Board::from_rows(&["##.#######"]);
        let before = board.clone();
        let mut piece = Tetromino::new(PieceKind::T);
        let mut rng = SimpleRng::new(1);

        let out = inject_rows(&mut board, Some(&mut piece), 0, &mut rng);
        assert_eq!(out, Injection::default());
        assert_eq!(board, before);
        assert_eq!(piece, Tetromino::new(PieceKind::T));
    }

    #[test]
    fn three_rows_each_have_one_hole() {
        let mut board = Board::new();
        let mut rng = SimpleRng::new(11);

        let out = inject_rows(&mut board, None, 3, &mut rng);
        assert_eq!(out.rows, 3);
        assert!(!out.overflow);

        let h = BOARD_HEIGHT as usize;
        for y in 0..h {
            let filled = (0..BOARD_WIDTH as i8)
                .filter(|&x| board.is_occupied(x, y as i8))
                .count();
            if y >= h - 3 {
                assert_eq!(filled, BOARD_WIDTH as usize - 1, "row {y}");
            } else {
                assert_eq!(filled, 0, "row {y}");
            }
        }
        assert_eq!(filled_count(&board), 27);
    }

    #[test]
    fn piece_is_lifted_when_overlapped() {
        let mut board = Board::new();
        // Resting O on the floor: garbage pushes into it.
        let mut piece = Tetromino::new(PieceKind::O).dropped(&board);
        let start_y = piece.y;
        let mut rng = SimpleRng::new(2);

        let out = inject_rows(&mut board, Some(&mut piece), 2, &mut rng);
        assert!(out.lifted);
        assert_eq!(piece.y, start_y - 2);
        assert!(!out.overflow);
        assert!(piece.is_valid(&board));
    }

    #[test]
    fn untouched_piece_is_not_lifted() {
        let mut board = Board::new();
        let mut piece = Tetromino::new(PieceKind::I);
        let mut rng = SimpleRng::new(5);

        let out = inject_rows(&mut board, Some(&mut piece), 4, &mut rng);
        assert!(!out.lifted);
        assert_eq!(piece.y, 0);
    }

    #[test]
    fn piece_hanging_over_the_top_keeps_playing() {
        for seed in 1..20 {
            // Stack up to row 1: one garbage row reaches the O's lower half.
            let rows: Vec<&str> = std::iter::repeat("#########.").take(18).collect();
            let mut board = Board::from_rows(&rows);
            let mut piece = Tetromino::new(PieceKind::O);
            let mut rng = SimpleRng::new(seed);

            let out = inject_rows(&mut board, Some(&mut piece), 1, &mut rng);
            assert!(out.lifted, "seed {seed}");
            assert!(!out.overflow, "seed {seed}");
            assert_eq!(piece.y, -1);
            assert!(!piece.is_above_top());
            assert!(piece.is_valid(&board));
        }
    }

    #[test]
    fn three_rows_that_only_touch_the_piece_leave_it_alone() {
        // Stack top at row 5; after three rows it sits right under the T.
        let rows: Vec<&str> = std::iter::repeat("#########.").take(15).collect();
        let mut board = Board::from_rows(&rows);
        let mut piece = Tetromino::new(PieceKind::T);
        let mut rng = SimpleRng::new(4);

        let out = inject_rows(&mut board, Some(&mut piece), 3, &mut rng);
        assert_eq!(out.rows, 3);
        assert!(!out.lifted);
        assert!(!out.overflow);
        assert_eq!(piece.y, 0);
        assert!(piece.is_grounded(&board));
    }

    #[test]
    fn three_rows_lift_a_landed_piece_back_into_view() {
        let rows: Vec<&str> = std::iter::repeat("#########.").take(15).collect();
        let mut board = Board::from_rows(&rows);
        let mut piece = Tetromino::new(PieceKind::T).dropped(&board);
        assert_eq!(piece.y, 3);
        let mut rng = SimpleRng::new(4);

        let out = inject_rows(&mut board, Some(&mut piece), 3, &mut rng);
        assert!(out.lifted);
        assert!(!out.overflow);
        assert_eq!(piece.y, 0);
        assert!(piece.is_valid(&board));
    }

    #[test]
    fn piece_pushed_fully_above_the_top_overflows() {
        let rows: Vec<&str> = std::iter::repeat("#########.").take(18).collect();
        let mut board = Board::from_rows(&rows);
        let mut piece = Tetromino::new(PieceKind::O);
        let mut rng = SimpleRng::new(9);

        let out = inject_rows(&mut board, Some(&mut piece), 2, &mut rng);
        assert!(out.lifted);
        assert!(out.overflow);
        assert!(piece.is_above_top());
    }

    #[test]
    fn overflow_is_reported_regardless_of_holes() {
        for seed in 1..20 {
            // Nearly full stack: nothing above the piece to lift into.
            let rows: Vec<&str> = std::iter::repeat("#########.").take(18).collect();
            let mut board = Board::from_rows(&rows);
            let mut piece = Tetromino::new(PieceKind::O);
            let mut rng = SimpleRng::new(seed);

            let out = inject_rows(&mut board, Some(&mut piece), 3, &mut rng);
            assert!(out.overflow, "seed {seed}");
        }
    }
}
