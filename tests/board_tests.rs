//! Board tests through the facade crate.

use tetris_arena::core::Board;
use tetris_arena::types::{Material, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

const T: Material = Material::Piece(PieceKind::T);

#[test]
fn test_board_new_empty() {
    let board = Board::new();
    assert_eq!(board.width(), BOARD_WIDTH);
    assert_eq!(board.height(), BOARD_HEIGHT);
    assert!(board.is_empty());

    for y in 0..BOARD_HEIGHT as i8 {
        for x in 0..BOARD_WIDTH as i8 {
            assert!(board.is_valid(x, y), "Cell ({}, {}) should be valid", x, y);
        }
    }
}

#[test]
fn test_board_out_of_bounds() {
    let mut board = Board::new();

    assert_eq!(board.get(-1, 0), None);
    assert_eq!(board.get(0, BOARD_HEIGHT as i8), None);
    assert!(!board.set(BOARD_WIDTH as i8, 0, Some(T)));
    assert!(!board.is_valid(-1, 5));
    assert!(!board.is_occupied(-1, 5));
}

#[test]
fn test_board_set_and_get() {
    let mut board = Board::new();

    assert!(board.set(5, 10, Some(T)));
    assert_eq!(board.get(5, 10), Some(Some(T)));
    assert!(board.is_occupied(5, 10));

    assert!(board.set(5, 10, None));
    assert_eq!(board.get(5, 10), Some(None));
}

#[test]
fn test_clear_non_adjacent_rows() {
    let mut board = Board::from_rows(&[
        "##########",
        "#.........",
        "##########",
    ]);

    let cleared = board.clear_full_rows();
    assert_eq!(cleared.as_slice(), &[19, 17]);
    assert!(board.is_occupied(0, 19));
    assert_eq!(board.cells().iter().filter(|c| c.is_some()).count(), 1);
}

#[test]
fn test_garbage_row_has_one_hole() {
    let mut board = Board::from_rows(&["T........."]);
    board.push_garbage_row(4, Material::Garbage);

    let bottom = BOARD_HEIGHT as i8 - 1;
    for x in 0..BOARD_WIDTH as i8 {
        assert_eq!(board.is_occupied(x, bottom), x != 4);
    }
    // The old bottom row moved up by one.
    assert!(board.is_occupied(0, bottom - 1));
}

#[test]
fn test_column_heights() {
    let board = Board::from_rows(&["#.........", "#.#......."]);
    let heights = board.column_heights();
    assert_eq!(heights[0], 2);
    assert_eq!(heights[1], 0);
    assert_eq!(heights[2], 1);
}
