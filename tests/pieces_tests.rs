//! SRS shapes and kicks through the facade crate.

use tetris_arena::core::pieces::{get_kick_table, get_shape, try_rotate};
use tetris_arena::core::{Board, Tetromino, SPAWN_POSITION};
use tetris_arena::types::{PieceKind, Rotation};

#[test]
fn test_i_piece_shapes() {
    assert_eq!(get_shape(PieceKind::I, Rotation::North), [(0, 1), (1, 1), (2, 1), (3, 1)]);
    assert_eq!(get_shape(PieceKind::I, Rotation::East), [(2, 0), (2, 1), (2, 2), (2, 3)]);
}

#[test]
fn test_o_piece_is_rotation_invariant() {
    let north = get_shape(PieceKind::O, Rotation::North);
    for rotation in [Rotation::East, Rotation::South, Rotation::West] {
        assert_eq!(get_shape(PieceKind::O, rotation), north);
    }
    assert!(get_kick_table(PieceKind::O).iter().flatten().all(|&k| k == (0, 0)));
}

#[test]
fn test_first_kick_is_no_kick() {
    for kind in [PieceKind::I, PieceKind::T, PieceKind::L] {
        for row in get_kick_table(kind) {
            assert_eq!(row[0], (0, 0));
        }
    }
}

#[test]
fn test_rotation_in_open_space_needs_no_kick() {
    let board = Board::new();
    let result = try_rotate(PieceKind::T, Rotation::North, 4, 5, true, |x, y| {
        board.is_valid(x, y)
    });
    assert_eq!(result, Some((Rotation::East, (0, 0))));
}

#[test]
fn test_wall_kick_off_left_wall() {
    let board = Board::new();
    // West-facing I hugging the left wall cannot turn north in place.
    let result = try_rotate(PieceKind::I, Rotation::West, -1, 5, true, |x, y| {
        board.is_valid(x, y)
    });
    let (rotation, kick) = result.expect("kick should succeed");
    assert_eq!(rotation, Rotation::North);
    assert_ne!(kick, (0, 0));
}

#[test]
fn test_spawn_and_drop() {
    let piece = Tetromino::new(PieceKind::O);
    assert_eq!((piece.x, piece.y), SPAWN_POSITION);
    assert_eq!(piece.rotation, Rotation::North);

    let board = Board::new();
    let landed = piece.dropped(&board);
    assert!(landed.is_grounded(&board));
    assert_eq!(landed.y, 18);
}
