//! Pieces module tests - shape matrices and kick resolution

use nazotet::core::pieces::{get_kick_table, kick_candidates, kick_row, try_rotate, MinoOffset};
use nazotet::core::{spawn_shape, Board, Shape, Tetromino};
use nazotet::types::{Mino, PieceKind, Rotation};

fn cells(shape: &Shape) -> Vec<MinoOffset> {
    shape.minos().collect()
}

fn turned(kind: PieceKind, quarter_turns: usize) -> Shape {
    let mut shape = spawn_shape(kind);
    for _ in 0..quarter_turns {
        shape = shape.rotated(true);
    }
    shape
}

// ============== Shape Tests ==============

#[test]
fn test_i_piece_shapes() {
    assert_eq!(cells(&turned(PieceKind::I, 0)), [(0, 1), (1, 1), (2, 1), (3, 1)]);
    assert_eq!(cells(&turned(PieceKind::I, 1)), [(2, 0), (2, 1), (2, 2), (2, 3)]);
    assert_eq!(cells(&turned(PieceKind::I, 2)), [(0, 2), (1, 2), (2, 2), (3, 2)]);
    assert_eq!(cells(&turned(PieceKind::I, 3)), [(1, 0), (1, 1), (1, 2), (1, 3)]);
}

#[test]
fn test_o_piece_shapes() {
    for turns in 0..4 {
        assert_eq!(cells(&turned(PieceKind::O, turns)), [(0, 0), (1, 0), (0, 1), (1, 1)]);
    }
}

#[test]
fn test_t_piece_shapes() {
    assert_eq!(cells(&turned(PieceKind::T, 0)), [(1, 0), (0, 1), (1, 1), (2, 1)]);
    assert_eq!(cells(&turned(PieceKind::T, 1)), [(1, 0), (1, 1), (2, 1), (1, 2)]);
    assert_eq!(cells(&turned(PieceKind::T, 2)), [(0, 1), (1, 1), (2, 1), (1, 2)]);
    assert_eq!(cells(&turned(PieceKind::T, 3)), [(1, 0), (0, 1), (1, 1), (1, 2)]);
}

#[test]
fn test_jlsz_spawn_shapes() {
    assert_eq!(cells(&spawn_shape(PieceKind::J)), [(0, 0), (0, 1), (1, 1), (2, 1)]);
    assert_eq!(cells(&spawn_shape(PieceKind::L)), [(2, 0), (0, 1), (1, 1), (2, 1)]);
    assert_eq!(cells(&spawn_shape(PieceKind::S)), [(1, 0), (2, 0), (0, 1), (1, 1)]);
    assert_eq!(cells(&spawn_shape(PieceKind::Z)), [(0, 0), (1, 0), (1, 1), (2, 1)]);
}

#[test]
fn test_four_turns_is_identity() {
    for kind in PieceKind::ALL {
        assert_eq!(turned(kind, 4), spawn_shape(kind), "{:?}", kind);
        let back = spawn_shape(kind).rotated(true).rotated(false);
        assert_eq!(back, spawn_shape(kind), "{:?}", kind);
    }
}

#[test]
fn test_spawn_position() {
    let expect = [
        (PieceKind::I, 3),
        (PieceKind::O, 4),
        (PieceKind::T, 3),
        (PieceKind::S, 3),
        (PieceKind::Z, 3),
        (PieceKind::J, 3),
        (PieceKind::L, 3),
    ];
    for (kind, x) in expect {
        let piece = Tetromino::new(kind);
        assert_eq!((piece.x, piece.y), (x, 1), "{:?}", kind);
        assert_eq!(piece.rotation, Rotation::North);
    }
}

// ============== Kick Tests ==============

#[test]
fn test_kick_table_selection() {
    assert_eq!(get_kick_table(PieceKind::I)[0][0], (-2, 0));
    for kind in [PieceKind::L, PieceKind::O, PieceKind::Z, PieceKind::T, PieceKind::J, PieceKind::S] {
        assert_eq!(get_kick_table(kind)[0][0], (-1, 0), "{:?}", kind);
    }
}

#[test]
fn test_ccw_uses_target_row() {
    // East -> North counter-clockwise reads row North*2+1
    assert_eq!(kick_row(Rotation::East, false), 1);
    assert_eq!(
        kick_candidates(PieceKind::T, Rotation::East, false),
        [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)]
    );
}

#[test]
fn test_t_rotation_success() {
    let board = Board::new();
    let result = try_rotate(
        PieceKind::T,
        &spawn_shape(PieceKind::T),
        Rotation::North,
        3,
        10,
        true,
        |shape, x, y| board.is_placement_valid(shape, x, y),
    )
    .unwrap();

    assert_eq!(result.rotation, Rotation::East);
    assert_eq!((result.x, result.y), (3, 10));
    assert_eq!(result.kick_index, 0);
}

#[test]
fn test_t_rotation_against_wall_kicks() {
    let board = Board::new();
    // West-facing T flush with the right wall; clockwise needs x-1
    let west = spawn_shape(PieceKind::T).rotated(false);
    let result = try_rotate(PieceKind::T, &west, Rotation::West, 8, 10, true, |shape, x, y| {
        board.is_placement_valid(shape, x, y)
    });
    // Row West*2 = 6: (-1, 0) first
    let result = result.unwrap();
    assert_eq!(result.rotation, Rotation::North);
    assert_eq!(result.kick_index, 1);
    assert_eq!((result.x, result.y), (7, 10));
}

#[test]
fn test_rotation_failure_when_boxed_in() {
    let mut board = Board::new();
    for y in 0..23 {
        for x in 0..10 {
            if !(3..6).contains(&x) || y != 11 {
                board.set(x, y, Some(Mino::Gray));
            }
        }
    }
    // A one-row gap never fits a vertical T
    let t = spawn_shape(PieceKind::T);
    let result = try_rotate(PieceKind::T, &t, Rotation::North, 3, 10, true, |shape, x, y| {
        board.is_placement_valid(shape, x, y)
    });
    assert!(result.is_none());
}

#[test]
fn test_i_rotation_kicks_use_i_table() {
    let board = Board::new();
    // Vertical I hugging the left wall; clockwise from East back to South
    let east = spawn_shape(PieceKind::I).rotated(true);
    let result = try_rotate(PieceKind::I, &east, Rotation::East, -2, 10, true, |shape, x, y| {
        board.is_placement_valid(shape, x, y)
    })
    .unwrap();
    // Row East*2 = 2; the origin and (-1, 0) leave the board
    assert_eq!(result.rotation, Rotation::South);
    assert_eq!(result.kick_index, 2);
    assert_eq!((result.x, result.y), (0, 10));
}
