//! Board tests

use nazotet::core::{spawn_shape, Board, FieldDecoder, TextFieldDecoder};
use nazotet::types::{Mino, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, FIELD_CELLS};

#[test]
fn test_board_new_empty() {
    let board = Board::new();
    assert_eq!(board.width(), BOARD_WIDTH);
    assert_eq!(board.height(), BOARD_HEIGHT);

    for y in 0..BOARD_HEIGHT as i8 {
        for x in 0..BOARD_WIDTH as i8 {
            assert!(board.is_valid(x, y), "Cell ({}, {}) should be valid", x, y);
            assert_eq!(board.get(x, y), Some(None));
        }
    }
    assert!(board.is_empty());
}

#[test]
fn test_board_get_out_of_bounds() {
    let board = Board::new();

    assert_eq!(board.get(-1, 0), None);
    assert_eq!(board.get(0, -1), None);
    assert_eq!(board.get(BOARD_WIDTH as i8, 0), None);
    assert_eq!(board.get(0, BOARD_HEIGHT as i8), None);

    // Out of bounds never counts as free
    assert!(!board.is_valid(-1, 5));
    assert!(!board.is_valid(3, -1));
}

#[test]
fn test_board_set_and_get() {
    let mut board = Board::new();

    assert!(board.set(5, 10, Some(Mino::Piece(PieceKind::T))));
    assert_eq!(board.get(5, 10), Some(Some(Mino::Piece(PieceKind::T))));
    assert!(board.is_occupied(5, 10));
    assert!(!board.is_valid(5, 10));
    assert_eq!(board.id_at(5, 10), PieceKind::T.id());

    assert!(!board.set(10, 0, Some(Mino::Gray)));
    assert!(!board.set(0, -1, Some(Mino::Gray)));
}

#[test]
fn test_hidden_rows_collide() {
    let mut board = Board::new();
    board.set(4, 0, Some(Mino::Gray));
    let shape = spawn_shape(PieceKind::O);
    assert!(!board.is_placement_valid(&shape, 4, 0));
    assert!(!board.is_placement_valid(&shape, 3, -1));
    assert!(board.is_placement_valid(&shape, 5, -1));
}

#[test]
fn test_lock_skips_cells_above_top() {
    let mut board = Board::new();
    let shape = spawn_shape(PieceKind::I).rotated(true);
    // Vertical I at x=0 occupies column 2, rows -2..=1
    board.lock(&shape, 0, -2, PieceKind::I);

    assert!(board.is_occupied(2, 0));
    assert!(board.is_occupied(2, 1));
    let filled = board.cells().iter().filter(|c| c.is_some()).count();
    assert_eq!(filled, 2);
}

#[test]
fn test_board_is_row_full() {
    let mut board = Board::new();
    assert!(!board.is_row_full(22));

    for x in 0..9 {
        board.set(x, 22, Some(Mino::Gray));
    }
    assert!(!board.is_row_full(22));

    board.set(9, 22, Some(Mino::Neutral));
    assert!(board.is_row_full(22));
    assert!(!board.is_row_full(99));
}

#[test]
fn test_clear_full_rows_none() {
    let mut board = Board::new();
    board.set(0, 22, Some(Mino::Gray));
    let before = board.clone();
    assert!(board.clear_full_rows().is_empty());
    assert_eq!(board, before);
}

#[test]
fn test_clear_includes_hidden_rows() {
    let mut board = Board::new();
    board.fill_row(0, Mino::Gray);
    board.fill_row(22, Mino::Gray);
    board.set(3, 21, Some(Mino::Piece(PieceKind::L)));

    let cleared = board.clear_full_rows();
    assert_eq!(cleared.as_slice(), &[22usize, 0]);
    assert!(board.is_occupied(3, 22));
    let filled = board.cells().iter().filter(|c| c.is_some()).count();
    assert_eq!(filled, 1);
}

#[test]
fn test_from_flat_ids() {
    let mut ids = vec![0u8; FIELD_CELLS + 20];
    ids[22 * 10] = 8;
    ids[22 * 10 + 1] = 9;
    ids[21 * 10 + 9] = PieceKind::S.id();
    // Beyond the first 230 entries is ignored
    ids[FIELD_CELLS + 3] = 5;

    let board = Board::from_flat_ids(&ids).unwrap();
    assert_eq!(board.get(0, 22), Some(Some(Mino::Gray)));
    assert_eq!(board.get(1, 22), Some(Some(Mino::Neutral)));
    assert_eq!(board.get(9, 21), Some(Some(Mino::Piece(PieceKind::S))));
    assert_eq!(board.cells().iter().filter(|c| c.is_some()).count(), 3);
}

#[test]
fn test_from_flat_ids_short_input() {
    let board = Board::from_flat_ids(&[1, 2, 3]).unwrap();
    assert_eq!(board.id_at(0, 0), 1);
    assert_eq!(board.id_at(2, 0), 3);
    assert_eq!(board.id_at(3, 0), 0);
}

#[test]
fn test_from_flat_ids_rejects_unknown_id() {
    assert!(Board::from_flat_ids(&[0, 0, 12]).is_err());
}

#[test]
fn test_id_grid_matches_text_field() {
    let ids = TextFieldDecoder.decode("IIII....../GGGGGGGGG.").unwrap();
    let board = Board::from_flat_ids(&ids).unwrap();
    let grid = board.to_id_grid();

    assert_eq!(&grid[21][..4], &[1u8; 4]);
    assert_eq!(&grid[22][..9], &[8u8; 9]);
    assert_eq!(grid[22][9], 0);
    assert!(grid[..21].iter().all(|row| row.iter().all(|&id| id == 0)));
}
