//! Board module - manages the settled-block grid
//!
//! The board is a 10x23 grid where each cell can be empty or hold a settled
//! mino. The top `HIDDEN_ROWS` rows are a spawn buffer but collide and clear
//! like any other row.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..22 (top to bottom).
//! Rows above the board (y < 0) are open space for a falling piece.

use arrayvec::ArrayVec;

use crate::field::FieldDecodeError;
use crate::pieces::Shape;
use crate::types::{Cell, Mino, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, EMPTY, FIELD_CELLS};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

const ROWS: usize = BOARD_HEIGHT as usize;
const COLS: usize = BOARD_WIDTH as usize;

/// Cell-id grid handed to presentation, row-major
pub type IdGrid = [[u8; COLS]; ROWS];

/// The game board - 10 columns x 23 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Build a board from a flat row-major array of cell identifiers
    ///
    /// Only the first `FIELD_CELLS` entries are meaningful; a shorter input
    /// leaves the remaining cells empty.
    pub fn from_flat_ids(ids: &[u8]) -> Result<Self, FieldDecodeError> {
        let mut board = Self::new();
        for (i, &id) in ids.iter().take(FIELD_CELLS).enumerate() {
            if id == EMPTY {
                continue;
            }
            let (x, y) = (i % COLS, i / COLS);
            if y >= ROWS {
                continue;
            }
            let mino = Mino::from_id(id).map_err(|id| FieldDecodeError::UnknownCell { index: i, id })?;
            board.cells[y * COLS + x] = mino;
        }
        Ok(board)
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * COLS + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is within bounds and empty
    pub fn is_valid(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Check if position is within bounds and filled
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check whether a shape fits with its top-left corner at (x, y)
    ///
    /// Fails on any mino left of 0, right of the last column, at or below the
    /// bottom, or on an occupied in-board cell. Minos above the top row only
    /// take the horizontal check.
    pub fn is_placement_valid(&self, shape: &Shape, x: i8, y: i8) -> bool {
        shape.minos().all(|(dx, dy)| {
            let (Some(px), Some(py)) = (x.checked_add(dx), y.checked_add(dy)) else {
                return false;
            };
            if px < 0 || px >= BOARD_WIDTH as i8 || py >= BOARD_HEIGHT as i8 {
                return false;
            }
            py < 0 || !self.is_occupied(px, py)
        })
    }

    /// Write a shape into the grid; minos above row 0 are dropped
    pub fn lock(&mut self, shape: &Shape, x: i8, y: i8, kind: PieceKind) {
        for (dx, dy) in shape.minos() {
            self.set(x + dx, y + dy, Some(Mino::Piece(kind)));
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= ROWS {
            return false;
        }
        let start = y * COLS;
        self.cells[start..start + COLS].iter().all(|cell| cell.is_some())
    }

    /// Clear all full rows and return the row indices that were cleared (sorted bottom to top)
    /// Uses a two-pointer algorithm with zero-allocation
    pub fn clear_full_rows(&mut self) -> ArrayVec<usize, ROWS> {
        let mut cleared_rows = ArrayVec::new();
        let mut write_y = ROWS;

        // Scan from bottom to top
        for read_y in (0..ROWS).rev() {
            if self.is_row_full(read_y) {
                cleared_rows.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * COLS;
                    self.cells
                        .copy_within(src_start..src_start + COLS, write_y * COLS);
                }
            }
        }

        // Fresh empty rows at the top
        for cell in &mut self.cells[..write_y * COLS] {
            *cell = None;
        }

        cleared_rows
    }

    /// True when no cell is occupied
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_none())
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell identifier at (x, y), `EMPTY` when out of bounds
    pub fn id_at(&self, x: i8, y: i8) -> u8 {
        match self.get(x, y) {
            Some(Some(mino)) => mino.id(),
            _ => EMPTY,
        }
    }

    pub fn write_u8_grid(&self, out: &mut IdGrid) {
        for (y, row) in out.iter_mut().enumerate() {
            for (x, slot) in row.iter_mut().enumerate() {
                *slot = self.cells[y * COLS + x].map_or(EMPTY, |m| m.id());
            }
        }
    }

    pub fn to_id_grid(&self) -> IdGrid {
        let mut grid = [[EMPTY; COLS]; ROWS];
        self.write_u8_grid(&mut grid);
        grid
    }

    /// Fill a whole row with the given mino (test fixtures and benches)
    pub fn fill_row(&mut self, y: i8, mino: Mino) {
        for x in 0..BOARD_WIDTH as i8 {
            self.set(x, y, Some(mino));
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
