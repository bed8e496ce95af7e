//! Pieces module - Tetromino shape matrices and wall kick resolution
//!
//! Shapes are stored as square matrices (4x4 for I, 2x2 for O, 3x3 for the rest)
//! and rotated by transposition on every turn instead of being looked up per
//! orientation. Kick offsets use an upward-positive y axis, so they are
//! subtracted from the board row when applied.

use crate::types::{PieceKind, Rotation};

/// Largest shape matrix edge (the I piece)
pub const MAX_SHAPE: usize = 4;

/// Offset of a single mino relative to the top-left of the bounding box
pub type MinoOffset = (i8, i8);

/// Square occupancy matrix of a piece at one orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    size: u8,
    /// Row-major, `cells[y][x]`; only the top-left `size`x`size` block is used
    cells: [[bool; MAX_SHAPE]; MAX_SHAPE],
}

impl Shape {
    const fn from_rows(size: u8, rows: [[u8; MAX_SHAPE]; MAX_SHAPE]) -> Self {
        let mut cells = [[false; MAX_SHAPE]; MAX_SHAPE];
        let mut y = 0;
        while y < MAX_SHAPE {
            let mut x = 0;
            while x < MAX_SHAPE {
                cells[y][x] = rows[y][x] != 0;
                x += 1;
            }
            y += 1;
        }
        Self { size, cells }
    }

    /// Matrix edge length (also the spawn width)
    pub fn size(&self) -> usize {
        self.size as usize
    }

    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.size() && y < self.size() && self.cells[y][x]
    }

    /// Occupied cells as `(x, y)` offsets in row-major order
    pub fn minos(&self) -> impl Iterator<Item = MinoOffset> + '_ {
        let n = self.size();
        (0..n).flat_map(move |y| {
            (0..n)
                .filter(move |&x| self.cells[y][x])
                .map(move |x| (x as i8, y as i8))
        })
    }

    /// Rotate the matrix a quarter turn
    ///
    /// Clockwise: `new[x][n-1-y] = old[y][x]`.
    /// Counter-clockwise: `new[n-1-x][y] = old[y][x]`.
    pub fn rotated(&self, clockwise: bool) -> Self {
        let n = self.size();
        let mut cells = [[false; MAX_SHAPE]; MAX_SHAPE];
        for y in 0..n {
            for x in 0..n {
                if clockwise {
                    cells[x][n - 1 - y] = self.cells[y][x];
                } else {
                    cells[n - 1 - x][y] = self.cells[y][x];
                }
            }
        }
        Self {
            size: self.size,
            cells,
        }
    }
}

const I_SHAPE: Shape = Shape::from_rows(
    4,
    [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
);
const L_SHAPE: Shape = Shape::from_rows(
    3,
    [[0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);
const O_SHAPE: Shape = Shape::from_rows(
    2,
    [[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);
const Z_SHAPE: Shape = Shape::from_rows(
    3,
    [[1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);
const T_SHAPE: Shape = Shape::from_rows(
    3,
    [[0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);
const J_SHAPE: Shape = Shape::from_rows(
    3,
    [[1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);
const S_SHAPE: Shape = Shape::from_rows(
    3,
    [[0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
);

/// Get the spawn-orientation shape matrix for a piece kind
pub fn spawn_shape(kind: PieceKind) -> Shape {
    match kind {
        PieceKind::I => I_SHAPE,
        PieceKind::L => L_SHAPE,
        PieceKind::O => O_SHAPE,
        PieceKind::Z => Z_SHAPE,
        PieceKind::T => T_SHAPE,
        PieceKind::J => J_SHAPE,
        PieceKind::S => S_SHAPE,
    }
}

/// Four kick offsets per row; rows indexed `from*2` (CW) or `to*2+1` (CCW)
pub type KickTable = [[(i8, i8); 4]; 8];

/// Shared by L, O, Z, T, J, S
const JLSTZ_KICKS: KickTable = [
    [(-1, 0), (-1, 1), (0, -2), (-1, -2)],
    [(1, 0), (1, -1), (0, 2), (1, 2)],
    [(1, 0), (1, -1), (0, 2), (1, 2)],
    [(-1, 0), (-1, 1), (0, -2), (-1, -2)],
    [(1, 0), (1, 1), (0, -2), (1, -2)],
    [(-1, 0), (-1, -1), (0, 2), (-1, 2)],
    [(-1, 0), (-1, -1), (0, 2), (-1, 2)],
    [(1, 0), (1, 1), (0, -2), (1, -2)],
];

const I_KICKS: KickTable = [
    [(-2, 0), (1, 0), (-2, 1), (1, -2)],
    [(2, 0), (-1, 0), (2, -1), (-1, 2)],
    [(-1, 0), (2, 0), (-1, -2), (2, 1)],
    [(1, 0), (-2, 0), (1, 2), (-2, -1)],
    [(2, 0), (-1, 0), (2, -1), (-1, 2)],
    [(-2, 0), (1, 0), (-2, 1), (1, -2)],
    [(1, 0), (-2, 0), (1, 2), (-2, -1)],
    [(-2, 0), (1, 0), (-2, -2), (2, 1)],
];

/// Get kick table for a piece kind
pub fn get_kick_table(kind: PieceKind) -> &'static KickTable {
    match kind {
        PieceKind::I => &I_KICKS,
        _ => &JLSTZ_KICKS,
    }
}

/// Row of the kick table used for a rotation transition
pub fn kick_row(from: Rotation, clockwise: bool) -> usize {
    if clockwise {
        from.index() * 2
    } else {
        from.rotate_ccw().index() * 2 + 1
    }
}

/// All five offsets tried for a rotation, `(0, 0)` first
pub fn kick_candidates(kind: PieceKind, from: Rotation, clockwise: bool) -> [(i8, i8); 5] {
    let row = &get_kick_table(kind)[kick_row(from, clockwise)];
    [(0, 0), row[0], row[1], row[2], row[3]]
}

/// Successful rotation: the new shape and placement plus which candidate fit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationResult {
    pub shape: Shape,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
    /// Index into the five-element candidate list (0 = no kick)
    pub kick_index: usize,
}

/// Try to rotate a piece with wall kicks
///
/// Returns `None` if every candidate collides; nothing is mutated either way.
pub fn try_rotate(
    kind: PieceKind,
    shape: &Shape,
    rotation: Rotation,
    x: i8,
    y: i8,
    clockwise: bool,
    is_valid: impl Fn(&Shape, i8, i8) -> bool,
) -> Option<RotationResult> {
    let new_shape = shape.rotated(clockwise);
    let new_rotation = if clockwise {
        rotation.rotate_cw()
    } else {
        rotation.rotate_ccw()
    };

    kick_candidates(kind, rotation, clockwise)
        .iter()
        .enumerate()
        .find_map(|(kick_index, &(dx, dy))| {
            let nx = x.checked_add(dx)?;
            let ny = y.checked_sub(dy)?;
            is_valid(&new_shape, nx, ny).then_some(RotationResult {
                shape: new_shape,
                rotation: new_rotation,
                x: nx,
                y: ny,
                kick_index,
            })
        })
}
