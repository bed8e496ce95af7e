//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the puzzle engine.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, remote adapter, presentation).
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 23 rows (indexed 0-22), of which the top 3 are hidden
//! - **Spawn row**: `HIDDEN_ROWS - 2`, partly above the visible field
//!
//! # Cell identifiers
//!
//! | id | meaning |
//! |----|---------|
//! | 0 | empty |
//! | 1-7 | I, L, O, Z, T, J, S |
//! | 8 | filler / garbage |
//! | 9 | neutral marker (presentation only) |
//!
//! # Examples
//!
//! ```
//! use nazotet_types::{PieceKind, Rotation, GameAction, BOARD_WIDTH, BOARD_HEIGHT};
//!
//! let parsed = PieceKind::from_char('t').unwrap();
//! assert_eq!(parsed, PieceKind::T);
//! assert_eq!(parsed.id(), 5);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 23);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (23 rows, hidden rows included)
pub const BOARD_HEIGHT: u8 = 23;

/// Rows at the top of the board used for spawning and overhang
pub const HIDDEN_ROWS: u8 = 3;

/// Number of cells an encoded field contributes to the board
pub const FIELD_CELLS: usize = 230;

/// Number of queued pieces a presentation layer draws as shapes
pub const NEXT_PREVIEW: usize = 7;

/// Cell identifier for an empty cell
pub const EMPTY: u8 = 0;

/// The seven tetromino piece kinds, ordered by cell identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    L,
    O,
    Z,
    T,
    J,
    S,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::L,
        PieceKind::O,
        PieceKind::Z,
        PieceKind::T,
        PieceKind::J,
        PieceKind::S,
    ];

    /// Parse a piece letter (case-insensitive)
    ///
    /// Filler (`G`) and "none" (`N`) are not spawnable and yield `None`.
    ///
    /// ```
    /// use nazotet_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('i'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('G'), None);
    /// assert_eq!(PieceKind::from_char('?'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(PieceKind::I),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'Z' => Some(PieceKind::Z),
            'T' => Some(PieceKind::T),
            'J' => Some(PieceKind::J),
            'S' => Some(PieceKind::S),
            _ => None,
        }
    }

    /// Parse a single-letter piece string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    /// Uppercase letter used in queue strings
    pub fn as_char(&self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::Z => 'Z',
            PieceKind::T => 'T',
            PieceKind::J => 'J',
            PieceKind::S => 'S',
        }
    }

    /// Cell identifier written into the board when this piece locks
    pub fn id(&self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::L => 2,
            PieceKind::O => 3,
            PieceKind::Z => 4,
            PieceKind::T => 5,
            PieceKind::J => 6,
            PieceKind::S => 7,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1..=7 => Some(Self::ALL[(id - 1) as usize]),
            _ => None,
        }
    }
}

/// Identity of a settled block on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mino {
    Piece(PieceKind),
    /// Non-rotating filler / garbage block
    Gray,
    /// Unknown-fill marker, only meaningful to presentation
    Neutral,
}

impl Mino {
    pub fn id(&self) -> u8 {
        match self {
            Mino::Piece(kind) => kind.id(),
            Mino::Gray => 8,
            Mino::Neutral => 9,
        }
    }

    /// Convert a cell identifier; `Ok(None)` is empty, `Err` an unknown id
    pub fn from_id(id: u8) -> Result<Option<Self>, u8> {
        match id {
            EMPTY => Ok(None),
            1..=7 => Ok(PieceKind::from_id(id).map(Mino::Piece)),
            8 => Ok(Some(Mino::Gray)),
            9 => Ok(Some(Mino::Neutral)),
            other => Err(other),
        }
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(Mino)`: Settled block
pub type Cell = Option<Mino>;

/// Orientation index of the falling piece
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    pub fn rotate_cw(&self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn rotate_ccw(&self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Orientation index (0-3)
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Build from any index, wrapping mod 4
    pub fn from_index(index: usize) -> Self {
        match index % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Commands accepted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down (no gravity timer exists)
    SoftDrop,
    /// Drop to the lowest valid row and lock
    HardDrop,
    RotateCw,
    RotateCcw,
    /// Swap the falling piece with the held slot
    Hold,
    Undo,
    Redo,
}

impl GameAction {
    /// Parse action from string (case-insensitive)
    ///
    /// ```
    /// use nazotet_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("UNDO"), Some(GameAction::Undo));
    /// assert_eq!(GameAction::from_str("pause"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "hold" => Some(GameAction::Hold),
            "undo" => Some(GameAction::Undo),
            "redo" => Some(GameAction::Redo),
            _ => None,
        }
    }

    /// Convert to camelCase string for the wire protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Hold => "hold",
            GameAction::Undo => "undo",
            GameAction::Redo => "redo",
        }
    }
}

/// T-Spin classification of a lock
///
/// - **None**: Not a T-spin
/// - **Mini**: 3+ corners filled, orientation pairing not satisfied
/// - **Full**: 3+ corners filled and either the final kick was used or the
///   orientation-specific corner pair is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TSpinKind {
    None,
    Mini,
    Full,
}

impl TSpinKind {
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            TSpinKind::None => None,
            TSpinKind::Mini => Some("mini"),
            TSpinKind::Full => Some("full"),
        }
    }
}

/// Outcome of the most recent lock (consumed by observers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub lines_cleared: u32,
    pub tspin: TSpinKind,
    /// Clear bucket credited by this lock, if any
    pub rule: Option<RuleKind>,
    /// Running combo after the lock; -1 means no active streak
    pub combo: i32,
    pub perfect_clear: bool,
}

/// Named clear-type counters a puzzle can set goals on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Tss,
    Tsd,
    Tst,
    MiniTss,
    MiniTsd,
    Single,
    Double,
    Triple,
    Quad,
    PerfectClear,
    Combo,
}

impl RuleKind {
    /// Fixed evaluation and display order
    pub const ALL: [RuleKind; 11] = [
        RuleKind::Tss,
        RuleKind::Tsd,
        RuleKind::Tst,
        RuleKind::MiniTss,
        RuleKind::MiniTsd,
        RuleKind::Single,
        RuleKind::Double,
        RuleKind::Triple,
        RuleKind::Quad,
        RuleKind::PerfectClear,
        RuleKind::Combo,
    ];

    /// Configuration label (exact match)
    pub fn label(&self) -> &'static str {
        match self {
            RuleKind::Tss => "TSS",
            RuleKind::Tsd => "TSD",
            RuleKind::Tst => "TST",
            RuleKind::MiniTss => "Mini TSS",
            RuleKind::MiniTsd => "Mini TSD",
            RuleKind::Single => "Single",
            RuleKind::Double => "Double",
            RuleKind::Triple => "Triple",
            RuleKind::Quad => "Quad",
            RuleKind::PerfectClear => "Perfect Clear",
            RuleKind::Combo => "Combo",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.label() == label)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}
