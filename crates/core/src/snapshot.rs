//! Snapshot module - read-only copies of the engine state
//!
//! A `GameSnapshot` owns everything an observer needs (board, active piece,
//! queue, goal progress, history indicators) so it can be rendered or
//! serialized without holding the engine.

use arrayvec::ArrayVec;

use crate::board::{Board, IdGrid};
use crate::game_state::Tetromino;
use crate::pieces::Shape;
use crate::rules::{RuleProgress, RULE_COUNT};
use crate::types::{LockEvent, PieceKind, Rotation, NEXT_PREVIEW};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl ActiveSnapshot {
    /// Absolute board coordinates of the occupied cells
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape.minos().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }
}

impl From<Tetromino> for ActiveSnapshot {
    fn from(value: Tetromino) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            shape: value.shape,
            x: value.x,
            y: value.y,
        }
    }
}

/// Queue as presentation shows it: a few shapes, then the rest as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPreview {
    pub shown: ArrayVec<PieceKind, NEXT_PREVIEW>,
    pub overflow: String,
}

/// Read-only view of a game, detached from the engine that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub board: Board,
    pub active: Option<ActiveSnapshot>,
    pub ghost_y: Option<i8>,
    pub queue: Vec<PieceKind>,
    pub hold: Option<PieceKind>,
    pub hold_enabled: bool,
    pub rules: [RuleProgress; RULE_COUNT],
    pub combo: i32,
    pub game_over: bool,
    pub solved: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub last_event: Option<LockEvent>,
    pub author: Option<String>,
    pub notes: Vec<String>,
}

impl GameSnapshot {
    /// Placement check against this snapshot's own board
    pub fn is_placement_valid(&self, piece: &Tetromino) -> bool {
        piece.is_valid(&self.board)
    }

    pub fn board_rows(&self) -> IdGrid {
        self.board.to_id_grid()
    }

    pub fn next_preview(&self) -> NextPreview {
        let split = self.queue.len().min(NEXT_PREVIEW);
        NextPreview {
            shown: self.queue[..split].iter().copied().collect(),
            overflow: self.queue[split..].iter().map(|k| k.as_char()).collect(),
        }
    }

    /// Rows with a goal set, in fixed rule order
    pub fn tracked_rules(&self) -> impl Iterator<Item = &RuleProgress> + '_ {
        self.rules.iter().filter(|r| r.goal > 0)
    }

    pub fn playable(&self) -> bool {
        !self.game_over && self.active.is_some()
    }
}
