//! Game state module - the puzzle engine
//!
//! This module ties together the board, the fixed queue, hold, goal counters
//! and the undo/redo history. There is no gravity or timer: every change is
//! driven by an explicit command, and every command either commits fully or
//! leaves the state untouched.

use crate::board::Board;
use crate::config::PuzzleConfig;
use crate::field::{FieldDecoder, TextFieldDecoder};
use crate::history::History;
use crate::pieces::{self, Shape};
use crate::queue::PieceQueue;
use crate::rules::{self, Goals, Stats};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::*;

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub rotation: Rotation,
    /// Shape matrix at the current rotation
    pub shape: Shape,
    /// Top-left of the bounding box in board coordinates
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// Create a new tetromino at spawn position
    ///
    /// Horizontally centered, with the top of the box at `HIDDEN_ROWS - 2`.
    pub fn new(kind: PieceKind) -> Self {
        let shape = pieces::spawn_shape(kind);
        let width = shape.size() as i8;
        Self {
            kind,
            rotation: Rotation::North,
            shape,
            x: (BOARD_WIDTH as i8) / 2 - (width + 1) / 2,
            y: HIDDEN_ROWS as i8 - 2,
        }
    }

    /// Copy of this piece moved by (dx, dy); `None` if a coordinate overflows
    pub fn shifted(&self, dx: i8, dy: i8) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
            ..*self
        })
    }

    /// Absolute board coordinates of the occupied cells
    pub fn minos(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape.minos().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    pub fn is_valid(&self, board: &Board) -> bool {
        board.is_placement_valid(&self.shape, self.x, self.y)
    }

    /// Lowest row this piece reaches when dropped straight down
    pub fn landing_y(&self, board: &Board) -> i8 {
        let mut probe = *self;
        while probe.is_valid(board) {
            probe.y += 1;
        }
        probe.y - 1
    }
}

/// Everything an undo or redo restores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedState {
    pub board: Board,
    pub active: Option<Tetromino>,
    pub queue: PieceQueue,
    pub hold: Option<PieceKind>,
    pub stats: Stats,
    pub combo: i32,
}

/// Complete puzzle state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    active: Option<Tetromino>,
    queue: PieceQueue,
    hold: Option<PieceKind>,
    hold_enabled: bool,
    goals: Goals,
    stats: Stats,
    /// Consecutive clearing locks minus one; -1 when no streak is running
    combo: i32,
    game_over: bool,
    solved: bool,
    last_move_was_rotation: bool,
    /// Index into the five rotation candidates of the last successful rotation
    last_kick_index: Option<usize>,
    history: History<SavedState>,
    /// Last lock event (consumed by observers).
    last_event: Option<LockEvent>,
    author: Option<String>,
    notes: Vec<String>,
}

impl GameState {
    /// Create a game from a puzzle, decoding its field as row text
    pub fn new(config: &PuzzleConfig) -> Self {
        let mut state = Self::empty();
        state.reset(config);
        state
    }

    fn empty() -> Self {
        Self {
            board: Board::new(),
            active: None,
            queue: PieceQueue::new(),
            hold: None,
            hold_enabled: true,
            goals: Goals::default(),
            stats: Stats::default(),
            combo: -1,
            game_over: false,
            solved: false,
            last_move_was_rotation: false,
            last_kick_index: None,
            history: History::new(),
            last_event: None,
            author: None,
            notes: Vec::new(),
        }
    }

    pub fn reset(&mut self, config: &PuzzleConfig) {
        self.reset_with_decoder(config, &TextFieldDecoder);
    }

    /// Reset from a puzzle, decoding its field with `decoder`
    ///
    /// A field that fails to decode is reported on stderr and replaced by an
    /// empty board; the puzzle stays playable.
    pub fn reset_with_decoder<D: FieldDecoder + ?Sized>(
        &mut self,
        config: &PuzzleConfig,
        decoder: &D,
    ) {
        let board = match config.field.as_deref() {
            None => Board::new(),
            Some(encoded) => match decoder
                .decode(encoded)
                .and_then(|ids| Board::from_flat_ids(&ids))
            {
                Ok(board) => board,
                Err(e) => {
                    eprintln!("[Puzzle] warning: field decode failed ({e}); using empty board");
                    Board::new()
                }
            },
        };
        self.reset_with_board(config, board);
    }

    /// Reset from a puzzle with an already-built initial board
    pub fn reset_with_board(&mut self, config: &PuzzleConfig, board: Board) {
        let config = config.clone().with_hints();

        self.board = board;
        self.active = None;
        self.queue = config.queue();
        self.hold_enabled = config.hold_enabled;
        self.hold = config.hold_piece();
        self.goals = config.goals();
        self.stats = Stats::default();
        self.combo = -1;
        self.game_over = false;
        self.solved = false;
        self.clear_rotation_flags();
        self.last_event = None;
        self.author = config.author;
        self.notes = config.notes;

        // The first piece comes from the queue only; hold is never promoted here
        self.history.clear();
        self.active = self.queue.draw().map(Tetromino::new);
        let spawned = self.active.is_some();
        self.save_state();
        if !spawned {
            self.game_over = true;
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn queue(&self) -> &PieceQueue {
        &self.queue
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn hold_enabled(&self) -> bool {
        self.hold_enabled
    }

    pub fn goals(&self) -> &Goals {
        &self.goals
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn stat(&self, kind: RuleKind) -> u32 {
        self.stats.get(kind)
    }

    pub fn combo(&self) -> i32 {
        self.combo
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn solved(&self) -> bool {
        self.solved
    }

    pub fn last_move_was_rotation(&self) -> bool {
        self.last_move_was_rotation
    }

    pub fn last_kick_index(&self) -> Option<usize> {
        self.last_kick_index
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn last_event(&self) -> Option<LockEvent> {
        self.last_event
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    /// Check a piece against the current board
    pub fn is_placement_valid(&self, piece: &Tetromino) -> bool {
        piece.is_valid(&self.board)
    }

    /// Bring the next piece into play: queue first, then the held piece
    fn spawn_next(&mut self) -> bool {
        let kind = match self.queue.draw() {
            Some(kind) => Some(kind),
            None => self.hold.take(),
        };
        self.active = kind.map(Tetromino::new);
        self.active.is_some()
    }

    fn clear_rotation_flags(&mut self) {
        self.last_move_was_rotation = false;
        self.last_kick_index = None;
    }

    /// Try to move the active piece
    ///
    /// A rejected move changes nothing. An accepted one forfeits any pending
    /// T-spin credit.
    pub fn try_move(&mut self, dx: i8, dy: i8) -> bool {
        if self.game_over {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let Some(moved) = active.shifted(dx, dy) else {
            return false;
        };
        if !moved.is_valid(&self.board) {
            return false;
        }
        self.active = Some(moved);
        self.clear_rotation_flags();
        true
    }

    /// Try to rotate the active piece, searching the kick candidates in order
    pub fn try_rotate(&mut self, clockwise: bool) -> bool {
        if self.game_over {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let board = &self.board;
        let result = pieces::try_rotate(
            active.kind,
            &active.shape,
            active.rotation,
            active.x,
            active.y,
            clockwise,
            |shape, x, y| board.is_placement_valid(shape, x, y),
        );

        let Some(result) = result else {
            return false;
        };
        self.active = Some(Tetromino {
            kind: active.kind,
            rotation: result.rotation,
            shape: result.shape,
            x: result.x,
            y: result.y,
        });
        self.last_move_was_rotation = true;
        self.last_kick_index = Some(result.kick_index);
        true
    }

    /// Drop the active piece to its landing row and lock it
    pub fn hard_drop(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        self.active = Some(Tetromino {
            y: active.landing_y(&self.board),
            ..active
        });
        self.lock_piece();
        true
    }

    /// Swap the falling piece with the held slot
    pub fn hold(&mut self) -> bool {
        if self.game_over || !self.hold_enabled {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let incoming = match self.hold {
            Some(kind) => kind,
            None => match self.queue.draw() {
                Some(kind) => kind,
                None => return false,
            },
        };

        self.hold = Some(active.kind);
        self.active = Some(Tetromino::new(incoming));
        self.clear_rotation_flags();
        self.save_state();
        true
    }

    /// Lock the active piece, clear rows, update goals and bring in the next piece
    pub fn lock_piece(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        // Corners are read before the piece itself lands on the board
        let tspin = self.t_spin_kind(&piece);

        self.board.lock(&piece.shape, piece.x, piece.y, piece.kind);
        let lines_cleared = self.board.clear_full_rows().len();

        let mut rule = None;
        let mut perfect_clear = false;
        if lines_cleared > 0 {
            self.combo += 1;
            rule = rules::clear_rule(tspin, lines_cleared);
            if let Some(rule) = rule {
                self.stats.increment(rule);
            }
            if self.combo > 0 {
                self.stats.raise_to(RuleKind::Combo, self.combo as u32);
            }
            if self.board.is_empty() {
                perfect_clear = true;
                self.stats.increment(RuleKind::PerfectClear);
            }
        } else {
            self.combo = -1;
        }

        self.clear_rotation_flags();
        self.last_event = Some(LockEvent {
            lines_cleared: lines_cleared as u32,
            tspin,
            rule,
            combo: self.combo,
            perfect_clear,
        });

        if self.goals.is_satisfied_by(&self.stats) {
            self.solved = true;
            self.game_over = true;
            return;
        }

        let spawned = self.spawn_next();
        self.save_state();
        if !spawned {
            self.game_over = true;
        }
    }

    /// Classify a lock as a T-spin from the four corners around the T's center
    fn t_spin_kind(&self, piece: &Tetromino) -> TSpinKind {
        if piece.kind != PieceKind::T || !self.last_move_was_rotation {
            return TSpinKind::None;
        }

        let (cx, cy) = (piece.x + 1, piece.y + 1);
        // Outside the board counts as filled, including above the top row
        let filled = |x: i8, y: i8| !self.board.is_valid(x, y);
        let a = filled(cx - 1, cy - 1);
        let b = filled(cx + 1, cy - 1);
        let c = filled(cx - 1, cy + 1);
        let d = filled(cx + 1, cy + 1);

        let count = [a, b, c, d].iter().filter(|&&f| f).count();
        if count < 3 {
            return TSpinKind::None;
        }
        if self.last_kick_index == Some(4) {
            return TSpinKind::Full;
        }

        let facing_pair = match piece.rotation {
            Rotation::North => a && b,
            Rotation::East => b && d,
            Rotation::South => c && d,
            Rotation::West => a && c,
        };
        if facing_pair {
            TSpinKind::Full
        } else {
            TSpinKind::Mini
        }
    }

    /// Record the current state after the cursor; skipped once the game ended
    fn save_state(&mut self) {
        if self.game_over {
            return;
        }
        self.history.push(SavedState {
            board: self.board.clone(),
            active: self.active,
            queue: self.queue.clone(),
            hold: self.hold,
            stats: self.stats,
            combo: self.combo,
        });
    }

    fn restore(&mut self, saved: SavedState) {
        self.board = saved.board;
        self.active = saved.active;
        self.queue = saved.queue;
        self.hold = saved.hold;
        self.stats = saved.stats;
        self.combo = saved.combo;
        self.game_over = false;
        self.solved = false;
        self.clear_rotation_flags();
        self.last_event = None;
    }

    /// Step back one history entry; also reopens a finished puzzle
    pub fn undo(&mut self) -> bool {
        match self.history.undo().cloned() {
            Some(saved) => {
                self.restore(saved);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo().cloned() {
            Some(saved) => {
                self.restore(saved);
                true
            }
            None => false,
        }
    }

    /// Calculate the ghost piece Y position (where piece would land)
    pub fn ghost_y(&self) -> Option<i8> {
        self.active.map(|piece| piece.landing_y(&self.board))
    }

    /// Apply a game action
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.try_move(-1, 0),
            GameAction::MoveRight => self.try_move(1, 0),
            GameAction::SoftDrop => self.try_move(0, 1),
            GameAction::HardDrop => self.hard_drop(),
            GameAction::RotateCw => self.try_rotate(true),
            GameAction::RotateCcw => self.try_rotate(false),
            GameAction::Hold => self.hold(),
            GameAction::Undo => self.undo(),
            GameAction::Redo => self.redo(),
        }
    }

    /// Read-only copy of everything presentation needs
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.clone(),
            active: self.active.map(ActiveSnapshot::from),
            ghost_y: self.ghost_y(),
            queue: self.queue.to_vec(),
            hold: self.hold,
            hold_enabled: self.hold_enabled,
            rules: rules::progress(&self.goals, &self.stats),
            combo: self.combo,
            game_over: self.game_over,
            solved: self.solved,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            last_event: self.last_event,
            author: self.author.clone(),
            notes: self.notes.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_active(&mut self, piece: Tetromino) {
        self.active = Some(piece);
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&PuzzleConfig::default())
    }
}
