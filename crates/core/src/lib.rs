//! Core puzzle logic - pure, deterministic, and testable
//!
//! This crate contains the puzzle rules, state management and undo history.
//! It has no dependencies on rendering, networking or timers:
//!
//! - **Deterministic**: the queue is fixed input, nothing is random
//! - **Command driven**: every change comes from an explicit command
//! - **Forgiving**: illegal moves, rotations and holds are silent no-ops
//!
//! # Module Structure
//!
//! - [`board`]: 10x23 board with collision checks and line clearing
//! - [`pieces`]: shape matrices, rotation and the two kick tables
//! - [`queue`]: the fixed, pre-determined piece queue
//! - [`rules`]: clear-type counters, goals and the win condition
//! - [`history`]: linear undo/redo
//! - [`config`]: the puzzle document consumed by `reset`
//! - [`field`]: decoding the initial board and quiz-comment hints
//! - [`game_state`]: the engine tying everything together
//! - [`snapshot`]: read-only views for presentation
//!
//! # Example
//!
//! ```
//! use nazotet_core::{GameState, PuzzleConfig};
//! use nazotet_core::types::{GameAction, RuleKind};
//!
//! let config = PuzzleConfig::with_queue("IOTS").rule("Quad", 1);
//! let mut game = GameState::new(&config);
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::HardDrop);
//!
//! assert_eq!(game.queue().to_letters(), "TS");
//! assert_eq!(game.stat(RuleKind::Quad), 0);
//! assert!(game.can_undo());
//! ```

pub mod board;
pub mod config;
pub mod field;
pub mod game_state;
pub mod history;
pub mod pieces;
pub mod queue;
pub mod rules;
pub mod snapshot;

pub use nazotet_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use config::{ConfigError, PuzzleConfig};
pub use field::{FieldDecodeError, FieldDecoder, QuizHint, TextFieldDecoder};
pub use game_state::{GameState, SavedState, Tetromino};
pub use history::History;
pub use pieces::{spawn_shape, try_rotate, Shape};
pub use queue::PieceQueue;
pub use rules::{Goals, RuleProgress, Stats};
pub use snapshot::{ActiveSnapshot, GameSnapshot, NextPreview};
