//! Field module - decoding initial boards and reading quiz hints
//!
//! The compact board encodings puzzles are shared in are decoded by an
//! implementation of [`FieldDecoder`]; the engine only consumes the flat
//! cell-id array it produces. [`TextFieldDecoder`] is a plain row-text
//! decoder used by the binary and tests.

use thiserror::Error;

use crate::types::{PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Failure to turn an encoded field into a board
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldDecodeError {
    #[error("field row {row} has {len} cells, expected {expected}")]
    RowWidth {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("field has {rows} rows, the board holds at most {max}")]
    TooManyRows { rows: usize, max: usize },
    #[error("unrecognized cell character {ch:?} in row {row}")]
    UnknownChar { row: usize, ch: char },
    #[error("cell {index} has unknown identifier {id}")]
    UnknownCell { index: usize, id: u8 },
    #[error("field decoder rejected input: {0}")]
    Malformed(String),
}

/// Turns an encoded board string into a flat row-major cell-id array
pub trait FieldDecoder {
    fn decode(&self, encoded: &str) -> Result<Vec<u8>, FieldDecodeError>;
}

/// Decodes rows of 10 characters separated by `/` or newlines
///
/// `_`, `.` and space are empty, piece letters map to their ids, `G`/`X` is
/// filler and `N`/`#` the neutral marker. Rows are bottom-aligned.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFieldDecoder;

impl TextFieldDecoder {
    fn cell_id(ch: char) -> Option<u8> {
        match ch {
            '_' | '.' | ' ' => Some(0),
            'G' | 'g' | 'X' | 'x' => Some(8),
            'N' | 'n' | '#' => Some(9),
            other => PieceKind::from_char(other).map(|k| k.id()),
        }
    }
}

impl FieldDecoder for TextFieldDecoder {
    fn decode(&self, encoded: &str) -> Result<Vec<u8>, FieldDecodeError> {
        let width = BOARD_WIDTH as usize;
        let height = BOARD_HEIGHT as usize;

        let rows: Vec<&str> = encoded
            .split(|c: char| c == '/' || c == '\n')
            .map(|r| r.trim_end_matches('\r'))
            .filter(|r| !r.is_empty())
            .collect();

        if rows.len() > height {
            return Err(FieldDecodeError::TooManyRows {
                rows: rows.len(),
                max: height,
            });
        }

        let mut ids = vec![0u8; width * height];
        let top = height - rows.len();
        for (row, text) in rows.iter().enumerate() {
            let len = text.chars().count();
            if len != width {
                return Err(FieldDecodeError::RowWidth {
                    row,
                    len,
                    expected: width,
                });
            }
            for (x, ch) in text.chars().enumerate() {
                let id = Self::cell_id(ch).ok_or(FieldDecodeError::UnknownChar { row, ch })?;
                ids[(top + row) * width + x] = id;
            }
        }
        Ok(ids)
    }
}

/// Next-queue and hold inferred from a `#Q=[H](C)NEXT` quiz comment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizHint {
    /// Current piece followed by the remaining queue
    pub next: Option<String>,
    pub hold: Option<String>,
}

impl QuizHint {
    /// Parse a quiz comment; anything not matching the prefix yields no hints
    ///
    /// ```
    /// use nazotet_core::field::QuizHint;
    ///
    /// let hint = QuizHint::parse("#Q=[S](T)IOZ");
    /// assert_eq!(hint.next.as_deref(), Some("TIOZ"));
    /// assert_eq!(hint.hold.as_deref(), Some("S"));
    /// ```
    pub fn parse(comment: &str) -> Self {
        let quiz_letter = |c: char| matches!(c, 'I' | 'L' | 'O' | 'Z' | 'T' | 'J' | 'S');

        let Some(rest) = comment.strip_prefix("#Q=[") else {
            return Self::default();
        };
        let mut chars = rest.chars().peekable();

        let hold = match chars.peek() {
            Some(&c) if quiz_letter(c) => {
                chars.next();
                Some(c)
            }
            _ => None,
        };
        if chars.next() != Some(']') || chars.next() != Some('(') {
            return Self::default();
        }
        let current = match chars.next() {
            Some(c) if quiz_letter(c) => c,
            _ => return Self::default(),
        };
        if chars.next() != Some(')') {
            return Self::default();
        }

        let mut next = String::from(current);
        next.extend(chars.take_while(|&c| quiz_letter(c)));

        Self {
            next: Some(next),
            hold: hold.map(String::from),
        }
    }
}
