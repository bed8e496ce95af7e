//! Queue module - the fixed, pre-determined piece sequence
//!
//! A puzzle supplies its whole queue up front. Pieces are drawn strictly
//! from the front and the queue is never refilled or reshuffled.

use std::collections::VecDeque;

use crate::types::PieceKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PieceQueue {
    pieces: VecDeque<PieceKind>,
}

impl PieceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a queue string, skipping anything that is not a spawnable letter
    ///
    /// ```
    /// use nazotet_core::PieceQueue;
    /// use nazotet_core::types::PieceKind;
    ///
    /// let queue = PieceQueue::parse("t-s g?i");
    /// assert_eq!(queue.to_vec(), vec![PieceKind::T, PieceKind::S, PieceKind::I]);
    /// ```
    pub fn parse(s: &str) -> Self {
        s.chars().filter_map(PieceKind::from_char).collect()
    }

    /// Remove and return the front piece
    pub fn draw(&mut self) -> Option<PieceKind> {
        self.pieces.pop_front()
    }

    pub fn peek(&self) -> Option<PieceKind> {
        self.pieces.front().copied()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.pieces.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<PieceKind> {
        self.iter().collect()
    }

    /// Queue as an uppercase letter string
    pub fn to_letters(&self) -> String {
        self.iter().map(|k| k.as_char()).collect()
    }
}

impl FromIterator<PieceKind> for PieceQueue {
    fn from_iter<T: IntoIterator<Item = PieceKind>>(iter: T) -> Self {
        Self {
            pieces: iter.into_iter().collect(),
        }
    }
}
