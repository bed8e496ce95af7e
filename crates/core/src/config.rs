//! Config module - the puzzle description consumed by `reset`
//!
//! A puzzle is a JSON document:
//!
//! ```json
//! {
//!   "field": "T_________/GGGGGGG___",
//!   "next": "TIOS",
//!   "hold": "",
//!   "holdEnabled": true,
//!   "rules": [["TSD", 1], ["Perfect Clear", "1"]],
//!   "author": "someone",
//!   "notes": ["no soft drop"],
//!   "comment": "#Q=[](T)IOS"
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field::QuizHint;
use crate::queue::PieceQueue;
use crate::rules::Goals;
use crate::types::PieceKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid puzzle document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Goal value as written in the document
///
/// Anything that is not a number or a string is kept as-is and reads as 0,
/// which drops that goal only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RuleValue {
    /// Integer value; fractions truncate toward zero, strings read their
    /// leading integer, anything else is 0
    pub fn as_i64(&self) -> i64 {
        match self {
            RuleValue::Int(v) => *v,
            RuleValue::Float(v) if v.is_finite() => v.trunc() as i64,
            RuleValue::Float(_) => 0,
            RuleValue::Text(s) => leading_int(s),
            RuleValue::Other(_) => 0,
        }
    }
}

fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|v| sign * v).unwrap_or(0)
}

/// One `[label, value]` goal pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry(pub String, pub RuleValue);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleConfig {
    /// Encoded initial board; absent means empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default)]
    pub next: String,
    #[serde(default)]
    pub hold: String,
    #[serde(default = "default_hold_enabled")]
    pub hold_enabled: bool,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Free-text rule lines shown next to the goal table
    #[serde(default)]
    pub notes: Vec<String>,
    /// Quiz comment the queue and hold can be inferred from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn default_hold_enabled() -> bool {
    true
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            field: None,
            next: String::new(),
            hold: String::new(),
            hold_enabled: true,
            rules: Vec::new(),
            author: None,
            notes: Vec::new(),
            comment: None,
        }
    }
}

impl PuzzleConfig {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Convenience constructor used by tests and benches
    pub fn with_queue(next: &str) -> Self {
        Self {
            next: next.to_string(),
            ..Self::default()
        }
    }

    pub fn rule(mut self, label: &str, value: i64) -> Self {
        self.rules
            .push(RuleEntry(label.to_string(), RuleValue::Int(value)));
        self
    }

    pub fn queue(&self) -> PieceQueue {
        PieceQueue::parse(&self.next)
    }

    /// Initial hold piece: the whole string must name one piece, and hold
    /// must be enabled
    pub fn hold_piece(&self) -> Option<PieceKind> {
        if !self.hold_enabled {
            return None;
        }
        PieceKind::from_str(&self.hold)
    }

    pub fn goals(&self) -> Goals {
        Goals::from_pairs(self.rules.iter().map(|r| (r.0.as_str(), r.1.as_i64())))
    }

    /// Fill an empty queue or hold from the quiz comment
    pub fn with_hints(mut self) -> Self {
        let Some(comment) = self.comment.as_deref() else {
            return self;
        };
        let hint = QuizHint::parse(comment);
        if self.next.trim().is_empty() {
            if let Some(next) = hint.next {
                self.next = next;
            }
        }
        if self.hold_enabled && self.hold.trim().is_empty() {
            if let Some(hold) = hint.hold {
                self.hold = hold;
            }
        }
        self
    }
}
