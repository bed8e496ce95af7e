//! Rules module - clear-type counters and puzzle goals
//!
//! Each lock lands in at most one clear bucket: a T-spin clear counts toward
//! its T-spin rule only, never toward the plain line-count rule as well.
//! Combo and perfect clears are tracked separately by the engine.

use crate::types::{RuleKind, TSpinKind};

/// Number of goal counters
pub const RULE_COUNT: usize = RuleKind::ALL.len();

/// Live clear counters, indexed by `RuleKind`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Stats {
    values: [u32; RULE_COUNT],
}

impl Stats {
    pub fn get(&self, kind: RuleKind) -> u32 {
        self.values[kind.index()]
    }

    pub fn increment(&mut self, kind: RuleKind) {
        let v = &mut self.values[kind.index()];
        *v = v.saturating_add(1);
    }

    /// Raise a counter to `value` if it is higher (running maximum)
    pub fn raise_to(&mut self, kind: RuleKind, value: u32) {
        let v = &mut self.values[kind.index()];
        *v = (*v).max(value);
    }
}

/// Goal values set once at reset; zero means "not tracked"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Goals {
    values: [u32; RULE_COUNT],
}

impl Goals {
    /// Build goals from `(label, value)` pairs
    ///
    /// Unknown labels and non-positive values are ignored.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        let mut goals = Self::default();
        for (label, value) in pairs {
            let Some(kind) = RuleKind::from_label(label) else {
                continue;
            };
            if value > 0 {
                goals.values[kind.index()] = u32::try_from(value).unwrap_or(u32::MAX);
            }
        }
        goals
    }

    pub fn get(&self, kind: RuleKind) -> u32 {
        self.values[kind.index()]
    }

    pub fn set(&mut self, kind: RuleKind, goal: u32) {
        self.values[kind.index()] = goal;
    }

    pub fn is_tracked(&self, kind: RuleKind) -> bool {
        self.get(kind) > 0
    }

    /// Win condition
    ///
    /// A puzzle without any tracked rule never solves. Otherwise every
    /// tracked rule needs its live counter at or above the goal.
    pub fn is_satisfied_by(&self, stats: &Stats) -> bool {
        let any_tracked = RuleKind::ALL.iter().any(|&k| self.is_tracked(k));
        any_tracked
            && RuleKind::ALL
                .iter()
                .all(|&k| !self.is_tracked(k) || stats.get(k) >= self.get(k))
    }
}

/// Bucket a lock falls into, if any
pub fn clear_rule(tspin: TSpinKind, lines: usize) -> Option<RuleKind> {
    match (tspin, lines) {
        (_, 0) => None,
        (TSpinKind::Full, 1) => Some(RuleKind::Tss),
        (TSpinKind::Full, 2) => Some(RuleKind::Tsd),
        (TSpinKind::Full, 3) => Some(RuleKind::Tst),
        (TSpinKind::Mini, 1) => Some(RuleKind::MiniTss),
        (TSpinKind::Mini, 2) => Some(RuleKind::MiniTsd),
        (TSpinKind::None, 1) => Some(RuleKind::Single),
        (TSpinKind::None, 2) => Some(RuleKind::Double),
        (TSpinKind::None, 3) => Some(RuleKind::Triple),
        (TSpinKind::None, 4) => Some(RuleKind::Quad),
        _ => None,
    }
}

/// One row of the goal table as shown to presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleProgress {
    pub kind: RuleKind,
    pub value: u32,
    pub goal: u32,
}

impl RuleProgress {
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn is_met(&self) -> bool {
        self.goal == 0 || self.value >= self.goal
    }
}

/// Progress rows in fixed rule order
pub fn progress(goals: &Goals, stats: &Stats) -> [RuleProgress; RULE_COUNT] {
    RuleKind::ALL.map(|kind| RuleProgress {
        kind,
        value: stats.get(kind),
        goal: goals.get(kind),
    })
}
