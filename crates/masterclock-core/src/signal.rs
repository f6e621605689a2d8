// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The impulse protocol:
//!
//! - line A is made at every minute boundary, and every other second from
//!   :10 to :50 of minute 59 (the end-of-hour correction train);
//! - line B is made at every minute boundary up to minute 49;
//! - line D, when fitted, is made at every minute boundary.
//!
//! Operator force requests for A and B are held here as counted
//! commands. Each evaluation consumes at most one request per line.

use crate::cycle::CycleTime;

/// A signal line of the impulse protocol.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Line {
    /// Minute line, also carries the end-of-hour correction train.
    A,
    /// Minute line for minutes 0 to 49.
    B,
    /// Optional plain minute line.
    D,
}

impl Line {
    /// Console letter for this line.
    pub const fn letter(self) -> char {
        match self {
            Line::A => 'A',
            Line::B => 'B',
            Line::D => 'D',
        }
    }
}

/// Desired level of every signal line. `true` is HIGH (contact made).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SignalLevels {
    /// Line A.
    pub a: bool,
    /// Line B.
    pub b: bool,
    /// Line D.
    pub d: bool,
}

impl SignalLevels {
    /// Every line low.
    pub const LOW: SignalLevels = SignalLevels {
        a: false,
        b: false,
        d: false,
    };

    /// A and B high, plus D when fitted.
    pub const fn all_high(line_d: bool) -> Self {
        SignalLevels {
            a: true,
            b: true,
            d: line_d,
        }
    }

    /// The catch-up pulse that moves the dial one minute.
    pub const fn minute_advance(line_d: bool) -> Self {
        Self::all_high(line_d)
    }

    /// Whether any line is high.
    pub const fn any(self) -> bool {
        self.a || self.b || self.d
    }

    /// Level of one line.
    pub const fn get(self, line: Line) -> bool {
        match line {
            Line::A => self.a,
            Line::B => self.b,
            Line::D => self.d,
        }
    }

    /// Set the level of one line.
    pub fn set(&mut self, line: Line, high: bool) {
        match line {
            Line::A => self.a = high,
            Line::B => self.b = high,
            Line::D => self.d = high,
        }
    }

    /// Lines high in either `self` or `other`.
    #[must_use]
    pub const fn union(self, other: SignalLevels) -> Self {
        SignalLevels {
            a: self.a || other.a,
            b: self.b || other.b,
            d: self.d || other.d,
        }
    }
}

/// Line A at time `t`.
pub const fn line_a(t: CycleTime) -> bool {
    let s = t.second();
    s == 0 || (t.minute() == 59 && s >= 10 && s <= 50 && s % 2 == 0)
}

/// Line B at time `t`.
pub const fn line_b(t: CycleTime) -> bool {
    t.second() == 0 && t.minute() <= 49
}

/// Line D at time `t`.
pub const fn line_d(t: CycleTime) -> bool {
    t.second() == 0
}

/// Pending one-shot force requests for lines A and B.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ForceRequests {
    a: u8,
    b: u8,
}

impl ForceRequests {
    /// Queue one forced pulse on `line`. Line D cannot be forced; returns
    /// `false` in that case.
    pub fn request(&mut self, line: Line) -> bool {
        match line {
            Line::A => self.a = self.a.saturating_add(1),
            Line::B => self.b = self.b.saturating_add(1),
            Line::D => return false,
        }
        true
    }

    /// Consume at most one pending request per line, returning the lines
    /// that were forced.
    pub fn take(&mut self) -> SignalLevels {
        let forced = SignalLevels {
            a: self.a > 0,
            b: self.b > 0,
            d: false,
        };
        self.a = self.a.saturating_sub(1);
        self.b = self.b.saturating_sub(1);
        forced
    }

    /// Requests still queued for `line`.
    pub const fn pending(&self, line: Line) -> u8 {
        match line {
            Line::A => self.a,
            Line::B => self.b,
            Line::D => 0,
        }
    }

    /// Whether nothing is queued.
    pub const fn is_empty(&self) -> bool {
        self.a == 0 && self.b == 0
    }
}

/// The protocol for a given line fit-out.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SignalPolicy {
    line_d: bool,
}

impl SignalPolicy {
    /// Policy with line D fitted or not.
    pub const fn new(line_d: bool) -> Self {
        SignalPolicy { line_d }
    }

    /// Whether line D is driven.
    pub const fn line_d(&self) -> bool {
        self.line_d
    }

    /// Levels dictated by the time of day alone.
    pub const fn levels_at(&self, t: CycleTime) -> SignalLevels {
        SignalLevels {
            a: line_a(t),
            b: line_b(t),
            d: self.line_d && line_d(t),
        }
    }

    /// Levels at `t` with one pending force per line applied and consumed.
    pub fn evaluate(&self, t: CycleTime, forces: &mut ForceRequests) -> SignalLevels {
        self.levels_at(t).union(forces.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(m: u32, s: u32) -> CycleTime {
        CycleTime::from_hms(3, m, s)
    }

    #[test]
    fn test_minute_boundary_raises_a_and_b() {
        let policy = SignalPolicy::new(false);
        let levels = policy.levels_at(t(12, 0));
        assert_eq!(
            levels,
            SignalLevels {
                a: true,
                b: true,
                d: false
            }
        );
    }

    #[test]
    fn test_b_silent_from_minute_fifty() {
        assert!(line_b(t(49, 0)));
        assert!(!line_b(t(50, 0)));
        assert!(!line_b(t(59, 0)));
        assert!(line_a(t(50, 0)));
    }

    #[test]
    fn test_end_of_hour_train() {
        let highs: Vec<u32> = (0..60).filter(|&s| line_a(t(59, s))).collect();
        let mut expected = vec![0];
        expected.extend((10..=50).step_by(2));
        assert_eq!(highs, expected);
        assert_eq!(highs.len(), 22);
    }

    #[test]
    fn test_no_train_outside_minute_59() {
        assert!(!line_a(t(58, 10)));
        assert!(!line_a(t(0, 20)));
    }

    #[test]
    fn test_line_d_only_when_fitted() {
        assert!(!SignalPolicy::new(false).levels_at(t(5, 0)).d);
        assert!(SignalPolicy::new(true).levels_at(t(5, 0)).d);
        assert!(!SignalPolicy::new(true).levels_at(t(59, 10)).d);
    }

    #[test]
    fn test_force_consumed_once() {
        let policy = SignalPolicy::new(false);
        let mut forces = ForceRequests::default();
        assert!(forces.request(Line::A));
        let first = policy.evaluate(t(10, 30), &mut forces);
        assert!(first.a);
        assert!(!first.b);
        let second = policy.evaluate(t(10, 31), &mut forces);
        assert_eq!(second, SignalLevels::LOW);
        assert!(forces.is_empty());
    }

    #[test]
    fn test_double_force_spans_two_evaluations() {
        let policy = SignalPolicy::new(false);
        let mut forces = ForceRequests::default();
        forces.request(Line::B);
        forces.request(Line::B);
        assert_eq!(forces.pending(Line::B), 2);
        assert!(policy.evaluate(t(1, 1), &mut forces).b);
        assert!(policy.evaluate(t(1, 2), &mut forces).b);
        assert!(!policy.evaluate(t(1, 3), &mut forces).b);
    }

    #[test]
    fn test_line_d_cannot_be_forced() {
        let mut forces = ForceRequests::default();
        assert!(!forces.request(Line::D));
        assert!(forces.is_empty());
    }

    #[test]
    fn test_levels_helpers() {
        let mut levels = SignalLevels::LOW;
        assert!(!levels.any());
        levels.set(Line::D, true);
        assert!(levels.any());
        assert!(levels.get(Line::D));
        assert_eq!(SignalLevels::minute_advance(false), SignalLevels::all_high(false));
        assert_eq!(Line::B.letter(), 'B');
    }
}
