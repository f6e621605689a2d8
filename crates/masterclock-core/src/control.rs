// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Operator commands.
//!
//! Manual time entry tells the engine what the dial actually shows.
//! Colons are ignored and the remaining digits are read by count:
//!
//! | Digits | Meaning |
//! |--------|---------|
//! | 1-2 | `ss` |
//! | 3-4 | `mmss` (or `mss`) |
//!
//! so `1:5` is fifteen seconds, not one minute five.
//!
//! The engine keeps the dial position to the whole minute, so an entered
//! second only matters to [`TimeEntry::apply_to`] callers.

use crate::cycle::CycleTime;
use crate::error::TimeEntryError;
use crate::signal::Line;

const MAX_DIGITS: usize = 4;

/// A parsed time entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeEntry {
    /// Minute of the hour, if entered.
    pub minutes: Option<u8>,
    /// Second of the minute.
    pub seconds: u8,
}

impl TimeEntry {
    /// Parse `ss`, `mss` or `mmss`, with any number of `:` anywhere.
    pub fn parse(input: &str) -> Result<TimeEntry, TimeEntryError> {
        let mut digits = 0usize;
        let mut value = 0u32;
        for c in input.chars() {
            if c == ':' {
                continue;
            }
            let d = c.to_digit(10).ok_or(TimeEntryError::InvalidCharacter(c))?;
            digits += 1;
            if digits <= MAX_DIGITS {
                value = value * 10 + d;
            }
        }

        let (minutes, seconds) = match digits {
            0 => return Err(TimeEntryError::Empty),
            1..=2 => (None, value),
            3..=MAX_DIGITS => (Some(value / 100), value % 100),
            len => return Err(TimeEntryError::TooLong { len }),
        };

        if let Some(m) = minutes
            && m >= 60
        {
            return Err(TimeEntryError::OutOfRange {
                field: "minutes",
                value: m,
            });
        }
        if seconds >= 60 {
            return Err(TimeEntryError::OutOfRange {
                field: "seconds",
                value: seconds,
            });
        }

        Ok(TimeEntry {
            minutes: minutes.map(|m| m as u8),
            seconds: seconds as u8,
        })
    }

    /// `position` with this entry's minute (if any) and second, same hour.
    pub fn apply_to(self, position: CycleTime) -> CycleTime {
        let minute = self.minutes.map_or(position.minute(), u32::from);
        CycleTime::from_hms(position.hour(), minute, u32::from(self.seconds))
    }
}

/// A command from the console or another operator surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ManualCommand {
    /// One extra pulse on a line. Does not move the recorded position.
    ForcePulse(Line),
    /// One extra pulse on both A and B.
    ForceBoth,
    /// Start a manual sync session.
    TriggerSync,
    /// Flip the run override.
    ToggleRunOverride,
    /// Set the run override.
    SetRunOverride(bool),
    /// Record what the dial shows.
    EnterTime(TimeEntry),
}
