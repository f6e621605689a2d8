// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Time of day on a twelve-hour dial, in whole seconds.

use core::fmt;

/// Length of one dial revolution: twelve hours.
pub const CYCLE_SECONDS: u32 = 12 * 60 * 60;

/// Seconds in one minute.
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Seconds in one hour.
pub const SECONDS_PER_HOUR: u32 = 60 * 60;

/// A position on the dial: seconds in `[0, CYCLE_SECONDS)`.
///
/// Used both for the authoritative time of day and for the position the
/// driven clock currently shows.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CycleTime(u32);

impl CycleTime {
    /// 12:00:00.
    pub const TWELVE: CycleTime = CycleTime(0);

    /// Reduce `seconds` onto the dial.
    pub const fn new(seconds: u32) -> Self {
        CycleTime(seconds % CYCLE_SECONDS)
    }

    /// Build from hours, minutes and seconds. Hours past eleven wrap.
    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        CycleTime::new(
            (hours % 12) * SECONDS_PER_HOUR + (minutes % 60) * SECONDS_PER_MINUTE + seconds % 60,
        )
    }

    /// Reduce a signed second count (e.g. seconds of a Unix day) onto the dial.
    pub const fn from_signed(seconds: i64) -> Self {
        CycleTime(seconds.rem_euclid(CYCLE_SECONDS as i64) as u32)
    }

    /// Seconds since 12:00:00.
    pub const fn seconds(self) -> u32 {
        self.0
    }

    /// Hour on the dial, `0..12`.
    pub const fn hour(self) -> u32 {
        self.0 / SECONDS_PER_HOUR
    }

    /// Minute of the hour, `0..60`.
    pub const fn minute(self) -> u32 {
        (self.0 / SECONDS_PER_MINUTE) % 60
    }

    /// Second of the minute, `0..60`.
    pub const fn second(self) -> u32 {
        self.0 % SECONDS_PER_MINUTE
    }

    /// This time with the seconds dropped.
    pub const fn whole_minute(self) -> Self {
        CycleTime(self.0 - self.second())
    }

    /// One minute later, wrapping at twelve.
    pub const fn next_minute(self) -> Self {
        self.plus_seconds(SECONDS_PER_MINUTE)
    }

    /// `seconds` later, wrapping at twelve.
    pub const fn plus_seconds(self, seconds: u32) -> Self {
        CycleTime((self.0 + seconds % CYCLE_SECONDS) % CYCLE_SECONDS)
    }

    /// Seconds to move forward from `earlier` to reach `self`, in `[0, CYCLE_SECONDS)`.
    pub const fn forward_from(self, earlier: CycleTime) -> u32 {
        (CYCLE_SECONDS + self.0 - earlier.0) % CYCLE_SECONDS
    }
}

impl fmt::Display for CycleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}
