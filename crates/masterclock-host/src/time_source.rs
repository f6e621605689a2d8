// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Authoritative time from the system clock plus the last SNTP correction.

use chrono::{DateTime, FixedOffset, Local, TimeDelta, Utc};
use masterclock_core::CycleTime;
use masterclock_core::sync::SyncTimestamp;
use masterclock_core::traits::TimeSource;
use tracing::{info, warn};

/// Zone the dial shows.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Zone {
    /// The system local zone, following its daylight-saving rules.
    Local,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

impl Zone {
    /// Offset in effect at `utc`.
    pub fn offset_at(&self, utc: DateTime<Utc>) -> FixedOffset {
        match self {
            Zone::Local => *utc.with_timezone(&Local).offset(),
            Zone::Fixed(offset) => *offset,
        }
    }
}

/// A [`TimeSource`] reading the system clock, corrected by each applied
/// sample.
#[derive(Debug)]
pub struct SystemTimeSource {
    zone: Zone,
    clock: fn() -> DateTime<Utc>,
    correction: TimeDelta,
    last_update: Option<DateTime<Utc>>,
    synced: bool,
}

impl SystemTimeSource {
    /// Unsynced source for `zone`.
    pub fn new(zone: Zone) -> Self {
        Self::with_clock(zone, Utc::now)
    }

    /// Unsynced source reading `clock` instead of the system clock.
    pub fn with_clock(zone: Zone, clock: fn() -> DateTime<Utc>) -> Self {
        SystemTimeSource {
            zone,
            clock,
            correction: TimeDelta::zero(),
            last_update: None,
            synced: false,
        }
    }

    /// Treat the uncorrected system clock as synced, for hosts already
    /// disciplined by a system NTP daemon.
    pub fn assume_synced(mut self) -> Self {
        self.synced = true;
        self.last_update = Some((self.clock)());
        self
    }

    /// Corrected UTC.
    pub fn utc_now(&self) -> DateTime<Utc> {
        (self.clock)() + self.correction
    }

    /// Correction applied to the system clock.
    pub fn correction(&self) -> TimeDelta {
        self.correction
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> CycleTime {
        let utc = self.utc_now();
        let offset = self.zone.offset_at(utc);
        CycleTime::from_signed(utc.timestamp() + i64::from(offset.local_minus_utc()))
    }

    fn has_synced(&self) -> bool {
        self.synced
    }

    fn seconds_since_update(&self) -> Option<u32> {
        let last = self.last_update?;
        let age = ((self.clock)() - last).num_seconds().max(0);
        Some(u32::try_from(age).unwrap_or(u32::MAX))
    }

    fn apply(&mut self, sample: SyncTimestamp) {
        let Some(server) = DateTime::<Utc>::from_timestamp(sample.unix_seconds, sample.nanos)
        else {
            warn!(unix_seconds = sample.unix_seconds, "sample out of range, ignored");
            return;
        };
        let system = (self.clock)();
        self.correction = server - system;
        self.last_update = Some(system);
        self.synced = true;
        info!(
            correction_ms = self.correction.num_milliseconds(),
            server = %server,
            "time source updated"
        );
    }
}
