// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use crate::cycle::CYCLE_SECONDS;
use crate::error::ConfigError;
use crate::pulse::PulseTiming;
use crate::sync::SyncPolicy;

/// Engine configuration. Built through [`MasterClock::builder()`](crate::MasterClock::builder)
/// or directly and checked with [`validate()`](ClockConfig::validate).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClockConfig {
    /// Make/break durations.
    pub pulse: PulseTiming,
    /// Drive the optional line D. Default `false`.
    pub enable_line_d: bool,
    /// Sync session policy.
    pub sync: SyncPolicy,
    /// Seconds without a time update before the source counts as stale.
    /// Default 18000 (5 h).
    pub stale_after_seconds: u32,
    /// How far ahead the dial may be before the engine runs it round
    /// instead of waiting. Default 1800 (30 min).
    pub fast_wait_seconds: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            pulse: PulseTiming::default(),
            enable_line_d: false,
            sync: SyncPolicy::default(),
            stale_after_seconds: 5 * 60 * 60,
            fast_wait_seconds: 30 * 60,
        }
    }
}

impl ClockConfig {
    /// Reject settings the state machines cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pulse.rise_ticks == 0 || self.pulse.fall_ticks == 0 {
            return Err(ConfigError::ZeroPulseDuration);
        }
        if self.sync.cron_minute >= 60 {
            return Err(ConfigError::InvalidCronMinute(self.sync.cron_minute));
        }
        if self.sync.response_timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.fast_wait_seconds >= CYCLE_SECONDS {
            return Err(ConfigError::FastWaitTooLong(self.fast_wait_seconds));
        }
        Ok(())
    }
}
