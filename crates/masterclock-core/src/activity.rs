// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Status LED.
//!
//! The LED toggles on every pulse edge. [`ActivityIndicator::show()`]
//! overlays `n` quick flashes (one tick per phase) followed by a one
//! second hold, during which further requests are dropped.

use crate::tick::Tick;

const FLASH_PHASE_TICKS: i32 = 1;
const HOLD_TICKS: i32 = 10;

/// Flash counts used by the engine.
pub mod flashes {
    /// Time source stale or never synced.
    pub const STALE: u8 = 4;
    /// Sync transport not ready.
    pub const TRANSPORT_NOT_READY: u8 = 2;
    /// Sync sample applied.
    pub const SYNCED: u8 = 1;
}

/// Non-blocking LED flasher.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActivityIndicator {
    led: bool,
    phases: u16,
    phase_start: Option<Tick>,
}

impl ActivityIndicator {
    /// Indicator with the LED off and nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `count` flashes. Ignored while a previous request is still
    /// flashing or holding.
    pub fn show(&mut self, count: u8) {
        if self.phases == 0 {
            self.phases = 2 * u16::from(count) + 1;
        }
    }

    /// Invert the LED (pulse edges).
    pub fn toggle(&mut self) {
        self.led = !self.led;
    }

    /// Whether a request is in progress.
    pub fn is_flashing(&self) -> bool {
        self.phases != 0
    }

    /// Current LED level.
    pub fn level(&self) -> bool {
        self.led
    }

    /// Run any phase that has come due and return the LED level.
    pub fn service(&mut self, now: Tick) -> bool {
        let start = *self.phase_start.get_or_insert(now);
        let phase = if self.phases == 1 {
            HOLD_TICKS
        } else {
            FLASH_PHASE_TICKS
        };
        if now.since(start) < phase {
            return self.led;
        }
        self.phase_start = Some(start.after_ticks(phase as u32));

        if self.phases > 0 {
            self.phases -= 1;
            if self.phases > 0 {
                self.led = !self.led;
            }
        }
        self.led
    }
}
