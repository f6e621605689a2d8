// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Signal lines with no hardware behind them: every edge is logged.

use masterclock_core::SignalLevels;
use masterclock_core::traits::SignalLines;
use tracing::{debug, trace};

/// [`SignalLines`] that records state and logs edges.
#[derive(Clone, Debug)]
pub struct SimulatedLines {
    levels: SignalLevels,
    indicator: bool,
    run_switch: bool,
    power_present: bool,
    pulses: u64,
}

impl Default for SimulatedLines {
    fn default() -> Self {
        SimulatedLines {
            levels: SignalLevels::LOW,
            indicator: false,
            run_switch: false,
            power_present: true,
            pulses: 0,
        }
    }
}

impl SimulatedLines {
    /// All lines low, supply present.
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels currently driven.
    pub fn levels(&self) -> SignalLevels {
        self.levels
    }

    /// Indicator state.
    pub fn indicator(&self) -> bool {
        self.indicator
    }

    /// Number of pulses asserted so far.
    pub fn pulses(&self) -> u64 {
        self.pulses
    }

    /// Set the simulated run switch.
    pub fn set_run_switch(&mut self, on: bool) {
        self.run_switch = on;
    }

    /// Set the simulated supply sense.
    pub fn set_power_present(&mut self, present: bool) {
        self.power_present = present;
    }
}

impl SignalLines for SimulatedLines {
    fn drive(&mut self, levels: SignalLevels) {
        if levels == self.levels {
            return;
        }
        if levels.any() {
            self.pulses += 1;
            debug!(a = levels.a, b = levels.b, d = levels.d, "lines asserted");
        } else {
            debug!("lines released");
        }
        self.levels = levels;
    }

    fn set_indicator(&mut self, on: bool) {
        trace!(on, "indicator");
        self.indicator = on;
    }

    fn run_switch(&self) -> bool {
        self.run_switch
    }

    fn power_present(&self) -> bool {
        self.power_present
    }
}
