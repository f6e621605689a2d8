// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The make/break cycle.
//!
//! ```text
//!   Idle ──(levels any high)──▶ RiseHold ──(rise_ticks)──▶ FallHold ──(fall_ticks)──▶ Idle
//! ```
//!
//! Lines are asserted on entering `RiseHold` and dropped on entering
//! `FallHold`. A new cycle can only start from `Idle`, so exactly one
//! cycle is ever in flight.

use crate::signal::SignalLevels;
use crate::tick::Tick;

/// Make and break durations, in 100 ms ticks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PulseTiming {
    /// Time the lines are held high. Default 6 (600 ms).
    pub rise_ticks: u16,
    /// Time the lines are held low before another cycle. Default 4 (400 ms).
    pub fall_ticks: u16,
}

impl Default for PulseTiming {
    fn default() -> Self {
        PulseTiming {
            rise_ticks: 6,
            fall_ticks: 4,
        }
    }
}

impl PulseTiming {
    /// Ticks from assertion to the end of the break.
    pub const fn cycle_ticks(&self) -> u32 {
        self.rise_ticks as u32 + self.fall_ticks as u32
    }
}

/// Position in the make/break cycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PulseState {
    /// Waiting for a second whose levels have a line high.
    #[default]
    Idle,
    /// Lines asserted at `since`.
    RiseHold {
        /// Tick the lines were asserted.
        since: Tick,
        /// Levels being held.
        levels: SignalLevels,
    },
    /// Lines dropped at `since`.
    FallHold {
        /// Tick the lines were dropped.
        since: Tick,
    },
}

/// Output edge produced by a transition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PulseEvent {
    /// Drive these levels now.
    Asserted(SignalLevels),
    /// Drive every line low now. Carries the levels that were held.
    Released(SignalLevels),
    /// The break finished; a new cycle may start.
    CycleComplete,
}

impl PulseState {
    /// Whether a new cycle may start.
    pub const fn is_idle(&self) -> bool {
        matches!(self, PulseState::Idle)
    }

    /// Levels currently on the lines.
    pub const fn levels(&self) -> SignalLevels {
        match self {
            PulseState::RiseHold { levels, .. } => *levels,
            _ => SignalLevels::LOW,
        }
    }

    /// One transition. `request` is only looked at from `Idle`.
    pub fn step(
        self,
        now: Tick,
        timing: &PulseTiming,
        request: Option<SignalLevels>,
    ) -> (PulseState, Option<PulseEvent>) {
        match self {
            PulseState::Idle => match request {
                Some(levels) if levels.any() => (
                    PulseState::RiseHold { since: now, levels },
                    Some(PulseEvent::Asserted(levels)),
                ),
                _ => (PulseState::Idle, None),
            },
            PulseState::RiseHold { since, levels } => {
                if now.since(since) < i32::from(timing.rise_ticks) {
                    (self, None)
                } else {
                    (
                        PulseState::FallHold { since: now },
                        Some(PulseEvent::Released(levels)),
                    )
                }
            }
            PulseState::FallHold { since } => {
                if now.since(since) < i32::from(timing.fall_ticks) {
                    (self, None)
                } else {
                    (PulseState::Idle, Some(PulseEvent::CycleComplete))
                }
            }
        }
    }
}

/// [`PulseState`] paired with its timing.
#[derive(Clone, Copy, Debug, Default)]
pub struct PulseProtocol {
    state: PulseState,
    timing: PulseTiming,
}

impl PulseProtocol {
    /// Idle protocol with the given timing.
    pub fn new(timing: PulseTiming) -> Self {
        PulseProtocol {
            state: PulseState::Idle,
            timing,
        }
    }

    /// Current state.
    pub fn state(&self) -> PulseState {
        self.state
    }

    /// Timing in use.
    pub fn timing(&self) -> &PulseTiming {
        &self.timing
    }

    /// Whether a new cycle may start.
    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// Advance one step.
    pub fn advance(&mut self, now: Tick, request: Option<SignalLevels>) -> Option<PulseEvent> {
        let (next, event) = self.state.step(now, &self.timing, request);
        self.state = next;
        event
    }
}
