// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Drift reconciliation.
//!
//! Once per distinct authoritative second the reconciler compares the
//! position the dial shows against authoritative time and picks one of
//! four branches:
//!
//! | Branch | Condition | Lines | Position |
//! |--------|-----------|-------|----------|
//! | run override | override switch held | all high | snapped to authoritative time |
//! | fast-wait | dial ahead by under `fast_wait_seconds` | forced only | unchanged |
//! | catch-up | dial behind by more than a minute | minute advance | +1 minute |
//! | on-time | otherwise | signal policy | +1 minute at second 0 |
//!
//! with
//!
//! ```text
//! delta = (CYCLE + authoritative - (position + 60)) mod CYCLE
//! ```
//!
//! taken as zero while the position is unknown or time has never synced.
//! The first synced second after the position became unknown snaps it to
//! authoritative time and asks for it to be persisted.

use log::{debug, info};

use crate::cycle::{CYCLE_SECONDS, CycleTime, SECONDS_PER_MINUTE};
use crate::signal::{ForceRequests, SignalLevels, SignalPolicy};

/// Branch taken by one reconciliation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DriftBranch {
    /// Same authoritative second as the previous call; nothing done.
    Unchanged,
    /// The movement has no supply; nothing driven, nothing advanced.
    PowerLoss,
    /// Operator run switch held.
    RunOverride,
    /// Dial slightly ahead; waiting for real time.
    FastWait,
    /// Dial more than a minute behind; stepping it forward.
    CatchUp,
    /// Dial in step; following the signal policy.
    OnTime,
}

/// Authoritative time as read once per service call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AuthoritativeTime {
    /// Time of day on the dial.
    pub now: CycleTime,
    /// Whether the source has ever synchronized.
    pub synced: bool,
}

/// Everything one reconciliation looks at besides its own state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DriftInputs {
    /// Authoritative time.
    pub time: AuthoritativeTime,
    /// Run override switch.
    pub run_override: bool,
    /// Movement supply present.
    pub power_present: bool,
}

/// Outcome of one reconciliation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Reconciliation {
    /// Branch taken.
    pub branch: DriftBranch,
    /// Levels to start a pulse cycle with. All low means no cycle.
    pub levels: SignalLevels,
    /// Whether the position moved forward by one minute.
    pub advanced: bool,
    /// Position snapped on first sync; must be persisted before it is
    /// trusted.
    pub persist: Option<CycleTime>,
}

impl Reconciliation {
    const fn idle(branch: DriftBranch) -> Self {
        Reconciliation {
            branch,
            levels: SignalLevels::LOW,
            advanced: false,
            persist: None,
        }
    }
}

/// The position the dial shows, and whether it is trusted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WallClock {
    /// Displayed time.
    pub position: CycleTime,
    /// `false` until restored, snapped or entered by the operator.
    pub known: bool,
}

/// Owns the wall-clock position and decides which pulses move it.
#[derive(Debug)]
pub struct DriftReconciler {
    wall: WallClock,
    policy: SignalPolicy,
    fast_wait_seconds: u32,
    last_second: Option<CycleTime>,
    last_branch: Option<DriftBranch>,
}

impl DriftReconciler {
    /// Reconciler with an unknown position.
    pub fn new(policy: SignalPolicy, fast_wait_seconds: u32) -> Self {
        DriftReconciler {
            wall: WallClock::default(),
            policy,
            fast_wait_seconds,
            last_second: None,
            last_branch: None,
        }
    }

    /// Current wall clock.
    pub fn wall(&self) -> WallClock {
        self.wall
    }

    /// Signal policy in use.
    pub fn policy(&self) -> &SignalPolicy {
        &self.policy
    }

    /// Branch taken by the most recent reconciliation that ran.
    pub fn last_branch(&self) -> Option<DriftBranch> {
        self.last_branch
    }

    /// Trust `position` as what the dial shows.
    pub fn set_position(&mut self, position: CycleTime) {
        self.wall = WallClock {
            position,
            known: true,
        };
    }

    /// Distrust the position until the next synced second.
    pub fn forget_position(&mut self) {
        self.wall.known = false;
    }

    /// Raw delta for `now`, before the unknown/unsynced override.
    pub fn delta(&self, now: CycleTime) -> u32 {
        let display = self.wall.position.plus_seconds(SECONDS_PER_MINUTE);
        now.forward_from(display)
    }

    /// Reconcile once. Repeated calls within one authoritative second
    /// return [`DriftBranch::Unchanged`].
    pub fn reconcile(&mut self, inputs: DriftInputs, forces: &mut ForceRequests) -> Reconciliation {
        let now = inputs.time.now;
        if self.last_second == Some(now) {
            return Reconciliation::idle(DriftBranch::Unchanged);
        }
        self.last_second = Some(now);

        if !inputs.power_present {
            self.note_branch(DriftBranch::PowerLoss, now);
            return Reconciliation::idle(DriftBranch::PowerLoss);
        }

        let delta = if self.wall.known && inputs.time.synced {
            self.delta(now)
        } else {
            0
        };

        let mut outcome = if inputs.run_override {
            self.set_position(now.whole_minute());
            Reconciliation {
                branch: DriftBranch::RunOverride,
                levels: SignalLevels::all_high(self.policy.line_d()).union(forces.take()),
                advanced: false,
                persist: None,
            }
        } else if delta > CYCLE_SECONDS - self.fast_wait_seconds {
            Reconciliation {
                levels: forces.take(),
                ..Reconciliation::idle(DriftBranch::FastWait)
            }
        } else if delta > SECONDS_PER_MINUTE {
            self.wall.position = self.wall.position.next_minute();
            Reconciliation {
                branch: DriftBranch::CatchUp,
                levels: SignalLevels::minute_advance(self.policy.line_d()).union(forces.take()),
                advanced: true,
                persist: None,
            }
        } else {
            let levels = self.policy.evaluate(now, forces);
            let advanced = now.second() == 0;
            if advanced {
                self.wall.position = self.wall.position.next_minute();
            }
            Reconciliation {
                branch: DriftBranch::OnTime,
                levels,
                advanced,
                persist: None,
            }
        };
        self.note_branch(outcome.branch, now);

        if !self.wall.known && inputs.time.synced {
            self.set_position(now.whole_minute());
            info!("wall clock snapped to {} on first sync", self.wall.position);
            outcome.persist = Some(self.wall.position);
        }
        outcome
    }

    fn note_branch(&mut self, branch: DriftBranch, now: CycleTime) {
        if self.last_branch != Some(branch) {
            debug!(
                "drift {:?} -> {:?} at {} (dial {})",
                self.last_branch, branch, now, self.wall.position
            );
            self.last_branch = Some(branch);
        }
    }
}
