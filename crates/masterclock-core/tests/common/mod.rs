// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Fake collaborators shared by the integration tests.

// Integration test helpers are `pub` so each `tests/*.rs` file can import them
// via `mod common`; not every file uses every helper.
#![allow(unreachable_pub, dead_code)]

use std::collections::VecDeque;

use masterclock_core::error::{StoreError, SyncError};
use masterclock_core::sync::SyncTimestamp;
use masterclock_core::traits::{PositionStore, SignalLines, SyncTransport, TimeSource};
use masterclock_core::{CycleTime, MasterClock, SignalLevels, Tick};

/// Records every level vector and LED change.
#[derive(Debug, Default)]
pub struct RecordingLines {
    pub driven: Vec<SignalLevels>,
    pub led: Vec<bool>,
    pub run_switch: bool,
    pub power_absent: bool,
}

impl RecordingLines {
    /// Level vectors with at least one line high.
    pub fn pulses(&self) -> Vec<SignalLevels> {
        self.driven.iter().copied().filter(|l| l.any()).collect()
    }
}

impl SignalLines for RecordingLines {
    fn drive(&mut self, levels: SignalLevels) {
        self.driven.push(levels);
    }
    fn set_indicator(&mut self, on: bool) {
        self.led.push(on);
    }
    fn run_switch(&self) -> bool {
        self.run_switch
    }
    fn power_present(&self) -> bool {
        !self.power_absent
    }
}

/// Authoritative time under test control.
#[derive(Debug)]
pub struct SimTime {
    pub now: CycleTime,
    pub synced: bool,
    pub age: Option<u32>,
    pub applied: Vec<SyncTimestamp>,
}

impl SimTime {
    pub fn synced_at(seconds: u32) -> Self {
        SimTime {
            now: CycleTime::new(seconds),
            synced: true,
            age: Some(0),
            applied: Vec::new(),
        }
    }

    pub fn unsynced_at(seconds: u32) -> Self {
        SimTime {
            now: CycleTime::new(seconds),
            synced: false,
            age: None,
            applied: Vec::new(),
        }
    }
}

impl TimeSource for SimTime {
    fn now(&self) -> CycleTime {
        self.now
    }
    fn has_synced(&self) -> bool {
        self.synced
    }
    fn seconds_since_update(&self) -> Option<u32> {
        self.age
    }
    fn apply(&mut self, sample: SyncTimestamp) {
        self.now = CycleTime::from_signed(sample.unix_seconds);
        self.synced = true;
        self.age = Some(0);
        self.applied.push(sample);
    }
}

/// Transport that answers from a queue of scripted replies.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub ready: bool,
    pub replies: VecDeque<SyncTimestamp>,
    pub sent: u32,
}

impl ScriptedTransport {
    pub fn ready() -> Self {
        ScriptedTransport {
            ready: true,
            ..ScriptedTransport::default()
        }
    }
}

impl SyncTransport for ScriptedTransport {
    fn is_ready(&self) -> bool {
        self.ready
    }
    fn send_request(&mut self) -> Result<(), SyncError> {
        self.sent += 1;
        Ok(())
    }
    fn poll_response(&mut self) -> Option<SyncTimestamp> {
        self.replies.pop_front()
    }
}

/// In-memory store with fault injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub saved: Option<CycleTime>,
    pub saves: u32,
    pub fail: bool,
}

impl MemoryStore {
    pub fn holding(seconds: u32) -> Self {
        MemoryStore {
            saved: Some(CycleTime::new(seconds)),
            ..MemoryStore::default()
        }
    }
}

impl PositionStore for MemoryStore {
    fn load(&mut self) -> Result<Option<CycleTime>, StoreError> {
        if self.fail {
            return Err(StoreError::Unavailable);
        }
        Ok(self.saved)
    }
    fn save(&mut self, position: CycleTime) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::WriteFailed);
        }
        self.saved = Some(position);
        self.saves += 1;
        Ok(())
    }
}

pub type TestClock = MasterClock<RecordingLines, SimTime, ScriptedTransport, MemoryStore>;

/// An engine with default configuration, no sync on start, already started.
pub fn started(time: SimTime, transport: ScriptedTransport, store: MemoryStore) -> TestClock {
    let mut clock = MasterClock::builder()
        .sync_on_start(false)
        .build(RecordingLines::default(), time, transport, store)
        .expect("default configuration is valid");
    clock.start();
    clock
}

/// Drive the engine for `seconds` of simulated time, ten ticks per second,
/// advancing authoritative time once per second. The loop runs twice per
/// tick, as a real driver loop runs many times per tick. Returns the next
/// tick.
pub fn run_seconds(clock: &mut TestClock, mut tick: Tick, seconds: u32) -> Tick {
    for _ in 0..seconds {
        for _ in 0..10 {
            clock.service(tick);
            clock.service(tick);
            tick = tick.after_ticks(1);
        }
        let next = clock.time().now.plus_seconds(1);
        clock.time_mut().now = next;
    }
    tick
}
