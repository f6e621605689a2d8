// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use masterclock::control::ManualCommand;
use masterclock::error::SyncError;
use masterclock::host::console::{ConsoleAction, KeyParser, StatusWriter};
use masterclock::host::{FileStore, SimulatedLines};
use masterclock::sync::SyncTimestamp;
use masterclock::traits::{PositionStore, SyncTransport, TimeSource};
use masterclock::{CycleTime, MasterClock, Tick};

/// Authoritative time that only moves when told to.
struct SteppedTime {
    now: u32,
}

impl TimeSource for SteppedTime {
    fn now(&self) -> CycleTime {
        CycleTime::new(self.now)
    }
    fn has_synced(&self) -> bool {
        true
    }
    fn seconds_since_update(&self) -> Option<u32> {
        Some(0)
    }
    fn apply(&mut self, _sample: SyncTimestamp) {}
}

/// A network that never comes up.
struct Offline;

impl SyncTransport for Offline {
    fn is_ready(&self) -> bool {
        false
    }
    fn send_request(&mut self) -> Result<(), SyncError> {
        Err(SyncError::TransportUnavailable)
    }
    fn poll_response(&mut self) -> Option<SyncTimestamp> {
        None
    }
}

type Clock = MasterClock<SimulatedLines, SteppedTime, Offline, FileStore>;

fn store_at(name: &str, contents: &str) -> FileStore {
    let dir = std::env::temp_dir().join(format!("masterclock-e2e-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path: PathBuf = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    FileStore::new(path)
}

fn clock(now: u32, store: FileStore) -> Clock {
    let mut clock = MasterClock::builder()
        .sync_on_start(false)
        .build(SimulatedLines::new(), SteppedTime { now }, Offline, store)
        .unwrap();
    clock.start();
    clock
}

/// Run whole seconds, two service calls per tick, moving authoritative
/// time on at each second boundary.
fn run_seconds(clock: &mut Clock, mut tick: Tick, seconds: u32) -> Tick {
    for _ in 0..seconds {
        for _ in 0..10 {
            clock.service(tick);
            clock.service(tick);
            tick = tick.after_ticks(1);
        }
        clock.time_mut().now += 1;
    }
    tick
}

#[test]
fn test_slow_dial_catches_up_and_persists() {
    // Dial at 00:58:00, real time 01:01:40.
    let mut clock = clock(3700, store_at("catch-up.txt", "3480\n"));
    let tick = run_seconds(&mut clock, Tick::from_raw(0), 10);
    clock.service(tick);

    assert_eq!(clock.output().pulses(), 2);
    assert_eq!(clock.status().wall.position, CycleTime::new(3600));

    let saved = std::fs::read_to_string(clock.store().path()).unwrap();
    assert_eq!(saved, "3480\n3540\n3600\n");
}

#[test]
fn test_console_entry_survives_restart() {
    let mut clock = clock(3630, store_at("entry.txt", "3600\n"));
    assert_eq!(clock.status().wall.position, CycleTime::new(3600));

    let mut parser = KeyParser::new();
    let mut actions = b"01:30\r".iter().filter_map(|&k| parser.key(k));
    let Some(ConsoleAction::Command(command)) = actions.next() else {
        panic!("time entry not accepted");
    };
    assert!(matches!(command, ManualCommand::EnterTime(_)));
    clock.execute(command).unwrap();
    // The dial has no second hand; the entry is kept to the minute.
    assert_eq!(clock.status().wall.position, CycleTime::new(3660));

    let (_, _, _, mut store) = clock.into_parts();
    assert_eq!(store.load(), Ok(Some(CycleTime::new(3660))));
}

#[test]
fn test_status_line_over_a_minute_boundary() {
    // Dial and real time agree at 01:00:58.
    let mut clock = clock(3658, store_at("status.txt", "3600\n"));
    let mut writer = StatusWriter::new(Vec::new());
    let mut tick = Tick::from_raw(0);
    for _ in 0..3 {
        for _ in 0..10 {
            let report = clock.service(tick);
            writer.record(&report, &clock.status()).unwrap();
            tick = tick.after_ticks(1);
        }
        clock.time_mut().now += 1;
    }
    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert!(text.starts_with("--\n01:01:00 01:01 "), "status was {text:?}");
    assert_eq!(clock.output().pulses(), 1);
}
