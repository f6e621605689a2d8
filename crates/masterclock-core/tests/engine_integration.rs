// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

mod common;

use common::{MemoryStore, ScriptedTransport, SimTime, run_seconds, started};
use masterclock_core::drift::DriftBranch;
use masterclock_core::sync::{SyncState, SyncTimestamp};
use masterclock_core::traits::PositionStore;
use masterclock_core::{CycleTime, Line, MasterClock, SignalLevels, Tick};

#[test]
fn test_slow_clock_gets_exactly_one_advance() {
    let mut clock = started(
        SimTime::synced_at(3700),
        ScriptedTransport::default(),
        MemoryStore::holding(0),
    );
    let tick = run_seconds(&mut clock, Tick::from_raw(0), 1);
    assert_eq!(
        clock.output().pulses(),
        vec![SignalLevels::minute_advance(false)]
    );
    assert_eq!(clock.status().wall.position, CycleTime::new(60));

    // The break ends on the first tick of the next second; the new
    // position is saved then.
    clock.service(tick);
    assert_eq!(clock.store().saved, Some(CycleTime::new(60)));
}

#[test]
fn test_catch_up_converges() {
    let mut clock = started(
        SimTime::synced_at(3700),
        ScriptedTransport::default(),
        MemoryStore::holding(0),
    );
    run_seconds(&mut clock, Tick::from_raw(0), 200);
    let status = clock.status();
    assert_eq!(status.branch, Some(DriftBranch::OnTime));
    let lag = status.authoritative.forward_from(status.wall.position);
    assert!(lag <= 120, "dial still {lag} s behind");
    // One advance per second of catch-up, never more.
    assert!(clock.output().pulses().len() <= 200);
}

#[test]
fn test_fast_clock_waits_without_pulsing() {
    let mut clock = started(
        SimTime::synced_at(3630),
        ScriptedTransport::default(),
        MemoryStore::holding(4200),
    );
    run_seconds(&mut clock, Tick::from_raw(0), 10);
    assert!(clock.output().pulses().is_empty());
    assert_eq!(clock.status().wall.position, CycleTime::new(4200));
    assert_eq!(clock.status().branch, Some(DriftBranch::FastWait));
}

#[test]
fn test_forced_pulse_applied_once() {
    let mut clock = started(
        SimTime::synced_at(3630),
        ScriptedTransport::default(),
        MemoryStore::holding(3600),
    );
    assert!(clock.force_pulse(Line::A));
    run_seconds(&mut clock, Tick::from_raw(0), 3);
    assert_eq!(
        clock.output().pulses(),
        vec![SignalLevels {
            a: true,
            b: false,
            d: false
        }]
    );
    assert_eq!(clock.pending_forces(Line::A), 0);
    assert_eq!(clock.status().wall.position, CycleTime::new(3600));
}

#[test]
fn test_hourly_sync_gives_up_after_31_attempts() {
    let mut clock = started(
        SimTime::synced_at(58 * 60),
        ScriptedTransport::ready(),
        MemoryStore::default(),
    );
    run_seconds(&mut clock, Tick::from_raw(0), 400);
    assert_eq!(clock.transport().sent, 31);
    assert_eq!(clock.status().sync_state, SyncState::Completed);
    assert_eq!(clock.status().syncs_exhausted, 1);
}

#[test]
fn test_manual_sync_applies_sample_and_snaps() {
    let mut transport = ScriptedTransport::ready();
    transport.replies.push_back(SyncTimestamp {
        unix_seconds: 1_700_000_000,
        nanos: 0,
    });
    let mut clock = started(SimTime::unsynced_at(0), transport, MemoryStore::default());
    clock.trigger_sync();
    run_seconds(&mut clock, Tick::from_raw(0), 2);

    assert_eq!(clock.time().applied.len(), 1);
    let status = clock.status();
    assert!(status.synced);
    assert_eq!(status.syncs_completed, 1);
    assert!(status.wall.known);
    // 1_700_000_000 mod 43200 = 36800 (10:13:20), snapped to the minute.
    assert_eq!(clock.store().saved, Some(CycleTime::new(36780)));
}

#[test]
fn test_power_loss_then_catch_up() {
    let mut clock = started(
        SimTime::synced_at(3630),
        ScriptedTransport::default(),
        MemoryStore::holding(3600),
    );
    clock.output_mut().power_absent = true;
    let tick = run_seconds(&mut clock, Tick::from_raw(0), 150);
    assert!(clock.output().pulses().is_empty());
    assert_eq!(clock.status().branch, Some(DriftBranch::PowerLoss));
    assert_eq!(clock.status().wall.position, CycleTime::new(3600));

    clock.output_mut().power_absent = false;
    let report = clock.service(tick);
    assert_eq!(report.drift.map(|d| d.branch), Some(DriftBranch::CatchUp));
}

#[test]
fn test_store_round_trip_and_restart() {
    let mut store = MemoryStore::default();
    store.save(CycleTime::new(1234)).unwrap();
    assert_eq!(store.load(), Ok(Some(CycleTime::new(1234))));

    let mut clock = started(
        SimTime::synced_at(3700),
        ScriptedTransport::default(),
        store,
    );
    let tick = run_seconds(&mut clock, Tick::from_raw(0), 1);
    clock.service(tick);
    let (_, time, transport, store) = clock.into_parts();
    let saved = store.saved;

    let mut restarted = MasterClock::builder()
        .sync_on_start(false)
        .build(common::RecordingLines::default(), time, transport, store)
        .unwrap();
    assert_eq!(restarted.start(), saved);
}

#[test]
fn test_store_outage_keeps_known_position() {
    let mut clock = started(
        SimTime::synced_at(3630),
        ScriptedTransport::default(),
        MemoryStore::holding(3600),
    );
    clock.store_mut().fail = true;
    let tick = run_seconds(&mut clock, Tick::from_raw(0), 61);
    assert_eq!(clock.output().pulses().len(), 1);
    assert!(clock.status().store_failures > 0);
    let wall = clock.status().wall;
    assert!(wall.known);
    assert_eq!(wall.position, CycleTime::new(3660));

    // Storage comes back; the next pulse saves the current position.
    clock.store_mut().fail = false;
    run_seconds(&mut clock, tick, 35);
    assert_eq!(clock.status().wall.position, CycleTime::new(3720));
    assert_eq!(clock.store().saved, Some(CycleTime::new(3720)));
}

#[test]
fn test_unsaved_snap_is_not_trusted() {
    let mut store = MemoryStore::default();
    store.fail = true;
    let mut clock = started(SimTime::synced_at(3600), ScriptedTransport::default(), store);
    run_seconds(&mut clock, Tick::from_raw(0), 61);
    assert!(!clock.output().pulses().is_empty());
    assert!(clock.status().store_failures > 0);
    assert!(!clock.status().wall.known);
}

#[test]
fn test_stale_source_flashes_led() {
    let mut clock = started(
        SimTime::unsynced_at(100),
        ScriptedTransport::default(),
        MemoryStore::default(),
    );
    run_seconds(&mut clock, Tick::from_raw(0), 2);
    assert!(clock.status().stale);
    assert!(clock.output().led.len() >= 8);
    assert!(clock.output().pulses().is_empty());
}
