// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The engine context.
//!
//! [`MasterClock`] owns every state machine and the four collaborators.
//! The caller owns the `MasterClock` and calls [`service()`](MasterClock::service)
//! from its driver loop, passing the current tick.

use log::{debug, info, warn};

use crate::activity::{ActivityIndicator, flashes};
use crate::config::ClockConfig;
use crate::control::{ManualCommand, TimeEntry};
use crate::cycle::CycleTime;
use crate::drift::{
    AuthoritativeTime, DriftBranch, DriftInputs, DriftReconciler, Reconciliation, WallClock,
};
use crate::error::{ConfigError, StoreError};
use crate::pulse::{PulseEvent, PulseProtocol, PulseTiming};
use crate::signal::{ForceRequests, Line, SignalLevels, SignalPolicy};
use crate::sync::{NtpSession, SyncEvent, SyncState};
use crate::tick::Tick;
use crate::traits::{PositionStore, SignalLines, SyncTransport, TimeSource};

/// What one [`MasterClock::service()`] call did.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ServiceReport {
    /// Sync session event, if any.
    pub sync: Option<SyncEvent>,
    /// Reconciliation, if the pulse protocol was idle.
    pub drift: Option<Reconciliation>,
    /// Pulse edge, if any.
    pub pulse: Option<PulseEvent>,
}

/// Snapshot for status displays.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Status {
    /// Authoritative time.
    pub authoritative: CycleTime,
    /// Whether the time source has ever synced.
    pub synced: bool,
    /// No update within the stale window, or never synced.
    pub stale: bool,
    /// What the dial shows.
    pub wall: WallClock,
    /// Levels currently driven.
    pub levels: SignalLevels,
    /// Sync session state.
    pub sync_state: SyncState,
    /// Most recent drift branch.
    pub branch: Option<DriftBranch>,
    /// Run override set by command.
    pub run_override: bool,
    /// Samples applied since start.
    pub syncs_completed: u32,
    /// Sessions that ran out of retries.
    pub syncs_exhausted: u32,
    /// Failed saves and loads.
    pub store_failures: u32,
}

/// Builder for a [`MasterClock`].
#[derive(Clone, Debug, Default)]
pub struct MasterClockBuilder {
    config: ClockConfig,
}

impl MasterClockBuilder {
    /// Start from a complete configuration.
    pub fn config(mut self, config: ClockConfig) -> Self {
        self.config = config;
        self
    }

    /// Make and break durations, in ticks.
    pub fn pulse_timing(mut self, rise_ticks: u16, fall_ticks: u16) -> Self {
        self.config.pulse = PulseTiming {
            rise_ticks,
            fall_ticks,
        };
        self
    }

    /// Drive the optional line D.
    pub fn enable_line_d(mut self, enable: bool) -> Self {
        self.config.enable_line_d = enable;
        self
    }

    /// Minute of the hour for the automatic sync.
    pub fn cron_minute(mut self, minute: u8) -> Self {
        self.config.sync.cron_minute = minute;
        self
    }

    /// Retry budgets for automatic and manual sessions.
    pub fn retries(mut self, cron: u8, oneshot: u8) -> Self {
        self.config.sync.cron_retries = cron;
        self.config.sync.oneshot_retries = oneshot;
        self
    }

    /// Guard window after an automatic session.
    pub fn guard_seconds(mut self, seconds: u32) -> Self {
        self.config.sync.guard_seconds = seconds;
        self
    }

    /// Response timeout per attempt.
    pub fn response_timeout_seconds(mut self, seconds: u32) -> Self {
        self.config.sync.response_timeout_seconds = seconds;
        self
    }

    /// Whether [`MasterClock::start()`] triggers a manual sync.
    pub fn sync_on_start(mut self, enable: bool) -> Self {
        self.config.sync.sync_on_start = enable;
        self
    }

    /// Stale threshold for the activity indicator.
    pub fn stale_after_seconds(mut self, seconds: u32) -> Self {
        self.config.stale_after_seconds = seconds;
        self
    }

    /// Fast-wait window.
    pub fn fast_wait_seconds(mut self, seconds: u32) -> Self {
        self.config.fast_wait_seconds = seconds;
        self
    }

    /// Validate the configuration and assemble the engine.
    pub fn build<O, T, N, S>(
        self,
        output: O,
        time: T,
        transport: N,
        store: S,
    ) -> Result<MasterClock<O, T, N, S>, ConfigError>
    where
        O: SignalLines,
        T: TimeSource,
        N: SyncTransport,
        S: PositionStore,
    {
        self.config.validate()?;
        Ok(MasterClock::with_config(
            self.config,
            output,
            time,
            transport,
            store,
        ))
    }
}

/// The master clock engine.
#[derive(Debug)]
pub struct MasterClock<O, T, N, S> {
    config: ClockConfig,
    output: O,
    time: T,
    transport: N,
    store: S,
    pulse: PulseProtocol,
    drift: DriftReconciler,
    sync: NtpSession,
    activity: ActivityIndicator,
    forces: ForceRequests,
    run_override: bool,
    last_saved: Option<CycleTime>,
    led: Option<bool>,
    syncs_completed: u32,
    syncs_exhausted: u32,
    store_failures: u32,
}

impl MasterClock<(), (), (), ()> {
    /// Builder with default configuration.
    pub fn builder() -> MasterClockBuilder {
        MasterClockBuilder::default()
    }
}

impl<O, T, N, S> MasterClock<O, T, N, S>
where
    O: SignalLines,
    T: TimeSource,
    N: SyncTransport,
    S: PositionStore,
{
    fn with_config(config: ClockConfig, output: O, time: T, transport: N, store: S) -> Self {
        MasterClock {
            pulse: PulseProtocol::new(config.pulse),
            drift: DriftReconciler::new(
                SignalPolicy::new(config.enable_line_d),
                config.fast_wait_seconds,
            ),
            sync: NtpSession::new(config.sync),
            activity: ActivityIndicator::new(),
            forces: ForceRequests::default(),
            run_override: false,
            last_saved: None,
            led: None,
            syncs_completed: 0,
            syncs_exhausted: 0,
            store_failures: 0,
            config,
            output,
            time,
            transport,
            store,
        }
    }

    /// Restore the saved position and, if configured, request a sync.
    /// Returns the restored position.
    pub fn start(&mut self) -> Option<CycleTime> {
        self.output.drive(SignalLevels::LOW);
        let restored = match self.store.load() {
            Ok(Some(position)) => {
                let position = position.whole_minute();
                info!("clock face restored: {}", position);
                self.drift.set_position(position);
                self.last_saved = Some(position);
                Some(position)
            }
            Ok(None) => {
                info!("clock face position unknown");
                None
            }
            Err(e) => {
                warn!("clock face position unavailable: {}", e);
                self.store_failures += 1;
                None
            }
        };
        if self.config.sync.sync_on_start {
            self.sync.trigger();
        }
        restored
    }

    /// One pass of the cooperative loop. Never blocks and never fails.
    pub fn service(&mut self, now: Tick) -> ServiceReport {
        let mut report = ServiceReport::default();

        let minute = self.time.now().minute();
        report.sync = self.sync.step(now, minute, &mut self.transport);
        match report.sync {
            Some(SyncEvent::Synced(sample)) => {
                self.time.apply(sample);
                self.syncs_completed += 1;
                self.activity.show(flashes::SYNCED);
            }
            Some(SyncEvent::TransportNotReady) => self.activity.show(flashes::TRANSPORT_NOT_READY),
            Some(SyncEvent::Exhausted(_)) => self.syncs_exhausted += 1,
            _ => {}
        }

        if self.is_stale() {
            self.activity.show(flashes::STALE);
        }

        let request = if self.pulse.is_idle() {
            let inputs = DriftInputs {
                time: AuthoritativeTime {
                    now: self.time.now(),
                    synced: self.time.has_synced(),
                },
                run_override: self.run_override || self.output.run_switch(),
                power_present: self.output.power_present(),
            };
            let reconciliation = self.drift.reconcile(inputs, &mut self.forces);
            // A first-sync snap is only trusted once it is saved.
            if let Some(position) = reconciliation.persist
                && !self.save(position)
            {
                self.drift.forget_position();
            }
            report.drift = Some(reconciliation);
            Some(reconciliation.levels)
        } else {
            None
        };

        report.pulse = self.pulse.advance(now, request);
        match report.pulse {
            Some(PulseEvent::Asserted(levels)) => {
                self.output.drive(levels);
                self.activity.toggle();
            }
            Some(PulseEvent::Released(_)) => {
                self.output.drive(SignalLevels::LOW);
                self.activity.toggle();
            }
            Some(PulseEvent::CycleComplete) => self.persist_if_changed(),
            None => {}
        }

        let led = self.activity.service(now);
        if self.led != Some(led) {
            self.output.set_indicator(led);
            self.led = Some(led);
        }

        report
    }

    /// Carry out an operator command.
    pub fn execute(&mut self, command: ManualCommand) -> Result<(), StoreError> {
        match command {
            ManualCommand::ForcePulse(line) => {
                self.force_pulse(line);
            }
            ManualCommand::ForceBoth => {
                self.force_pulse(Line::A);
                self.force_pulse(Line::B);
            }
            ManualCommand::TriggerSync => self.trigger_sync(),
            ManualCommand::ToggleRunOverride => self.set_run_override(!self.run_override),
            ManualCommand::SetRunOverride(on) => self.set_run_override(on),
            ManualCommand::EnterTime(entry) => {
                self.apply_time_entry(entry)?;
            }
        }
        Ok(())
    }

    /// Queue one extra pulse on `line`. Returns `false` for a line that
    /// cannot be forced.
    pub fn force_pulse(&mut self, line: Line) -> bool {
        let queued = self.forces.request(line);
        if queued {
            debug!("forced pulse queued on line {}", line.letter());
        } else {
            debug!("line {} cannot be forced", line.letter());
        }
        queued
    }

    /// Start a manual sync session.
    pub fn trigger_sync(&mut self) {
        info!("manual sync requested");
        self.sync.trigger();
    }

    /// Set the run override.
    pub fn set_run_override(&mut self, on: bool) {
        if self.run_override != on {
            info!("run override {}", if on { "on" } else { "off" });
        }
        self.run_override = on;
    }

    /// Record what the dial shows and persist it. The dial has no second
    /// hand, so the position is kept to the whole minute. A failed save
    /// keeps the entry in memory and is retried after the next pulse.
    pub fn apply_time_entry(&mut self, entry: TimeEntry) -> Result<CycleTime, StoreError> {
        let position = entry.apply_to(self.drift.wall().position).whole_minute();
        info!("clock face set to {}", position);
        self.drift.set_position(position);
        if self.save(position) {
            Ok(position)
        } else {
            Err(StoreError::WriteFailed)
        }
    }

    /// Status snapshot.
    pub fn status(&self) -> Status {
        Status {
            authoritative: self.time.now(),
            synced: self.time.has_synced(),
            stale: self.is_stale(),
            wall: self.drift.wall(),
            levels: self.pulse.state().levels(),
            sync_state: self.sync.state(),
            branch: self.drift.last_branch(),
            run_override: self.run_override,
            syncs_completed: self.syncs_completed,
            syncs_exhausted: self.syncs_exhausted,
            store_failures: self.store_failures,
        }
    }

    /// Whether the time source is stale.
    pub fn is_stale(&self) -> bool {
        match self.time.seconds_since_update() {
            Some(age) => !self.time.has_synced() || age > self.config.stale_after_seconds,
            None => true,
        }
    }

    /// Pending forced pulses on `line`.
    pub fn pending_forces(&self, line: Line) -> u8 {
        self.forces.pending(line)
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Signal lines.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Signal lines, mutably.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Time source.
    pub fn time(&self) -> &T {
        &self.time
    }

    /// Time source, mutably.
    pub fn time_mut(&mut self) -> &mut T {
        &mut self.time
    }

    /// Sync transport.
    pub fn transport(&self) -> &N {
        &self.transport
    }

    /// Sync transport, mutably.
    pub fn transport_mut(&mut self) -> &mut N {
        &mut self.transport
    }

    /// Position store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Position store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Take the collaborators back.
    pub fn into_parts(self) -> (O, T, N, S) {
        (self.output, self.time, self.transport, self.store)
    }

    fn persist_if_changed(&mut self) {
        let wall = self.drift.wall();
        if wall.known && self.last_saved != Some(wall.position) {
            self.save(wall.position);
        }
    }

    fn save(&mut self, position: CycleTime) -> bool {
        match self.store.save(position) {
            Ok(()) => {
                self.last_saved = Some(position);
                true
            }
            Err(e) => {
                warn!("saving clock face {} failed: {}", position, e);
                self.store_failures += 1;
                self.last_saved = None;
                false
            }
        }
    }
}
