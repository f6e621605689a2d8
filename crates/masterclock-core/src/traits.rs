// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The engine's view of the outside world.
//!
//! Every method is expected to return promptly: the engine calls them from
//! its single cooperative service routine.

use crate::cycle::CycleTime;
use crate::error::{StoreError, SyncError};
use crate::signal::SignalLevels;
use crate::sync::SyncTimestamp;

/// Digital outputs and inputs wired to the movement.
pub trait SignalLines {
    /// Put every line at the given level.
    fn drive(&mut self, levels: SignalLevels);

    /// Set the status LED.
    fn set_indicator(&mut self, _on: bool) {}

    /// Run override switch. Default: not fitted.
    fn run_switch(&self) -> bool {
        false
    }

    /// Movement supply sense. Default: not fitted, always present.
    fn power_present(&self) -> bool {
        true
    }
}

/// Authoritative time of day.
pub trait TimeSource {
    /// Current time on the twelve-hour dial.
    fn now(&self) -> CycleTime;

    /// Whether a sync sample has ever been applied.
    fn has_synced(&self) -> bool;

    /// Seconds since the last applied sample, `None` if never.
    fn seconds_since_update(&self) -> Option<u32>;

    /// Apply a sample from the sync transport.
    fn apply(&mut self, sample: SyncTimestamp);
}

/// Time-sync exchange with a remote server. At most one request is
/// outstanding at a time.
pub trait SyncTransport {
    /// Whether a request can be sent now.
    fn is_ready(&self) -> bool;

    /// Send one request.
    fn send_request(&mut self) -> Result<(), SyncError>;

    /// Check for a reply without blocking. Invalid replies are dropped by
    /// the transport and read as `None`.
    fn poll_response(&mut self) -> Option<SyncTimestamp>;
}

/// Storage for the wall-clock position.
pub trait PositionStore {
    /// The last saved position, `None` if nothing was ever saved.
    fn load(&mut self) -> Result<Option<CycleTime>, StoreError>;

    /// Save a position.
    fn save(&mut self, position: CycleTime) -> Result<(), StoreError>;
}

impl<T: SignalLines + ?Sized> SignalLines for &mut T {
    fn drive(&mut self, levels: SignalLevels) {
        (**self).drive(levels)
    }
    fn set_indicator(&mut self, on: bool) {
        (**self).set_indicator(on)
    }
    fn run_switch(&self) -> bool {
        (**self).run_switch()
    }
    fn power_present(&self) -> bool {
        (**self).power_present()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &mut T {
    fn now(&self) -> CycleTime {
        (**self).now()
    }
    fn has_synced(&self) -> bool {
        (**self).has_synced()
    }
    fn seconds_since_update(&self) -> Option<u32> {
        (**self).seconds_since_update()
    }
    fn apply(&mut self, sample: SyncTimestamp) {
        (**self).apply(sample)
    }
}

impl<T: SyncTransport + ?Sized> SyncTransport for &mut T {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
    fn send_request(&mut self) -> Result<(), SyncError> {
        (**self).send_request()
    }
    fn poll_response(&mut self) -> Option<SyncTimestamp> {
        (**self).poll_response()
    }
}

impl<T: PositionStore + ?Sized> PositionStore for &mut T {
    fn load(&mut self) -> Result<Option<CycleTime>, StoreError> {
        (**self).load()
    }
    fn save(&mut self, position: CycleTime) -> Result<(), StoreError> {
        (**self).save(position)
    }
}
