// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Core state machines for a master clock driving an impulse secondary
//! clock movement.
//!
//! A secondary movement has no timekeeping of its own: it steps forward
//! when the master asserts its signal lines. This crate decides which
//! lines to assert and when, so that the dial stays on the time obtained
//! from a network time service. Everything here is `no_std` and
//! allocation-free; the hardware, network and storage sides are supplied
//! by the caller through the traits in [`traits`].
//!
//! Each call to [`MasterClock::service()`] advances, in order:
//!
//! 1. the time-sync session ([`sync`]),
//! 2. the drift reconciler ([`drift`]), which consults the signal policy
//!    ([`signal`]) when a new pulse cycle may begin,
//! 3. the pulse protocol ([`pulse`]),
//! 4. the activity indicator ([`activity`]).
//!
//! No step blocks. All relative timing uses the 100 ms [`tick::Tick`].
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std` | yes | `std::error::Error` impls and `io::Error` conversions for the error types. |

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Monotonic tick counter, scoped critical sections and relative timers.
pub mod tick;

/// Seconds-within-cycle arithmetic for the twelve-hour dial.
pub mod cycle;

/// Pure mapping from time of day to signal-line levels, plus one-shot
/// operator force requests.
pub mod signal;

/// Make/break pulse state machine.
pub mod pulse;

/// Reconciliation of the displayed position against authoritative time.
pub mod drift;

/// Hourly and manual time-sync session with retry and guard window.
pub mod sync;

/// Non-blocking status LED flasher.
pub mod activity;

/// Operator commands and manual time entry.
pub mod control;

/// Validated configuration for the engine.
pub mod config;

/// Error types for configuration, input, storage and sync faults.
pub mod error;

/// Collaborator traits: signal lines, time source, sync transport, storage.
pub mod traits;

/// The engine context that owns every state machine and collaborator.
pub mod engine;

pub use config::ClockConfig;
pub use cycle::CycleTime;
pub use engine::{MasterClock, MasterClockBuilder, ServiceReport, Status};
pub use signal::{Line, SignalLevels};
pub use tick::{Tick, TickSource};
