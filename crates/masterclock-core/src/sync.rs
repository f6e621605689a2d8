// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Time-sync session.
//!
//! ```text
//!          minute == cron_minute              transport ready
//!   Idle ───────────────────────▶ Cron ──▶ Request ─────────────▶ Response
//!    ▲  manual trigger                ▲        ▲   timeout, retries left  │
//!    │ ─────────────────▶ OneShot ────┘        └──────────────────────────┤
//!    │                                                                    │ reply, or
//!    └──────────── guard expired ──── Completed ◀──────────────────────────┘ retries exhausted
//! ```
//!
//! `Cron` arms a retry budget and a guard deadline so the same hourly
//! window cannot start a second session. `OneShot` arms a smaller budget
//! and leaves the guard alone. Each [`NtpSession::step()`] makes at most
//! one transition, so at most one request is ever outstanding.

use log::{debug, info, warn};

use crate::error::SyncError;
use crate::tick::Tick;
use crate::traits::SyncTransport;

/// Session timing and retry budgets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SyncPolicy {
    /// Minute of the hour that starts the automatic session. Default 58.
    pub cron_minute: u8,
    /// Retries after the first attempt of an automatic session. Default 30.
    pub cron_retries: u8,
    /// Retries after the first attempt of a manual session. Default 4.
    pub oneshot_retries: u8,
    /// Guard window armed by an automatic session, in seconds. Default 900.
    pub guard_seconds: u32,
    /// Wait for a reply before retrying, in seconds. Default 10.
    pub response_timeout_seconds: u32,
    /// Trigger a manual session when the engine starts. Default `true`.
    pub sync_on_start: bool,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        SyncPolicy {
            cron_minute: 58,
            cron_retries: 30,
            oneshot_retries: 4,
            guard_seconds: 15 * 60,
            response_timeout_seconds: 10,
            sync_on_start: true,
        }
    }
}

/// A time sample returned by the transport.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SyncTimestamp {
    /// Seconds since the Unix epoch, UTC.
    pub unix_seconds: i64,
    /// Fraction of the second, in nanoseconds.
    pub nanos: u32,
}

/// Session state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SyncState {
    /// Waiting for the hourly window or a manual trigger.
    #[default]
    Idle,
    /// Automatic session starting.
    Cron,
    /// Manual session starting.
    OneShot,
    /// Waiting for the transport to accept a request.
    Request,
    /// Request sent; waiting for a reply until `deadline`.
    Response {
        /// Tick at which the attempt times out.
        deadline: Tick,
    },
    /// Session over; waiting for the guard window to close.
    Completed,
}

/// Something observable that happened during a step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncEvent {
    /// A session began.
    Started {
        /// Manual rather than hourly.
        oneshot: bool,
    },
    /// A request went out. `attempt` counts from 1 within the session.
    RequestSent {
        /// Attempt number.
        attempt: u32,
    },
    /// The transport was not ready; the request is deferred.
    TransportNotReady,
    /// An attempt failed and another will be made.
    Retrying {
        /// Retries left after this one.
        remaining: u8,
        /// What went wrong.
        cause: SyncError,
    },
    /// A valid reply arrived.
    Synced(SyncTimestamp),
    /// The last attempt failed; the session is over without a sample.
    Exhausted(SyncError),
    /// The guard window closed; the session is back to idle.
    GuardExpired,
}

/// The time-sync session state machine.
#[derive(Debug)]
pub struct NtpSession {
    state: SyncState,
    policy: SyncPolicy,
    retries: u8,
    attempt: u32,
    guard_deadline: Option<Tick>,
    manual_pending: bool,
    deferred: bool,
}

impl NtpSession {
    /// Idle session.
    pub fn new(policy: SyncPolicy) -> Self {
        NtpSession {
            state: SyncState::Idle,
            policy,
            retries: 0,
            attempt: 0,
            guard_deadline: None,
            manual_pending: false,
            deferred: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Policy in use.
    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    /// Retries left in the current session.
    pub fn retries_remaining(&self) -> u8 {
        self.retries
    }

    /// Whether a manual trigger is waiting to start.
    pub fn trigger_pending(&self) -> bool {
        self.manual_pending
    }

    /// Request a manual session. Starts from `Idle` or `Completed` without
    /// regard to the guard window; a session already in progress finishes
    /// first.
    pub fn trigger(&mut self) {
        self.manual_pending = true;
    }

    /// Make at most one transition.
    pub fn step<T>(&mut self, now: Tick, minute: u32, transport: &mut T) -> Option<SyncEvent>
    where
        T: SyncTransport + ?Sized,
    {
        match self.state {
            SyncState::Idle => {
                if self.manual_pending {
                    self.start_oneshot()
                } else if minute == u32::from(self.policy.cron_minute) {
                    self.enter(SyncState::Cron);
                    Some(SyncEvent::Started { oneshot: false })
                } else {
                    None
                }
            }
            SyncState::Cron => {
                self.retries = self.policy.cron_retries;
                self.attempt = 0;
                self.guard_deadline = Some(now.after_seconds(self.policy.guard_seconds));
                self.enter(SyncState::Request);
                None
            }
            SyncState::OneShot => {
                self.retries = self.policy.oneshot_retries;
                self.attempt = 0;
                self.enter(SyncState::Request);
                None
            }
            SyncState::Request => {
                if !transport.is_ready() {
                    if self.deferred {
                        return None;
                    }
                    self.deferred = true;
                    debug!("sync deferred: transport not ready");
                    return Some(SyncEvent::TransportNotReady);
                }
                self.deferred = false;
                self.attempt += 1;
                match transport.send_request() {
                    Ok(()) => {
                        let deadline = now.after_seconds(self.policy.response_timeout_seconds);
                        self.enter(SyncState::Response { deadline });
                        Some(SyncEvent::RequestSent {
                            attempt: self.attempt,
                        })
                    }
                    Err(e) => Some(self.attempt_failed(e)),
                }
            }
            SyncState::Response { deadline } => {
                if let Some(ts) = transport.poll_response() {
                    info!(
                        "sync complete after {} attempt(s): {}.{:09}",
                        self.attempt, ts.unix_seconds, ts.nanos
                    );
                    self.enter(SyncState::Completed);
                    Some(SyncEvent::Synced(ts))
                } else if deadline.has_passed(now) {
                    Some(self.attempt_failed(SyncError::Timeout))
                } else {
                    None
                }
            }
            SyncState::Completed => {
                if self.manual_pending {
                    self.start_oneshot()
                } else if self.guard_deadline.is_none_or(|g| g.has_passed(now)) {
                    self.guard_deadline = None;
                    self.enter(SyncState::Idle);
                    Some(SyncEvent::GuardExpired)
                } else {
                    None
                }
            }
        }
    }

    fn start_oneshot(&mut self) -> Option<SyncEvent> {
        self.manual_pending = false;
        self.enter(SyncState::OneShot);
        Some(SyncEvent::Started { oneshot: true })
    }

    fn attempt_failed(&mut self, cause: SyncError) -> SyncEvent {
        if self.retries > 0 {
            self.retries -= 1;
            debug!(
                "sync attempt {} failed ({cause}), {} retries left",
                self.attempt, self.retries
            );
            self.enter(SyncState::Request);
            SyncEvent::Retrying {
                remaining: self.retries,
                cause,
            }
        } else {
            warn!("sync gave up after {} attempts: {cause}", self.attempt);
            self.enter(SyncState::Completed);
            SyncEvent::Exhausted(cause)
        }
    }

    fn enter(&mut self, next: SyncState) {
        if core::mem::discriminant(&self.state) != core::mem::discriminant(&next) {
            debug!("sync {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }
}
