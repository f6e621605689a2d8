// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The tick counter is the only state shared with an asynchronous source
//! (a timer interrupt on bare metal, a ticker thread on a host). It is
//! read through a [`CriticalSection`] so the disable/enable pair can never
//! be left unbalanced, and all durations are expressed as signed tick
//! deltas against a captured baseline so comparisons survive wraparound.

use core::sync::atomic::{AtomicU32, Ordering};

/// Counter cadence: one tick every 100 ms.
pub const TICKS_PER_SECOND: u32 = 10;

/// An opaque reading of the tick counter.
///
/// Only differences between ticks are meaningful. Differences are computed
/// with wrapping arithmetic and read back as `i32`, so any two ticks less
/// than 2^31 ticks (about 6.8 years) apart compare correctly.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Tick(u32);

impl Tick {
    /// Wrap a raw counter value.
    pub const fn from_raw(raw: u32) -> Self {
        Tick(raw)
    }

    /// The raw counter value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Signed number of ticks from `earlier` to `self`.
    pub const fn since(self, earlier: Tick) -> i32 {
        self.0.wrapping_sub(earlier.0) as i32
    }

    /// The tick `ticks` after this one.
    pub const fn after_ticks(self, ticks: u32) -> Tick {
        Tick(self.0.wrapping_add(ticks))
    }

    /// The tick `seconds` after this one.
    pub const fn after_seconds(self, seconds: u32) -> Tick {
        self.after_ticks(seconds.wrapping_mul(TICKS_PER_SECOND))
    }

    /// Whether this tick, taken as a deadline, is at or before `now`.
    pub const fn has_passed(self, now: Tick) -> bool {
        now.since(self) >= 0
    }
}

/// Anything that can report the current tick.
///
/// The provided methods are the timer operations used throughout the
/// firmware: `elapsed(t) = now - t`, `future(s) = now + s * 10`,
/// `expired(t) = elapsed(t) >= 0`.
pub trait TickSource {
    /// Current tick.
    fn now(&self) -> Tick;

    /// Ticks elapsed since `since` (negative if `since` is in the future).
    fn elapsed(&self, since: Tick) -> i32 {
        self.now().since(since)
    }

    /// A deadline `seconds` from now.
    fn future(&self, seconds: u32) -> Tick {
        self.now().after_seconds(seconds)
    }

    /// Whether `deadline` has been reached.
    fn expired(&self, deadline: Tick) -> bool {
        deadline.has_passed(self.now())
    }
}

/// Masks and unmasks the asynchronous source that advances the counter.
pub trait InterruptControl {
    /// Mask the tick source (`noInterrupts`).
    fn disable(&self);
    /// Unmask the tick source (`interrupts`).
    fn enable(&self);
}

/// Interrupt control for targets where an atomic load is sufficient.
#[derive(Clone, Copy, Debug, Default)]
pub struct AtomicOnly;

impl InterruptControl for AtomicOnly {
    fn disable(&self) {}
    fn enable(&self) {}
}

/// A scoped critical section. The tick source is masked on entry and
/// unmasked when the guard is dropped, including during unwinding.
#[derive(Debug)]
pub struct CriticalSection<'a, C: InterruptControl + ?Sized> {
    control: &'a C,
}

impl<'a, C: InterruptControl + ?Sized> CriticalSection<'a, C> {
    /// Mask the tick source until the returned guard is dropped.
    pub fn enter(control: &'a C) -> Self {
        control.disable();
        CriticalSection { control }
    }
}

impl<C: InterruptControl + ?Sized> Drop for CriticalSection<'_, C> {
    fn drop(&mut self) {
        self.control.enable();
    }
}

/// Run `f` with the tick source masked.
pub fn with_critical_section<C, R>(control: &C, f: impl FnOnce() -> R) -> R
where
    C: InterruptControl + ?Sized,
{
    let _guard = CriticalSection::enter(control);
    f()
}

/// The free-running counter advanced by the timing interrupt.
///
/// Suitable for a `static`:
///
/// ```
/// use masterclock_core::tick::{TickCounter, TickSource};
///
/// static TICKS: TickCounter = TickCounter::new();
///
/// // In the 100 ms timer interrupt:
/// TICKS.tick();
///
/// // In the main loop:
/// let now = TICKS.now();
/// assert_eq!(now.raw(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TickCounter<C: InterruptControl = AtomicOnly> {
    ticks: AtomicU32,
    control: C,
}

impl TickCounter<AtomicOnly> {
    /// A counter starting at zero, read with plain atomic loads.
    pub const fn new() -> Self {
        TickCounter {
            ticks: AtomicU32::new(0),
            control: AtomicOnly,
        }
    }
}

impl<C: InterruptControl> TickCounter<C> {
    /// A counter starting at zero whose reads mask the tick source via `control`.
    pub const fn with_control(control: C) -> Self {
        TickCounter {
            ticks: AtomicU32::new(0),
            control,
        }
    }

    /// Advance by one tick. Called from the interrupt (or ticker thread).
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the counter inside a critical section.
    pub fn read(&self) -> Tick {
        with_critical_section(&self.control, || {
            Tick(self.ticks.load(Ordering::Relaxed))
        })
    }
}

impl<C: InterruptControl> TickSource for TickCounter<C> {
    fn now(&self) -> Tick {
        self.read()
    }
}
