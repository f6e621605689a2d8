// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Tick sources for a hosted engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use masterclock_core::tick::{TICKS_PER_SECOND, Tick, TickCounter, TickSource};
use tracing::debug;

/// Length of one tick.
pub const TICK_PERIOD: Duration = Duration::from_millis(1000 / TICKS_PER_SECOND as u64);

/// Ticks derived from [`Instant`]. Wraps like a hardware counter.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicTicks {
    origin: Instant,
}

impl MonotonicTicks {
    /// Counter starting at zero now.
    pub fn new() -> Self {
        MonotonicTicks {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MonotonicTicks {
    fn now(&self) -> Tick {
        let ticks = self.origin.elapsed().as_millis() / TICK_PERIOD.as_millis();
        Tick::from_raw(ticks as u32)
    }
}

/// A background thread incrementing a shared [`TickCounter`] every
/// [`TICK_PERIOD`], standing in for a timer interrupt.
///
/// The thread is stopped and joined on drop.
#[derive(Debug)]
pub struct InterruptTicker {
    counter: Arc<TickCounter>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InterruptTicker {
    /// Start ticking.
    pub fn spawn() -> std::io::Result<Self> {
        let counter = Arc::new(TickCounter::new());
        let stop = Arc::new(AtomicBool::new(false));
        let handle = thread::Builder::new().name("masterclock-tick".into()).spawn({
            let counter = Arc::clone(&counter);
            let stop = Arc::clone(&stop);
            move || {
                let mut next = Instant::now() + TICK_PERIOD;
                while !stop.load(Ordering::Relaxed) {
                    let now = Instant::now();
                    if now < next {
                        thread::sleep(next - now);
                    }
                    counter.tick();
                    next += TICK_PERIOD;
                }
            }
        })?;
        debug!("tick thread started");
        Ok(InterruptTicker {
            counter,
            stop,
            handle: Some(handle),
        })
    }

    /// The shared counter.
    pub fn counter(&self) -> Arc<TickCounter> {
        Arc::clone(&self.counter)
    }
}

impl TickSource for InterruptTicker {
    fn now(&self) -> Tick {
        self.counter.read()
    }
}

impl Drop for InterruptTicker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_starts_near_zero() {
        let ticks = MonotonicTicks::new();
        assert!(ticks.now().raw() <= 1);
    }

    #[test]
    fn test_interrupt_ticker_advances() {
        let ticker = InterruptTicker::spawn().unwrap();
        let start = ticker.now();
        thread::sleep(Duration::from_millis(450));
        let elapsed = ticker.elapsed(start);
        assert!((2..=6).contains(&elapsed), "elapsed {elapsed} ticks");
    }

    #[test]
    fn test_drop_stops_thread() {
        let ticker = InterruptTicker::spawn().unwrap();
        let counter = ticker.counter();
        drop(ticker);
        let frozen = counter.read();
        thread::sleep(Duration::from_millis(250));
        assert_eq!(counter.read(), frozen);
    }
}
