// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

/*!
Master clock firmware for impulse secondary clock movements.

The engine and its state machines live in [`masterclock_core`] and are
re-exported at the crate root. The `std` collaborators for running on a
hosted system live in [`masterclock_host`], re-exported as [`host`].

# Example

```rust,no_run
use masterclock::TickSource;
use masterclock::host::{HostConfig, assemble, ticker::MonotonicTicks};

fn main() -> Result<(), masterclock::host::HostError> {
    let config = HostConfig::builder().utc_offset_seconds(0).build()?;
    let mut clock = assemble(&config)?;
    clock.start();
    let ticks = MonotonicTicks::new();
    loop {
        clock.service(ticks.now());
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
}
```
*/

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub use masterclock_core::*;

/// Hosted collaborators: SNTP, file persistence, console and tick sources.
pub use masterclock_host as host;
