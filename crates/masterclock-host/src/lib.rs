// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

/*!
`std` collaborators for running a `masterclock_core` engine on a hosted
system: a tick source, the system clock corrected by SNTP, a UDP SNTP
transport, file persistence, a console key parser and status writer, and
logging signal lines.

# Example

```rust,no_run
use masterclock_host::{HostConfig, assemble};
use masterclock_host::ticker::MonotonicTicks;
use masterclock_core::TickSource;

fn main() -> Result<(), masterclock_host::HostError> {
    let config = HostConfig::builder()
        .server("time.nist.gov:123")
        .store_path("/var/lib/masterclock/clockface.txt")
        .build()?;
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

/// Host configuration and its builder.
pub mod config;

/// Error types.
pub mod error;

/// Monotonic and thread-driven tick sources.
pub mod ticker;

/// System clock corrected by sync samples.
pub mod time_source;

/// UDP SNTP transport and packet codec.
pub mod sntp;

/// File-backed position store.
pub mod store;

/// Console key parser and status line.
pub mod console;

/// Logging signal lines.
pub mod output;

pub use config::HostConfig;
pub use error::{HostError, SntpError};
pub use output::SimulatedLines;
pub use sntp::SntpTransport;
pub use store::FileStore;
pub use time_source::{SystemTimeSource, Zone};

use masterclock_core::MasterClock;
use masterclock_core::traits::SignalLines;

/// An engine wired to the host collaborators.
pub type HostClock<O = SimulatedLines> = MasterClock<O, SystemTimeSource, SntpTransport, FileStore>;

/// Build an engine from `config` with simulated signal lines.
pub fn assemble(config: &HostConfig) -> Result<HostClock, HostError> {
    assemble_with(config, SimulatedLines::new())
}

/// Build an engine from `config` driving `output`.
pub fn assemble_with<O: SignalLines>(config: &HostConfig, output: O) -> Result<HostClock<O>, HostError> {
    let clock = MasterClock::builder().config(config.clock).build(
        output,
        SystemTimeSource::new(config.zone),
        SntpTransport::new(config.server.clone()),
        FileStore::with_threshold(config.store_path.clone(), config.rewrite_threshold),
    )?;
    Ok(clock)
}
