// Master clock daemon example demonstrating:
// - The cooperative service loop on a 100 ms tick
// - SNTP sync, file persistence and simulated signal lines
// - Console commands read from stdin on a helper thread
// - Structured tracing with EnvFilter for RUST_LOG support
//
// Run with:
//   RUST_LOG=info cargo run -p masterclock-host --example daemon -- pool.ntp.org:123 clockface.txt
//
// Type A, B or C then Enter to force pulses, S to sync, R to toggle the run
// override, or a time such as 12:34 then Enter to tell the clock what the
// dial shows.

use std::io::{self, Read};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use masterclock_core::TickSource;
use masterclock_host::console::{ConsoleAction, KeyParser, StatusWriter};
use masterclock_host::ticker::InterruptTicker;
use masterclock_host::{HostConfig, assemble};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let mut builder = HostConfig::builder();
    if let Some(server) = args.next() {
        builder = builder.server(server);
    }
    if let Some(path) = args.next() {
        builder = builder.store_path(path);
    }
    let config = builder.build()?;

    info!(
        server = %config.server,
        store = %config.store_path.display(),
        "master clock starting"
    );

    let mut clock = assemble(&config)?;
    match clock.start() {
        Some(position) => info!(position = %position, "dial position restored"),
        None => info!("dial position unknown until first sync"),
    }

    let (keys_tx, keys_rx) = mpsc::channel();
    thread::Builder::new().name("console".into()).spawn(move || {
        for byte in io::stdin().bytes() {
            let Ok(byte) = byte else { break };
            if keys_tx.send(byte).is_err() {
                break;
            }
        }
    })?;

    let ticker = InterruptTicker::spawn()?;
    let mut parser = KeyParser::new();
    let mut status = StatusWriter::new(io::stdout());

    loop {
        while let Ok(key) = keys_rx.try_recv() {
            match parser.key(key) {
                Some(ConsoleAction::Command(command)) => {
                    if let Err(e) = clock.execute(command) {
                        warn!(error = %e, "command could not be saved");
                    }
                    status.note(&format!("{command:?}"))?;
                }
                Some(ConsoleAction::Rejected(e)) => status.note(&format!("rejected: {e}"))?,
                Some(ConsoleAction::Cancelled) => status.note("cancelled")?,
                None => {}
            }
        }

        let report = clock.service(ticker.now());
        status.record(&report, &clock.status())?;
        thread::sleep(Duration::from_millis(10));
    }
}
