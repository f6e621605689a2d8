// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for integration tests.

// Integration test helpers are `pub` so each `tests/*.rs` file can import them
// via `mod common`, but not every file uses every helper.
#![allow(dead_code, unreachable_pub)]

use std::net::{SocketAddr, UdpSocket};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use masterclock_host::sntp::{NtpTimestamp, SntpReply, decode_reply, encode_reply};

/// What the local SNTP responder sends back.
#[derive(Clone, Copy, Debug)]
pub enum Reply {
    /// A well-formed stratum 1 reply reporting this Unix time.
    Valid { unix_seconds: i64 },
    /// Stratum 0 with the `RATE` kiss code.
    KissOfDeath,
    /// A valid reply whose origin does not echo the request.
    WrongOrigin { unix_seconds: i64 },
    /// Nothing at all.
    Silent,
}

/// A one-thread SNTP server on `127.0.0.1` answering every request the
/// same way. Stops after five idle seconds.
pub struct Responder {
    pub addr: SocketAddr,
    handle: JoinHandle<usize>,
}

impl Responder {
    pub fn start(reply: Reply) -> Responder {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let addr = socket.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let mut answered = 0;
            let mut buf = [0u8; 512];
            while let Ok((len, from)) = socket.recv_from(&mut buf) {
                let Ok(request) = decode_reply(&buf[..len]) else {
                    continue;
                };
                if let Some(bytes) = answer(reply, request.transmit) {
                    socket.send_to(&bytes, from).unwrap();
                    answered += 1;
                }
            }
            answered
        });
        Responder { addr, handle }
    }

    /// `host:port` for the transport.
    pub fn server(&self) -> String {
        self.addr.to_string()
    }

    /// Wait for the responder to go idle and return how many replies it sent.
    pub fn join(self) -> usize {
        self.handle.join().unwrap()
    }
}

fn answer(reply: Reply, t1: NtpTimestamp) -> Option<[u8; 48]> {
    let server = |unix_seconds: i64| NtpTimestamp::from_unix_nanos(i128::from(unix_seconds) * 1_000_000_000);
    let packet = match reply {
        Reply::Valid { unix_seconds } => SntpReply {
            leap: 0,
            version: 4,
            mode: 4,
            stratum: 1,
            reference_id: *b"GPS\0",
            origin: t1,
            receive: server(unix_seconds),
            transmit: server(unix_seconds),
        },
        Reply::KissOfDeath => SntpReply {
            version: 4,
            mode: 4,
            stratum: 0,
            reference_id: *b"RATE",
            origin: t1,
            transmit: server(1),
            ..SntpReply::default()
        },
        Reply::WrongOrigin { unix_seconds } => SntpReply {
            version: 4,
            mode: 4,
            stratum: 1,
            origin: NtpTimestamp {
                seconds: t1.seconds.wrapping_add(1),
                fraction: t1.fraction,
            },
            receive: server(unix_seconds),
            transmit: server(unix_seconds),
            ..SntpReply::default()
        },
        Reply::Silent => return None,
    };
    Some(encode_reply(&packet).unwrap())
}

/// A fresh path under the system temp directory.
pub fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("masterclock-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    path
}
