// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Non-blocking SNTP transport.
//!
//! Sends a 48-byte NTPv4 client request over UDP and validates the reply
//! before handing a sample to the engine. A reply is accepted only if it
//! comes from the resolved server, is at least 48 bytes, is in server
//! mode, is not a Kiss-o'-Death, echoes our transmit timestamp, carries a
//! non-zero transmit timestamp and does not report an unsynchronized
//! clock. The sample is the server transmit time plus half the round-trip
//! delay.

use std::cell::{Cell, RefCell};
use std::io::{self, Cursor};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use byteorder::{BE, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use masterclock_core::error::SyncError;
use masterclock_core::sync::SyncTimestamp;
use masterclock_core::traits::SyncTransport;
use tracing::{debug, info, warn};

use crate::error::SntpError;

/// Size of an NTP header without extensions.
pub const PACKET_SIZE: usize = 48;

/// Seconds from 1900-01-01 to 1970-01-01.
const NTP_UNIX_OFFSET: i64 = 2_208_988_800;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// LI = 0, VN = 4, Mode = 3 (client).
const CLIENT_REQUEST_FLAGS: u8 = (4 << 3) | 3;

const MODE_SERVER: u8 = 4;
const LEAP_UNSYNCHRONIZED: u8 = 3;

/// How long to wait before retrying name resolution.
const RESOLVE_RETRY: Duration = Duration::from_secs(10);

/// A 64-bit NTP timestamp.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct NtpTimestamp {
    /// Seconds since the era epoch.
    pub seconds: u32,
    /// Fraction of a second in units of 2^-32 s.
    pub fraction: u32,
}

impl NtpTimestamp {
    /// Timestamp for a count of nanoseconds since the Unix epoch.
    pub fn from_unix_nanos(nanos: i128) -> Self {
        let secs = nanos.div_euclid(NANOS_PER_SECOND);
        let sub = nanos.rem_euclid(NANOS_PER_SECOND) as u64;
        NtpTimestamp {
            seconds: (secs + i128::from(NTP_UNIX_OFFSET)) as u32,
            fraction: ((sub << 32) / NANOS_PER_SECOND as u64) as u32,
        }
    }

    /// Nanoseconds since the Unix epoch. Seconds values with the top bit
    /// clear are taken to be in era 1 (from 2036).
    pub fn to_unix_nanos(self) -> i128 {
        let mut secs = i64::from(self.seconds) - NTP_UNIX_OFFSET;
        if self.seconds & 0x8000_0000 == 0 {
            secs += 1 << 32;
        }
        let sub = (u64::from(self.fraction) * NANOS_PER_SECOND as u64) >> 32;
        i128::from(secs) * NANOS_PER_SECOND + i128::from(sub)
    }

    /// Timestamp for a UTC instant.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::from_unix_nanos(unix_nanos(dt))
    }

    /// Whether both halves are zero.
    pub fn is_zero(self) -> bool {
        self.seconds == 0 && self.fraction == 0
    }
}

/// The header fields of a reply that the transport looks at.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SntpReply {
    /// Leap indicator.
    pub leap: u8,
    /// Version number.
    pub version: u8,
    /// Association mode.
    pub mode: u8,
    /// Stratum.
    pub stratum: u8,
    /// Reference identifier (kiss code when stratum is 0).
    pub reference_id: [u8; 4],
    /// T1 as echoed by the server.
    pub origin: NtpTimestamp,
    /// T2, server receive time.
    pub receive: NtpTimestamp,
    /// T3, server transmit time.
    pub transmit: NtpTimestamp,
}

fn unix_nanos(dt: DateTime<Utc>) -> i128 {
    i128::from(dt.timestamp()) * NANOS_PER_SECOND + i128::from(dt.timestamp_subsec_nanos())
}

fn write_timestamp(w: &mut impl WriteBytesExt, ts: NtpTimestamp) -> io::Result<()> {
    w.write_u32::<BE>(ts.seconds)?;
    w.write_u32::<BE>(ts.fraction)
}

fn read_timestamp(r: &mut impl ReadBytesExt) -> io::Result<NtpTimestamp> {
    let seconds = r.read_u32::<BE>()?;
    let fraction = r.read_u32::<BE>()?;
    Ok(NtpTimestamp { seconds, fraction })
}

/// Serialize a client request carrying `transmit` as T1.
pub fn encode_request(transmit: NtpTimestamp) -> io::Result<[u8; PACKET_SIZE]> {
    let mut buf = [0u8; PACKET_SIZE];
    let mut w = Cursor::new(&mut buf[..]);
    w.write_u8(CLIENT_REQUEST_FLAGS)?;
    // Stratum, poll, precision, root delay, root dispersion, reference id,
    // reference, origin and receive timestamps are all zero.
    w.set_position(40);
    write_timestamp(&mut w, transmit)?;
    Ok(buf)
}

/// Serialize a reply. Used by test responders.
pub fn encode_reply(reply: &SntpReply) -> io::Result<[u8; PACKET_SIZE]> {
    let mut buf = [0u8; PACKET_SIZE];
    let mut w = Cursor::new(&mut buf[..]);
    w.write_u8((reply.leap << 6) | ((reply.version & 7) << 3) | (reply.mode & 7))?;
    w.write_u8(reply.stratum)?;
    w.set_position(12);
    for b in reply.reference_id {
        w.write_u8(b)?;
    }
    w.set_position(24);
    write_timestamp(&mut w, reply.origin)?;
    write_timestamp(&mut w, reply.receive)?;
    write_timestamp(&mut w, reply.transmit)?;
    Ok(buf)
}

/// Parse the header of a reply.
pub fn decode_reply(buf: &[u8]) -> Result<SntpReply, SntpError> {
    if buf.len() < PACKET_SIZE {
        return Err(SntpError::ResponseTooShort {
            received: buf.len(),
        });
    }
    let too_short = |_| SntpError::ResponseTooShort {
        received: buf.len(),
    };
    let mut r = Cursor::new(&buf[..PACKET_SIZE]);
    let flags = r.read_u8().map_err(too_short)?;
    let stratum = r.read_u8().map_err(too_short)?;
    r.set_position(12);
    let mut reference_id = [0u8; 4];
    for b in &mut reference_id {
        *b = r.read_u8().map_err(too_short)?;
    }
    r.set_position(24);
    let origin = read_timestamp(&mut r).map_err(too_short)?;
    let receive = read_timestamp(&mut r).map_err(too_short)?;
    let transmit = read_timestamp(&mut r).map_err(too_short)?;
    Ok(SntpReply {
        leap: flags >> 6,
        version: (flags >> 3) & 7,
        mode: flags & 7,
        stratum,
        reference_id,
        origin,
        receive,
        transmit,
    })
}

/// Check a reply against the request it answers.
pub fn validate_reply(reply: &SntpReply, t1: NtpTimestamp) -> Result<(), SntpError> {
    if reply.mode != MODE_SERVER {
        return Err(SntpError::UnexpectedMode(reply.mode));
    }
    if reply.stratum == 0 {
        return Err(SntpError::KissOfDeath(reply.reference_id));
    }
    if reply.transmit.is_zero() {
        return Err(SntpError::ZeroTransmit);
    }
    if reply.leap == LEAP_UNSYNCHRONIZED {
        return Err(SntpError::Unsynchronized);
    }
    if reply.origin != t1 {
        return Err(SntpError::OriginMismatch);
    }
    Ok(())
}

/// Server time at T4: T3 plus half the round-trip delay.
pub fn sample_time(reply: &SntpReply, t1: NtpTimestamp, t4: NtpTimestamp) -> SyncTimestamp {
    let t1 = t1.to_unix_nanos();
    let t2 = reply.receive.to_unix_nanos();
    let t3 = reply.transmit.to_unix_nanos();
    let t4 = t4.to_unix_nanos();
    let delay = ((t4 - t1) - (t3 - t2)).max(0);
    let at = t3 + delay / 2;
    SyncTimestamp {
        unix_seconds: at.div_euclid(NANOS_PER_SECOND) as i64,
        nanos: at.rem_euclid(NANOS_PER_SECOND) as u32,
    }
}

/// Wildcard bind address in the family of `target`.
fn bind_addr_for(target: &SocketAddr) -> SocketAddr {
    match target {
        SocketAddr::V4(_) => SocketAddr::from(([0, 0, 0, 0], 0)),
        SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
    }
}

#[derive(Debug)]
struct Connection {
    socket: UdpSocket,
    peers: Vec<SocketAddr>,
}

impl Connection {
    fn open(server: &str) -> io::Result<Self> {
        let peers: Vec<SocketAddr> = server.to_socket_addrs()?.collect();
        let first = peers.first().copied().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "address resolved to no socket addresses",
            )
        })?;
        let peers: Vec<SocketAddr> = peers
            .into_iter()
            .filter(|a| a.is_ipv4() == first.is_ipv4())
            .collect();
        let socket = UdpSocket::bind(bind_addr_for(&first))?;
        socket.set_nonblocking(true)?;
        Ok(Connection { socket, peers })
    }
}

/// [`SyncTransport`] over UDP.
///
/// Ready once the server name has resolved and a socket is bound; a
/// failed resolution is retried at most every ten seconds.
#[derive(Debug)]
pub struct SntpTransport {
    server: String,
    connection: RefCell<Option<Connection>>,
    next_resolve: Cell<Option<Instant>>,
    pending: Option<NtpTimestamp>,
    clock: fn() -> DateTime<Utc>,
}

impl SntpTransport {
    /// Transport for `server` (`host:port`). Resolution is attempted now
    /// and again on demand.
    pub fn new(server: impl Into<String>) -> Self {
        Self::with_clock(server, Utc::now)
    }

    /// Transport that timestamps with `clock` instead of the system clock.
    pub fn with_clock(server: impl Into<String>, clock: fn() -> DateTime<Utc>) -> Self {
        let transport = SntpTransport {
            server: server.into(),
            connection: RefCell::new(None),
            next_resolve: Cell::new(None),
            pending: None,
            clock,
        };
        transport.try_connect();
        transport
    }

    /// Server name.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Local address of the socket, once bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.connection
            .borrow()
            .as_ref()
            .and_then(|c| c.socket.local_addr().ok())
    }

    fn try_connect(&self) -> bool {
        if self.connection.borrow().is_some() {
            return true;
        }
        if let Some(at) = self.next_resolve.get()
            && Instant::now() < at
        {
            return false;
        }
        match Connection::open(&self.server) {
            Ok(conn) => {
                info!(server = %self.server, peer = %conn.peers[0], "SNTP transport ready");
                *self.connection.borrow_mut() = Some(conn);
                true
            }
            Err(e) => {
                warn!(server = %self.server, error = %e, "SNTP server not reachable");
                self.next_resolve.set(Some(Instant::now() + RESOLVE_RETRY));
                false
            }
        }
    }

    fn now(&self) -> NtpTimestamp {
        NtpTimestamp::from_datetime((self.clock)())
    }

    fn accept(&mut self, datagram: &[u8], from: SocketAddr, peers: &[SocketAddr]) -> Result<SyncTimestamp, SntpError> {
        let t4 = self.now();
        let t1 = self.pending.ok_or(SntpError::Unsolicited)?;
        if !peers.iter().any(|p| p.ip() == from.ip()) {
            return Err(SntpError::UnexpectedSource);
        }
        let reply = decode_reply(datagram)?;
        validate_reply(&reply, t1)?;
        self.pending = None;
        Ok(sample_time(&reply, t1, t4))
    }
}

impl SyncTransport for SntpTransport {
    fn is_ready(&self) -> bool {
        self.try_connect()
    }

    fn send_request(&mut self) -> Result<(), SyncError> {
        let t1 = self.now();
        let buf = encode_request(t1).map_err(|_| SyncError::SendFailed)?;
        let conn = self.connection.get_mut();
        let Some(conn) = conn.as_ref() else {
            return Err(SyncError::TransportUnavailable);
        };
        let peer = conn.peers[0];
        match conn.socket.send_to(&buf, peer) {
            Ok(_) => {
                debug!(peer = %peer, "SNTP request sent");
                self.pending = Some(t1);
                Ok(())
            }
            Err(e) => {
                warn!(peer = %peer, error = %e, "SNTP send failed");
                Err(SyncError::SendFailed)
            }
        }
    }

    fn poll_response(&mut self) -> Option<SyncTimestamp> {
        let mut buf = [0u8; 512];
        loop {
            let received = {
                let conn = self.connection.get_mut().as_ref()?;
                conn.socket
                    .recv_from(&mut buf)
                    .map(|(len, from)| (len, from, conn.peers.clone()))
            };
            match received {
                Ok((len, from, peers)) => match self.accept(&buf[..len], from, &peers) {
                    Ok(sample) => {
                        debug!(
                            unix_seconds = sample.unix_seconds,
                            nanos = sample.nanos,
                            "SNTP reply accepted"
                        );
                        return Some(sample);
                    }
                    Err(e) => warn!(from = %from, error = %e, "SNTP reply rejected"),
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return None,
                Err(e) => {
                    warn!(error = %e, "SNTP receive failed");
                    return None;
                }
            }
        }
    }
}
