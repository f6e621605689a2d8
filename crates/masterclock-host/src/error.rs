// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Error types for the host collaborators.
//!
//! Setup APIs return [`HostError`]; it converts into `io::Error` for callers
//! that prefer `io::Result`. [`SntpError`] describes a rejected SNTP reply.
//! Rejected replies never reach the engine: the transport logs them and
//! keeps waiting.

use std::fmt;
use std::io;

use masterclock_core::error::{ConfigError, StoreError};

/// Errors raised while setting up or running the host side.
#[derive(Debug)]
pub enum HostError {
    /// Engine configuration rejected.
    Config(ConfigError),
    /// UTC offset outside +/- 24 h.
    InvalidUtcOffset(i32),
    /// Persistence failure.
    Store(StoreError),
    /// SNTP reply rejected.
    Sntp(SntpError),
    /// Underlying I/O error (socket bind, DNS resolution, file access).
    Io(io::Error),
}

/// Reasons an SNTP reply is rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SntpError {
    /// Fewer than 48 bytes.
    ResponseTooShort {
        /// Bytes received.
        received: usize,
    },
    /// Reply from an address the server name did not resolve to.
    UnexpectedSource,
    /// Mode other than server (4).
    UnexpectedMode(u8),
    /// Stratum 0 with a kiss code.
    KissOfDeath([u8; 4]),
    /// Origin timestamp does not echo our transmit timestamp.
    OriginMismatch,
    /// Server transmit timestamp is zero.
    ZeroTransmit,
    /// Leap indicator 3 with a non-zero stratum.
    Unsynchronized,
    /// A reply arrived with no request outstanding.
    Unsolicited,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Config(e) => write!(f, "configuration error: {e}"),
            HostError::InvalidUtcOffset(s) => write!(f, "invalid UTC offset: {s} seconds"),
            HostError::Store(e) => write!(f, "{e}"),
            HostError::Sntp(e) => write!(f, "SNTP error: {e}"),
            HostError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for SntpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SntpError::ResponseTooShort { received } => {
                write!(f, "response too short ({received} bytes)")
            }
            SntpError::UnexpectedSource => write!(f, "response from unexpected source address"),
            SntpError::UnexpectedMode(m) => {
                write!(f, "unexpected response mode {m} (expected Server)")
            }
            SntpError::KissOfDeath(code) => {
                write!(f, "Kiss-o'-Death {}", String::from_utf8_lossy(code))
            }
            SntpError::OriginMismatch => write!(
                f,
                "origin timestamp mismatch: response does not match our request"
            ),
            SntpError::ZeroTransmit => write!(f, "server transmit timestamp is zero"),
            SntpError::Unsynchronized => write!(f, "server reports unsynchronized clock"),
            SntpError::Unsolicited => write!(f, "response with no request outstanding"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::Config(e) => Some(e),
            HostError::Store(e) => Some(e),
            HostError::Sntp(e) => Some(e),
            HostError::Io(e) => Some(e),
            HostError::InvalidUtcOffset(_) => None,
        }
    }
}

impl std::error::Error for SntpError {}

impl From<HostError> for io::Error {
    fn from(err: HostError) -> io::Error {
        let kind = match &err {
            HostError::Config(_) | HostError::InvalidUtcOffset(_) => io::ErrorKind::InvalidInput,
            HostError::Store(_) | HostError::Sntp(_) => io::ErrorKind::InvalidData,
            HostError::Io(e) => e.kind(),
        };
        if let HostError::Io(e) = err {
            return e;
        }
        io::Error::new(kind, err)
    }
}

impl From<io::Error> for HostError {
    fn from(err: io::Error) -> HostError {
        HostError::Io(err)
    }
}

impl From<ConfigError> for HostError {
    fn from(err: ConfigError) -> HostError {
        HostError::Config(err)
    }
}

impl From<StoreError> for HostError {
    fn from(err: StoreError) -> HostError {
        HostError::Store(err)
    }
}

impl From<SntpError> for HostError {
    fn from(err: SntpError) -> HostError {
        HostError::Sntp(err)
    }
}
