// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Error types.
//!
//! None of these stop the clock. Sync and storage faults are absorbed by
//! the engine (logged, counted, shown on the activity LED); time entry and
//! configuration faults are returned to whoever supplied the input.
//!
//! All types are `no_std`-compatible. With the `std` feature they also
//! implement [`std::error::Error`] and convert to [`std::io::Error`].

use core::fmt;

/// A manual time entry that was rejected. The clock is not changed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimeEntryError {
    /// No digits were entered.
    Empty,
    /// A character other than a digit or `:`.
    InvalidCharacter(char),
    /// More digits than `mmss`.
    TooLong {
        /// Digits entered.
        len: usize,
    },
    /// A field outside `0..60`.
    OutOfRange {
        /// `"minutes"` or `"seconds"`.
        field: &'static str,
        /// Value entered.
        value: u32,
    },
}

impl fmt::Display for TimeEntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeEntryError::Empty => write!(f, "empty time entry"),
            TimeEntryError::InvalidCharacter(c) => {
                write!(f, "invalid character in time entry: {:?}", c)
            }
            TimeEntryError::TooLong { len } => {
                write!(f, "time entry too long: {} digits, at most 4", len)
            }
            TimeEntryError::OutOfRange { field, value } => {
                write!(f, "{} out of range: {}", field, value)
            }
        }
    }
}

/// A persistence failure. The position is treated as unknown.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// The backing store could not be opened or read.
    Unavailable,
    /// The store held no usable position.
    Corrupt,
    /// The position could not be written.
    WriteFailed,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "position store unavailable"),
            StoreError::Corrupt => write!(f, "position store corrupt"),
            StoreError::WriteFailed => write!(f, "position store write failed"),
        }
    }
}

/// A failed sync attempt. Always retried or deferred, never fatal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncError {
    /// The transport has no usable network.
    TransportUnavailable,
    /// The request could not be sent.
    SendFailed,
    /// No valid reply before the deadline.
    Timeout,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::TransportUnavailable => write!(f, "sync transport unavailable"),
            SyncError::SendFailed => write!(f, "sync request could not be sent"),
            SyncError::Timeout => write!(f, "sync response timed out"),
        }
    }
}

/// A configuration rejected by [`MasterClockBuilder::build()`](crate::MasterClockBuilder::build).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// A pulse make or break time of zero ticks.
    ZeroPulseDuration,
    /// A sync minute outside `0..60`.
    InvalidCronMinute(u8),
    /// A zero response timeout.
    ZeroTimeout,
    /// A fast-wait window of a whole cycle or more.
    FastWaitTooLong(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroPulseDuration => write!(f, "pulse durations must be non-zero"),
            ConfigError::InvalidCronMinute(m) => write!(f, "invalid sync minute: {}", m),
            ConfigError::ZeroTimeout => write!(f, "sync response timeout must be non-zero"),
            ConfigError::FastWaitTooLong(s) => {
                write!(f, "fast-wait window too long: {} seconds", s)
            }
        }
    }
}

#[cfg(feature = "std")]
impl From<TimeEntryError> for std::io::Error {
    fn from(err: TimeEntryError) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    }
}

#[cfg(feature = "std")]
impl From<StoreError> for std::io::Error {
    fn from(err: StoreError) -> std::io::Error {
        let kind = match err {
            StoreError::Unavailable => std::io::ErrorKind::NotFound,
            StoreError::Corrupt => std::io::ErrorKind::InvalidData,
            StoreError::WriteFailed => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}

#[cfg(feature = "std")]
impl From<SyncError> for std::io::Error {
    fn from(err: SyncError) -> std::io::Error {
        let kind = match err {
            SyncError::TransportUnavailable => std::io::ErrorKind::NotConnected,
            SyncError::SendFailed => std::io::ErrorKind::Other,
            SyncError::Timeout => std::io::ErrorKind::TimedOut,
        };
        std::io::Error::new(kind, err)
    }
}

#[cfg(feature = "std")]
impl From<ConfigError> for std::io::Error {
    fn from(err: ConfigError) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TimeEntryError {}

#[cfg(feature = "std")]
impl std::error::Error for StoreError {}

#[cfg(feature = "std")]
impl std::error::Error for SyncError {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_display_time_entry() {
        assert_eq!(
            TimeEntryError::OutOfRange {
                field: "seconds",
                value: 75
            }
            .to_string(),
            "seconds out of range: 75"
        );
        assert_eq!(
            TimeEntryError::InvalidCharacter('x').to_string(),
            "invalid character in time entry: 'x'"
        );
    }

    #[test]
    fn test_store_into_io_error() {
        let io_err: std::io::Error = StoreError::Corrupt.into();
        assert_eq!(io_err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_sync_timeout_into_io_error() {
        let io_err: std::io::Error = SyncError::Timeout.into();
        assert_eq!(io_err.kind(), std::io::ErrorKind::TimedOut);
        assert_eq!(io_err.to_string(), "sync response timed out");
    }

    #[test]
    fn test_config_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ConfigError::InvalidCronMinute(61));
        assert_eq!(err.to_string(), "invalid sync minute: 61");
    }
}
