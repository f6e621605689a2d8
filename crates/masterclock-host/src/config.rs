// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Host configuration.

use std::path::PathBuf;

use chrono::FixedOffset;
use masterclock_core::ClockConfig;

use crate::error::HostError;
use crate::time_source::Zone;

/// Default SNTP server.
pub const DEFAULT_SERVER: &str = "pool.ntp.org:123";

/// Default position file.
pub const DEFAULT_STORE_PATH: &str = "clockface.txt";

/// Size past which the position file is rewritten instead of appended to.
pub const DEFAULT_REWRITE_THRESHOLD: u64 = 4000;

/// Everything the host side needs to run an engine.
#[derive(Clone, Debug)]
pub struct HostConfig {
    /// SNTP server, `host:port`.
    pub server: String,
    /// Position file.
    pub store_path: PathBuf,
    /// Zone the dial shows.
    pub zone: Zone,
    /// Position file rewrite threshold in bytes.
    pub rewrite_threshold: u64,
    /// Engine configuration.
    pub clock: ClockConfig,
}

impl HostConfig {
    /// Builder with the defaults.
    pub fn builder() -> HostConfigBuilder {
        HostConfigBuilder::new()
    }
}

/// Builder for [`HostConfig`].
#[derive(Clone, Debug)]
pub struct HostConfigBuilder {
    server: String,
    store_path: PathBuf,
    utc_offset_seconds: Option<i32>,
    rewrite_threshold: u64,
    clock: ClockConfig,
}

impl HostConfigBuilder {
    fn new() -> Self {
        HostConfigBuilder {
            server: DEFAULT_SERVER.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            utc_offset_seconds: None,
            rewrite_threshold: DEFAULT_REWRITE_THRESHOLD,
            clock: ClockConfig::default(),
        }
    }

    /// SNTP server address (hostname:port or ip:port).
    pub fn server(mut self, addr: impl Into<String>) -> Self {
        self.server = addr.into();
        self
    }

    /// Position file path.
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Fixed UTC offset for the dial, east positive. Default: the system
    /// local zone.
    pub fn utc_offset_seconds(mut self, seconds: i32) -> Self {
        self.utc_offset_seconds = Some(seconds);
        self
    }

    /// Position file rewrite threshold in bytes.
    pub fn rewrite_threshold(mut self, bytes: u64) -> Self {
        self.rewrite_threshold = bytes;
        self
    }

    /// Engine configuration.
    pub fn clock(mut self, clock: ClockConfig) -> Self {
        self.clock = clock;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<HostConfig, HostError> {
        self.clock.validate()?;
        let zone = match self.utc_offset_seconds {
            None => Zone::Local,
            Some(s) => Zone::Fixed(FixedOffset::east_opt(s).ok_or(HostError::InvalidUtcOffset(s))?),
        };
        Ok(HostConfig {
            server: self.server,
            store_path: self.store_path,
            zone,
            rewrite_threshold: self.rewrite_threshold,
            clock: self.clock,
        })
    }
}
