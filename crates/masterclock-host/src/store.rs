// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Position persistence in a plain text file.
//!
//! Each save appends one decimal seconds value on its own line. Once the
//! file grows past the rewrite threshold the next save truncates it. Loading
//! takes the last line holding a valid in-range value, so a torn final
//! write falls back to the previous one.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use masterclock_core::CycleTime;
use masterclock_core::cycle::CYCLE_SECONDS;
use masterclock_core::error::StoreError;
use masterclock_core::traits::PositionStore;
use tracing::{debug, warn};

use crate::config::DEFAULT_REWRITE_THRESHOLD;

/// [`PositionStore`] backed by a file.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    rewrite_threshold: u64,
}

impl FileStore {
    /// Store at `path` with the default rewrite threshold.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_threshold(path, DEFAULT_REWRITE_THRESHOLD)
    }

    /// Store at `path`, rewriting once the file exceeds `threshold` bytes.
    pub fn with_threshold(path: impl Into<PathBuf>, threshold: u64) -> Self {
        FileStore {
            path: path.into(),
            rewrite_threshold: threshold,
        }
    }

    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, position: CycleTime) -> io::Result<bool> {
        let size = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e),
        };
        let rewrite = size > self.rewrite_threshold;
        let mut file = OpenOptions::new()
            .create(true)
            .append(!rewrite)
            .write(true)
            .truncate(rewrite)
            .open(&self.path)?;
        writeln!(file, "{}", position.seconds())?;
        file.flush()?;
        Ok(rewrite)
    }
}

fn parse_position(line: &str) -> Option<CycleTime> {
    let seconds: u32 = line.trim().parse().ok()?;
    (seconds < CYCLE_SECONDS).then(|| CycleTime::new(seconds))
}

impl PositionStore for FileStore {
    fn load(&mut self) -> Result<Option<CycleTime>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved position");
                return Ok(None);
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "position file unreadable");
                return Err(StoreError::Unavailable);
            }
        };
        if contents.trim().is_empty() {
            return Ok(None);
        }
        match contents.lines().rev().find_map(parse_position) {
            Some(position) => {
                debug!(path = %self.path.display(), position = %position, "position loaded");
                Ok(Some(position))
            }
            None => {
                warn!(path = %self.path.display(), "position file holds no valid entry");
                Err(StoreError::Corrupt)
            }
        }
    }

    fn save(&mut self, position: CycleTime) -> Result<(), StoreError> {
        match self.write_line(position) {
            Ok(rewrote) => {
                debug!(path = %self.path.display(), position = %position, rewrote, "position saved");
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "position save failed");
                Err(StoreError::WriteFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position(" 3600 "), Some(CycleTime::new(3600)));
        assert_eq!(parse_position("43200"), None);
        assert_eq!(parse_position("-5"), None);
        assert_eq!(parse_position("12:00"), None);
    }
}
