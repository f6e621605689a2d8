// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Operator console: key handling and the running status line.
//!
//! Outside time entry, `A`, `B` and `C` force pulses, `S` starts a manual
//! sync and `R` toggles the run override. A digit or `:` starts time entry;
//! ESC or Ctrl-C cancels it, Backspace erases, and any other key ends it
//! and submits what was typed. The terminating key is not interpreted as
//! a command.
//!
//! The status line prints `hh:mm:ss hh:mm` (authoritative time, then the
//! dial) on a fresh line at the top of each minute, the seconds every ten
//! seconds and `-` otherwise, then `A`/`B` for asserted lines. `*` marks
//! the lines dropping.

use std::io::{self, Write};

use masterclock_core::control::{ManualCommand, TimeEntry};
use masterclock_core::drift::DriftBranch;
use masterclock_core::error::TimeEntryError;
use masterclock_core::pulse::PulseEvent;
use masterclock_core::{CycleTime, Line, ServiceReport, SignalLevels, Status};
use tracing::warn;

/// Longest time entry kept; further characters are dropped.
pub const MAX_ENTRY_LEN: usize = 9;

const ESC: u8 = 27;
const CTRL_C: u8 = 3;
const BACKSPACE: u8 = 8;
const DELETE: u8 = 127;

/// Result of a key press.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConsoleAction {
    /// Run this command.
    Command(ManualCommand),
    /// Time entry submitted but not accepted.
    Rejected(TimeEntryError),
    /// Time entry abandoned.
    Cancelled,
}

/// Turns key presses into [`ConsoleAction`]s.
#[derive(Clone, Debug, Default)]
pub struct KeyParser {
    entry: Option<String>,
}

impl KeyParser {
    /// Parser outside time entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a time entry is in progress.
    pub fn in_entry(&self) -> bool {
        self.entry.is_some()
    }

    /// Characters typed so far in the current entry.
    pub fn buffer(&self) -> &str {
        self.entry.as_deref().unwrap_or("")
    }

    /// Feed one key.
    pub fn key(&mut self, key: u8) -> Option<ConsoleAction> {
        let ch = char::from(key);
        if ch.is_ascii_digit() || ch == ':' {
            let buf = self.entry.get_or_insert_with(String::new);
            if buf.len() < MAX_ENTRY_LEN {
                buf.push(ch);
            }
            return None;
        }

        let Some(buf) = self.entry.as_mut() else {
            return command_for(ch).map(ConsoleAction::Command);
        };
        match key {
            ESC | CTRL_C => {
                self.entry = None;
                Some(ConsoleAction::Cancelled)
            }
            BACKSPACE | DELETE => {
                buf.pop();
                None
            }
            _ => {
                let typed = self.entry.take().unwrap_or_default();
                if typed.is_empty() {
                    return None;
                }
                Some(match TimeEntry::parse(&typed) {
                    Ok(entry) => ConsoleAction::Command(ManualCommand::EnterTime(entry)),
                    Err(e) => {
                        warn!(entry = %typed, error = %e, "time entry rejected");
                        ConsoleAction::Rejected(e)
                    }
                })
            }
        }
    }
}

fn command_for(ch: char) -> Option<ManualCommand> {
    match ch.to_ascii_uppercase() {
        'A' => Some(ManualCommand::ForcePulse(Line::A)),
        'B' => Some(ManualCommand::ForcePulse(Line::B)),
        'C' => Some(ManualCommand::ForceBoth),
        'S' => Some(ManualCommand::TriggerSync),
        'R' => Some(ManualCommand::ToggleRunOverride),
        _ => None,
    }
}

/// Status text for one second.
pub fn format_second(authoritative: CycleTime, wall: CycleTime, levels: SignalLevels) -> String {
    let s = authoritative.second();
    let mut out = if s == 0 {
        format!(
            "\n{:02}:{:02}:{:02} {:02}:{:02} ",
            authoritative.hour(),
            authoritative.minute(),
            s,
            wall.hour(),
            wall.minute(),
        )
    } else if s % 10 == 0 {
        format!("{s:02}")
    } else {
        String::from("-")
    };
    if levels.a {
        out.push('A');
    }
    if levels.b {
        out.push('B');
    }
    out
}

/// Status text for the lines dropping.
pub fn signal_drop(held: SignalLevels) -> &'static str {
    if held.a || held.b { "*" } else { "" }
}

/// Writes the status line from each [`ServiceReport`].
#[derive(Debug)]
pub struct StatusWriter<W> {
    out: W,
}

impl<W: Write> StatusWriter<W> {
    /// Writer over `out`.
    pub fn new(out: W) -> Self {
        StatusWriter { out }
    }

    /// Record one service pass. Writes only when a new second was
    /// reconciled or the lines dropped.
    pub fn record(&mut self, report: &ServiceReport, status: &Status) -> io::Result<()> {
        let mut wrote = false;
        if let Some(rec) = report.drift
            && rec.branch != DriftBranch::Unchanged
        {
            let text = format_second(status.authoritative, status.wall.position, rec.levels);
            self.out.write_all(text.as_bytes())?;
            wrote = true;
        }
        if let Some(PulseEvent::Released(held)) = report.pulse {
            self.out.write_all(signal_drop(held).as_bytes())?;
            wrote = true;
        }
        if wrote {
            self.out.flush()?;
        }
        Ok(())
    }

    /// Write a line of free text, such as a command acknowledgement.
    pub fn note(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "\n{text}")?;
        self.out.flush()
    }

    /// The underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}
