//! Agenda sources: exported calendar data turned into appointments.
//!
//! Two formats are understood:
//! - **TSV** in the shape of `gcalcli agenda --tsv` (header optional)
//! - **JSON**, an array of `{ "title", "start", "blocks" | "duration_minutes" }`
//!
//! Malformed entries never abort a load. Each one is dropped and reported as a
//! [`ScheduleIssue::Skipped`] so the rest of the day still renders.

#![allow(missing_docs)]

pub mod json;
pub mod tsv;

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::errors::{GdayError, Result};
use crate::schedule::clock::{BLOCK_MINUTES, BLOCKS_PER_DAY};
use crate::schedule::render::{Appointment, ScheduleIssue};

/// Serialized agenda format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Tsv,
    Json,
}

impl InputFormat {
    /// Guess from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "tsv" | "txt" => Some(Self::Tsv),
            _ => None,
        }
    }

    /// Guess from content: a JSON array opens with `[`, anything else is TSV.
    #[must_use]
    pub fn sniff(raw: &str) -> Self {
        if raw.trim_start().starts_with('[') {
            Self::Json
        } else {
            Self::Tsv
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tsv => "tsv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = GdayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            other => Err(GdayError::InvalidConfig {
                details: format!("unknown agenda format {other:?} (expected tsv or json)"),
            }),
        }
    }
}

/// Appointments for one day plus the entries that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Agenda {
    pub appointments: Vec<Appointment>,
    pub issues: Vec<ScheduleIssue>,
}

impl Agenda {
    /// Record the outcome of parsing one entry.
    ///
    /// Input errors become skip issues; any other error is returned.
    fn absorb(&mut self, location: String, parsed: Result<Option<Appointment>>) -> Result<()> {
        match parsed {
            Ok(Some(appointment)) => self.appointments.push(appointment),
            Ok(None) => {}
            Err(err) if err.is_input_error() => {
                self.issues.push(ScheduleIssue::skipped(location, &err));
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }
}

/// Parse agenda text in a known format, keeping only entries on `day` when given.
pub fn parse_agenda(raw: &str, format: InputFormat, day: Option<NaiveDate>) -> Result<Agenda> {
    match format {
        InputFormat::Tsv => tsv::parse(raw, day),
        InputFormat::Json => json::parse(raw, day),
    }
}

/// Load an agenda file. Format comes from `format`, then the extension, then content.
pub fn load_agenda(
    path: &Path,
    format: Option<InputFormat>,
    day: Option<NaiveDate>,
) -> Result<Agenda> {
    let raw = fs::read_to_string(path).map_err(|source| GdayError::io(path, source))?;
    let format = format
        .or_else(|| InputFormat::from_path(path))
        .unwrap_or_else(|| InputFormat::sniff(&raw));
    parse_agenda(&raw, format, day)
}

/// Read an agenda from any reader (stdin), sniffing the format when not given.
pub fn read_agenda(
    mut reader: impl Read,
    format: Option<InputFormat>,
    day: Option<NaiveDate>,
) -> Result<Agenda> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(|source| GdayError::io("<stdin>", source))?;
    let format = format.unwrap_or_else(|| InputFormat::sniff(&raw));
    parse_agenda(&raw, format, day)
}

/// Whole blocks needed to cover `minutes`, capped at one day.
pub(crate) fn blocks_for_minutes(minutes: u32) -> u16 {
    let blocks = minutes.div_ceil(u32::from(BLOCK_MINUTES));
    u16::try_from(blocks)
        .unwrap_or(BLOCKS_PER_DAY)
        .min(BLOCKS_PER_DAY)
}
