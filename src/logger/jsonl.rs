//! JSONL logger: append-only line-delimited JSON activity log.
//!
//! Each line is a self-contained JSON object written with a single `write_all`,
//! so a concurrent `tail -f` never sees a partial line.
//!
//! Degradation chain:
//! 1. Primary file path
//! 2. stderr with `[GDAY-JSONL]` prefix
//! 3. Silent discard (rendering must never fail because logging did)

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions, rename};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::config::Config;
use crate::core::errors::{GdayError, Result};
use crate::schedule::render::{Schedule, ScheduleIssue};

/// Severity level for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Log event types matching the gday activity model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ConfigLoaded,
    RenderComplete,
    EntrySkipped,
    AllDayOmitted,
    DurationClamped,
    ConflictSuppressed,
    Truncated,
    Error,
}

/// A single JSONL log entry: all fields optional except `ts`, `event`, `severity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    /// Appointment title involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Block label (`10:30am`) involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    /// Agenda location (`line 4`, `entry 2`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Rendered line count or dropped block count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// GDAY error code if the event reports a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Freeform details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: format_utc_now(),
            event,
            severity,
            title: None,
            block: None,
            location: None,
            count: None,
            mode: None,
            error_code: None,
            error_message: None,
            details: None,
        }
    }

    /// Entry recording which config a run used.
    pub fn config_loaded(config: &Config) -> Self {
        let mut entry = Self::new(EventType::ConfigLoaded, Severity::Info);
        entry.mode = Some(config.display.sort.to_string());
        let path = config.paths.config_file.display();
        match config.stable_hash() {
            Ok(hash) => entry.details = Some(format!("{path} config_hash={hash}")),
            Err(err) => {
                entry.details = Some(path.to_string());
                entry.error_code = Some(err.code().to_string());
                entry.error_message = Some(err.to_string());
            }
        }
        entry
    }

    /// Summary entry for a finished render.
    pub fn render_complete(schedule: &Schedule) -> Self {
        let mut entry = Self::new(EventType::RenderComplete, Severity::Info);
        entry.count = Some(schedule.lines.len() as u64);
        entry.mode = Some(schedule.mode.to_string());
        if !schedule.issues.is_empty() {
            entry.details = Some(format!("{} issues", schedule.issues.len()));
        }
        entry
    }

    /// Entry describing one schedule issue.
    pub fn from_issue(issue: &ScheduleIssue) -> Self {
        match issue {
            ScheduleIssue::Skipped {
                location,
                code,
                message,
            } => {
                let mut entry = Self::new(EventType::EntrySkipped, Severity::Warning);
                entry.location = Some(location.clone());
                entry.error_code = Some(code.clone());
                entry.error_message = Some(message.clone());
                entry
            }
            ScheduleIssue::AllDay { location, title } => {
                let mut entry = Self::new(EventType::AllDayOmitted, Severity::Info);
                entry.location = Some(location.clone());
                entry.title = Some(title.clone());
                entry
            }
            ScheduleIssue::DurationClamped { title, .. } => {
                let mut entry = Self::new(EventType::DurationClamped, Severity::Warning);
                entry.title = Some(title.clone());
                entry
            }
            ScheduleIssue::Suppressed { title, block, .. } => {
                let mut entry = Self::new(EventType::ConflictSuppressed, Severity::Info);
                entry.title = Some(title.clone());
                entry.block = Some(block.to_string());
                entry
            }
            ScheduleIssue::Truncated {
                title,
                dropped_blocks,
                ..
            } => {
                let mut entry = Self::new(EventType::Truncated, Severity::Warning);
                entry.title = Some(title.clone());
                entry.count = Some(u64::from(*dropped_blocks));
                entry
            }
        }
    }

    /// Entry for a command that failed outright.
    pub fn from_error(error: &GdayError) -> Self {
        let mut entry = Self::new(EventType::Error, Severity::Error);
        entry.error_code = Some(error.code().to_string());
        entry.error_message = Some(error.to_string());
        entry
    }
}

/// Degradation state of the JSONL writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    /// Writing to the log file.
    Normal,
    /// File failed, writing to stderr.
    Stderr,
    /// Everything failed, silently discarding.
    Discard,
}

/// Configuration for the JSONL writer.
#[derive(Debug, Clone)]
pub struct JsonlConfig {
    pub path: PathBuf,
    /// Maximum file size before rotation (bytes).
    pub max_size_bytes: u64,
    /// Number of rotated files to keep.
    pub max_rotated_files: u32,
}

impl JsonlConfig {
    /// Writer settings from the `[logging]` and `[paths]` config sections.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            path: config.paths.jsonl_log.clone(),
            max_size_bytes: config.logging.max_size_bytes,
            max_rotated_files: config.logging.max_rotated_files,
        }
    }
}

/// Append-only JSONL log writer with rotation and fallback to stderr.
pub struct JsonlWriter {
    config: JsonlConfig,
    writer: Option<BufWriter<File>>,
    state: WriterState,
    bytes_written: u64,
}

impl JsonlWriter {
    /// Open the JSONL log file. Falls through the degradation chain on failure.
    pub fn open(config: JsonlConfig) -> Self {
        let mut w = Self {
            config,
            writer: None,
            state: WriterState::Discard,
            bytes_written: 0,
        };
        match open_append(&w.config.path) {
            Ok((file, size)) => {
                w.writer = Some(BufWriter::new(file));
                w.state = WriterState::Normal;
                w.bytes_written = size;
            }
            Err(err) => {
                let _ = writeln!(io::stderr(), "[GDAY-JSONL] {err}, using stderr");
                w.state = WriterState::Stderr;
            }
        }
        w
    }

    /// Write a single log entry as one atomic JSONL line.
    pub fn write_entry(&mut self, entry: &LogEntry) {
        let line = match serde_json::to_string(entry) {
            Ok(json) => format!("{json}\n"),
            Err(e) => {
                let _ = writeln!(io::stderr(), "[GDAY-JSONL] serialize error: {e}");
                return;
            }
        };

        self.write_line(&line);
    }

    /// Log the render summary and every issue of `schedule`.
    pub fn write_schedule(&mut self, schedule: &Schedule) {
        for issue in &schedule.issues {
            self.write_entry(&LogEntry::from_issue(issue));
        }
        self.write_entry(&LogEntry::render_complete(schedule));
    }

    /// Flush buffers.
    pub fn flush(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            let _ = w.flush();
        }
    }

    /// Current degradation state.
    pub fn state(&self) -> &str {
        match self.state {
            WriterState::Normal => "normal",
            WriterState::Stderr => "stderr",
            WriterState::Discard => "discard",
        }
    }

    // ──────────────────────── internals ────────────────────────

    fn write_line(&mut self, line: &str) {
        if self.state == WriterState::Normal
            && self.bytes_written + line.len() as u64 > self.config.max_size_bytes
        {
            self.rotate();
        }

        match self.state {
            WriterState::Normal => {
                if let Some(w) = self.writer.as_mut() {
                    if w.write_all(line.as_bytes()).is_err() {
                        self.degrade();
                        self.write_line(line);
                        return;
                    }
                    self.bytes_written += line.len() as u64;
                } else {
                    self.degrade();
                    self.write_line(line);
                }
            }
            WriterState::Stderr => {
                if write!(io::stderr(), "[GDAY-JSONL] {line}").is_err() {
                    self.degrade();
                }
            }
            WriterState::Discard => {}
        }
    }

    fn degrade(&mut self) {
        self.writer = None;
        self.state = match self.state {
            WriterState::Normal => {
                let _ = writeln!(io::stderr(), "[GDAY-JSONL] log write failed, using stderr");
                WriterState::Stderr
            }
            WriterState::Stderr | WriterState::Discard => WriterState::Discard,
        };
    }

    fn rotate(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            let _ = w.flush();
        }
        self.writer = None;

        let base = self.config.path.clone();
        // Shift existing rotations: .N-1→.N, …, .1→.2, current→.1
        for i in (1..self.config.max_rotated_files).rev() {
            let _ = rename(rotated_name(&base, i), rotated_name(&base, i + 1));
        }
        let _ = rename(&base, rotated_name(&base, 1));

        match open_append(&base) {
            Ok((file, _)) => {
                self.writer = Some(BufWriter::new(file));
                self.bytes_written = 0;
            }
            Err(_) => self.degrade(),
        }
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        self.flush();
    }
}

// ──────────────────────── helpers ────────────────────────

/// Open or create a file for appending. Returns `(File, current_size)`.
fn open_append(path: &Path) -> Result<(File, u64)> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| GdayError::io(parent, source))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| GdayError::io(path, source))?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok((file, size))
}

/// Build a rotated filename: `foo.jsonl` → `foo.jsonl.3`.
fn rotated_name(base: &Path, index: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Format current UTC time as ISO 8601.
fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ──────────────────────── tests ────────────────────────
