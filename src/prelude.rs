//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use gday::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{GdayError, Result};

// Schedule
pub use crate::schedule::clock::{BLOCK_MINUTES, ClockTime, TimeBlock};
pub use crate::schedule::glyph::{
    SUB_BLOCK_INDICATOR, compute_base_glyph, display_width, generate_repeated_glyph,
};
pub use crate::schedule::render::{
    Appointment, RenderMode, Schedule, ScheduleIssue, ScheduleLine, TIME_COLUMN_WIDTH,
    render_schedule,
};

// Sources
pub use crate::source::{Agenda, InputFormat, load_agenda, parse_agenda, read_agenda};

// Logging
pub use crate::logger::jsonl::{JsonlConfig, JsonlWriter, LogEntry};
