#![forbid(unsafe_code)]

//! gday: a personal calendar CLI that renders one day of appointments as a grid
//! of 30-minute blocks.
//!
//! Each occupied block becomes one line: a fixed-width time column holding the
//! block label and a clock-face glyph, then the appointment title.
//!
//! 1. **Clock glyphs**: one face per half hour; off-grid starts snap down and get 🍒 once
//! 2. **Conflicts**: the earliest-scheduled appointment owns a block, later ones are hidden
//! 3. **Ordering**: strictly chronological, or grouped by title
//!
//! # Library usage
//!
//! ```rust,no_run
//! use gday::prelude::*;
//!
//! let start = ClockTime::parse("10:15am")?;
//! let schedule = render_schedule(&[Appointment::new("Design review", start, 3)], RenderMode::Chronological);
//! for line in schedule.render_lines() {
//!     println!("{line}");
//! }
//! # Ok::<(), GdayError>(())
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod schedule;
pub mod source;
