//! Schedule rendering: block assignment, conflict suppression, and line layout.

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::clock::{BLOCKS_PER_DAY, ClockTime, TimeBlock};
use super::glyph::{generate_repeated_glyph, pad_to_width, split_title_glyph};
use crate::core::errors::GdayError;

/// Display columns of the time field: right-aligned block label, a space, glyphs.
pub const TIME_COLUMN_WIDTH: usize = 12;

/// Width of the longest block label (`10:30am`).
const LABEL_WIDTH: usize = 7;

/// Ordering applied to rendered lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Lines sharing a title are contiguous; groups sort alphabetically.
    #[serde(alias = "alpha", alias = "grouped-by-title")]
    Grouped,
    /// Lines strictly by block start time.
    #[default]
    #[serde(alias = "interleaved", alias = "strict-chronological")]
    Chronological,
}

impl RenderMode {
    /// Canonical config spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grouped => "grouped",
            Self::Chronological => "chronological",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = GdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grouped" | "alpha" | "grouped-by-title" => Ok(Self::Grouped),
            "chronological" | "interleaved" | "strict-chronological" => Ok(Self::Chronological),
            other => Err(GdayError::InvalidConfig {
                details: format!(
                    "unknown sort mode {other:?} (expected grouped/alpha or chronological/interleaved)"
                ),
            }),
        }
    }
}

/// One calendar entry as supplied by the agenda source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub title: String,
    pub start: ClockTime,
    /// Duration in 30-minute blocks. Zero is a data error and renders as one block.
    pub blocks: u16,
}

impl Appointment {
    #[must_use]
    pub fn new(title: impl Into<String>, start: ClockTime, blocks: u16) -> Self {
        Self {
            title: title.into(),
            start,
            blocks,
        }
    }

    /// Block the appointment starts in (its start rounded down).
    #[must_use]
    pub const fn first_block(&self) -> TimeBlock {
        self.start.block()
    }

    /// Title without a leading pictograph.
    #[must_use]
    pub fn display_title(&self) -> &str {
        split_title_glyph(&self.title).1
    }

    /// Glyph shown for this appointment's `block_offset`-th block.
    #[must_use]
    pub fn glyph_for_block(&self, block_offset: u16) -> String {
        generate_repeated_glyph(&self.title, block_offset, self.start)
    }
}

/// A rendered schedule row: one occupied block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleLine {
    pub block: TimeBlock,
    pub glyph: String,
    pub title: String,
    /// Index of the source appointment in the input slice.
    pub appointment: usize,
    /// Position of this block within its appointment, 0 for the first.
    pub block_offset: u16,
}

impl ScheduleLine {
    /// Fixed-width time field, exactly [`TIME_COLUMN_WIDTH`] display columns.
    #[must_use]
    pub fn time_field(&self) -> String {
        let label = self.block.start().label();
        pad_to_width(
            &format!("{label:>width$} {}", self.glyph, width = LABEL_WIDTH),
            TIME_COLUMN_WIDTH,
        )
    }

    /// Plain-text row: time field, a space, title.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{} {}", self.time_field(), self.title)
    }
}

/// A non-fatal data problem found while loading or rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleIssue {
    /// An agenda entry could not be parsed and was left out.
    Skipped {
        location: String,
        code: String,
        message: String,
    },
    /// An all-day calendar event; it has no block to occupy.
    AllDay { location: String, title: String },
    /// Duration below one block, rendered as one block.
    DurationClamped {
        appointment: usize,
        title: String,
        requested: u16,
    },
    /// A block already owned by an earlier appointment.
    Suppressed {
        appointment: usize,
        title: String,
        block: TimeBlock,
        shown: usize,
    },
    /// Blocks that would run past midnight.
    Truncated {
        appointment: usize,
        title: String,
        dropped_blocks: u16,
    },
}

impl ScheduleIssue {
    /// Issue for an agenda entry rejected with `error`.
    #[must_use]
    pub fn skipped(location: impl Into<String>, error: &GdayError) -> Self {
        Self::Skipped {
            location: location.into(),
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    /// Stable snake_case kind, matching the serialized tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Skipped { .. } => "skipped",
            Self::AllDay { .. } => "all_day",
            Self::DurationClamped { .. } => "duration_clamped",
            Self::Suppressed { .. } => "suppressed",
            Self::Truncated { .. } => "truncated",
        }
    }
}

impl fmt::Display for ScheduleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped {
                location, message, ..
            } => write!(f, "skipped {location}: {message}"),
            Self::AllDay { title, .. } => write!(f, "{title:?}: all-day event not shown"),
            Self::DurationClamped {
                title, requested, ..
            } => write!(
                f,
                "{title:?}: duration of {requested} blocks clamped to 1"
            ),
            Self::Suppressed { title, block, .. } => {
                write!(f, "{title:?}: hidden at {block} by an earlier appointment")
            }
            Self::Truncated {
                title,
                dropped_blocks,
                ..
            } => write!(
                f,
                "{title:?}: {dropped_blocks} blocks past midnight dropped"
            ),
        }
    }
}

/// Render output: ordered lines plus every issue met on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub mode: RenderMode,
    pub lines: Vec<ScheduleLine>,
    pub issues: Vec<ScheduleIssue>,
}

impl Schedule {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Plain-text rows in display order.
    #[must_use]
    pub fn render_lines(&self) -> Vec<String> {
        self.lines.iter().map(ScheduleLine::render).collect()
    }

    /// Number of agenda entries that were skipped outright.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, ScheduleIssue::Skipped { .. }))
            .count()
    }
}

/// Assign appointments to blocks, in chronological line order.
///
/// Appointments are placed earliest start first, ties in input order. A block
/// already taken keeps its owner and the later appointment is suppressed there
/// only; its remaining blocks still render.
#[must_use]
pub fn assign_blocks(appointments: &[Appointment]) -> (Vec<ScheduleLine>, Vec<ScheduleIssue>) {
    let mut order: Vec<usize> = (0..appointments.len()).collect();
    order.sort_by_key(|&i| (appointments[i].start, i));

    let mut owners: Vec<Option<usize>> = vec![None; usize::from(BLOCKS_PER_DAY)];
    let mut lines = Vec::new();
    let mut issues = Vec::new();

    for index in order {
        let appointment = &appointments[index];
        let title = appointment.display_title();

        let blocks = if appointment.blocks == 0 {
            issues.push(ScheduleIssue::DurationClamped {
                appointment: index,
                title: appointment.title.clone(),
                requested: 0,
            });
            1
        } else {
            appointment.blocks
        };

        let first = appointment.first_block();
        for offset in 0..blocks {
            let Some(block) = first.offset(offset) else {
                issues.push(ScheduleIssue::Truncated {
                    appointment: index,
                    title: appointment.title.clone(),
                    dropped_blocks: blocks - offset,
                });
                break;
            };

            let slot = &mut owners[usize::from(block.index())];
            if let Some(shown) = *slot {
                issues.push(ScheduleIssue::Suppressed {
                    appointment: index,
                    title: appointment.title.clone(),
                    block,
                    shown,
                });
                continue;
            }
            *slot = Some(index);

            lines.push(ScheduleLine {
                block,
                glyph: appointment.glyph_for_block(offset),
                title: title.to_string(),
                appointment: index,
                block_offset: offset,
            });
        }
    }

    lines.sort_by_key(|line| line.block);
    (lines, issues)
}

/// Reorder chronological lines for `mode`.
pub fn order_lines(lines: &mut [ScheduleLine], mode: RenderMode) {
    match mode {
        RenderMode::Chronological => lines.sort_by_key(|line| line.block),
        RenderMode::Grouped => lines.sort_by_cached_key(|line| {
            (line.title.to_lowercase(), line.title.clone(), line.block)
        }),
    }
}

/// Render a day of appointments into display lines.
#[must_use]
pub fn render_schedule(appointments: &[Appointment], mode: RenderMode) -> Schedule {
    let (mut lines, issues) = assign_blocks(appointments);
    order_lines(&mut lines, mode);
    Schedule {
        mode,
        lines,
        issues,
    }
}
