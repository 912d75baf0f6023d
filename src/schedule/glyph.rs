//! Clock-face glyph selection and display-width accounting.
//!
//! The dial has 24 faces: one on the hour and one at half past for each of the
//! 12 hours. Every block boundary maps to exactly one face, so consecutive blocks
//! always show consecutive faces, including across noon and midnight.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::clock::{BLOCK_MINUTES, ClockTime, MINUTES_PER_DAY};

/// Appended once after the first face of an appointment that starts off the grid.
pub const SUB_BLOCK_INDICATOR: &str = "🍒";

/// Display columns a single glyph occupies in a terminal.
pub const GLYPH_COLUMNS: usize = 2;

/// Faces on the hour, indexed by `hour % 12`.
const ON_THE_HOUR: [&str; 12] = [
    "🕛", "🕐", "🕑", "🕒", "🕓", "🕔", "🕕", "🕖", "🕗", "🕘", "🕙", "🕚",
];

/// Faces at half past, indexed by `hour % 12`.
const HALF_PAST: [&str; 12] = [
    "🕧", "🕜", "🕝", "🕞", "🕟", "🕠", "🕡", "🕢", "🕣", "🕤", "🕥", "🕦",
];

/// Position of the enclosing half-hour boundary on the 12-hour dial, `0..24`.
#[must_use]
pub fn dial_position(time: ClockTime) -> usize {
    let half_day = MINUTES_PER_DAY / 2;
    usize::from((time.floor_to_boundary().minutes_since_midnight() % half_day) / BLOCK_MINUTES)
}

/// Face for the half-hour boundary at or before `time`.
#[must_use]
pub fn clock_face(time: ClockTime) -> &'static str {
    let slot = dial_position(time);
    if slot % 2 == 0 {
        ON_THE_HOUR[slot / 2]
    } else {
        HALF_PAST[slot / 2]
    }
}

/// Glyph for the first block of an appointment starting at `start`.
///
/// On-boundary starts get their own face. Off-boundary starts get the face of
/// the boundary below, followed by [`SUB_BLOCK_INDICATOR`].
#[must_use]
pub fn compute_base_glyph(start: ClockTime) -> String {
    with_indicator(clock_face(start), start)
}

/// Glyph for block `block_index` of an appointment titled `title` starting at `start`.
///
/// Block 0 is [`compute_base_glyph`]. Later blocks show the plain face of their own
/// boundary, `floor(start) + block_index * 30min`, and never the indicator. A title
/// that opens with its own pictograph (`🍅 Focus`) uses that pictograph in place of
/// the clock face on every block.
#[must_use]
pub fn generate_repeated_glyph(title: &str, block_index: u16, start: ClockTime) -> String {
    let (own, _) = split_title_glyph(title);

    if block_index == 0 {
        return match own {
            Some(glyph) => with_indicator(glyph, start),
            None => compute_base_glyph(start),
        };
    }

    if let Some(glyph) = own {
        return glyph.to_string();
    }

    let minutes = u32::from(start.floor_to_boundary().minutes_since_midnight())
        + u32::from(block_index) * u32::from(BLOCK_MINUTES);
    let wrapped = u16::try_from(minutes % u32::from(MINUTES_PER_DAY)).unwrap_or(0);
    let boundary = ClockTime::from_minutes(wrapped).unwrap_or(ClockTime::MIDNIGHT);
    clock_face(boundary).to_string()
}

fn with_indicator(face: &str, start: ClockTime) -> String {
    if start.is_on_boundary() {
        face.to_string()
    } else {
        format!("{face}{SUB_BLOCK_INDICATOR}")
    }
}

/// Split a leading pictograph off a title.
///
/// Returns `(Some(glyph), rest)` when the first grapheme of the title is a wide
/// emoji (including ZWJ, skin-tone and flag sequences), otherwise `(None, title)`.
#[must_use]
pub fn split_title_glyph(title: &str) -> (Option<&str>, &str) {
    let trimmed = title.trim_start();
    let Some(first) = trimmed.graphemes(true).next() else {
        return (None, title);
    };
    let opens_with_emoji = first.chars().next().is_some_and(is_pictographic);
    if !opens_with_emoji || first.width() != GLYPH_COLUMNS {
        return (None, title);
    }

    let rest = &trimmed[first.len()..];
    (Some(first), rest.trim_start())
}

/// Whether `c` can open an emoji grapheme.
///
/// Covers the pictographic blocks and regional indicators. CJK punctuation such
/// as `【` or `「` is wide but not pictographic.
fn is_pictographic(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2300..=0x23FF
            | 0x2B00..=0x2BFF
            | 0x2190..=0x21FF
            | 0x2100..=0x214F
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
    )
}

/// Terminal columns `text` occupies, with each emoji grapheme counted as [`GLYPH_COLUMNS`].
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.width()
}

/// Right-pad `text` with spaces to `width` display columns.
#[must_use]
pub fn pad_to_width(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(fill))
}
