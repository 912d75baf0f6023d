//! Property-based tests for glyph selection and block assignment invariants.
//!
//! Uses `proptest` to check that arbitrary times and arbitrary days keep the
//! rendering guarantees: indicator placement, per-block snapping, constant time
//! column width, one line per block, and mode-independent assignment.

use std::collections::HashSet;

use proptest::prelude::*;

use super::clock::{BLOCK_MINUTES, ClockTime, MINUTES_PER_DAY};
use super::glyph::{
    SUB_BLOCK_INDICATOR, clock_face, compute_base_glyph, dial_position, display_width,
    generate_repeated_glyph,
};
use super::render::{Appointment, RenderMode, TIME_COLUMN_WIDTH, render_schedule};

// ──────────────────── strategies ────────────────────

fn arb_time() -> impl Strategy<Value = ClockTime> {
    (0..MINUTES_PER_DAY).prop_map(|m| ClockTime::from_minutes(m).unwrap())
}

fn arb_on_boundary() -> impl Strategy<Value = ClockTime> {
    (0..MINUTES_PER_DAY / BLOCK_MINUTES)
        .prop_map(|slot| ClockTime::from_minutes(slot * BLOCK_MINUTES).unwrap())
}

fn arb_off_boundary() -> impl Strategy<Value = ClockTime> {
    (0..MINUTES_PER_DAY / BLOCK_MINUTES, 1..BLOCK_MINUTES)
        .prop_map(|(slot, offset)| ClockTime::from_minutes(slot * BLOCK_MINUTES + offset).unwrap())
}

fn arb_title() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Daily Standup".to_string()),
        Just("🍅 Focus".to_string()),
        Just("Lunch".to_string()),
        Just("email".to_string()),
        "[A-Za-z][A-Za-z ]{0,12}",
    ]
}

fn arb_appointment() -> impl Strategy<Value = Appointment> {
    (arb_title(), arb_time(), 0u16..6)
        .prop_map(|(title, start, blocks)| Appointment::new(title, start, blocks))
}

fn indicators(glyph: &str) -> usize {
    glyph.matches(SUB_BLOCK_INDICATOR).count()
}

// ──────────────────── glyph properties ────────────────────

proptest! {
    #[test]
    fn on_boundary_never_gets_indicator(time in arb_on_boundary()) {
        prop_assert_eq!(indicators(&compute_base_glyph(time)), 0);
        prop_assert_eq!(compute_base_glyph(time), clock_face(time));
    }

    #[test]
    fn off_boundary_gets_indicator_once(time in arb_off_boundary()) {
        let glyph = compute_base_glyph(time);
        prop_assert_eq!(indicators(&glyph), 1);
        prop_assert!(glyph.starts_with(clock_face(time.floor_to_boundary())));
        prop_assert!(glyph.ends_with(SUB_BLOCK_INDICATOR));
    }

    #[test]
    fn continuation_blocks_drop_indicator(start in arb_off_boundary(), k in 1u16..16) {
        prop_assert_eq!(indicators(&generate_repeated_glyph("Meeting", 0, start)), 1);
        prop_assert_eq!(indicators(&generate_repeated_glyph("Meeting", k, start)), 0);
    }

    #[test]
    fn continuation_snaps_from_floor(start in arb_time(), k in 1u16..16) {
        let floor = start.floor_to_boundary().minutes_since_midnight();
        let own = (floor + k * BLOCK_MINUTES) % MINUTES_PER_DAY;
        let expected = clock_face(ClockTime::from_minutes(own).unwrap());
        prop_assert_eq!(generate_repeated_glyph("Meeting", k, start), expected);
    }

    #[test]
    fn consecutive_boundaries_step_the_dial(time in arb_on_boundary()) {
        let next = (time.minutes_since_midnight() + BLOCK_MINUTES) % MINUTES_PER_DAY;
        let next = ClockTime::from_minutes(next).unwrap();
        prop_assert_eq!((dial_position(time) + 1) % 24, dial_position(next));
        prop_assert_ne!(clock_face(time), clock_face(next));
    }
}

// ──────────────────── render properties ────────────────────

proptest! {
    #[test]
    fn every_block_renders_at_most_once(day in prop::collection::vec(arb_appointment(), 0..12)) {
        let schedule = render_schedule(&day, RenderMode::Chronological);
        let blocks: HashSet<_> = schedule.lines.iter().map(|l| l.block).collect();
        prop_assert_eq!(blocks.len(), schedule.lines.len());
    }

    #[test]
    fn chronological_lines_are_sorted(day in prop::collection::vec(arb_appointment(), 0..12)) {
        let schedule = render_schedule(&day, RenderMode::Chronological);
        prop_assert!(schedule.lines.windows(2).all(|w| w[0].block < w[1].block));
    }

    #[test]
    fn grouped_titles_are_contiguous(day in prop::collection::vec(arb_appointment(), 0..12)) {
        let schedule = render_schedule(&day, RenderMode::Grouped);
        let mut finished: HashSet<&str> = HashSet::new();
        let mut current: Option<&str> = None;
        for line in &schedule.lines {
            if current != Some(line.title.as_str()) {
                if let Some(done) = current {
                    finished.insert(done);
                }
                prop_assert!(!finished.contains(line.title.as_str()), "title {} split", line.title);
                current = Some(line.title.as_str());
            }
        }
    }

    #[test]
    fn mode_changes_order_only(day in prop::collection::vec(arb_appointment(), 0..12)) {
        let grouped = render_schedule(&day, RenderMode::Grouped);
        let chrono = render_schedule(&day, RenderMode::Chronological);
        let mut a = grouped.lines.clone();
        a.sort_by_key(|l| l.block);
        prop_assert_eq!(a, chrono.lines);
        prop_assert_eq!(grouped.issues, chrono.issues);
    }

    #[test]
    fn time_field_width_is_constant(day in prop::collection::vec(arb_appointment(), 0..12)) {
        let schedule = render_schedule(&day, RenderMode::Chronological);
        for line in &schedule.lines {
            prop_assert_eq!(display_width(&line.time_field()), TIME_COLUMN_WIDTH);
        }
    }

    #[test]
    fn indicator_only_on_first_block(day in prop::collection::vec(arb_appointment(), 0..12)) {
        let schedule = render_schedule(&day, RenderMode::Chronological);
        for line in &schedule.lines {
            let start = day[line.appointment].start;
            let expected = usize::from(line.block_offset == 0 && !start.is_on_boundary());
            prop_assert_eq!(indicators(&line.glyph), expected);
        }
    }
}
