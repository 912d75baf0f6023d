//! JSON appointment list reader.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::{Agenda, blocks_for_minutes};
use crate::core::errors::{GdayError, Result};
use crate::schedule::clock::ClockTime;
use crate::schedule::render::Appointment;

/// One entry of the JSON list. `blocks` wins over `duration_minutes`; with
/// neither the appointment is a single block.
#[derive(Debug, Deserialize)]
struct AppointmentRecord {
    title: String,
    start: String,
    #[serde(default)]
    blocks: Option<u16>,
    #[serde(default)]
    duration_minutes: Option<u32>,
    #[serde(default)]
    date: Option<NaiveDate>,
}

/// Parse a JSON array of appointments.
///
/// A document that is not an array fails as a whole; a bad element is skipped.
pub fn parse(raw: &str, day: Option<NaiveDate>) -> Result<Agenda> {
    let entries: Vec<Value> = serde_json::from_str(raw)?;
    let mut agenda = Agenda::default();

    for (index, entry) in entries.into_iter().enumerate() {
        let location = format!("entry {}", index + 1);
        let parsed = parse_entry(entry, day, &location);
        agenda.absorb(location, parsed)?;
    }

    Ok(agenda)
}

fn parse_entry(entry: Value, day: Option<NaiveDate>, location: &str) -> Result<Option<Appointment>> {
    let record: AppointmentRecord = serde_json::from_value(entry)
        .map_err(|e| GdayError::appointment(location, e.to_string()))?;

    if let (Some(wanted), Some(date)) = (day, record.date)
        && wanted != date
    {
        return Ok(None);
    }

    let start = ClockTime::parse(&record.start)?;
    let blocks = match (record.blocks, record.duration_minutes) {
        (Some(blocks), _) => blocks,
        (None, Some(minutes)) => blocks_for_minutes(minutes),
        (None, None) => 1,
    };

    Ok(Some(Appointment::new(record.title, start, blocks)))
}
