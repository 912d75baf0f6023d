//! `gcalcli agenda --tsv` reader.
//!
//! With a header row, columns are located by name and extra columns (links,
//! location, calendar) are ignored. Without one, the first five columns are
//! `start_date start_time end_date end_time title`.

use chrono::NaiveDate;

use super::{Agenda, blocks_for_minutes};
use crate::core::errors::{GdayError, Result};
use crate::schedule::clock::{ClockTime, MINUTES_PER_DAY};
use crate::schedule::render::{Appointment, ScheduleIssue};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// What one data row turned out to be.
#[derive(Debug)]
enum Row {
    Timed(Appointment),
    AllDay(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    start_date: usize,
    start_time: usize,
    end_date: usize,
    end_time: usize,
    title: usize,
}

impl Columns {
    const POSITIONAL: Self = Self {
        start_date: 0,
        start_time: 1,
        end_date: 2,
        end_time: 3,
        title: 4,
    };

    fn from_header(fields: &[&str]) -> Result<Self> {
        let find = |name: &str| {
            fields
                .iter()
                .position(|f| f.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| GdayError::appointment("header", format!("missing column {name:?}")))
        };
        Ok(Self {
            start_date: find("start_date")?,
            start_time: find("start_time")?,
            end_date: find("end_date")?,
            end_time: find("end_time")?,
            title: find("title")?,
        })
    }
}

/// Parse TSV agenda text.
pub fn parse(raw: &str, day: Option<NaiveDate>) -> Result<Agenda> {
    let mut agenda = Agenda::default();
    let mut columns = Columns::POSITIONAL;
    let mut first_row = true;

    for (index, line) in raw.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();

        if first_row {
            first_row = false;
            if fields
                .first()
                .is_some_and(|f| f.trim().eq_ignore_ascii_case("start_date"))
            {
                columns = Columns::from_header(&fields)?;
                continue;
            }
        }

        let location = format!("line {}", index + 1);
        match parse_row(&fields, columns, day, &location) {
            Ok(Some(Row::AllDay(title))) => {
                agenda.issues.push(ScheduleIssue::AllDay { location, title });
            }
            Ok(Some(Row::Timed(appointment))) => agenda.appointments.push(appointment),
            Ok(None) => {}
            Err(err) => agenda.absorb(location, Err(err))?,
        }
    }

    Ok(agenda)
}

fn parse_row(
    fields: &[&str],
    columns: Columns,
    day: Option<NaiveDate>,
    location: &str,
) -> Result<Option<Row>> {
    let field = |idx: usize, name: &str| {
        fields
            .get(idx)
            .map(|f| f.trim())
            .ok_or_else(|| GdayError::appointment(location, format!("missing {name} column")))
    };
    let date = |raw: &str, name: &str| {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
            GdayError::appointment(location, format!("{name} {raw:?} is not YYYY-MM-DD: {e}"))
        })
    };

    let start_date = date(field(columns.start_date, "start_date")?, "start_date")?;
    if day.is_some_and(|d| d != start_date) {
        return Ok(None);
    }

    let title = field(columns.title, "title")?;
    let start_raw = field(columns.start_time, "start_time")?;
    if start_raw.is_empty() {
        return Ok(Some(Row::AllDay(title.to_string())));
    }
    let start = ClockTime::parse(start_raw)?;

    let end_date = match field(columns.end_date, "end_date")? {
        "" => start_date,
        raw => date(raw, "end_date")?,
    };
    let end = ClockTime::parse(field(columns.end_time, "end_time")?)?;

    let days = (end_date - start_date).num_days();
    let minutes = days * i64::from(MINUTES_PER_DAY) + i64::from(end.minutes_since_midnight())
        - i64::from(start.minutes_since_midnight());
    if minutes < 0 {
        return Err(GdayError::appointment(
            location,
            format!("{title:?} ends before it starts"),
        ));
    }
    let blocks = blocks_for_minutes(u32::try_from(minutes).unwrap_or(u32::MAX));

    Ok(Some(Row::Timed(Appointment::new(title, start, blocks))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::render::ScheduleIssue;

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).unwrap()
    }

    const SAMPLE: &str = "\
start_date\tstart_time\tend_date\tend_time\ttitle\tlocation
2026-10-17\t09:00\t2026-10-17\t09:30\tDaily Standup\tRoom 1
2026-10-17\t10:15\t2026-10-17\t11:45\tDesign review\t
2026-10-18\t09:00\t2026-10-18\t09:30\tDaily Standup\tRoom 1
";

    #[test]
    fn parses_header_rows() {
        let agenda = parse(SAMPLE, None).unwrap();
        assert_eq!(agenda.appointments.len(), 3);
        let review = &agenda.appointments[1];
        assert_eq!(review.title, "Design review");
        assert_eq!(review.start.label(), "10:15am");
        assert_eq!(review.blocks, 3);
        assert!(agenda.issues.is_empty());
    }

    #[test]
    fn day_filter_drops_other_dates_silently() {
        let agenda = parse(SAMPLE, Some(day("2026-10-18"))).unwrap();
        assert_eq!(agenda.appointments.len(), 1);
        assert!(agenda.issues.is_empty());
    }

    #[test]
    fn header_columns_found_by_name() {
        let raw = "\
start_date\tstart_time\tend_date\tend_time\thtml_link\ttitle
2026-10-17\t13:00\t2026-10-17\t14:00\thttps://example.invalid/e\tPlanning
";
        let agenda = parse(raw, None).unwrap();
        assert_eq!(agenda.appointments[0].title, "Planning");
        assert_eq!(agenda.appointments[0].blocks, 2);
    }

    #[test]
    fn header_missing_column_is_an_error() {
        let err = parse("start_date\tstart_time\ttitle\n", None).unwrap_err();
        assert_eq!(err.code(), "GDAY-2002");
        assert!(err.to_string().contains("end_date"));
    }

    #[test]
    fn positional_rows_without_header() {
        let raw = "2026-10-17\t9:30am\t2026-10-17\t10:00am\tCoffee\n";
        let agenda = parse(raw, None).unwrap();
        assert_eq!(agenda.appointments[0].start.label(), "9:30am");
        assert_eq!(agenda.appointments[0].blocks, 1);
    }

    #[test]
    fn malformed_rows_are_skipped_and_reported() {
        let raw = "\
2026-10-17\t09:00\t2026-10-17\t09:30\tGood
2026-10-17\t\t2026-10-18\t\tHoliday
2026-10-17\t25:00\t2026-10-17\t26:00\tBad time
not-a-date\t09:00\t2026-10-17\t09:30\tBad date
2026-10-17\t09:00
2026-10-17\t11:00\t2026-10-17\t10:00\tBackwards
";
        let agenda = parse(raw, None).unwrap();
        assert_eq!(agenda.appointments.len(), 1);
        let locations: Vec<(&str, &str)> = agenda
            .issues
            .iter()
            .map(|issue| match issue {
                ScheduleIssue::Skipped { location, .. } | ScheduleIssue::AllDay { location, .. } => {
                    (issue.kind(), location.as_str())
                }
                other => panic!("unexpected issue {other:?}"),
            })
            .collect();
        assert_eq!(
            locations,
            vec![
                ("all_day", "line 2"),
                ("skipped", "line 3"),
                ("skipped", "line 4"),
                ("skipped", "line 5"),
                ("skipped", "line 6"),
            ]
        );
    }

    #[test]
    fn all_day_events_are_not_malformed() {
        let raw = "\
start_date\tstart_time\tend_date\tend_time\ttitle
2026-10-17\t\t2026-10-18\t\tBirthday
2026-10-17\t09:00\t2026-10-17\t09:30\tDaily Standup
2026-10-18\t\t2026-10-19\t\tHoliday
";
        let agenda = parse(raw, Some(day("2026-10-17"))).unwrap();
        assert_eq!(agenda.appointments.len(), 1);
        assert_eq!(
            agenda.issues,
            vec![ScheduleIssue::AllDay {
                location: "line 2".to_string(),
                title: "Birthday".to_string(),
            }]
        );
    }

    #[test]
    fn skipped_issue_carries_error_code() {
        let agenda = parse("2026-10-17\tlater\t2026-10-17\t10:00\tX\n", None).unwrap();
        match &agenda.issues[0] {
            ScheduleIssue::Skipped { code, .. } => assert_eq!(code, "GDAY-2001"),
            other => panic!("unexpected issue {other:?}"),
        }
    }

    #[test]
    fn zero_length_event_yields_zero_blocks() {
        let agenda = parse("2026-10-17\t09:00\t2026-10-17\t09:00\tReminder\n", None).unwrap();
        assert_eq!(agenda.appointments[0].blocks, 0);
    }

    #[test]
    fn overnight_event_spans_into_next_day() {
        let agenda = parse("2026-10-17\t23:00\t2026-10-18\t01:00\tRelease\n", None).unwrap();
        assert_eq!(agenda.appointments[0].blocks, 4);
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let raw = "\r\n2026-10-17\t09:00\t2026-10-17\t09:30\tA\r\n\r\n";
        let agenda = parse(raw, None).unwrap();
        assert_eq!(agenda.appointments.len(), 1);
        assert_eq!(agenda.appointments[0].title, "A");
    }
}
