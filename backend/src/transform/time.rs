//! Time parser with a column-wide format fallback.
//!
//! A column is first parsed as 12-hour clock with seconds (`02:30:00 PM`).
//! If even one result is null, the whole pass is thrown away and the column
//! is parsed again as 24-hour `HH:MM`. Cells are never mixed between formats,
//! so a single 24-hour entry (or a missing time) turns every 12-hour entry in
//! that column into null.

use chrono::NaiveTime;
use serde::Serialize;

use crate::models::{Cell, CleanTable};

/// Time format a column was finally parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeFormat {
    /// `%I:%M:%S %p`
    TwelveHour,
    /// `%H:%M`
    TwentyFourHour,
}

impl TimeFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            TimeFormat::TwelveHour => "%I:%M:%S %p",
            TimeFormat::TwentyFourHour => "%H:%M",
        }
    }

    /// Parse one entry. Whitespace must match the pattern exactly, so
    /// `09:00:00AM` and ` 14:30` are null.
    pub fn parse(&self, text: &str) -> Option<NaiveTime> {
        if !self.has_exact_spacing(text) {
            return None;
        }
        NaiveTime::parse_from_str(text, self.pattern()).ok()
    }

    fn has_exact_spacing(&self, text: &str) -> bool {
        let solid = |part: &str| !part.is_empty() && !part.contains(char::is_whitespace);
        match self {
            TimeFormat::TwelveHour => text
                .split_once(' ')
                .is_some_and(|(clock, marker)| solid(clock) && solid(marker)),
            TimeFormat::TwentyFourHour => solid(text),
        }
    }
}

/// Parsed values for one column, and the format that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTimes {
    pub values: Vec<Option<NaiveTime>>,
    pub format: TimeFormat,
}

fn parse_all(values: &[Option<&str>], format: TimeFormat) -> Vec<Option<NaiveTime>> {
    values
        .iter()
        .map(|value| value.and_then(|text| format.parse(text)))
        .collect()
}

/// Parse a whole column, falling back to 24-hour when any 12-hour result is null.
pub fn parse_time_column(values: &[Option<&str>]) -> ParsedTimes {
    let twelve = parse_all(values, TimeFormat::TwelveHour);
    if twelve.iter().all(Option::is_some) {
        return ParsedTimes {
            values: twelve,
            format: TimeFormat::TwelveHour,
        };
    }

    ParsedTimes {
        values: parse_all(values, TimeFormat::TwentyFourHour),
        format: TimeFormat::TwentyFourHour,
    }
}

/// Parse the named text column in place. Returns `None` when the column is absent.
pub fn parse_time_cells(table: &mut CleanTable, name: &str) -> Option<TimeFormat> {
    let parsed = {
        let texts: Vec<Option<&str>> = table.column(name)?.iter().map(Cell::as_text).collect();
        parse_time_column(&texts)
    };

    table.set_column(name, parsed.values.into_iter().map(Cell::from).collect());
    Some(parsed.format)
}
