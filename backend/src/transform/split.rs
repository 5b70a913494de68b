//! Field splitter: break combined "date time" text into separate columns.
//!
//! The three combined fields merge back into the table differently:
//!
//! | Source          | Date column     | Time column     | Source afterwards |
//! |-----------------|-----------------|-----------------|-------------------|
//! | `OrderDateTime` | `OrderDate`     | `Time`          | removed           |
//! | `LastDoseDate`  | `LastDoseDate`  | `LastDoseTime`  | overwritten       |
//! | `NextDoseDate`  | `NextDoseDate`  | `NextDoseTime`  | overwritten       |

use crate::api::logs::log_info;
use crate::models::{columns, Cell, CleanTable};

/// How a split writes its date part back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Write new date and time columns, then drop the source column.
    Replace { date_column: &'static str },
    /// Overwrite the source column with the date part.
    OverwriteInPlace,
}

/// One combined field and where its parts go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitRule {
    pub source: &'static str,
    pub time_column: &'static str,
    pub policy: SplitPolicy,
}

impl SplitRule {
    pub fn date_column(&self) -> &'static str {
        match self.policy {
            SplitPolicy::Replace { date_column } => date_column,
            SplitPolicy::OverwriteInPlace => self.source,
        }
    }
}

/// The splits applied to every export, in order.
pub const SPLIT_RULES: [SplitRule; 3] = [
    SplitRule {
        source: columns::ORDER_DATE_TIME,
        time_column: columns::ORDER_TIME,
        policy: SplitPolicy::Replace {
            date_column: columns::ORDER_DATE,
        },
    },
    SplitRule {
        source: columns::LAST_DOSE_DATE,
        time_column: columns::LAST_DOSE_TIME,
        policy: SplitPolicy::OverwriteInPlace,
    },
    SplitRule {
        source: columns::NEXT_DOSE_DATE,
        time_column: columns::NEXT_DOSE_TIME,
        policy: SplitPolicy::OverwriteInPlace,
    },
];

/// Split text on the first `' '` only. No space: the whole text is the date.
pub fn split_date_time(value: &str) -> (String, Option<String>) {
    match value.split_once(' ') {
        Some((date, time)) => (date.to_string(), Some(time.to_string())),
        None => (value.to_string(), None),
    }
}

/// Apply one rule. Returns false when the source column is absent.
pub fn apply_split(table: &mut CleanTable, rule: &SplitRule) -> bool {
    let Some(values) = table.column(rule.source) else {
        return false;
    };

    let (dates, times): (Vec<Cell>, Vec<Cell>) = values
        .iter()
        .map(|cell| match cell.as_text() {
            Some(text) => {
                let (date, time) = split_date_time(text);
                (Cell::Text(date), time.map_or(Cell::Null, Cell::Text))
            }
            None => (Cell::Null, Cell::Null),
        })
        .unzip();

    table.set_column(rule.date_column(), dates);
    table.set_column(rule.time_column, times);

    if let SplitPolicy::Replace { .. } = rule.policy {
        table.remove_column(rule.source);
    }

    true
}

/// Apply every rule whose source column is present.
pub fn split_date_times(table: &mut CleanTable) {
    for rule in &SPLIT_RULES {
        if !apply_split(table, rule) {
            log_info(format!("Column '{}' not present, split skipped", rule.source));
        }
    }
}
