//! Domain models for the order cleaning pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Cell`] - A single nullable, typed table value
//! - [`RawTable`] - Positional rows straight out of the CSV reader
//! - [`CleanTable`] - Named, column-oriented table mutated by each stage
//! - [`OrderRecord`] - Typed view of one row of the final projection
//! - [`columns`] - Column names used by the export

pub mod table;

pub use table::{CleanTable, Column, RawTable};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};

// =============================================================================
// Column names
// =============================================================================

/// Column names of the pharmacy export, matched exactly and case-sensitively.
pub mod columns {
    pub const PATIENT_NAME: &str = "patientname";
    pub const MRN: &str = "mrn";
    pub const DATE_OF_BIRTH: &str = "DateofBirth";
    pub const REGIMEN_NAME: &str = "RegimenName";
    pub const COMPONENT_NAME: &str = "sComponentName_1";
    pub const ORDERED_AMOUNT: &str = "orderedamount";
    pub const ORDERED_UNITS: &str = "orderedunits";
    pub const LAST_DOSE: &str = "LastDose";
    pub const CRCL: &str = "CrCl";
    pub const CREAT_RESULT: &str = "CREAT_Result";

    /// Combined "date time" text in the export; recomputed as the order timestamp.
    pub const ORDER_DATE_TIME: &str = "OrderDateTime";
    pub const ORDER_DATE: &str = "OrderDate";
    pub const ORDER_TIME: &str = "Time";
    pub const LAST_DOSE_DATE: &str = "LastDoseDate";
    pub const LAST_DOSE_TIME: &str = "LastDoseTime";
    pub const NEXT_DOSE_DATE: &str = "NextDoseDate";
    pub const NEXT_DOSE_TIME: &str = "NextDoseTime";

    pub const WEEKS_SINCE_LAST_DOSE: &str = "WeekSinceLastDose";

    /// Final projection, in output order.
    pub const OUTPUT_COLUMNS: [&str; 14] = [
        PATIENT_NAME,
        MRN,
        DATE_OF_BIRTH,
        ORDER_DATE,
        ORDER_TIME,
        REGIMEN_NAME,
        COMPONENT_NAME,
        ORDERED_AMOUNT,
        ORDERED_UNITS,
        LAST_DOSE_DATE,
        LAST_DOSE,
        CRCL,
        CREAT_RESULT,
        WEEKS_SINCE_LAST_DOSE,
    ];
}

// =============================================================================
// Cell
// =============================================================================

/// Body text that counts as a missing value.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns true when raw body text should be read as a missing value.
pub fn is_missing_token(raw: &str) -> bool {
    MISSING_TOKENS.contains(&raw)
}

/// A single nullable table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Float(f64),
}

impl Cell {
    /// Build a cell from raw body text, mapping missing-value tokens to `Null`.
    pub fn from_raw(raw: &str) -> Self {
        if is_missing_token(raw) {
            Cell::Null
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Cell::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Text rendering used by the CSV writer. `Null` renders as an empty field.
    pub fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Time(t) => t.format("%H:%M:%S").to_string(),
            Cell::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            Cell::Float(v) => format_float(*v),
        }
    }
}

impl From<Option<NaiveDate>> for Cell {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map_or(Cell::Null, Cell::Date)
    }
}

impl From<Option<NaiveTime>> for Cell {
    fn from(value: Option<NaiveTime>) -> Self {
        value.map_or(Cell::Null, Cell::Time)
    }
}

impl From<Option<NaiveDateTime>> for Cell {
    fn from(value: Option<NaiveDateTime>) -> Self {
        value.map_or(Cell::Null, Cell::Timestamp)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Null, Cell::Float)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Null => serializer.serialize_none(),
            Cell::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            Cell::Float(_) => serializer.serialize_none(),
            other => serializer.serialize_str(&other.render()),
        }
    }
}

/// Shortest round-trip digits, with a trailing `.0` on integral values (`2.0`, not `2`).
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

// =============================================================================
// Order Record
// =============================================================================

/// One order line of the final projection, with typed date and time fields.
///
/// Text columns are carried through verbatim from the export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub patient_name: Option<String>,
    pub mrn: Option<String>,
    pub date_of_birth: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub order_time: Option<NaiveTime>,
    pub regimen_name: Option<String>,
    pub component_name: Option<String>,
    pub ordered_amount: Option<String>,
    pub ordered_units: Option<String>,
    pub last_dose_date: Option<NaiveDate>,
    pub last_dose: Option<String>,
    pub cr_cl: Option<String>,
    pub creat_result: Option<String>,
    pub weeks_since_last_dose: Option<f64>,
}

impl OrderRecord {
    /// Read every row of a table that carries the output columns.
    ///
    /// Columns that are absent read as `None`.
    pub fn from_table(table: &CleanTable) -> Vec<OrderRecord> {
        (0..table.row_count())
            .map(|row| {
                let text = |name: &str| {
                    table
                        .get(row, name)
                        .and_then(Cell::as_text)
                        .map(String::from)
                };
                let date = |name: &str| table.get(row, name).and_then(Cell::as_date);

                OrderRecord {
                    patient_name: text(columns::PATIENT_NAME),
                    mrn: text(columns::MRN),
                    date_of_birth: text(columns::DATE_OF_BIRTH),
                    order_date: date(columns::ORDER_DATE),
                    order_time: table.get(row, columns::ORDER_TIME).and_then(Cell::as_time),
                    regimen_name: text(columns::REGIMEN_NAME),
                    component_name: text(columns::COMPONENT_NAME),
                    ordered_amount: text(columns::ORDERED_AMOUNT),
                    ordered_units: text(columns::ORDERED_UNITS),
                    last_dose_date: date(columns::LAST_DOSE_DATE),
                    last_dose: text(columns::LAST_DOSE),
                    cr_cl: text(columns::CRCL),
                    creat_result: text(columns::CREAT_RESULT),
                    weeks_since_last_dose: table
                        .get(row, columns::WEEKS_SINCE_LAST_DOSE)
                        .and_then(Cell::as_float),
                }
            })
            .collect()
    }
}
