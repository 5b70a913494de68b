//! Date parsing and derived fields.
//!
//! - `OrderDate`, `LastDoseDate`, `NextDoseDate` text → calendar dates
//! - `OrderDateTime` = `OrderDate` + `Time`
//! - `WeekSinceLastDose` = days between `LastDoseDate` and `OrderDate`, / 7
//!
//! Unparseable or missing inputs give null outputs; nothing here fails.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{columns, Cell, CleanTable};

/// Date layouts seen in exports, tried in order per cell.
///
/// Two-digit years come first: `%Y` would otherwise read `24` as year 24.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%m-%d-%Y",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%Y%m%d",
];

/// Columns holding a date part once splitting is done.
pub const DATE_COLUMNS: [&str; 3] = [
    columns::ORDER_DATE,
    columns::LAST_DOSE_DATE,
    columns::NEXT_DOSE_DATE,
];

/// Parse free-text date; `None` when no known layout matches.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Parse the named text column to dates in place. Returns false when absent.
pub fn parse_date_cells(table: &mut CleanTable, name: &str) -> bool {
    let Some(values) = table.column(name) else {
        return false;
    };

    let parsed: Vec<Cell> = values
        .iter()
        .map(|cell| match cell {
            Cell::Text(text) => Cell::from(parse_date(text)),
            Cell::Date(date) => Cell::Date(*date),
            _ => Cell::Null,
        })
        .collect();

    table.set_column(name, parsed);
    true
}

/// Combine a date and a time into one timestamp; null if either is missing.
pub fn order_timestamp(date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<NaiveDateTime> {
    Some(date?.and_time(time?))
}

/// Whole days between two dates divided by seven.
pub fn weeks_between(order_date: Option<NaiveDate>, last_dose_date: Option<NaiveDate>) -> Option<f64> {
    let days = order_date?.signed_duration_since(last_dose_date?).num_days();
    Some(days as f64 / 7.0)
}

fn column_or_nulls(table: &CleanTable, name: &str) -> Vec<Cell> {
    table
        .column(name)
        .map(<[Cell]>::to_vec)
        .unwrap_or_else(|| vec![Cell::Null; table.row_count()])
}

/// Append `OrderDateTime` from `OrderDate` and `Time`.
pub fn derive_order_timestamp(table: &mut CleanTable) {
    let dates = column_or_nulls(table, columns::ORDER_DATE);
    let times = column_or_nulls(table, columns::ORDER_TIME);

    let timestamps = dates
        .iter()
        .zip(&times)
        .map(|(d, t)| Cell::from(order_timestamp(d.as_date(), t.as_time())))
        .collect();

    table.set_column(columns::ORDER_DATE_TIME, timestamps);
}

/// Append `WeekSinceLastDose` from `OrderDate` and `LastDoseDate`.
pub fn derive_weeks_since_last_dose(table: &mut CleanTable) {
    let order_dates = column_or_nulls(table, columns::ORDER_DATE);
    let last_dose_dates = column_or_nulls(table, columns::LAST_DOSE_DATE);

    let weeks = order_dates
        .iter()
        .zip(&last_dose_dates)
        .map(|(o, l)| Cell::from(weeks_between(o.as_date(), l.as_date())))
        .collect();

    table.set_column(columns::WEEKS_SINCE_LAST_DOSE, weeks);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_layouts() {
        assert_eq!(parse_date("1/5/2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("01/05/2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("01/05/24"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("05-Jan-2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("Jan 05, 2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("Jan 5 2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("5 Jan 2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("13/45/2024"), None);
    }

    #[test]
    fn test_weeks_between() {
        assert_eq!(weeks_between(Some(ymd(2024, 1, 15)), Some(ymd(2024, 1, 1))), Some(2.0));
        assert_eq!(weeks_between(Some(ymd(2024, 1, 1)), Some(ymd(2024, 1, 8))), Some(-1.0));
        assert_eq!(weeks_between(Some(ymd(2024, 1, 15)), None), None);
        assert_eq!(weeks_between(None, Some(ymd(2024, 1, 1))), None);
    }

    #[test]
    fn test_order_timestamp_needs_both_parts() {
        let time = NaiveTime::from_hms_opt(14, 30, 0);
        assert_eq!(
            order_timestamp(Some(ymd(2024, 1, 5)), time),
            Some(ymd(2024, 1, 5).and_time(time.unwrap()))
        );
        assert_eq!(order_timestamp(None, time), None);
        assert_eq!(order_timestamp(Some(ymd(2024, 1, 5)), None), None);
    }

    #[test]
    fn test_derived_columns_appended() {
        let mut table = CleanTable::from_rows(
            vec!["OrderDate".into(), "Time".into(), "LastDoseDate".into()],
            vec![
                vec![
                    Cell::Text("1/15/2024".into()),
                    Cell::Time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
                    Cell::Text("1/1/2024".into()),
                ],
                vec![Cell::Text("garbage".into()), Cell::Null, Cell::Null],
            ],
        );

        for name in DATE_COLUMNS {
            parse_date_cells(&mut table, name);
        }
        derive_order_timestamp(&mut table);
        derive_weeks_since_last_dose(&mut table);

        assert_eq!(
            table.column_names(),
            vec!["OrderDate", "Time", "LastDoseDate", "OrderDateTime", "WeekSinceLastDose"]
        );
        assert_eq!(table.get(0, "WeekSinceLastDose"), Some(&Cell::Float(2.0)));
        assert_eq!(
            table.get(0, "OrderDateTime").and_then(Cell::as_timestamp),
            NaiveDate::from_ymd_opt(2024, 1, 15).and_then(|d| d.and_hms_opt(9, 0, 0))
        );
        assert_eq!(table.get(1, "OrderDate"), Some(&Cell::Null));
        assert_eq!(table.get(1, "OrderDateTime"), Some(&Cell::Null));
        assert_eq!(table.get(1, "WeekSinceLastDose"), Some(&Cell::Null));
    }

    #[test]
    fn test_absent_inputs_give_null_columns() {
        let mut table = CleanTable::from_rows(vec!["mrn".into()], vec![vec![Cell::Text("1".into())]]);

        assert!(!parse_date_cells(&mut table, "NextDoseDate"));
        derive_order_timestamp(&mut table);
        derive_weeks_since_last_dose(&mut table);

        assert_eq!(table.get(0, "OrderDateTime"), Some(&Cell::Null));
        assert_eq!(table.get(0, "WeekSinceLastDose"), Some(&Cell::Null));
    }
}
