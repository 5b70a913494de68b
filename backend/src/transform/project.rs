//! Sort orders by patient then order timestamp, and project the output columns.
//!
//! The sort is stable: orders with the same MRN and timestamp keep their
//! document order, which matters for several orders on the same day.
//! Null keys sort after every non-null key.

use std::cmp::Ordering;

use crate::error::PipelineError;
use crate::models::{columns, CleanTable};

/// Ascending order with `None` last.
fn cmp_nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by `mrn`, then `OrderDateTime`.
pub fn sort_orders(table: &mut CleanTable) -> Result<(), PipelineError> {
    let mrns = table.require(columns::MRN)?;
    let timestamps = table.require(columns::ORDER_DATE_TIME)?;

    let mut order: Vec<usize> = (0..table.row_count()).collect();
    order.sort_by(|&a, &b| {
        cmp_nulls_last(mrns[a].as_text(), mrns[b].as_text()).then_with(|| {
            cmp_nulls_last(timestamps[a].as_timestamp(), timestamps[b].as_timestamp())
        })
    });

    table.reorder_rows(&order);
    Ok(())
}

/// Keep exactly the output columns, in output order.
pub fn project_output(table: &CleanTable) -> Result<CleanTable, PipelineError> {
    table.select(&columns::OUTPUT_COLUMNS)
}

/// Sort, then project.
pub fn sort_and_project(mut table: CleanTable) -> Result<CleanTable, PipelineError> {
    sort_orders(&mut table)?;
    project_output(&table)
}
