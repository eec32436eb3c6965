//! Order/delivery date consistency filter.
//!
//! A delivery cannot be later than the latest order known to the dataset.
//! Rows that violate this are treated as data-entry errors and removed;
//! they are never corrected.

use crate::core::RawTable;
use crate::error::DataQualityWarning;
use crate::ingest::coerce::coerce_date;
use crate::ingest::report::QualityReport;
use chrono::NaiveDate;

/// What the filter did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyCheck {
    /// The filter ran and removed `removed` rows.
    Applied {
        max_order_date: NaiveDate,
        removed: usize,
    },
    /// One of the two columns was not selected; the table is unchanged.
    NotSelected,
    /// The columns were selected but could not be used.
    Skipped { reason: String },
}

/// Drop rows whose delivery date is after the maximum order date.
///
/// The maximum is taken over every row of `table`. Rows whose delivery
/// date cannot be parsed cannot satisfy the condition and are dropped too.
/// Passes the table through unchanged when either column is not selected
/// or not present.
pub fn filter_future_deliveries(
    table: &mut RawTable,
    order_column: Option<&str>,
    delivery_column: Option<&str>,
) -> ConsistencyCheck {
    let (Some(order_column), Some(delivery_column)) = (order_column, delivery_column) else {
        return ConsistencyCheck::NotSelected;
    };

    let (Some(order_idx), Some(delivery_idx)) = (
        table.column_index(order_column),
        table.column_index(delivery_column),
    ) else {
        return ConsistencyCheck::Skipped {
            reason: format!(
                "columns '{}' and '{}' are not both present",
                order_column, delivery_column
            ),
        };
    };

    let Some(max_order_date) = table
        .rows()
        .iter()
        .filter_map(|row| coerce_date(&row[order_idx]))
        .max()
    else {
        return ConsistencyCheck::Skipped {
            reason: format!("no parsable dates in '{}'", order_column),
        };
    };

    let before = table.len();
    table.retain_rows(|row| {
        coerce_date(&row[delivery_idx]).is_some_and(|delivered| delivered <= max_order_date)
    });
    let removed = before - table.len();

    tracing::debug!(%max_order_date, removed, "date consistency filter applied");

    ConsistencyCheck::Applied {
        max_order_date,
        removed,
    }
}

/// Fold the filter outcome into a quality report.
pub fn record_check(report: &mut QualityReport, check: &ConsistencyCheck) {
    match check {
        ConsistencyCheck::Applied {
            max_order_date,
            removed,
        } => {
            report.future_deliveries = *removed;
            report.max_order_date = Some(*max_order_date);
            if *removed > 0 {
                report.warn(DataQualityWarning::FutureDeliveries {
                    count: *removed,
                    max_order_date: *max_order_date,
                });
            }
        }
        ConsistencyCheck::NotSelected => {}
        ConsistencyCheck::Skipped { reason } => {
            report.warn(DataQualityWarning::ConsistencyColumnsUnavailable {
                reason: reason.clone(),
            });
        }
    }
}
