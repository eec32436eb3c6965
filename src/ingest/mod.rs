//! Ingestion and validation of raw tabular input.
//!
//! Turns a [`RawTable`] plus a [`ColumnSelection`] into date-sorted
//! [`TimeSeriesPoint`]s:
//! - the selection is checked against the header (schema errors abort)
//! - the optional order/delivery consistency filter runs on the raw rows
//! - rows with unparsable dates or missing/non-numeric targets are dropped
//!   and counted, never fatal
//! - the result is stably sorted by date

pub mod coerce;
mod columns;
pub mod consistency;
mod report;

pub use columns::{resolve_columns, ColumnSelection, ResolvedColumns};
pub use consistency::{filter_future_deliveries, ConsistencyCheck};
pub use report::QualityReport;

use crate::core::{RawTable, TimeSeriesPoint};
use crate::error::{DataQualityWarning, Result};
use coerce::{coerce_date, coerce_number, NumericCell};

/// Cleaned, date-sorted rows ready for aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedRows {
    pub points: Vec<TimeSeriesPoint>,
    /// Regressor columns carried on every point, in selection order.
    pub regressors: Vec<String>,
    pub report: QualityReport,
}

/// Validate, filter and clean `table` according to `selection`.
pub fn ingest(table: &RawTable, selection: &ColumnSelection) -> Result<IngestedRows> {
    let resolved = resolve_columns(table, selection)?;
    let mut report = QualityReport::new(table.len());

    if !resolved.ignored_regressors.is_empty() {
        report.warn(DataQualityWarning::IgnoredRegressors {
            names: resolved.ignored_regressors.clone(),
        });
    }

    let mut filtered = table.clone();
    let check = filter_future_deliveries(
        &mut filtered,
        selection.order_date_column.as_deref(),
        selection.delivery_date_column.as_deref(),
    );
    consistency::record_check(&mut report, &check);

    let points = clean_rows(&filtered, &resolved, selection, &mut report);

    tracing::debug!(
        input_rows = report.input_rows,
        output_rows = report.output_rows,
        dropped = report.dropped_rows(),
        "ingestion finished"
    );

    Ok(IngestedRows {
        points,
        regressors: resolved.regressors.into_iter().map(|(name, _)| name).collect(),
        report,
    })
}

/// Coerce dates and values, drop unusable rows and sort by date.
///
/// Ties in date keep their original relative order. Regressor cells that
/// cannot be coerced are kept as `NaN` and do not cause the row to drop.
pub fn clean_rows(
    table: &RawTable,
    resolved: &ResolvedColumns,
    selection: &ColumnSelection,
    report: &mut QualityReport,
) -> Vec<TimeSeriesPoint> {
    let mut unparsable_dates = 0;
    let mut missing_values = 0;
    let mut non_numeric_values = 0;

    let mut points: Vec<TimeSeriesPoint> = Vec::with_capacity(table.len());
    for row in table.rows() {
        let Some(ds) = coerce_date(&row[resolved.date]) else {
            unparsable_dates += 1;
            continue;
        };
        let y = match coerce_number(&row[resolved.value]) {
            NumericCell::Value(v) => v,
            NumericCell::Missing => {
                missing_values += 1;
                continue;
            }
            NumericCell::NonNumeric => {
                non_numeric_values += 1;
                continue;
            }
        };
        let regressors = resolved
            .regressors
            .iter()
            .map(|(name, idx)| (name.clone(), coerce_number(&row[*idx]).or_nan()))
            .collect();
        points.push(TimeSeriesPoint { ds, y, regressors });
    }

    points.sort_by_key(|p| p.ds);

    report.unparsable_dates += unparsable_dates;
    report.missing_values += missing_values;
    report.non_numeric_values += non_numeric_values;
    report.output_rows = points.len();

    if unparsable_dates > 0 {
        report.warn(DataQualityWarning::UnparsableDates {
            column: selection.date_column.clone(),
            count: unparsable_dates,
        });
    }
    if missing_values > 0 {
        report.warn(DataQualityWarning::MissingValues {
            column: selection.value_column.clone(),
            count: missing_values,
        });
    }
    if non_numeric_values > 0 {
        report.warn(DataQualityWarning::NonNumericValues {
            column: selection.value_column.clone(),
            count: non_numeric_values,
        });
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Scalar;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn csv(text: &str) -> RawTable {
        RawTable::from_csv_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn drops_bad_rows_and_sorts_stably() {
        let table = csv(
            "date,sales,promo\n\
             2023-02-10,80,1\n\
             not-a-date,5,0\n\
             2023-01-20,50,\n\
             2023-01-05,,1\n\
             2023-01-20,7,0\n\
             2023-01-05,100,x\n\
             2023-03-01,abc,1\n",
        );
        let selection = ColumnSelection::new("date", "sales").with_regressors(["promo"]);
        let ingested = ingest(&table, &selection).unwrap();

        let rows: Vec<_> = ingested.points.iter().map(|p| (p.ds, p.y)).collect();
        assert_eq!(
            rows,
            vec![
                (d(2023, 1, 5), 100.0),
                (d(2023, 1, 20), 50.0),
                (d(2023, 1, 20), 7.0),
                (d(2023, 2, 10), 80.0),
            ]
        );
        assert!(ingested.points[0].regressors["promo"].is_nan());
        assert!(ingested.points[1].regressors["promo"].is_nan());
        assert_eq!(ingested.points[2].regressors["promo"], 0.0);

        let report = &ingested.report;
        assert_eq!(report.input_rows, 7);
        assert_eq!(report.output_rows, 4);
        assert_eq!(report.unparsable_dates, 1);
        assert_eq!(report.missing_values, 1);
        assert_eq!(report.non_numeric_values, 1);
        assert_eq!(report.warnings().len(), 3);
    }

    #[test]
    fn consistency_filter_runs_before_cleaning() {
        let table = RawTable::new(
            vec!["order".into(), "delivery".into(), "amount".into()],
            vec![
                vec!["2023-01-01".into(), "2023-01-05".into(), Scalar::Number(1.0)],
                vec!["2023-02-01".into(), "2023-02-20".into(), Scalar::Number(2.0)],
                vec!["2023-02-10".into(), "2023-02-09".into(), Scalar::Number(3.0)],
            ],
        )
        .unwrap();
        let selection =
            ColumnSelection::new("delivery", "amount").with_order_delivery("order", "delivery");
        let ingested = ingest(&table, &selection).unwrap();

        assert_eq!(ingested.points.len(), 2);
        assert_eq!(ingested.report.future_deliveries, 1);
        assert_eq!(ingested.report.max_order_date, Some(d(2023, 2, 10)));
        assert!(ingested
            .points
            .iter()
            .all(|p| p.ds <= d(2023, 2, 10)));
    }

    #[test]
    fn unknown_regressors_are_reported_not_fatal() {
        let table = csv("ds,y,promo\n2023-01-01,1,0\n");
        let selection = ColumnSelection::new("ds", "y").with_regressors(["promo", "price"]);
        let ingested = ingest(&table, &selection).unwrap();

        assert_eq!(ingested.regressors, vec!["promo".to_string()]);
        assert_eq!(
            ingested.report.warnings()[0],
            DataQualityWarning::IgnoredRegressors {
                names: vec!["price".into()]
            }
        );
    }
}
