//! Calendar-month aggregation.
//!
//! Rows are bucketed by the month of their date and summed. Each bucket is
//! keyed by the last day of its month.

use crate::core::calendar::{add_months, month_end, months_between};
use crate::core::{AggregatedSeries, TimeSeriesPoint};
use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do with months inside the observed range that have no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyMonthPolicy {
    /// Leave the month out of the series.
    #[default]
    Omit,
    /// Emit the month with `y = 0` and every regressor `0`.
    ZeroFill,
}

#[derive(Default)]
struct Bucket {
    y: f64,
    regressors: BTreeMap<String, RegressorSum>,
}

#[derive(Default, Clone, Copy)]
struct RegressorSum {
    sum: f64,
    observed: usize,
}

impl RegressorSum {
    fn value(self) -> f64 {
        if self.observed == 0 {
            f64::NAN
        } else {
            self.sum
        }
    }
}

/// Sum `points` into one row per calendar month.
///
/// `regressors` lists the regressor columns to carry. `NaN` regressor
/// cells are skipped when summing; a month with no finite cell for a
/// regressor gets `NaN` for it. The output does not depend on the order
/// of `points`.
pub fn aggregate_monthly(
    points: &[TimeSeriesPoint],
    regressors: &[String],
    policy: EmptyMonthPolicy,
) -> Result<AggregatedSeries> {
    let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();

    for point in points {
        let bucket = buckets.entry(month_end(point.ds)).or_default();
        bucket.y += point.y;
        for name in regressors {
            let slot = bucket.regressors.entry(name.clone()).or_default();
            if let Some(v) = point.regressors.get(name).copied().filter(|v| v.is_finite()) {
                slot.sum += v;
                slot.observed += 1;
            }
        }
    }

    if policy == EmptyMonthPolicy::ZeroFill {
        zero_fill(&mut buckets, regressors);
    }

    let mut dates = Vec::with_capacity(buckets.len());
    let mut y = Vec::with_capacity(buckets.len());
    let mut columns: BTreeMap<String, Vec<f64>> = regressors
        .iter()
        .map(|name| (name.clone(), Vec::with_capacity(buckets.len())))
        .collect();

    for (ds, bucket) in buckets {
        dates.push(ds);
        y.push(bucket.y);
        for (name, column) in columns.iter_mut() {
            let value = bucket
                .regressors
                .get(name)
                .copied()
                .unwrap_or_default()
                .value();
            column.push(value);
        }
    }

    tracing::debug!(
        rows = points.len(),
        months = dates.len(),
        ?policy,
        "aggregated to monthly buckets"
    );

    AggregatedSeries::new(dates, y, columns)
}

fn zero_fill(buckets: &mut BTreeMap<NaiveDate, Bucket>, regressors: &[String]) {
    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return;
    };
    let span = months_between(first, last);
    for offset in 1..span {
        let ds = add_months(first, offset as u32);
        buckets.entry(ds).or_insert_with(|| Bucket {
            y: 0.0,
            regressors: regressors
                .iter()
                .map(|name| {
                    (
                        name.clone(),
                        RegressorSum {
                            sum: 0.0,
                            observed: 1,
                        },
                    )
                })
                .collect(),
        });
    }
}
