//! Month-keyed series shared by the aggregation, damping and fitting stages.

use crate::error::{Result, SchemaError};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// One observation: a date, the target value and its regressor values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub ds: NaiveDate,
    pub y: f64,
    pub regressors: BTreeMap<String, f64>,
}

/// An ordered series with one row per distinct date.
///
/// Values are stored column-major: `y[i]` and `regressors[name][i]` belong
/// to `dates[i]`. Regressor cells that had no source values are `NaN`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlySeries {
    dates: Vec<NaiveDate>,
    y: Vec<f64>,
    regressors: BTreeMap<String, Vec<f64>>,
}

/// Output of monthly aggregation.
pub type AggregatedSeries = MonthlySeries;

/// Aggregated series after upper-outlier damping of `y`.
pub type DampedSeries = MonthlySeries;

impl MonthlySeries {
    /// Create a series, checking that dates strictly increase and that
    /// every column has one value per date.
    pub fn new(
        dates: Vec<NaiveDate>,
        y: Vec<f64>,
        regressors: BTreeMap<String, Vec<f64>>,
    ) -> Result<Self> {
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(SchemaError::NonIncreasingDates {
                previous: w[0],
                next: w[1],
            }
            .into());
        }
        check_len(dates.len(), y.len())?;
        for values in regressors.values() {
            check_len(dates.len(), values.len())?;
        }
        Ok(Self {
            dates,
            y,
            regressors,
        })
    }

    /// Univariate series without regressors.
    pub fn univariate(dates: Vec<NaiveDate>, y: Vec<f64>) -> Result<Self> {
        Self::new(dates, y, BTreeMap::new())
    }

    /// Number of periods.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.y
    }

    pub fn regressors(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.regressors
    }

    pub fn regressor(&self, name: &str) -> Option<&[f64]> {
        self.regressors.get(name).map(|v| v.as_slice())
    }

    pub fn regressor_names(&self) -> impl Iterator<Item = &str> {
        self.regressors.keys().map(|k| k.as_str())
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Point at `index`, or `None` when out of range.
    pub fn point(&self, index: usize) -> Option<TimeSeriesPoint> {
        let ds = *self.dates.get(index)?;
        Some(TimeSeriesPoint {
            ds,
            y: self.y[index],
            regressors: self
                .regressors
                .iter()
                .map(|(name, values)| (name.clone(), values[index]))
                .collect(),
        })
    }

    /// Iterate over all points in date order.
    pub fn points(&self) -> impl Iterator<Item = TimeSeriesPoint> + '_ {
        (0..self.len()).filter_map(|i| self.point(i))
    }

    /// Copy of this series with `y` replaced; dates and regressors are kept.
    pub fn with_values(&self, y: Vec<f64>) -> Result<Self> {
        check_len(self.dates.len(), y.len())?;
        Ok(Self {
            dates: self.dates.clone(),
            y,
            regressors: self.regressors.clone(),
        })
    }
}

fn check_len(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(SchemaError::LengthMismatch { expected, got }.into());
    }
    Ok(())
}
