//! Forecast output: per-month point estimates, intervals and components.

use crate::core::series::AggregatedSeries;
use crate::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// One output period, fitted or projected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    /// Seasonal effects by name (`yearly`, `weekly`).
    pub seasonal: BTreeMap<String, f64>,
    /// Regressor effects by column name.
    pub regressors: BTreeMap<String, f64>,
}

/// The core columns of a [`ForecastRow`] for lightweight consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoreForecastRow {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl From<&ForecastRow> for CoreForecastRow {
    fn from(row: &ForecastRow) -> Self {
        Self {
            ds: row.ds,
            yhat: row.yhat,
            yhat_lower: row.yhat_lower,
            yhat_upper: row.yhat_upper,
        }
    }
}

/// Actual value next to the model's estimate for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub ds: NaiveDate,
    /// Observed (undamped) value; `None` for projected months.
    pub actual: Option<f64>,
    pub yhat: f64,
}

/// Fitted reconstruction of the history followed by the projected horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    rows: Vec<ForecastRow>,
    history_end: NaiveDate,
}

impl ForecastResult {
    /// Wrap rows ordered by `ds`; rows after `history_end` are projections.
    pub fn new(rows: Vec<ForecastRow>, history_end: NaiveDate) -> Self {
        Self { rows, history_end }
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Last date of the history the model was fitted on.
    pub fn history_end(&self) -> NaiveDate {
        self.history_end
    }

    /// Index of the first projected row.
    fn split_index(&self) -> usize {
        self.rows.partition_point(|r| r.ds <= self.history_end)
    }

    /// Rows reconstructing the history.
    pub fn fitted(&self) -> &[ForecastRow] {
        &self.rows[..self.split_index()]
    }

    /// Out-of-sample rows.
    pub fn projected(&self) -> &[ForecastRow] {
        &self.rows[self.split_index()..]
    }

    /// The last `n` rows (all rows when `n` exceeds the length).
    pub fn tail(&self, n: usize) -> &[ForecastRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// The last `n` rows restricted to `ds, yhat, yhat_lower, yhat_upper`.
    pub fn core_tail(&self, n: usize) -> Vec<CoreForecastRow> {
        self.tail(n).iter().map(CoreForecastRow::from).collect()
    }

    /// Series of one component across all rows.
    ///
    /// `trend` and `yhat` are accepted as well as any seasonal or
    /// regressor name. Returns `None` for unknown names.
    pub fn component(&self, name: &str) -> Option<Vec<f64>> {
        match name {
            "trend" => Some(self.rows.iter().map(|r| r.trend).collect()),
            "yhat" => Some(self.rows.iter().map(|r| r.yhat).collect()),
            _ => self
                .rows
                .iter()
                .map(|r| {
                    r.seasonal
                        .get(name)
                        .or_else(|| r.regressors.get(name))
                        .copied()
                })
                .collect(),
        }
    }

    /// Names of all seasonal and regressor components present.
    pub fn component_names(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|r| {
                r.seasonal
                    .keys()
                    .chain(r.regressors.keys())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pair each row with the observed value for the same month.
    pub fn compare_with_history(&self, history: &AggregatedSeries) -> Vec<ComparisonRow> {
        let actual: BTreeMap<NaiveDate, f64> = history
            .dates()
            .iter()
            .copied()
            .zip(history.values().iter().copied())
            .collect();

        self.rows
            .iter()
            .map(|r| ComparisonRow {
                ds: r.ds,
                actual: actual.get(&r.ds).copied(),
                yhat: r.yhat,
            })
            .collect()
    }

    /// Serialize all rows as a JSON array of records.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }

    /// Write the core columns of every row as CSV with a header.
    pub fn write_core_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(CoreForecastRow::from(row))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
