//! End-to-end monthly forecasting pipeline.
//!
//! Stages run once, in order, and any failure aborts the run:
//!
//! ```text
//! RawTable -> ingest (+ delivery filter) -> aggregate -> damp -> fit -> predict
//! ```
//!
//! [`ForecastPipeline::prepare`] stops after damping so callers can still
//! show the history when fitting fails.
//!
//! # Example
//! ```
//! use monthly_forecast::prelude::*;
//!
//! let mut csv = String::from("date,sales\n");
//! for i in 0..30 {
//!     let year = 2021 + i / 12;
//!     let month = i % 12 + 1;
//!     csv.push_str(&format!("{year}-{month:02}-15,{}\n", 100 + 2 * i));
//! }
//! let table = RawTable::from_csv_reader(csv.as_bytes()).unwrap();
//!
//! let pipeline = ForecastPipeline::new(
//!     ColumnSelection::new("date", "sales"),
//!     PipelineConfig::default().with_horizon(6),
//! );
//! let report = pipeline.run(&table).unwrap();
//! assert_eq!(report.forecast.len(), 36);
//! assert_eq!(report.forecast.projected().len(), 6);
//! ```

mod config;
mod diagnostics;
mod future;

pub use config::{validate_horizon, PipelineConfig, MAX_HORIZON_MONTHS, MIN_HORIZON_MONTHS};
pub use diagnostics::FitDiagnostics;
pub use future::{build_future_frame, future_dates, RegressorFill};

use crate::core::{AggregatedSeries, DampedSeries, ForecastResult, RawTable};
use crate::detection::{damp_upper_outliers, OutlierFence};
use crate::error::Result;
use crate::ingest::{ingest, ColumnSelection, QualityReport};
use crate::models::additive::{AdditiveModel, FitSummary};
use crate::transform::aggregate_monthly;
use crate::utils::calculate_metrics;
use chrono::NaiveDate;
use serde::Serialize;

/// History after ingestion, aggregation and damping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedSeries {
    /// Monthly sums before damping.
    pub aggregated: AggregatedSeries,
    /// The series the model is fitted on.
    pub damped: DampedSeries,
    pub quality: QualityReport,
    /// Regressor columns carried into the fit.
    pub regressors: Vec<String>,
    /// `None` when damping is disabled or there is no history.
    pub fence: Option<OutlierFence>,
    pub damped_months: Vec<NaiveDate>,
}

/// Model output for one prepared series.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub forecast: ForecastResult,
    pub summary: FitSummary,
    /// Fitted values over the history.
    pub fitted: Vec<f64>,
}

/// Everything produced by a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub prepared: PreparedSeries,
    pub forecast: ForecastResult,
    pub diagnostics: FitDiagnostics,
}

impl ForecastReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Fit a fresh model on `series` and predict `horizon` months past it.
///
/// Every regressor column of `series` is registered. Future regressor
/// values come from `config.regressor_fill`.
pub fn fit_and_predict(
    series: &DampedSeries,
    horizon: u32,
    config: &PipelineConfig,
) -> Result<FitOutcome> {
    validate_horizon(horizon)?;
    let fitted = AdditiveModel::new(config.model.clone()).fit(series)?;
    let future = build_future_frame(series, horizon, &config.regressor_fill)?;
    let forecast = fitted.predict(&future)?;
    Ok(FitOutcome {
        forecast,
        summary: fitted.summary().clone(),
        fitted: fitted.fitted_values(),
    })
}

/// Column selection plus configuration for repeated runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPipeline {
    columns: ColumnSelection,
    config: PipelineConfig,
}

impl ForecastPipeline {
    pub fn new(columns: ColumnSelection, config: PipelineConfig) -> Self {
        Self { columns, config }
    }

    pub fn columns(&self) -> &ColumnSelection {
        &self.columns
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingest, filter, aggregate and damp `table`.
    pub fn prepare(&self, table: &RawTable) -> Result<PreparedSeries> {
        self.config.validate()?;

        let ingested = ingest(table, &self.columns)?;
        let aggregated = aggregate_monthly(
            &ingested.points,
            &ingested.regressors,
            self.config.empty_months,
        )?;

        let damping = damp_upper_outliers(&aggregated, &self.config.damping)?;
        let damped_months = damping
            .damped_indices
            .iter()
            .map(|&i| aggregated.dates()[i])
            .collect();

        Ok(PreparedSeries {
            aggregated,
            damped: damping.damped,
            quality: ingested.report,
            regressors: ingested.regressors,
            fence: damping.fence,
            damped_months,
        })
    }

    /// Fit and predict on an already prepared series.
    pub fn forecast(&self, prepared: &PreparedSeries) -> Result<ForecastReport> {
        let outcome = fit_and_predict(&prepared.damped, self.config.horizon_months, &self.config)?;
        let metrics = calculate_metrics(prepared.damped.values(), &outcome.fitted, Some(12))?;
        let diagnostics =
            FitDiagnostics::new(&metrics, &outcome.summary, prepared.damped_months.len());

        tracing::debug!(
            rows = outcome.forecast.len(),
            horizon = self.config.horizon_months,
            rmse = diagnostics.rmse,
            "forecast finished"
        );

        Ok(ForecastReport {
            prepared: prepared.clone(),
            forecast: outcome.forecast,
            diagnostics,
        })
    }

    /// [`prepare`](Self::prepare) followed by [`forecast`](Self::forecast).
    pub fn run(&self, table: &RawTable) -> Result<ForecastReport> {
        let prepared = self.prepare(table)?;
        self.forecast(&prepared)
    }
}
