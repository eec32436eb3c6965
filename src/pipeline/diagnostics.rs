//! In-sample fit diagnostics.

use crate::models::FitSummary;
use crate::utils::AccuracyMetrics;
use serde::Serialize;

/// How well the fitted reconstruction matches the damped history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitDiagnostics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// `None` when the history contains a zero month.
    pub mape: Option<f64>,
    pub smape: f64,
    /// Scaled against the seasonal naive forecast; `None` with a year or
    /// less of history.
    pub mase: Option<f64>,
    pub r_squared: f64,
    /// Months whose value was damped before fitting.
    pub damped_months: usize,
    pub iterations: usize,
    pub converged: bool,
    /// Residual standard deviation in the units of the target.
    pub sigma: f64,
}

impl FitDiagnostics {
    pub fn new(metrics: &AccuracyMetrics, summary: &FitSummary, damped_months: usize) -> Self {
        Self {
            mae: metrics.mae,
            mse: metrics.mse,
            rmse: metrics.rmse,
            mape: metrics.mape,
            smape: metrics.smape,
            mase: metrics.mase,
            r_squared: metrics.r_squared,
            damped_months,
            iterations: summary.iterations,
            converged: summary.converged,
            sigma: summary.sigma,
        }
    }
}
