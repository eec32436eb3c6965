//! In-sample accuracy metrics for fitted values.

use crate::error::{FitError, Result, SchemaError};
use serde::Serialize;

/// Accuracy of fitted values against the series they were fitted on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (None if zeros in actual)
    pub mape: Option<f64>,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
    /// Mean Absolute Scaled Error (None if insufficient data)
    pub mase: Option<f64>,
    /// R-squared (coefficient of determination)
    pub r_squared: f64,
}

/// Calculate accuracy metrics between actual and predicted values.
///
/// `seasonal_period` selects the naive benchmark used by MASE; monthly
/// series use 12.
pub fn calculate_metrics(
    actual: &[f64],
    predicted: &[f64],
    seasonal_period: Option<usize>,
) -> Result<AccuracyMetrics> {
    if actual.is_empty() {
        return Err(FitError::InsufficientHistory { needed: 1, got: 0 }.into());
    }

    if actual.len() != predicted.len() {
        return Err(SchemaError::LengthMismatch {
            expected: actual.len(),
            got: predicted.len(),
        }
        .into());
    }

    let n = actual.len() as f64;
    let pairs = || actual.iter().zip(predicted.iter());

    let mae = pairs().map(|(a, p)| (a - p).abs()).sum::<f64>() / n;
    let mse = pairs().map(|(a, p)| (a - p).powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let mape = if actual.contains(&0.0) {
        None
    } else {
        let sum: f64 = pairs().map(|(a, p)| ((a - p) / a).abs()).sum();
        Some(100.0 * sum / n)
    };

    let smape = pairs()
        .map(|(a, p)| {
            let denom = a.abs() + p.abs();
            if denom == 0.0 {
                0.0
            } else {
                2.0 * (a - p).abs() / denom
            }
        })
        .sum::<f64>()
        * 100.0
        / n;

    let mase = calculate_mase(actual, mae, seasonal_period);

    let mean_actual = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    let ss_res = mse * n;
    let r_squared = if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(AccuracyMetrics {
        mae,
        mse,
        rmse,
        mape,
        smape,
        mase,
        r_squared,
    })
}

/// MASE = MAE / MAE of the (seasonal) naive forecast.
fn calculate_mase(actual: &[f64], mae: f64, seasonal_period: Option<usize>) -> Option<f64> {
    let n = actual.len();
    let period = seasonal_period.unwrap_or(1);

    if n <= period {
        return None;
    }

    let naive_mae: f64 = actual
        .iter()
        .skip(period)
        .zip(actual.iter())
        .map(|(curr, prev)| (curr - prev).abs())
        .sum::<f64>()
        / (n - period) as f64;

    if naive_mae == 0.0 {
        return None;
    }

    Some(mae / naive_mae)
}
