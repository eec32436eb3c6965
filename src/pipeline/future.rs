//! Future frame construction: month-end dates past the history and the
//! regressor values assumed for them.

use crate::core::calendar::add_months;
use crate::core::DampedSeries;
use crate::error::{FitError, ParamError, Result};
use crate::models::additive::FutureFrame;
use crate::transform::forward_back_fill;
use crate::utils::{calculate_metrics, fit_line};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// R^2 of a straight line above which a regressor counts as trending.
const TRENDING_R_SQUARED: f64 = 0.5;

/// How regressor values are obtained for future months.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressorFill {
    /// Carry the last observed value forward. Biased when the regressor trends.
    #[default]
    LastValue,
    /// Extend an OLS line fitted over the regressor's history.
    LinearTrend,
    /// Values supplied by the caller, exactly one per future month.
    CallerSupplied(BTreeMap<String, Vec<f64>>),
}

/// The `horizon` month-end dates following `last`.
pub fn future_dates(last: NaiveDate, horizon: u32) -> Vec<NaiveDate> {
    (1..=horizon).map(|i| add_months(last, i)).collect()
}

/// Build the frame of `horizon` months after the end of `history`.
pub fn build_future_frame(
    history: &DampedSeries,
    horizon: u32,
    fill: &RegressorFill,
) -> Result<FutureFrame> {
    let last = history
        .last_date()
        .ok_or(FitError::InsufficientHistory { needed: 2, got: 0 })?;
    let dates = future_dates(last, horizon);
    let h = dates.len();

    let mut regressors = BTreeMap::new();
    for (name, raw) in history.regressors() {
        let filled = forward_back_fill(raw).ok_or_else(|| FitError::NullRegressor {
            name: name.clone(),
        })?;

        let values = match fill {
            RegressorFill::LastValue => {
                if is_trending(&filled) {
                    tracing::warn!(
                        regressor = %name,
                        "regressor trends over the history; carrying its last value forward biases the forecast"
                    );
                }
                let last_value = filled.last().copied().unwrap_or(f64::NAN);
                vec![last_value; h]
            }
            RegressorFill::LinearTrend => {
                let line = fit_line(&filled)?;
                let n = filled.len();
                (0..h).map(|i| line.predict((n + i) as f64)).collect()
            }
            RegressorFill::CallerSupplied(supplied) => {
                let values = supplied.get(name).ok_or_else(|| {
                    ParamError::MissingFutureRegressor { name: name.clone() }
                })?;
                if values.len() != h {
                    return Err(ParamError::FutureRegressorLength {
                        name: name.clone(),
                        expected: h,
                        got: values.len(),
                    }
                    .into());
                }
                values.clone()
            }
        };
        regressors.insert(name.clone(), values);
    }

    if let RegressorFill::CallerSupplied(supplied) = fill {
        let unused: Vec<&str> = supplied
            .keys()
            .filter(|k| !regressors.contains_key(*k))
            .map(|k| k.as_str())
            .collect();
        if !unused.is_empty() {
            tracing::debug!(?unused, "ignoring future values for unregistered regressors");
        }
    }

    Ok(FutureFrame::new(dates, regressors))
}

/// Whether a straight line explains most of the variation of `values`.
fn is_trending(values: &[f64]) -> bool {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if values.len() < 3 || max <= min {
        return false;
    }
    let Ok(line) = fit_line(values) else {
        return false;
    };
    let predicted: Vec<f64> = (0..values.len()).map(|i| line.predict(i as f64)).collect();
    calculate_metrics(values, &predicted, None)
        .map(|m| line.slope.abs() > 1e-12 && m.r_squared >= TRENDING_R_SQUARED)
        .unwrap_or(false)
}
