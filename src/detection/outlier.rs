//! Upper-outlier damping of the aggregated series.
//!
//! Months above `Q3 + multiplier * IQR` are not removed: their value is
//! scaled down by a damping factor so the fit keeps every month while the
//! spike loses most of its leverage. Low values are never touched, and
//! neither are non-positive values above the fence, so a damped month is
//! never larger than the original.

use crate::core::{AggregatedSeries, DampedSeries};
use crate::error::{ParamError, Result};
use crate::utils::stats::quantile;
use serde::{Deserialize, Serialize};

/// Configuration for upper-outlier damping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DampingConfig {
    /// Apply damping at all.
    pub enabled: bool,
    /// IQR multiplier for the upper fence.
    pub iqr_multiplier: f64,
    /// Factor applied to values above the fence.
    pub damping_factor: f64,
}

impl Default for DampingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            iqr_multiplier: 3.0,
            damping_factor: 0.5,
        }
    }
}

impl DampingConfig {
    /// Damping with the given fence multiplier and the default halving.
    pub fn iqr(multiplier: f64) -> Self {
        Self {
            iqr_multiplier: multiplier,
            ..Default::default()
        }
    }

    pub fn with_damping_factor(mut self, factor: f64) -> Self {
        self.damping_factor = factor;
        self
    }

    /// No damping; the damped series equals the aggregated one.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ParamError> {
        if !(self.iqr_multiplier.is_finite() && self.iqr_multiplier >= 0.0) {
            return Err(ParamError::Invalid(format!(
                "iqr_multiplier must be finite and non-negative, got {}",
                self.iqr_multiplier
            )));
        }
        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            return Err(ParamError::Invalid(format!(
                "damping_factor must be in (0, 1], got {}",
                self.damping_factor
            )));
        }
        Ok(())
    }
}

/// Quartiles and fence computed for one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierFence {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub upper: f64,
}

impl OutlierFence {
    /// Compute the fence over `values` with linearly interpolated quartiles.
    ///
    /// Returns `None` for an empty series.
    pub fn compute(values: &[f64], multiplier: f64) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let q1 = quantile(values, 0.25);
        let q3 = quantile(values, 0.75);
        let iqr = (q3 - q1).max(0.0);
        Some(Self {
            q1,
            q3,
            iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    pub fn is_outlier(&self, value: f64) -> bool {
        value > self.upper
    }
}

/// Outcome of damping one series.
#[derive(Debug, Clone, PartialEq)]
pub struct DampingResult {
    pub damped: DampedSeries,
    /// `None` when damping is disabled or the series is empty.
    pub fence: Option<OutlierFence>,
    /// Positions whose value was damped.
    pub damped_indices: Vec<usize>,
}

/// Damp upper outliers in `series.y`; regressors are copied untouched.
pub fn damp_upper_outliers(
    series: &AggregatedSeries,
    config: &DampingConfig,
) -> Result<DampingResult> {
    config.validate()?;

    let fence = if config.enabled {
        OutlierFence::compute(series.values(), config.iqr_multiplier)
    } else {
        None
    };

    let Some(fence) = fence else {
        return Ok(DampingResult {
            damped: series.clone(),
            fence: None,
            damped_indices: Vec::new(),
        });
    };

    let mut damped_indices = Vec::new();
    let values: Vec<f64> = series
        .values()
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            // scaling a non-positive value would raise it
            if fence.is_outlier(y) && y > 0.0 {
                damped_indices.push(i);
                y * config.damping_factor
            } else {
                y
            }
        })
        .collect();

    if !damped_indices.is_empty() {
        tracing::debug!(
            upper = fence.upper,
            count = damped_indices.len(),
            "damped upper outliers"
        );
    }

    Ok(DampingResult {
        damped: series.with_values(values)?,
        fence: Some(fence),
        damped_indices,
    })
}
