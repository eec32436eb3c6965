//! Configuration of the additive model.

use crate::error::ParamError;
use serde::{Deserialize, Serialize};

/// Trend shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Growth {
    /// Piecewise-linear trend with automatic changepoints.
    #[default]
    Linear,
    /// Constant level.
    Flat,
}

/// Whether a seasonal component is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalityToggle {
    /// Decided from the span and spacing of the history.
    #[default]
    Auto,
    Enabled,
    Disabled,
}

impl SeasonalityToggle {
    pub(crate) fn resolve(self, auto: bool) -> bool {
        match self {
            SeasonalityToggle::Auto => auto,
            SeasonalityToggle::Enabled => true,
            SeasonalityToggle::Disabled => false,
        }
    }
}

/// Options for trend, seasonality, priors, intervals and the fit budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditiveConfig {
    pub growth: Growth,
    /// Maximum number of potential trend changepoints.
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints are placed.
    pub changepoint_range: f64,
    /// Scale of the Laplace prior on changepoint magnitudes.
    pub changepoint_prior_scale: f64,
    pub yearly_seasonality: SeasonalityToggle,
    pub weekly_seasonality: SeasonalityToggle,
    pub yearly_fourier_order: usize,
    pub weekly_fourier_order: usize,
    pub seasonality_prior_scale: f64,
    pub regressor_prior_scale: f64,
    /// Central coverage of the uncertainty interval.
    pub interval_width: f64,
    /// Simulated paths for intervals; 0 selects the analytic band.
    pub uncertainty_samples: usize,
    pub seed: u64,
    pub max_iterations: usize,
    pub tolerance: f64,
    /// Wall-clock budget for fitting and interval simulation.
    pub fit_time_budget_ms: u64,
}

impl Default for AdditiveConfig {
    fn default() -> Self {
        Self {
            growth: Growth::Linear,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            yearly_seasonality: SeasonalityToggle::Auto,
            weekly_seasonality: SeasonalityToggle::Auto,
            yearly_fourier_order: 10,
            weekly_fourier_order: 3,
            seasonality_prior_scale: 10.0,
            regressor_prior_scale: 10.0,
            interval_width: 0.8,
            uncertainty_samples: 1000,
            seed: 0,
            max_iterations: 200,
            tolerance: 1e-6,
            fit_time_budget_ms: 30_000,
        }
    }
}

impl AdditiveConfig {
    pub fn with_growth(mut self, growth: Growth) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_changepoints(mut self, n: usize) -> Self {
        self.n_changepoints = n;
        self
    }

    pub fn with_changepoint_prior_scale(mut self, scale: f64) -> Self {
        self.changepoint_prior_scale = scale;
        self
    }

    pub fn with_yearly_seasonality(mut self, toggle: SeasonalityToggle) -> Self {
        self.yearly_seasonality = toggle;
        self
    }

    pub fn with_weekly_seasonality(mut self, toggle: SeasonalityToggle) -> Self {
        self.weekly_seasonality = toggle;
        self
    }

    pub fn with_interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }

    /// Number of simulated paths (0 for the analytic band).
    pub fn with_uncertainty_samples(mut self, samples: usize) -> Self {
        self.uncertainty_samples = samples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_fit_time_budget_ms(mut self, budget: u64) -> Self {
        self.fit_time_budget_ms = budget;
        self
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        let positive = [
            ("changepoint_prior_scale", self.changepoint_prior_scale),
            ("seasonality_prior_scale", self.seasonality_prior_scale),
            ("regressor_prior_scale", self.regressor_prior_scale),
            ("tolerance", self.tolerance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParamError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ParamError::Invalid(format!(
                "changepoint_range must be in (0, 1], got {}",
                self.changepoint_range
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ParamError::Invalid(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        if self.max_iterations == 0 {
            return Err(ParamError::Invalid("max_iterations must be at least 1".into()));
        }
        if self.fit_time_budget_ms == 0 {
            return Err(ParamError::Invalid(
                "fit_time_budget_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
