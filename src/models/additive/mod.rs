//! Additive decomposition model: piecewise-linear trend, Fourier
//! seasonality and exogenous regressors.
//!
//! The target is modelled as
//!
//! ```text
//! y(t) = g(t) + sum_s s(t) + sum_r beta_r * x_r(t) + eps
//! ```
//!
//! where `g` is a piecewise-linear trend with changepoints over the first part
//! of the history. Coefficients are MAP estimates under Gaussian priors,
//! with a sparsity-inducing Laplace prior on the changepoint magnitudes.
//!
//! A model is a value: [`AdditiveModel::fit`] returns a [`FittedAdditive`]
//! that predicts over the history plus a [`FutureFrame`]. Nothing is kept
//! between fits.
//!
//! # Example
//! ```
//! use monthly_forecast::core::{calendar::add_months, MonthlySeries};
//! use monthly_forecast::models::additive::{AdditiveConfig, AdditiveModel, FutureFrame};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2022, 1, 31).unwrap();
//! let dates: Vec<_> = (0..24).map(|i| add_months(start, i)).collect();
//! let values: Vec<f64> = (0..24).map(|i| 100.0 + 2.0 * i as f64).collect();
//! let series = MonthlySeries::univariate(dates, values).unwrap();
//!
//! let fitted = AdditiveModel::new(AdditiveConfig::default()).fit(&series).unwrap();
//! let future = FutureFrame::univariate(vec![add_months(start, 24)]);
//! let forecast = fitted.predict(&future).unwrap();
//! assert_eq!(forecast.len(), 25);
//! ```

mod config;
mod features;
mod fit;
mod uncertainty;

pub use config::{AdditiveConfig, Growth, SeasonalityToggle};
pub use features::{Seasonality, TimeScale};

use crate::core::{DampedSeries, ForecastResult, ForecastRow};
use crate::error::{FitError, ParamError, Result, SchemaError};
use crate::transform::{abs_max_scale, forward_back_fill, is_binary, standardize, ScaleResult};
use chrono::NaiveDate;
use features::{auto_weekly, auto_yearly, changepoints, hinge_columns};
use fit::{fit_map, Deadline, Prior};
use serde::Serialize;
use std::collections::BTreeMap;
use uncertainty::{analytic_band, simulated_band, Simulation, TrendChanges};

/// Prior scale of the base slope and offset.
const TREND_PRIOR_SCALE: f64 = 5.0;

/// Future dates and regressor values to predict at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FutureFrame {
    pub dates: Vec<NaiveDate>,
    pub regressors: BTreeMap<String, Vec<f64>>,
}

impl FutureFrame {
    pub fn new(dates: Vec<NaiveDate>, regressors: BTreeMap<String, Vec<f64>>) -> Self {
        Self { dates, regressors }
    }

    pub fn univariate(dates: Vec<NaiveDate>) -> Self {
        Self::new(dates, BTreeMap::new())
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Facts about one fit, for diagnostics and logging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitSummary {
    pub iterations: usize,
    pub converged: bool,
    /// Residual standard deviation in the units of the target.
    pub sigma: f64,
    pub n_changepoints: usize,
    pub seasonalities: Vec<String>,
    pub regressors: Vec<String>,
}

/// Unfitted additive model.
#[derive(Debug, Clone, Default)]
pub struct AdditiveModel {
    config: AdditiveConfig,
}

#[derive(Debug, Clone)]
struct RegressorTerm {
    name: String,
    /// Standardization of the filled history (`data` holds the scaled history).
    scaling: ScaleResult,
}

/// Model fitted on one history.
#[derive(Debug, Clone)]
pub struct FittedAdditive {
    config: AdditiveConfig,
    history_dates: Vec<NaiveDate>,
    time_scale: TimeScale,
    y_scale: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    regressors: Vec<RegressorTerm>,
    k: f64,
    m: f64,
    deltas: Vec<f64>,
    seasonal_beta: Vec<f64>,
    regressor_beta: Vec<f64>,
    /// Residual standard deviation on the scaled target.
    sigma: f64,
    summary: FitSummary,
}

impl AdditiveModel {
    pub fn new(config: AdditiveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdditiveConfig {
        &self.config
    }

    /// Fit trend, seasonality and every regressor column of `series`.
    ///
    /// Regressor gaps are forward/back filled. Fails when fewer than two
    /// months exist, when a regressor has no values or is constant, or when
    /// the fit exceeds its time budget.
    pub fn fit(&self, series: &DampedSeries) -> Result<FittedAdditive> {
        let config = &self.config;
        config.validate()?;
        let deadline = Deadline::after_ms(config.fit_time_budget_ms);

        let n = series.len();
        if n < 2 {
            return Err(FitError::InsufficientHistory { needed: 2, got: n }.into());
        }
        if series.values().iter().any(|v| !v.is_finite()) {
            return Err(FitError::Numerical("target contains non-finite values".into()).into());
        }

        let dates = series.dates().to_vec();
        let time_scale = TimeScale::new(dates[0], dates[n - 1]);
        let t = time_scale.scale_all(&dates);
        let y_scaling = abs_max_scale(series.values());
        let y = &y_scaling.data;

        let regressors = prepare_regressors(series)?;

        let linear = config.growth == Growth::Linear;
        let cps = if linear {
            changepoints(&t, config.n_changepoints, config.changepoint_range)
        } else {
            Vec::new()
        };

        let span = time_scale.span_days();
        let mut seasonalities = Vec::new();
        if config.yearly_seasonality.resolve(auto_yearly(span)) && config.yearly_fourier_order > 0
        {
            seasonalities.push(Seasonality::yearly(config.yearly_fourier_order));
        }
        if config.weekly_seasonality.resolve(auto_weekly(&dates, span))
            && config.weekly_fourier_order > 0
        {
            seasonalities.push(Seasonality::weekly(config.weekly_fourier_order));
        }

        let mut columns: Vec<Vec<f64>> = Vec::new();
        let mut priors: Vec<Prior> = Vec::new();
        if linear {
            columns.push(t.clone());
            priors.push(Prior::Gaussian(TREND_PRIOR_SCALE));
        }
        columns.push(vec![1.0; n]);
        priors.push(Prior::Gaussian(TREND_PRIOR_SCALE));
        for col in hinge_columns(&t, &cps) {
            columns.push(col);
            priors.push(Prior::Laplace(config.changepoint_prior_scale));
        }
        for season in &seasonalities {
            for col in season.columns(&dates) {
                columns.push(col);
                priors.push(Prior::Gaussian(config.seasonality_prior_scale));
            }
        }
        for term in &regressors {
            columns.push(term.scaling.data.clone());
            priors.push(Prior::Gaussian(config.regressor_prior_scale));
        }

        let estimate = fit_map(
            &columns,
            y,
            &priors,
            config.max_iterations,
            config.tolerance,
            &deadline,
        )?;

        let mut beta = estimate.beta.into_iter();
        let k = if linear { beta.next().unwrap_or(0.0) } else { 0.0 };
        let m = beta.next().unwrap_or(0.0);
        let deltas: Vec<f64> = beta.by_ref().take(cps.len()).collect();
        let n_seasonal: usize = seasonalities.iter().map(Seasonality::width).sum();
        let seasonal_beta: Vec<f64> = beta.by_ref().take(n_seasonal).collect();
        let regressor_beta: Vec<f64> = beta.collect();

        let summary = FitSummary {
            iterations: estimate.iterations,
            converged: estimate.converged,
            sigma: estimate.sigma * y_scaling.scale,
            n_changepoints: cps.len(),
            seasonalities: seasonalities.iter().map(|s| s.name.clone()).collect(),
            regressors: regressors.iter().map(|r| r.name.clone()).collect(),
        };

        tracing::info!(
            months = n,
            iterations = summary.iterations,
            converged = summary.converged,
            changepoints = summary.n_changepoints,
            regressors = summary.regressors.len(),
            "fitted additive model"
        );
        if !summary.converged {
            tracing::warn!(
                max_iterations = config.max_iterations,
                "additive model did not converge; using last estimate"
            );
        }

        Ok(FittedAdditive {
            config: config.clone(),
            history_dates: dates,
            time_scale,
            y_scale: y_scaling.scale,
            changepoints: cps,
            seasonalities,
            regressors,
            k,
            m,
            deltas,
            seasonal_beta,
            regressor_beta,
            sigma: estimate.sigma,
            summary,
        })
    }
}

/// Fill, validate and standardize every regressor of the history.
fn prepare_regressors(series: &DampedSeries) -> Result<Vec<RegressorTerm>> {
    series
        .regressors()
        .iter()
        .map(|(name, raw)| {
            let filled = forward_back_fill(raw).ok_or_else(|| FitError::NullRegressor {
                name: name.clone(),
            })?;
            let first = filled[0];
            if filled.iter().all(|v| (v - first).abs() <= 1e-12 * first.abs().max(1.0)) {
                return Err(FitError::ConstantRegressor {
                    name: name.clone(),
                    value: first,
                }
                .into());
            }
            let scaling = if is_binary(&filled) {
                ScaleResult::identity(&filled)
            } else {
                standardize(&filled)
            };
            Ok(RegressorTerm {
                name: name.clone(),
                scaling,
            })
        })
        .collect()
}

impl FittedAdditive {
    pub fn summary(&self) -> &FitSummary {
        &self.summary
    }

    /// Fitted values over the history, in the units of the target.
    pub fn fitted_values(&self) -> Vec<f64> {
        let t = self.time_scale.scale_all(&self.history_dates);
        let trend = self.trend(&t);
        let seasonal = self.seasonal_components(&self.history_dates);
        let effects: Vec<Vec<f64>> = self
            .regressors
            .iter()
            .zip(&self.regressor_beta)
            .map(|(term, b)| term.scaling.data.iter().map(|x| b * x * self.y_scale).collect())
            .collect();
        (0..t.len())
            .map(|i| {
                trend[i]
                    + seasonal.values().map(|s| s[i]).sum::<f64>()
                    + effects.iter().map(|e| e[i]).sum::<f64>()
            })
            .collect()
    }

    /// Predict over the history followed by `future`.
    pub fn predict(&self, future: &FutureFrame) -> Result<ForecastResult> {
        let history_end = *self
            .history_dates
            .last()
            .ok_or(FitError::InsufficientHistory { needed: 2, got: 0 })?;

        let mut previous = history_end;
        for &date in &future.dates {
            if date <= previous {
                return Err(SchemaError::NonIncreasingDates {
                    previous,
                    next: date,
                }
                .into());
            }
            previous = date;
        }

        let dates: Vec<NaiveDate> = self
            .history_dates
            .iter()
            .chain(&future.dates)
            .copied()
            .collect();
        let t = self.time_scale.scale_all(&dates);

        let trend = self.trend(&t);
        let seasonal = self.seasonal_components(&dates);
        let mut effects: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (term, &b) in self.regressors.iter().zip(&self.regressor_beta) {
            let future_values = future.regressors.get(&term.name).ok_or_else(|| {
                ParamError::MissingFutureRegressor {
                    name: term.name.clone(),
                }
            })?;
            if future_values.len() != future.len() {
                return Err(ParamError::FutureRegressorLength {
                    name: term.name.clone(),
                    expected: future.len(),
                    got: future_values.len(),
                }
                .into());
            }
            if future_values.iter().any(|v| !v.is_finite()) {
                return Err(ParamError::Invalid(format!(
                    "future values of regressor '{}' must be finite",
                    term.name
                ))
                .into());
            }
            let scaled = term
                .scaling
                .data
                .iter()
                .copied()
                .chain(term.scaling.transform(future_values));
            effects.insert(
                term.name.clone(),
                scaled.map(|x| b * x * self.y_scale).collect(),
            );
        }

        let yhat: Vec<f64> = (0..dates.len())
            .map(|i| {
                trend[i]
                    + seasonal.values().map(|s| s[i]).sum::<f64>()
                    + effects.values().map(|e| e[i]).sum::<f64>()
            })
            .collect();

        let (lower, upper) = self.band(&yhat, &t)?;

        let rows = dates
            .iter()
            .enumerate()
            .map(|(i, &ds)| ForecastRow {
                ds,
                yhat: yhat[i],
                yhat_lower: lower[i],
                yhat_upper: upper[i],
                trend: trend[i],
                seasonal: seasonal.iter().map(|(k, v)| (k.clone(), v[i])).collect(),
                regressors: effects.iter().map(|(k, v)| (k.clone(), v[i])).collect(),
            })
            .collect();

        Ok(ForecastResult::new(rows, history_end))
    }

    /// Piecewise-linear trend in the units of the target.
    fn trend(&self, t: &[f64]) -> Vec<f64> {
        t.iter()
            .map(|&ti| {
                let bends: f64 = self
                    .changepoints
                    .iter()
                    .zip(&self.deltas)
                    .map(|(&s, &d)| d * (ti - s).max(0.0))
                    .sum();
                (self.k * ti + self.m + bends) * self.y_scale
            })
            .collect()
    }

    fn seasonal_components(&self, dates: &[NaiveDate]) -> BTreeMap<String, Vec<f64>> {
        let mut offset = 0;
        let mut out = BTreeMap::new();
        for season in &self.seasonalities {
            let coefs = &self.seasonal_beta[offset..offset + season.width()];
            offset += season.width();
            let mut values = vec![0.0; dates.len()];
            for (col, &b) in season.columns(dates).iter().zip(coefs) {
                for (v, x) in values.iter_mut().zip(col) {
                    *v += b * x * self.y_scale;
                }
            }
            out.insert(season.name.clone(), values);
        }
        out
    }

    fn band(&self, yhat: &[f64], t: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let config = &self.config;
        if config.uncertainty_samples == 0 {
            return Ok(analytic_band(
                yhat,
                self.sigma * self.y_scale,
                config.interval_width,
            ));
        }

        let trend = (config.growth == Growth::Linear && !self.deltas.is_empty()).then(|| {
            TrendChanges {
                n_changepoints: self.changepoints.len(),
                mean_abs_delta: self.deltas.iter().map(|d| d.abs()).sum::<f64>()
                    / self.deltas.len() as f64,
            }
        });
        let sim = Simulation {
            samples: config.uncertainty_samples,
            interval_width: config.interval_width,
            seed: config.seed,
            y_scale: self.y_scale,
        };
        // Prediction gets its own budget, independent of when the fit ran.
        let deadline = Deadline::after_ms(config.fit_time_budget_ms);
        simulated_band(yhat, t, self.sigma, trend, &sim, &deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::add_months;
    use crate::core::MonthlySeries;
    use crate::error::ForecastError;
    use approx::assert_relative_eq;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, 31).unwrap()
    }

    fn month_dates(n: usize) -> Vec<NaiveDate> {
        (0..n).map(|i| add_months(start(), i as u32)).collect()
    }

    fn future_dates(n: usize, after: usize) -> Vec<NaiveDate> {
        (0..n).map(|i| add_months(start(), (after + i) as u32)).collect()
    }

    fn seasonal_series(n: usize) -> MonthlySeries {
        let values = (0..n)
            .map(|i| {
                let month = (i % 12) as f64;
                200.0 + 3.0 * i as f64 + 25.0 * (2.0 * std::f64::consts::PI * month / 12.0).sin()
            })
            .collect();
        MonthlySeries::univariate(month_dates(n), values).unwrap()
    }

    #[test]
    fn fits_linear_trend_closely() {
        let values: Vec<f64> = (0..24).map(|i| 100.0 + 5.0 * i as f64).collect();
        let series = MonthlySeries::univariate(month_dates(24), values.clone()).unwrap();
        let config = AdditiveConfig::default()
            .with_yearly_seasonality(SeasonalityToggle::Disabled)
            .with_uncertainty_samples(0);
        let fitted = AdditiveModel::new(config).fit(&series).unwrap();

        for (f, y) in fitted.fitted_values().iter().zip(&values) {
            assert_relative_eq!(*f, *y, epsilon = 2.0);
        }

        let forecast = fitted
            .predict(&FutureFrame::univariate(future_dates(3, 24)))
            .unwrap();
        let projected = forecast.projected();
        assert_eq!(projected.len(), 3);
        assert!(projected[2].yhat > projected[0].yhat);
        assert_relative_eq!(projected[0].yhat, 220.0, epsilon = 10.0);
    }

    #[test]
    fn yearly_seasonality_is_detected_and_decomposed() {
        let series = seasonal_series(36);
        let fitted = AdditiveModel::new(AdditiveConfig::default().with_uncertainty_samples(0))
            .fit(&series)
            .unwrap();
        assert_eq!(fitted.summary().seasonalities, vec!["yearly".to_string()]);

        let forecast = fitted
            .predict(&FutureFrame::univariate(future_dates(6, 36)))
            .unwrap();
        for row in forecast.rows() {
            let total = row.trend + row.seasonal["yearly"];
            assert_relative_eq!(row.yhat, total, epsilon = 1e-9);
            assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
        }
    }

    #[test]
    fn regressor_effect_is_learned() {
        let n = 30;
        let promo: Vec<f64> = (0..n).map(|i| if i % 4 == 0 { 1.0 } else { 0.0 }).collect();
        let values: Vec<f64> = promo.iter().map(|p| 500.0 + 80.0 * p).collect();
        let mut regressors = BTreeMap::new();
        regressors.insert("promo".to_string(), promo);
        let series = MonthlySeries::new(month_dates(n), values, regressors).unwrap();

        let config = AdditiveConfig::default()
            .with_yearly_seasonality(SeasonalityToggle::Disabled)
            .with_uncertainty_samples(0);
        let fitted = AdditiveModel::new(config).fit(&series).unwrap();

        let mut future = BTreeMap::new();
        future.insert("promo".to_string(), vec![1.0, 0.0]);
        let forecast = fitted
            .predict(&FutureFrame::new(future_dates(2, n), future))
            .unwrap();
        let projected = forecast.projected();
        let lift = projected[0].regressors["promo"] - projected[1].regressors["promo"];
        assert_relative_eq!(lift, 80.0, epsilon = 8.0);
    }

    #[test]
    fn rejects_short_history() {
        let series = MonthlySeries::univariate(month_dates(1), vec![10.0]).unwrap();
        let err = AdditiveModel::default().fit(&series).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::Fit(FitError::InsufficientHistory { needed: 2, got: 1 })
        ));
    }

    #[test]
    fn rejects_degenerate_regressors() {
        let mut regressors = BTreeMap::new();
        regressors.insert("empty".to_string(), vec![f64::NAN; 4]);
        let series =
            MonthlySeries::new(month_dates(4), vec![1.0, 2.0, 3.0, 4.0], regressors).unwrap();
        assert!(matches!(
            AdditiveModel::default().fit(&series).unwrap_err(),
            ForecastError::Fit(FitError::NullRegressor { .. })
        ));

        let mut regressors = BTreeMap::new();
        regressors.insert("flat".to_string(), vec![3.0, f64::NAN, 3.0, 3.0]);
        let series =
            MonthlySeries::new(month_dates(4), vec![1.0, 2.0, 3.0, 4.0], regressors).unwrap();
        assert!(matches!(
            AdditiveModel::default().fit(&series).unwrap_err(),
            ForecastError::Fit(FitError::ConstantRegressor { value, .. }) if value == 3.0
        ));
    }

    #[test]
    fn predict_requires_every_future_regressor() {
        let mut regressors = BTreeMap::new();
        regressors.insert("price".to_string(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let series = MonthlySeries::new(
            month_dates(5),
            vec![10.0, 12.0, 13.0, 15.0, 16.0],
            regressors,
        )
        .unwrap();
        let fitted = AdditiveModel::default().fit(&series).unwrap();

        let err = fitted
            .predict(&FutureFrame::univariate(future_dates(2, 5)))
            .unwrap_err();
        assert!(matches!(
            err,
            ForecastError::Param(ParamError::MissingFutureRegressor { .. })
        ));

        let mut short = BTreeMap::new();
        short.insert("price".to_string(), vec![6.0]);
        let err = fitted
            .predict(&FutureFrame::new(future_dates(2, 5), short))
            .unwrap_err();
        assert!(matches!(
            err,
            ForecastError::Param(ParamError::FutureRegressorLength {
                expected: 2,
                got: 1,
                ..
            })
        ));
    }

    #[test]
    fn simulated_intervals_are_seeded() {
        let series = seasonal_series(30);
        let config = AdditiveConfig::default()
            .with_uncertainty_samples(300)
            .with_seed(11);
        let future = FutureFrame::univariate(future_dates(4, 30));
        let a = AdditiveModel::new(config.clone())
            .fit(&series)
            .unwrap()
            .predict(&future)
            .unwrap();
        let b = AdditiveModel::new(config)
            .fit(&series)
            .unwrap()
            .predict(&future)
            .unwrap();
        assert_eq!(a, b);
        assert!(a.projected().iter().all(|r| r.yhat_upper > r.yhat_lower));
    }

    #[test]
    fn flat_growth_has_constant_trend() {
        let series = seasonal_series(36);
        let config = AdditiveConfig::default()
            .with_growth(Growth::Flat)
            .with_uncertainty_samples(0);
        let forecast = AdditiveModel::new(config)
            .fit(&series)
            .unwrap()
            .predict(&FutureFrame::univariate(future_dates(3, 36)))
            .unwrap();
        let trend = forecast.component("trend").unwrap();
        assert!(trend.iter().all(|v| (v - trend[0]).abs() < 1e-9));
    }

    #[test]
    fn rejects_future_dates_inside_history() {
        let series = seasonal_series(12);
        let fitted = AdditiveModel::default().fit(&series).unwrap();
        let err = fitted
            .predict(&FutureFrame::univariate(vec![start()]))
            .unwrap_err();
        assert!(matches!(err, ForecastError::Schema(_)));
    }

    #[test]
    fn predict_long_after_fit_is_not_timed_out() {
        let series = seasonal_series(24);
        let config = AdditiveConfig::default()
            .with_fit_time_budget_ms(500)
            .with_uncertainty_samples(100);
        let fitted = AdditiveModel::new(config).fit(&series).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(600));

        let forecast = fitted
            .predict(&FutureFrame::univariate(future_dates(1, 24)))
            .unwrap();
        assert_eq!(forecast.projected().len(), 1);
    }
}
