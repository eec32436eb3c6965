//! MAP estimation by iteratively reweighted ridge regression.
//!
//! With Gaussian observation noise `sigma`, a Gaussian prior `N(0, s^2)` on a
//! coefficient is a ridge penalty `sigma^2 / s^2`. A Laplace prior with scale
//! `tau` is handled by its local quadratic bound at the current estimate,
//! giving the penalty `sigma^2 / (tau * |b|)`. Alternating the ridge solve with
//! the residual variance update converges to the MAP estimate.

use crate::error::{FitError, Result};
use crate::utils::ols::{design_product, ridge_fit};
use crate::utils::stats::mean;
use std::time::{Duration, Instant};

/// Lower bound on the residual variance of the scaled target.
const SIGMA2_FLOOR: f64 = 1e-4;

/// Lower bound on `|b|` when reweighting Laplace penalties.
const LAPLACE_EPS: f64 = 1e-6;

/// Prior on one design coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prior {
    Gaussian(f64),
    Laplace(f64),
}

/// Wall-clock limit shared by the fit and interval simulation.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget_ms: u64,
}

impl Deadline {
    pub fn after_ms(budget_ms: u64) -> Self {
        Self {
            at: Instant::now() + Duration::from_millis(budget_ms),
            budget_ms,
        }
    }

    pub fn check(&self) -> Result<()> {
        if Instant::now() >= self.at {
            return Err(FitError::Timeout {
                budget_ms: self.budget_ms,
            }
            .into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEstimate {
    pub beta: Vec<f64>,
    /// Residual standard deviation on the scaled target.
    pub sigma: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Maximize the posterior of `y ~ N(X b, sigma^2)` under `priors`.
///
/// Stops when no coefficient moves by more than `tolerance`, or after
/// `max_iterations` (reported as not converged).
pub fn fit_map(
    columns: &[Vec<f64>],
    y: &[f64],
    priors: &[Prior],
    max_iterations: usize,
    tolerance: f64,
    deadline: &Deadline,
) -> Result<MapEstimate> {
    let n = y.len().max(1) as f64;
    let center = mean(y);
    let mut sigma2 = (y.iter().map(|v| (v - center).powi(2)).sum::<f64>() / n).max(SIGMA2_FLOOR);

    let mut beta: Option<Vec<f64>> = None;
    let mut rss = f64::NAN;

    for iteration in 1..=max_iterations {
        deadline.check()?;

        let penalty: Vec<f64> = priors
            .iter()
            .enumerate()
            .map(|(j, prior)| match (*prior, &beta) {
                (Prior::Gaussian(s), _) => sigma2 / (s * s),
                (Prior::Laplace(tau), None) => sigma2 / (tau * tau),
                (Prior::Laplace(tau), Some(b)) => sigma2 / (tau * b[j].abs().max(LAPLACE_EPS)),
            })
            .collect();

        let next = ridge_fit(columns, y, &penalty)?;
        let fitted = design_product(columns, &next);
        rss = y.iter().zip(&fitted).map(|(a, f)| (a - f).powi(2)).sum();
        if !rss.is_finite() {
            return Err(FitError::Numerical("residuals are not finite".into()).into());
        }
        sigma2 = (rss / n).max(SIGMA2_FLOOR);

        let change = beta.as_ref().map_or(f64::INFINITY, |old| {
            old.iter()
                .zip(&next)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max)
        });
        beta = Some(next);

        if change < tolerance {
            return Ok(MapEstimate {
                beta: beta.unwrap_or_default(),
                sigma: (rss / n).sqrt(),
                iterations: iteration,
                converged: true,
            });
        }
    }

    Ok(MapEstimate {
        beta: beta.unwrap_or_default(),
        sigma: (rss / n).sqrt(),
        iterations: max_iterations,
        converged: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn weak_gaussian_priors_match_least_squares() {
        let x: Vec<f64> = (0..20).map(|i| i as f64 / 19.0).collect();
        let y: Vec<f64> = x.iter().map(|t| 0.3 + 0.5 * t).collect();
        let columns = vec![x, vec![1.0; 20]];
        let priors = [Prior::Gaussian(1e3), Prior::Gaussian(1e3)];

        let fit = fit_map(&columns, &y, &priors, 50, 1e-9, &Deadline::after_ms(10_000)).unwrap();
        assert!(fit.converged);
        assert_relative_eq!(fit.beta[0], 0.5, epsilon = 1e-4);
        assert_relative_eq!(fit.beta[1], 0.3, epsilon = 1e-4);
    }

    #[test]
    fn laplace_prior_shrinks_unused_hinge() {
        let t: Vec<f64> = (0..30).map(|i| i as f64 / 29.0).collect();
        let y: Vec<f64> = t
            .iter()
            .enumerate()
            .map(|(i, v)| 0.2 + 0.6 * v + 0.01 * ((i % 3) as f64 - 1.0))
            .collect();
        let hinge: Vec<f64> = t.iter().map(|v| (v - 0.5).max(0.0)).collect();
        let columns = vec![t, vec![1.0; 30], hinge];
        let priors = [Prior::Gaussian(5.0), Prior::Gaussian(5.0), Prior::Laplace(0.05)];

        let fit = fit_map(&columns, &y, &priors, 200, 1e-8, &Deadline::after_ms(10_000)).unwrap();
        assert!(fit.beta[2].abs() < 0.05);
        assert_relative_eq!(fit.beta[0], 0.6, epsilon = 0.05);
    }

    #[test]
    fn expired_deadline_times_out() {
        let columns = vec![vec![1.0; 5]];
        let y = [1.0; 5];
        let deadline = Deadline::after_ms(0);
        let err = fit_map(&columns, &y, &[Prior::Gaussian(5.0)], 10, 1e-6, &deadline).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ForecastError::Fit(FitError::Timeout { budget_ms: 0 })
        ));
    }

    #[test]
    fn reports_non_convergence() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * 0.1).collect();
        let fit = fit_map(
            &[x],
            &y,
            &[Prior::Gaussian(0.01)],
            1,
            1e-12,
            &Deadline::after_ms(10_000),
        )
        .unwrap();
        assert!(!fit.converged);
        assert_eq!(fit.iterations, 1);
    }
}
