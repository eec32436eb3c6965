//! Uncertainty intervals for the additive model.

use super::fit::Deadline;
use crate::error::{FitError, Result};
use crate::utils::stats::{normal_critical_value, quantile_sorted};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::{Laplace, Normal, Poisson};

/// Lower and upper bound per row.
pub type Band = (Vec<f64>, Vec<f64>);

/// Parameters of the simulation of future trend changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendChanges {
    /// Changepoints fitted over the history (the per-unit-time rate).
    pub n_changepoints: usize,
    /// Mean absolute fitted changepoint magnitude (scaled units).
    pub mean_abs_delta: f64,
}

/// Symmetric band `yhat +/- z * sigma`.
pub fn analytic_band(yhat: &[f64], sigma: f64, interval_width: f64) -> Band {
    let half = normal_critical_value(interval_width) * sigma;
    (
        yhat.iter().map(|y| y - half).collect(),
        yhat.iter().map(|y| y + half).collect(),
    )
}

/// Settings for [`simulated_band`].
#[derive(Debug, Clone, Copy)]
pub struct Simulation {
    pub samples: usize,
    pub interval_width: f64,
    pub seed: u64,
    /// Multiplier from scaled to original units.
    pub y_scale: f64,
}

/// Empirical band from simulated paths.
///
/// Each path adds new trend changes beyond the history (`t > 1`): their
/// count is Poisson with rate `S * (T - 1)` and their magnitudes are
/// Laplace with the mean absolute fitted change as scale. Gaussian
/// observation noise with standard deviation `sigma` is added to every row.
pub fn simulated_band(
    yhat: &[f64],
    t: &[f64],
    sigma: f64,
    trend: Option<TrendChanges>,
    sim: &Simulation,
    deadline: &Deadline,
) -> Result<Band> {
    let mut rng = StdRng::seed_from_u64(sim.seed);
    let t_max = t.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let trend_sampler = match trend {
        Some(tc) if tc.n_changepoints > 0 && t_max > 1.0 => {
            let rate = tc.n_changepoints as f64 * (t_max - 1.0);
            let count = Poisson::new(rate).map_err(numerical)?;
            let magnitude = Laplace::new(0.0, tc.mean_abs_delta + 1e-8).map_err(numerical)?;
            Some((count, magnitude))
        }
        _ => None,
    };
    let noise = if sigma > 0.0 {
        Some(Normal::new(0.0, sigma * sim.y_scale).map_err(numerical)?)
    } else {
        None
    };

    let mut paths: Vec<Vec<f64>> = vec![Vec::with_capacity(sim.samples); yhat.len()];
    let mut new_changes: Vec<(f64, f64)> = Vec::new();

    for sample in 0..sim.samples {
        if sample % 64 == 0 {
            deadline.check()?;
        }

        new_changes.clear();
        if let Some((count, magnitude)) = &trend_sampler {
            let n: f64 = count.sample(&mut rng);
            for _ in 0..n as usize {
                let at = 1.0 + rng.gen::<f64>() * (t_max - 1.0);
                new_changes.push((at, magnitude.sample(&mut rng)));
            }
        }

        for (i, (&base, &ti)) in yhat.iter().zip(t).enumerate() {
            let shift: f64 = new_changes
                .iter()
                .map(|&(at, delta)| delta * (ti - at).max(0.0))
                .sum();
            let eps = noise.as_ref().map_or(0.0, |d| d.sample(&mut rng));
            paths[i].push(base + shift * sim.y_scale + eps);
        }
    }

    let lower_q = (1.0 - sim.interval_width) / 2.0;
    let upper_q = 1.0 - lower_q;
    let mut lower = Vec::with_capacity(yhat.len());
    let mut upper = Vec::with_capacity(yhat.len());
    for mut path in paths {
        path.sort_by(|a, b| a.total_cmp(b));
        lower.push(quantile_sorted(&path, lower_q));
        upper.push(quantile_sorted(&path, upper_q));
    }
    Ok((lower, upper))
}

fn numerical(err: impl std::fmt::Display) -> crate::error::ForecastError {
    FitError::Numerical(err.to_string()).into()
}
