//! Statistical utility functions.

use statrs::distribution::{ContinuousCDF, Normal};

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Calculate the standard deviation of a slice.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Quantile of an already sorted slice using linear interpolation
/// between closest ranks (position `q * (n - 1)`).
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + frac * (sorted[hi] - sorted[lo])
        }
    }
}

/// Quantile with linear interpolation. Non-finite values are ignored.
///
/// # Example
/// ```
/// use monthly_forecast::utils::stats::quantile;
///
/// let values = [10.0, 10.0, 10.0, 10.0, 1000.0];
/// assert_eq!(quantile(&values, 0.25), 10.0);
/// assert_eq!(quantile(&values, 0.75), 10.0);
/// ```
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    quantile_sorted(&sorted, q)
}

/// Two-sided standard normal critical value for a central interval of
/// width `level` (e.g. 0.95 -> 1.96).
pub fn normal_critical_value(level: f64) -> f64 {
    let level = level.clamp(1e-9, 1.0 - 1e-9);
    Normal::new(0.0, 1.0)
        .map(|n| n.inverse_cdf(0.5 + level / 2.0))
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_and_spread() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-10);
        assert!(mean(&[]).is_nan());
        assert_relative_eq!(variance(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2.5, epsilon = 1e-10);
        assert!(variance(&[1.0]).is_nan());
        assert_relative_eq!(
            std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            2.5_f64.sqrt(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile(&values, 0.25), 1.75, epsilon = 1e-12);
        assert_relative_eq!(quantile(&values, 0.5), 2.5, epsilon = 1e-12);
        assert_relative_eq!(quantile(&values, 0.75), 3.25, epsilon = 1e-12);
        assert_relative_eq!(quantile(&[4.0, 1.0, 3.0, 2.0], 1.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn quantile_degenerate_inputs() {
        assert_eq!(quantile(&[42.0], 0.25), 42.0);
        assert!(quantile(&[], 0.5).is_nan());
        assert_eq!(quantile(&[f64::NAN, 3.0], 0.75), 3.0);
    }

    #[test]
    fn critical_values_match_tables() {
        assert_relative_eq!(normal_critical_value(0.95), 1.959964, epsilon = 1e-5);
        assert_relative_eq!(normal_critical_value(0.80), 1.281552, epsilon = 1e-5);
    }
}
