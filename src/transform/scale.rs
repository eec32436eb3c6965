//! Scaling transforms used to condition model inputs.

use crate::utils::stats::{mean, std_dev};

/// Result of a scaling transform, with the parameters to undo it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleResult {
    /// Transformed data
    pub data: Vec<f64>,
    /// Value subtracted before scaling
    pub center: f64,
    /// Divisor applied after centering
    pub scale: f64,
}

impl ScaleResult {
    /// Identity transform.
    pub fn identity(data: &[f64]) -> Self {
        Self {
            data: data.to_vec(),
            center: 0.0,
            scale: 1.0,
        }
    }

    /// Inverse transform to recover the original scale.
    pub fn inverse(&self) -> Vec<f64> {
        self.data
            .iter()
            .map(|&x| x * self.scale + self.center)
            .collect()
    }

    /// Transform new data using the same parameters.
    pub fn transform(&self, data: &[f64]) -> Vec<f64> {
        data.iter()
            .map(|&x| (x - self.center) / self.scale)
            .collect()
    }
}

/// Standardize data to zero mean and unit sample variance.
///
/// x_scaled = (x - mean) / std
pub fn standardize(series: &[f64]) -> ScaleResult {
    if series.is_empty() {
        return ScaleResult::identity(series);
    }

    let mean = mean(series);
    let std = if series.len() > 1 { std_dev(series) } else { 0.0 };

    let scale = if std < 1e-10 { 1.0 } else { std };
    let data = series.iter().map(|&x| (x - mean) / scale).collect();

    ScaleResult {
        data,
        center: mean,
        scale,
    }
}

/// Divide by the largest absolute value so the data lies in [-1, 1].
///
/// An all-zero series is left unscaled.
pub fn abs_max_scale(series: &[f64]) -> ScaleResult {
    let max = series.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    if max < 1e-12 {
        return ScaleResult::identity(series);
    }
    ScaleResult {
        data: series.iter().map(|x| x / max).collect(),
        center: 0.0,
        scale: max,
    }
}

/// Check whether every value is exactly 0 or 1.
pub fn is_binary(series: &[f64]) -> bool {
    series.iter().all(|&x| x == 0.0 || x == 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn standardize_centers_and_scales() {
        let result = standardize(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_relative_eq!(result.center, 3.0);
        assert_relative_eq!(result.scale, 2.5_f64.sqrt());
        assert_relative_eq!(result.data.iter().sum::<f64>(), 0.0, epsilon = 1e-12);

        let back = result.inverse();
        assert_relative_eq!(back[4], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn standardize_constant_series_keeps_unit_scale() {
        let result = standardize(&[7.0, 7.0, 7.0]);
        assert_eq!(result.scale, 1.0);
        assert_eq!(result.data, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn abs_max_scale_bounds_values() {
        let result = abs_max_scale(&[-4.0, 2.0, 8.0]);
        assert_eq!(result.scale, 8.0);
        assert_eq!(result.data, vec![-0.5, 0.25, 1.0]);
        assert_eq!(result.transform(&[16.0]), vec![2.0]);

        let zeros = abs_max_scale(&[0.0, 0.0]);
        assert_eq!(zeros.scale, 1.0);
    }

    #[test]
    fn binary_detection() {
        assert!(is_binary(&[0.0, 1.0, 1.0]));
        assert!(!is_binary(&[0.0, 0.5]));
    }
}
