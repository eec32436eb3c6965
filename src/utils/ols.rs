//! Least-squares solvers used by the additive model and regressor projection.
//!
//! Both the plain OLS fit and the penalized (ridge) fit reduce to a
//! symmetric positive definite system solved by Cholesky decomposition.

use crate::error::{FitError, Result, SchemaError};

/// Straight line `intercept + slope * x` fitted by OLS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LineFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit `y = intercept + slope * i` against the observation index `i`.
///
/// A single observation gives a flat line through it.
pub fn fit_line(y: &[f64]) -> Result<LineFit> {
    let n = y.len();
    if n == 0 {
        return Err(FitError::InsufficientHistory { needed: 1, got: 0 }.into());
    }
    if n == 1 {
        return Ok(LineFit {
            intercept: y[0],
            slope: 0.0,
        });
    }

    let index: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let ones = vec![1.0; n];
    let beta = ridge_fit(&[ones, index], y, &[0.0, 0.0])?;
    Ok(LineFit {
        intercept: beta[0],
        slope: beta[1],
    })
}

/// Penalized least squares: minimize `|y - X b|^2 + sum_j penalty[j] * b_j^2`.
///
/// `columns` holds the design matrix column-major (one `Vec` per feature,
/// each of length `y.len()`). A small jitter is added to the diagonal so
/// unpenalized collinear columns still factorize.
///
/// # Example
/// ```
/// use monthly_forecast::utils::ols::ridge_fit;
///
/// // y = 2 + 3 x
/// let ones = vec![1.0; 4];
/// let x = vec![0.0, 1.0, 2.0, 3.0];
/// let y = [2.0, 5.0, 8.0, 11.0];
/// let beta = ridge_fit(&[ones, x], &y, &[0.0, 0.0]).unwrap();
/// assert!((beta[0] - 2.0).abs() < 1e-6);
/// assert!((beta[1] - 3.0).abs() < 1e-6);
/// ```
pub fn ridge_fit(columns: &[Vec<f64>], y: &[f64], penalty: &[f64]) -> Result<Vec<f64>> {
    let n = y.len();
    let k = columns.len();
    if penalty.len() != k {
        return Err(SchemaError::LengthMismatch {
            expected: k,
            got: penalty.len(),
        }
        .into());
    }
    for col in columns {
        if col.len() != n {
            return Err(SchemaError::LengthMismatch {
                expected: n,
                got: col.len(),
            }
            .into());
        }
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];

    for i in 0..k {
        xty[i] = dot(&columns[i], y);
        for j in 0..=i {
            let v = dot(&columns[i], &columns[j]);
            xtx[i][j] = v;
            xtx[j][i] = v;
        }
    }

    for (i, row) in xtx.iter_mut().enumerate() {
        row[i] += penalty[i] + 1e-8;
    }

    solve_symmetric(&xtx, &xty).ok_or_else(|| {
        FitError::Numerical("normal equations are not positive definite".into()).into()
    })
}

/// Multiply the column-major design matrix by `beta`.
pub fn design_product(columns: &[Vec<f64>], beta: &[f64]) -> Vec<f64> {
    let n = columns.first().map_or(0, |c| c.len());
    let mut out = vec![0.0; n];
    for (col, &b) in columns.iter().zip(beta) {
        if b == 0.0 {
            continue;
        }
        for (o, &x) in out.iter_mut().zip(col) {
            *o += b * x;
        }
    }
    out
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Solve symmetric positive definite system using Cholesky decomposition.
///
/// Solves A @ x = b where A is symmetric positive definite.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // Cholesky decomposition A = L @ L'
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fit_line_recovers_slope() {
        // y = 2 + 3*i
        let fit = fit_line(&[2.0, 5.0, 8.0, 11.0, 14.0]).unwrap();
        assert_relative_eq!(fit.intercept, 2.0, epsilon = 1e-6);
        assert_relative_eq!(fit.slope, 3.0, epsilon = 1e-6);
        assert_relative_eq!(fit.predict(5.0), 17.0, epsilon = 1e-6);
    }

    #[test]
    fn fit_line_single_point_is_flat() {
        let fit = fit_line(&[7.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.predict(10.0), 7.0);
        assert!(fit_line(&[]).is_err());
    }

    #[test]
    fn ridge_fit_multiple_columns() {
        // y = 1 + 2*x1 + 3*x2 with non-collinear regressors
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let x2 = vec![0.5, 2.5, 1.0, 3.0, 1.5, 3.5, 2.0, 4.0];
        let y: Vec<f64> = x1
            .iter()
            .zip(x2.iter())
            .map(|(a, b)| 1.0 + 2.0 * a + 3.0 * b)
            .collect();

        let columns = vec![vec![1.0; 8], x1, x2];
        let beta = ridge_fit(&columns, &y, &[0.0; 3]).unwrap();

        assert_relative_eq!(beta[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(beta[1], 2.0, epsilon = 1e-4);
        assert_relative_eq!(beta[2], 3.0, epsilon = 1e-4);

        let fitted = design_product(&columns, &beta);
        for (f, t) in fitted.iter().zip(&y) {
            assert_relative_eq!(*f, *t, epsilon = 1e-4);
        }
    }

    #[test]
    fn penalty_shrinks_coefficients() {
        let x = vec![-2.0, -1.0, 0.0, 1.0, 2.0];
        let y = [-4.0, -2.0, 0.0, 2.0, 4.0];
        let free = ridge_fit(&[x.clone()], &y, &[0.0]).unwrap();
        let shrunk = ridge_fit(&[x], &y, &[10.0]).unwrap();
        assert_relative_eq!(free[0], 2.0, epsilon = 1e-6);
        // x'x = 10, x'y = 20 -> 20 / (10 + 10)
        assert_relative_eq!(shrunk[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn ridge_fit_dimension_mismatch() {
        let columns = vec![vec![1.0, 2.0]];
        assert!(ridge_fit(&columns, &[1.0, 2.0, 3.0], &[0.0]).is_err());
        assert!(ridge_fit(&columns, &[1.0, 2.0], &[0.0, 0.0]).is_err());
    }

    #[test]
    fn ridge_fit_with_noise() {
        let n = 100;
        let x: Vec<f64> = (0..n).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, &xi)| 2.5 + 1.7 * xi + (i as f64 * 0.13).sin() * 0.1)
            .collect();

        let beta = ridge_fit(&[vec![1.0; n], x], &y, &[0.0, 0.0]).unwrap();
        assert_relative_eq!(beta[0], 2.5, epsilon = 0.1);
        assert_relative_eq!(beta[1], 1.7, epsilon = 0.1);
    }
}
