//! Gap filling for regressor columns.

/// Replace `NaN` cells by the previous finite value, then fill any leading
/// gap with the first finite value.
///
/// Returns `None` when the column has no finite value at all.
pub fn forward_back_fill(values: &[f64]) -> Option<Vec<f64>> {
    let first = values.iter().copied().find(|v| v.is_finite())?;

    let mut last = first;
    Some(
        values
            .iter()
            .map(|&v| {
                if v.is_finite() {
                    last = v;
                }
                last
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_interior_and_leading_gaps() {
        let filled = forward_back_fill(&[f64::NAN, 2.0, f64::NAN, 5.0, f64::NAN]).unwrap();
        assert_eq!(filled, vec![2.0, 2.0, 2.0, 5.0, 5.0]);
    }

    #[test]
    fn all_missing_column_cannot_be_filled() {
        assert!(forward_back_fill(&[f64::NAN, f64::NAN]).is_none());
        assert!(forward_back_fill(&[]).is_none());
    }
}
