//! Feature construction: time scaling, changepoints and Fourier terms.

use crate::core::calendar::days_since_epoch;
use chrono::NaiveDate;
use std::f64::consts::PI;

/// Maps dates onto `[0, 1]` over the fitted history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    start_days: f64,
    span_days: f64,
}

impl TimeScale {
    /// Scale spanning `first..=last`. A zero span maps every date to 0.
    pub fn new(first: NaiveDate, last: NaiveDate) -> Self {
        let start_days = days_since_epoch(first);
        let span_days = days_since_epoch(last) - start_days;
        Self {
            start_days,
            span_days: if span_days > 0.0 { span_days } else { 1.0 },
        }
    }

    pub fn span_days(&self) -> f64 {
        self.span_days
    }

    pub fn scale(&self, date: NaiveDate) -> f64 {
        (days_since_epoch(date) - self.start_days) / self.span_days
    }

    pub fn scale_all(&self, dates: &[NaiveDate]) -> Vec<f64> {
        dates.iter().map(|&d| self.scale(d)).collect()
    }
}

/// Potential changepoint locations in scaled time.
///
/// Changepoints sit on history points spread uniformly over the first
/// `range` fraction of the history; the first point is never one. The
/// count is capped at `floor(n * range) - 1`.
pub fn changepoints(t: &[f64], n_changepoints: usize, range: f64) -> Vec<f64> {
    let hist_size = (t.len() as f64 * range).floor() as usize;
    if hist_size < 2 {
        return Vec::new();
    }
    let n = n_changepoints.min(hist_size - 1);
    if n == 0 {
        return Vec::new();
    }

    let step = (hist_size - 1) as f64 / n as f64;
    (1..=n)
        .map(|i| t[((i as f64 * step).round() as usize).min(hist_size - 1)])
        .collect()
}

/// Hinge column `(t - s)+` for each changepoint `s`.
pub fn hinge_columns(t: &[f64], changepoints: &[f64]) -> Vec<Vec<f64>> {
    changepoints
        .iter()
        .map(|&s| t.iter().map(|&ti| (ti - s).max(0.0)).collect())
        .collect()
}

/// A periodic component modelled by a truncated Fourier series.
#[derive(Debug, Clone, PartialEq)]
pub struct Seasonality {
    pub name: String,
    /// Period in days.
    pub period: f64,
    pub fourier_order: usize,
}

impl Seasonality {
    pub fn new(name: &str, period: f64, fourier_order: usize) -> Self {
        Self {
            name: name.to_string(),
            period,
            fourier_order,
        }
    }

    pub fn yearly(order: usize) -> Self {
        Self::new("yearly", 365.25, order)
    }

    pub fn weekly(order: usize) -> Self {
        Self::new("weekly", 7.0, order)
    }

    /// Number of design columns (`sin` and `cos` per order).
    pub fn width(&self) -> usize {
        2 * self.fourier_order
    }

    /// `sin(2 pi k d / P)` and `cos(2 pi k d / P)` for `k = 1..=order`,
    /// where `d` is days since the Unix epoch.
    pub fn columns(&self, dates: &[NaiveDate]) -> Vec<Vec<f64>> {
        let days: Vec<f64> = dates.iter().map(|&d| days_since_epoch(d)).collect();
        let mut cols = Vec::with_capacity(self.width());
        for k in 1..=self.fourier_order {
            let w = 2.0 * PI * k as f64 / self.period;
            cols.push(days.iter().map(|d| (w * d).sin()).collect());
            cols.push(days.iter().map(|d| (w * d).cos()).collect());
        }
        cols
    }
}

/// Default for yearly seasonality: at least two years of history.
pub fn auto_yearly(span_days: f64) -> bool {
    span_days >= 730.0
}

/// Default for weekly seasonality: sub-weekly spacing over at least two weeks.
pub fn auto_weekly(dates: &[NaiveDate], span_days: f64) -> bool {
    let min_spacing = dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .min()
        .unwrap_or(i64::MAX);
    min_spacing < 7 && span_days >= 14.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::add_months;
    use approx::assert_relative_eq;

    fn months(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2021, 1, 31).unwrap();
        (0..n).map(|i| add_months(start, i as u32)).collect()
    }

    #[test]
    fn time_scale_maps_history_to_unit_interval() {
        let dates = months(13);
        let scale = TimeScale::new(dates[0], dates[12]);
        let t = scale.scale_all(&dates);
        assert_eq!(t[0], 0.0);
        assert_relative_eq!(t[12], 1.0, epsilon = 1e-12);
        assert!(t.windows(2).all(|w| w[1] > w[0]));
        assert!(scale.scale(add_months(dates[12], 1)) > 1.0);
    }

    #[test]
    fn changepoints_respect_range_and_cap() {
        let t: Vec<f64> = (0..36).map(|i| i as f64 / 35.0).collect();
        let cps = changepoints(&t, 25, 0.8);
        assert_eq!(cps.len(), 25);
        assert!(cps[0] > 0.0);
        assert!(cps.iter().all(|&c| c <= t[27]));
        assert!(cps.windows(2).all(|w| w[1] >= w[0]));

        let short: Vec<f64> = (0..10).map(|i| i as f64 / 9.0).collect();
        // floor(10 * 0.8) - 1 = 7
        assert_eq!(changepoints(&short, 25, 0.8).len(), 7);
        assert!(changepoints(&[0.0, 1.0], 25, 0.8).is_empty());
    }

    #[test]
    fn hinge_is_zero_before_changepoint() {
        let cols = hinge_columns(&[0.0, 0.25, 0.5, 0.75, 1.0], &[0.5]);
        assert_eq!(cols[0], vec![0.0, 0.0, 0.0, 0.25, 0.5]);
    }

    #[test]
    fn fourier_columns_have_expected_shape() {
        let dates = months(24);
        let yearly = Seasonality::yearly(3);
        let cols = yearly.columns(&dates);
        assert_eq!(cols.len(), 6);
        assert!(cols.iter().all(|c| c.len() == 24));
        for (s, c) in cols[0].iter().zip(&cols[1]) {
            assert_relative_eq!(s * s + c * c, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn auto_seasonality_rules() {
        let monthly = months(36);
        let span = (monthly[35] - monthly[0]).num_days() as f64;
        assert!(auto_yearly(span));
        assert!(!auto_weekly(&monthly, span));

        let daily: Vec<NaiveDate> = (0..30)
            .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i))
            .collect();
        assert!(auto_weekly(&daily, 29.0));
        assert!(!auto_yearly(29.0));
    }
}
