//! Calendar helpers for month-end aligned periods.

use chrono::{Datelike, NaiveDate};

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

/// Month-end date `months` calendar months after the month of `date`.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let index = date.year() as i64 * 12 + date.month0() as i64 + months as i64;
    let year = index.div_euclid(12) as i32;
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(month_end)
        .unwrap_or(date)
}

/// Number of whole months between the months of `from` and `to`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 * 12 + to.month0() as i64) - (from.year() as i64 * 12 + from.month0() as i64)
}

/// Days since 1970-01-01, used as the time axis of Fourier features.
pub fn days_since_epoch(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}

/// Check whether `date` is the last day of its month.
pub fn is_month_end(date: NaiveDate) -> bool {
    month_end(date) == date
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_end_handles_leap_years_and_december() {
        assert_eq!(month_end(d(2023, 1, 5)), d(2023, 1, 31));
        assert_eq!(month_end(d(2023, 2, 10)), d(2023, 2, 28));
        assert_eq!(month_end(d(2024, 2, 1)), d(2024, 2, 29));
        assert_eq!(month_end(d(2023, 12, 31)), d(2023, 12, 31));
        assert_eq!(month_end(d(2023, 4, 30)), d(2023, 4, 30));
    }

    #[test]
    fn add_months_is_month_end_aligned() {
        assert_eq!(add_months(d(2023, 1, 31), 1), d(2023, 2, 28));
        assert_eq!(add_months(d(2023, 11, 30), 2), d(2024, 1, 31));
        assert_eq!(add_months(d(2023, 12, 31), 14), d(2025, 2, 28));
        assert_eq!(add_months(d(2023, 6, 15), 0), d(2023, 6, 30));
    }

    #[test]
    fn months_between_counts_calendar_months() {
        assert_eq!(months_between(d(2023, 1, 31), d(2023, 1, 1)), 0);
        assert_eq!(months_between(d(2023, 1, 31), d(2024, 3, 31)), 14);
        assert_eq!(months_between(d(2024, 3, 31), d(2023, 1, 31)), -14);
    }

    #[test]
    fn epoch_days_are_zero_based() {
        assert_eq!(days_since_epoch(d(1970, 1, 1)), 0.0);
        assert_eq!(days_since_epoch(d(1970, 1, 31)), 30.0);
        assert!(is_month_end(d(2024, 2, 29)));
        assert!(!is_month_end(d(2024, 2, 28)));
    }
}
