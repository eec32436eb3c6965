//! Counts of rows dropped while cleaning, surfaced as warnings.

use crate::error::DataQualityWarning;
use chrono::NaiveDate;
use serde::Serialize;

/// Row accounting for one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityReport {
    /// Rows in the raw table.
    pub input_rows: usize,
    /// Rows handed to aggregation.
    pub output_rows: usize,
    pub unparsable_dates: usize,
    pub missing_values: usize,
    pub non_numeric_values: usize,
    pub future_deliveries: usize,
    /// Latest order date seen when the consistency filter ran.
    pub max_order_date: Option<NaiveDate>,
    #[serde(skip)]
    warnings: Vec<DataQualityWarning>,
}

impl QualityReport {
    pub fn new(input_rows: usize) -> Self {
        Self {
            input_rows,
            ..Default::default()
        }
    }

    /// Record a warning and log it.
    pub fn warn(&mut self, warning: DataQualityWarning) {
        tracing::warn!(%warning, "data quality");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    /// Total number of rows removed before aggregation.
    pub fn dropped_rows(&self) -> usize {
        self.unparsable_dates + self.missing_values + self.non_numeric_values + self.future_deliveries
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_accumulates_drops_and_warnings() {
        let mut report = QualityReport::new(10);
        assert!(report.is_clean());

        report.unparsable_dates = 2;
        report.missing_values = 1;
        report.warn(DataQualityWarning::UnparsableDates {
            column: "ds".into(),
            count: 2,
        });

        assert_eq!(report.dropped_rows(), 3);
        assert!(!report.is_clean());
        assert_eq!(
            report.warnings()[0].to_string(),
            "dropped 2 rows with unparsable dates in 'ds'"
        );
    }
}
