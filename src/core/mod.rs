//! Core data structures: raw tables, monthly series and forecast output.

pub mod calendar;
mod forecast;
mod series;
mod table;

pub use forecast::{ComparisonRow, CoreForecastRow, ForecastResult, ForecastRow};
pub use series::{AggregatedSeries, DampedSeries, MonthlySeries, TimeSeriesPoint};
pub use table::{RawTable, Scalar};
