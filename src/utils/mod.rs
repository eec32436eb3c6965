//! Numerical helpers shared by the pipeline stages.

pub mod metrics;
pub mod ols;
pub mod stats;

pub use metrics::{calculate_metrics, AccuracyMetrics};
pub use ols::{fit_line, ridge_fit, LineFit};
pub use stats::{mean, normal_critical_value, quantile, std_dev};
