//! Outlier detection and damping for aggregated series.

mod outlier;

pub use outlier::{damp_upper_outliers, DampingConfig, DampingResult, OutlierFence};
