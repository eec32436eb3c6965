//! Forecasting models.

pub mod additive;

pub use additive::{AdditiveConfig, AdditiveModel, FitSummary, FittedAdditive, FutureFrame};
