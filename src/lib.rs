//! # monthly-forecast
//!
//! Monthly forecasting of tabular time series.
//!
//! A table with a date column, a value column and optional regressor
//! columns is cleaned, summed into calendar months, damped for upper
//! outliers and fitted with an additive model (piecewise-linear trend,
//! Fourier seasonality, exogenous regressors). The result covers the
//! fitted history and a projected horizon with uncertainty intervals and
//! per-component decomposition.
//!
//! Every stage is also usable on its own: [`ingest`], [`transform`],
//! [`detection`] and [`models`] are plain functions and values, and
//! [`pipeline`] chains them.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod detection;
pub mod error;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod transform;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{
        AggregatedSeries, CoreForecastRow, DampedSeries, ForecastResult, ForecastRow,
        MonthlySeries, RawTable, Scalar, TimeSeriesPoint,
    };
    pub use crate::detection::DampingConfig;
    pub use crate::error::{
        DataQualityWarning, ErrorKind, FitError, ForecastError, ParamError, Result, SchemaError,
    };
    pub use crate::ingest::{ColumnSelection, QualityReport};
    pub use crate::models::additive::{AdditiveConfig, Growth, SeasonalityToggle};
    pub use crate::pipeline::{
        fit_and_predict, FitDiagnostics, ForecastPipeline, ForecastReport, PipelineConfig,
        PreparedSeries, RegressorFill,
    };
    pub use crate::transform::EmptyMonthPolicy;
}
