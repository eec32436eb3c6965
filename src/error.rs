//! Error types for the monthly-forecast pipeline.
//!
//! Whole-run failures are split into three categories (schema, fit and
//! parameter) so that callers can render a distinct message for each.
//! Row-level problems are not errors: they are reported as
//! [`DataQualityWarning`]s and processing continues.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Category of a [`ForecastError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Schema,
    Fit,
    Param,
    Io,
}

/// Errors that abort a pipeline run.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Input table does not have the shape the column selection requires.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The model could not be fitted to the prepared history.
    #[error("fit error: {0}")]
    Fit(#[from] FitError),

    /// A caller-supplied parameter is outside its allowed domain.
    #[error("parameter error: {0}")]
    Param(#[from] ParamError),

    /// Reading input or configuration failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON input or configuration could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForecastError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::Schema(_) => ErrorKind::Schema,
            ForecastError::Fit(_) => ErrorKind::Fit,
            ForecastError::Param(_) => ErrorKind::Param,
            ForecastError::Io(_) | ForecastError::Json(_) => ErrorKind::Io,
        }
    }
}

/// Required columns are missing or the table is malformed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("column '{column}' not found (available: {})", available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("input table has no rows")]
    EmptyTable,

    #[error("date column and value column must differ (both are '{column}')")]
    ColumnCollision { column: String },

    #[error("row {row} has {got} cells, header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("malformed csv: {0}")]
    Csv(String),

    #[error("series dates must be strictly increasing ({previous} then {next})")]
    NonIncreasingDates {
        previous: chrono::NaiveDate,
        next: chrono::NaiveDate,
    },

    #[error("column length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}

impl From<csv::Error> for SchemaError {
    fn from(err: csv::Error) -> Self {
        SchemaError::Csv(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Schema(err.into())
    }
}

/// Model fitting is undefined for the prepared history.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("insufficient history: need at least {needed} distinct months, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    #[error("regressor '{name}' has no values in the history")]
    NullRegressor { name: String },

    #[error("regressor '{name}' is constant ({value}) across the history")]
    ConstantRegressor { name: String, value: f64 },

    #[error("fit did not finish within {budget_ms} ms")]
    Timeout { budget_ms: u64 },

    #[error("numerical failure: {0}")]
    Numerical(String),
}

/// Caller-supplied parameters are invalid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("horizon {got} is outside the allowed range {min}..={max}")]
    HorizonOutOfRange { got: u32, min: u32, max: u32 },

    #[error(
        "none of the requested regressors [{}] exist (valid columns: {})",
        requested.join(", "),
        available.join(", ")
    )]
    NoValidRegressors {
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("no future values supplied for regressor '{name}'")]
    MissingFutureRegressor { name: String },

    #[error("regressor '{name}' needs {expected} future values, got {got}")]
    FutureRegressorLength {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid parameter: {0}")]
    Invalid(String),
}

/// Non-fatal data problems found while cleaning the input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataQualityWarning {
    #[error("dropped {count} rows with unparsable dates in '{column}'")]
    UnparsableDates { column: String, count: usize },

    #[error("dropped {count} rows with missing values in '{column}'")]
    MissingValues { column: String, count: usize },

    #[error("dropped {count} rows with non-numeric values in '{column}'")]
    NonNumericValues { column: String, count: usize },

    #[error("dropped {count} rows delivered after the latest order date {max_order_date}")]
    FutureDeliveries {
        count: usize,
        max_order_date: chrono::NaiveDate,
    },

    #[error("date consistency filter skipped: {reason}")]
    ConsistencyColumnsUnavailable { reason: String },

    #[error("ignored unknown regressor columns: {}", names.join(", "))]
    IgnoredRegressors { names: Vec<String> },
}
