//! Pipeline configuration, loadable from JSON.

use super::future::RegressorFill;
use crate::detection::DampingConfig;
use crate::error::{ParamError, Result};
use crate::models::additive::AdditiveConfig;
use crate::transform::EmptyMonthPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shortest allowed horizon in months.
pub const MIN_HORIZON_MONTHS: u32 = 1;
/// Longest allowed horizon in months.
pub const MAX_HORIZON_MONTHS: u32 = 36;

/// Options for every stage of one forecast run.
///
/// Missing JSON fields take their defaults:
///
/// ```
/// use monthly_forecast::pipeline::PipelineConfig;
///
/// let config = PipelineConfig::from_json_str(r#"{"horizon_months": 6}"#).unwrap();
/// assert_eq!(config.horizon_months, 6);
/// assert_eq!(config.damping.iqr_multiplier, 3.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub horizon_months: u32,
    pub empty_months: EmptyMonthPolicy,
    pub damping: DampingConfig,
    pub regressor_fill: RegressorFill,
    pub model: AdditiveConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon_months: 12,
            empty_months: EmptyMonthPolicy::default(),
            damping: DampingConfig::default(),
            regressor_fill: RegressorFill::default(),
            model: AdditiveConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_horizon(mut self, months: u32) -> Self {
        self.horizon_months = months;
        self
    }

    pub fn with_empty_months(mut self, policy: EmptyMonthPolicy) -> Self {
        self.empty_months = policy;
        self
    }

    pub fn with_damping(mut self, damping: DampingConfig) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_regressor_fill(mut self, fill: RegressorFill) -> Self {
        self.regressor_fill = fill;
        self
    }

    pub fn with_model(mut self, model: AdditiveConfig) -> Self {
        self.model = model;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), ParamError> {
        validate_horizon(self.horizon_months)?;
        self.damping.validate()?;
        self.model.validate()
    }
}

/// Check `months` against the allowed horizon range.
pub fn validate_horizon(months: u32) -> std::result::Result<(), ParamError> {
    if !(MIN_HORIZON_MONTHS..=MAX_HORIZON_MONTHS).contains(&months) {
        return Err(ParamError::HorizonOutOfRange {
            got: months,
            min: MIN_HORIZON_MONTHS,
            max: MAX_HORIZON_MONTHS,
        });
    }
    Ok(())
}
