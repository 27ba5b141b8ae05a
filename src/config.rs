//! Configuration structures for resampling and quality checks.
//!
//! Thresholds default to the SUNA V2 vendor guidance; everything is a plain
//! value with builder-style overrides, there is no file or environment layer.

use crate::constants::{self, thresholds};
use crate::models::TimeFormat;
use serde::{Deserialize, Serialize};

/// Threshold values used by the SUNA quality rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcThresholds {
    /// Fit RMSE above this is suspect
    pub rmse_suspect: f64,

    /// Fit RMSE above this fails
    pub rmse_fail: f64,

    /// Absorbance (254 nm and 350 nm) above this fails
    pub absorbance_max: f64,

    /// Dark value at or below this fails
    pub dark_value_min: f64,

    /// Spectrum average below this fails
    pub spectrum_average_min: f64,

    /// Lower bound of the valid concentration range
    pub concentration_min: f64,

    /// Upper bound of the valid concentration range
    pub concentration_max: f64,
}

impl Default for QcThresholds {
    fn default() -> Self {
        Self {
            rmse_suspect: thresholds::RMSE_SUSPECT,
            rmse_fail: thresholds::RMSE_FAIL,
            absorbance_max: thresholds::ABSORBANCE_MAX,
            dark_value_min: thresholds::DARK_VALUE_MIN,
            spectrum_average_min: thresholds::SPECTRUM_AVERAGE_MIN,
            concentration_min: thresholds::CONCENTRATION_MIN,
            concentration_max: thresholds::CONCENTRATION_MAX,
        }
    }
}

impl QcThresholds {
    /// Override the valid concentration range
    pub fn with_concentration_range(mut self, min: f64, max: f64) -> Self {
        self.concentration_min = min;
        self.concentration_max = max;
        self
    }
}

/// Settings for the burst resampler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampleConfig {
    /// Channel that receives an extra MAD column
    pub concentration_channel: String,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            concentration_channel: constants::CORRECTED_NITRATE.to_string(),
        }
    }
}

impl ResampleConfig {
    /// Name of the derived MAD channel
    pub fn mad_channel(&self) -> String {
        format!("{}{}", self.concentration_channel, constants::MAD_SUFFIX)
    }
}

/// Global configuration for a processing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Encoding of the input time column
    pub time_format: TimeFormat,

    /// Concentration variable range-checked by the quality rules
    pub parameter: String,

    /// Resample bursts to 15-minute medians before flagging
    pub resample: bool,

    pub thresholds: QcThresholds,

    pub resample_config: ResampleConfig,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::default(),
            parameter: constants::CORRECTED_NITRATE.to_string(),
            resample: true,
            thresholds: QcThresholds::default(),
            resample_config: ResampleConfig::default(),
        }
    }
}

impl ProcessingConfig {
    /// Create configuration with a custom time encoding
    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    /// Create configuration checking a different concentration variable
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = parameter.into();
        self
    }

    /// Skip burst resampling and flag the raw observations
    pub fn without_resample(mut self) -> Self {
        self.resample = false;
        self
    }

    /// Use custom quality thresholds
    pub fn with_thresholds(mut self, thresholds: QcThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Name of the QC flag column appended to the output
    pub fn flag_column(&self) -> String {
        format!("{}{}", self.parameter, constants::QC_FLAG_SUFFIX)
    }
}
