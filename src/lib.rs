//! Nitrate QC Library
//!
//! Quality control and burst resampling for SUNA V2 dissolved nitrate time
//! series from the Ocean Observatories Initiative.
//!
//! This library provides tools for:
//! - Converting instrument timestamps (NTP seconds, OOI milliseconds) to UTC
//! - Robust statistics (median, median absolute deviation) that skip missing data
//! - Resampling high-rate bursts to 15-minute medians with a MAD channel
//! - QARTOD-style flagging (1 pass, 3 suspect, 4 fail) from the instrument diagnostics
//! - A CSV to Parquet pipeline tying the steps together

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod processor;
pub mod quality;
pub mod resample;
pub mod stats;
pub mod time;

// Re-export commonly used types
pub use config::{ProcessingConfig, QcThresholds, ResampleConfig};
pub use error::{NitrateError, Result};
pub use models::{FlagSummary, ProcessingStats, QcFlag, TimeFormat};
pub use processor::NitrateProcessor;
pub use quality::{ThresholdRule, quality_checks};
pub use resample::{ResampledBurst, burst_resample};
pub use stats::mad;
pub use time::{convert_time, ntp_seconds_to_datetime, unix_epoch_time};
