//! Core data structures and types for nitrate QC processing.
//!
//! Defines the QARTOD flag type, the instrument time encodings understood by
//! the loader, and the statistics reported after a processing run.

use crate::constants::qartod;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// QARTOD quality flag, ordered by severity
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum QcFlag {
    #[default]
    Pass,
    Suspect,
    Fail,
}

impl QcFlag {
    /// Integer QARTOD code for this flag
    pub fn code(self) -> i32 {
        match self {
            QcFlag::Pass => qartod::PASS,
            QcFlag::Suspect => qartod::SUSPECT,
            QcFlag::Fail => qartod::FAIL,
        }
    }

    /// Parse a QARTOD code back into a flag
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            qartod::PASS => Some(QcFlag::Pass),
            qartod::SUSPECT => Some(QcFlag::Suspect),
            qartod::FAIL => Some(QcFlag::Fail),
            _ => None,
        }
    }
}

impl fmt::Display for QcFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QcFlag::Pass => "pass",
            QcFlag::Suspect => "suspect",
            QcFlag::Fail => "fail",
        };
        write!(f, "{} ({})", label, self.code())
    }
}

/// Encoding of the `time` column in a raw instrument export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    /// Floating point seconds since 1900-01-01 (OOINet NTP time)
    #[default]
    NtpSeconds,
    /// Integer milliseconds since the Unix epoch (OOI ms)
    OoiMillis,
    /// Already a datetime column
    Datetime,
}

/// Counts of each flag value over a run of quality checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSummary {
    pub pass: usize,
    pub suspect: usize,
    pub fail: usize,
}

impl FlagSummary {
    pub fn total(&self) -> usize {
        self.pass + self.suspect + self.fail
    }
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub rows_read: usize,
    pub rows_written: usize,
    pub flags: FlagSummary,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}
