//! QARTOD quality assessment of SUNA V2 nitrate data.
//!
//! Each diagnostic check is a [`ThresholdRule`] evaluated on its own into a
//! severity per timestamp. The final flag is the maximum severity over all
//! rules, so rule order never matters and a flag can only be raised.
//!
//! Flags used:
//!
//! - 1 = Pass
//! - 3 = Suspect or of high interest
//! - 4 = Fail

use crate::config::QcThresholds;
use crate::constants::{ABSORBANCE_254, ABSORBANCE_350, DARK_VALUE, FIT_RMSE, SPECTRUM_AVERAGE};
use crate::error::{NitrateError, Result};
use crate::models::{FlagSummary, QcFlag};
use polars::prelude::*;
use tracing::debug;

/// Comparison a rule applies to each value of its column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison {
    /// Fires when `value > limit`
    Above(f64),
    /// Fires when `value < limit`
    Below(f64),
    /// Fires when `value <= limit`
    AtOrBelow(f64),
    /// Fires when `value < min` or `value > max`
    Outside { min: f64, max: f64 },
}

impl Comparison {
    /// True if the rule fires; missing values never fire
    pub fn fires(&self, value: Option<f64>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match *self {
            Comparison::Above(limit) => value > limit,
            Comparison::Below(limit) => value < limit,
            Comparison::AtOrBelow(limit) => value <= limit,
            Comparison::Outside { min, max } => value < min || value > max,
        }
    }
}

/// One diagnostic check against one column
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRule {
    pub name: &'static str,
    pub column: String,
    pub comparison: Comparison,
    pub severity: QcFlag,
}

impl ThresholdRule {
    pub fn new(
        name: &'static str,
        column: impl Into<String>,
        comparison: Comparison,
        severity: QcFlag,
    ) -> Self {
        Self {
            name,
            column: column.into(),
            comparison,
            severity,
        }
    }

    /// Severity contributed by this rule at every row of `df`
    pub fn evaluate(&self, df: &DataFrame) -> Result<Vec<QcFlag>> {
        let column = df
            .column(&self.column)
            .map_err(|_| NitrateError::missing_column(self.column.as_str()))?;
        let values = column.as_materialized_series().cast(&DataType::Float64)?;

        let severities: Vec<QcFlag> = values
            .f64()?
            .into_iter()
            .map(|value| {
                if self.comparison.fires(value) {
                    self.severity
                } else {
                    QcFlag::Pass
                }
            })
            .collect();

        let fired = severities.iter().filter(|flag| **flag != QcFlag::Pass).count();
        if fired > 0 {
            debug!("Rule '{}' fired on {} of {} rows", self.name, fired, severities.len());
        }

        Ok(severities)
    }
}

/// The SUNA V2 rule set, range-checking `param` as the concentration
pub fn nitrate_rules(param: &str, thresholds: &QcThresholds) -> Vec<ThresholdRule> {
    vec![
        // Vendor guidance (Sea-Bird SUNA180725): RMSE should usually stay
        // below 1E-3; above that CDOM shape degrades the nitrate estimate
        ThresholdRule::new(
            "fit_rmse_suspect",
            FIT_RMSE,
            Comparison::Above(thresholds.rmse_suspect),
            QcFlag::Suspect,
        ),
        ThresholdRule::new(
            "fit_rmse_fail",
            FIT_RMSE,
            Comparison::Above(thresholds.rmse_fail),
            QcFlag::Fail,
        ),
        // Above 1.3 AU the sensor cannot collect adequate light
        ThresholdRule::new(
            "absorbance_254",
            ABSORBANCE_254,
            Comparison::Above(thresholds.absorbance_max),
            QcFlag::Fail,
        ),
        ThresholdRule::new(
            "absorbance_350",
            ABSORBANCE_350,
            Comparison::Above(thresholds.absorbance_max),
            QcFlag::Fail,
        ),
        ThresholdRule::new(
            "dark_value",
            DARK_VALUE,
            Comparison::AtOrBelow(thresholds.dark_value_min),
            QcFlag::Fail,
        ),
        // Blocked absorption channel or failed lamp
        ThresholdRule::new(
            "spectrum_average",
            SPECTRUM_AVERAGE,
            Comparison::Below(thresholds.spectrum_average_min),
            QcFlag::Fail,
        ),
        ThresholdRule::new(
            "concentration_range",
            param,
            Comparison::Outside {
                min: thresholds.concentration_min,
                max: thresholds.concentration_max,
            },
            QcFlag::Fail,
        ),
    ]
}

/// Fold per-rule severities into one worst-case flag per row
pub fn worst_case(rows: usize, severities: &[Vec<QcFlag>]) -> Vec<QcFlag> {
    severities
        .iter()
        .fold(vec![QcFlag::Pass; rows], |mut flags, rule| {
            for (flag, severity) in flags.iter_mut().zip(rule) {
                *flag = (*flag).max(*severity);
            }
            flags
        })
}

/// Evaluate `rules` against `df`, one flag per row
pub fn apply_rules(df: &DataFrame, rules: &[ThresholdRule]) -> Result<Vec<QcFlag>> {
    let severities = rules
        .iter()
        .map(|rule| rule.evaluate(df))
        .collect::<Result<Vec<_>>>()?;

    Ok(worst_case(df.height(), &severities))
}

/// Quality assessment of the nitrate data with the default thresholds.
///
/// `param` names the concentration variable to range-check; callers may run
/// this once for the corrected and once for the raw concentration.
pub fn quality_checks(df: &DataFrame, param: &str) -> Result<Vec<QcFlag>> {
    quality_checks_with(df, param, &QcThresholds::default())
}

/// [`quality_checks`] with caller-supplied thresholds
pub fn quality_checks_with(
    df: &DataFrame,
    param: &str,
    thresholds: &QcThresholds,
) -> Result<Vec<QcFlag>> {
    let flags = apply_rules(df, &nitrate_rules(param, thresholds))?;

    let summary = summarize_flags(&flags);
    debug!(
        "Quality checks on '{}': {} pass, {} suspect, {} fail",
        param, summary.pass, summary.suspect, summary.fail
    );

    Ok(flags)
}

/// QARTOD codes as an `Int32` column
pub fn flags_to_series(name: &str, flags: &[QcFlag]) -> Series {
    let codes: Vec<i32> = flags.iter().map(|flag| flag.code()).collect();
    Series::new(name.into(), codes)
}

pub fn summarize_flags(flags: &[QcFlag]) -> FlagSummary {
    flags
        .iter()
        .fold(FlagSummary::default(), |mut summary, flag| {
            match flag {
                QcFlag::Pass => summary.pass += 1,
                QcFlag::Suspect => summary.suspect += 1,
                QcFlag::Fail => summary.fail += 1,
            }
            summary
        })
}
