//! Application constants for the nitrate QC processor
//!
//! Channel names emitted by the SUNA V2 data stream, epoch offsets used by
//! the instrument clocks, resampling window phase, and QARTOD flag codes.

// =============================================================================
// Channel Names
// =============================================================================

/// Name of the time index column in every table
pub const TIME_COLUMN: &str = "time";

/// Corrected dissolved nitrate concentration (µmol/L)
pub const CORRECTED_NITRATE: &str = "corrected_nitrate_concentration";

/// Root-mean-square error of the nitrate spectral fit
pub const FIT_RMSE: &str = "fit_rmse";

/// Absorbance at 254 nm (CDOM proxy)
pub const ABSORBANCE_254: &str = "absorbance_at_254_nm";

/// Absorbance at 350 nm (CDOM proxy)
pub const ABSORBANCE_350: &str = "absorbance_at_350_nm";

/// Dark counts used in the spectral fit
pub const DARK_VALUE: &str = "dark_value_used_for_fit";

/// Average counts across the spectrum (lamp/channel health)
pub const SPECTRUM_AVERAGE: &str = "spectrum_average";

/// Deployment number the reading belongs to
pub const DEPLOYMENT: &str = "deployment";

pub const SERIAL_NUMBER: &str = "serial_number";

pub const RAW_SPECTRAL_MEASUREMENTS: &str = "raw_spectral_measurements";

/// Suffix appended to the concentration channel for its MAD channel
pub const MAD_SUFFIX: &str = "_mad";

/// Suffix appended to a checked parameter for its QC flag column
pub const QC_FLAG_SUFFIX: &str = "_qc_flag";

/// Annotation attached to the derived MAD channel
pub const MAD_COMMENT: &str = "The median absolute standard deviation.";

/// Integer-coded fields recast to Int32 after median aggregation
pub const INTEGER_CODED_FIELDS: &[&str] = &[
    DEPLOYMENT,
    SPECTRUM_AVERAGE,
    SERIAL_NUMBER,
    DARK_VALUE,
    RAW_SPECTRAL_MEASUREMENTS,
];

// =============================================================================
// Time Constants
// =============================================================================

/// Seconds between the NTP epoch (1900-01-01) and the Unix epoch (1970-01-01)
pub const NTP_UNIX_OFFSET_SECONDS: i64 = 2_208_988_800;

pub const MILLIS_PER_SECOND: i64 = 1_000;

/// Width of one resampling window
pub const WINDOW_SECONDS: i64 = 900;

/// Phase of the window edges relative to the Unix epoch.
///
/// Edges land on :07:30, :22:30, :37:30 and :52:30 past every hour. Downstream
/// consumers expect exactly this phase.
pub const WINDOW_PHASE_OFFSET_SECONDS: i64 = 3_150;

/// Shift applied to a window start to produce its output label
pub const WINDOW_LABEL_OFFSET_SECONDS: i64 = 450;

// =============================================================================
// Quality Control Constants
// =============================================================================

/// QARTOD flag codes used by the SUNA checks
pub mod qartod {
    /// Data passed every check
    pub const PASS: i32 = 1;

    /// Suspect or of high interest
    pub const SUSPECT: i32 = 3;

    /// Failed at least one check
    pub const FAIL: i32 = 4;
}

/// Default QC thresholds (Sea-Bird Scientific document SUNA180725 plus
/// operational experience with the instrument)
pub mod thresholds {
    /// Vendor guidance: fit RMSE should usually stay below 1E-3
    pub const RMSE_SUSPECT: f64 = 0.001;

    pub const RMSE_FAIL: f64 = 0.100;

    /// Above 1.3 AU the sensor cannot collect adequate light
    pub const ABSORBANCE_MAX: f64 = 1.3;

    /// Dark value at or below this means a failed dark measurement
    pub const DARK_VALUE_MIN: f64 = 0.0;

    /// Below this the absorption channel is blocked or the lamp failed
    pub const SPECTRUM_AVERAGE_MIN: f64 = 10_000.0;

    pub const CONCENTRATION_MIN: f64 = -2.0;
    pub const CONCENTRATION_MAX: f64 = 3_000.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ntp_offset_is_seventy_years() {
        // 17 leap days between 1900 and 1970
        let days = 70 * 365 + 17;
        assert_eq!(NTP_UNIX_OFFSET_SECONDS, days * 86_400);
    }

    #[test]
    fn test_window_phase_edges() {
        // 3150 s = 52.5 minutes; modulo the window it is a 7.5 minute phase
        assert_eq!(WINDOW_PHASE_OFFSET_SECONDS % WINDOW_SECONDS, 450);
        assert_eq!(WINDOW_LABEL_OFFSET_SECONDS * 2, WINDOW_SECONDS);
    }

    #[test]
    fn test_integer_coded_fields_include_deployment() {
        assert!(INTEGER_CODED_FIELDS.contains(&DEPLOYMENT));
        assert_eq!(INTEGER_CODED_FIELDS.len(), 5);
    }

    #[test]
    fn test_qartod_ordering() {
        assert!(qartod::PASS < qartod::SUSPECT);
        assert!(qartod::SUSPECT < qartod::FAIL);
    }
}
