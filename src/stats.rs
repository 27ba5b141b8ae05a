//! Robust statistics over sensor samples.
//!
//! NaN marks a missing sample and is excluded from every statistic here.
//! When nothing valid remains the result is `None`, never zero.

/// Median of the non-missing values.
///
/// Even-length inputs average the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    median_in_place(&mut valid)
}

/// Median absolute deviation of the non-missing values.
///
/// Unscaled: no normal-consistency factor is applied, so `mad(&[1, 2, 3, 100])`
/// is `1.0`. A single valid value yields `0.0`.
pub fn mad(values: &[f64]) -> Option<f64> {
    let mut valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let center = median_in_place(&mut valid)?;

    let mut deviations: Vec<f64> = valid.iter().map(|v| (v - center).abs()).collect();
    median_in_place(&mut deviations)
}

/// Sorts `values` and takes the middle; callers have already dropped NaN
fn median_in_place(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_skips_nan() {
        assert_eq!(median(&[10.0, 12.0, 14.0, f64::NAN]), Some(12.0));
    }

    #[test]
    fn test_median_even_length() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[f64::NAN, f64::NAN]), None);
    }

    #[test]
    fn test_mad_burst_with_outlier() {
        // deviations from median 2.5 are [1.5, 0.5, 0.5, 97.5]
        assert_eq!(mad(&[1.0, 2.0, 3.0, 100.0]), Some(1.0));
    }

    #[test]
    fn test_mad_odd_length() {
        // median 2, deviations [1, 0, 1] -> 1
        assert_eq!(mad(&[1.0, 2.0, 3.0]), Some(1.0));
    }

    #[test]
    fn test_mad_missing_values_excluded() {
        assert_eq!(mad(&[1.0, f64::NAN, 2.0, 3.0, f64::NAN]), Some(1.0));
    }

    #[test]
    fn test_mad_no_values() {
        assert_eq!(mad(&[]), None);
        assert_eq!(mad(&[f64::NAN; 4]), None);
    }

    #[test]
    fn test_mad_single_value() {
        assert_eq!(mad(&[42.0]), Some(0.0));
    }

    #[test]
    fn test_mad_order_independent() {
        let values = [5.5, -1.0, 3.25, 100.0, 7.0, f64::NAN, 0.5];
        let expected = mad(&values);

        let mut reversed = values;
        reversed.reverse();
        assert_eq!(mad(&reversed), expected);

        let mut rotated = values;
        rotated.rotate_left(3);
        assert_eq!(mad(&rotated), expected);
    }

    #[test]
    fn test_mad_constant_series() {
        assert_eq!(mad(&[3.0, 3.0, 3.0, 3.0]), Some(0.0));
    }
}
