//! Burst resampling to fixed 15-minute windows.
//!
//! The SUNA samples in short high-rate bursts. Each burst is collapsed to one
//! row per window using the median of every numeric channel, plus the median
//! absolute deviation of the concentration channel so the spread inside the
//! burst is not lost. Windows are `[start, start + 900 s)` with edges on
//! :07:30, :22:30, :37:30 and :52:30, and are labelled at their centre.

use crate::config::ResampleConfig;
use crate::constants::{
    DEPLOYMENT, INTEGER_CODED_FIELDS, MAD_COMMENT, MILLIS_PER_SECOND, TIME_COLUMN,
    WINDOW_LABEL_OFFSET_SECONDS, WINDOW_PHASE_OFFSET_SECONDS, WINDOW_SECONDS,
};
use crate::error::{NitrateError, Result};
use crate::stats;
use polars::prelude::*;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Resampled table plus per-variable annotations
#[derive(Debug, Clone)]
pub struct ResampledBurst {
    /// One row per window, `time` holds the window label
    pub data: DataFrame,

    /// Free-text comments keyed by variable name
    pub annotations: BTreeMap<String, String>,
}

/// Label (in Unix milliseconds) of the window containing `timestamp_ms`.
///
/// Fails with a range error when the window start or label does not fit in
/// an `i64`.
pub fn window_label_millis(timestamp_ms: i64) -> Result<i64> {
    let step = WINDOW_SECONDS * MILLIS_PER_SECOND;
    let phase = WINDOW_PHASE_OFFSET_SECONDS * MILLIS_PER_SECOND;
    let label_offset = WINDOW_LABEL_OFFSET_SECONDS * MILLIS_PER_SECOND;

    timestamp_ms
        .checked_sub(phase)
        .map(|shifted| shifted.rem_euclid(step))
        .and_then(|into_window| timestamp_ms.checked_sub(into_window))
        .and_then(|start| start.checked_add(label_offset))
        .ok_or_else(|| NitrateError::out_of_range(timestamp_ms, "milliseconds"))
}

/// Resample a burst table to one median row per 15-minute window.
///
/// Takes ownership of `burst` and returns a new table. Every integer or float
/// column except `time` is reduced to its window median with missing values
/// (null or NaN) skipped. The configured concentration channel also gets a
/// `<channel>_mad` column. Windows without a `deployment` value are dropped and
/// the integer-coded fields are cast back to `Int32`.
///
/// The `time` column may be any datetime unit; a plain integer column is read
/// as Unix milliseconds. A `deployment` column with no numeric type (all
/// empty in a CSV, or all null) is read as missing everywhere, so every window
/// is dropped. An existing `<channel>_mad` column is replaced.
pub fn burst_resample(mut burst: DataFrame, config: &ResampleConfig) -> Result<ResampledBurst> {
    let channel = config.concentration_channel.as_str();
    let mad_channel = config.mad_channel();

    require_column(&burst, TIME_COLUMN)?;
    require_column(&burst, DEPLOYMENT)?;
    require_column(&burst, channel)?;

    let deployment = burst.column(DEPLOYMENT)?;
    if !is_numeric(deployment.dtype()) {
        debug!(
            "Reading {} column of type {} as Float64",
            DEPLOYMENT,
            deployment.dtype()
        );
        let deployment = deployment.cast(&DataType::Float64)?;
        burst.with_column(deployment)?;
    }

    let value_columns: Vec<String> = burst
        .get_columns()
        .iter()
        .filter(|column| {
            let name = column.name().as_str();
            name != TIME_COLUMN && name != mad_channel && is_numeric(column.dtype())
        })
        .map(|column| column.name().to_string())
        .collect();

    if !value_columns.iter().any(|name| name == channel) {
        return Err(NitrateError::InvalidInput {
            message: format!("concentration channel '{}' is not numeric", channel),
        });
    }

    let labels = window_labels(burst.column(TIME_COLUMN)?)?;
    let window_count = labels.into_no_null_iter().collect::<HashSet<_>>().len();
    debug!(
        "Resampling {} observations into {} windows of {}s",
        burst.height(),
        window_count,
        WINDOW_SECONDS
    );

    let mut columns = Vec::with_capacity(value_columns.len() + 1);
    columns.push(Column::from(labels.into_series()));
    for name in &value_columns {
        columns.push(missing_as_null(burst.column(name)?)?);
    }
    let burst = DataFrame::new(columns)?;

    let mut aggregations: Vec<Expr> = value_columns
        .iter()
        .map(|name| col(name.as_str()).median())
        .collect();
    // Raw samples per window; reduced to a MAD after collection
    aggregations.push(col(channel).alias(mad_channel.as_str()));

    let mut casts: Vec<Expr> = INTEGER_CODED_FIELDS
        .iter()
        .filter(|field| value_columns.iter().any(|name| name == *field))
        .map(|field| col(*field).cast(DataType::Int32))
        .collect();
    casts.push(col(TIME_COLUMN).cast(DataType::Datetime(TimeUnit::Milliseconds, None)));

    let mut data = burst
        .lazy()
        .group_by_stable([col(TIME_COLUMN)])
        .agg(aggregations)
        .filter(col(DEPLOYMENT).is_not_null())
        .with_columns(casts)
        .sort_by_exprs([col(TIME_COLUMN)], SortMultipleOptions::default())
        .collect()?;

    let mad_values = mad_per_window(data.column(&mad_channel)?)?;
    data.with_column(mad_values)?;

    let dropped = window_count - data.height();
    if dropped > 0 {
        warn!("Dropped {} windows with no deployment value", dropped);
    }

    let mut annotations = BTreeMap::new();
    annotations.insert(mad_channel, MAD_COMMENT.to_string());

    Ok(ResampledBurst { data, annotations })
}

fn require_column(df: &DataFrame, name: &str) -> Result<()> {
    if df.get_column_index(name).is_none() {
        return Err(NitrateError::missing_column(name));
    }
    Ok(())
}

fn is_numeric(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float()
}

/// Window label for every row, as Unix milliseconds named `time`
fn window_labels(time: &Column) -> Result<Int64Chunked> {
    let millis = time
        .as_materialized_series()
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&DataType::Int64)?;

    let mut labels = Vec::with_capacity(millis.len());
    for (row, value) in millis.i64()?.into_iter().enumerate() {
        let ms = value.ok_or(NitrateError::NullTimestamp { row })?;
        labels.push(window_label_millis(ms)?);
    }

    Ok(Int64Chunked::from_vec(TIME_COLUMN.into(), labels))
}

/// Float NaN becomes null so the median aggregation skips it
fn missing_as_null(column: &Column) -> Result<Column> {
    if !column.dtype().is_float() {
        return Ok(column.clone());
    }

    let floats = column.as_materialized_series().cast(&DataType::Float64)?;
    let cleaned: Float64Chunked = floats
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect();

    Ok(Column::from(
        cleaned.with_name(column.name().clone()).into_series(),
    ))
}

fn mad_per_window(samples: &Column) -> Result<Series> {
    let windows = samples.as_materialized_series().list()?;

    let values = windows
        .into_iter()
        .map(|window| match window {
            Some(window) => window_mad(&window),
            None => Ok(None),
        })
        .collect::<Result<Float64Chunked>>()?;

    Ok(values.with_name(samples.name().clone()).into_series())
}

fn window_mad(window: &Series) -> Result<Option<f64>> {
    let floats = window.cast(&DataType::Float64)?;
    let samples: Vec<f64> = floats
        .f64()?
        .into_iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect();

    Ok(stats::mad(&samples))
}
