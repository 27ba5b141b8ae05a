//! Processing pipeline for SUNA V2 exports.
//!
//! Loads a CSV export, converts its instrument time column to UTC, resamples
//! bursts to 15-minute medians, attaches the QARTOD flag for the configured
//! concentration parameter and writes the result to Parquet.

use crate::config::ProcessingConfig;
use crate::constants::TIME_COLUMN;
use crate::error::{NitrateError, Result};
use crate::models::{FlagSummary, ProcessingStats, TimeFormat};
use crate::quality::{flags_to_series, quality_checks_with, summarize_flags};
use crate::resample::burst_resample;
use crate::time::{convert_time, ntp_seconds_to_datetime, parse_utc};

use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Runs the load -> resample -> flag -> write pipeline
#[derive(Debug, Clone, Default)]
pub struct NitrateProcessor {
    config: ProcessingConfig,
}

impl NitrateProcessor {
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Process one CSV export into one Parquet file
    pub fn run(&self, input: &Path, output: &Path) -> Result<ProcessingStats> {
        let start_time = Instant::now();

        if !input.exists() {
            return Err(NitrateError::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        info!("Loading {}", input.display());
        let df = load_csv(input, self.config.time_format)?;
        let rows_read = df.height();

        let (mut df, flags) = self.process_frame(df)?;

        info!("Writing {} rows to {}", df.height(), output.display());
        write_parquet(&mut df, output)?;

        Ok(ProcessingStats {
            rows_read,
            rows_written: df.height(),
            flags,
            output_path: output.to_path_buf(),
            processing_time_ms: start_time.elapsed().as_millis(),
        })
    }

    /// Resample (if enabled) and append the QC flag column to an in-memory table
    pub fn process_frame(&self, df: DataFrame) -> Result<(DataFrame, FlagSummary)> {
        let mut df = if self.config.resample {
            let rows = df.height();
            let resampled = burst_resample(df, &self.config.resample_config)?;
            for (variable, comment) in &resampled.annotations {
                debug!("{}: {}", variable, comment);
            }
            info!(
                "Resampled {} observations to {} windows",
                rows,
                resampled.data.height()
            );
            resampled.data
        } else {
            df
        };

        let flags = quality_checks_with(&df, &self.config.parameter, &self.config.thresholds)?;
        df.with_column(flags_to_series(&self.config.flag_column(), &flags))?;

        Ok((df, summarize_flags(&flags)))
    }
}

/// Read a CSV export and index it by a UTC `time` column
pub fn load_csv(path: &Path, time_format: TimeFormat) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );

    index_by_time(df, time_format)
}

/// Replace the raw `time` column with `Datetime(Milliseconds)`.
///
/// Null input times stay null. Values that cannot be represented fail the
/// whole table with a range error.
pub fn index_by_time(mut df: DataFrame, time_format: TimeFormat) -> Result<DataFrame> {
    let time = df
        .column(TIME_COLUMN)
        .map_err(|_| NitrateError::missing_column(TIME_COLUMN))?
        .as_materialized_series()
        .clone();

    let millis: Int64Chunked = match time_format {
        TimeFormat::NtpSeconds => {
            let seconds = time.cast(&DataType::Float64)?;
            seconds
                .f64()?
                .into_iter()
                .map(|value| {
                    value
                        .map(|ntp| ntp_seconds_to_datetime(ntp).map(|dt| dt.timestamp_millis()))
                        .transpose()
                })
                .collect::<Result<_>>()?
        }
        TimeFormat::OoiMillis => {
            let ms = time.cast(&DataType::Int64)?;
            ms.i64()?
                .into_iter()
                .map(|value| Ok(convert_time(value)?.map(|dt| dt.timestamp_millis())))
                .collect::<Result<_>>()?
        }
        TimeFormat::Datetime if time.dtype() == &DataType::String => time
            .str()?
            .into_iter()
            .map(|value| {
                value
                    .map(|text| parse_utc(text).map(|dt| dt.timestamp_millis()))
                    .transpose()
            })
            .collect::<Result<_>>()?,
        TimeFormat::Datetime => time
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .cast(&DataType::Int64)?
            .i64()?
            .clone(),
    };

    let index = millis
        .with_name(TIME_COLUMN.into())
        .into_datetime(TimeUnit::Milliseconds, None)
        .into_series();
    df.with_column(index)?;

    Ok(df)
}

/// Write a table to Parquet with Snappy compression, creating parent directories
pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<u64> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let bytes = ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(df)?;

    Ok(bytes)
}
