//! End-to-end tests: CSV export in, resampled and flagged Parquet out

use nitrate_qc::constants::NTP_UNIX_OFFSET_SECONDS;
use nitrate_qc::processor::load_csv;
use nitrate_qc::{
    NitrateError, NitrateProcessor, ProcessingConfig, ResampleConfig, TimeFormat, burst_resample,
};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// 2021-06-01T12:07:30Z, a window edge
const EDGE_UNIX_SECONDS: i64 = 1_622_549_250;

const HEADER: &str = "time,deployment,serial_number,fit_rmse,absorbance_at_254_nm,absorbance_at_350_nm,dark_value_used_for_fit,spectrum_average,raw_spectral_measurements,corrected_nitrate_concentration";

fn ntp(offset_seconds: i64) -> f64 {
    (EDGE_UNIX_SECONDS + NTP_UNIX_OFFSET_SECONDS + offset_seconds) as f64 + 0.5
}

/// Three bursts: a clean one, a suspect one, and one with no deployment
fn write_burst_csv(dir: &TempDir) -> PathBuf {
    let mut lines = vec![HEADER.to_string()];

    for (i, conc) in [20.0, 21.0, 22.0, 80.0].iter().enumerate() {
        lines.push(format!(
            "{},5,1234,0.0004,0.2,0.05,850,25000,310,{}",
            ntp(i as i64),
            conc
        ));
    }
    for i in 0..3 {
        lines.push(format!(
            "{},5,1234,0.004,0.2,0.05,850,25000,310,18.5",
            ntp(900 + i)
        ));
    }
    for i in 0..2 {
        lines.push(format!(
            "{},,1234,0.0004,0.2,0.05,850,25000,310,19.0",
            ntp(1800 + i)
        ));
    }

    let path = dir.path().join("ce01issm_suna_burst.csv");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn read_parquet(path: &Path) -> DataFrame {
    let file = fs::File::open(path).unwrap();
    ParquetReader::new(file).finish().unwrap()
}

fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn i32_column(df: &DataFrame, name: &str) -> Vec<Option<i32>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .i32()
        .unwrap()
        .into_iter()
        .collect()
}

#[test]
fn test_load_csv_converts_ntp_time() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_burst_csv(&temp_dir);

    let df = load_csv(&input, TimeFormat::NtpSeconds).unwrap();

    assert_eq!(df.height(), 9);
    assert_eq!(
        df.column("time").unwrap().dtype(),
        &DataType::Datetime(TimeUnit::Milliseconds, None)
    );
    let first = df
        .column("time")
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .get(0);
    assert_eq!(first, Some(EDGE_UNIX_SECONDS * 1000 + 500));
}

#[test]
fn test_pipeline_resamples_and_flags() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_burst_csv(&temp_dir);
    let output = temp_dir.path().join("out").join("suna_qc.parquet");

    let stats = NitrateProcessor::default().run(&input, &output).unwrap();

    assert_eq!(stats.rows_read, 9);
    // third burst has no deployment and is dropped
    assert_eq!(stats.rows_written, 2);
    assert_eq!(stats.flags.pass, 1);
    assert_eq!(stats.flags.suspect, 1);
    assert_eq!(stats.flags.fail, 0);
    assert!(output.exists());

    let df = read_parquet(&output);
    assert_eq!(df.height(), 2);

    assert_eq!(
        f64_column(&df, "corrected_nitrate_concentration"),
        vec![Some(21.5), Some(18.5)]
    );
    // [20, 21, 22, 80]: median 21.5, deviations [1.5, 0.5, 0.5, 58.5]
    assert_eq!(
        f64_column(&df, "corrected_nitrate_concentration_mad"),
        vec![Some(1.0), Some(0.0)]
    );
    assert_eq!(
        i32_column(&df, "corrected_nitrate_concentration_qc_flag"),
        vec![Some(1), Some(3)]
    );
    assert_eq!(i32_column(&df, "deployment"), vec![Some(5), Some(5)]);
    assert_eq!(i32_column(&df, "serial_number"), vec![Some(1234), Some(1234)]);
}

#[test]
fn test_pipeline_window_labels() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_burst_csv(&temp_dir);
    let output = temp_dir.path().join("suna_qc.parquet");

    NitrateProcessor::default().run(&input, &output).unwrap();

    let df = read_parquet(&output);
    let labels: Vec<i64> = df
        .column("time")
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect();

    // 12:15:00Z and 12:30:00Z
    let first_label = (EDGE_UNIX_SECONDS + 450) * 1000;
    assert_eq!(labels, vec![first_label, first_label + 900_000]);
}

#[test]
fn test_pipeline_without_resample() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_burst_csv(&temp_dir);
    let output = temp_dir.path().join("raw_qc.parquet");

    let processor = NitrateProcessor::new(ProcessingConfig::default().without_resample());
    let stats = processor.run(&input, &output).unwrap();

    assert_eq!(stats.rows_written, 9);
    assert_eq!(stats.flags.suspect, 3);
    assert_eq!(stats.flags.pass, 6);

    let df = read_parquet(&output);
    assert!(df.column("corrected_nitrate_concentration_mad").is_err());
}

#[test]
fn test_pipeline_out_of_range_concentration_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("spike.csv");
    let rows = [
        HEADER.to_string(),
        format!("{},5,1234,0.0004,0.2,0.05,850,25000,310,4000.0", ntp(0)),
        format!("{},5,1234,0.0004,0.2,0.05,850,25000,310,4100.0", ntp(1)),
    ];
    fs::write(&input, rows.join("\n")).unwrap();

    let stats = NitrateProcessor::default()
        .run(&input, &temp_dir.path().join("spike.parquet"))
        .unwrap();

    assert_eq!(stats.rows_written, 1);
    assert_eq!(stats.flags.fail, 1);
}

#[test]
fn test_pipeline_missing_diagnostic_column() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("partial.csv");
    let rows = [
        "time,deployment,corrected_nitrate_concentration".to_string(),
        format!("{},5,20.0", ntp(0)),
    ];
    fs::write(&input, rows.join("\n")).unwrap();

    let result =
        NitrateProcessor::default().run(&input, &temp_dir.path().join("partial.parquet"));

    assert!(matches!(
        result,
        Err(NitrateError::MissingColumn { ref column }) if column == "fit_rmse"
    ));
}

#[test]
fn test_empty_deployment_column_resamples_to_empty_table() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("no_deployment.csv");
    let edge_ms = EDGE_UNIX_SECONDS * 1000;
    let rows = [
        "time,deployment,corrected_nitrate_concentration".to_string(),
        format!("{},,20.0", edge_ms),
        format!("{},,21.0", edge_ms + 60_000),
        format!("{},,22.0", edge_ms + 900_000),
    ];
    fs::write(&input, rows.join("\n")).unwrap();

    let df = load_csv(&input, TimeFormat::OoiMillis).unwrap();
    let out = burst_resample(df, &ResampleConfig::default()).unwrap();

    assert_eq!(out.data.height(), 0);
    assert!(out.data.column("corrected_nitrate_concentration_mad").is_ok());
}
