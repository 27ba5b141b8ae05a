//! Command-line interface components.

use crate::config::ProcessingConfig;
use crate::models::{ProcessingStats, TimeFormat};
use crate::processor::NitrateProcessor;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "nitrate_qc")]
#[command(about = "Resample SUNA V2 nitrate bursts and attach QARTOD quality flags")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// CSV export with a `time` column and the SUNA diagnostic channels
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output Parquet file (defaults to INPUT with a .parquet extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Encoding of the input time column
    #[arg(long, value_enum, default_value = "ntp")]
    pub time_format: TimeFormatArg,

    /// Concentration variable to range-check
    #[arg(long, default_value = crate::constants::CORRECTED_NITRATE)]
    pub param: String,

    /// Flag the raw observations without 15-minute resampling
    #[arg(long)]
    pub no_resample: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Command-line spelling of [`TimeFormat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeFormatArg {
    /// Seconds since 1900-01-01 (OOINet NTP time)
    Ntp,
    /// Milliseconds since 1970-01-01
    Ms,
    /// ISO 8601 text or a native datetime column
    Datetime,
}

impl From<TimeFormatArg> for TimeFormat {
    fn from(arg: TimeFormatArg) -> Self {
        match arg {
            TimeFormatArg::Ntp => TimeFormat::NtpSeconds,
            TimeFormatArg::Ms => TimeFormat::OoiMillis,
            TimeFormatArg::Datetime => TimeFormat::Datetime,
        }
    }
}

impl Args {
    /// Get the output path, defaulting to the input path with a .parquet extension
    pub fn get_output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self.input.with_extension("parquet"),
        }
    }

    pub fn get_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Build the processing configuration from the arguments
    pub fn to_config(&self) -> ProcessingConfig {
        let config = ProcessingConfig::default()
            .with_time_format(self.time_format.into())
            .with_parameter(self.param.clone());

        if self.no_resample {
            config.without_resample()
        } else {
            config
        }
    }
}

/// Set up structured logging based on CLI arguments
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nitrate_qc={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Run the processor for parsed arguments
pub fn run(args: &Args) -> Result<ProcessingStats> {
    let output = args.get_output_path();
    let processor = NitrateProcessor::new(args.to_config());

    let stats = processor
        .run(&args.input, &output)
        .with_context(|| format!("Failed to process {}", args.input.display()))?;

    if !args.quiet {
        print_summary(&args.input, &stats);
    }

    Ok(stats)
}

fn print_summary(input: &Path, stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!("  {} {}", "Input:".bright_cyan(), input.display());
    println!(
        "  {} {}",
        "Output:".bright_cyan(),
        stats.output_path.display()
    );
    println!(
        "  {} {} -> {}",
        "Rows:".bright_cyan(),
        stats.rows_read.to_string().bright_white(),
        stats.rows_written.to_string().bright_white()
    );
    println!(
        "  {} {} pass, {} suspect, {} fail",
        "Flags:".bright_cyan(),
        stats.flags.pass.to_string().bright_green(),
        stats.flags.suspect.to_string().bright_yellow(),
        stats.flags.fail.to_string().bright_red()
    );
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
}
