//! GPX Log Processor CLI Application
//!
//! This is the command-line interface for the GPX / radio-log processor.
//! It uses the gpx-log-processor library and adds:
//! - Argument parsing and run configuration (config.toml)
//! - Logging initialisation and verbosity control
//! - Output destination selection (stdout or file)
//! - Exit code mapping

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use gpx_log_processor::{
    compose, validator, ProcessorConfig, ProcessorError, RssiLogParser, SignalReading,
    TrackIndex, DEFAULT_THRESHOLD_DBM,
};

mod config;

/// GPX Log Processor - Correlate GPS tracks with radio signal logs
#[derive(Parser, Debug)]
#[command(name = "gpx-log-cli")]
#[command(about = "Validate a GPX track and merge radio signal readings into it", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the GPX track file to validate
    #[arg(value_name = "*.gpx")]
    gpx: PathBuf,

    /// Path to the radio log file to scan for signal readings
    #[arg(value_name = "*.log")]
    log: PathBuf,

    /// Report each extracted reading with its correlated co-ordinates
    #[arg(short, long)]
    verbose: bool,

    /// Merge the extracted readings into the output as waypoints
    #[arg(short, long)]
    merge: bool,

    /// Go/no-go signal threshold in dBm
    #[arg(
        long,
        value_name = "DBM",
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(-148..=14)
    )]
    gothresh: Option<i32>,

    /// Output file for the combined document (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to a run configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("GPX Log Processor CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using processor library v{}", gpx_log_processor::VERSION);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the full validate → extract → compose pipeline
fn run(args: &Args) -> Result<()> {
    let run_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::RunConfig::default(),
    };

    // Explicit flags override the run configuration file
    let threshold = args
        .gothresh
        .or(run_config.gothresh)
        .unwrap_or(DEFAULT_THRESHOLD_DBM);
    let merge = args.merge || run_config.merge.unwrap_or(false);
    let verbose = args.verbose || run_config.verbose.unwrap_or(false);
    let output = args.output.clone().or(run_config.output);

    let processor_config = ProcessorConfig::new()
        .with_threshold(threshold)
        .with_merge(merge)
        .with_verbose(verbose);
    processor_config
        .bands()
        .context("Invalid threshold configuration")?;

    let document = validator::validate_gpx_file(&args.gpx)?;
    let index = TrackIndex::from_gpx(&document);

    let readings = collect_readings(&args.log, &processor_config, &index)?;
    log::info!("Extracted {} signal reading(s)", readings.len());

    match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            let mut sink = BufWriter::new(file);
            compose(&document, &readings, &processor_config, &mut sink)?;
            sink.flush()?;
            log::info!("Wrote combined document to {:?}", path);
        }
        None => {
            let stdout = io::stdout();
            let mut sink = stdout.lock();
            compose(&document, &readings, &processor_config, &mut sink)?;
            writeln!(sink)?;
        }
    }

    Ok(())
}

/// Extract readings from the radio log, reporting and skipping bad lines
fn collect_readings(
    log_path: &std::path::Path,
    config: &ProcessorConfig,
    index: &TrackIndex,
) -> Result<Vec<SignalReading>> {
    let mut readings = Vec::new();

    for result in RssiLogParser::parse(log_path)
        .with_context(|| format!("Failed to open log file: {:?}", log_path))?
    {
        match result {
            Ok(reading) => {
                if config.verbose {
                    report_reading(&reading, index);
                }
                readings.push(reading);
            }
            Err(e @ ProcessorError::ParseError { .. }) => {
                log::warn!("{}", e);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read log file: {:?}", log_path));
            }
        }
    }

    Ok(readings)
}

/// Report one reading together with its correlated track position
fn report_reading(reading: &SignalReading, index: &TrackIndex) {
    match index.nearest(reading.timestamp) {
        Some(point) => log::info!(
            "Reading {} near lat {:.6}, lon {:.6}",
            reading,
            point.lat,
            point.lon
        ),
        None => log::info!("Reading {} (no track position available)", reading),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
