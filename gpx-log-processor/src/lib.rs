//! GPX Log Processor Library
//!
//! A reusable library for correlating GPS tracks (GPX) with radio signal
//! logs. It runs a linear pipeline over one track file and one log file:
//!
//! - Validates the GPX input against the GPX 1.1 structure
//! - Extracts timestamped peer-RSSI readings from the radio log
//! - Composes a combined GPX-shaped output document, optionally merging
//!   the readings in as annotated waypoints
//!
//! The library does NOT:
//! - Parse command-line arguments
//! - Decide output destinations or exit codes
//! - Initialise logging
//!
//! All terminal-facing functionality is in the application layer
//! (gpx-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use gpx_log_processor::{compose, validator, ProcessorConfig, RssiLogParser};
//! use std::path::Path;
//!
//! // Validate the track file
//! let document = validator::validate_gpx_file(Path::new("flight.gpx")).unwrap();
//!
//! // Extract signal readings from the radio log
//! let readings: Vec<_> = RssiLogParser::parse(Path::new("radio.log"))
//!     .unwrap()
//!     .filter_map(|r| r.ok())
//!     .collect();
//!
//! // Compose the merged output document
//! let config = ProcessorConfig::new().with_threshold(-125).with_merge(true);
//! let mut sink = Vec::new();
//! compose(&document, &readings, &config, &mut sink).unwrap();
//! ```

// Public modules
pub mod composer;
pub mod config;
pub mod extractor;
pub mod types;
pub mod validator;

// Re-export main types for convenience
pub use composer::{compose, TrackIndex, TrackPoint};
pub use config::ProcessorConfig;
pub use extractor::{ReadingIterator, RssiLogParser};
pub use types::{
    ProcessorError, Result, SignalBand, SignalReading, ThresholdBands, Timestamp,
    DEFAULT_THRESHOLD_DBM,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
