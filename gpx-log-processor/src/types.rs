//! Core types for the GPX log processor library
//!
//! This module defines the fundamental types the processor emits while working
//! through a radio log: signal readings, severity bands, and the error type
//! shared by every stage of the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};

/// Timestamp type used throughout the processor
pub type Timestamp = DateTime<Utc>;

/// Result type for processor operations
pub type Result<T> = std::result::Result<T, ProcessorError>;

/// Weakest RSSI value the processor classifies (dBm)
pub const RSSI_MIN: i32 = -150;

/// Strongest RSSI value the processor classifies (dBm)
pub const RSSI_MAX: i32 = 14;

/// Allowed range for the configured go/no-go threshold (dBm)
pub const THRESHOLD_RANGE: RangeInclusive<i32> = -148..=14;

/// Default go/no-go threshold (dBm)
pub const DEFAULT_THRESHOLD_DBM: i32 = -125;

/// Errors that can occur while processing
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("Failed to validate the GPX file: {0}")]
    SchemaValidation(String),

    #[error("Malformed signal reading on line {line}: {content:?}")]
    ParseError { line: usize, content: String },

    #[error("Threshold {0} dBm is outside the allowed range -148..=14")]
    InvalidThreshold(i32),

    #[error("Failed to write output document: {0}")]
    Compose(#[from] xml::writer::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single timestamped signal-strength reading extracted from a radio log
///
/// Readings are immutable once extracted. Log timestamps carry no zone
/// information and are interpreted as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalReading {
    /// Moment the reading was logged
    pub timestamp: Timestamp,
    /// Received signal strength in dBm (more negative = weaker)
    pub rssi: i32,
}

impl fmt::Display for SignalReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dBm at {}", self.rssi, self.timestamp)
    }
}

/// Severity band a reading falls into relative to the configured threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalBand {
    /// At or above the threshold
    Green,
    /// Below the threshold but above the floor
    Orange,
    /// At the floor of the valid domain
    Red,
}

impl fmt::Display for SignalBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalBand::Green => write!(f, "green"),
            SignalBand::Orange => write!(f, "orange"),
            SignalBand::Red => write!(f, "red"),
        }
    }
}

/// Inclusive RSSI ranges derived from a single configured threshold
///
/// The valid domain is `-150..=14` dBm. Classification checks green first,
/// then orange, then red. Values outside the valid domain do not classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdBands {
    /// Full valid RSSI domain
    pub base: RangeInclusive<i32>,
    /// Strong signal: threshold and above
    pub green: RangeInclusive<i32>,
    /// Marginal signal: below threshold, above the floor
    pub orange: RangeInclusive<i32>,
    /// Very weak signal: the floor itself
    pub red: RangeInclusive<i32>,
}

impl ThresholdBands {
    /// Build the bands for a threshold, rejecting thresholds outside
    /// the allowed `-148..=14` range
    pub fn new(threshold_dbm: i32) -> Result<Self> {
        if !THRESHOLD_RANGE.contains(&threshold_dbm) {
            return Err(ProcessorError::InvalidThreshold(threshold_dbm));
        }
        Ok(ThresholdBands {
            base: RSSI_MIN..=RSSI_MAX,
            green: threshold_dbm..=RSSI_MAX,
            orange: (RSSI_MIN + 1)..=(threshold_dbm - 1),
            red: RSSI_MIN..=RSSI_MIN,
        })
    }

    /// Classify a reading into a severity band
    ///
    /// Returns `None` for values outside the valid RSSI domain.
    pub fn classify(&self, rssi: i32) -> Option<SignalBand> {
        if !self.base.contains(&rssi) {
            return None;
        }
        if self.green.contains(&rssi) {
            Some(SignalBand::Green)
        } else if self.orange.contains(&rssi) {
            Some(SignalBand::Orange)
        } else {
            Some(SignalBand::Red)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_threshold_validation() {
        assert!(ThresholdBands::new(-125).is_ok());
        assert!(ThresholdBands::new(-148).is_ok());
        assert!(ThresholdBands::new(14).is_ok());

        assert!(matches!(
            ThresholdBands::new(-149),
            Err(ProcessorError::InvalidThreshold(-149))
        ));
        assert!(matches!(
            ThresholdBands::new(15),
            Err(ProcessorError::InvalidThreshold(15))
        ));
        assert!(matches!(
            ThresholdBands::new(49),
            Err(ProcessorError::InvalidThreshold(49))
        ));
    }

    #[test]
    fn test_classification_precedence() {
        let bands = ThresholdBands::new(-125).unwrap();

        assert_eq!(bands.classify(-80), Some(SignalBand::Green));
        assert_eq!(bands.classify(-125), Some(SignalBand::Green));
        assert_eq!(bands.classify(14), Some(SignalBand::Green));
        assert_eq!(bands.classify(-126), Some(SignalBand::Orange));
        assert_eq!(bands.classify(-149), Some(SignalBand::Orange));
        assert_eq!(bands.classify(-150), Some(SignalBand::Red));
    }

    #[test]
    fn test_out_of_domain_values_do_not_classify() {
        let bands = ThresholdBands::new(-125).unwrap();

        assert_eq!(bands.classify(-151), None);
        assert_eq!(bands.classify(15), None);
        assert_eq!(bands.classify(i32::MIN), None);
        assert_eq!(bands.classify(i32::MAX), None);
    }

    #[test]
    fn test_threshold_at_range_edges() {
        // Highest threshold: everything below 14 is orange except the floor
        let bands = ThresholdBands::new(14).unwrap();
        assert_eq!(bands.classify(14), Some(SignalBand::Green));
        assert_eq!(bands.classify(13), Some(SignalBand::Orange));
        assert_eq!(bands.classify(-150), Some(SignalBand::Red));

        // Lowest threshold: orange collapses to a single value
        let bands = ThresholdBands::new(-148).unwrap();
        assert_eq!(bands.classify(-148), Some(SignalBand::Green));
        assert_eq!(bands.classify(-149), Some(SignalBand::Orange));
        assert_eq!(bands.classify(-150), Some(SignalBand::Red));
    }

    #[test]
    fn test_band_display_names() {
        assert_eq!(format!("{}", SignalBand::Green), "green");
        assert_eq!(format!("{}", SignalBand::Orange), "orange");
        assert_eq!(format!("{}", SignalBand::Red), "red");
    }

    #[test]
    fn test_reading_display() {
        let reading = SignalReading {
            timestamp: Utc.with_ymd_and_hms(2021, 5, 1, 12, 0, 0).unwrap(),
            rssi: -80,
        };
        assert_eq!(
            format!("{}", reading),
            "-80 dBm at 2021-05-01 12:00:00 UTC"
        );
    }
}
