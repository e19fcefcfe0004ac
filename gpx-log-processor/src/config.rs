//! Processor configuration types
//!
//! This module defines the minimal configuration needed by the processor
//! library. Terminal concerns (output destinations, exit codes, quiet flags)
//! are handled by the application layer.

use serde::{Deserialize, Serialize};

use crate::types::{Result, ThresholdBands, DEFAULT_THRESHOLD_DBM};

/// Configuration for one processing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Go/no-go signal threshold in dBm
    #[serde(default = "default_threshold")]
    pub threshold_dbm: i32,

    /// Whether to merge readings into the output document as waypoints
    #[serde(default)]
    pub merge: bool,

    /// Whether to report each extracted reading with its correlated position
    #[serde(default)]
    pub verbose: bool,
}

fn default_threshold() -> i32 {
    DEFAULT_THRESHOLD_DBM
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            threshold_dbm: DEFAULT_THRESHOLD_DBM,
            merge: false,
            verbose: false,
        }
    }
}

impl ProcessorConfig {
    /// Create a new processor configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the go/no-go threshold in dBm
    pub fn with_threshold(mut self, threshold_dbm: i32) -> Self {
        self.threshold_dbm = threshold_dbm;
        self
    }

    /// Builder method: enable or disable merged waypoint output
    pub fn with_merge(mut self, enabled: bool) -> Self {
        self.merge = enabled;
        self
    }

    /// Builder method: enable or disable per-reading reporting
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Derive the classification bands for the configured threshold
    ///
    /// Fails if the threshold is outside the allowed `-148..=14` range.
    pub fn bands(&self) -> Result<ThresholdBands> {
        ThresholdBands::new(self.threshold_dbm)
    }
}
