//! GPX schema validator
//!
//! Checks that an input document is well-formed XML and conforms to the
//! GPX 1.1 structure before the rest of the pipeline runs. Validation
//! failures are fatal for the run.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use gpx::{Gpx, GpxVersion};

use crate::types::{ProcessorError, Result};

/// Validate a GPX file on disk and return the parsed document
pub fn validate_gpx_file(path: &Path) -> Result<Gpx> {
    log::info!("Validating GPX file: {:?}", path);

    if !path.exists() {
        return Err(ProcessorError::SchemaValidation(format!(
            "file not found: {:?}",
            path
        )));
    }

    let file = File::open(path).map_err(|e| {
        ProcessorError::SchemaValidation(format!("failed to open {:?}: {}", path, e))
    })?;

    let document = validate_gpx(BufReader::new(file))?;

    log::info!(
        "GPX file validated: {} track(s), {} waypoint(s)",
        document.tracks.len(),
        document.waypoints.len()
    );

    Ok(document)
}

/// Validate GPX content from any reader and return the parsed document
///
/// Malformed XML and documents that do not conform to the GPX structure
/// both surface as [`ProcessorError::SchemaValidation`]. Documents with a
/// version other than 1.1 are rejected the same way.
pub fn validate_gpx<R: std::io::Read>(reader: R) -> Result<Gpx> {
    let document =
        gpx::read(reader).map_err(|e| ProcessorError::SchemaValidation(e.to_string()))?;

    if document.version != GpxVersion::Gpx11 {
        return Err(ProcessorError::SchemaValidation(format!(
            "unsupported GPX version {:?}, expected 1.1",
            document.version
        )));
    }

    Ok(document)
}
