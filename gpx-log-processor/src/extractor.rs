//! Radio log line extractor
//!
//! Scans a plain-text radio log for peer-RSSI marker lines and turns each one
//! into a timestamped [`SignalReading`]. Lines without the marker are skipped
//! silently; marker lines that fail the pattern yield a recoverable
//! [`ProcessorError::ParseError`] and iteration continues.
//!
//! Log lines look like:
//!
//! ```text
//! 2021.05.01;12:00:00.000000;Radio;PeerRSSI:-80;PeerSNR:12
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ProcessorError, Result, SignalReading};

/// Literal marker identifying a signal-strength line
pub const RSSI_MARKER: &str = "PeerRSSI";

/// Log timestamp layout: `YYYY.MM.DD;HH:MM:SS.ffffff`
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d;%H:%M:%S%.f";

// The timestamp is anchored to the two leading semicolon-delimited fields so
// extra fields between it and the marker cannot shift the capture.
static RSSI_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^;]+;[^;]+);.*PeerRSSI:(-?\d+)").expect("RSSI pattern must compile")
});

/// Radio log parser producing signal readings
pub struct RssiLogParser;

impl RssiLogParser {
    /// Parse a radio log file and return an iterator over signal readings
    pub fn parse(path: &Path) -> Result<ReadingIterator<BufReader<File>>> {
        log::info!("Parsing radio log file: {:?}", path);

        let file = File::open(path)?;
        Ok(Self::parse_reader(BufReader::new(file)))
    }

    /// Parse radio log content from any buffered reader
    pub fn parse_reader<R: BufRead>(reader: R) -> ReadingIterator<R> {
        ReadingIterator {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

/// Lazy, single-pass iterator over the signal readings in a radio log
pub struct ReadingIterator<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> Iterator for ReadingIterator<R> {
    type Item = Result<SignalReading>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(ProcessorError::Io(e))),
            };
            self.line_no += 1;

            if !line.contains(RSSI_MARKER) {
                continue;
            }

            return Some(parse_marker_line(&line, self.line_no));
        }
    }
}

/// Parse one marker line into a reading
fn parse_marker_line(line: &str, line_no: usize) -> Result<SignalReading> {
    let captures = RSSI_PATTERN
        .captures(line)
        .ok_or_else(|| malformed(line, line_no))?;

    let timestamp = NaiveDateTime::parse_from_str(&captures[1], TIMESTAMP_FORMAT)
        .map_err(|_| malformed(line, line_no))?
        .and_utc();

    let rssi: i32 = captures[2].parse().map_err(|_| malformed(line, line_no))?;

    log::debug!("Extracted reading on line {}: {} dBm", line_no, rssi);

    Ok(SignalReading { timestamp, rssi })
}

fn malformed(line: &str, line_no: usize) -> ProcessorError {
    ProcessorError::ParseError {
        line: line_no,
        content: line.to_string(),
    }
}
