//! Output document composer
//!
//! Writes the GPX-shaped result document: the validated track structure,
//! optionally preceded by one waypoint per extracted signal reading. The
//! output is always well-formed, pretty-printed UTF-8 XML with an XML
//! declaration; schema validity of the result is not re-checked.

use std::io::Write;

use chrono::SecondsFormat;
use gpx::Gpx;
use xml::writer::XmlEvent;
use xml::{EmitterConfig, EventWriter};

use crate::config::ProcessorConfig;
use crate::types::{Result, SignalReading, Timestamp};

/// Namespace of the generated document
pub const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";

/// GPX version attribute of the generated document
pub const GPX_VERSION: &str = "1.1";

/// Creator attribute of the generated document
pub const GPX_CREATOR: &str = "gpx-log-cli";

/// One flattened track point from the validated document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// Elevation in metres, when recorded
    pub elevation: Option<f64>,
    /// Moment the point was recorded, when present
    pub time: Option<Timestamp>,
}

/// Flattened view of all track points in a document, in document order
///
/// Used to correlate a signal reading with the track point closest to it
/// in time.
#[derive(Debug, Clone, Default)]
pub struct TrackIndex {
    points: Vec<TrackPoint>,
}

impl TrackIndex {
    /// Flatten every track segment of a validated document
    pub fn from_gpx(document: &Gpx) -> Self {
        let mut points = Vec::new();
        for track in &document.tracks {
            for segment in &track.segments {
                for waypoint in &segment.points {
                    let point = waypoint.point();
                    points.push(TrackPoint {
                        lat: point.y(),
                        lon: point.x(),
                        elevation: waypoint.elevation,
                        time: waypoint.time,
                    });
                }
            }
        }
        log::debug!("Track index holds {} point(s)", points.len());
        TrackIndex { points }
    }

    /// Number of indexed track points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the document contains no track points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Find the track point closest in time to a timestamp
    ///
    /// Falls back to the first track point when no point carries a time.
    /// Returns `None` only when the document has no track points at all.
    pub fn nearest(&self, timestamp: Timestamp) -> Option<&TrackPoint> {
        self.points
            .iter()
            .filter_map(|p| {
                p.time
                    .map(|t| (p, (t - timestamp).num_milliseconds().abs()))
            })
            .min_by_key(|(_, distance)| *distance)
            .map(|(p, _)| p)
            .or_else(|| self.points.first())
    }
}

/// Write the combined output document to a sink
///
/// Re-emits every input track. When merging is enabled, each reading becomes
/// a waypoint placed at the track point nearest in time, annotated with its
/// severity band. Readings that cannot be placed are skipped with a warning.
pub fn compose<W: Write>(
    document: &Gpx,
    readings: &[SignalReading],
    config: &ProcessorConfig,
    sink: W,
) -> Result<()> {
    let bands = config.bands()?;
    let index = TrackIndex::from_gpx(document);

    let mut writer = EmitterConfig::new()
        .perform_indent(true)
        .create_writer(sink);

    writer.write(
        XmlEvent::start_element("gpx")
            .attr("version", GPX_VERSION)
            .attr("creator", GPX_CREATOR)
            .default_ns(GPX_NAMESPACE),
    )?;

    if config.merge {
        log::info!("Merging {} reading(s) into the output", readings.len());
        for reading in readings {
            let Some(point) = index.nearest(reading.timestamp) else {
                log::warn!(
                    "No track point available to place reading {}, skipping",
                    reading
                );
                continue;
            };

            let lat = format_coord(point.lat);
            let lon = format_coord(point.lon);
            writer.write(
                XmlEvent::start_element("wpt")
                    .attr("lat", &lat)
                    .attr("lon", &lon),
            )?;

            write_text_element(&mut writer, "time", &format_time(reading.timestamp))?;
            write_text_element(&mut writer, "name", &format!("RSSI {} dBm", reading.rssi))?;
            let comment = match bands.classify(reading.rssi) {
                Some(band) => band.to_string(),
                None => {
                    log::warn!("Reading {} is outside the valid RSSI domain", reading);
                    "out-of-range".to_string()
                }
            };
            write_text_element(&mut writer, "cmt", &comment)?;

            writer.write(XmlEvent::end_element())?;
        }
    }

    for track in &document.tracks {
        writer.write(XmlEvent::start_element("trk"))?;
        if let Some(name) = &track.name {
            write_text_element(&mut writer, "name", name)?;
        }
        for segment in &track.segments {
            writer.write(XmlEvent::start_element("trkseg"))?;
            for waypoint in &segment.points {
                let point = waypoint.point();
                let lat = format_coord(point.y());
                let lon = format_coord(point.x());
                writer.write(
                    XmlEvent::start_element("trkpt")
                        .attr("lat", &lat)
                        .attr("lon", &lon),
                )?;
                if let Some(elevation) = waypoint.elevation {
                    write_text_element(&mut writer, "ele", &format_coord(elevation))?;
                }
                if let Some(time) = waypoint.time {
                    write_text_element(&mut writer, "time", &format_time(time))?;
                }
                writer.write(XmlEvent::end_element())?;
            }
            writer.write(XmlEvent::end_element())?;
        }
        writer.write(XmlEvent::end_element())?;
    }

    writer.write(XmlEvent::end_element())?;
    Ok(())
}

fn write_text_element<W: Write>(
    writer: &mut EventWriter<W>,
    name: &str,
    text: &str,
) -> Result<()> {
    writer.write(XmlEvent::start_element(name))?;
    writer.write(XmlEvent::characters(text))?;
    writer.write(XmlEvent::end_element())?;
    Ok(())
}

fn format_coord(value: f64) -> String {
    value.to_string()
}

fn format_time(timestamp: Timestamp) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
