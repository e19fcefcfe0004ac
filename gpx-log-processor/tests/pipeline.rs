//! End-to-end pipeline test: validate a track file, extract readings from a
//! radio log, and compose the merged output document.

use std::io::Write;

use tempfile::NamedTempFile;

use gpx_log_processor::{
    compose, validator, ProcessorConfig, ProcessorError, RssiLogParser, SignalBand, TrackIndex,
};

const TRACK_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Survey run</name>
    <trkseg>
      <trkpt lat="47.644548" lon="-122.326897">
        <ele>4.46</ele>
        <time>2021-05-01T11:59:00Z</time>
      </trkpt>
      <trkpt lat="47.645874" lon="-122.326194">
        <ele>4.94</ele>
        <time>2021-05-01T12:00:30Z</time>
      </trkpt>
      <trkpt lat="47.647120" lon="-122.325480">
        <ele>6.87</ele>
        <time>2021-05-01T12:02:00Z</time>
      </trkpt>
    </trkseg>
  </trk>
</gpx>"#;

const RADIO_LOG: &str = "\
2021.05.01;11:59:30.000000;GPS;fix=3d
2021.05.01;12:00:00.000000;PeerRSSI:-80;PeerSNR:12
garbage with PeerRSSI marker but no timestamp
2021.05.01;12:01:30.000000;Radio;PeerRSSI:-130
2021.05.01;12:02:00.000000;Battery:74
";

fn write_fixture(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn full_pipeline_with_merge() {
    let gpx_file = write_fixture(TRACK_GPX);
    let log_file = write_fixture(RADIO_LOG);

    let document = validator::validate_gpx_file(gpx_file.path()).unwrap();

    let mut readings = Vec::new();
    let mut parse_errors = 0;
    for result in RssiLogParser::parse(log_file.path()).unwrap() {
        match result {
            Ok(reading) => readings.push(reading),
            Err(ProcessorError::ParseError { line, .. }) => {
                assert_eq!(line, 3);
                parse_errors += 1;
            }
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(readings.len(), 2);
    assert_eq!(parse_errors, 1);
    assert_eq!(readings[0].rssi, -80);
    assert_eq!(readings[1].rssi, -130);

    let config = ProcessorConfig::new().with_merge(true);
    let mut sink = Vec::new();
    compose(&document, &readings, &config, &mut sink).unwrap();
    let output = String::from_utf8(sink).unwrap();

    // Well-formed, declared, and GPX-shaped
    assert!(output.starts_with("<?xml"));
    assert!(output.contains("xmlns=\"http://www.topografix.com/GPX/1/1\""));

    // The -80 reading at 12:00:00 correlates with the 12:00:30 track point
    assert!(output.contains("<wpt lat=\"47.645874\" lon=\"-122.326194\">"));
    assert!(output.contains("<name>RSSI -80 dBm</name>"));
    assert!(output.contains("<cmt>green</cmt>"));

    // The -130 reading is below the default threshold
    assert!(output.contains("<name>RSSI -130 dBm</name>"));
    assert!(output.contains("<cmt>orange</cmt>"));

    // The input track survives in the output
    assert!(output.contains("<name>Survey run</name>"));
    assert!(output.contains("<trkpt lat=\"47.644548\" lon=\"-122.326897\">"));

    // The result parses as GPX again
    let reparsed = validator::validate_gpx(output.as_bytes()).unwrap();
    assert_eq!(reparsed.waypoints.len(), 2);
    assert_eq!(reparsed.tracks.len(), 1);
    assert_eq!(reparsed.tracks[0].segments[0].points.len(), 3);
}

#[test]
fn pipeline_without_merge_keeps_track_only() {
    let gpx_file = write_fixture(TRACK_GPX);
    let log_file = write_fixture(RADIO_LOG);

    let document = validator::validate_gpx_file(gpx_file.path()).unwrap();
    let readings: Vec<_> = RssiLogParser::parse(log_file.path())
        .unwrap()
        .filter_map(|r| r.ok())
        .collect();

    let mut sink = Vec::new();
    compose(&document, &readings, &ProcessorConfig::new(), &mut sink).unwrap();
    let output = String::from_utf8(sink).unwrap();

    assert!(!output.contains("<wpt"));
    assert!(output.contains("<trkpt"));
}

#[test]
fn invalid_gpx_fails_before_extraction() {
    let gpx_file = write_fixture("<gpx version=\"1.1\"><trk><trkseg>");

    let result = validator::validate_gpx_file(gpx_file.path());
    assert!(matches!(
        result,
        Err(ProcessorError::SchemaValidation(_))
    ));
}

#[test]
fn readings_correlate_with_nearest_track_points() {
    let gpx_file = write_fixture(TRACK_GPX);
    let log_file = write_fixture(RADIO_LOG);

    let document = validator::validate_gpx_file(gpx_file.path()).unwrap();
    let index = TrackIndex::from_gpx(&document);
    let readings: Vec<_> = RssiLogParser::parse(log_file.path())
        .unwrap()
        .filter_map(|r| r.ok())
        .collect();

    // -80 at 12:00:00 is closest to the 12:00:30 point
    let near = index.nearest(readings[0].timestamp).unwrap();
    assert_eq!(near.lat, 47.645874);

    // -130 at 12:01:30 is closest to the 12:02:00 point
    let near = index.nearest(readings[1].timestamp).unwrap();
    assert_eq!(near.lat, 47.64712);

    let bands = ProcessorConfig::new().bands().unwrap();
    assert_eq!(bands.classify(readings[0].rssi), Some(SignalBand::Green));
    assert_eq!(bands.classify(readings[1].rssi), Some(SignalBand::Orange));
}
