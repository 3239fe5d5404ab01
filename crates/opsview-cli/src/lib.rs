//! Opsview CLI - file-driven front end for the flight ops viewer pipeline.
//!
//! Plays the page shell: reads upload files into a [`Session`], prints
//! summaries, writes GeoJSON and exports.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use opsview_core::config::DEFAULT_ALTITUDE_UNIT;
use opsview_core::derive::operation_status;
use opsview_core::fields::parse_timestamp;
use opsview_core::format::{format_altitude_band, format_area, format_date_time};
use opsview_core::{
    aor_records, operation_records, write_csv, write_json, Session, TimeRange,
};

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// `{comment, data}` envelope
    Json,
    /// Header row plus one row per record
    Csv,
}

/// Read and load whichever upload files were given.
pub fn load_session(ops: Option<&Path>, aors: Option<&Path>) -> Result<Session> {
    let mut session = Session::new();

    if let Some(path) = ops {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        session
            .load_operations_str(&text)
            .with_context(|| format!("Failed to load operations from {}", path.display()))?;
    }

    if let Some(path) = aors {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        session
            .load_aors_str(&text)
            .with_context(|| format!("Failed to load AoRs from {}", path.display()))?;
    }

    Ok(session)
}

/// Lenient instant parser for `--from` / `--to`.
pub fn parse_instant(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("unrecognized timestamp `{}`", raw))
}

/// Timeframe from optional bounds; an open end takes the loaded span's end.
pub fn timeframe(
    session: &Session,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Option<TimeRange> {
    if from.is_none() && to.is_none() {
        return session.timeframe();
    }
    let seeded = session.timeframe();
    let start = from.or(seeded.map(|range| range.start)).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let end = to.or(seeded.map(|range| range.end)).unwrap_or(DateTime::<Utc>::MAX_UTC);
    Some(TimeRange::new(start, end))
}

/// One line per operation, then one per AoR.
pub fn summary_lines(session: &Session, now: DateTime<Utc>) -> Vec<String> {
    let operations = session.operations().iter().map(|op| {
        let title = if op.operation.title.is_empty() {
            opsview_core::config::UNTITLED_OPERATION
        } else {
            op.operation.title.as_str()
        };
        format!(
            "{}  {}  [{}]  zones={}  area={}  start={}",
            op.id(),
            title,
            operation_status(op.start_time, op.end_time, now).as_str(),
            op.zone_count,
            format_area(op.computed_area),
            format_date_time(&op.start_time),
        )
    });

    let aors = session.aors().iter().map(|aor| {
        let unit = aor
            .aor
            .vertical_limits_uom
            .as_deref()
            .unwrap_or(DEFAULT_ALTITUDE_UNIT);
        format!(
            "{}  {} ({})  limits={}  area={}",
            aor.id(),
            aor.aor.name,
            aor.aor.designator,
            format_altitude_band(Some(aor.aor.lower_limit), Some(aor.aor.upper_limit), unit),
            format_area(aor.computed_area),
        )
    });

    operations.chain(aors).collect()
}

/// Write the operation export (selection or visible set).
pub fn export_operations<W: Write>(session: &Session, format: ExportFormat, writer: W) -> Result<usize> {
    let records = operation_records(session.export_operations());
    match format {
        ExportFormat::Json => write_json(&records, writer)?,
        ExportFormat::Csv => write_csv(&records, writer)?,
    }
    Ok(records.len())
}

pub fn export_aors<W: Write>(session: &Session, format: ExportFormat, writer: W) -> Result<usize> {
    let records = aor_records(session.export_aors());
    match format {
        ExportFormat::Json => write_json(&records, writer)?,
        ExportFormat::Csv => write_csv(&records, writer)?,
    }
    Ok(records.len())
}

/// File at `path`, or stdout.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(io::BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn session() -> Session {
        let mut session = Session::new();
        session
            .load_operations(&json!([{
                "operation_plan_id": "OP-1",
                "operation_volumes": [{
                    "effective_time_begin": "2024-01-01T00:00:00Z",
                    "effective_time_end": "2024-01-01T02:00:00Z",
                    "operation_geography": {
                        "type": "Polygon",
                        "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]
                    }
                }]
            }]))
            .unwrap();
        session
    }

    #[test]
    fn summary_shows_status_and_area() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
        let lines = summary_lines(&session(), now);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("OP-1  Untitled Operation  [active]"), "{}", lines[0]);
        assert!(lines[0].contains("zones=1"));
        assert!(lines[0].contains(" ha"));
        assert!(lines[0].ends_with("start=2024-01-01 00:00:00 UTC"));
    }

    #[test]
    fn summary_lists_aor_limits() {
        let mut session = session();
        session
            .load_aors(&json!({
                "id": "AOR-1",
                "name": "Harbor",
                "designator": "HBR",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]
                },
                "lowerLimit": 0,
                "upperLimit": 400
            }))
            .unwrap();
        let lines = summary_lines(&session, Utc::now());
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("AOR-1  Harbor (HBR)  limits=0-400 FT"), "{}", lines[1]);
    }

    #[test]
    fn open_ended_timeframe_uses_loaded_span() {
        let session = session();
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
        let range = timeframe(&session, Some(from), None).unwrap();
        assert_eq!(range.start, from);
        assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap());
        assert_eq!(timeframe(&session, None, None), session.timeframe());
    }

    #[test]
    fn instants_parse_leniently() {
        assert!(parse_instant("2024-01-01").is_ok());
        assert!(parse_instant("2024-01-01T10:00:00Z").is_ok());
        assert!(parse_instant("yesterday").is_err());
    }

    #[test]
    fn export_writes_records() {
        let mut out = Vec::new();
        let written = export_operations(&session(), ExportFormat::Json, &mut out).unwrap();
        assert_eq!(written, 1);
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["comment"], json!("1 records exported"));
    }
}
