//! Flattened export records and their JSON / CSV writers.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ExportError;
use crate::models::{ParsedAor, ParsedOperation};
use crate::projector::zone_properties;

/// One row per operation volume with geography.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    pub operation_plan_id: String,
    pub flight_plan_id: String,
    pub title: String,
    pub description: String,
    pub operator: Option<String>,
    pub state: Option<String>,
    pub closure_reason: Option<String>,
    pub volume_index: usize,
    pub off_nominal: bool,
    pub min_altitude: Option<f64>,
    pub max_altitude: Option<f64>,
    pub altitude_unit: String,
    pub zone_start_time: Option<DateTime<Utc>>,
    pub zone_end_time: Option<DateTime<Utc>>,
    pub zone_area: f64,
    pub operation_start_time: DateTime<Utc>,
    pub operation_end_time: DateTime<Utc>,
    pub total_area: f64,
    pub zone_count: usize,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AorRecord {
    pub aor_id: String,
    pub name: String,
    pub designator: String,
    pub lower_limit: f64,
    pub upper_limit: f64,
    pub limit_unit: Option<String>,
    pub vertical_reference: Option<String>,
    pub aor_enabled: Option<bool>,
    pub auto_approval_enabled: Option<bool>,
    pub auto_reject: Option<bool>,
    pub max_simultaneous_operations: Option<u32>,
    pub area: f64,
}

/// JSON export envelope.
#[derive(Debug, Serialize)]
pub struct JsonExport<'a, T> {
    pub comment: String,
    pub data: &'a [T],
}

pub fn operation_records<'a, I>(operations: I) -> Vec<OperationRecord>
where
    I: IntoIterator<Item = &'a ParsedOperation>,
{
    operations
        .into_iter()
        .flat_map(|op| {
            zone_properties(op)
                .into_iter()
                .map(move |(zone, _)| OperationRecord {
                    operation_plan_id: zone.operation_plan_id,
                    flight_plan_id: zone.flight_plan_id,
                    title: zone.title,
                    description: zone.description,
                    operator: zone.operator,
                    state: zone.state,
                    closure_reason: zone.closure_reason,
                    volume_index: zone.volume_index,
                    off_nominal: zone.off_nominal,
                    min_altitude: zone.min_altitude,
                    max_altitude: zone.max_altitude,
                    altitude_unit: zone.altitude_unit,
                    zone_start_time: zone.start_time,
                    zone_end_time: zone.end_time,
                    zone_area: zone.area,
                    operation_start_time: op.start_time,
                    operation_end_time: op.end_time,
                    total_area: op.computed_area,
                    zone_count: op.zone_count,
                    color: zone.color,
                })
        })
        .collect()
}

pub fn aor_records<'a, I>(aors: I) -> Vec<AorRecord>
where
    I: IntoIterator<Item = &'a ParsedAor>,
{
    aors.into_iter()
        .map(|parsed| {
            let aor = &parsed.aor;
            AorRecord {
                aor_id: aor.id.clone(),
                name: aor.name.clone(),
                designator: aor.designator.clone(),
                lower_limit: aor.lower_limit,
                upper_limit: aor.upper_limit,
                limit_unit: aor.vertical_limits_uom.clone(),
                vertical_reference: aor.vertical_reference_type.clone(),
                aor_enabled: aor.aor_enabled,
                auto_approval_enabled: aor.auto_approval_enabled,
                auto_reject: aor.auto_reject,
                max_simultaneous_operations: aor.max_simultaneous_operations,
                area: parsed.computed_area,
            }
        })
        .collect()
}

pub fn to_json_export<T: Serialize>(records: &[T]) -> JsonExport<'_, T> {
    JsonExport {
        comment: format!("{} records exported", records.len()),
        data: records,
    }
}

/// Pretty-printed JSON envelope.
pub fn write_json<T: Serialize, W: Write>(records: &[T], writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, &to_json_export(records))?;
    Ok(())
}

/// Header row from the record field names, then one row per record.
///
/// An empty slice writes nothing.
pub fn write_csv<T: Serialize, W: Write>(records: &[T], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{derive_aors, derive_operations};
    use crate::normalize::{parse_areas_of_responsibility, parse_operations};
    use serde_json::{json, Value};

    fn square() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]
        })
    }

    fn operations() -> Vec<ParsedOperation> {
        let raw = json!([{
            "operation_plan_id": "OP-1",
            "title": "Survey, north field",
            "operation_volumes": [
                {
                    "effective_time_begin": "2024-01-01T00:00:00Z",
                    "effective_time_end": "2024-01-01T01:00:00Z",
                    "operation_geography": square()
                },
                {}
            ],
            "off_nominal_volumes": [{ "operation_geography": square() }]
        }]);
        derive_operations(parse_operations(&raw).unwrap())
    }

    #[test]
    fn operation_records_skip_volumes_without_geography() {
        let ops = operations();
        let records = operation_records(&ops);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].volume_index, 0);
        assert_eq!(records[1].volume_index, 2);
        assert!(records[1].off_nominal);
        assert_eq!(records[0].zone_count, 2);
        assert_eq!(records[0].total_area, ops[0].computed_area);
        assert_eq!(records[1].operation_start_time, ops[0].start_time);
    }

    #[test]
    fn json_envelope_counts_records() {
        let records = operation_records(&operations());
        let value = serde_json::to_value(to_json_export(&records)).unwrap();
        assert_eq!(value["comment"], json!("2 records exported"));
        assert_eq!(value["data"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["data"][0]["operationPlanId"], json!("OP-1"));
        assert_eq!(value["data"][0]["zoneStartTime"], json!("2024-01-01T00:00:00Z"));

        let empty: Vec<AorRecord> = Vec::new();
        let value = serde_json::to_value(to_json_export(&empty)).unwrap();
        assert_eq!(value["comment"], json!("0 records exported"));
    }

    #[test]
    fn csv_has_header_and_quoted_rows() {
        let records = operation_records(&operations());
        let mut out = Vec::new();
        write_csv(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("operationPlanId,flightPlanId,title,"));
        assert!(lines[1].starts_with("OP-1,OP-1,\"Survey, north field\","));
    }

    #[test]
    fn aor_records_export() {
        let raw = json!({
            "id": "AOR-1",
            "name": "Harbor",
            "designator": "HBR",
            "geometry": square(),
            "lowerLimit": 0,
            "upperLimit": 400,
            "aorEnabled": true
        });
        let aors = derive_aors(parse_areas_of_responsibility(&raw).unwrap());
        let records = aor_records(&aors);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].aor_enabled, Some(true));

        let mut out = Vec::new();
        write_json(&records, &mut out).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["comment"], json!("1 records exported"));
        assert_eq!(value["data"][0]["aorId"], json!("AOR-1"));
    }
}
