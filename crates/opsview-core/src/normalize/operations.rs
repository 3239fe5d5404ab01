//! Operation (flight plan) normalization.
//!
//! Two upstream dialects are recognized: the legacy flat snake_case export
//! (`operation_plan_id`, `operation_volumes[].operation_geography`, ...) and
//! the newer camelCase one with nested `publicInfo`, `flightDetails` and
//! `operationGeometry` wrappers.

use serde::Deserialize;
use serde_json::Value;

use crate::config::DEFAULT_ALTITUDE_UNIT;
use crate::error::ParseError;
use crate::fields::{
    first_array, first_bool, first_datetime, first_f64, first_i64, first_object, first_string,
    has_any,
};
use crate::models::{Altitude, Contact, Geometry, Operation, Volume};
use crate::normalize::reject_duplicate_ids;

const FORMAT_ERROR: &str = "Invalid flight plan data format";

const ID_FIELDS: &[&str] = &["operationPlanId", "operation_plan_id"];
const VOLUME_FIELDS: &[&str] = &["operationVolumes", "operation_volumes"];
const OFF_NOMINAL_FIELDS: &[&str] = &["offNominalVolumes", "off_nominal_volumes"];
/// Wrapper fields checked in this order when the document is neither an
/// array nor a single operation.
const WRAPPER_FIELDS: &[&str] = &["plans", "operations", "flight_plans"];

const BEGIN_FIELDS: &[&str] = &["timeBegin", "effectiveTimeBegin", "effective_time_begin"];
const END_FIELDS: &[&str] = &["timeEnd", "effectiveTimeEnd", "effective_time_end"];
const GEOGRAPHY_FIELDS: &[&str] = &[
    "operationGeometry.geom",
    "operation_geography",
    "operationGeography",
];
const MIN_ALTITUDE_FIELDS: &[&str] = &[
    "operationGeometry.minAltitude",
    "min_altitude",
    "minAltitude",
];
const MAX_ALTITUDE_FIELDS: &[&str] = &[
    "operationGeometry.maxAltitude",
    "max_altitude",
    "maxAltitude",
];

/// Parse an uploaded document into canonical operations.
///
/// Accepts a single operation object, an array of them, or a wrapper object
/// exposing the array under `plans`, `operations` or `flight_plans`. Every
/// element must carry a non-empty operation plan id.
pub fn parse_operations(raw: &Value) -> Result<Vec<Operation>, ParseError> {
    let records = resolve_records(raw)?;
    let operations = records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_operation(index, record))
        .collect::<Result<Vec<_>, _>>()?;
    reject_duplicate_ids(
        operations.iter().map(|op| op.operation_plan_id.as_str()),
        "operationPlanId",
    )?;

    tracing::debug!("Normalized {} operations", operations.len());
    Ok(operations)
}

fn resolve_records(raw: &Value) -> Result<&[Value], ParseError> {
    let records: &[Value] = match raw {
        Value::Array(items) => items,
        Value::Object(_) if has_any(raw, ID_FIELDS) || has_any(raw, VOLUME_FIELDS) => {
            std::slice::from_ref(raw)
        }
        Value::Object(_) => first_array(raw, WRAPPER_FIELDS)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };

    if records.is_empty() {
        return Err(ParseError::format(FORMAT_ERROR));
    }
    Ok(records)
}

fn normalize_operation(index: usize, raw: &Value) -> Result<Operation, ParseError> {
    if !raw.is_object() {
        return Err(ParseError::validation(index, "expected an operation object"));
    }

    let operation_plan_id = first_string(raw, ID_FIELDS)
        .ok_or_else(|| ParseError::validation(index, "missing operationPlanId"))?;

    Ok(Operation {
        flight_plan_id: first_string(raw, &["flightPlanId", "flight_plan_id"]),
        operator: first_string(raw, &["operator"]),
        title: first_string(raw, &["title", "publicInfo.title"]).unwrap_or_default(),
        description: first_string(
            raw,
            &[
                "description",
                "publicInfo.description",
                "flightDetails.flightComment",
            ],
        )
        .unwrap_or_default(),
        state: first_string(raw, &["state"]),
        closure_reason: first_string(raw, &["closureReason", "closure_reason"]),
        priority: first_i64(raw, &["priority"]),
        submit_time: first_datetime(raw, &["submitTime", "submit_time"]),
        update_time: first_datetime(raw, &["updateTime", "update_time"]),
        contact: normalize_contact(raw),
        operation_volumes: normalize_volumes(index, raw, VOLUME_FIELDS)?,
        off_nominal_volumes: normalize_volumes(index, raw, OFF_NOMINAL_FIELDS)?,
        operation_plan_id,
    })
}

fn normalize_volumes(index: usize, raw: &Value, paths: &[&str]) -> Result<Vec<Volume>, ParseError> {
    let Some(items) = first_array(raw, paths) else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            if item.is_object() {
                Ok(normalize_volume(item))
            } else {
                Err(ParseError::validation(
                    index,
                    format!("volume {} is not an object", position),
                ))
            }
        })
        .collect()
}

fn normalize_volume(raw: &Value) -> Volume {
    Volume {
        id: first_string(raw, &["id", "alias"]),
        ordinal: first_i64(raw, &["ordinal"]),
        volume_type: first_string(raw, &["volumeType", "volume_type"]),
        near_structure: first_bool(raw, &["nearStructure", "near_structure"]),
        beyond_visual_line_of_sight: first_bool(raw, &["isBVLOS", "beyond_visual_line_of_sight"]),
        effective_time_begin: first_datetime(raw, BEGIN_FIELDS),
        effective_time_end: first_datetime(raw, END_FIELDS),
        actual_time_end: first_datetime(raw, &["actualTimeEnd", "actual_time_end"]),
        min_altitude: first_object(raw, MIN_ALTITUDE_FIELDS).map(normalize_altitude),
        max_altitude: first_object(raw, MAX_ALTITUDE_FIELDS).map(normalize_altitude),
        geography: first_object(raw, GEOGRAPHY_FIELDS).and_then(normalize_geometry),
    }
}

fn normalize_altitude(raw: &Value) -> Altitude {
    Altitude {
        value: first_f64(raw, &["altitudeValue", "altitude_value"]).unwrap_or(0.0),
        unit: first_string(raw, &["unitsOfMeasure", "units_of_measure"])
            .unwrap_or_else(|| DEFAULT_ALTITUDE_UNIT.to_string()),
        vertical_reference: first_string(
            raw,
            &["altitudeType", "vertical_reference", "verticalReference"],
        ),
    }
}

/// Geometry outside the Polygon/MultiPolygon union is dropped with a warning.
fn normalize_geometry(raw: &Value) -> Option<Geometry> {
    match Geometry::deserialize(raw) {
        Ok(geometry) => Some(geometry),
        Err(err) => {
            tracing::warn!("Ignoring unsupported volume geometry: {}", err);
            None
        }
    }
}

fn normalize_contact(raw: &Value) -> Option<Contact> {
    let contact = first_object(raw, &["contactDetails", "contact"])?;

    let name = first_string(contact, &["name"]).or_else(|| {
        let full = [
            first_string(contact, &["firstName"]),
            first_string(contact, &["lastName"]),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
        (!full.is_empty()).then_some(full)
    });

    Some(Contact {
        name,
        phone: first_string(contact, &["phone", "phones.0"]),
        email: first_string(contact, &["email", "emails.0"]),
    })
}
