//! Area of Responsibility parsing.
//!
//! AoR exports come in a single camelCase dialect, so records are
//! deserialized strictly instead of going through tolerant field resolution.
//! One bad record rejects the whole upload.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;
use crate::fields::first_array;
use crate::models::AreaOfResponsibility;
use crate::normalize::reject_duplicate_ids;

const FORMAT_ERROR: &str = "No valid AoR data found in the file";
const WRAPPER_FIELDS: &[&str] = &["aors", "responsibility_areas"];

#[derive(Debug, Clone, Copy)]
enum Kind {
    String,
    Number,
    Object,
}

impl Kind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Kind::String => value.is_string(),
            Kind::Number => value.is_number(),
            Kind::Object => value.is_object(),
        }
    }
}

const REQUIRED_FIELDS: [(&str, Kind); 6] = [
    ("id", Kind::String),
    ("name", Kind::String),
    ("designator", Kind::String),
    ("geometry", Kind::Object),
    ("lowerLimit", Kind::Number),
    ("upperLimit", Kind::Number),
];

/// Parse an uploaded document into areas of responsibility.
///
/// Accepts a single AoR object, an array of them, or a wrapper object with
/// an `aors` or `responsibility_areas` array.
pub fn parse_areas_of_responsibility(
    raw: &Value,
) -> Result<Vec<AreaOfResponsibility>, ParseError> {
    let records: &[Value] = match raw {
        Value::Array(items) => items,
        Value::Object(_) if missing_required(raw).is_none() => std::slice::from_ref(raw),
        Value::Object(_) => first_array(raw, WRAPPER_FIELDS)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };

    if records.is_empty() {
        return Err(ParseError::format(FORMAT_ERROR));
    }

    let aors = records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_record(index, record))
        .collect::<Result<Vec<_>, _>>()?;
    reject_duplicate_ids(aors.iter().map(|aor| aor.id.as_str()), "AoR id")?;

    tracing::debug!("Parsed {} areas of responsibility", aors.len());
    Ok(aors)
}

/// First required field that is absent or of the wrong primitive type.
fn missing_required(record: &Value) -> Option<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .find(|(field, kind)| !record.get(*field).is_some_and(|value| kind.matches(value)))
        .map(|(field, _)| *field)
}

fn parse_record(index: usize, record: &Value) -> Result<AreaOfResponsibility, ParseError> {
    if !record.is_object() {
        return Err(ParseError::validation(
            index,
            "Invalid AoR data structure: expected an object",
        ));
    }
    if let Some(field) = missing_required(record) {
        return Err(ParseError::validation(
            index,
            format!("Invalid AoR data structure: missing or mistyped `{}`", field),
        ));
    }
    AreaOfResponsibility::deserialize(record).map_err(|err| {
        ParseError::validation(index, format!("Invalid AoR data structure: {}", err))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Geometry;
    use serde_json::json;

    fn aor(id: &str) -> Value {
        json!({
            "id": id,
            "name": "Harbor",
            "designator": "HBR",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]
            },
            "lowerLimit": 0,
            "upperLimit": 400,
            "verticalLimitsUom": "FT",
            "verticalReferenceType": "AGL",
            "autoReject": false,
            "autoApprovalEnabled": true,
            "maxSimultaneousOperations": 5,
            "featureType": "AOR"
        })
    }

    #[test]
    fn parses_all_fields() {
        let parsed = parse_areas_of_responsibility(&aor("AOR-1")).unwrap();
        assert_eq!(parsed.len(), 1);
        let aor = &parsed[0];
        assert_eq!(aor.id, "AOR-1");
        assert_eq!(aor.designator, "HBR");
        assert!(matches!(aor.geometry, Geometry::Polygon(_)));
        assert_eq!(aor.upper_limit, 400.0);
        assert_eq!(aor.vertical_limits_uom.as_deref(), Some("FT"));
        assert_eq!(aor.auto_reject, Some(false));
        assert_eq!(aor.auto_approval_enabled, Some(true));
        assert_eq!(aor.aor_enabled, None);
        assert_eq!(aor.max_simultaneous_operations, Some(5));
    }

    #[test]
    fn shapes_parse_identically() {
        let single = parse_areas_of_responsibility(&aor("AOR-1")).unwrap();
        let array = parse_areas_of_responsibility(&json!([aor("AOR-1")])).unwrap();
        let aors = parse_areas_of_responsibility(&json!({ "aors": [aor("AOR-1")] })).unwrap();
        let areas =
            parse_areas_of_responsibility(&json!({ "responsibility_areas": [aor("AOR-1")] }))
                .unwrap();
        assert_eq!(single, array);
        assert_eq!(single, aors);
        assert_eq!(single, areas);
    }

    #[test]
    fn missing_lower_limit_rejects_everything() {
        let mut broken = aor("AOR-2");
        broken.as_object_mut().unwrap().remove("lowerLimit");
        let err = parse_areas_of_responsibility(&json!([aor("AOR-1"), broken])).unwrap_err();
        assert!(matches!(err, ParseError::Validation { index: 1, .. }));
        assert!(err.to_string().contains("lowerLimit"), "{err}");
    }

    #[test]
    fn extended_geometry_is_kept() {
        let mut record = aor("AOR-6");
        let buffer = json!({
            "type": "Polygon",
            "coordinates": [[[-1, -1], [2, -1], [2, 2], [-1, 2], [-1, -1]]]
        });
        record["extendedGeometry"] = buffer.clone();
        let parsed = parse_areas_of_responsibility(&record).unwrap();
        assert_eq!(parsed[0].extended_geometry.as_ref(), Some(&buffer));

        let serialized = serde_json::to_value(&parsed[0]).unwrap();
        assert_eq!(serialized["extendedGeometry"], buffer);

        let plain = serde_json::to_value(&parse_areas_of_responsibility(&aor("AOR-7")).unwrap()[0])
            .unwrap();
        assert!(plain.get("extendedGeometry").is_none());
    }

    #[test]
    fn unusable_optional_fields_are_dropped() {
        let mut record = aor("AOR-8");
        record["maxSimultaneousOperations"] = json!(-1);
        record["autoReject"] = json!("yes");
        record["verticalLimitsUom"] = json!(12);
        let parsed = parse_areas_of_responsibility(&record).unwrap();
        assert_eq!(parsed[0].max_simultaneous_operations, None);
        assert_eq!(parsed[0].auto_reject, None);
        assert_eq!(parsed[0].vertical_limits_uom, None);
        assert_eq!(parsed[0].auto_approval_enabled, Some(true));

        record["maxSimultaneousOperations"] = json!(5.0);
        let parsed = parse_areas_of_responsibility(&record).unwrap();
        assert_eq!(parsed[0].max_simultaneous_operations, None);
    }

    #[test]
    fn duplicate_aor_id_rejects_upload() {
        let err = parse_areas_of_responsibility(&json!([aor("AOR-1"), aor("AOR-1")])).unwrap_err();
        assert!(matches!(err, ParseError::Validation { index: 1, .. }));
        assert!(err.to_string().contains("duplicate AoR id"), "{err}");
    }

    #[test]
    fn mistyped_field_is_rejected() {
        let mut broken = aor("AOR-3");
        broken["upperLimit"] = json!("400");
        let err = parse_areas_of_responsibility(&json!([broken])).unwrap_err();
        assert!(err.to_string().contains("upperLimit"));
    }

    #[test]
    fn unsupported_geometry_type_is_rejected() {
        let mut broken = aor("AOR-4");
        broken["geometry"] = json!({ "type": "Point", "coordinates": [0, 0] });
        let err = parse_areas_of_responsibility(&json!([broken])).unwrap_err();
        assert!(matches!(err, ParseError::Validation { index: 0, .. }));
    }

    #[test]
    fn invalid_single_object_is_a_format_error() {
        let mut broken = aor("AOR-5");
        broken.as_object_mut().unwrap().remove("name");
        let err = parse_areas_of_responsibility(&broken).unwrap_err();
        assert!(matches!(err, ParseError::Format(_)));
        assert_eq!(err.to_string(), "No valid AoR data found in the file");
    }

    #[test]
    fn non_collections_are_format_errors() {
        for raw in [json!(null), json!("aor"), json!([]), json!({ "aors": {} })] {
            assert!(matches!(
                parse_areas_of_responsibility(&raw),
                Err(ParseError::Format(_))
            ));
        }
    }
}
