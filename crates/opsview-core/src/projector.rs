//! Projection of parsed entities into render-ready GeoJSON.
//!
//! Operations fan out to one feature per volume with geography; AoRs map
//! one-to-one. Feature order follows entity order then volume order, so
//! repeated projections of the same input serialize identically.

use chrono::{DateTime, Utc};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, JsonObject};
use serde::Serialize;
use serde_json::Value;

use crate::config::UNTITLED_OPERATION;
use crate::derive::volume_area;
use crate::models::{Geometry, ParsedAor, ParsedOperation};

pub const OPERATION_DATA_TYPE: &str = "operation";
pub const AOR_DATA_TYPE: &str = "aor";

/// Hover/popup properties of one operation zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneProperties {
    pub data_type: &'static str,
    pub operation_plan_id: String,
    /// Secondary id, falling back to the operation id.
    pub flight_plan_id: String,
    pub operator: Option<String>,
    pub title: String,
    pub description: String,
    pub state: Option<String>,
    pub closure_reason: Option<String>,
    /// Position in nominal-then-off-nominal order.
    pub volume_index: usize,
    pub off_nominal: bool,
    pub min_altitude: Option<f64>,
    pub max_altitude: Option<f64>,
    pub altitude_unit: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// This volume's own area, not the operation total.
    pub area: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AorProperties {
    pub data_type: &'static str,
    pub aor_id: String,
    pub name: String,
    pub designator: String,
    pub lower_limit: f64,
    pub upper_limit: f64,
    pub limit_unit: Option<String>,
    pub vertical_reference: Option<String>,
    pub area: f64,
    pub color: String,
}

impl From<&Geometry> for geojson::Geometry {
    fn from(geometry: &Geometry) -> Self {
        let value = match geometry {
            Geometry::Polygon(rings) => geojson::Value::Polygon(rings.clone()),
            Geometry::MultiPolygon(polygons) => geojson::Value::MultiPolygon(polygons.clone()),
        };
        geojson::Geometry::new(value)
    }
}

/// Zone properties for every volume of `op` that has geography, paired with
/// that geography.
pub fn zone_properties(op: &ParsedOperation) -> Vec<(ZoneProperties, &Geometry)> {
    let operation = &op.operation;
    let nominal = operation.operation_volumes.len();

    operation
        .all_volumes()
        .enumerate()
        .filter_map(|(index, volume)| {
            let geography = volume.geography.as_ref()?;
            let title = if operation.title.is_empty() {
                UNTITLED_OPERATION.to_string()
            } else {
                operation.title.clone()
            };
            let properties = ZoneProperties {
                data_type: OPERATION_DATA_TYPE,
                operation_plan_id: operation.operation_plan_id.clone(),
                flight_plan_id: operation
                    .flight_plan_id
                    .clone()
                    .unwrap_or_else(|| operation.operation_plan_id.clone()),
                operator: operation.operator.clone(),
                title,
                description: operation.description.clone(),
                state: operation.state.clone(),
                closure_reason: operation.closure_reason.clone(),
                volume_index: index,
                off_nominal: index >= nominal,
                min_altitude: volume.min_altitude.as_ref().map(|alt| alt.value),
                max_altitude: volume.max_altitude.as_ref().map(|alt| alt.value),
                altitude_unit: volume.altitude_unit().to_string(),
                start_time: volume.effective_time_begin,
                end_time: volume.effective_time_end,
                area: volume_area(volume),
                color: op.color.clone(),
            };
            Some((properties, geography))
        })
        .collect()
}

pub fn aor_properties(aor: &ParsedAor) -> AorProperties {
    AorProperties {
        data_type: AOR_DATA_TYPE,
        aor_id: aor.aor.id.clone(),
        name: aor.aor.name.clone(),
        designator: aor.aor.designator.clone(),
        lower_limit: aor.aor.lower_limit,
        upper_limit: aor.aor.upper_limit,
        limit_unit: aor.aor.vertical_limits_uom.clone(),
        vertical_reference: aor.aor.vertical_reference_type.clone(),
        area: aor.computed_area,
        color: aor.color.clone(),
    }
}

/// One feature per operation volume with geography.
pub fn operations_to_features<'a, I>(ops: I) -> FeatureCollection
where
    I: IntoIterator<Item = &'a ParsedOperation>,
{
    let features = ops
        .into_iter()
        .flat_map(|op| {
            zone_properties(op)
                .into_iter()
                .map(|(properties, geometry)| {
                    let id = format!("{}/{}", properties.operation_plan_id, properties.volume_index);
                    build_feature(id, &properties, geometry)
                })
                .collect::<Vec<_>>()
        })
        .collect();

    collection(features)
}

/// One feature per AoR.
pub fn aors_to_features(aors: &[ParsedAor]) -> FeatureCollection {
    let features = aors
        .iter()
        .map(|aor| build_feature(aor.aor.id.clone(), &aor_properties(aor), &aor.aor.geometry))
        .collect();

    collection(features)
}

/// Operation features followed by AoR features.
pub fn combined_features(ops: &[ParsedOperation], aors: &[ParsedAor]) -> FeatureCollection {
    let mut combined = operations_to_features(ops);
    combined.features.extend(aors_to_features(aors).features);
    combined
}

fn build_feature<P: Serialize>(id: String, properties: &P, geometry: &Geometry) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry.into()),
        id: Some(Id::String(id)),
        properties: Some(to_properties(properties)),
        foreign_members: None,
    }
}

fn to_properties<P: Serialize>(properties: &P) -> JsonObject {
    match serde_json::to_value(properties) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!("Feature properties serialized to non-object {}", other);
            JsonObject::new()
        }
        Err(err) => {
            tracing::warn!("Feature properties failed to serialize: {}", err);
            JsonObject::new()
        }
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
