//! Canonical data models for operations and areas of responsibility.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::DEFAULT_ALTITUDE_UNIT;

/// A GeoJSON position: `[lon, lat]`, optionally followed by more ordinates.
pub type Position = Vec<f64>;

/// Horizontal extent of a volume or AoR.
///
/// Serializes to the GeoJSON `{"type": ..., "coordinates": ...}` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// Outer ring followed by holes.
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

/// Vertical bound of a volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Altitude {
    pub value: f64,
    pub unit: String,
    #[serde(default)]
    pub vertical_reference: Option<String>,
}

/// A single altitude- and time-bounded region of an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: Option<String>,
    pub ordinal: Option<i64>,
    pub volume_type: Option<String>,
    pub near_structure: Option<bool>,
    pub beyond_visual_line_of_sight: Option<bool>,
    pub effective_time_begin: Option<DateTime<Utc>>,
    pub effective_time_end: Option<DateTime<Utc>>,
    pub actual_time_end: Option<DateTime<Utc>>,
    pub min_altitude: Option<Altitude>,
    pub max_altitude: Option<Altitude>,
    pub geography: Option<Geometry>,
}

impl Volume {
    /// Unit shown for the altitude band: max altitude's unit, then min's.
    pub fn altitude_unit(&self) -> &str {
        self.max_altitude
            .as_ref()
            .or(self.min_altitude.as_ref())
            .map(|alt| alt.unit.as_str())
            .filter(|unit| !unit.is_empty())
            .unwrap_or(DEFAULT_ALTITUDE_UNIT)
    }
}

/// Operator contact details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// A flight plan / operation, independent of the input dialect it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub operation_plan_id: String,
    pub flight_plan_id: Option<String>,
    pub operator: Option<String>,
    pub title: String,
    pub description: String,
    pub state: Option<String>,
    pub closure_reason: Option<String>,
    pub priority: Option<i64>,
    pub submit_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    pub contact: Option<Contact>,
    pub operation_volumes: Vec<Volume>,
    #[serde(default)]
    pub off_nominal_volumes: Vec<Volume>,
}

impl Operation {
    /// Nominal volumes followed by off-nominal ones.
    pub fn all_volumes(&self) -> impl Iterator<Item = &Volume> + '_ {
        self.operation_volumes
            .iter()
            .chain(self.off_nominal_volumes.iter())
    }
}

/// Closed time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when the two closed windows share at least one instant.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Operation plus derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedOperation {
    #[serde(flatten)]
    pub operation: Operation,
    /// Square meters over nominal and off-nominal volumes.
    pub computed_area: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub zone_count: usize,
    /// Palette entry fixed at upload time.
    pub color: String,
}

impl ParsedOperation {
    pub fn id(&self) -> &str {
        &self.operation.operation_plan_id
    }

    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

/// Lifecycle bucket of an operation relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// Not started yet
    Pending,
    /// Within its time window
    Active,
    /// Ended
    Expired,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Pending => "pending",
            OperationStatus::Active => "active",
            OperationStatus::Expired => "expired",
        }
    }
}

// ========== AREA OF RESPONSIBILITY ==========

/// A jurisdictional polygon with vertical limits and approval behaviour flags.
///
/// The six identifying fields are strict: absent or mistyped, the record is
/// rejected. Optional fields with an unusable value are dropped instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaOfResponsibility {
    pub id: String,
    pub name: String,
    pub designator: String,
    pub geometry: Geometry,
    pub lower_limit: f64,
    pub upper_limit: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub vertical_limits_uom: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub vertical_reference_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub auto_reject: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub auto_approval_enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub aor_enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub auto_take_off_clearance_enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub max_simultaneous_operations_enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub max_simultaneous_operations: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub feature_type: Option<String>,
    /// Buffer geometry carried through as-is; any shape is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_geometry: Option<Value>,
}

/// `Some` when the value fits `T`; `None` (with a warning) when it doesn't.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            tracing::warn!("Dropping unusable optional AoR field: {}", err);
            Ok(None)
        }
    }
}

/// AoR plus derived area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedAor {
    #[serde(flatten)]
    pub aor: AreaOfResponsibility,
    pub computed_area: f64,
    pub color: String,
}

impl ParsedAor {
    pub fn id(&self) -> &str {
        &self.aor.id
    }
}
