//! Spherical area and envelope math for zone geometries.

use std::fmt;

use geojson::FeatureCollection;

use crate::models::{Geometry, Position};

/// Sphere radius used for area computation (WGS84 equatorial radius).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// `[[min_lon, min_lat], [max_lon, max_lat]]`
pub type Bounds = [[f64; 2]; 2];

#[derive(Debug, Clone, PartialEq)]
enum GeometryFault {
    Empty,
    ShortRing(usize),
    OpenRing,
    ShortPosition,
    NonFinite,
}

impl fmt::Display for GeometryFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryFault::Empty => write!(f, "empty coordinate array"),
            GeometryFault::ShortRing(len) => {
                write!(f, "ring has {} positions, at least 4 required", len)
            }
            GeometryFault::OpenRing => write!(f, "first and last positions differ"),
            GeometryFault::ShortPosition => write!(f, "position with fewer than 2 ordinates"),
            GeometryFault::NonFinite => write!(f, "non-finite ordinate"),
        }
    }
}

/// Surface area of a polygon or multipolygon in square meters.
///
/// Holes are subtracted from their outer ring and multipolygon members are
/// summed. Malformed geometry yields 0 and a warning; this never fails.
pub fn area(geometry: &Geometry) -> f64 {
    match try_area(geometry) {
        Ok(area) => area,
        Err(fault) => {
            tracing::warn!(
                "Area computation failed for {}: {} (using 0)",
                geometry.type_name(),
                fault
            );
            0.0
        }
    }
}

fn try_area(geometry: &Geometry) -> Result<f64, GeometryFault> {
    match geometry {
        Geometry::Polygon(rings) => polygon_area(rings),
        Geometry::MultiPolygon(polygons) => {
            if polygons.is_empty() {
                return Err(GeometryFault::Empty);
            }
            Ok(polygons
                .iter()
                .enumerate()
                .map(|(index, rings)| {
                    polygon_area(rings).unwrap_or_else(|fault| {
                        tracing::warn!("MultiPolygon member {} skipped: {}", index, fault);
                        0.0
                    })
                })
                .sum())
        }
    }
}

fn polygon_area(rings: &[Vec<Position>]) -> Result<f64, GeometryFault> {
    let Some((outer, holes)) = rings.split_first() else {
        return Err(GeometryFault::Empty);
    };
    let outer_area = ring_area(outer)?.abs();
    let mut hole_area = 0.0;
    for hole in holes {
        hole_area += ring_area(hole)?.abs();
    }
    Ok((outer_area - hole_area).max(0.0))
}

/// Signed area of a closed ring on the sphere.
///
/// For each vertex, (lon[i+1] - lon[i-1]) * sin(lat[i]) is accumulated over
/// the ring with the closing duplicate removed, then scaled by R²/2.
fn ring_area(ring: &[Position]) -> Result<f64, GeometryFault> {
    if ring.len() < 4 {
        return Err(GeometryFault::ShortRing(ring.len()));
    }
    for position in ring {
        if position.len() < 2 {
            return Err(GeometryFault::ShortPosition);
        }
        if !position[0].is_finite() || !position[1].is_finite() {
            return Err(GeometryFault::NonFinite);
        }
    }
    let (first, last) = (&ring[0], &ring[ring.len() - 1]);
    if first[0] != last[0] || first[1] != last[1] {
        return Err(GeometryFault::OpenRing);
    }

    let n = ring.len() - 1;
    let mut total = 0.0;
    for i in 0..n {
        let lower = &ring[i];
        let middle = &ring[(i + 1) % n];
        let upper = &ring[(i + 2) % n];
        total += (upper[0].to_radians() - lower[0].to_radians()) * middle[1].to_radians().sin();
    }

    Ok(total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0)
}

/// Axis-aligned envelope over every feature geometry.
///
/// Returns `None` when the collection has no usable positions. Longitudes are
/// not unwrapped across the antimeridian.
pub fn bounding_box(collection: &FeatureCollection) -> Option<Bounds> {
    let mut bounds: Option<Bounds> = None;
    for feature in &collection.features {
        if let Some(geometry) = &feature.geometry {
            extend_bounds(&geometry.value, &mut bounds);
        }
    }
    bounds
}

fn extend_bounds(value: &geojson::Value, bounds: &mut Option<Bounds>) {
    use geojson::Value;

    match value {
        Value::Point(position) => include_position(position, bounds),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            for position in positions {
                include_position(position, bounds);
            }
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            for position in lines.iter().flatten() {
                include_position(position, bounds);
            }
        }
        Value::MultiPolygon(polygons) => {
            for position in polygons.iter().flatten().flatten() {
                include_position(position, bounds);
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                extend_bounds(&geometry.value, bounds);
            }
        }
    }
}

fn include_position(position: &[f64], bounds: &mut Option<Bounds>) {
    if position.len() < 2 || !position[0].is_finite() || !position[1].is_finite() {
        return;
    }
    let (lon, lat) = (position[0], position[1]);
    *bounds = Some(match *bounds {
        Some([min, max]) => [
            [min[0].min(lon), min[1].min(lat)],
            [max[0].max(lon), max[1].max(lat)],
        ],
        None => [[lon, lat], [lon, lat]],
    });
}
