//! Display helpers shared by summaries and popups.

use chrono::{DateTime, Utc};

const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Hectares from 1 ha upward, whole square meters below.
pub fn format_area(square_meters: f64) -> String {
    if square_meters >= SQUARE_METERS_PER_HECTARE {
        format!("{:.2} ha", square_meters / SQUARE_METERS_PER_HECTARE)
    } else {
        format!("{:.0} m²", square_meters)
    }
}

pub fn format_date_time(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn format_date_time_short(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M").to_string()
}

/// Altitude band such as `0-120 FT`; a missing bound renders as `?`.
pub fn format_altitude_band(min: Option<f64>, max: Option<f64>, unit: &str) -> String {
    let bound = |value: Option<f64>| value.map_or_else(|| "?".to_string(), |v| format!("{}", v));
    format!("{}-{} {}", bound(min), bound(max), unit)
}
