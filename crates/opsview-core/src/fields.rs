//! Tolerant field resolution over raw JSON.
//!
//! Each accessor takes an ordered list of candidate paths (dotted, e.g.
//! `"publicInfo.title"`) and returns the first value that is present and of
//! the requested type. Callers list the newer camelCase path first and the
//! legacy snake_case path second.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Value at a dotted path; JSON `null` counts as absent. Numeric segments
/// index into arrays (`"phones.0"`).
pub(crate) fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| match current {
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => current.get(key),
        })
        .filter(|found| !found.is_null())
}

pub(crate) fn has_any(value: &Value, paths: &[&str]) -> bool {
    paths.iter().any(|path| lookup(value, path).is_some())
}

/// First non-empty string, trimmed.
pub(crate) fn first_string(value: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| {
        lookup(value, path)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}

/// First finite number; numeric strings are accepted.
pub(crate) fn first_f64(value: &Value, paths: &[&str]) -> Option<f64> {
    paths.iter().find_map(|path| {
        let found = lookup(value, path)?;
        let number = match found {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        number.is_finite().then_some(number)
    })
}

pub(crate) fn first_i64(value: &Value, paths: &[&str]) -> Option<i64> {
    paths.iter().find_map(|path| {
        let found = lookup(value, path)?;
        found.as_i64().or_else(|| {
            found
                .as_f64()
                .filter(|number| number.fract() == 0.0 && number.is_finite())
                .map(|number| number as i64)
        })
    })
}

pub(crate) fn first_bool(value: &Value, paths: &[&str]) -> Option<bool> {
    paths
        .iter()
        .find_map(|path| lookup(value, path).and_then(|v| v.as_bool()))
}

/// First value that is a JSON object.
pub(crate) fn first_object<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .find_map(|path| lookup(value, path).filter(|v| v.is_object()))
}

pub(crate) fn first_array<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Vec<Value>> {
    paths
        .iter()
        .find_map(|path| lookup(value, path).and_then(|v| v.as_array()))
}

/// First present timestamp-like value, parsed. A malformed value is absent.
pub(crate) fn first_datetime(value: &Value, paths: &[&str]) -> Option<DateTime<Utc>> {
    let raw = paths.iter().find_map(|path| {
        lookup(value, path).filter(|v| match v {
            Value::String(text) => !text.trim().is_empty(),
            Value::Number(_) => true,
            _ => false,
        })
    })?;
    let parsed = match raw {
        Value::String(text) => parse_timestamp(text),
        Value::Number(number) => number.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    if parsed.is_none() {
        tracing::debug!("Ignoring unparseable timestamp {}", raw);
    }
    parsed
}

/// Parse an instant the way uploaded plans write them.
///
/// Accepts RFC 3339, naive date-times (taken as UTC) and bare dates (UTC
/// midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
