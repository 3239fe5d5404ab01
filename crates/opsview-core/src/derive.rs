//! Derived metrics: time windows, areas, zone counts and color assignment.

use chrono::{DateTime, Utc};

use crate::config::{palette_color, AOR_COLOR};
use crate::geometry::area;
use crate::models::{
    AreaOfResponsibility, Operation, OperationStatus, ParsedAor, ParsedOperation, TimeRange,
    Volume,
};

/// Earliest and latest valid instant across the volumes' begin/end times.
///
/// Unparseable timestamps were already dropped during normalization, so a
/// volume contributes only the instants it has.
pub fn volume_time_range<'a, I>(volumes: I) -> Option<TimeRange>
where
    I: IntoIterator<Item = &'a Volume>,
{
    volumes
        .into_iter()
        .flat_map(|volume| [volume.effective_time_begin, volume.effective_time_end])
        .flatten()
        .fold(None, |range: Option<TimeRange>, instant| {
            Some(match range {
                Some(range) => TimeRange::new(range.start.min(instant), range.end.max(instant)),
                None => TimeRange::new(instant, instant),
            })
        })
}

/// Area of one volume; 0 without geography.
pub fn volume_area(volume: &Volume) -> f64 {
    volume.geography.as_ref().map(area).unwrap_or(0.0)
}

/// Compute the metrics of one operation.
///
/// When no volume carries a valid instant, both ends of the window default
/// to the moment of derivation.
pub fn derive_operation(operation: Operation, color: impl Into<String>) -> ParsedOperation {
    let (start_time, end_time) = match volume_time_range(operation.all_volumes()) {
        Some(range) => (range.start, range.end),
        None => {
            let now = Utc::now();
            (now, now)
        }
    };
    let computed_area: f64 = operation.all_volumes().map(volume_area).sum();
    let zone_count = operation
        .all_volumes()
        .filter(|volume| volume.geography.is_some())
        .count();

    ParsedOperation {
        operation,
        computed_area,
        start_time,
        end_time,
        zone_count,
        color: color.into(),
    }
}

/// Derive every operation of an upload, coloring them by upload position.
pub fn derive_operations(operations: Vec<Operation>) -> Vec<ParsedOperation> {
    operations
        .into_iter()
        .enumerate()
        .map(|(index, operation)| derive_operation(operation, palette_color(index)))
        .collect()
}

pub fn derive_aor(aor: AreaOfResponsibility) -> ParsedAor {
    let computed_area = area(&aor.geometry);
    ParsedAor {
        aor,
        computed_area,
        color: AOR_COLOR.to_string(),
    }
}

pub fn derive_aors(aors: Vec<AreaOfResponsibility>) -> Vec<ParsedAor> {
    aors.into_iter().map(derive_aor).collect()
}

/// Span of all operations, used to seed the default timeframe filter.
pub fn overall_time_range(operations: &[ParsedOperation]) -> Option<TimeRange> {
    let start = operations.iter().map(|op| op.start_time).min()?;
    let end = operations.iter().map(|op| op.end_time).max()?;
    Some(TimeRange::new(start, end))
}

pub fn operation_status(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> OperationStatus {
    if now < start {
        OperationStatus::Pending
    } else if now > end {
        OperationStatus::Expired
    } else {
        OperationStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OPERATION_PALETTE;
    use crate::models::Geometry;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    fn square() -> Geometry {
        Geometry::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ]])
    }

    fn volume(begin: Option<u32>, end: Option<u32>, geography: Option<Geometry>) -> Volume {
        Volume {
            effective_time_begin: begin.map(at),
            effective_time_end: end.map(at),
            geography,
            ..Volume::default()
        }
    }

    fn operation(id: &str, volumes: Vec<Volume>, off_nominal: Vec<Volume>) -> Operation {
        Operation {
            operation_plan_id: id.to_string(),
            operation_volumes: volumes,
            off_nominal_volumes: off_nominal,
            ..Operation::default()
        }
    }

    #[test]
    fn time_range_spans_all_volumes() {
        let op = operation(
            "OP-1",
            vec![volume(Some(3), Some(5), None)],
            vec![volume(Some(1), None, None), volume(None, Some(9), None)],
        );
        let parsed = derive_operation(op, "#000000");
        assert_eq!(parsed.start_time, at(1));
        assert_eq!(parsed.end_time, at(9));
    }

    #[test]
    fn missing_instants_default_to_now() {
        let before = Utc::now();
        let parsed = derive_operation(operation("OP-1", vec![volume(None, None, None)], vec![]), "#0");
        let after = Utc::now();
        assert_eq!(parsed.start_time, parsed.end_time);
        assert!(parsed.start_time >= before && parsed.start_time <= after);
    }

    #[test]
    fn area_and_zone_count_include_off_nominal() {
        let op = operation(
            "OP-1",
            vec![volume(None, None, Some(square())), volume(None, None, None)],
            vec![volume(None, None, Some(square()))],
        );
        let single = area(&square());
        let parsed = derive_operation(op, "#0");
        assert_eq!(parsed.zone_count, 2);
        assert!((parsed.computed_area - 2.0 * single).abs() < 1e-3);
    }

    #[test]
    fn colors_follow_upload_order() {
        let ops = (0..OPERATION_PALETTE.len() + 1)
            .map(|i| operation(&format!("OP-{i}"), vec![], vec![]))
            .collect();
        let parsed = derive_operations(ops);
        assert_eq!(parsed[0].color, OPERATION_PALETTE[0]);
        assert_eq!(parsed[1].color, OPERATION_PALETTE[1]);
        assert_eq!(parsed[OPERATION_PALETTE.len()].color, OPERATION_PALETTE[0]);
    }

    #[test]
    fn overall_time_range_over_operations() {
        assert_eq!(overall_time_range(&[]), None);

        let first = derive_operation(operation("A", vec![volume(Some(2), Some(4), None)], vec![]), "#0");
        let second = derive_operation(operation("B", vec![volume(Some(1), Some(3), None)], vec![]), "#1");
        assert_eq!(
            overall_time_range(&[first, second]),
            Some(TimeRange::new(at(1), at(4)))
        );
    }

    #[test]
    fn status_buckets() {
        let start = at(2);
        let end = at(4);
        assert_eq!(operation_status(start, end, at(1)), OperationStatus::Pending);
        assert_eq!(operation_status(start, end, at(3)), OperationStatus::Active);
        assert_eq!(operation_status(start, end, end), OperationStatus::Active);
        assert_eq!(
            operation_status(start, end, end + Duration::seconds(1)),
            OperationStatus::Expired
        );
    }

    #[test]
    fn aor_area_and_color() {
        let aor = AreaOfResponsibility {
            id: "AOR-1".to_string(),
            name: "Harbor".to_string(),
            designator: "HBR".to_string(),
            geometry: square(),
            lower_limit: 0.0,
            upper_limit: 400.0,
            vertical_limits_uom: None,
            vertical_reference_type: None,
            auto_reject: None,
            auto_approval_enabled: None,
            aor_enabled: None,
            auto_take_off_clearance_enabled: None,
            max_simultaneous_operations_enabled: None,
            max_simultaneous_operations: None,
            feature_type: None,
            extended_geometry: None,
        };
        let parsed = derive_aor(aor);
        assert_eq!(parsed.color, AOR_COLOR);
        assert!((parsed.computed_area - area(&square())).abs() < 1e-6);
    }
}
