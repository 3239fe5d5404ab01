pub mod config;
pub mod derive;
pub mod error;
pub mod export;
pub mod fields;
pub mod format;
pub mod geometry;
pub mod models;
pub mod normalize;
pub mod projector;
pub mod session;
pub mod style;

pub use derive::{
    derive_aor, derive_aors, derive_operation, derive_operations, operation_status,
    overall_time_range, volume_time_range,
};
pub use error::{ExportError, ParseError};
pub use export::{
    aor_records, operation_records, to_json_export, write_csv, write_json, AorRecord,
    JsonExport, OperationRecord,
};
pub use format::{format_area, format_date_time, format_date_time_short};
pub use geometry::{area, bounding_box, Bounds};
pub use models::{
    Altitude, AreaOfResponsibility, Contact, Geometry, Operation, OperationStatus, ParsedAor,
    ParsedOperation, TimeRange, Volume,
};
pub use normalize::{
    parse_areas_of_responsibility, parse_areas_of_responsibility_str, parse_operations,
    parse_operations_str,
};
pub use projector::{aors_to_features, combined_features, operations_to_features};
pub use session::{Layer, MapEvent, MapView, Session};
pub use style::{zone_paint, ZonePaint};
