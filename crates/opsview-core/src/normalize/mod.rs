//! Schema normalization for uploaded documents.

pub mod aor;
pub mod operations;

pub use aor::parse_areas_of_responsibility;
pub use operations::parse_operations;

use std::collections::HashSet;

use serde_json::Value;

use crate::error::ParseError;
use crate::models::{AreaOfResponsibility, Operation};

/// Ids key selection and activation, so an upload may not repeat one.
pub(crate) fn reject_duplicate_ids<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    field: &str,
) -> Result<(), ParseError> {
    let mut seen = HashSet::new();
    for (index, id) in ids.into_iter().enumerate() {
        if !seen.insert(id) {
            return Err(ParseError::validation(
                index,
                format!("duplicate {} `{}`", field, id),
            ));
        }
    }
    Ok(())
}

/// Parse operations straight from uploaded JSON text.
pub fn parse_operations_str(text: &str) -> Result<Vec<Operation>, ParseError> {
    let raw: Value = serde_json::from_str(text)?;
    parse_operations(&raw)
}

/// Parse areas of responsibility straight from uploaded JSON text.
pub fn parse_areas_of_responsibility_str(
    text: &str,
) -> Result<Vec<AreaOfResponsibility>, ParseError> {
    let raw: Value = serde_json::from_str(text)?;
    parse_areas_of_responsibility(&raw)
}
