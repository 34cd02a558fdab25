use uuid::Uuid;

use crate::error::AppError;

/// Check that `raw` is a structurally valid entity id and parse it.
///
/// Accepts the hyphenated (36 chars) and simple (32 hex chars) UUID forms.
/// Existence is not checked.
pub fn parse_id(raw: &str, label: &str) -> Result<Uuid, AppError> {
    let raw = raw.trim();
    let invalid = || AppError::Validation(format!("Invalid {label} ID format"));

    if raw.len() != 36 && raw.len() != 32 {
        return Err(invalid());
    }
    Uuid::try_parse(raw).map_err(|_| invalid())
}
