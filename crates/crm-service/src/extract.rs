//! Pulling an entity id out of free text.

use std::sync::OnceLock;

use crm_core::{EntityId, ValidationError};
use regex::Regex;

// ASCII only: other Unicode digits are not ids.
const INTEGER_PATTERN: &str = r"(?-u:\b)([0-9]+)(?-u:\b)";

static INTEGER_REGEX: OnceLock<Regex> = OnceLock::new();

/// The first standalone integer in `text`.
///
/// Digits glued to letters (`abc123`) do not count.
pub fn first_id(text: &str) -> Result<EntityId, ValidationError> {
    let token = INTEGER_REGEX
        .get_or_init(|| Regex::new(INTEGER_PATTERN).expect("integer pattern is valid"))
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or(ValidationError::NoIdentifier)?;

    EntityId::parse("query", token.as_str())
}
