//! Input checks for raw policy JSON and statement IDs

use crate::error::{PolicyDocumentError, PolicyDocumentResult};
use regex::Regex;
use std::sync::OnceLock;

const MAX_STATEMENT_ID_LENGTH: usize = 100;

static STATEMENT_ID_REGEX: OnceLock<Regex> = OnceLock::new();

fn statement_id_regex() -> &'static Regex {
    STATEMENT_ID_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid statement ID regex"))
}

/// Check that `value`, supplied for `field`, is a JSON object.
pub fn validate_policy_json(field: &str, value: &str) -> PolicyDocumentResult<()> {
    if !value.starts_with('{') {
        return Err(PolicyDocumentError::invalid_policy_json(
            field,
            "contains an invalid JSON policy",
        ));
    }

    serde_json::from_str::<serde_json::Value>(value).map_err(|e| {
        PolicyDocumentError::invalid_policy_json(field, format!("contains an invalid JSON: {e}"))
    })?;
    Ok(())
}

pub fn validate_statement_id(sid: &str) -> PolicyDocumentResult<()> {
    if sid.len() > MAX_STATEMENT_ID_LENGTH {
        return Err(PolicyDocumentError::InvalidStatementId {
            sid: sid.to_string(),
            reason: format!("must be at most {MAX_STATEMENT_ID_LENGTH} characters"),
        });
    }
    if !statement_id_regex().is_match(sid) {
        return Err(PolicyDocumentError::InvalidStatementId {
            sid: sid.to_string(),
            reason: "must contain only alphanumeric characters, hyphens and underscores"
                .to_string(),
        });
    }
    Ok(())
}
