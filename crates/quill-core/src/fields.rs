//! Field validation shared by note and todo payloads

use crate::error::{CoreError, CoreResult};

pub const TITLE_MAX_CHARS: usize = 200;
pub const CONTENT_MAX_BYTES: usize = 100 * 1024;

/// Trim a title and enforce 1..=200 chars. Whitespace-only input is a
/// validation failure, not an empty title.
pub fn normalize_title(field: &'static str, raw: &str) -> CoreResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation {
            field,
            reason: "may not be blank".into(),
        });
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(CoreError::Validation {
            field,
            reason: format!("must be at most {TITLE_MAX_CHARS} characters"),
        });
    }
    Ok(trimmed.to_string())
}

/// Free-text bodies are stored byte-for-byte, bounded at 100KB.
pub fn check_body(field: &'static str, value: &str) -> CoreResult<()> {
    if value.len() > CONTENT_MAX_BYTES {
        return Err(CoreError::Validation {
            field,
            reason: format!("must be at most {CONTENT_MAX_BYTES} bytes"),
        });
    }
    Ok(())
}
