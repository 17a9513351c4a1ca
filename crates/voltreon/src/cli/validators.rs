//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::domain::MAX_TITLE_LENGTH;

/// Validate a single-line title or name.
///
/// Must be non-empty, at most [`MAX_TITLE_LENGTH`] characters, and free of
/// newlines and control characters.
pub fn validate_title(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Title cannot be empty".to_string());
    }

    let len = s.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title cannot exceed {} characters, got {} characters",
            MAX_TITLE_LENGTH, len
        ));
    }

    if s.contains('\n') || s.contains('\r') {
        return Err("Title cannot contain newline characters".to_string());
    }

    // Control characters excluding tab
    if let Some(pos) = s.chars().position(|c| {
        let code = c as u32;
        (code < 0x20 && code != 0x09) || (0x7F..=0x9F).contains(&code)
    }) {
        return Err(format!(
            "Title contains invalid control character at position {}",
            pos
        ));
    }

    Ok(s.to_string())
}

/// Validate a multi-line text field (description, ADR sections).
///
/// Allows newlines but rejects other control characters.
pub fn validate_text(s: &str) -> Result<String, String> {
    if let Some(pos) = s.chars().position(|c| {
        let code = c as u32;
        (code < 0x20 && code != 0x09 && code != 0x0A && code != 0x0D)
            || (0x7F..=0x9F).contains(&code)
    }) {
        return Err(format!(
            "Text contains invalid control character at position {}",
            pos
        ));
    }

    Ok(s.to_string())
}

/// Validate an email address (must contain `@`).
pub fn validate_email(s: &str) -> Result<String, String> {
    let s = s.trim();
    match s.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(s.to_string()),
        _ => Err(format!("Invalid email address: '{}'", s)),
    }
}

/// Validate a username (non-empty, no whitespace).
pub fn validate_username(s: &str) -> Result<String, String> {
    let s = s.trim_start_matches('@');
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return Err(format!(
            "Username must be non-empty and contain no whitespace: '{}'",
            s
        ));
    }
    Ok(s.to_string())
}
