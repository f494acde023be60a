//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

fn is_disallowed_control(c: char, allow_newlines: bool) -> bool {
    let code = u32::from(c);
    if c == '\t' || (allow_newlines && (c == '\n' || c == '\r')) {
        return false;
    }
    code < 0x20 || (0x7F..=0x9F).contains(&code)
}

/// Validate a full or partial ticket ID.
///
/// IDs name files in the tickets directory, so path separators are
/// rejected here as well as by the resolver.
pub fn validate_ticket_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Ticket ID cannot be empty".to_string());
    }

    if s.contains(['/', '\\']) {
        return Err(format!("Invalid ticket ID '{s}': must not contain path separators"));
    }

    if s.chars().any(char::is_whitespace) {
        return Err(format!("Invalid ticket ID '{s}': must not contain whitespace"));
    }

    if s.chars().any(|c| is_disallowed_control(c, false)) {
        return Err(format!("Invalid ticket ID '{s}': contains control characters"));
    }

    Ok(s.to_string())
}

/// Validate one word of a title. Titles are single-line.
pub fn validate_title(s: &str) -> Result<String, String> {
    if s.contains(['\n', '\r']) {
        return Err("Title cannot contain newline characters".to_string());
    }

    if let Some(pos) = s.chars().position(|c| is_disallowed_control(c, false)) {
        return Err(format!(
            "Title contains invalid control character at position {pos}"
        ));
    }

    Ok(s.to_string())
}

/// Validate a single-line header value such as an assignee.
pub fn validate_field_value(s: &str) -> Result<String, String> {
    if s.contains(['\n', '\r']) {
        return Err("Value cannot contain newline characters".to_string());
    }

    if let Some(pos) = s.chars().position(|c| is_disallowed_control(c, false)) {
        return Err(format!(
            "Value contains invalid control character at position {pos}"
        ));
    }

    Ok(s.to_string())
}

/// Validate free text such as a description. Newlines are allowed.
pub fn validate_text(s: &str) -> Result<String, String> {
    if let Some(pos) = s.chars().position(|c| is_disallowed_control(c, true)) {
        return Err(format!(
            "Text contains invalid control character at position {pos}"
        ));
    }
    Ok(s.to_string())
}
