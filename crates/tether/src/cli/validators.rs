//! CLI input validation functions.
//!
//! Used as clap `value_parser`s so bad input is rejected at parse time.

/// Maximum title length accepted by `issue add`
pub const MAX_TITLE_LENGTH: usize = 200;

/// Validate an edge id prefix for `init`.
pub fn validate_prefix(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    crate::config::validate_prefix(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate an issue, project or edge reference: non-empty, no whitespace.
pub fn validate_reference(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }

    if s.chars().any(char::is_whitespace) {
        return Err(format!("Identifier '{s}' cannot contain whitespace"));
    }

    Ok(s.to_string())
}

/// Validate an issue title: non-empty and at most [`MAX_TITLE_LENGTH`] characters.
pub fn validate_title(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Title cannot be empty".to_string());
    }

    let length = s.chars().count();
    if length > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title cannot exceed {MAX_TITLE_LENGTH} characters (got {length})"
        ));
    }

    Ok(s.to_string())
}

/// Validate an estimate: a finite, non-negative number.
pub fn validate_estimate(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Estimate '{s}' is not a number"))?;

    if !value.is_finite() || value < 0.0 {
        return Err(format!("Estimate must be a non-negative number (got {s})"));
    }

    Ok(value)
}
