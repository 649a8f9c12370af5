use ammonia;

use crate::error::AppError;

/// Clean user-supplied text that teachers and students see rendered as HTML.
///
/// Whitelist-based: safe inline tags (<b>, <p>) survive, <script>/<iframe> and
/// event-handler attributes are stripped. Surrounding whitespace is trimmed.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input.trim())
}

/// Trims a required plain-text field such as a profile name.
/// Whitespace-only input is rejected.
pub fn required_trimmed<'a>(input: &'a str, field: &str) -> Result<&'a str, AppError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be blank", field)));
    }
    Ok(trimmed)
}

/// Sanitizes a required field that is rendered as HTML.
/// Input that sanitizes to nothing is rejected.
pub fn clean_required(input: &str, field: &str) -> Result<String, AppError> {
    let cleaned = clean_html(input);
    if cleaned.trim().is_empty() {
        return Err(AppError::BadRequest(format!(
            "{} is empty after sanitization",
            field
        )));
    }
    Ok(cleaned)
}
