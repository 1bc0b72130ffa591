//! Optional profile fields
//!
//! Names and the profile image reference are free text with length caps.
//! Blank input means "not provided".

use kernel::error::app_error::{AppError, AppResult};

/// Maximum length of a first or last name
pub const PERSON_NAME_MAX_LENGTH: usize = 100;

/// Maximum length of a profile image reference
pub const IMAGE_REF_MAX_LENGTH: usize = 2048;

fn optional_text(
    field: &'static str,
    input: Option<String>,
    max: usize,
) -> AppResult<Option<String>> {
    let Some(value) = input else {
        return Ok(None);
    };

    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > max {
        return Err(AppError::bad_request(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(AppError::bad_request(format!(
            "{} contains invalid characters",
            field
        )));
    }

    Ok(Some(value.to_string()))
}

pub fn person_name(field: &'static str, input: Option<String>) -> AppResult<Option<String>> {
    optional_text(field, input, PERSON_NAME_MAX_LENGTH)
}

pub fn image_ref(input: Option<String>) -> AppResult<Option<String>> {
    optional_text("Profile image", input, IMAGE_REF_MAX_LENGTH)
}
