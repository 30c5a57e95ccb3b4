//! Officer roster field constraints and validation.

use crate::error::CoreError;

/// Maximum length of a badge number.
pub const MAX_BADGE_NUMBER_LEN: usize = 32;

/// Maximum length of an officer's full name.
pub const MAX_FULL_NAME_LEN: usize = 200;

/// Maximum length of a shift location label.
pub const MAX_LOCATION_LEN: usize = 200;

/// Validate a badge number: 1..=32 ASCII alphanumerics or `-`.
pub fn validate_badge_number(badge: &str) -> Result<(), CoreError> {
    if badge.is_empty() {
        return Err(CoreError::Validation(
            "badge_number must not be empty".to_string(),
        ));
    }
    if badge.len() > MAX_BADGE_NUMBER_LEN {
        return Err(CoreError::Validation(format!(
            "badge_number must be at most {MAX_BADGE_NUMBER_LEN} characters, got {}",
            badge.len()
        )));
    }
    if let Some(c) = badge
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
    {
        return Err(CoreError::Validation(format!(
            "badge_number contains invalid character '{c}'"
        )));
    }
    Ok(())
}

/// Validate an officer's full name: non-blank and bounded.
pub fn validate_full_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "full_name must not be blank".to_string(),
        ));
    }
    let len = name.chars().count();
    if len > MAX_FULL_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "full_name must be at most {MAX_FULL_NAME_LEN} characters, got {len}"
        )));
    }
    Ok(())
}

/// Validate an optional shift location label.
pub fn validate_location(location: Option<&str>) -> Result<(), CoreError> {
    let Some(location) = location else {
        return Ok(());
    };
    let len = location.chars().count();
    if len > MAX_LOCATION_LEN {
        return Err(CoreError::Validation(format!(
            "location must be at most {MAX_LOCATION_LEN} characters, got {len}"
        )));
    }
    Ok(())
}
