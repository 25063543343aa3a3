// ============================
// crates/backend-lib/src/validation.rs
// ============================
//! Input validation for auth and todo payloads.

use crate::config::PasswordRequirements;
use crate::error::AppError;
use regex::Regex;
use std::sync::LazyLock;

// Common validation constants
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_TITLE_LENGTH: usize = 255;
const MAX_DESCRIPTION_LENGTH: usize = 4096;
pub const MAX_PRIORITY: u8 = 3;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Validate an email address.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return Err(AppError::Validation("invalid email address".to_string()));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::Validation("invalid email address".to_string()));
    }
    Ok(())
}

/// Validate a registration password against the configured policy.
pub fn validate_password(password: &str, req: &PasswordRequirements) -> Result<(), AppError> {
    if password.len() < req.min_length {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            req.min_length
        )));
    }
    if password.len() > req.max_length {
        return Err(AppError::Validation(format!(
            "password must be at most {} characters",
            req.max_length
        )));
    }
    Ok(())
}

/// Validate a todo title.
pub fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(AppError::Validation(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional todo description.
pub fn validate_description(description: Option<&str>) -> Result<(), AppError> {
    if let Some(desc) = description {
        if desc.len() > MAX_DESCRIPTION_LENGTH {
            return Err(AppError::Validation(format!(
                "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Validate a todo priority. Priorities run 0 (none) through 3 (high).
pub fn validate_priority(priority: u8) -> Result<(), AppError> {
    if priority > MAX_PRIORITY {
        return Err(AppError::Validation(format!(
            "priority must be in 0..={MAX_PRIORITY}"
        )));
    }
    Ok(())
}
