//! Input validation for registration and ticket fields.

use std::fmt;

use crate::models::GeoPoint;

/// Validation error types.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Invalid phone number.
    InvalidPhone(String),
    /// Coordinates outside the valid latitude/longitude range.
    InvalidCoordinates { latitude: f64, longitude: f64 },
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::InvalidPhone(msg) => write!(f, "Invalid phone: {}", msg),
            ValidationError::InvalidCoordinates {
                latitude,
                longitude,
            } => write!(f, "Invalid coordinates: ({}, {})", latitude, longitude),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length for a normalized phone number (E.164 allows 15 digits plus '+').
pub const MAX_PHONE_LENGTH: usize = 16;

/// Minimum number of digits in a phone number.
pub const MIN_PHONE_DIGITS: usize = 5;

/// Maximum allowed length for short text fields (names, devices, dates).
pub const MAX_FIELD_LENGTH: usize = 200;

/// Maximum allowed length for issue descriptions.
pub const MAX_ISSUE_LENGTH: usize = 4000;

/// Validate an email address (basic RFC 5322 format check).
///
/// This is a basic validation that checks:
/// - Contains exactly one @
/// - Has at least one character before @
/// - Has at least one character after @
/// - Has at least one dot after @
/// - Is not too long
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    }

    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if domain.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing domain (after @)".to_string(),
        ));
    }

    if !domain.contains('.') {
        return Err(ValidationError::InvalidEmail(
            "domain must contain at least one dot".to_string(),
        ));
    }

    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::InvalidEmail(
            "domain cannot start or end with a dot".to_string(),
        ));
    }

    if domain.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "domain cannot contain consecutive dots".to_string(),
        ));
    }

    Ok(())
}

/// Normalize a phone number into its lookup key.
///
/// Strips whitespace and the usual separators (`-`, `.`, `(`, `)`), keeping a
/// single leading `+`. The result is what gets stored and compared.
pub fn normalize_phone(phone: &str) -> Result<String, ValidationError> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Empty("phone".to_string()));
    }

    let mut normalized = String::with_capacity(phone.len());
    for (i, c) in phone.chars().enumerate() {
        match c {
            '+' if i == 0 => normalized.push(c),
            '0'..='9' => normalized.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            other => {
                return Err(ValidationError::InvalidPhone(format!(
                    "unexpected character '{}'",
                    other
                )))
            }
        }
    }

    let digits = normalized.trim_start_matches('+').len();
    if digits < MIN_PHONE_DIGITS {
        return Err(ValidationError::InvalidPhone(format!(
            "must contain at least {} digits",
            MIN_PHONE_DIGITS
        )));
    }

    if normalized.len() > MAX_PHONE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: MAX_PHONE_LENGTH,
            actual: normalized.len(),
        });
    }

    Ok(normalized)
}

/// Validate a required text field, returning the trimmed value.
pub fn validate_required<'a>(
    field: &str,
    value: &'a str,
    max: usize,
) -> Result<&'a str, ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    validate_max_length(field, value, max)?;
    Ok(value)
}

/// Validate an optional text field's length.
pub fn validate_max_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual: len,
        });
    }
    Ok(())
}

/// Validate that a point lies within latitude [-90, 90] and longitude [-180, 180].
pub fn validate_coordinates(point: GeoPoint) -> Result<(), ValidationError> {
    let GeoPoint {
        latitude,
        longitude,
    } = point;

    let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
    let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);

    if lat_ok && lon_ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidCoordinates {
            latitude,
            longitude,
        })
    }
}
