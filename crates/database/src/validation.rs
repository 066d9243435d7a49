//! Input validation shared by the persistence and service layers.

use std::fmt;

use uuid::Uuid;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was not supplied.
    Required(&'static str),
    /// A value is not one of the accepted values for a field.
    InvalidValue { field: &'static str, value: String },
    /// A value is not a syntactically valid identifier.
    InvalidId { field: &'static str, value: String },
    /// A timestamp or date could not be parsed.
    InvalidDate { field: &'static str, value: String },
    /// A number is below its minimum.
    TooSmall { field: &'static str, min: i64, actual: i64 },
    /// Value too long.
    TooLong { field: &'static str, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(&'static str),
    /// The request body could not be understood.
    Malformed(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Required(field) => write!(f, "{} is required", field),
            ValidationError::InvalidValue { field, value } => {
                write!(f, "Invalid {}: {}", field, value)
            }
            ValidationError::InvalidId { field, value } => {
                write!(f, "{} must be a valid UUID, got '{}'", field, value)
            }
            ValidationError::InvalidDate { field, value } => {
                write!(f, "{} must be an ISO 8601 date, got '{}'", field, value)
            }
            ValidationError::TooSmall { field, min, actual } => {
                write!(f, "{} must be at least {} (got {})", field, min, actual)
            }
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::Malformed(msg) => write!(f, "Malformed request: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum length of short text columns (caller names, call ids, summaries).
pub const MAX_TEXT_LENGTH: usize = 255;

/// Validate that a path or body identifier is a UUID.
pub fn validate_id(field: &'static str, value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value.trim())
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidId {
            field,
            value: value.to_string(),
        })
}

/// Require a present, non-blank text value no longer than [`MAX_TEXT_LENGTH`].
pub fn require_text<'a>(
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, ValidationError> {
    let value = value.ok_or(ValidationError::Required(field))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    validate_length(field, trimmed)?;
    Ok(trimmed)
}

/// Validate a text value against [`MAX_TEXT_LENGTH`].
pub fn validate_length(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_TEXT_LENGTH,
            actual,
        });
    }
    Ok(())
}
