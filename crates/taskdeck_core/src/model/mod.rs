//! Domain entities and field-level constraints.

pub mod category;
pub mod subtask;
pub mod task;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-constraint violation shared by all entity `validate()` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace-only.
    EmptyField(&'static str),
    /// A text field exceeds its maximum character count.
    TooLong { field: &'static str, max: usize },
    /// Color must be a `#rrggbb`-style hex string.
    InvalidColor(String),
    /// `completed_at` presence disagrees with completion state.
    CompletionMismatch,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::TooLong { field, max } => {
                write!(f, "{field} exceeds maximum length of {max} characters")
            }
            Self::InvalidColor(value) => write!(f, "invalid hex color `{value}`"),
            Self::CompletionMismatch => {
                write!(f, "completed_at must be set exactly when completed")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
