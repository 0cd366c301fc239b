//! Validation error types

use std::fmt;

/// Validation error for card input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Quantity below zero
    Negative { field: &'static str, value: i64 },

    /// Quantity does not fit the stored integer column
    OutOfRange { field: &'static str, max: i64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::Negative { field, value } => {
                write!(f, "{} cannot be negative (got {})", field, value)
            }
            Self::OutOfRange { field, max } => {
                write!(f, "{} exceeds maximum of {}", field, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "card name",
            max: 255,
        };
        assert_eq!(
            err.to_string(),
            "card name exceeds maximum length of 255 characters"
        );

        let err = ValidationError::Negative {
            field: "quantity",
            value: -2,
        };
        assert_eq!(err.to_string(), "quantity cannot be negative (got -2)");
    }
}
