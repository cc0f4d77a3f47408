//! Error types for crossfoot.
//!
//! All errors are strongly typed using thiserror. Business outcomes of the
//! calculation engine (inconsistent totals, duplicate facts, undefined
//! intervals) are ordinary results, never errors; the types here cover
//! report loading and value validation only.

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation errors raised while loading or constructing report values.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid interval: lower bound {lower} exceeds upper bound {upper}")]
    InvalidInterval {
        lower: Decimal,
        upper: Decimal,
    },

    #[error("Invalid period '{value}'")]
    InvalidPeriod {
        value: String,
    },

    #[error("Unknown namespace prefix '{prefix}' in '{name}'")]
    UnknownPrefix {
        prefix: String,
        name: String,
    },

    #[error("'{name}' is not a prefixed name")]
    MissingPrefixSeparator {
        name: String,
    },
}

/// Top-level error type for crossfoot.
#[derive(Debug, Error)]
pub enum CrossfootError {
    #[error("Report data error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CrossfootError {
    /// Returns true if this error came from JSON parsing.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for crossfoot operations.
pub type CrossfootResult<T> = Result<T, CrossfootError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_invalid_interval() {
        let err = ValidationError::InvalidInterval {
            lower: Decimal::from(10),
            upper: Decimal::from(5),
        };
        let msg = format!("{err}");
        assert!(msg.contains("10"));
        assert!(msg.contains("5"));
        assert!(msg.contains("Invalid interval"));
    }

    #[test]
    fn test_validation_error_invalid_period() {
        let err = ValidationError::InvalidPeriod {
            value: "not-a-date".to_string(),
        };
        assert!(format!("{err}").contains("not-a-date"));
    }

    #[test]
    fn test_validation_error_unknown_prefix() {
        let err = ValidationError::UnknownPrefix {
            prefix: "xx".to_string(),
            name: "xx:Concept".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("'xx'"));
        assert!(msg.contains("xx:Concept"));
    }

    #[test]
    fn test_validation_error_missing_separator() {
        let err = ValidationError::MissingPrefixSeparator {
            name: "Concept".to_string(),
        };
        assert!(format!("{err}").contains("Concept"));
    }

    #[test]
    fn test_crossfoot_error_from_validation() {
        let err: CrossfootError = ValidationError::MissingPrefixSeparator {
            name: "x".to_string(),
        }
        .into();
        assert!(err.is_validation());
        assert!(!err.is_json());
    }

    #[test]
    fn test_crossfoot_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CrossfootError = json_err.into();
        assert!(err.is_json());
        assert!(!err.is_validation());
        assert!(format!("{err}").contains("Report data error"));
    }
}
