//! Error types for parameter normalization.

use thiserror::Error;

/// Result type for parameter parsing.
pub type ParamResult<T> = Result<T, ParamError>;

/// Reasons a raw request parameter was rejected.
///
/// These never reach callers of the compiler: the normalizer logs them and
/// substitutes the documented default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// Value is not an integer.
    #[error("{key}: not a number: {value:?}")]
    NotANumber {
        /// Parameter name.
        key: &'static str,
        /// Raw value as received.
        value: String,
    },

    /// Value parsed but is zero or negative.
    #[error("{key}: must be positive, got {value}")]
    NotPositive {
        /// Parameter name.
        key: &'static str,
        /// Parsed value.
        value: i64,
    },

    /// Value is larger than the target integer type can hold.
    #[error("{key}: out of range: {value:?}")]
    OutOfRange {
        /// Parameter name.
        key: &'static str,
        /// Raw value as received.
        value: String,
    },
}

impl ParamError {
    /// Name of the parameter that failed to parse.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::NotANumber { key, .. }
            | Self::NotPositive { key, .. }
            | Self::OutOfRange { key, .. } => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_key() {
        let err = ParamError::NotANumber {
            key: "width",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "width: not a number: \"abc\"");
        assert_eq!(err.key(), "width");

        let err = ParamError::NotPositive {
            key: "pause",
            value: -5,
        };
        assert!(err.to_string().contains("must be positive"));
        assert_eq!(err.key(), "pause");
    }
}
