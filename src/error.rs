//! Errors raised while composing, compiling or running a pattern.

use thiserror::Error;

/// Everything that can go wrong when building or using a [`Pattern`](crate::Pattern).
///
/// The first four variants are *range* errors: a bad argument handed to an
/// escape producer or quantifier. [`BuildError::Usage`] is an operation
/// invoked from a chain state that does not offer it. The last two come from
/// the regex engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Invalid character code: {0}")]
    CharCode(String),
    #[error("Invalid control code: {0:?}")]
    ControlCode(char),
    #[error("Incorrect character range endpoint: {0:?}")]
    RangeEndpoint(String),
    #[error("Invalid quantifier bounds: {0}")]
    Bounds(String),
    #[error("'{op}' is not available {state}")]
    Usage { op: String, state: &'static str },
    #[error("Failed to compile /{pattern}/: {message}")]
    Compile { pattern: String, message: String },
    #[error("Matching failed: {0}")]
    Match(String),
}

impl BuildError {
    /// True for errors caused by a malformed numeric or character argument.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            Self::CharCode(_) | Self::ControlCode(_) | Self::RangeEndpoint(_) | Self::Bounds(_)
        )
    }

    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::Usage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_errors_are_classified() {
        assert!(BuildError::CharCode("256".into()).is_range_error());
        assert!(BuildError::ControlCode('1').is_range_error());
        assert!(BuildError::Bounds("both bounds omitted".into()).is_range_error());
        assert!(!BuildError::Match("backtrack limit".into()).is_range_error());
    }

    #[test]
    fn usage_message_names_the_state() {
        let err = BuildError::Usage {
            op: "oneOrMore".into(),
            state: "after a quantifier",
        };
        assert!(err.is_usage_error());
        assert_eq!(err.to_string(), "'oneOrMore' is not available after a quantifier");
    }
}
