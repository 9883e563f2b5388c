use std::io;

use thiserror::Error;

/// Result type alias for model construction and sph parsing.
pub type Result<T> = std::result::Result<T, SphError>;

/// Every failure is fatal: malformed tomography files are never coerced.
#[derive(Debug, Error)]
pub enum SphError {
    /// Construction had no way to determine the coefficient array shape,
    /// or was handed an invalid knot table.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The file header disagrees with the model's knot table or degree.
    #[error("shape mismatch: {what} (model expects {expected}, header gives {found})")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Malformed header or body content.
    #[error("format error on line {line}: {message}")]
    Format { line: usize, message: String },

    /// The stream ended before every coefficient group was filled.
    #[error("truncated sph data: {message}")]
    Truncated { message: String },

    /// The coefficient array for the requested shape could not be allocated.
    #[error("allocation failed: cannot hold {knots} knots up to degree {degree}")]
    AllocationFailed { knots: usize, degree: usize },

    /// I/O error from the underlying reader.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SphError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        SphError::Configuration(message.into())
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        SphError::Format {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn truncated(message: impl Into<String>) -> Self {
        SphError::Truncated {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failed_invariant() {
        let err = SphError::ShapeMismatch {
            what: "wrong number of active knots in header",
            expected: 21,
            found: 20,
        };
        let text = err.to_string();
        assert!(text.contains("active knots"));
        assert!(text.contains("21"));
        assert!(text.contains("20"));

        let err = SphError::format(7, "too much data on a coefficient line");
        assert_eq!(
            err.to_string(),
            "format error on line 7: too much data on a coefficient line"
        );
    }
}
