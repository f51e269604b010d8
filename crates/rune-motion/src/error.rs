//! Error types for strict parsing.
//!
//! The animation surface itself never fails: malformed input degrades to a
//! default. These errors are only returned by the strict entry points (for
//! example [`EasingFunction::parse`](crate::easing::EasingFunction::parse)),
//! which hosts can use to surface diagnostics.

use thiserror::Error;

/// Result type for strict motion parsing.
pub type Result<T> = std::result::Result<T, MotionError>;

/// Errors reported by the strict parsers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// The easing name is not in the preset catalog.
    #[error("unknown easing `{0}`")]
    UnknownEasing(String),

    /// A parametrized easing could not be parsed.
    #[error("malformed easing descriptor `{descriptor}`: {reason}")]
    MalformedEasing {
        /// The descriptor as supplied.
        descriptor: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A parameter was syntactically valid but out of range.
    #[error("invalid {name} parameter: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}
