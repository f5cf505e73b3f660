//! Error type shared by the geometry, keypoint and resize primitives.
//!
//! Pipeline-level code (augmenters, background workers) works with
//! `anyhow::Result` and converts these errors with `?`; callers that need the
//! category can recover it with `err.downcast_ref::<AugmentError>()`.

/// Failure categories raised by the augmentation primitives.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AugmentError {
    /// Malformed input: non-integer coordinates, bad shapes, wrong element type.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not defined for the current state of the value.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// A configuration value outside the recognized set (e.g. interpolation).
    #[error("unsupported option: {0}")]
    UnsupportedOption(String),
}

impl AugmentError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionViolation(msg.into())
    }
}

/// Result alias for the primitive operations.
pub type AugResult<T> = std::result::Result<T, AugmentError>;
