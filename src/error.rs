//! Error kinds shared by every stage of the separation pipeline.

use thiserror::Error;

/// Errors surfaced by the transform, separation and alignment stages.
///
/// None of these are recovered internally: a failure in any stage aborts the
/// whole invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BssError {
    /// A configuration value is outside its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The external separator failed or returned an unusable result.
    #[error("separation failed at bin {bin}: {reason}")]
    SeparationFailure { bin: usize, reason: String },

    /// A buffer or tensor does not have the shape its consumer expects.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: String,
        actual: String,
    },
}

impl BssError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        BssError::InvalidConfiguration(message.into())
    }

    pub(crate) fn mismatch(
        context: &'static str,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        BssError::DimensionMismatch {
            context,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BssError>;
