//! Error types for the Tsetlin Machine engine.

use thiserror::Error;

/// # Overview
///
/// Errors that can occur when configuring, training, querying or exchanging
/// a Tsetlin Machine.
///
/// Configuration problems, bad training data and lifecycle misuse (querying
/// an unfitted estimator) are separate variant families so callers can tell
/// them apart, see [`Error::is_not_fitted`] and [`Error::is_invalid_input`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A hyperparameter violated its rule.
    #[error("invalid parameter `{key}`: must be {constraint}, got {got}")]
    InvalidParameter {
        key:        &'static str,
        constraint: &'static str,
        got:        String
    },

    /// Hyperparameter JSON was malformed, not an object, had an unknown key
    /// or a value of the wrong type.
    #[error("invalid hyperparameter json: {0}")]
    InvalidJson(String),

    #[error("dataset cannot be empty")]
    EmptyDataset,

    #[error("x has {samples} samples but y has {labels} labels")]
    LengthMismatch { samples: usize, labels: usize },

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("feature [{row}, {col}] is {value}, expected 0 or 1")]
    NonBinaryFeature { row: usize, col: usize, value: u8 },

    /// Fewer than two distinct labels in the training targets.
    #[error("at least 2 classes are required, but the data contains {found}")]
    InsufficientClasses { found: usize },

    /// Label not present in the class set seen at fit time.
    #[error("label {0} was not seen during fit")]
    UnknownLabel(i64),

    #[error("n_iter must be > 0")]
    InvalidIterations,

    /// Predict-family operation called before `fit`.
    #[error("estimator is not fitted yet, call fit first")]
    NotFitted,

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    /// Model blob does not start with the expected magic bytes.
    #[error("not a tsetlin model blob")]
    BadMagic,

    /// Model blob could not be decoded or is internally inconsistent.
    #[error("corrupt model blob: {0}")]
    Corrupt(String)
}

impl Error {
    /// Returns `true` for [`Error::NotFitted`].
    #[must_use]
    pub fn is_not_fitted(&self) -> bool {
        matches!(self, Self::NotFitted)
    }

    /// Returns `true` for configuration and training-data errors.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. }
                | Self::InvalidJson(_)
                | Self::EmptyDataset
                | Self::LengthMismatch { .. }
                | Self::DimensionMismatch { .. }
                | Self::NonBinaryFeature { .. }
                | Self::InsufficientClasses { .. }
                | Self::UnknownLabel(_)
                | Self::InvalidIterations
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err.to_string())
    }
}

impl From<postcard::Error> for Error {
    fn from(err: postcard::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}

/// # Overview
///
/// Result type for Tsetlin Machine operations.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_fitted_is_not_invalid_input() {
        assert!(Error::NotFitted.is_not_fitted());
        assert!(!Error::NotFitted.is_invalid_input());
    }

    #[test]
    fn data_errors_are_invalid_input() {
        assert!(Error::InsufficientClasses { found: 1 }.is_invalid_input());
        assert!(Error::EmptyDataset.is_invalid_input());
        assert!(!Error::BadMagic.is_invalid_input());
    }

    #[test]
    fn display_carries_context() {
        let err = Error::InvalidParameter {
            key:        "threshold",
            constraint: "an integer > 0",
            got:        "0".to_string()
        };
        assert_eq!(
            err.to_string(),
            "invalid parameter `threshold`: must be an integer > 0, got 0"
        );
    }
}
