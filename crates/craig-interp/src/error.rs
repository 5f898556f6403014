//! Error types for the interpolation layer

use crate::context::ContextId;
use crate::verify::VerificationFailure;
use craig_core::{ForestError, ParseError, ProverError, SortError};
use thiserror::Error;

/// Interpolation layer errors
#[derive(Debug, Error)]
pub enum InterpError {
    /// Shape errors, malformed forests, non-Boolean formulas, misplaced
    /// markers. Always detected before the prover is called.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("context mismatch: expected a value of context {expected}, got one of {found}")]
    ContextMismatch {
        expected: ContextId,
        found: ContextId,
    },

    #[error("prover returned unknown: {0}")]
    ProverUnknown(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("interpolant verification failed: {0}")]
    Verification(VerificationFailure),

    #[error("prover error: {0}")]
    Prover(#[from] ProverError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl InterpError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        InterpError::InvalidArgument(message.into())
    }
}

impl From<ForestError> for InterpError {
    fn from(err: ForestError) -> Self {
        InterpError::InvalidArgument(err.to_string())
    }
}

impl From<SortError> for InterpError {
    fn from(err: SortError) -> Self {
        InterpError::InvalidArgument(err.to_string())
    }
}

/// Result type for interpolation operations
pub type InterpResult<T> = Result<T, InterpError>;
