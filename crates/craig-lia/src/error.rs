//! Error types for the arithmetic engine

use craig_core::ProverError;
use std::time::Duration;
use thiserror::Error;

/// Reasons the engine stops without a definite answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiaError {
    #[error("non-linear term: {0}")]
    NonLinear(String),

    #[error("unsupported term: {0}")]
    Unsupported(String),

    #[error("integer overflow in linear arithmetic")]
    Overflow,

    #[error("no integer value for {var} between its rational bounds")]
    IntegerGap { var: String },

    #[error("case split limit of {0} cubes exceeded")]
    CubeLimit(usize),

    #[error("elimination produced more than {0} constraints")]
    ConstraintLimit(usize),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("constructed model does not satisfy {0}")]
    ModelCheck(String),
}

impl LiaError {
    /// Budget and timeout exhaustion, as opposed to incompleteness of the
    /// procedure itself
    pub fn is_resource_limit(&self) -> bool {
        matches!(
            self,
            LiaError::CubeLimit(_) | LiaError::ConstraintLimit(_) | LiaError::Timeout(_)
        )
    }
}

/// Result type for the arithmetic engine
pub type LiaResult<T> = Result<T, LiaError>;

impl From<LiaError> for ProverError {
    fn from(err: LiaError) -> Self {
        match err {
            LiaError::NonLinear(_) | LiaError::Unsupported(_) => {
                ProverError::Unsupported(err.to_string())
            }
            _ => ProverError::Incomplete(err.to_string()),
        }
    }
}
