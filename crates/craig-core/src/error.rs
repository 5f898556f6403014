//! Error types shared by the expression layer and provers

use std::fmt;
use thiserror::Error;

/// 1-based position in a text input
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location of byte offset `pos` in `input`
    pub fn of_offset(input: &str, pos: usize) -> Self {
        let pos = pos.min(input.len());
        let before = &input[..pos];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Malformed textual input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at {location}: {message}")]
pub struct ParseError {
    pub location: Location,
    pub message: String,
}

impl ParseError {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

/// Result type for parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Ill-sorted application
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sort error: {0}")]
pub struct SortError(pub String);

impl SortError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Invalid parent array
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForestError {
    #[error("empty partition: at least one constraint is required")]
    Empty,

    #[error("length mismatch: {constraints} constraints but {parents} parent entries")]
    LengthMismatch { constraints: usize, parents: usize },

    #[error("constraint {node} is its own parent")]
    SelfLoop { node: usize },

    #[error("parent {parent} of constraint {node} is out of range (n = {len})")]
    OutOfRange { node: usize, parent: u32, len: usize },

    #[error("parent relation has a cycle through constraint {node}")]
    Cycle { node: usize },

    #[error("no root: every constraint has a parent")]
    NoRoot,

    #[error("expected a single tree but found {} roots: {roots:?}", roots.len())]
    MultipleRoots { roots: Vec<usize> },
}

/// Failures reported by a prover outside of sat/unsat/unknown
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProverError {
    #[error("proof does not refute the given partition: {0}")]
    ProofMismatch(String),

    #[error("invalid partition: {0}")]
    InvalidPartition(#[from] ForestError),

    #[error("unsupported formula: {0}")]
    Unsupported(String),

    #[error("resource limit reached: {0}")]
    Incomplete(String),

    #[error("prover broke its contract: {0}")]
    Contract(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_of_offset() {
        let input = "(a\n  (b c)\n)";
        assert_eq!(Location::of_offset(input, 0), Location::new(1, 1));
        assert_eq!(Location::of_offset(input, 3), Location::new(2, 1));
        assert_eq!(Location::of_offset(input, 5), Location::new(2, 3));
        assert_eq!(Location::of_offset(input, 1000), Location::new(3, 2));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(Location::new(4, 7), "expected ')'");
        assert_eq!(err.to_string(), "parse error at 4:7: expected ')'");
    }
}
