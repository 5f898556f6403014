//! Core types for Craig interpolation
//!
//! This crate holds everything the interpolation layer and the provers
//! behind it agree on:
//!
//! - `Expr`: quantifier-free formulas over Bool and Int symbols, with the
//!   `interp` marker that flags interpolation cut points
//! - `TermParser`: SMT-LIB term syntax with source locations
//! - `Model`, `Params`: satisfying assignments and solver parameters
//! - `Forest`: parent arrays arranging constraints in a tree
//! - `Prover`: the capability interface of a proof-producing solver
//!
//! # Example
//!
//! ```
//! use craig_core::{parse_expr, Expr, Var};
//!
//! let x = Var::int("x");
//! let e = parse_expr("(and (interp (> x 0)) (< x 0))", &[x]).unwrap();
//! assert!(e.contains_interp());
//! assert_eq!(e.strip_interp().to_string(), "(and (> x 0) (< x 0))");
//! ```

mod error;
mod expr;
mod model;
mod params;
mod parser;
mod prover;
mod tree;

pub use error::{ForestError, Location, ParseError, ParseResult, ProverError, SortError};
pub use expr::{Expr, Op, Sort, Var};
pub use model::{Model, Value};
pub use params::{ParamValue, Params};
pub use parser::{is_symbol_char, parse_expr, TermParser, MAX_TERM_DEPTH};
pub use prover::{Partition, ProveResult, Prover};
pub use tree::{sequence_parents, Forest, ROOT};
