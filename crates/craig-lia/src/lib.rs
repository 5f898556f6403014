//! Reference interpolating prover for linear integer arithmetic
//!
//! `LiaProver` implements [`craig_core::Prover`] for quantifier-free
//! formulas over Bool and Int symbols with linear arithmetic:
//!
//! - `prove` splits the negation normal form into cubes and refutes each
//!   with Fourier-Motzkin elimination,
//! - `extract_interpolants` projects each tree node onto its shared
//!   symbols, bottom-up.
//!
//! Budgets (`timeout`, `max_cubes`, `max_constraints`) come from
//! [`LiaConfig`], overridable per call through [`craig_core::Params`].
//!
//! # Example
//!
//! ```
//! use craig_core::{parse_expr, Params, Partition, ProveResult, Prover, Var, ROOT};
//! use craig_lia::LiaProver;
//!
//! let vars = [Var::int("x")];
//! let a = parse_expr("(> x 0)", &vars).unwrap();
//! let b = parse_expr("(< x 0)", &vars).unwrap();
//! let constraints = [a, b];
//!
//! let mut prover = LiaProver::new();
//! let ProveResult::Unsat(proof) = prover.prove(&constraints, &Params::new()) else {
//!     panic!("expected unsat");
//! };
//! let parents = [1, ROOT];
//! let partition = Partition::new(&constraints, &parents, &[]);
//! let interpolants = prover
//!     .extract_interpolants(&proof, &partition, &Params::new())
//!     .unwrap();
//! assert_eq!(interpolants[0].to_string(), "(>= x 1)");
//! ```

mod config;
mod error;
mod fm;
mod interpolate;
mod linear;
mod nnf;
mod solver;

pub use config::LiaConfig;
pub use error::{LiaError, LiaResult};
pub use solver::{LiaProof, LiaProver, LiaStats};
