//! Craig interpolation protocol layer
//!
//! Given constraints that are jointly unsatisfiable, an interpolant is a
//! formula over their shared symbols that separates one group of
//! constraints from the rest. This crate drives any [`craig_core::Prover`]
//! to produce sequence and tree interpolants, verifies candidate
//! interpolants independently, and persists problems as text.
//!
//! - [`InterpolationContext`]: owns a prover and the formulas built with it
//! - [`InterpolationProblem`]: constraints, parent array, theory and params
//! - driver: `interpolate`, `compute_interpolant`, `get_interpolant`
//! - verifier: `check_interpolant` and its [`VerificationReport`]
//! - codec: `read_problem` / `write_problem` and the [`ProblemFile`] format
//!
//! # Example
//!
//! ```
//! use craig_core::Var;
//! use craig_interp::{InterpolationContext, InterpolationProblem, Outcome};
//! use craig_lia::LiaProver;
//!
//! let mut ctx = InterpolationContext::new(LiaProver::new());
//! let x = [Var::int("x")];
//! let a = ctx.parse_formula("(> x 0)", &x).unwrap();
//! let b = ctx.parse_formula("(< x 0)", &x).unwrap();
//!
//! let problem = InterpolationProblem::sequence(vec![a.clone(), b.clone()]);
//! let Outcome::Unsat { interpolants } = ctx.interpolate(&problem).unwrap() else {
//!     panic!("expected unsat");
//! };
//! assert_eq!(interpolants[0].to_string(), "(>= x 1)");
//!
//! let report = ctx
//!     .check_interpolant(&[a, b], &problem.parents, &interpolants, &[])
//!     .unwrap();
//! assert!(report.ok);
//! ```

mod codec;
mod context;
mod driver;
mod error;
mod pattern;
mod problem;
mod profile;
mod verify;

pub use codec::{decode_problem, encode_problem, ProblemFile};
pub use context::{CheckOutcome, ContextId, Formula, InterpolationContext, Model, Proof};
pub use driver::Outcome;
pub use error::{InterpError, InterpResult};
pub use pattern::{decompose, Decomposition};
pub use problem::InterpolationProblem;
pub use profile::{InterpolationProfile, Operation};
pub use verify::{SubCheck, VerificationFailure, VerificationReport};
