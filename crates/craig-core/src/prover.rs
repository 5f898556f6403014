//! Prover capability interface
//!
//! The interpolation layer never searches for proofs itself. It talks to a
//! proof-producing satisfiability engine through [`Prover`]:
//!
//! - `prove` decides a conjunction and returns a model or a refutation,
//! - `extract_interpolants` reads a tree of interpolants out of a refutation,
//! - `free_symbols` reports the symbols a formula depends on.

use crate::error::ProverError;
use crate::expr::{Expr, Var};
use crate::model::Model;
use crate::params::Params;
use std::collections::BTreeSet;
use std::fmt;

/// Result of a satisfiability check
#[derive(Debug, Clone)]
pub enum ProveResult<P> {
    /// The conjunction is satisfiable
    Sat(Model),
    /// The conjunction is unsatisfiable, with a refutation
    Unsat(P),
    /// The prover could not decide (incompleteness, budget, timeout)
    Unknown(String),
}

impl<P> ProveResult<P> {
    pub fn is_sat(&self) -> bool {
        matches!(self, ProveResult::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, ProveResult::Unsat(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ProveResult::Unknown(_))
    }
}

/// A tree-shaped partition of a refuted conjunction
#[derive(Debug, Clone, Copy)]
pub struct Partition<'a> {
    /// One formula per tree node
    pub constraints: &'a [Expr],
    /// `parents[i]` is the parent of node `i`, or [`crate::ROOT`]
    pub parents: &'a [u32],
    /// Background axioms visible in every node
    pub theory: &'a [Expr],
}

impl<'a> Partition<'a> {
    pub fn new(constraints: &'a [Expr], parents: &'a [u32], theory: &'a [Expr]) -> Self {
        Self {
            constraints,
            parents,
            theory,
        }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// A proof-producing satisfiability engine
pub trait Prover {
    /// Refutation certificate returned for unsatisfiable queries
    type Proof: Clone + fmt::Debug;

    /// Decide the conjunction of `formulas`. Interpolation markers are
    /// transparent.
    fn prove(&mut self, formulas: &[Expr], params: &Params) -> ProveResult<Self::Proof>;

    /// Extract interpolants for `partition` from a refutation of the
    /// conjunction of its constraints and theory.
    ///
    /// Returns one interpolant per non-root node, in increasing node order.
    fn extract_interpolants(
        &mut self,
        proof: &Self::Proof,
        partition: &Partition<'_>,
        params: &Params,
    ) -> Result<Vec<Expr>, ProverError>;

    /// Free symbols of a formula
    fn free_symbols(&self, formula: &Expr) -> BTreeSet<Var> {
        formula.vars()
    }
}

impl<T: Prover + ?Sized> Prover for Box<T> {
    type Proof = T::Proof;

    fn prove(&mut self, formulas: &[Expr], params: &Params) -> ProveResult<Self::Proof> {
        (**self).prove(formulas, params)
    }

    fn extract_interpolants(
        &mut self,
        proof: &Self::Proof,
        partition: &Partition<'_>,
        params: &Params,
    ) -> Result<Vec<Expr>, ProverError> {
        (**self).extract_interpolants(proof, partition, params)
    }

    fn free_symbols(&self, formula: &Expr) -> BTreeSet<Var> {
        (**self).free_symbols(formula)
    }
}
