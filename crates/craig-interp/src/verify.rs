//! Interpolant verification
//!
//! Checks a tree of interpolants against its constraints with fresh prover
//! calls, trusting nothing the driver returned. For each non-root node `i`
//! with parent `p`, in increasing node order:
//!
//! 1. symbol-sharing: `I_i` only uses symbols that occur both inside and
//!    outside the subtree of `i`, or in the theory,
//! 2. entailment-in: `F_i ∧ T ∧ ⋀ I_c ∧ ¬I_i` is unsatisfiable, where `c`
//!    ranges over the children of `i`,
//!
//! and finally, at the root `r`,
//!
//! 3. unsatisfiability-out: `F_r ∧ T ∧ ⋀ I_c` is unsatisfiable.

use crate::context::{CheckOutcome, Formula, InterpolationContext};
use crate::error::{InterpError, InterpResult};
use crate::profile::Operation;
use craig_core::{Expr, Forest, Params, Prover, Var};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

/// The individual conditions of a tree interpolant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubCheck {
    EntailmentIn,
    UnsatisfiabilityOut,
    SymbolSharing,
}

impl fmt::Display for SubCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubCheck::EntailmentIn => write!(f, "entailment-in"),
            SubCheck::UnsatisfiabilityOut => write!(f, "unsatisfiability-out"),
            SubCheck::SymbolSharing => write!(f, "symbol-sharing"),
        }
    }
}

/// The first condition found violated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationFailure {
    pub node: usize,
    /// `None` when the failure is at the root
    pub parent: Option<usize>,
    pub check: SubCheck,
    pub detail: String,
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parent {
            Some(parent) => write!(f, "edge {} -> {}", self.node, parent)?,
            None => write!(f, "root {}", self.node)?,
        }
        write!(f, ": {} failed: {}", self.check, self.detail)
    }
}

/// Verdict of [`InterpolationContext::check_interpolant`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub ok: bool,
    /// Rendering of `failure`, for display
    pub diagnostic: Option<String>,
    pub failure: Option<VerificationFailure>,
}

impl VerificationReport {
    fn passed() -> Self {
        Self {
            ok: true,
            diagnostic: None,
            failure: None,
        }
    }

    fn failed(failure: VerificationFailure) -> Self {
        Self {
            ok: false,
            diagnostic: Some(failure.to_string()),
            failure: Some(failure),
        }
    }

    /// `Err(Verification)` for a failed report
    pub fn into_result(self) -> InterpResult<()> {
        match self.failure {
            Some(failure) => Err(InterpError::Verification(failure)),
            None => Ok(()),
        }
    }
}

fn names(symbols: &BTreeSet<Var>) -> impl Iterator<Item = &str> {
    symbols.iter().map(|v| v.name.as_str())
}

impl<P: Prover> InterpolationContext<P> {
    /// Verify that `interpolants` form a tree interpolant for `constraints`
    /// shaped by `parents`, modulo `theory`.
    ///
    /// Shape errors are `InvalidArgument`; a prover `unknown` during any
    /// sub-check is `ProverUnknown`, never a pass or a fail.
    pub fn check_interpolant(
        &mut self,
        constraints: &[Formula],
        parents: &[u32],
        interpolants: &[Formula],
        theory: &[Formula],
    ) -> InterpResult<VerificationReport> {
        let started = Instant::now();
        let result = self.check_interpolant_inner(constraints, parents, interpolants, theory);
        self.profile
            .record(Operation::CheckInterpolant, started.elapsed());
        result
    }

    fn check_interpolant_inner(
        &mut self,
        constraints: &[Formula],
        parents: &[u32],
        interpolants: &[Formula],
        theory: &[Formula],
    ) -> InterpResult<VerificationReport> {
        if constraints.is_empty() {
            return Err(InterpError::invalid("no constraints to verify against"));
        }
        let forest = Forest::for_constraints(constraints.len(), parents)?;
        if interpolants.len() != constraints.len() - 1 {
            return Err(InterpError::invalid(format!(
                "expected {} interpolant(s) for {} constraints, got {}",
                constraints.len() - 1,
                constraints.len(),
                interpolants.len()
            )));
        }
        for f in constraints {
            self.ensure_boolean(f, "constraint")?;
        }
        for f in interpolants {
            self.ensure_boolean(f, "interpolant")?;
        }
        for f in theory {
            self.ensure_boolean(f, "theory axiom")?;
        }

        let node_symbols: Vec<BTreeSet<Var>> = constraints
            .iter()
            .map(|f| self.prover.free_symbols(f.expr()))
            .collect();
        let theory_names: FxHashSet<String> = theory
            .iter()
            .flat_map(|f| self.prover.free_symbols(f.expr()))
            .map(|v| v.name)
            .collect();
        let theory_exprs: Vec<Expr> = theory.iter().map(|f| f.expr().clone()).collect();
        let slots = forest.interpolant_slots();
        let params = Params::new();

        // Premises of a node: its formula, the theory and its children's
        // interpolants
        let premises = |node: usize| -> Vec<Expr> {
            let mut parts = vec![constraints[node].expr().clone()];
            parts.extend(theory_exprs.iter().cloned());
            for &c in forest.children(node) {
                if let Some(k) = slots[c] {
                    parts.push(interpolants[k].expr().clone());
                }
            }
            parts
        };

        for (k, (node, parent)) in forest.edges().enumerate() {
            let interpolant = &interpolants[k];

            let mask = forest.subtree(node);
            let mut inside = FxHashSet::default();
            let mut outside = FxHashSet::default();
            for (i, symbols) in node_symbols.iter().enumerate() {
                let side = if mask[i] { &mut inside } else { &mut outside };
                side.extend(names(symbols));
            }
            let used = self.prover.free_symbols(interpolant.expr());
            let leaked: Vec<&str> = names(&used)
                .filter(|s| {
                    !theory_names.contains(*s) && !(inside.contains(s) && outside.contains(s))
                })
                .collect();
            if !leaked.is_empty() {
                return Ok(self.fail(
                    node,
                    Some(parent),
                    SubCheck::SymbolSharing,
                    format!("{interpolant} uses non-shared symbol(s) {}", leaked.join(", ")),
                ));
            }

            let mut query = premises(node);
            query.push(Expr::not(interpolant.expr().clone()));
            if let CheckOutcome::Sat(model) = self.run_prover(&query, &params)? {
                return Ok(self.fail(
                    node,
                    Some(parent),
                    SubCheck::EntailmentIn,
                    format!("{interpolant} is not implied; counterexample {model}"),
                ));
            }
        }

        let root = forest.root();
        if let CheckOutcome::Sat(model) = self.run_prover(&premises(root), &params)? {
            return Ok(self.fail(
                root,
                None,
                SubCheck::UnsatisfiabilityOut,
                format!("root constraint is satisfiable with the interpolants; model {model}"),
            ));
        }
        Ok(VerificationReport::passed())
    }

    fn fail(
        &self,
        node: usize,
        parent: Option<usize>,
        check: SubCheck,
        detail: String,
    ) -> VerificationReport {
        let failure = VerificationFailure {
            node,
            parent,
            check,
            detail,
        };
        log::debug!("verification failed at {failure}");
        VerificationReport::failed(failure)
    }
}
