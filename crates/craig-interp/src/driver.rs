//! Interpolation driver
//!
//! Three entry points, all on [`InterpolationContext`]:
//!
//! - `get_interpolant`: interpolants of a marked pattern from an existing
//!   refutation,
//! - `compute_interpolant`: prove a marked pattern, then extract,
//! - `interpolate`: prove a batch [`InterpolationProblem`], then extract.
//!
//! Shape and ownership errors are reported before the prover is called.
//! A prover `unknown` is surfaced as [`InterpError::ProverUnknown`].

use crate::context::{CheckOutcome, Formula, InterpolationContext, Model, Proof};
use crate::error::{InterpError, InterpResult};
use crate::pattern::decompose;
use crate::problem::InterpolationProblem;
use crate::profile::Operation;
use craig_core::{Expr, Params, Partition, ProveResult, Prover, ProverError, Sort};
use std::time::Instant;

/// Result of an interpolation request that reached a verdict
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The constraints are jointly unsatisfiable
    Unsat { interpolants: Vec<Formula> },
    /// The constraints are satisfiable; no interpolants exist
    Sat { model: Model },
}

impl Outcome {
    pub fn is_unsat(&self) -> bool {
        matches!(self, Outcome::Unsat { .. })
    }

    pub fn is_sat(&self) -> bool {
        matches!(self, Outcome::Sat { .. })
    }

    pub fn interpolants(&self) -> Option<&[Formula]> {
        match self {
            Outcome::Unsat { interpolants } => Some(interpolants),
            Outcome::Sat { .. } => None,
        }
    }

    pub fn model(&self) -> Option<&Model> {
        match self {
            Outcome::Sat { model } => Some(model),
            Outcome::Unsat { .. } => None,
        }
    }
}

impl<P: Prover> InterpolationContext<P> {
    /// Single prover call with logging and accounting
    pub(crate) fn run_prover(
        &mut self,
        formulas: &[Expr],
        params: &Params,
    ) -> InterpResult<CheckOutcome<P::Proof>> {
        self.profile.record_prover_call();
        log::debug!("prove: {} formula(s), {}", formulas.len(), params);
        match self.prover.prove(formulas, params) {
            ProveResult::Sat(model) => {
                log::debug!("prove: sat");
                Ok(CheckOutcome::Sat(Model::new(self.id(), model)))
            }
            ProveResult::Unsat(proof) => {
                log::debug!("prove: unsat");
                Ok(CheckOutcome::Unsat(Proof::new(self.id(), proof)))
            }
            ProveResult::Unknown(reason) => {
                log::debug!("prove: unknown ({reason})");
                Err(InterpError::ProverUnknown(reason))
            }
        }
    }

    /// Check satisfiability of the conjunction of `formulas`. The proof of
    /// an unsatisfiable pattern feeds [`InterpolationContext::get_interpolant`].
    pub fn check(
        &mut self,
        formulas: &[Formula],
        params: &Params,
    ) -> InterpResult<CheckOutcome<P::Proof>> {
        for f in formulas {
            self.ensure_boolean(f, "checked formula")?;
        }
        let exprs: Vec<Expr> = formulas.iter().map(|f| f.expr().clone()).collect();
        self.run_prover(&exprs, params)
    }

    /// Interpolants for the cut points of `pattern`, read from a refutation
    /// of `pattern`. One interpolant per marker, in post-order.
    pub fn get_interpolant(
        &mut self,
        proof: &Proof<P::Proof>,
        pattern: &Formula,
        params: &Params,
    ) -> InterpResult<Vec<Formula>> {
        let started = Instant::now();
        let result = self.get_interpolant_inner(proof, pattern, params);
        self.profile.record(Operation::GetInterpolant, started.elapsed());
        result
    }

    fn get_interpolant_inner(
        &mut self,
        proof: &Proof<P::Proof>,
        pattern: &Formula,
        params: &Params,
    ) -> InterpResult<Vec<Formula>> {
        self.ensure_context(proof.context())?;
        self.ensure_boolean(pattern, "pattern")?;
        if proof.context() != pattern.context() {
            return Err(InterpError::ContextMismatch {
                expected: proof.context(),
                found: pattern.context(),
            });
        }
        let parts = decompose(pattern.expr())?;
        self.extract(proof.inner(), &parts.constraints, &parts.parents, &[], params)
    }

    /// Prove `pattern` (markers are transparent). Unsatisfiable patterns
    /// yield one interpolant per marker; satisfiable ones a model.
    pub fn compute_interpolant(
        &mut self,
        pattern: &Formula,
        params: &Params,
    ) -> InterpResult<Outcome> {
        let started = Instant::now();
        let result = self.compute_interpolant_inner(pattern, params);
        self.profile
            .record(Operation::ComputeInterpolant, started.elapsed());
        result
    }

    fn compute_interpolant_inner(
        &mut self,
        pattern: &Formula,
        params: &Params,
    ) -> InterpResult<Outcome> {
        self.ensure_boolean(pattern, "pattern")?;
        let parts = decompose(pattern.expr())?;
        match self.run_prover(&[pattern.expr().clone()], params)? {
            CheckOutcome::Sat(model) => Ok(Outcome::Sat { model }),
            CheckOutcome::Unsat(proof) => {
                let interpolants =
                    self.extract(proof.inner(), &parts.constraints, &parts.parents, &[], params)?;
                Ok(Outcome::Unsat { interpolants })
            }
        }
    }

    /// Solve a batch problem. On unsatisfiability returns `n - 1`
    /// interpolants, one per non-root node in increasing node order.
    pub fn interpolate(&mut self, problem: &InterpolationProblem) -> InterpResult<Outcome> {
        let started = Instant::now();
        let result = self.interpolate_inner(problem);
        self.profile.record(Operation::Interpolate, started.elapsed());
        result
    }

    fn interpolate_inner(&mut self, problem: &InterpolationProblem) -> InterpResult<Outcome> {
        problem.validate()?;
        for f in &problem.constraints {
            self.ensure_boolean(f, "constraint")?;
        }
        for f in &problem.theory {
            self.ensure_boolean(f, "theory axiom")?;
        }

        let constraints: Vec<Expr> = problem.constraints.iter().map(|f| f.expr().clone()).collect();
        let theory: Vec<Expr> = problem.theory.iter().map(|f| f.expr().clone()).collect();
        let params = problem.prover_params();

        let mut query = constraints.clone();
        query.extend(theory.iter().cloned());
        match self.run_prover(&query, &params)? {
            CheckOutcome::Sat(model) => Ok(Outcome::Sat { model }),
            CheckOutcome::Unsat(proof) => {
                let interpolants =
                    self.extract(proof.inner(), &constraints, &problem.parents, &theory, &params)?;
                Ok(Outcome::Unsat { interpolants })
            }
        }
    }

    /// Ask the prover for tree interpolants and check the shape of its answer
    fn extract(
        &mut self,
        proof: &P::Proof,
        constraints: &[Expr],
        parents: &[u32],
        theory: &[Expr],
        params: &Params,
    ) -> InterpResult<Vec<Formula>> {
        let partition = Partition::new(constraints, parents, theory);
        let interpolants = self
            .prover
            .extract_interpolants(proof, &partition, params)?;

        let expected = constraints.len() - 1;
        if interpolants.len() != expected {
            return Err(ProverError::Contract(format!(
                "expected {expected} interpolant(s), got {}",
                interpolants.len()
            ))
            .into());
        }
        let mut out = Vec::with_capacity(expected);
        for (k, interpolant) in interpolants.into_iter().enumerate() {
            if interpolant.check_sort().ok() != Some(Sort::Bool) {
                return Err(ProverError::Contract(format!(
                    "interpolant {k} is not a Boolean formula: {interpolant}"
                ))
                .into());
            }
            out.push(self.wrap(interpolant));
        }
        log::debug!("extracted {} interpolant(s)", out.len());
        Ok(out)
    }
}
