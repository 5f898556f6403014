//! Tree interpolants by projection
//!
//! For a non-root node `i` the interpolant is the projection of
//! `F_i ∧ T ∧ ⋀ I_c` (children `c`) onto the symbols shared between the
//! subtree of `i` and the rest of the partition, plus the theory symbols.
//! The projection is implied by its input, so entailment holds by
//! construction. Projection through Fourier-Motzkin can be weaker than the
//! exact integer projection, so the root is re-checked at the end.

use crate::config::Budget;
use crate::error::LiaResult;
use crate::fm::{self, FmResult};
use crate::nnf::{for_each_cube, to_nnf, Flow};
use crate::solver::{decide, Decision, LiaProof};
use craig_core::{Expr, Forest, Partition, ProverError};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

fn symbol_names(e: &Expr) -> FxHashSet<String> {
    e.vars().into_iter().map(|v| v.name).collect()
}

/// Conjuncts of a formula list, as text, markers removed
fn conjunct_set(formulas: &[Expr]) -> BTreeSet<String> {
    formulas
        .iter()
        .map(Expr::strip_interp)
        .flat_map(|f| {
            f.conjuncts()
                .into_iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// The proof must refute exactly the partition's formulas
fn check_proof_covers(proof: &LiaProof, partition: &Partition<'_>) -> Result<(), ProverError> {
    let mut expected = conjunct_set(partition.constraints);
    expected.extend(conjunct_set(partition.theory));
    let refuted = conjunct_set(&proof.formulas);
    if expected != refuted {
        let missing: Vec<_> = expected.difference(&refuted).take(3).cloned().collect();
        let extra: Vec<_> = refuted.difference(&expected).take(3).cloned().collect();
        return Err(ProverError::ProofMismatch(format!(
            "not refuted: {missing:?}, refuted but absent: {extra:?}"
        )));
    }
    Ok(())
}

/// Symbols of `subtree(node)` that also occur outside it, plus theory symbols
fn shared_symbols(
    forest: &Forest,
    node: usize,
    node_symbols: &[FxHashSet<String>],
    theory_symbols: &FxHashSet<String>,
) -> FxHashSet<String> {
    let mask = forest.subtree(node);
    let mut inside = FxHashSet::default();
    let mut outside = FxHashSet::default();
    for (i, symbols) in node_symbols.iter().enumerate() {
        let side = if mask[i] { &mut inside } else { &mut outside };
        side.extend(symbols.iter().cloned());
    }
    let mut keep: FxHashSet<String> = inside.intersection(&outside).cloned().collect();
    keep.extend(theory_symbols.iter().cloned());
    keep
}

/// Existentially project `formula` onto `keep`, cube by cube
pub(crate) fn project_formula(
    formula: &Expr,
    keep: &FxHashSet<String>,
    budget: &mut Budget,
) -> LiaResult<Expr> {
    let nnf = to_nnf(formula)?;
    let mut disjuncts = Vec::new();
    let mut seen = BTreeSet::new();
    let mut valid = false;

    for_each_cube(&nnf, budget, |cube, budget| {
        if let Ok(FmResult::Unsat) = fm::check(&cube.constraints, budget) {
            return Ok(Flow::Continue);
        }
        let Some(constraints) = fm::project(&cube.constraints, keep, budget)? else {
            return Ok(Flow::Continue);
        };
        let mut conj: Vec<Expr> = cube
            .literals
            .iter()
            .filter(|(name, _)| keep.contains(*name))
            .map(|(name, &value)| {
                let lit = Expr::bool_var(name.clone());
                if value {
                    lit
                } else {
                    Expr::not(lit)
                }
            })
            .collect();
        conj.extend(constraints.iter().map(|c| c.to_expr()));
        if conj.is_empty() {
            valid = true;
            return Ok(Flow::Stop);
        }
        let cube_expr = Expr::and_all(conj);
        if seen.insert(cube_expr.to_string()) {
            disjuncts.push(cube_expr);
        }
        Ok(Flow::Continue)
    })?;

    if valid {
        return Ok(Expr::Bool(true));
    }
    Ok(Expr::or_all(disjuncts))
}

/// One interpolant per non-root node, in increasing node order
pub(crate) fn tree_interpolants(
    proof: &LiaProof,
    partition: &Partition<'_>,
    budget: &mut Budget,
) -> Result<Vec<Expr>, ProverError> {
    let forest = Forest::for_constraints(partition.constraints.len(), partition.parents)?;
    check_proof_covers(proof, partition)?;

    let constraints: Vec<Expr> = partition.constraints.iter().map(Expr::strip_interp).collect();
    let theory: Vec<Expr> = partition.theory.iter().map(Expr::strip_interp).collect();
    let node_symbols: Vec<FxHashSet<String>> = constraints.iter().map(symbol_names).collect();
    let theory_symbols: FxHashSet<String> = theory.iter().flat_map(symbol_names).collect();

    let mut interpolants: Vec<Option<Expr>> = vec![None; forest.len()];
    for node in forest.post_order() {
        let mut parts = vec![constraints[node].clone()];
        parts.extend(theory.iter().cloned());
        parts.extend(
            forest
                .children(node)
                .iter()
                .filter_map(|&c| interpolants[c].clone()),
        );

        if forest.is_root(node) {
            match decide(&parts, budget)? {
                Decision::Unsat { .. } => continue,
                Decision::Sat(_) => {
                    return Err(ProverError::Incomplete(format!(
                        "projected interpolants do not refute root {node}"
                    )))
                }
            }
        }

        let keep = shared_symbols(&forest, node, &node_symbols, &theory_symbols);
        let interpolant = project_formula(&Expr::and_all(parts), &keep, budget)?;
        log::trace!("lia: interpolant for node {node}: {interpolant}");
        interpolants[node] = Some(interpolant);
    }

    Ok(forest
        .edges()
        .filter_map(|(node, _)| interpolants[node].take())
        .collect())
}
