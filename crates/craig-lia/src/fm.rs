//! Fourier-Motzkin elimination over tightened integer constraints
//!
//! Eliminating a symbol combines every lower bound with every upper bound.
//! Each derived constraint is a non-negative combination of its premises,
//! so a constant contradiction refutes the input over the integers as well.
//! The converse does not hold: rational feasibility can hide an integer gap,
//! which model construction reports instead of guessing.

use crate::config::Budget;
use crate::error::{LiaError, LiaResult};
use crate::linear::Constraint;
use num_integer::Integer;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of a feasibility check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FmResult {
    /// Integer solution for every symbol of the input
    Sat(BTreeMap<String, i64>),
    /// Contradiction derived
    Unsat,
}

/// Eliminate `var`, returning constraints free of it.
///
/// Trivially true results are dropped, duplicates merged.
pub fn eliminate(
    constraints: &[Constraint],
    var: &str,
    budget: &Budget,
) -> LiaResult<Vec<Constraint>> {
    let mut lower = Vec::new(); // coefficient < 0
    let mut upper = Vec::new(); // coefficient > 0
    let mut result = BTreeSet::new();

    for c in constraints {
        match c.coeff(var) {
            0 => {
                result.insert(c.clone());
            }
            a if a < 0 => lower.push(c),
            _ => upper.push(c),
        }
    }

    for lo in &lower {
        for up in &upper {
            // b * (-|a| x + r_lo) + |a| * (b x + r_up) cancels x
            let a = -lo.coeff(var);
            let b = up.coeff(var);
            let combined = lo.expr().scale(b)?.add(&up.expr().scale(a)?)?;
            let derived = Constraint::le(combined)?;
            if !derived.is_trivially_true() {
                result.insert(derived);
            }
        }
        budget.check_constraints(result.len())?;
    }
    budget.check_deadline()?;

    Ok(result.into_iter().collect())
}

/// Symbol whose elimination creates the fewest new constraints
fn pick_var<'c>(
    constraints: &'c [Constraint],
    eligible: impl Fn(&str) -> bool,
) -> Option<&'c str> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for c in constraints {
        for (var, &coeff) in &c.expr().coeffs {
            if !eligible(var) {
                continue;
            }
            let entry = counts.entry(var.as_str()).or_default();
            if coeff < 0 {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
    }
    counts
        .into_iter()
        .min_by_key(|(_, (lo, up))| lo * up)
        .map(|(var, _)| var)
}

/// Decide a conjunction of constraints over the integers.
///
/// Returns `Err(IntegerGap)` when the rational relaxation is feasible but
/// back-substitution finds no integer value.
pub fn check(constraints: &[Constraint], budget: &Budget) -> LiaResult<FmResult> {
    if constraints.iter().any(Constraint::is_trivially_false) {
        return Ok(FmResult::Unsat);
    }

    let mut stages: Vec<(String, Vec<Constraint>)> = Vec::new();
    let mut current: Vec<Constraint> = constraints
        .iter()
        .filter(|c| !c.is_trivially_true())
        .cloned()
        .collect();

    while let Some(var) = pick_var(&current, |_| true).map(str::to_string) {
        let next = eliminate(&current, &var, budget)?;
        if next.iter().any(Constraint::is_trivially_false) {
            return Ok(FmResult::Unsat);
        }
        stages.push((var, current));
        current = next;
    }

    let mut values = BTreeMap::new();
    for (var, stage) in stages.iter().rev() {
        let value = pick_value(var, stage, &values)?;
        values.insert(var.clone(), value);
    }
    for c in constraints {
        for var in c.expr().variables() {
            values.entry(var.to_string()).or_insert(0);
        }
    }
    Ok(FmResult::Sat(values))
}

/// Integer value for `var` satisfying every constraint of `stage`, given
/// values for the symbols eliminated after it. Prefers 0, then the bound
/// closest to 0.
fn pick_value(
    var: &str,
    stage: &[Constraint],
    values: &BTreeMap<String, i64>,
) -> LiaResult<i64> {
    let mut lo = i64::MIN;
    let mut hi = i64::MAX;
    for c in stage {
        let a = c.coeff(var);
        if a == 0 {
            continue;
        }
        let rest = c.expr().eval_without(var, values)?;
        let neg_rest = rest.checked_neg().ok_or(LiaError::Overflow)?;
        if a > 0 {
            // a x <= -rest
            hi = hi.min(neg_rest.div_floor(&a));
        } else {
            // -b x + rest <= 0  =>  x >= ceil(rest / b)
            let b = a.checked_neg().ok_or(LiaError::Overflow)?;
            let ceil = neg_rest
                .div_floor(&b)
                .checked_neg()
                .ok_or(LiaError::Overflow)?;
            lo = lo.max(ceil);
        }
    }
    if lo > hi {
        return Err(LiaError::IntegerGap {
            var: var.to_string(),
        });
    }
    Ok(0i64.clamp(lo, hi))
}

/// Project a conjunction onto the symbols in `keep`.
///
/// Returns `None` when a contradiction shows up during elimination. The
/// result is implied by the input; it is exact whenever every eliminated
/// symbol has a unit coefficient on one side of each combined pair.
pub fn project(
    constraints: &[Constraint],
    keep: &FxHashSet<String>,
    budget: &Budget,
) -> LiaResult<Option<Vec<Constraint>>> {
    if constraints.iter().any(Constraint::is_trivially_false) {
        return Ok(None);
    }
    let mut current: Vec<Constraint> = constraints
        .iter()
        .filter(|c| !c.is_trivially_true())
        .cloned()
        .collect();
    while let Some(var) = pick_var(&current, |v| !keep.contains(v)).map(str::to_string) {
        current = eliminate(&current, &var, budget)?;
        if current.iter().any(Constraint::is_trivially_false) {
            return Ok(None);
        }
    }
    current.sort();
    current.dedup();
    Ok(Some(current))
}
