//! The reference prover
//!
//! `LiaProver` decides quantifier-free linear integer arithmetic with
//! Boolean structure by case splitting into cubes and refuting each cube
//! with Fourier-Motzkin elimination. Answers are conservative:
//!
//! - `Unsat` only when every cube is refuted,
//! - `Sat` only with an integer model that evaluates every input to true,
//! - `Unknown` otherwise (integer gaps, overflow, budgets, timeouts).

use crate::config::{Budget, LiaConfig};
use crate::error::{LiaError, LiaResult};
use crate::fm::{self, FmResult};
use crate::interpolate;
use crate::nnf::{for_each_cube, to_nnf, Cube, Flow};
use craig_core::{Expr, Model, Params, Partition, ProveResult, Prover, ProverError, Sort, Value};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Refutation certificate: the formulas shown unsatisfiable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiaProof {
    /// Refuted formulas with interpolation markers removed
    pub formulas: Vec<Expr>,
    /// Number of cubes refuted
    pub cubes_refuted: usize,
}

/// Counters over the lifetime of a prover
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiaStats {
    pub prove_calls: usize,
    pub cache_hits: usize,
    pub cubes: usize,
    pub unknowns: usize,
    pub extractions: usize,
}

/// Answer of the decision procedure proper
#[derive(Debug, Clone)]
pub(crate) enum Decision {
    Sat(Model),
    Unsat { cubes_refuted: usize },
}

/// Reference prover for quantifier-free linear integer arithmetic
#[derive(Debug, Default)]
pub struct LiaProver {
    config: LiaConfig,
    cache: FxHashMap<String, ProveResult<LiaProof>>,
    stats: LiaStats,
}

impl LiaProver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LiaConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LiaConfig {
        &self.config
    }

    pub fn stats(&self) -> LiaStats {
        self.stats
    }

    /// Drop every cached result of incremental mode
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of results held by the incremental cache
    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    /// Cache a decided query. A full cache is emptied first.
    fn remember(&mut self, key: String, result: &ProveResult<LiaProof>, capacity: usize) {
        if capacity == 0 {
            return;
        }
        if self.cache.len() >= capacity {
            log::debug!("lia: query cache full ({capacity} entries), clearing");
            self.cache.clear();
        }
        self.cache.insert(key, result.clone());
    }
}

/// Cache key of a query
fn query_key(formulas: &[Expr]) -> String {
    formulas
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decide the conjunction of `formulas`
pub(crate) fn decide(formulas: &[Expr], budget: &mut Budget) -> LiaResult<Decision> {
    let conjunction = Expr::and_all(formulas.iter().cloned());
    let nnf = to_nnf(&conjunction)?;

    let mut model = None;
    let mut refuted = 0usize;
    let mut gap: Option<LiaError> = None;

    for_each_cube(&nnf, budget, |cube, budget| {
        match fm::check(&cube.constraints, budget) {
            Ok(FmResult::Unsat) => {
                refuted += 1;
                Ok(Flow::Continue)
            }
            Ok(FmResult::Sat(values)) => {
                model = Some(cube_model(cube, values));
                Ok(Flow::Stop)
            }
            Err(err @ LiaError::IntegerGap { .. }) => {
                log::trace!("cube left undecided: {err}");
                gap.get_or_insert(err);
                Ok(Flow::Continue)
            }
            Err(err) => Err(err),
        }
    })?;

    if let Some(mut model) = model {
        complete_model(&mut model, formulas);
        if let Some(bad) = formulas.iter().find(|f| !model.satisfies(f)) {
            return Err(LiaError::ModelCheck(bad.to_string()));
        }
        return Ok(Decision::Sat(model));
    }
    match gap {
        Some(err) => Err(err),
        None => Ok(Decision::Unsat {
            cubes_refuted: refuted,
        }),
    }
}

fn cube_model(cube: &Cube, values: BTreeMap<String, i64>) -> Model {
    let mut model = Model::new();
    for (name, &value) in &cube.literals {
        model.insert(name.clone(), Value::Bool(value));
    }
    for (name, value) in values {
        model.insert(name, Value::Int(value));
    }
    model
}

/// Assign defaults to symbols the satisfying cube did not constrain
fn complete_model(model: &mut Model, formulas: &[Expr]) {
    for formula in formulas {
        for var in formula.vars() {
            if model.get(&var.name).is_none() {
                let value = match var.sort {
                    Sort::Bool => Value::Bool(false),
                    Sort::Int => Value::Int(0),
                };
                model.insert(var.name, value);
            }
        }
    }
}

impl Prover for LiaProver {
    type Proof = LiaProof;

    fn prove(&mut self, formulas: &[Expr], params: &Params) -> ProveResult<LiaProof> {
        self.stats.prove_calls += 1;
        let config = self.config.with_params(params);
        let incremental = params.get_bool("incremental").unwrap_or(false);

        let key = incremental.then(|| query_key(formulas));
        if let Some(hit) = key.as_ref().and_then(|k| self.cache.get(k)) {
            self.stats.cache_hits += 1;
            log::trace!("lia: cache hit for {} formula(s)", formulas.len());
            return hit.clone();
        }

        let mut budget = Budget::new(&config);
        let result = match decide(formulas, &mut budget) {
            Ok(Decision::Sat(model)) => ProveResult::Sat(model),
            Ok(Decision::Unsat { cubes_refuted }) => ProveResult::Unsat(LiaProof {
                formulas: formulas.iter().map(Expr::strip_interp).collect(),
                cubes_refuted,
            }),
            Err(err) => {
                if err.is_resource_limit() {
                    log::warn!("lia: giving up: {err}");
                } else {
                    log::debug!("lia: undecided: {err}");
                }
                self.stats.unknowns += 1;
                ProveResult::Unknown(err.to_string())
            }
        };
        self.stats.cubes += budget.cubes();

        if let Some(key) = key {
            if !result.is_unknown() {
                self.remember(key, &result, config.max_cache_entries);
            }
        }
        result
    }

    fn extract_interpolants(
        &mut self,
        proof: &LiaProof,
        partition: &Partition<'_>,
        params: &Params,
    ) -> Result<Vec<Expr>, ProverError> {
        self.stats.extractions += 1;
        let config = self.config.with_params(params);
        let mut budget = Budget::new(&config);
        let result = interpolate::tree_interpolants(proof, partition, &mut budget);
        self.stats.cubes += budget.cubes();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craig_core::{parse_expr, Var};

    fn formulas(texts: &[&str]) -> Vec<Expr> {
        let vars = [Var::int("x"), Var::int("y"), Var::bool("p")];
        texts.iter().map(|t| parse_expr(t, &vars).unwrap()).collect()
    }

    #[test]
    fn test_unsat_strict_bounds() {
        let mut prover = LiaProver::new();
        let fs = formulas(&["(> x 0)", "(< x 0)"]);
        let ProveResult::Unsat(proof) = prover.prove(&fs, &Params::new()) else {
            panic!("expected unsat");
        };
        assert_eq!(proof.formulas, fs);
        assert_eq!(proof.cubes_refuted, 1);
    }

    #[test]
    fn test_sat_model_satisfies_inputs() {
        let mut prover = LiaProver::new();
        let fs = formulas(&["(or p (> x 5))", "(not p)", "(< x y)"]);
        let ProveResult::Sat(model) = prover.prove(&fs, &Params::new()) else {
            panic!("expected sat");
        };
        for f in &fs {
            assert!(model.satisfies(f), "{f} not satisfied by {model}");
        }
    }

    #[test]
    fn test_unsat_requires_all_cubes_refuted() {
        let mut prover = LiaProver::new();
        let fs = formulas(&["(or (< x 0) (> x 10))", "(>= x 0)", "(<= x 10)"]);
        let result = prover.prove(&fs, &Params::new());
        let ProveResult::Unsat(proof) = result else {
            panic!("expected unsat, got {result:?}");
        };
        assert_eq!(proof.cubes_refuted, 2);
    }

    #[test]
    fn test_non_linear_is_unknown() {
        let mut prover = LiaProver::new();
        let fs = formulas(&["(= (* x y) 2)"]);
        assert!(prover.prove(&fs, &Params::new()).is_unknown());
        assert_eq!(prover.stats().unknowns, 1);
    }

    #[test]
    fn test_cube_budget_is_unknown() {
        let mut prover = LiaProver::new();
        // The first cube is refuted, the second exceeds the budget
        let fs = formulas(&["(distinct x 0)", "(distinct y 1)", "(= x 0)"]);
        let params = Params::new().with_uint("max_cubes", 1);
        let result = prover.prove(&fs, &params);
        assert!(result.is_unknown(), "got {result:?}");
    }

    #[test]
    fn test_incremental_cache() {
        let mut prover = LiaProver::new();
        let fs = formulas(&["(> x 0)", "(< x 0)"]);
        let params = Params::new().with_bool("incremental", true);
        assert!(prover.prove(&fs, &params).is_unsat());
        assert!(prover.prove(&fs, &params).is_unsat());
        assert_eq!(prover.stats().cache_hits, 1);

        // Non-incremental calls neither read nor fill the cache
        assert!(prover.prove(&fs, &Params::new()).is_unsat());
        assert_eq!(prover.stats().cache_hits, 1);
        assert_eq!(prover.stats().prove_calls, 3);
    }

    #[test]
    fn test_incremental_cache_is_bounded() {
        let mut prover = LiaProver::with_config(LiaConfig {
            max_cache_entries: 2,
            ..LiaConfig::default()
        });
        let params = Params::new().with_bool("incremental", true);
        for k in 0..5 {
            let fs = formulas(&[format!("(> x {k})").as_str(), "(< x 0)"]);
            assert!(prover.prove(&fs, &params).is_unsat());
            assert!(prover.cached_results() <= 2);
        }

        let disabled = Params::new()
            .with_bool("incremental", true)
            .with_uint("max_cache_entries", 0);
        prover.clear_cache();
        assert!(prover.prove(&formulas(&["(> x 0)"]), &disabled).is_sat());
        assert_eq!(prover.cached_results(), 0);
    }

    #[test]
    fn test_markers_are_transparent() {
        let mut prover = LiaProver::new();
        let fs = formulas(&["(and (interp (> x 0)) (< x 0))"]);
        let ProveResult::Unsat(proof) = prover.prove(&fs, &Params::new()) else {
            panic!("expected unsat");
        };
        assert!(!proof.formulas[0].contains_interp());
    }
}
