//! Interpolation problem representation

use crate::context::Formula;
use crate::error::{InterpError, InterpResult};
use craig_core::{sequence_parents, Forest, Params};

/// A batch interpolation request: constraints arranged in a tree, plus
/// background axioms visible to every node.
#[derive(Debug, Clone)]
pub struct InterpolationProblem {
    /// One formula per tree node
    pub constraints: Vec<Formula>,
    /// `parents[i]` is the parent of constraint `i`, or [`craig_core::ROOT`]
    pub parents: Vec<u32>,
    /// Background axioms; not partitions
    pub theory: Vec<Formula>,
    /// Whether the prover may reuse state across related calls
    pub incremental: bool,
    /// Forwarded to the prover untouched
    pub params: Params,
}

impl InterpolationProblem {
    /// Key under which `incremental` is forwarded to the prover
    pub const INCREMENTAL: &'static str = "incremental";

    pub fn new(constraints: Vec<Formula>, parents: Vec<u32>) -> Self {
        Self {
            constraints,
            parents,
            theory: Vec::new(),
            incremental: false,
            params: Params::new(),
        }
    }

    /// Sequence `F0, ..., Fn-1`: each constraint's parent is the next one,
    /// the last is the root
    pub fn sequence(constraints: Vec<Formula>) -> Self {
        let parents = sequence_parents(constraints.len());
        Self::new(constraints, parents)
    }

    /// Tree shaped by an explicit parent array
    pub fn tree(constraints: Vec<Formula>, parents: Vec<u32>) -> Self {
        Self::new(constraints, parents)
    }

    pub fn with_theory(mut self, theory: Vec<Formula>) -> Self {
        self.theory = theory;
        self
    }

    pub fn with_incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Check the shape: matching lengths and a single-rooted forest
    pub fn validate(&self) -> InterpResult<Forest> {
        if self.constraints.is_empty() {
            return Err(InterpError::invalid(
                "an interpolation problem needs at least one constraint",
            ));
        }
        Ok(Forest::for_constraints(self.constraints.len(), &self.parents)?)
    }

    /// Parameters sent to the prover, with the incremental flag applied
    pub fn prover_params(&self) -> Params {
        let mut params = self.params.clone();
        params.set_bool(Self::INCREMENTAL, self.incremental);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InterpolationContext;
    use craig_core::{Expr, Partition, ProveResult, Prover, ProverError, Var, ROOT};

    #[derive(Debug)]
    struct NoProver;

    impl Prover for NoProver {
        type Proof = ();

        fn prove(&mut self, _: &[Expr], _: &Params) -> ProveResult<()> {
            ProveResult::Unknown(String::new())
        }

        fn extract_interpolants(
            &mut self,
            _: &(),
            _: &Partition<'_>,
            _: &Params,
        ) -> Result<Vec<Expr>, ProverError> {
            Ok(Vec::new())
        }
    }

    fn formulas(n: usize) -> Vec<Formula> {
        let ctx = InterpolationContext::new(NoProver);
        let x = [Var::int("x")];
        (0..n)
            .map(|i| ctx.parse_formula(&format!("(> x {i})"), &x).unwrap())
            .collect()
    }

    #[test]
    fn test_sequence_shape() {
        let problem = InterpolationProblem::sequence(formulas(3));
        assert_eq!(problem.parents, vec![1, 2, ROOT]);
        let forest = problem.validate().unwrap();
        assert_eq!(forest.root(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let bad = [
            vec![1, ROOT, ROOT],
            vec![0, ROOT, 1],
            vec![5, ROOT, 1],
            vec![1, 2, 0],
            vec![1, ROOT],
        ];
        for parents in bad {
            let problem = InterpolationProblem::tree(formulas(3), parents.clone());
            assert!(
                matches!(problem.validate(), Err(InterpError::InvalidArgument(_))),
                "accepted {parents:?}"
            );
        }
        let empty = InterpolationProblem::sequence(Vec::new());
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_prover_params_carry_incremental() {
        let problem = InterpolationProblem::sequence(formulas(1))
            .with_params(Params::new().with_uint("timeout", 100))
            .with_incremental(true);
        let params = problem.prover_params();
        assert_eq!(params.get_bool("incremental"), Some(true));
        assert_eq!(params.get_uint("timeout"), Some(100));
        // The problem itself is untouched
        assert_eq!(problem.params.get_bool("incremental"), None);
    }
}
