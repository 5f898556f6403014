//! Driver and verifier behavior against scripted provers

use craig_core::{
    Expr, Params, Partition, ProveResult, Prover, ProverError, Var, ROOT,
};
use craig_interp::{InterpError, InterpolationContext, InterpolationProblem, SubCheck};
use craig_lia::{LiaProof, LiaProver};

/// Answers `unsat` to everything and counts the calls
#[derive(Debug, Default)]
struct CountingProver {
    prove_calls: usize,
    extract_calls: usize,
}

impl Prover for CountingProver {
    type Proof = ();

    fn prove(&mut self, _: &[Expr], _: &Params) -> ProveResult<()> {
        self.prove_calls += 1;
        ProveResult::Unsat(())
    }

    fn extract_interpolants(
        &mut self,
        _: &(),
        partition: &Partition<'_>,
        _: &Params,
    ) -> Result<Vec<Expr>, ProverError> {
        self.extract_calls += 1;
        Ok(vec![Expr::Bool(false); partition.len() - 1])
    }
}

/// How `LyingProver` corrupts the interpolants of a real prover
#[derive(Debug, Clone, Copy)]
enum Lie {
    TrueInterpolants,
    MissingInterpolant,
    IntegerInterpolant,
}

/// Decides honestly, lies when extracting
#[derive(Debug)]
struct LyingProver {
    inner: LiaProver,
    lie: Lie,
}

impl Prover for LyingProver {
    type Proof = LiaProof;

    fn prove(&mut self, formulas: &[Expr], params: &Params) -> ProveResult<LiaProof> {
        self.inner.prove(formulas, params)
    }

    fn extract_interpolants(
        &mut self,
        _: &LiaProof,
        partition: &Partition<'_>,
        _: &Params,
    ) -> Result<Vec<Expr>, ProverError> {
        let n = partition.len() - 1;
        Ok(match self.lie {
            Lie::TrueInterpolants => vec![Expr::Bool(true); n],
            Lie::MissingInterpolant => vec![Expr::Bool(true); n.saturating_sub(1)],
            Lie::IntegerInterpolant => vec![Expr::int(1); n],
        })
    }
}

/// Never decides anything
#[derive(Debug)]
struct UnknownProver;

impl Prover for UnknownProver {
    type Proof = ();

    fn prove(&mut self, _: &[Expr], _: &Params) -> ProveResult<()> {
        ProveResult::Unknown("timeout".into())
    }

    fn extract_interpolants(
        &mut self,
        _: &(),
        _: &Partition<'_>,
        _: &Params,
    ) -> Result<Vec<Expr>, ProverError> {
        Err(ProverError::Contract("no proofs to read".into()))
    }
}

fn vars() -> Vec<Var> {
    vec![Var::int("x"), Var::int("y")]
}

#[test]
fn test_invalid_shapes_never_reach_the_prover() {
    let mut ctx = InterpolationContext::new(CountingProver::default());
    let constraints: Vec<_> = ["(> x 0)", "(< x 0)", "(= y x)"]
        .iter()
        .map(|t| ctx.parse_formula(t, &vars()).unwrap())
        .collect();

    let bad_parents = [
        vec![1, ROOT],
        vec![1, ROOT, ROOT],
        vec![0, 2, ROOT],
        vec![1, 2, 0],
        vec![7, 2, ROOT],
    ];
    for parents in bad_parents {
        let problem = InterpolationProblem::tree(constraints.clone(), parents.clone());
        let err = ctx.interpolate(&problem).unwrap_err();
        assert!(
            matches!(err, InterpError::InvalidArgument(_)),
            "{parents:?}: {err}"
        );
    }
    let empty = InterpolationProblem::sequence(Vec::new());
    assert!(matches!(
        ctx.interpolate(&empty),
        Err(InterpError::InvalidArgument(_))
    ));

    // Non-Boolean constraint
    let term = ctx.parse_formula("(+ x 1)", &vars()).unwrap();
    let problem = InterpolationProblem::sequence(vec![constraints[0].clone(), term]);
    assert!(matches!(
        ctx.interpolate(&problem),
        Err(InterpError::InvalidArgument(_))
    ));

    // Verifier preconditions
    let interpolant = ctx.parse_formula("(>= x 0)", &vars()).unwrap();
    let err = ctx
        .check_interpolant(&constraints, &[1, 2, ROOT], &[interpolant], &[])
        .unwrap_err();
    assert!(matches!(err, InterpError::InvalidArgument(_)), "{err}");

    assert_eq!(ctx.prover().prove_calls, 0);
    assert_eq!(ctx.profile().prover_calls, 0);
    assert_eq!(ctx.profile().interpolate_calls, 7);
}

#[test]
fn test_valid_problem_calls_prover_once() {
    let mut ctx = InterpolationContext::new(CountingProver::default());
    let constraints: Vec<_> = ["(> x 0)", "(< x 0)"]
        .iter()
        .map(|t| ctx.parse_formula(t, &vars()).unwrap())
        .collect();
    let outcome = ctx
        .interpolate(&InterpolationProblem::sequence(constraints))
        .unwrap();
    assert_eq!(outcome.interpolants().map(<[_]>::len), Some(1));
    assert_eq!(ctx.prover().prove_calls, 1);
    assert_eq!(ctx.prover().extract_calls, 1);
}

fn lying_context(lie: Lie) -> InterpolationContext<LyingProver> {
    InterpolationContext::new(LyingProver {
        inner: LiaProver::new(),
        lie,
    })
}

#[test]
fn test_verifier_catches_wrong_interpolants() {
    let mut ctx = lying_context(Lie::TrueInterpolants);
    let constraints: Vec<_> = ["(> x 0)", "(< x 0)"]
        .iter()
        .map(|t| ctx.parse_formula(t, &vars()).unwrap())
        .collect();
    let problem = InterpolationProblem::sequence(constraints.clone());
    let outcome = ctx.interpolate(&problem).unwrap();
    let interpolants = outcome.interpolants().unwrap().to_vec();
    assert_eq!(interpolants[0].to_string(), "true");

    let report = ctx
        .check_interpolant(&constraints, &problem.parents, &interpolants, &[])
        .unwrap();
    assert!(!report.ok);
    let failure = report.failure.unwrap();
    assert_eq!(failure.check, SubCheck::UnsatisfiabilityOut);
    assert_eq!(failure.parent, None);
    assert!(report.diagnostic.unwrap().starts_with("root 1"));
}

#[test]
fn test_wrong_interpolant_count_is_a_contract_error() {
    for lie in [Lie::MissingInterpolant, Lie::IntegerInterpolant] {
        let mut ctx = lying_context(lie);
        let constraints: Vec<_> = ["(> x 0)", "(< x 0)"]
            .iter()
            .map(|t| ctx.parse_formula(t, &vars()).unwrap())
            .collect();
        let err = ctx
            .interpolate(&InterpolationProblem::sequence(constraints))
            .unwrap_err();
        assert!(
            matches!(err, InterpError::Prover(ProverError::Contract(_))),
            "{lie:?}: {err}"
        );
    }
}

#[test]
fn test_unknown_is_never_a_verdict() {
    let mut ctx = InterpolationContext::new(UnknownProver);
    let constraints: Vec<_> = ["(> x 0)", "(< x 0)"]
        .iter()
        .map(|t| ctx.parse_formula(t, &vars()).unwrap())
        .collect();
    let problem = InterpolationProblem::sequence(constraints.clone());
    let err = ctx.interpolate(&problem).unwrap_err();
    assert!(matches!(&err, InterpError::ProverUnknown(r) if r == "timeout"), "{err}");

    let pattern = ctx.mark(&constraints[0]).unwrap();
    let err = ctx.compute_interpolant(&pattern, &Params::new()).unwrap_err();
    assert!(matches!(err, InterpError::ProverUnknown(_)), "{err}");

    let interpolant = ctx.parse_formula("(>= x 0)", &vars()).unwrap();
    let err = ctx
        .check_interpolant(&constraints, &problem.parents, &[interpolant], &[])
        .unwrap_err();
    assert!(matches!(err, InterpError::ProverUnknown(_)), "{err}");
}
