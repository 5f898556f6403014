//! Integration tests for tree interpolation through the `Prover` interface

use craig_core::{
    parse_expr, sequence_parents, Expr, Params, Partition, ProveResult, Prover, ProverError, Var,
    ROOT,
};
use craig_lia::{LiaConfig, LiaProver};
use std::time::Duration;

fn parse_all(texts: &[&str]) -> Vec<Expr> {
    let vars = [
        Var::int("x"),
        Var::int("y"),
        Var::int("z"),
        Var::int("w"),
        Var::bool("p"),
    ];
    texts.iter().map(|t| parse_expr(t, &vars).unwrap()).collect()
}

fn refute(prover: &mut LiaProver, formulas: &[Expr]) -> craig_lia::LiaProof {
    match prover.prove(formulas, &Params::new()) {
        ProveResult::Unsat(proof) => proof,
        other => panic!("expected unsat, got {other:?}"),
    }
}

#[test]
fn test_sequence_chain() {
    // x = 0, y = x + 1, z = y + 1, z < 2
    let constraints = parse_all(&["(= x 0)", "(= y (+ x 1))", "(= z (+ y 1))", "(< z 2)"]);
    let mut prover = LiaProver::new();
    let proof = refute(&mut prover, &constraints);
    let parents = sequence_parents(constraints.len());
    let partition = Partition::new(&constraints, &parents, &[]);
    let interpolants = prover
        .extract_interpolants(&proof, &partition, &Params::new())
        .unwrap();

    let rendered: Vec<String> = interpolants.iter().map(|i| i.to_string()).collect();
    assert_eq!(rendered.len(), 3);
    assert_eq!(rendered[0], "(and (>= x 0) (<= x 0))");
    assert!(interpolants[1].vars().iter().all(|v| v.name == "y"));
    assert!(interpolants[2].vars().iter().all(|v| v.name == "z"));
}

#[test]
fn test_tree_with_two_leaves() {
    // Leaves 0 and 1 feed node 2, which is the root
    let constraints = parse_all(&["(>= x 5)", "(>= y 5)", "(< (+ x y) 10)"]);
    let parents = [2, 2, ROOT];
    let mut prover = LiaProver::new();
    let proof = refute(&mut prover, &constraints);
    let partition = Partition::new(&constraints, &parents, &[]);
    let interpolants = prover
        .extract_interpolants(&proof, &partition, &Params::new())
        .unwrap();
    assert_eq!(interpolants[0].to_string(), "(>= x 5)");
    assert_eq!(interpolants[1].to_string(), "(>= y 5)");
}

#[test]
fn test_theory_symbols_are_shared() {
    // The axiom links w to x; w may appear in the interpolant
    let constraints = parse_all(&["(> x w)", "(< x 0)"]);
    let theory = parse_all(&["(= w 3)"]);
    let mut all = constraints.clone();
    all.extend(theory.iter().cloned());
    let mut prover = LiaProver::new();
    let proof = refute(&mut prover, &all);
    let parents = [1, ROOT];
    let partition = Partition::new(&constraints, &parents, &theory);
    let interpolants = prover
        .extract_interpolants(&proof, &partition, &Params::new())
        .unwrap();
    assert_eq!(interpolants.len(), 1);
    assert!(interpolants[0]
        .vars()
        .iter()
        .all(|v| v.name == "x" || v.name == "w"));
}

#[test]
fn test_boolean_structure() {
    let constraints = parse_all(&["(and (=> p (> x 0)) p)", "(<= x 0)"]);
    let mut prover = LiaProver::new();
    let proof = refute(&mut prover, &constraints);
    let parents = [1, ROOT];
    let partition = Partition::new(&constraints, &parents, &[]);
    let interpolants = prover
        .extract_interpolants(&proof, &partition, &Params::new())
        .unwrap();
    assert_eq!(interpolants[0].to_string(), "(>= x 1)");
}

#[test]
fn test_single_node_has_no_interpolants() {
    let constraints = parse_all(&["(and (> x 0) (< x 0))"]);
    let mut prover = LiaProver::new();
    let proof = refute(&mut prover, &constraints);
    let parents = [ROOT];
    let partition = Partition::new(&constraints, &parents, &[]);
    let interpolants = prover
        .extract_interpolants(&proof, &partition, &Params::new())
        .unwrap();
    assert!(interpolants.is_empty());
}

#[test]
fn test_invalid_partition_rejected() {
    let constraints = parse_all(&["(> x 0)", "(< x 0)"]);
    let mut prover = LiaProver::new();
    let proof = refute(&mut prover, &constraints);
    let parents = [0, ROOT];
    let partition = Partition::new(&constraints, &parents, &[]);
    let err = prover
        .extract_interpolants(&proof, &partition, &Params::new())
        .unwrap_err();
    assert!(matches!(err, ProverError::InvalidPartition(_)), "{err}");
}

#[test]
fn test_config_defaults_apply() {
    let config = LiaConfig {
        timeout: Some(Duration::from_secs(5)),
        ..LiaConfig::default()
    };
    let mut prover = LiaProver::with_config(config.clone());
    assert_eq!(prover.config(), &config);
    let constraints = parse_all(&["(> x 0)"]);
    assert!(prover.prove(&constraints, &Params::new()).is_sat());
}
