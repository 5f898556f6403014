//! Property-based tests for the reference prover.
//!
//! Random formulas over small integer boxes are cross-checked against
//! brute-force enumeration of the box. The prover may answer unknown, but
//! a definite answer must agree with the enumeration, and extracted
//! interpolants must satisfy the Craig conditions on every point of the box.

use craig_core::{Expr, Model, Op, Params, Partition, ProveResult, Prover, Value, ROOT};
use craig_lia::LiaProver;
use proptest::prelude::*;

const BOX: i64 = 3;

fn linear_term(vars: &'static [&'static str]) -> impl Strategy<Value = Expr> {
    (
        prop::collection::vec((-2i64..=2, prop::sample::select(vars)), 1..=2),
        -4i64..=4,
    )
        .prop_map(|(terms, k)| {
            let mut args: Vec<Expr> = terms
                .into_iter()
                .map(|(c, v)| Expr::mul(Expr::int(c), Expr::int_var(v)))
                .collect();
            args.push(Expr::int(k));
            Expr::app(Op::Add, args)
        })
}

fn formula(vars: &'static [&'static str]) -> impl Strategy<Value = Expr> {
    let atom = (linear_term(vars), 0usize..5).prop_map(|(t, op)| {
        let zero = Expr::int(0);
        match op {
            0 => Expr::le(t, zero),
            1 => Expr::lt(t, zero),
            2 => Expr::eq(t, zero),
            3 => Expr::ne(t, zero),
            _ => Expr::ge(t, zero),
        }
    });
    atom.prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|a| Expr::app(Op::Not, vec![a])),
            prop::collection::vec(inner.clone(), 2..=3).prop_map(|a| Expr::app(Op::And, a)),
            prop::collection::vec(inner, 2..=3).prop_map(|a| Expr::app(Op::Or, a)),
        ]
    })
}

fn in_box(vars: &[&str]) -> Expr {
    Expr::and_all(vars.iter().flat_map(|v| {
        [
            Expr::ge(Expr::int_var(*v), Expr::int(-BOX)),
            Expr::le(Expr::int_var(*v), Expr::int(BOX)),
        ]
    }))
}

fn points(vars: &[&str]) -> Vec<Model> {
    let mut models = vec![Model::new()];
    for v in vars {
        models = models
            .into_iter()
            .flat_map(|m| {
                (-BOX..=BOX).map(move |value| {
                    let mut m = m.clone();
                    m.insert(*v, Value::Int(value));
                    m
                })
            })
            .collect();
    }
    models
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        max_shrink_iters: 0,
        .. ProptestConfig::default()
    })]

    #[test]
    fn proptest_prove_agrees_with_enumeration(f in formula(&["x", "y"])) {
        let query = vec![in_box(&["x", "y"]), f];
        let expected_sat = points(&["x", "y"])
            .iter()
            .any(|m| query.iter().all(|q| m.satisfies(q)));

        let mut prover = LiaProver::new();
        match prover.prove(&query, &Params::new()) {
            ProveResult::Sat(model) => {
                prop_assert!(expected_sat, "SAT claimed but the box has no solution");
                for q in &query {
                    prop_assert!(model.satisfies(q));
                }
            }
            ProveResult::Unsat(_) => {
                prop_assert!(!expected_sat, "UNSOUND: UNSAT claimed but the box has a solution");
            }
            ProveResult::Unknown(_) => {}
        }
    }

    #[test]
    fn proptest_binary_interpolants_are_craig(
        a in formula(&["x", "y"]),
        b in formula(&["y", "z"]),
    ) {
        let constraints = vec![
            Expr::and(in_box(&["x", "y"]), a),
            Expr::and(in_box(&["y", "z"]), b),
        ];
        let parents = [1, ROOT];

        let mut prover = LiaProver::new();
        let ProveResult::Unsat(proof) = prover.prove(&constraints, &Params::new()) else {
            return Ok(());
        };
        let partition = Partition::new(&constraints, &parents, &[]);
        let Ok(interpolants) = prover.extract_interpolants(&proof, &partition, &Params::new()) else {
            return Ok(());
        };
        prop_assert_eq!(interpolants.len(), 1);
        let i = &interpolants[0];

        for var in i.vars() {
            prop_assert_eq!(var.name.as_str(), "y", "interpolant {} leaks {}", i, var.name);
        }
        for m in points(&["x", "y", "z"]) {
            if m.satisfies(&constraints[0]) {
                prop_assert!(m.satisfies(i), "A does not imply {} at {}", i, m);
            }
            if m.satisfies(&constraints[1]) {
                prop_assert!(!m.satisfies(i), "{} and B overlap at {}", i, m);
            }
        }
    }
}
