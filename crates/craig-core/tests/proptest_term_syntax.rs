//! Property-based tests for the SMT-LIB term syntax.
//!
//! Random well-sorted formulas over a fixed signature are printed, parsed
//! back and printed again. The second print must equal the first, and the
//! parsed formula must evaluate like the original under random models.

use craig_core::{parse_expr, Expr, Model, Op, Value, Var};
use proptest::prelude::*;

fn signature() -> Vec<Var> {
    vec![
        Var::int("x"),
        Var::int("y"),
        Var::int("z"),
        Var::bool("p"),
        Var::bool("q"),
    ]
}

fn int_term() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        (-20i64..20).prop_map(Expr::int),
        prop_oneof![Just("x"), Just("y"), Just("z")].prop_map(Expr::int_var),
    ];
    leaf.prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..=3).prop_map(|a| Expr::app(Op::Add, a)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::sub(a, b)),
            (-3i64..=3, inner.clone()).prop_map(|(k, a)| Expr::mul(Expr::int(k), a)),
            inner.prop_map(Expr::neg),
        ]
    })
}

fn formula() -> impl Strategy<Value = Expr> {
    let atom = prop_oneof![
        prop_oneof![Just("p"), Just("q")].prop_map(Expr::bool_var),
        (int_term(), int_term()).prop_map(|(a, b)| Expr::le(a, b)),
        (int_term(), int_term()).prop_map(|(a, b)| Expr::lt(a, b)),
        (int_term(), int_term()).prop_map(|(a, b)| Expr::eq(a, b)),
        (int_term(), int_term()).prop_map(|(a, b)| Expr::ne(a, b)),
    ];
    atom.prop_recursive(3, 32, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|a| Expr::app(Op::Not, vec![a])),
            prop::collection::vec(inner.clone(), 2..=3).prop_map(|a| Expr::app(Op::And, a)),
            prop::collection::vec(inner.clone(), 2..=3).prop_map(|a| Expr::app(Op::Or, a)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::implies(a, b)),
            inner.prop_map(Expr::interp),
        ]
    })
}

fn model() -> impl Strategy<Value = Model> {
    (-5i64..5, -5i64..5, -5i64..5, any::<bool>(), any::<bool>()).prop_map(|(x, y, z, p, q)| {
        let mut m = Model::new();
        m.insert("x", Value::Int(x));
        m.insert("y", Value::Int(y));
        m.insert("z", Value::Int(z));
        m.insert("p", Value::Bool(p));
        m.insert("q", Value::Bool(q));
        m
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn proptest_print_parse_print_is_stable(f in formula()) {
        let printed = f.to_string();
        let parsed = parse_expr(&printed, &signature()).unwrap();
        prop_assert_eq!(parsed.to_string(), printed);
    }

    #[test]
    fn proptest_parsed_formula_evaluates_like_original(f in formula(), m in model()) {
        let parsed = parse_expr(&f.to_string(), &signature()).unwrap();
        prop_assert_eq!(m.eval(&parsed), m.eval(&f));
    }
}
