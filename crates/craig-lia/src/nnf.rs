//! Negation normal form and lazy case splitting
//!
//! Formulas are pushed into NNF over Boolean literals and conjunctions of
//! linear constraints. Integer `ite` terms are lifted out of atoms first.
//! Cubes (conjunctions of literals and constraints) are then enumerated one
//! at a time, pruning branches with clashing Boolean literals.

use crate::config::Budget;
use crate::error::{LiaError, LiaResult};
use crate::linear::{linearize, Constraint};
use craig_core::{Expr, Op, Sort};
use std::collections::BTreeMap;

/// Formula in negation normal form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nnf {
    True,
    False,
    /// Boolean symbol with polarity
    Lit(String, bool),
    /// Conjunction of linear constraints
    Atom(Vec<Constraint>),
    And(Vec<Nnf>),
    Or(Vec<Nnf>),
}

impl Nnf {
    fn and(args: Vec<Nnf>) -> Nnf {
        let mut out = Vec::with_capacity(args.len());
        for a in args {
            match a {
                Nnf::True => {}
                Nnf::False => return Nnf::False,
                Nnf::And(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Nnf::True,
            1 => out.swap_remove(0),
            _ => Nnf::And(out),
        }
    }

    fn or(args: Vec<Nnf>) -> Nnf {
        let mut out = Vec::with_capacity(args.len());
        for a in args {
            match a {
                Nnf::False => {}
                Nnf::True => return Nnf::True,
                Nnf::Or(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Nnf::False,
            1 => out.swap_remove(0),
            _ => Nnf::Or(out),
        }
    }

    fn atom(constraints: Vec<Constraint>) -> Nnf {
        if constraints.iter().any(Constraint::is_trivially_false) {
            return Nnf::False;
        }
        let kept: Vec<Constraint> = constraints
            .into_iter()
            .filter(|c| !c.is_trivially_true())
            .collect();
        if kept.is_empty() {
            Nnf::True
        } else {
            Nnf::Atom(kept)
        }
    }
}

/// Convert a Boolean formula to NNF. Interpolation markers are transparent.
pub fn to_nnf(formula: &Expr) -> LiaResult<Nnf> {
    convert(formula, true)
}

fn convert(e: &Expr, positive: bool) -> LiaResult<Nnf> {
    match e {
        Expr::Bool(b) => Ok(if *b == positive { Nnf::True } else { Nnf::False }),
        Expr::Var(v) if v.sort == Sort::Bool => Ok(Nnf::Lit(v.name.clone(), positive)),
        Expr::Op(op, args) => match (op, args.as_slice()) {
            (Op::Not, [a]) => convert(a, !positive),
            (Op::Interp, [a]) => convert(a, positive),
            (Op::And, _) | (Op::Or, _) => {
                let parts = args
                    .iter()
                    .map(|a| convert(a, positive))
                    .collect::<LiaResult<Vec<_>>>()?;
                // De Morgan: a negated conjunction is a disjunction
                if (*op == Op::And) == positive {
                    Ok(Nnf::and(parts))
                } else {
                    Ok(Nnf::or(parts))
                }
            }
            (Op::Implies, [a, b]) => {
                if positive {
                    Ok(Nnf::or(vec![convert(a, false)?, convert(b, true)?]))
                } else {
                    Ok(Nnf::and(vec![convert(a, true)?, convert(b, false)?]))
                }
            }
            (Op::Eq | Op::Ne, [a, b]) if a.sort() == Sort::Bool => {
                // iff when (op is Eq) agrees with polarity, xor otherwise
                let iff = (*op == Op::Eq) == positive;
                Ok(Nnf::or(vec![
                    Nnf::and(vec![convert(a, true)?, convert(b, iff)?]),
                    Nnf::and(vec![convert(a, false)?, convert(b, !iff)?]),
                ]))
            }
            (Op::Ite, [c, t, f]) if t.sort() == Sort::Bool => Ok(Nnf::or(vec![
                Nnf::and(vec![convert(c, true)?, convert(t, positive)?]),
                Nnf::and(vec![convert(c, false)?, convert(f, positive)?]),
            ])),
            (Op::Eq | Op::Ne | Op::Lt | Op::Le | Op::Gt | Op::Ge, [a, b]) => {
                if let Some(ite) = find_int_ite(e) {
                    return convert(&lift_ite(e, &ite), positive);
                }
                let op = if positive { *op } else { negate(*op) };
                arithmetic_atom(op, a, b)
            }
            _ => Err(LiaError::Unsupported(format!("not a formula: {e}"))),
        },
        _ => Err(LiaError::Unsupported(format!("not a formula: {e}"))),
    }
}

fn negate(op: Op) -> Op {
    match op {
        Op::Lt => Op::Ge,
        Op::Le => Op::Gt,
        Op::Gt => Op::Le,
        Op::Ge => Op::Lt,
        Op::Eq => Op::Ne,
        Op::Ne => Op::Eq,
        other => other,
    }
}

fn arithmetic_atom(op: Op, a: &Expr, b: &Expr) -> LiaResult<Nnf> {
    let lhs = linearize(a)?;
    let rhs = linearize(b)?;
    let nnf = match op {
        Op::Le => Nnf::atom(vec![Constraint::le_terms(&lhs, &rhs)?]),
        Op::Lt => Nnf::atom(vec![Constraint::lt_terms(&lhs, &rhs)?]),
        Op::Ge => Nnf::atom(vec![Constraint::le_terms(&rhs, &lhs)?]),
        Op::Gt => Nnf::atom(vec![Constraint::lt_terms(&rhs, &lhs)?]),
        Op::Eq => Nnf::atom(vec![
            Constraint::le_terms(&lhs, &rhs)?,
            Constraint::le_terms(&rhs, &lhs)?,
        ]),
        Op::Ne => Nnf::or(vec![
            Nnf::atom(vec![Constraint::lt_terms(&lhs, &rhs)?]),
            Nnf::atom(vec![Constraint::lt_terms(&rhs, &lhs)?]),
        ]),
        _ => return Err(LiaError::Unsupported(format!("comparison {}", op.symbol()))),
    };
    Ok(nnf)
}

/// First integer-sorted `ite` below an atom
fn find_int_ite(e: &Expr) -> Option<Expr> {
    let Expr::Op(_, args) = e else {
        return None;
    };
    for arg in args {
        if let Expr::Op(Op::Ite, branches) = arg.as_ref() {
            if branches.len() == 3 && arg.sort() == Sort::Int {
                return Some(arg.as_ref().clone());
            }
        }
        if let Some(found) = find_int_ite(arg) {
            return Some(found);
        }
    }
    None
}

/// `atom[ite(c, t, f)]`  becomes  `(c and atom[t]) or (not c and atom[f])`
fn lift_ite(atom: &Expr, ite: &Expr) -> Expr {
    let Expr::Op(_, branches) = ite else {
        return atom.clone();
    };
    let (c, t, f) = (&branches[0], &branches[1], &branches[2]);
    Expr::or(
        Expr::and(c.as_ref().clone(), atom.replace(ite, t)),
        Expr::and(Expr::not(c.as_ref().clone()), atom.replace(ite, f)),
    )
}

/// A conjunction of Boolean literals and linear constraints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cube {
    pub literals: BTreeMap<String, bool>,
    pub constraints: Vec<Constraint>,
}

/// Whether cube enumeration should go on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Enumerate the cubes of `formula` depth-first, handing each complete
/// cube to `visit`. Cubes with clashing literals are never produced.
pub(crate) fn for_each_cube<F>(formula: &Nnf, budget: &mut Budget, mut visit: F) -> LiaResult<Flow>
where
    F: FnMut(&Cube, &mut Budget) -> LiaResult<Flow>,
{
    walk(vec![formula], Cube::default(), budget, &mut visit)
}

fn walk<'n, F>(
    mut todo: Vec<&'n Nnf>,
    mut cube: Cube,
    budget: &mut Budget,
    visit: &mut F,
) -> LiaResult<Flow>
where
    F: FnMut(&Cube, &mut Budget) -> LiaResult<Flow>,
{
    while let Some(node) = todo.pop() {
        match node {
            Nnf::True => {}
            Nnf::False => return Ok(Flow::Continue),
            Nnf::Lit(name, value) => match cube.literals.get(name) {
                Some(existing) if existing != value => return Ok(Flow::Continue),
                Some(_) => {}
                None => {
                    cube.literals.insert(name.clone(), *value);
                }
            },
            Nnf::Atom(cs) => cube.constraints.extend(cs.iter().cloned()),
            Nnf::And(args) => todo.extend(args.iter()),
            Nnf::Or(args) => {
                for arg in args {
                    let mut branch = todo.clone();
                    branch.push(arg);
                    if walk(branch, cube.clone(), budget, visit)? == Flow::Stop {
                        return Ok(Flow::Stop);
                    }
                }
                return Ok(Flow::Continue);
            }
        }
    }
    budget.count_cube()?;
    visit(&cube, budget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LiaConfig;
    use craig_core::{parse_expr, Var};

    fn nnf(text: &str) -> Nnf {
        let vars = [Var::int("x"), Var::int("y"), Var::bool("p"), Var::bool("q")];
        to_nnf(&parse_expr(text, &vars).unwrap()).unwrap()
    }

    fn cubes(formula: &Nnf) -> Vec<Cube> {
        let mut budget = Budget::new(&LiaConfig::default());
        let mut out = Vec::new();
        for_each_cube(formula, &mut budget, |cube, _| {
            out.push(cube.clone());
            Ok(Flow::Continue)
        })
        .unwrap();
        out
    }

    #[test]
    fn test_negation_pushed_to_literals() {
        assert_eq!(
            nnf("(not (and p (not q)))"),
            Nnf::Or(vec![
                Nnf::Lit("p".into(), false),
                Nnf::Lit("q".into(), true)
            ])
        );
    }

    #[test]
    fn test_constant_atoms_fold() {
        assert_eq!(nnf("(< 1 2)"), Nnf::True);
        assert_eq!(nnf("(and p (> 0 1))"), Nnf::False);
    }

    #[test]
    fn test_distinct_splits_into_two_cubes() {
        let f = nnf("(distinct x y)");
        assert_eq!(cubes(&f).len(), 2);
        let f = nnf("(not (= x y))");
        assert_eq!(cubes(&f).len(), 2);
    }

    #[test]
    fn test_clashing_literals_pruned() {
        let f = nnf("(and (or p q) (not p))");
        let all = cubes(&f);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].literals.get("q"), Some(&true));
        assert_eq!(all[0].literals.get("p"), Some(&false));
    }

    #[test]
    fn test_int_ite_lifted() {
        let f = nnf("(> (ite p x y) 0)");
        let all = cubes(&f);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].literals.get("p"), Some(&true));
        assert_eq!(all[0].constraints[0].to_string(), "(>= x 1)");
        assert_eq!(all[1].literals.get("p"), Some(&false));
        assert_eq!(all[1].constraints[0].to_string(), "(>= y 1)");
    }

    #[test]
    fn test_cube_limit() {
        let f = nnf("(and (or p q) (or (< x 0) (> x 0)))");
        let config = LiaConfig {
            max_cubes: 3,
            ..LiaConfig::default()
        };
        let mut budget = Budget::new(&config);
        let result = for_each_cube(&f, &mut budget, |_, _| Ok(Flow::Continue));
        assert_eq!(result, Err(LiaError::CubeLimit(3)));
    }

    #[test]
    fn test_non_linear_rejected() {
        let vars = [Var::int("x"), Var::int("y")];
        let e = parse_expr("(= (* x y) 1)", &vars).unwrap();
        assert!(matches!(to_nnf(&e), Err(LiaError::NonLinear(_))));
    }
}
