//! Linear integer terms and constraints

use crate::error::{LiaError, LiaResult};
use craig_core::{Expr, Op, Sort};
use num_integer::Integer;
use std::collections::BTreeMap;
use std::fmt;

/// A linear expression: c0 + c1*x1 + c2*x2 + ... with integer coefficients.
/// Zero coefficients are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinearExpr {
    /// Coefficients for symbols (symbol name -> coefficient)
    pub coeffs: BTreeMap<String, i64>,
    /// Constant term
    pub constant: i64,
}

impl LinearExpr {
    pub fn constant(c: i64) -> Self {
        Self {
            coeffs: BTreeMap::new(),
            constant: c,
        }
    }

    /// A symbol with coefficient 1
    pub fn var(name: impl Into<String>) -> Self {
        let mut coeffs = BTreeMap::new();
        coeffs.insert(name.into(), 1);
        Self {
            coeffs,
            constant: 0,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn coeff(&self, var: &str) -> i64 {
        self.coeffs.get(var).copied().unwrap_or(0)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.coeffs.keys().map(String::as_str)
    }

    pub fn add(&self, other: &Self) -> LiaResult<Self> {
        let mut result = self.clone();
        result.constant = checked(self.constant.checked_add(other.constant))?;
        for (var, &coeff) in &other.coeffs {
            let sum = checked(result.coeff(var).checked_add(coeff))?;
            if sum == 0 {
                result.coeffs.remove(var);
            } else {
                result.coeffs.insert(var.clone(), sum);
            }
        }
        Ok(result)
    }

    /// self - other
    pub fn sub(&self, other: &Self) -> LiaResult<Self> {
        self.add(&other.scale(-1)?)
    }

    pub fn scale(&self, k: i64) -> LiaResult<Self> {
        if k == 0 {
            return Ok(Self::constant(0));
        }
        let mut coeffs = BTreeMap::new();
        for (var, &coeff) in &self.coeffs {
            coeffs.insert(var.clone(), checked(coeff.checked_mul(k))?);
        }
        Ok(Self {
            coeffs,
            constant: checked(self.constant.checked_mul(k))?,
        })
    }

    /// Value of the expression with `skip` left out, every other symbol
    /// read from `values` (absent symbols count as 0)
    pub fn eval_without(&self, skip: &str, values: &BTreeMap<String, i64>) -> LiaResult<i64> {
        let mut acc = self.constant;
        for (var, &coeff) in &self.coeffs {
            if var == skip {
                continue;
            }
            let value = values.get(var).copied().unwrap_or(0);
            acc = checked(acc.checked_add(checked(coeff.checked_mul(value))?))?;
        }
        Ok(acc)
    }
}

fn checked(value: Option<i64>) -> LiaResult<i64> {
    value.ok_or(LiaError::Overflow)
}

/// Translate an integer term into a linear expression.
///
/// Integer `ite` must have been lifted out beforehand.
pub fn linearize(term: &Expr) -> LiaResult<LinearExpr> {
    match term {
        Expr::Int(n) => Ok(LinearExpr::constant(*n)),
        Expr::Var(v) if v.sort == Sort::Int => Ok(LinearExpr::var(v.name.clone())),
        Expr::Op(Op::Add, args) => args
            .iter()
            .try_fold(LinearExpr::default(), |acc, a| acc.add(&linearize(a)?)),
        Expr::Op(Op::Sub, args) => match args.split_first() {
            Some((only, [])) => linearize(only)?.scale(-1),
            Some((first, rest)) => rest
                .iter()
                .try_fold(linearize(first)?, |acc, a| acc.sub(&linearize(a)?)),
            None => Err(LiaError::Unsupported(term.to_string())),
        },
        Expr::Op(Op::Neg, args) if args.len() == 1 => linearize(&args[0])?.scale(-1),
        Expr::Op(Op::Mul, args) => {
            let mut acc = LinearExpr::constant(1);
            for arg in args {
                let factor = linearize(arg)?;
                acc = if acc.is_constant() {
                    factor.scale(acc.constant)?
                } else if factor.is_constant() {
                    acc.scale(factor.constant)?
                } else {
                    return Err(LiaError::NonLinear(term.to_string()));
                };
            }
            Ok(acc)
        }
        _ => Err(LiaError::Unsupported(format!("not a linear integer term: {term}"))),
    }
}

/// A linear constraint `expr <= 0`, kept tightened: the coefficients are
/// coprime and the constant is rounded up accordingly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constraint {
    expr: LinearExpr,
}

impl Constraint {
    /// `expr <= 0`, tightened over the integers
    pub fn le(expr: LinearExpr) -> LiaResult<Self> {
        let g = expr
            .coeffs
            .values()
            .fold(0i64, |g, &c| num_integer::gcd(g, c));
        if g <= 1 {
            return Ok(Self { expr });
        }
        // sum (a/g) x <= -c/g  tightens to  sum (a/g) x + ceil(c/g) <= 0
        let coeffs = expr
            .coeffs
            .into_iter()
            .map(|(v, c)| (v, c / g))
            .collect();
        let neg_constant = checked(expr.constant.checked_neg())?;
        let constant = checked(neg_constant.div_floor(&g).checked_neg())?;
        Ok(Self {
            expr: LinearExpr { coeffs, constant },
        })
    }

    /// `lhs <= rhs`
    pub fn le_terms(lhs: &LinearExpr, rhs: &LinearExpr) -> LiaResult<Self> {
        Self::le(lhs.sub(rhs)?)
    }

    /// `lhs < rhs`, i.e. `lhs - rhs + 1 <= 0`
    pub fn lt_terms(lhs: &LinearExpr, rhs: &LinearExpr) -> LiaResult<Self> {
        Self::le(lhs.sub(rhs)?.add(&LinearExpr::constant(1))?)
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn coeff(&self, var: &str) -> i64 {
        self.expr.coeff(var)
    }

    pub fn is_trivially_true(&self) -> bool {
        self.expr.is_constant() && self.expr.constant <= 0
    }

    pub fn is_trivially_false(&self) -> bool {
        self.expr.is_constant() && self.expr.constant > 0
    }

    /// Render back into a formula over Int symbols
    pub fn to_expr(&self) -> Expr {
        let e = &self.expr;
        if e.is_constant() {
            return Expr::Bool(e.constant <= 0);
        }
        let bound = Expr::int(e.constant.saturating_neg());
        if e.coeffs.len() == 1 {
            if let Some((var, &coeff)) = e.coeffs.iter().next() {
                match coeff {
                    1 => return Expr::le(Expr::int_var(var.clone()), bound),
                    -1 => return Expr::ge(Expr::int_var(var.clone()), Expr::int(e.constant)),
                    _ => {}
                }
            }
        }
        let terms = e.coeffs.iter().map(|(var, &coeff)| {
            let x = Expr::int_var(var.clone());
            if coeff == 1 {
                x
            } else {
                Expr::mul(Expr::int(coeff), x)
            }
        });
        let sum = {
            let mut terms: Vec<Expr> = terms.collect();
            if terms.len() == 1 {
                terms.swap_remove(0)
            } else {
                Expr::app(Op::Add, terms)
            }
        };
        Expr::le(sum, bound)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_expr())
    }
}
