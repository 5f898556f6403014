//! Expression types for interpolation formulas

// These constructors build AST nodes, not perform operations.
// Implementing std::ops traits would be semantically incorrect.
#![allow(clippy::should_implement_trait)]

use crate::error::SortError;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Sort (type) of expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sort {
    Bool,
    Int,
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::Int => write!(f, "Int"),
        }
    }
}

/// A free symbol (uninterpreted constant) of a formula
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var {
    pub name: String,
    pub sort: Sort,
}

impl Var {
    pub fn new(name: impl Into<String>, sort: Sort) -> Self {
        Self {
            name: name.into(),
            sort,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, Sort::Int)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, Sort::Bool)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_symbol(f, &self.name)
    }
}

/// Operations in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // Boolean operations
    Not,
    And,
    Or,
    Implies,

    // Comparisons (`Eq`/`Ne` over Bool are iff/xor)
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Arithmetic operations
    Add,
    Sub,
    Mul,
    Neg,

    // Conditional
    Ite,

    /// Interpolation cut-point marker; transparent for satisfiability
    Interp,
}

impl Op {
    /// SMT-LIB spelling of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Not => "not",
            Op::And => "and",
            Op::Or => "or",
            Op::Implies => "=>",
            Op::Eq => "=",
            Op::Ne => "distinct",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Add => "+",
            Op::Sub | Op::Neg => "-",
            Op::Mul => "*",
            Op::Ite => "ite",
            Op::Interp => "interp",
        }
    }

    /// Is this one of the integer comparison operators
    pub fn is_comparison(self) -> bool {
        matches!(self, Op::Lt | Op::Le | Op::Gt | Op::Ge)
    }
}

/// Formula / term expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Boolean constant
    Bool(bool),
    /// Integer constant
    Int(i64),
    /// Symbol reference
    Var(Var),
    /// Operation application
    Op(Op, Vec<Arc<Expr>>),
}

impl Expr {
    // Convenience constructors

    pub fn bool_const(b: bool) -> Self {
        Expr::Bool(b)
    }

    pub fn int(n: i64) -> Self {
        Expr::Int(n)
    }

    pub fn var(v: Var) -> Self {
        Expr::Var(v)
    }

    /// Integer symbol shorthand
    pub fn int_var(name: impl Into<String>) -> Self {
        Expr::Var(Var::int(name))
    }

    /// Boolean symbol shorthand
    pub fn bool_var(name: impl Into<String>) -> Self {
        Expr::Var(Var::bool(name))
    }

    /// Raw application; no simplification and no sort checking
    pub fn app(op: Op, args: Vec<Expr>) -> Self {
        Expr::Op(op, args.into_iter().map(Arc::new).collect())
    }

    /// Sort-checked application
    pub fn checked_app(op: Op, args: Vec<Expr>) -> Result<Self, SortError> {
        let expr = Expr::app(op, args);
        expr.check_sort()?;
        Ok(expr)
    }

    pub fn not(e: Expr) -> Self {
        // Double negation elimination: NOT(NOT(x)) = x
        if let Expr::Op(Op::Not, args) = &e {
            if args.len() == 1 {
                return (*args[0]).clone();
            }
        }
        Expr::Op(Op::Not, vec![Arc::new(e)])
    }

    pub fn and(a: Expr, b: Expr) -> Self {
        Expr::Op(Op::And, vec![Arc::new(a), Arc::new(b)])
    }

    pub fn or(a: Expr, b: Expr) -> Self {
        Expr::Op(Op::Or, vec![Arc::new(a), Arc::new(b)])
    }

    /// Conjunction of any number of formulas; `true` when empty
    pub fn and_all(exprs: impl IntoIterator<Item = Expr>) -> Self {
        let mut args: Vec<Expr> = exprs.into_iter().collect();
        match args.len() {
            0 => Expr::Bool(true),
            1 => args.swap_remove(0),
            _ => Expr::app(Op::And, args),
        }
    }

    /// Disjunction of any number of formulas; `false` when empty
    pub fn or_all(exprs: impl IntoIterator<Item = Expr>) -> Self {
        let mut args: Vec<Expr> = exprs.into_iter().collect();
        match args.len() {
            0 => Expr::Bool(false),
            1 => args.swap_remove(0),
            _ => Expr::app(Op::Or, args),
        }
    }

    pub fn implies(a: Expr, b: Expr) -> Self {
        Expr::Op(Op::Implies, vec![Arc::new(a), Arc::new(b)])
    }

    /// Wrap a formula in an interpolation marker
    pub fn interp(a: Expr) -> Self {
        Expr::Op(Op::Interp, vec![Arc::new(a)])
    }

    pub fn add(a: Expr, b: Expr) -> Self {
        Expr::Op(Op::Add, vec![Arc::new(a), Arc::new(b)])
    }

    pub fn sub(a: Expr, b: Expr) -> Self {
        Expr::Op(Op::Sub, vec![Arc::new(a), Arc::new(b)])
    }

    pub fn mul(a: Expr, b: Expr) -> Self {
        Expr::Op(Op::Mul, vec![Arc::new(a), Arc::new(b)])
    }

    pub fn neg(e: Expr) -> Self {
        Expr::Op(Op::Neg, vec![Arc::new(e)])
    }

    pub fn eq(a: Expr, b: Expr) -> Self {
        Expr::Op(Op::Eq, vec![Arc::new(a), Arc::new(b)])
    }

    pub fn ne(a: Expr, b: Expr) -> Self {
        Expr::Op(Op::Ne, vec![Arc::new(a), Arc::new(b)])
    }

    pub fn lt(a: Expr, b: Expr) -> Self {
        Expr::Op(Op::Lt, vec![Arc::new(a), Arc::new(b)])
    }

    pub fn le(a: Expr, b: Expr) -> Self {
        Expr::Op(Op::Le, vec![Arc::new(a), Arc::new(b)])
    }

    pub fn gt(a: Expr, b: Expr) -> Self {
        Expr::Op(Op::Gt, vec![Arc::new(a), Arc::new(b)])
    }

    pub fn ge(a: Expr, b: Expr) -> Self {
        Expr::Op(Op::Ge, vec![Arc::new(a), Arc::new(b)])
    }

    pub fn ite(cond: Expr, then_: Expr, else_: Expr) -> Self {
        Expr::Op(Op::Ite, vec![Arc::new(cond), Arc::new(then_), Arc::new(else_)])
    }

    /// Get the sort of this expression (assumes it is well sorted)
    pub fn sort(&self) -> Sort {
        match self {
            Expr::Bool(_) => Sort::Bool,
            Expr::Int(_) => Sort::Int,
            Expr::Var(v) => v.sort,
            Expr::Op(op, args) => match op {
                Op::Add | Op::Sub | Op::Mul | Op::Neg => Sort::Int,
                Op::Ite => args.get(1).map(|a| a.sort()).unwrap_or(Sort::Bool),
                _ => Sort::Bool,
            },
        }
    }

    /// Check that every application is applied to arguments of the right
    /// sorts and arity, returning the sort of the whole expression.
    pub fn check_sort(&self) -> Result<Sort, SortError> {
        let Expr::Op(op, args) = self else {
            return Ok(self.sort());
        };
        let sorts = args
            .iter()
            .map(|a| a.check_sort())
            .collect::<Result<Vec<_>, _>>()?;

        let arity = |lo: usize, hi: Option<usize>| -> Result<(), SortError> {
            let n = sorts.len();
            if n < lo || hi.is_some_and(|hi| n > hi) {
                return Err(SortError::new(format!(
                    "'{}' applied to {} argument(s)",
                    op.symbol(),
                    n
                )));
            }
            Ok(())
        };
        let all = |sort: Sort| -> Result<(), SortError> {
            match sorts.iter().position(|s| *s != sort) {
                Some(i) => Err(SortError::new(format!(
                    "argument {} of '{}' has sort {}, expected {}",
                    i + 1,
                    op.symbol(),
                    sorts[i],
                    sort
                ))),
                None => Ok(()),
            }
        };

        match op {
            Op::Not | Op::Interp => {
                arity(1, Some(1))?;
                all(Sort::Bool)?;
                Ok(Sort::Bool)
            }
            Op::And | Op::Or => {
                all(Sort::Bool)?;
                Ok(Sort::Bool)
            }
            Op::Implies => {
                arity(2, Some(2))?;
                all(Sort::Bool)?;
                Ok(Sort::Bool)
            }
            Op::Eq | Op::Ne => {
                arity(2, Some(2))?;
                all(sorts[0])?;
                Ok(Sort::Bool)
            }
            Op::Lt | Op::Le | Op::Gt | Op::Ge => {
                arity(2, Some(2))?;
                all(Sort::Int)?;
                Ok(Sort::Bool)
            }
            Op::Add | Op::Sub | Op::Mul => {
                arity(1, None)?;
                all(Sort::Int)?;
                Ok(Sort::Int)
            }
            Op::Neg => {
                arity(1, Some(1))?;
                all(Sort::Int)?;
                Ok(Sort::Int)
            }
            Op::Ite => {
                arity(3, Some(3))?;
                if sorts[0] != Sort::Bool {
                    return Err(SortError::new("'ite' condition must be Bool"));
                }
                if sorts[1] != sorts[2] {
                    return Err(SortError::new(format!(
                        "'ite' branches have sorts {} and {}",
                        sorts[1], sorts[2]
                    )));
                }
                Ok(sorts[1])
            }
        }
    }

    /// Substitute symbols in the expression
    pub fn substitute(&self, subst: &[(Var, Expr)]) -> Expr {
        match self {
            Expr::Bool(_) | Expr::Int(_) => self.clone(),
            Expr::Var(v) => subst
                .iter()
                .find(|(var, _)| var == v)
                .map(|(_, e)| e.clone())
                .unwrap_or_else(|| self.clone()),
            Expr::Op(op, args) => {
                let new_args = args.iter().map(|a| Arc::new(a.substitute(subst))).collect();
                Expr::Op(*op, new_args)
            }
        }
    }

    /// Replace every occurrence of the subterm `target` by `with`
    pub fn replace(&self, target: &Expr, with: &Expr) -> Expr {
        if self == target {
            return with.clone();
        }
        match self {
            Expr::Op(op, args) => Expr::Op(
                *op,
                args.iter().map(|a| Arc::new(a.replace(target, with))).collect(),
            ),
            _ => self.clone(),
        }
    }

    /// Get all symbols in the expression, ordered
    pub fn vars(&self) -> BTreeSet<Var> {
        let mut result = BTreeSet::new();
        self.collect_vars(&mut result);
        result
    }

    fn collect_vars(&self, result: &mut BTreeSet<Var>) {
        match self {
            Expr::Bool(_) | Expr::Int(_) => {}
            Expr::Var(v) => {
                if !result.contains(v) {
                    result.insert(v.clone());
                }
            }
            Expr::Op(_, args) => {
                for arg in args {
                    arg.collect_vars(result);
                }
            }
        }
    }

    /// Is this expression an interpolation marker
    pub fn is_interp(&self) -> bool {
        matches!(self, Expr::Op(Op::Interp, args) if args.len() == 1)
    }

    /// Does any interpolation marker occur in the expression
    pub fn contains_interp(&self) -> bool {
        match self {
            Expr::Op(Op::Interp, _) => true,
            Expr::Op(_, args) => args.iter().any(|a| a.contains_interp()),
            _ => false,
        }
    }

    /// Remove all interpolation markers, keeping their contents
    pub fn strip_interp(&self) -> Expr {
        match self {
            Expr::Op(Op::Interp, args) if args.len() == 1 => args[0].strip_interp(),
            Expr::Op(op, args) if self.contains_interp() => Expr::Op(
                *op,
                args.iter().map(|a| Arc::new(a.strip_interp())).collect(),
            ),
            _ => self.clone(),
        }
    }

    /// Flatten nested conjunctions into their conjuncts, dropping `true`
    pub fn conjuncts(&self) -> Vec<&Expr> {
        fn flatten<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
            match expr {
                Expr::Op(Op::And, args) => {
                    for a in args {
                        flatten(a, out);
                    }
                }
                Expr::Bool(true) => {}
                _ => out.push(expr),
            }
        }
        let mut out = Vec::new();
        flatten(self, &mut out);
        out
    }
}

/// SMT-LIB simple symbols are written bare, everything else quoted with `|`.
fn write_symbol(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let simple = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit() || c == '-')
        && name.chars().all(crate::parser::is_symbol_char)
        && !matches!(name, "true" | "false" | "root");
    if simple {
        write!(f, "{name}")
    } else {
        write!(f, "|{name}|")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Int(n) if *n < 0 => write!(f, "(- {})", n.unsigned_abs()),
            Expr::Int(n) => write!(f, "{n}"),
            Expr::Var(v) => write!(f, "{v}"),
            Expr::Op(op, args) => {
                write!(f, "({}", op.symbol())?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}
