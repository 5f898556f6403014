//! Satisfying assignments

use crate::expr::{Expr, Op};
use std::collections::BTreeMap;
use std::fmt;

/// A value in a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
}

impl Value {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(b),
            Value::Int(_) => None,
        }
    }

    pub fn as_int(self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(n),
            Value::Bool(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
        }
    }
}

/// A model extracted from a satisfiable query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    /// Symbol assignments, ordered by name
    assignments: BTreeMap<String, Value>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.assignments.insert(name.into(), value);
    }

    /// Get the value of a symbol
    pub fn get(&self, name: &str) -> Option<Value> {
        self.assignments.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.assignments.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Evaluate an expression under this model.
    ///
    /// Returns `None` when a symbol is unassigned, a value has the wrong
    /// sort, or integer arithmetic overflows.
    pub fn eval(&self, expr: &Expr) -> Option<Value> {
        match expr {
            Expr::Bool(b) => Some(Value::Bool(*b)),
            Expr::Int(n) => Some(Value::Int(*n)),
            Expr::Var(v) => self.get(&v.name),
            Expr::Op(op, args) => {
                let bool_arg = |i: usize| self.eval(args.get(i)?)?.as_bool();
                let int_arg = |i: usize| self.eval(args.get(i)?)?.as_int();
                let value = match op {
                    Op::Not => Value::Bool(!bool_arg(0)?),
                    Op::Interp => Value::Bool(bool_arg(0)?),
                    Op::And => {
                        let mut all = true;
                        for i in 0..args.len() {
                            all &= bool_arg(i)?;
                        }
                        Value::Bool(all)
                    }
                    Op::Or => {
                        let mut any = false;
                        for i in 0..args.len() {
                            any |= bool_arg(i)?;
                        }
                        Value::Bool(any)
                    }
                    Op::Implies => Value::Bool(!bool_arg(0)? || bool_arg(1)?),
                    Op::Eq => Value::Bool(self.eval(args.first()?)? == self.eval(args.get(1)?)?),
                    Op::Ne => Value::Bool(self.eval(args.first()?)? != self.eval(args.get(1)?)?),
                    Op::Lt => Value::Bool(int_arg(0)? < int_arg(1)?),
                    Op::Le => Value::Bool(int_arg(0)? <= int_arg(1)?),
                    Op::Gt => Value::Bool(int_arg(0)? > int_arg(1)?),
                    Op::Ge => Value::Bool(int_arg(0)? >= int_arg(1)?),
                    Op::Add => {
                        let mut sum: i64 = 0;
                        for i in 0..args.len() {
                            sum = sum.checked_add(int_arg(i)?)?;
                        }
                        Value::Int(sum)
                    }
                    Op::Sub => {
                        let mut acc = int_arg(0)?;
                        for i in 1..args.len() {
                            acc = acc.checked_sub(int_arg(i)?)?;
                        }
                        Value::Int(acc)
                    }
                    Op::Mul => {
                        let mut prod: i64 = 1;
                        for i in 0..args.len() {
                            prod = prod.checked_mul(int_arg(i)?)?;
                        }
                        Value::Int(prod)
                    }
                    Op::Neg => Value::Int(int_arg(0)?.checked_neg()?),
                    Op::Ite => {
                        if bool_arg(0)? {
                            self.eval(args.get(1)?)?
                        } else {
                            self.eval(args.get(2)?)?
                        }
                    }
                };
                Some(value)
            }
        }
    }

    /// Does the expression evaluate to `true`
    pub fn satisfies(&self, expr: &Expr) -> bool {
        self.eval(expr) == Some(Value::Bool(true))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(model")?;
        for (name, value) in &self.assignments {
            writeln!(f, "  ({name} {value})")?;
        }
        write!(f, ")")
    }
}
