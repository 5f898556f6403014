//! Decomposition of marked patterns into interpolation trees
//!
//! Every `(interp a)` in a pattern is a tree node; the markers inside `a`
//! are its children and the unmarked remainder of the pattern is the root.
//! A node's formula is its marked content with the nested markers removed.
//! Nodes are numbered in post-order, so children come before their parent
//! and the root is last.
//!
//! Markers may only occur in conjunctive positions: at the top of the
//! pattern, directly below `and`, or directly below another marker.

use crate::error::{InterpError, InterpResult};
use craig_core::{Expr, Op, ROOT};

/// A pattern split into tree nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    pub constraints: Vec<Expr>,
    pub parents: Vec<u32>,
}

impl Decomposition {
    /// Number of marked cut points (one interpolant each)
    pub fn cut_points(&self) -> usize {
        self.constraints.len().saturating_sub(1)
    }
}

#[derive(Default)]
struct Builder {
    constraints: Vec<Expr>,
    parents: Vec<u32>,
}

impl Builder {
    /// Remove top-level markers of `e`, turning each into a node. Returns
    /// what is left (`None` if nothing) and the nodes created directly.
    fn split(&mut self, e: &Expr) -> InterpResult<(Option<Expr>, Vec<usize>)> {
        match e {
            Expr::Op(Op::Interp, args) if args.len() == 1 => {
                let node = self.node(&args[0])?;
                Ok((None, vec![node]))
            }
            Expr::Op(Op::And, args) => {
                let mut kept = Vec::new();
                let mut children = Vec::new();
                for arg in args {
                    let (rest, nodes) = self.split(arg)?;
                    kept.extend(rest);
                    children.extend(nodes);
                }
                if children.is_empty() {
                    return Ok((Some(e.clone()), children));
                }
                let rest = (!kept.is_empty()).then(|| Expr::and_all(kept));
                Ok((rest, children))
            }
            Expr::Op(op, _) if e.contains_interp() => Err(InterpError::invalid(format!(
                "interpolation marker below '{}' is not in a conjunctive position",
                op.symbol()
            ))),
            _ => Ok((Some(e.clone()), Vec::new())),
        }
    }

    fn node(&mut self, content: &Expr) -> InterpResult<usize> {
        let (rest, children) = self.split(content)?;
        Ok(self.push(rest, &children))
    }

    fn push(&mut self, formula: Option<Expr>, children: &[usize]) -> usize {
        let index = self.constraints.len();
        self.constraints.push(formula.unwrap_or(Expr::Bool(true)));
        self.parents.push(ROOT);
        for &c in children {
            self.parents[c] = index as u32;
        }
        index
    }
}

/// Split a pattern into post-ordered nodes and their parent array
pub fn decompose(pattern: &Expr) -> InterpResult<Decomposition> {
    let mut builder = Builder::default();
    let (rest, children) = builder.split(pattern)?;
    builder.push(rest, &children);
    Ok(Decomposition {
        constraints: builder.constraints,
        parents: builder.parents,
    })
}
