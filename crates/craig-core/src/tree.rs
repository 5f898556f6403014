//! Partition forests described by parent arrays
//!
//! An interpolation problem arranges its constraints in a forest:
//! `parents[i]` is the index of the parent of constraint `i`, or [`ROOT`].
//! A sequence `F0, F1, ..., Fn-1` is the chain `parents[i] = i + 1` with the
//! last constraint as root.

use crate::error::ForestError;

/// Parent sentinel for root constraints
pub const ROOT: u32 = u32::MAX;

/// Parent array of a sequence problem with `n` constraints
pub fn sequence_parents(n: usize) -> Vec<u32> {
    (0..n)
        .map(|i| if i + 1 < n { (i + 1) as u32 } else { ROOT })
        .collect()
}

/// A validated forest over `n` partition nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forest {
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl Forest {
    /// Validate a parent array: every entry is `ROOT` or in range, there are
    /// no self-loops and no cycles. Several roots are allowed.
    pub fn new(parents: &[u32]) -> Result<Self, ForestError> {
        let n = parents.len();
        if n == 0 {
            return Err(ForestError::Empty);
        }

        let mut resolved = Vec::with_capacity(n);
        for (node, &p) in parents.iter().enumerate() {
            if p == ROOT {
                resolved.push(None);
                continue;
            }
            let parent = p as usize;
            if parent >= n {
                return Err(ForestError::OutOfRange {
                    node,
                    parent: p,
                    len: n,
                });
            }
            if parent == node {
                return Err(ForestError::SelfLoop { node });
            }
            resolved.push(Some(parent));
        }

        // Walk up from every node; a walk longer than n steps revisits a node.
        // `done` marks nodes already known to reach a root.
        let mut done = vec![false; n];
        for start in 0..n {
            let mut path = Vec::new();
            let mut cur = start;
            loop {
                if done[cur] {
                    break;
                }
                path.push(cur);
                if path.len() > n {
                    return Err(ForestError::Cycle { node: start });
                }
                match resolved[cur] {
                    Some(p) => cur = p,
                    None => break,
                }
            }
            for node in path {
                done[node] = true;
            }
        }

        let mut children = vec![Vec::new(); n];
        let mut roots = Vec::new();
        for (node, parent) in resolved.iter().enumerate() {
            match parent {
                Some(p) => children[*p].push(node),
                None => roots.push(node),
            }
        }
        if roots.is_empty() {
            return Err(ForestError::NoRoot);
        }

        Ok(Self {
            parents: resolved,
            children,
            roots,
        })
    }

    /// Validate a parent array that must describe a single tree
    pub fn single_rooted(parents: &[u32]) -> Result<Self, ForestError> {
        let forest = Self::new(parents)?;
        if forest.roots.len() != 1 {
            return Err(ForestError::MultipleRoots {
                roots: forest.roots.clone(),
            });
        }
        Ok(forest)
    }

    /// Validate `parents` against the number of constraints and require a
    /// single tree
    pub fn for_constraints(constraints: usize, parents: &[u32]) -> Result<Self, ForestError> {
        if constraints != parents.len() {
            return Err(ForestError::LengthMismatch {
                constraints,
                parents: parents.len(),
            });
        }
        Self::single_rooted(parents)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parents[node]
    }

    pub fn children(&self, node: usize) -> &[usize] {
        &self.children[node]
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// The root of a single tree (the first root of a forest)
    pub fn root(&self) -> usize {
        self.roots[0]
    }

    pub fn is_root(&self, node: usize) -> bool {
        self.parents[node].is_none()
    }

    /// Non-root nodes in increasing index order. The k-th entry owns the
    /// k-th interpolant.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.parents
            .iter()
            .enumerate()
            .filter_map(|(node, p)| p.map(|p| (node, p)))
    }

    /// Position of each node's interpolant, `None` for roots
    pub fn interpolant_slots(&self) -> Vec<Option<usize>> {
        let mut next = 0;
        self.parents
            .iter()
            .map(|p| {
                p.map(|_| {
                    next += 1;
                    next - 1
                })
            })
            .collect()
    }

    /// Nodes with every child before its parent
    pub fn post_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack: Vec<(usize, bool)> = self.roots.iter().rev().map(|&r| (r, false)).collect();
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
            } else {
                stack.push((node, true));
                for &c in self.children[node].iter().rev() {
                    stack.push((c, false));
                }
            }
        }
        order
    }

    /// Membership mask of the subtree rooted at `node`
    pub fn subtree(&self, node: usize) -> Vec<bool> {
        let mut mask = vec![false; self.len()];
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            mask[n] = true;
            stack.extend_from_slice(&self.children[n]);
        }
        mask
    }
}
