//! Solving contexts and the handles they own
//!
//! Every [`Formula`], [`Model`] and [`Proof`] carries the id of the
//! [`InterpolationContext`] that produced it. Operations reject values from
//! another context with [`InterpError::ContextMismatch`] instead of mixing
//! terms of unrelated solver instances.

use crate::error::{InterpError, InterpResult};
use crate::profile::InterpolationProfile;
use craig_core::{Expr, Prover, Sort, TermParser, Value, Var};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a solving context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    fn fresh() -> Self {
        ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An immutable formula owned by a context. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Formula {
    ctx: ContextId,
    expr: Arc<Expr>,
}

impl Formula {
    pub fn context(&self) -> ContextId {
        self.ctx
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn sort(&self) -> Sort {
        self.expr.sort()
    }

    /// Is this formula an interpolation marker
    pub fn is_marker(&self) -> bool {
        self.expr.is_interp()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// A satisfying assignment produced by a context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    ctx: ContextId,
    values: craig_core::Model,
}

impl Model {
    pub(crate) fn new(ctx: ContextId, values: craig_core::Model) -> Self {
        Self { ctx, values }
    }

    pub fn context(&self) -> ContextId {
        self.ctx
    }

    /// The raw symbol assignment
    pub fn values(&self) -> &craig_core::Model {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Evaluate a formula of the same context. `Ok(None)` when the formula
    /// mentions a symbol the model does not assign.
    pub fn eval(&self, formula: &Formula) -> InterpResult<Option<Value>> {
        if formula.ctx != self.ctx {
            return Err(InterpError::ContextMismatch {
                expected: self.ctx,
                found: formula.ctx,
            });
        }
        Ok(self.values.eval(&formula.expr))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.values)
    }
}

/// A refutation produced by a context
#[derive(Debug, Clone)]
pub struct Proof<T> {
    ctx: ContextId,
    inner: T,
}

impl<T> Proof<T> {
    pub(crate) fn new(ctx: ContextId, inner: T) -> Self {
        Self { ctx, inner }
    }

    pub fn context(&self) -> ContextId {
        self.ctx
    }

    /// The prover's certificate
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

/// Result of a plain satisfiability check
#[derive(Debug, Clone)]
pub enum CheckOutcome<T> {
    Sat(Model),
    Unsat(Proof<T>),
}

impl<T> CheckOutcome<T> {
    pub fn is_sat(&self) -> bool {
        matches!(self, CheckOutcome::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, CheckOutcome::Unsat(_))
    }
}

/// A solving context: one prover plus the formulas, models and proofs
/// created through it.
///
/// Operations take `&mut self`; a context is used by one thread at a time.
/// Independent contexts may run on separate threads.
pub struct InterpolationContext<P: Prover> {
    id: ContextId,
    pub(crate) prover: P,
    pub(crate) profile: InterpolationProfile,
}

impl<P: Prover> InterpolationContext<P> {
    pub fn new(prover: P) -> Self {
        let id = ContextId::fresh();
        log::debug!("interpolation context {id} created");
        Self {
            id,
            prover,
            profile: InterpolationProfile::default(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn prover(&self) -> &P {
        &self.prover
    }

    pub fn prover_mut(&mut self) -> &mut P {
        &mut self.prover
    }

    /// Cumulative counters of this context
    pub fn profile(&self) -> &InterpolationProfile {
        &self.profile
    }

    /// Human-readable summary of [`InterpolationContext::profile`]
    pub fn profile_summary(&self) -> String {
        self.profile.to_string()
    }

    /// Intern a well-sorted expression
    pub fn formula(&self, expr: Expr) -> InterpResult<Formula> {
        expr.check_sort()?;
        Ok(self.wrap(expr))
    }

    /// Parse SMT-LIB term text over the given declarations
    pub fn parse_formula(&self, text: &str, declarations: &[Var]) -> InterpResult<Formula> {
        let expr = TermParser::with_symbols(text, declarations).parse_complete()?;
        Ok(self.wrap(expr))
    }

    pub(crate) fn wrap(&self, expr: Expr) -> Formula {
        Formula {
            ctx: self.id,
            expr: Arc::new(expr),
        }
    }

    /// Conjunction of formulas of this context; `true` when empty
    pub fn mk_and(&self, parts: &[Formula]) -> InterpResult<Formula> {
        for part in parts {
            self.ensure_boolean(part, "conjunct")?;
        }
        Ok(self.wrap(Expr::and_all(parts.iter().map(|p| p.expr().clone()))))
    }

    pub fn mk_not(&self, a: &Formula) -> InterpResult<Formula> {
        self.ensure_boolean(a, "negated formula")?;
        Ok(self.wrap(Expr::not(a.expr().clone())))
    }

    /// Wrap `a` in an interpolation marker. The result is
    /// satisfiability-equivalent to `a` and flags a cut point.
    pub fn mark(&self, a: &Formula) -> InterpResult<Formula> {
        self.ensure_boolean(a, "marked formula")?;
        Ok(self.wrap(Expr::interp(a.expr().clone())))
    }

    /// Free symbols of a formula, as reported by the prover
    pub fn free_symbols(&self, f: &Formula) -> InterpResult<BTreeSet<Var>> {
        self.ensure_owned(f)?;
        Ok(self.prover.free_symbols(f.expr()))
    }

    pub(crate) fn ensure_context(&self, found: ContextId) -> InterpResult<()> {
        if found != self.id {
            return Err(InterpError::ContextMismatch {
                expected: self.id,
                found,
            });
        }
        Ok(())
    }

    pub(crate) fn ensure_owned(&self, f: &Formula) -> InterpResult<()> {
        self.ensure_context(f.ctx)
    }

    /// Owned by this context and of sort Bool
    pub(crate) fn ensure_boolean(&self, f: &Formula, what: &str) -> InterpResult<()> {
        self.ensure_owned(f)?;
        if f.sort() != Sort::Bool {
            return Err(InterpError::invalid(format!(
                "{what} must be Boolean, got {} term {f}",
                f.sort()
            )));
        }
        Ok(())
    }
}

impl<P: Prover + fmt::Debug> fmt::Debug for InterpolationContext<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpolationContext")
            .field("id", &self.id)
            .field("prover", &self.prover)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craig_core::{Params, Partition, ProveResult, ProverError};

    /// A prover that is never expected to be called
    #[derive(Debug, Default)]
    struct NoProver;

    impl Prover for NoProver {
        type Proof = ();

        fn prove(&mut self, _: &[Expr], _: &Params) -> ProveResult<()> {
            ProveResult::Unknown("not a prover".into())
        }

        fn extract_interpolants(
            &mut self,
            _: &(),
            _: &Partition<'_>,
            _: &Params,
        ) -> Result<Vec<Expr>, ProverError> {
            Ok(Vec::new())
        }
    }

    fn vars() -> Vec<Var> {
        vec![Var::int("x"), Var::bool("p")]
    }

    #[test]
    fn test_contexts_have_distinct_ids() {
        let a = InterpolationContext::new(NoProver);
        let b = InterpolationContext::new(NoProver);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_mark_same_context() {
        let ctx = InterpolationContext::new(NoProver);
        let a = ctx.parse_formula("(> x 0)", &vars()).unwrap();
        let marked = ctx.mark(&a).unwrap();
        assert!(marked.is_marker());
        assert_eq!(marked.context(), ctx.id());
        assert_eq!(marked.to_string(), "(interp (> x 0))");
    }

    #[test]
    fn test_mark_rejects_non_boolean() {
        let ctx = InterpolationContext::new(NoProver);
        let x = ctx.parse_formula("(+ x 1)", &vars()).unwrap();
        assert!(matches!(ctx.mark(&x), Err(InterpError::InvalidArgument(_))));
    }

    #[test]
    fn test_mark_rejects_foreign_formula() {
        let ctx = InterpolationContext::new(NoProver);
        let other = InterpolationContext::new(NoProver);
        let a = other.parse_formula("p", &vars()).unwrap();
        let err = ctx.mark(&a).unwrap_err();
        assert!(
            matches!(err, InterpError::ContextMismatch { expected, found }
                if expected == ctx.id() && found == other.id())
        );
    }

    #[test]
    fn test_formula_rejects_ill_sorted() {
        let ctx = InterpolationContext::new(NoProver);
        let bad = Expr::and(Expr::int_var("x"), Expr::bool_var("p"));
        assert!(matches!(
            ctx.formula(bad),
            Err(InterpError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_model_eval_checks_context() {
        let ctx = InterpolationContext::new(NoProver);
        let other = InterpolationContext::new(NoProver);
        let mut values = craig_core::Model::new();
        values.insert("x", Value::Int(4));
        let model = Model::new(ctx.id(), values);

        let f = ctx.parse_formula("(> x 3)", &vars()).unwrap();
        assert_eq!(model.eval(&f).unwrap(), Some(Value::Bool(true)));

        let g = other.parse_formula("(> x 3)", &vars()).unwrap();
        assert!(matches!(
            model.eval(&g),
            Err(InterpError::ContextMismatch { .. })
        ));
    }

    #[test]
    fn test_free_symbols_via_prover() {
        let ctx = InterpolationContext::new(NoProver);
        let f = ctx.parse_formula("(and p (> x 0))", &vars()).unwrap();
        let names: Vec<String> = ctx
            .free_symbols(&f)
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["p".to_string(), "x".to_string()]);
    }
}
