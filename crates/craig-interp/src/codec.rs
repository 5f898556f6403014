//! Text format for interpolation problems
//!
//! One command per line, in a fixed order:
//!
//! ```text
//! ; craig interpolation problem
//! (declare-const x Int)
//! (partitions 2)
//! (theory 0)
//! (constraint (> x 0))
//! (constraint (< x 0))
//! (parents 1 root)
//! ```
//!
//! Declarations come first, sorted by name, so that every term can be
//! parsed with its symbol sorts known. Theory formulas follow the parent
//! array as `(axiom ...)` lines. Comments (`;` to end of line) and blank
//! lines are allowed anywhere when reading.

use crate::context::{Formula, InterpolationContext};
use crate::error::{InterpError, InterpResult};
use craig_core::{Expr, Forest, ParseResult, Prover, Sort, TermParser, Var, ROOT};
use rustc_hash::FxHashMap;
use std::fs;
use std::path::Path;

const HEADER: &str = "; craig interpolation problem";

/// A decoded problem file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemFile {
    pub declarations: Vec<Var>,
    pub constraints: Vec<Expr>,
    pub parents: Vec<u32>,
    pub theory: Vec<Expr>,
}

/// Serialize a problem. The output depends only on the formulas, so equal
/// problems always encode to identical text.
pub fn encode_problem(constraints: &[Expr], parents: &[u32], theory: &[Expr]) -> InterpResult<String> {
    if constraints.len() != parents.len() {
        return Err(InterpError::invalid(format!(
            "{} constraints but {} parent entries",
            constraints.len(),
            parents.len()
        )));
    }
    Forest::new(parents)?;

    let mut sorts: FxHashMap<String, Sort> = FxHashMap::default();
    for (what, e) in constraints
        .iter()
        .map(|e| ("constraint", e))
        .chain(theory.iter().map(|e| ("axiom", e)))
    {
        let sort = e.check_sort()?;
        if sort != Sort::Bool {
            return Err(InterpError::invalid(format!(
                "{what} must be Boolean, got {sort} term {e}"
            )));
        }
        for v in e.vars() {
            if v.name.contains('|') {
                return Err(InterpError::invalid(format!(
                    "symbol name {:?} cannot be written",
                    v.name
                )));
            }
            match sorts.get(&v.name) {
                Some(&s) if s != v.sort => {
                    return Err(InterpError::invalid(format!(
                        "symbol '{}' is used as both {s} and {}",
                        v.name, v.sort
                    )));
                }
                Some(_) => {}
                None => {
                    sorts.insert(v.name, v.sort);
                }
            }
        }
    }
    let mut declarations: Vec<Var> = sorts
        .into_iter()
        .map(|(name, sort)| Var::new(name, sort))
        .collect();
    declarations.sort();

    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    for v in &declarations {
        out.push_str(&format!("(declare-const {v} {})\n", v.sort));
    }
    out.push_str(&format!("(partitions {})\n", constraints.len()));
    out.push_str(&format!("(theory {})\n", theory.len()));
    for c in constraints {
        out.push_str(&format!("(constraint {c})\n"));
    }
    out.push_str("(parents");
    for &p in parents {
        if p == ROOT {
            out.push_str(" root");
        } else {
            out.push_str(&format!(" {p}"));
        }
    }
    out.push_str(")\n");
    for a in theory {
        out.push_str(&format!("(axiom {a})\n"));
    }
    Ok(out)
}

/// Parse a problem file. Either the whole input is accepted or a
/// [`craig_core::ParseError`] locates the first problem.
pub fn decode_problem(text: &str) -> InterpResult<ProblemFile> {
    Ok(Reader::new(text).problem()?)
}

struct Reader<'a> {
    text: &'a str,
    parser: TermParser<'a>,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            parser: TermParser::new(text),
        }
    }

    /// Consume `(` and the command keyword; returns the keyword and the
    /// offset of its opening parenthesis
    fn open(&mut self) -> ParseResult<(usize, String)> {
        self.parser.skip_whitespace_and_comments();
        let start = self.parser.offset();
        self.parser.expect_char('(')?;
        let keyword = self.parser.parse_symbol()?;
        Ok((start, keyword))
    }

    fn open_expected(&mut self, expected: &str, what: &str) -> ParseResult<()> {
        let (start, keyword) = self.open()?;
        if keyword != expected {
            return Err(self
                .parser
                .error_at(start, format!("expected {what}, found '({keyword}'")));
        }
        Ok(())
    }

    fn close(&mut self) -> ParseResult<()> {
        self.parser.expect_char(')')
    }

    /// A command count. Every counted command opens a parenthesis, so a
    /// count above the parentheses left in the input cannot be honored.
    fn count(&mut self, what: &str) -> ParseResult<usize> {
        self.parser.skip_whitespace_and_comments();
        let start = self.parser.offset();
        let numeral = self.parser.parse_numeral()?;
        let count: usize = numeral
            .parse()
            .map_err(|_| self.parser.error_at(start, format!("invalid count: {numeral}")))?;
        let available = self.text[self.parser.offset()..].matches('(').count();
        if count > available {
            return Err(self.parser.error_at(
                start,
                format!("{what} count {count} exceeds the {available} command(s) left in the input"),
            ));
        }
        Ok(count)
    }

    fn formula(&mut self) -> ParseResult<Expr> {
        self.parser.skip_whitespace_and_comments();
        let start = self.parser.offset();
        let e = self.parser.parse_term()?;
        if e.sort() != Sort::Bool {
            return Err(self
                .parser
                .error_at(start, format!("expected a Boolean formula, got {} term", e.sort())));
        }
        self.close()?;
        Ok(e)
    }

    fn parent_entries(&mut self) -> ParseResult<Vec<u32>> {
        let mut parents = Vec::new();
        loop {
            self.parser.skip_whitespace_and_comments();
            let start = self.parser.offset();
            match self.parser.peek_char() {
                Some(')') | None => break,
                Some(c) if c.is_ascii_digit() => {
                    let numeral = self.parser.parse_numeral()?;
                    let p = numeral.parse::<u32>().ok().filter(|&p| p != ROOT).ok_or_else(|| {
                        self.parser
                            .error_at(start, format!("invalid parent index: {numeral}"))
                    })?;
                    parents.push(p);
                }
                Some(_) => {
                    let symbol = self.parser.parse_symbol()?;
                    if symbol != "root" {
                        return Err(self.parser.error_at(
                            start,
                            format!("expected a parent index or 'root', found '{symbol}'"),
                        ));
                    }
                    parents.push(ROOT);
                }
            }
        }
        self.close()?;
        Ok(parents)
    }

    fn problem(&mut self) -> ParseResult<ProblemFile> {
        let mut declarations = Vec::new();
        let (mut start, mut keyword) = self.open()?;
        while keyword == "declare-const" {
            let name = self.parser.parse_symbol()?;
            let sort = self.parser.parse_sort()?;
            if self.parser.symbol_sort(&name).is_some() {
                return Err(self
                    .parser
                    .error_at(start, format!("symbol '{name}' declared twice")));
            }
            self.parser.declare(&name, sort)?;
            self.close()?;
            declarations.push(Var::new(name, sort));
            (start, keyword) = self.open()?;
        }
        if keyword != "partitions" {
            return Err(self.parser.error_at(
                start,
                format!("expected '(partitions' or a declaration, found '({keyword}'"),
            ));
        }
        let n = self.count("partition")?;
        self.close()?;
        self.open_expected("theory", "'(theory'")?;
        let m = self.count("theory")?;
        self.close()?;

        let mut constraints = Vec::new();
        for i in 0..n {
            self.open_expected("constraint", &format!("constraint {i} of {n}"))?;
            constraints.push(self.formula()?);
        }

        self.parser.skip_whitespace_and_comments();
        let parents_start = self.parser.offset();
        self.open_expected("parents", &format!("'(parents' after {n} constraint(s)"))?;
        let parents = self.parent_entries()?;
        if parents.len() != n {
            return Err(self.parser.error_at(
                parents_start,
                format!("{} parent entries for {n} constraint(s)", parents.len()),
            ));
        }
        if let Err(err) = Forest::new(&parents) {
            return Err(self.parser.error_at(parents_start, err.to_string()));
        }

        let mut theory = Vec::new();
        for j in 0..m {
            self.open_expected("axiom", &format!("axiom {j} of {m}"))?;
            theory.push(self.formula()?);
        }
        if !self.parser.at_end() {
            return Err(self.parser.error("unexpected input after the problem"));
        }
        log::debug!(
            "decoded problem: {} constraint(s), {} axiom(s), {} symbol(s)",
            n,
            m,
            declarations.len()
        );

        Ok(ProblemFile {
            declarations,
            constraints,
            parents,
            theory,
        })
    }
}

impl<P: Prover> InterpolationContext<P> {
    /// Serialize formulas of this context
    pub fn encode_problem(
        &self,
        constraints: &[Formula],
        parents: &[u32],
        theory: &[Formula],
    ) -> InterpResult<String> {
        for f in constraints.iter().chain(theory) {
            self.ensure_owned(f)?;
        }
        let constraints: Vec<Expr> = constraints.iter().map(|f| f.expr().clone()).collect();
        let theory: Vec<Expr> = theory.iter().map(|f| f.expr().clone()).collect();
        encode_problem(&constraints, parents, &theory)
    }

    /// Parse problem text into formulas of this context
    pub fn decode_problem(
        &self,
        text: &str,
    ) -> InterpResult<(Vec<Formula>, Vec<u32>, Vec<Formula>)> {
        let file = decode_problem(text)?;
        let constraints = file.constraints.into_iter().map(|e| self.wrap(e)).collect();
        let theory = file.theory.into_iter().map(|e| self.wrap(e)).collect();
        Ok((constraints, file.parents, theory))
    }

    /// Write a problem file. Nothing is written if the problem is invalid.
    pub fn write_problem(
        &self,
        path: impl AsRef<Path>,
        constraints: &[Formula],
        parents: &[u32],
        theory: &[Formula],
    ) -> InterpResult<()> {
        let text = self.encode_problem(constraints, parents, theory)?;
        fs::write(path.as_ref(), text)?;
        log::debug!("wrote problem to {}", path.as_ref().display());
        Ok(())
    }

    /// Read a problem file into formulas of this context
    pub fn read_problem(
        &self,
        path: impl AsRef<Path>,
    ) -> InterpResult<(Vec<Formula>, Vec<u32>, Vec<Formula>)> {
        let text = fs::read_to_string(path.as_ref())?;
        self.decode_problem(&text)
    }
}
