//! SMT-LIB term parser
//!
//! Recursive-descent parser for the quantifier-free term language used by
//! interpolation problems:
//!
//! ```text
//! (and (> x 0) (interp (<= (+ x y) 10)))
//! (ite p (- x) 3)
//! ```
//!
//! Symbols must be declared before use. The parser keeps n-ary `and`, `or`,
//! `+`, `-` and `*` applications n-ary and folds `(- <numeral>)` into a
//! negative literal, so that printing a parsed term and parsing it again is
//! stable. Every error carries the line and column where it was detected.
//!
//! The parser is also the tokenizer for command-oriented formats built on
//! top of it (see the problem codec), which is why the low-level helpers are
//! public.

use crate::error::{Location, ParseError, ParseResult};
use crate::expr::{Expr, Op, Sort, Var};
use rustc_hash::FxHashMap;

/// Deepest application nesting the parser accepts. Printing, marker
/// removal and the provers all recurse over terms, so deeper input is
/// rejected here instead of overflowing the stack later.
pub const MAX_TERM_DEPTH: usize = 500;

/// Term parser state
pub struct TermParser<'a> {
    /// Input string
    input: &'a str,
    /// Current byte position in input
    pos: usize,
    /// Open applications around the current position
    depth: usize,
    /// Declared symbols (name -> sort)
    symbols: FxHashMap<String, Sort>,
}

impl<'a> TermParser<'a> {
    /// Create a new parser over `input`
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
            symbols: FxHashMap::default(),
        }
    }

    /// Create a parser with the given symbols already declared
    pub fn with_symbols(input: &'a str, vars: &[Var]) -> Self {
        let mut parser = Self::new(input);
        for v in vars {
            parser.symbols.insert(v.name.clone(), v.sort);
        }
        parser
    }

    /// Declare a symbol. Redeclaring with the same sort is a no-op.
    pub fn declare(&mut self, name: &str, sort: Sort) -> ParseResult<()> {
        match self.symbols.get(name) {
            Some(existing) if *existing != sort => Err(self.error(format!(
                "symbol '{name}' already declared with sort {existing}"
            ))),
            Some(_) => Ok(()),
            None => {
                log::trace!("declare {name} : {sort}");
                self.symbols.insert(name.to_string(), sort);
                Ok(())
            }
        }
    }

    /// Sort of a declared symbol
    pub fn symbol_sort(&self, name: &str) -> Option<Sort> {
        self.symbols.get(name).copied()
    }

    /// Current location
    pub fn location(&self) -> Location {
        Location::of_offset(self.input, self.pos)
    }

    /// Build an error at the current position
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.location(), message)
    }

    /// Build an error at byte offset `pos`
    pub fn error_at(&self, pos: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(Location::of_offset(self.input, pos), message)
    }

    /// Current byte offset
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// True once only whitespace and comments remain
    pub fn at_end(&mut self) -> bool {
        self.skip_whitespace_and_comments();
        self.pos >= self.input.len()
    }

    /// Parse a complete term and require the input to be exhausted
    pub fn parse_complete(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_term()?;
        if !self.at_end() {
            return Err(self.error("unexpected input after term"));
        }
        Ok(expr)
    }

    /// Parse a sort
    pub fn parse_sort(&mut self) -> ParseResult<Sort> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        let name = self.parse_symbol()?;
        match name.as_str() {
            "Bool" => Ok(Sort::Bool),
            "Int" => Ok(Sort::Int),
            _ => Err(self.error_at(start, format!("unknown sort: {name}"))),
        }
    }

    /// Parse a well-sorted term
    pub fn parse_term(&mut self) -> ParseResult<Expr> {
        self.skip_whitespace_and_comments();

        match self.peek_char() {
            Some('(') => self.parse_compound_expr(),
            Some(c) if c.is_ascii_digit() => self.parse_numeral_expr(),
            Some('-') if self.next_is_digit() => self.parse_numeral_expr(),
            Some(_) => self.parse_symbol_expr(),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Parse a compound expression (function application)
    fn parse_compound_expr(&mut self) -> ParseResult<Expr> {
        let start = self.pos;
        if self.depth >= MAX_TERM_DEPTH {
            return Err(self.error_at(start, "term nested too deeply"));
        }
        self.depth += 1;
        let result = self.parse_application(start);
        self.depth -= 1;
        result
    }

    fn parse_application(&mut self, start: usize) -> ParseResult<Expr> {
        self.expect_char('(')?;
        self.skip_whitespace_and_comments();

        let func = self.parse_symbol()?;
        if func == "-" {
            if let Some(literal) = self.parse_negative_literal()? {
                return Ok(literal);
            }
        }
        let mut args = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.peek_char() == Some(')') {
                break;
            }
            if self.peek_char().is_none() {
                return Err(self.error(format!("unterminated application of '{func}'")));
            }
            args.push(self.parse_term()?);
        }
        self.expect_char(')')?;

        self.build_application(start, &func, args)
    }

    /// Map function names to operations
    fn build_application(&self, start: usize, func: &str, args: Vec<Expr>) -> ParseResult<Expr> {
        let op = match func {
            "not" => Op::Not,
            "and" => Op::And,
            "or" => Op::Or,
            "=>" => Op::Implies,
            "=" => Op::Eq,
            "distinct" => Op::Ne,
            "<" => Op::Lt,
            "<=" => Op::Le,
            ">" => Op::Gt,
            ">=" => Op::Ge,
            "+" => Op::Add,
            "*" => Op::Mul,
            "ite" => Op::Ite,
            "interp" => Op::Interp,
            "-" if args.len() == 1 => Op::Neg,
            "-" => Op::Sub,
            _ => return Err(self.error_at(start, format!("unknown function: {func}"))),
        };
        Expr::checked_app(op, args).map_err(|e| self.error_at(start, e.0))
    }

    /// Rest of `(- <numeral>)` after the `-`, folded into a negative
    /// literal. The magnitude may be `2^63`, so `i64::MIN` reads back.
    /// `(- 0)` and anything that is not a lone numeral are left for the
    /// generic path, with the position restored.
    fn parse_negative_literal(&mut self) -> ParseResult<Option<Expr>> {
        let resume = self.pos;
        if !self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            return Ok(None);
        }
        let digits_start = self.pos;
        let digits = self.parse_numeral()?;
        if self.peek_char() != Some(')') || digits.bytes().all(|b| b == b'0') {
            self.pos = resume;
            return Ok(None);
        }
        let n = digits
            .parse::<i128>()
            .ok()
            .and_then(|m| i64::try_from(-m).ok())
            .ok_or_else(|| {
                self.error_at(digits_start, format!("integer literal out of range: -{digits}"))
            })?;
        self.expect_char(')')?;
        Ok(Some(Expr::Int(n)))
    }

    /// Parse a numeral expression
    fn parse_numeral_expr(&mut self) -> ParseResult<Expr> {
        let start = self.pos;
        let num_str = self.parse_numeral()?;
        let n: i64 = num_str
            .parse()
            .map_err(|_| self.error_at(start, format!("invalid numeral: {num_str}")))?;
        Ok(Expr::Int(n))
    }

    /// Parse a symbol expression (variable or constant)
    fn parse_symbol_expr(&mut self) -> ParseResult<Expr> {
        let start = self.pos;
        let quoted = self.peek_char() == Some('|');
        let name = self.parse_symbol()?;

        match name.as_str() {
            "true" if !quoted => Ok(Expr::Bool(true)),
            "false" if !quoted => Ok(Expr::Bool(false)),
            _ => match self.symbols.get(&name) {
                Some(sort) => Ok(Expr::Var(Var::new(name, *sort))),
                None => Err(self.error_at(start, format!("undeclared symbol: {name}"))),
            },
        }
    }

    /// Parse a symbol
    pub fn parse_symbol(&mut self) -> ParseResult<String> {
        self.skip_whitespace_and_comments();

        let start = self.pos;

        // Check for quoted symbol
        if self.peek_char() == Some('|') {
            self.pos += 1;
            let content_start = self.pos;
            while self.pos < self.input.len() && self.current_char() != Some('|') {
                self.pos += self.current_char().map_or(1, char::len_utf8);
            }
            if self.current_char() != Some('|') {
                return Err(self.error_at(start, "unterminated quoted symbol"));
            }
            let symbol = self.input[content_start..self.pos].to_string();
            self.pos += 1;
            return Ok(symbol);
        }

        // Regular symbol
        while let Some(c) = self.current_char() {
            if !is_symbol_char(c) {
                break;
            }
            self.pos += c.len_utf8();
        }

        if start == self.pos {
            return Err(self.error("expected symbol"));
        }

        Ok(self.input[start..self.pos].to_string())
    }

    /// Parse a numeral
    pub fn parse_numeral(&mut self) -> ParseResult<String> {
        self.skip_whitespace_and_comments();

        let start = self.pos;
        let mut has_sign = false;

        // Optional sign
        if self.peek_char() == Some('-') {
            self.pos += 1;
            has_sign = true;
        }

        // Digits
        while let Some(c) = self.current_char() {
            if !c.is_ascii_digit() {
                break;
            }
            self.pos += 1;
        }

        if start == self.pos || (has_sign && self.pos == start + 1) {
            self.pos = start;
            return Err(self.error("expected numeral"));
        }

        Ok(self.input[start..self.pos].to_string())
    }

    /// Skip whitespace and comments
    pub fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.current_char() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else if c == ';' {
                // Skip until end of line (handle multi-byte UTF-8 chars in comments)
                while let Some(c) = self.current_char() {
                    if c == '\n' {
                        break;
                    }
                    self.pos += c.len_utf8();
                }
            } else {
                break;
            }
        }
    }

    /// Expect and consume a specific character
    pub fn expect_char(&mut self, expected: char) -> ParseResult<()> {
        self.skip_whitespace_and_comments();
        match self.current_char() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    /// Peek at the next significant character without consuming it
    pub fn peek_char(&mut self) -> Option<char> {
        self.skip_whitespace_and_comments();
        self.current_char()
    }

    /// Get current character
    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_is_digit(&self) -> bool {
        self.input[self.pos..]
            .chars()
            .nth(1)
            .is_some_and(|c| c.is_ascii_digit())
    }
}

/// Parse a single term over the given declarations
pub fn parse_expr(input: &str, vars: &[Var]) -> ParseResult<Expr> {
    TermParser::with_symbols(input, vars).parse_complete()
}

/// Check if a character is valid in a simple symbol
pub fn is_symbol_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(
            c,
            '_' | '-'
                | '+'
                | '*'
                | '/'
                | '.'
                | '!'
                | '@'
                | '#'
                | '$'
                | '%'
                | '^'
                | '&'
                | '<'
                | '>'
                | '='
                | '?'
                | '~'
                | '\''
        )
}
