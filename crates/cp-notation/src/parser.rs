//! Recursive-descent parser for the model-entity notation.
//!
//! One public entry method per grammar production. Each consumes exactly the
//! tokens of its production, advancing the stream in place, and returns the
//! corresponding node or primitive value. Parsing is fail-fast: on a
//! mismatch the entry returns a [`ParseError`] describing the expected and
//! found tokens at the current byte offset, and no backtracking occurs over
//! tokens already consumed.
//!
//! Alternatives are selected with at most two tokens of lookahead: a `[`
//! followed by an identifier opens an interval while a `[` followed by a
//! number opens a domain range, and an identifier followed by `*` is a
//! linear term rather than a bare variable.
//!
//! After an entry point succeeds, callers that expect to have consumed the
//! whole input run [`Parser::expect_eof`], which reports leftover tokens as
//! the distinct [`ParseError::TrailingInput`] condition.

use std::collections::VecDeque;

use crate::ast::{
    AssignmentsArgument, BinaryOpArgument, BinaryOperator, ConstantsArgument,
    CumulativeArgument, Domain, DomainArgument, ElementArgument, Enforcement,
    EnforcementLiteral, Interval, IntervalDemand, KArgument, LinearExpr, LinearTerm, Method,
    Operand, Range, Statement,
};
use crate::error::{ParseError, ParseResult};
use crate::token::{Spanned, Symbol, Token, Tokenizer};

/// The keyword opening an enforcement clause.
const KW_IF: &str = "if";

fn err_expected(position: usize, expected: impl Into<String>, found: impl ToString) -> ParseError {
    ParseError::Syntax {
        position,
        expected: expected.into(),
        found: found.to_string(),
    }
}

fn err_overflow(position: usize, found: impl ToString) -> ParseError {
    ParseError::Syntax {
        position,
        expected: "an integer within the signed 64-bit range".to_string(),
        found: found.to_string(),
    }
}

/// Parses one production per call over a lazily tokenized input buffer.
///
/// A parser is created fresh per input and is not meant to be shared; its
/// cursor advances in place as entries consume tokens.
#[derive(Debug)]
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    lookahead: VecDeque<Spanned>,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `input`. Tokenization is lazy, so lexical
    /// errors surface from whichever entry point reaches the bad region.
    pub fn new(input: &'a str) -> Self {
        Self {
            tokenizer: Tokenizer::new(input),
            lookahead: VecDeque::new(),
        }
    }

    // ------------------------------------------------------------------
    // Stream plumbing
    // ------------------------------------------------------------------

    fn fill(&mut self, n: usize) -> ParseResult<()> {
        while self.lookahead.len() < n {
            let next = self.tokenizer.next_token()?;
            self.lookahead.push_back(next);
        }
        Ok(())
    }

    fn peek(&mut self) -> ParseResult<(Token, usize)> {
        self.fill(1)?;
        let s = &self.lookahead[0];
        Ok((s.token.clone(), s.position))
    }

    fn peek_second(&mut self) -> ParseResult<(Token, usize)> {
        self.fill(2)?;
        let s = &self.lookahead[1];
        Ok((s.token.clone(), s.position))
    }

    fn advance(&mut self) -> ParseResult<Spanned> {
        if let Some(s) = self.lookahead.pop_front() {
            return Ok(s);
        }
        self.tokenizer.next_token()
    }

    fn eat_symbol(&mut self, symbol: Symbol) -> ParseResult<bool> {
        let (token, _) = self.peek()?;
        if token == Token::Symbol(symbol) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn expect_symbol(&mut self, symbol: Symbol) -> ParseResult<()> {
        let s = self.advance()?;
        if s.token == Token::Symbol(symbol) {
            return Ok(());
        }
        Err(err_expected(s.position, format!("`{}`", symbol), s.token))
    }

    fn expect_keyword(&mut self, keyword: &str) -> ParseResult<()> {
        let s = self.advance()?;
        match s.token {
            Token::Ident(name) if name == keyword => Ok(()),
            other => Err(err_expected(s.position, format!("`{}`", keyword), other)),
        }
    }

    /// Asserts the input is fully consumed apart from the end-of-input
    /// sentinel. Leftover tokens mean the input covered more than the
    /// invoked production, reported as [`ParseError::TrailingInput`].
    pub fn expect_eof(&mut self) -> ParseResult<()> {
        let (token, position) = self.peek()?;
        if token == Token::Eof {
            return Ok(());
        }
        Err(ParseError::TrailingInput {
            position,
            found: token.to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------

    /// Parses an identifier.
    pub fn identifier(&mut self) -> ParseResult<String> {
        let s = self.advance()?;
        match s.token {
            Token::Ident(name) => Ok(name),
            other => Err(err_expected(s.position, "an identifier", other)),
        }
    }

    /// Parses a receiver name.
    pub fn receiver(&mut self) -> ParseResult<String> {
        self.identifier()
    }

    /// Parses a variable reference.
    pub fn variable(&mut self) -> ParseResult<String> {
        self.identifier()
    }

    /// Parses a non-empty, comma-separated list of variable references,
    /// preserving input order (duplicates are the caller's concern).
    pub fn variables(&mut self) -> ParseResult<Vec<String>> {
        let mut vars = vec![self.variable()?];
        while self.eat_symbol(Symbol::Comma)? {
            vars.push(self.variable()?);
        }
        Ok(vars)
    }

    // ------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------

    /// Parses a boolean literal.
    pub fn boolean(&mut self) -> ParseResult<bool> {
        let s = self.advance()?;
        match s.token {
            Token::Bool(b) => Ok(b),
            other => Err(err_expected(s.position, "`true` or `false`", other)),
        }
    }

    /// Parses a non-empty, comma-separated list of boolean literals.
    pub fn booleans(&mut self) -> ParseResult<Vec<bool>> {
        let mut bools = vec![self.boolean()?];
        while self.eat_symbol(Symbol::Comma)? {
            bools.push(self.boolean()?);
        }
        Ok(bools)
    }

    /// Parses a signed 64-bit integer. Values outside the i64 range are a
    /// syntax error, never a silent truncation.
    pub fn number(&mut self) -> ParseResult<i64> {
        let s = self.advance()?;
        let (position, text) = match s.token {
            Token::Int(text) => (s.position, text),
            Token::Symbol(Symbol::Minus) => {
                let n = self.advance()?;
                match n.token {
                    Token::Int(text) if !text.starts_with('-') => {
                        (n.position, format!("-{}", text))
                    }
                    other => return Err(err_expected(n.position, "an integer", other)),
                }
            }
            other => return Err(err_expected(s.position, "an integer", other)),
        };
        text.parse::<i64>()
            .map_err(|_| err_overflow(position, text))
    }

    /// Parses a non-empty, comma-separated list of integers.
    pub fn numbers(&mut self) -> ParseResult<Vec<i64>> {
        let mut nums = vec![self.number()?];
        while self.eat_symbol(Symbol::Comma)? {
            nums.push(self.number()?);
        }
        Ok(nums)
    }

    fn numbers_group(&mut self) -> ParseResult<Vec<i64>> {
        self.expect_symbol(Symbol::LBracket)?;
        if self.eat_symbol(Symbol::RBracket)? {
            return Ok(Vec::new());
        }
        let nums = self.numbers()?;
        self.expect_symbol(Symbol::RBracket)?;
        Ok(nums)
    }

    /// Parses bracketed integer groups joined by `∪`, e.g.
    /// `[1, 2] ∪ [3, 4]`. Individual groups may be empty.
    pub fn numbers_list(&mut self) -> ParseResult<Vec<Vec<i64>>> {
        let mut groups = vec![self.numbers_group()?];
        while self.eat_symbol(Symbol::Union)? {
            groups.push(self.numbers_group()?);
        }
        Ok(groups)
    }

    fn booleans_group(&mut self) -> ParseResult<Vec<bool>> {
        self.expect_symbol(Symbol::LBracket)?;
        if self.eat_symbol(Symbol::RBracket)? {
            return Ok(Vec::new());
        }
        let bools = self.booleans()?;
        self.expect_symbol(Symbol::RBracket)?;
        Ok(bools)
    }

    /// Parses bracketed boolean groups joined by `∪`, e.g.
    /// `[true, false] ∪ [false]`.
    pub fn booleans_list(&mut self) -> ParseResult<Vec<Vec<bool>>> {
        let mut groups = vec![self.booleans_group()?];
        while self.eat_symbol(Symbol::Union)? {
            groups.push(self.booleans_group()?);
        }
        Ok(groups)
    }

    // ------------------------------------------------------------------
    // Domains
    // ------------------------------------------------------------------

    fn range(&mut self) -> ParseResult<Range> {
        self.expect_symbol(Symbol::LBracket)?;
        let (_, position) = self.peek()?;
        let lo = self.number()?;
        let range = if self.eat_symbol(Symbol::Comma)? {
            Range::new(lo, self.number()?)
        } else {
            Range::value(lo)
        };
        self.expect_symbol(Symbol::RBracket)?;
        if range.lo > range.hi {
            return Err(err_expected(
                position,
                "a range with lower bound ≤ upper bound",
                range,
            ));
        }
        Ok(range)
    }

    /// Parses a domain: one or more bracketed sub-ranges joined by `∪`.
    ///
    /// The sub-ranges must be given in ascending, non-overlapping order;
    /// this is validated, not just assumed, so every successfully parsed
    /// domain upholds the ordering invariant.
    pub fn domain(&mut self) -> ParseResult<Domain> {
        let (_, position) = self.peek()?;
        let mut ranges = vec![self.range()?];
        while self.eat_symbol(Symbol::Union)? {
            ranges.push(self.range()?);
        }
        for pair in ranges.windows(2) {
            if pair[1].lo <= pair[0].hi {
                return Err(err_expected(
                    position,
                    "sub-ranges in ascending, non-overlapping order",
                    format!("{} followed by {}", pair[0], pair[1]),
                ));
            }
        }
        Ok(Domain::from_ranges(ranges))
    }

    /// Parses a non-empty, comma-separated list of domains.
    pub fn domains(&mut self) -> ParseResult<Vec<Domain>> {
        let mut domains = vec![self.domain()?];
        while self.eat_symbol(Symbol::Comma)? {
            domains.push(self.domain()?);
        }
        Ok(domains)
    }

    // ------------------------------------------------------------------
    // Intervals
    // ------------------------------------------------------------------

    /// Parses an interval, `[start, end | size]`.
    pub fn interval(&mut self) -> ParseResult<Interval> {
        self.expect_symbol(Symbol::LBracket)?;
        let start = self.variable()?;
        self.expect_symbol(Symbol::Comma)?;
        let end = self.variable()?;
        self.expect_symbol(Symbol::Pipe)?;
        let size = self.variable()?;
        self.expect_symbol(Symbol::RBracket)?;
        Ok(Interval { start, end, size })
    }

    /// Parses a non-empty, comma-separated list of intervals.
    pub fn intervals(&mut self) -> ParseResult<Vec<Interval>> {
        let mut intervals = vec![self.interval()?];
        while self.eat_symbol(Symbol::Comma)? {
            intervals.push(self.interval()?);
        }
        Ok(intervals)
    }

    /// Parses an interval paired with its demand, `[s, e | sz]: 2`.
    pub fn interval_demand(&mut self) -> ParseResult<IntervalDemand> {
        let interval = self.interval()?;
        self.expect_symbol(Symbol::Colon)?;
        let demand = self.number()?;
        Ok(IntervalDemand { interval, demand })
    }

    // ------------------------------------------------------------------
    // Linear expressions
    // ------------------------------------------------------------------

    /// Parses a single coefficient-weighted term: `2*x`, `x*2`, or a bare
    /// variable (coefficient 1).
    pub fn linear_term(&mut self) -> ParseResult<LinearTerm> {
        let (token, position) = self.peek()?;
        match token {
            Token::Int(_) | Token::Symbol(Symbol::Minus) => {
                let coefficient = self.number()?;
                self.expect_symbol(Symbol::Star)?;
                let variable = self.variable()?;
                Ok(LinearTerm::new(coefficient, variable))
            }
            Token::Ident(_) => {
                let variable = self.variable()?;
                let coefficient = if self.eat_symbol(Symbol::Star)? {
                    self.number()?
                } else {
                    1
                };
                Ok(LinearTerm::new(coefficient, variable))
            }
            other => Err(err_expected(position, "a linear term", other)),
        }
    }

    /// Parses a sum of signed terms and constants, e.g. `2*x + y - 3`.
    ///
    /// The first summand's sign is optional and defaults to positive. Bare
    /// constants fold into the offset; term order is preserved as written.
    /// A signed integer literal is accepted where a `+`/`-` operator could
    /// appear, so `y-3` and `y - 3` parse identically.
    pub fn linear_expr(&mut self) -> ParseResult<LinearExpr> {
        let mut expr = LinearExpr::default();
        let mut negate = self.eat_symbol(Symbol::Minus)?;
        loop {
            self.summand(negate, &mut expr)?;
            let (token, _) = self.peek()?;
            match token {
                Token::Symbol(Symbol::Plus) => {
                    self.advance()?;
                    negate = false;
                }
                Token::Symbol(Symbol::Minus) => {
                    self.advance()?;
                    negate = true;
                }
                // A signed literal carries its own minus; treat the gap as
                // an implicit plus.
                Token::Int(text) if text.starts_with('-') => {
                    negate = false;
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn summand(&mut self, negate: bool, expr: &mut LinearExpr) -> ParseResult<()> {
        let (token, position) = self.peek()?;
        match token {
            Token::Int(_) => {
                let value = self.number()?;
                if self.eat_symbol(Symbol::Star)? {
                    let variable = self.variable()?;
                    let coefficient = apply_sign(value, negate, position)?;
                    expr.terms.push(LinearTerm::new(coefficient, variable));
                } else {
                    let value = apply_sign(value, negate, position)?;
                    expr.offset = expr
                        .offset
                        .checked_add(value)
                        .ok_or_else(|| err_overflow(position, value))?;
                }
            }
            Token::Ident(_) => {
                let variable = self.variable()?;
                let coefficient = if self.eat_symbol(Symbol::Star)? {
                    self.number()?
                } else {
                    1
                };
                let coefficient = apply_sign(coefficient, negate, position)?;
                expr.terms.push(LinearTerm::new(coefficient, variable));
            }
            other => return Err(err_expected(position, "a linear term or constant", other)),
        }
        Ok(())
    }

    /// Parses a non-empty, comma-separated list of linear expressions.
    pub fn linear_exprs(&mut self) -> ParseResult<Vec<LinearExpr>> {
        let mut exprs = vec![self.linear_expr()?];
        while self.eat_symbol(Symbol::Comma)? {
            exprs.push(self.linear_expr()?);
        }
        Ok(exprs)
    }

    // ------------------------------------------------------------------
    // Enforcement, methods, statements
    // ------------------------------------------------------------------

    /// Parses an enforcement clause, `if a ∧ ¬b`.
    pub fn enforcement(&mut self) -> ParseResult<Enforcement> {
        self.expect_keyword(KW_IF)?;
        let mut literals = vec![self.enforcement_literal()?];
        while self.eat_symbol(Symbol::Wedge)? {
            literals.push(self.enforcement_literal()?);
        }
        Ok(Enforcement { literals })
    }

    fn enforcement_literal(&mut self) -> ParseResult<EnforcementLiteral> {
        let negated = self.eat_symbol(Symbol::Negation)?;
        let name = self.variable()?;
        Ok(EnforcementLiteral { name, negated })
    }

    /// Parses a method invocation, `receiver.name(args)`.
    pub fn method(&mut self) -> ParseResult<Method> {
        let receiver = self.receiver()?;
        self.expect_symbol(Symbol::Dot)?;
        let name = self.identifier()?;
        self.expect_symbol(Symbol::LParen)?;
        let mut args = Vec::new();
        if !self.eat_symbol(Symbol::RParen)? {
            args.push(self.operand()?);
            while self.eat_symbol(Symbol::Comma)? {
                args.push(self.operand()?);
            }
            self.expect_symbol(Symbol::RParen)?;
        }
        Ok(Method {
            receiver,
            name,
            args,
        })
    }

    fn operand(&mut self) -> ParseResult<Operand> {
        let (token, position) = self.peek()?;
        match token {
            Token::Bool(_) => Ok(Operand::Bool(self.boolean()?)),
            Token::Symbol(Symbol::LBracket) => {
                let (second, second_position) = self.peek_second()?;
                match second {
                    Token::Ident(_) => Ok(Operand::Interval(self.interval()?)),
                    Token::Int(_) | Token::Symbol(Symbol::Minus) => {
                        Ok(Operand::Domain(self.domain()?))
                    }
                    other => Err(err_expected(
                        second_position,
                        "a domain bound or an interval variable",
                        other,
                    )),
                }
            }
            Token::Int(_) | Token::Ident(_) | Token::Symbol(Symbol::Minus) => {
                Ok(Operand::Expr(self.linear_expr()?))
            }
            other => Err(err_expected(position, "a method argument", other)),
        }
    }

    /// Parses a top-level statement: an optional assignment-target list,
    /// a method invocation, and an optional enforcement clause.
    pub fn statement(&mut self) -> ParseResult<Statement> {
        // An identifier followed by `,` or `=` starts a target list; one
        // followed by `.` starts the invocation itself.
        let (second, _) = self.peek_second()?;
        let targets = match second {
            Token::Symbol(Symbol::Comma) | Token::Symbol(Symbol::Assign) => {
                let targets = self.variables()?;
                self.expect_symbol(Symbol::Assign)?;
                targets
            }
            _ => Vec::new(),
        };
        let method = self.method()?;
        let (next, _) = self.peek()?;
        let enforcement = match next {
            Token::Ident(name) if name == KW_IF => Some(self.enforcement()?),
            _ => None,
        };
        Ok(Statement {
            targets,
            method,
            enforcement,
        })
    }

    // ------------------------------------------------------------------
    // Constraint-argument payloads
    // ------------------------------------------------------------------

    /// Parses an allowed-assignments payload, `x, y ∈ [0, 1] ∪ [2, 3]`.
    pub fn assignments_argument(&mut self) -> ParseResult<AssignmentsArgument> {
        let variables = self.variables()?;
        self.expect_symbol(Symbol::In)?;
        let allowed = self.numbers_list()?;
        Ok(AssignmentsArgument { variables, allowed })
    }

    /// Parses a binary-operation payload, `t == x / y`.
    pub fn binary_op_argument(&mut self) -> ParseResult<BinaryOpArgument> {
        let target = self.variable()?;
        self.expect_symbol(Symbol::EqEq)?;
        let lhs = self.variable()?;
        let op = self.binary_operator()?;
        let rhs = self.variable()?;
        Ok(BinaryOpArgument {
            target,
            lhs,
            op,
            rhs,
        })
    }

    fn binary_operator(&mut self) -> ParseResult<BinaryOperator> {
        let s = self.advance()?;
        match s.token {
            Token::Symbol(Symbol::Plus) => Ok(BinaryOperator::Add),
            Token::Symbol(Symbol::Minus) => Ok(BinaryOperator::Sub),
            Token::Symbol(Symbol::Star) => Ok(BinaryOperator::Mul),
            Token::Symbol(Symbol::Slash) => Ok(BinaryOperator::Div),
            Token::Symbol(Symbol::Percent) => Ok(BinaryOperator::Mod),
            other => Err(err_expected(s.position, "an arithmetic operator", other)),
        }
    }

    /// Parses a constants payload, `x, y == 1, 2`, requiring exactly one
    /// value per variable.
    pub fn constants_argument(&mut self) -> ParseResult<ConstantsArgument> {
        let (_, position) = self.peek()?;
        let variables = self.variables()?;
        self.expect_symbol(Symbol::EqEq)?;
        let values = self.numbers()?;
        if variables.len() != values.len() {
            return Err(err_expected(
                position,
                format!("{} constant(s), one per variable", variables.len()),
                format!("{} constant(s)", values.len()),
            ));
        }
        Ok(ConstantsArgument { variables, values })
    }

    /// Parses a cumulative payload,
    /// `[s, e | sz]: 2, [s2, e2 | sz2]: 3 ≤ 4`. The capacity is mandatory;
    /// its absence is a syntax error, not a default.
    pub fn cumulative_argument(&mut self) -> ParseResult<CumulativeArgument> {
        let mut demands = vec![self.interval_demand()?];
        while self.eat_symbol(Symbol::Comma)? {
            demands.push(self.interval_demand()?);
        }
        self.expect_symbol(Symbol::AtMost)?;
        let capacity = self.number()?;
        Ok(CumulativeArgument { demands, capacity })
    }

    /// Parses a K-threshold payload, `a, b, c | 2`.
    pub fn k_argument(&mut self) -> ParseResult<KArgument> {
        let literals = self.variables()?;
        self.expect_symbol(Symbol::Pipe)?;
        let k = self.number()?;
        Ok(KArgument { literals, k })
    }

    /// Parses an expression-in-domain payload, `2*x + y ∈ [0, 5]`.
    pub fn domain_argument(&mut self) -> ParseResult<DomainArgument> {
        let expr = self.linear_expr()?;
        self.expect_symbol(Symbol::In)?;
        let domain = self.domain()?;
        Ok(DomainArgument { expr, domain })
    }

    /// Parses an element payload, `t == [x, y, z][i]`.
    pub fn element_argument(&mut self) -> ParseResult<ElementArgument> {
        let target = self.variable()?;
        self.expect_symbol(Symbol::EqEq)?;
        self.expect_symbol(Symbol::LBracket)?;
        let variables = self.variables()?;
        self.expect_symbol(Symbol::RBracket)?;
        self.expect_symbol(Symbol::LBracket)?;
        let index = self.variable()?;
        self.expect_symbol(Symbol::RBracket)?;
        Ok(ElementArgument {
            target,
            variables,
            index,
        })
    }
}

fn apply_sign(value: i64, negate: bool, position: usize) -> ParseResult<i64> {
    if !negate {
        return Ok(value);
    }
    value
        .checked_neg()
        .ok_or_else(|| err_overflow(position, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete<T>(input: &str, entry: impl FnOnce(&mut Parser<'_>) -> ParseResult<T>) -> T {
        let mut p = Parser::new(input);
        let value = entry(&mut p).expect("production matches");
        p.expect_eof().expect("input fully consumed");
        value
    }

    mod names {
        use super::*;

        #[test]
        fn identifier() {
            assert_eq!(complete("model", |p| p.identifier()), "model");
            assert_eq!(complete("x_1", |p| p.identifier()), "x_1");
        }

        #[test]
        fn identifier_rejects_number() {
            let mut p = Parser::new("42");
            assert!(matches!(p.identifier(), Err(ParseError::Syntax { .. })));
        }

        #[test]
        fn variables_preserve_order_and_duplicates() {
            assert_eq!(
                complete("x, y, x", |p| p.variables()),
                vec!["x".to_string(), "y".to_string(), "x".to_string()]
            );
        }
    }

    mod booleans {
        use super::*;

        #[test]
        fn single() {
            assert!(complete("true", |p| p.boolean()));
            assert!(!complete("false", |p| p.boolean()));
        }

        #[test]
        fn list_preserves_order() {
            assert_eq!(
                complete("true, false, true", |p| p.booleans()),
                vec![true, false, true]
            );
        }

        #[test]
        fn list_of_lists() {
            assert_eq!(
                complete("[true, false] ∪ [false]", |p| p.booleans_list()),
                vec![vec![true, false], vec![false]]
            );
        }

        #[test]
        fn rejects_identifier() {
            let mut p = Parser::new("yes");
            assert!(matches!(p.boolean(), Err(ParseError::Syntax { .. })));
        }
    }

    mod numbers {
        use super::*;

        #[test]
        fn signed_values() {
            assert_eq!(complete("42", |p| p.number()), 42);
            assert_eq!(complete("-7", |p| p.number()), -7);
            assert_eq!(complete("- 7", |p| p.number()), -7);
            assert_eq!(complete("0", |p| p.number()), 0);
        }

        #[test]
        fn extremes_of_the_64_bit_range() {
            assert_eq!(
                complete("9223372036854775807", |p| p.number()),
                i64::MAX
            );
            assert_eq!(
                complete("-9223372036854775808", |p| p.number()),
                i64::MIN
            );
            assert_eq!(
                complete("- 9223372036854775808", |p| p.number()),
                i64::MIN
            );
        }

        #[test]
        fn overflow_is_a_syntax_error() {
            let mut p = Parser::new("9223372036854775808");
            assert!(matches!(p.number(), Err(ParseError::Syntax { .. })));

            let mut p = Parser::new("-9223372036854775809");
            assert!(matches!(p.number(), Err(ParseError::Syntax { .. })));
        }

        #[test]
        fn boolean_is_not_a_number() {
            let mut p = Parser::new("true");
            let err = p.number().expect_err("booleans are not numbers");
            assert!(matches!(err, ParseError::Syntax { .. }));
        }

        #[test]
        fn list() {
            assert_eq!(complete("1, -2, 3", |p| p.numbers()), vec![1, -2, 3]);
        }

        #[test]
        fn list_of_lists() {
            assert_eq!(
                complete("[1, 2] ∪ [3, 4]", |p| p.numbers_list()),
                vec![vec![1, 2], vec![3, 4]]
            );
            assert_eq!(
                complete("[] ∪ [5]", |p| p.numbers_list()),
                vec![vec![], vec![5]]
            );
        }
    }

    mod domains {
        use super::*;
        use crate::ast::Range;

        #[test]
        fn two_ranges_in_order() {
            let d = complete("[0, 5] ∪ [10, 20]", |p| p.domain());
            assert_eq!(d.ranges, vec![Range::new(0, 5), Range::new(10, 20)]);
            assert_eq!(d.to_string(), "[0, 5] ∪ [10, 20]");
        }

        #[test]
        fn singleton_range() {
            let d = complete("[5]", |p| p.domain());
            assert_eq!(d.ranges, vec![Range::value(5)]);
            assert_eq!(d.to_string(), "[5]");
        }

        #[test]
        fn negative_bounds() {
            let d = complete("[-10, -5] ∪ [0, 3]", |p| p.domain());
            assert_eq!(d.ranges, vec![Range::new(-10, -5), Range::new(0, 3)]);
        }

        #[test]
        fn adjacent_ranges_are_disjoint() {
            let d = complete("[0, 4] ∪ [5, 10]", |p| p.domain());
            assert_eq!(d.ranges.len(), 2);
        }

        #[test]
        fn out_of_order_ranges_fail() {
            let mut p = Parser::new("[10, 20] ∪ [0, 5]");
            assert!(matches!(p.domain(), Err(ParseError::Syntax { .. })));
        }

        #[test]
        fn overlapping_ranges_fail() {
            let mut p = Parser::new("[0, 5] ∪ [5, 10]");
            assert!(matches!(p.domain(), Err(ParseError::Syntax { .. })));
        }

        #[test]
        fn inverted_bounds_fail() {
            let mut p = Parser::new("[5, 2]");
            assert!(matches!(p.domain(), Err(ParseError::Syntax { .. })));
        }

        #[test]
        fn domain_list_is_comma_separated() {
            let ds = complete("[0, 1] ∪ [3, 4], [7, 9]", |p| p.domains());
            assert_eq!(ds.len(), 2);
            assert_eq!(ds[0].to_string(), "[0, 1] ∪ [3, 4]");
            assert_eq!(ds[1].to_string(), "[7, 9]");
        }
    }

    mod intervals {
        use super::*;

        #[test]
        fn single() {
            let i = complete("[s, e | sz]", |p| p.interval());
            assert_eq!(i.start, "s");
            assert_eq!(i.end, "e");
            assert_eq!(i.size, "sz");
            assert_eq!(i.to_string(), "[s, e | sz]");
        }

        #[test]
        fn list() {
            let is = complete("[a, b | c], [d, e | f]", |p| p.intervals());
            assert_eq!(is.len(), 2);
            assert_eq!(is[1].to_string(), "[d, e | f]");
        }

        #[test]
        fn with_demand() {
            let d = complete("[s, e | sz]: 2", |p| p.interval_demand());
            assert_eq!(d.demand, 2);
            assert_eq!(d.to_string(), "[s, e | sz]: 2");
        }

        #[test]
        fn missing_size_fails() {
            let mut p = Parser::new("[s, e]");
            assert!(matches!(p.interval(), Err(ParseError::Syntax { .. })));
        }
    }

    mod linear_expressions {
        use super::*;

        #[test]
        fn single_terms() {
            assert_eq!(
                complete("2*x", |p| p.linear_term()),
                LinearTerm::new(2, "x")
            );
            assert_eq!(complete("x", |p| p.linear_term()), LinearTerm::new(1, "x"));
            assert_eq!(
                complete("-3*y", |p| p.linear_term()),
                LinearTerm::new(-3, "y")
            );
            // The coefficient may trail the variable; rendering normalizes.
            assert_eq!(
                complete("x * 3", |p| p.linear_term()),
                LinearTerm::new(3, "x")
            );
        }

        #[test]
        fn terms_and_offset() {
            let e = complete("2*x + y - 3", |p| p.linear_expr());
            assert_eq!(
                e.terms,
                vec![LinearTerm::new(2, "x"), LinearTerm::new(1, "y")]
            );
            assert_eq!(e.offset, -3);
            assert_eq!(e.to_string(), "2*x + y - 3");
        }

        #[test]
        fn leading_sign() {
            let e = complete("-x + 5", |p| p.linear_expr());
            assert_eq!(e.terms, vec![LinearTerm::new(-1, "x")]);
            assert_eq!(e.offset, 5);
            assert_eq!(e.to_string(), "-x + 5");
        }

        #[test]
        fn constants_fold_into_offset() {
            let e = complete("3 + 2*x - 1", |p| p.linear_expr());
            assert_eq!(e.terms, vec![LinearTerm::new(2, "x")]);
            assert_eq!(e.offset, 2);
            assert_eq!(e.to_string(), "2*x + 2");
        }

        #[test]
        fn bare_constant() {
            let e = complete("-7", |p| p.linear_expr());
            assert!(e.terms.is_empty());
            assert_eq!(e.offset, -7);
        }

        #[test]
        fn spacing_around_minus_is_insignificant() {
            let spaced = complete("y - 3", |p| p.linear_expr());
            let tight = complete("y-3", |p| p.linear_expr());
            let half = complete("y -3", |p| p.linear_expr());
            assert_eq!(spaced, tight);
            assert_eq!(spaced, half);
            assert_eq!(spaced.offset, -3);
        }

        #[test]
        fn subtracted_terms() {
            let e = complete("x - 2*y", |p| p.linear_expr());
            assert_eq!(
                e.terms,
                vec![LinearTerm::new(1, "x"), LinearTerm::new(-2, "y")]
            );
            assert_eq!(e.to_string(), "x - 2*y");
        }

        #[test]
        fn render_parse_render_is_stable() {
            for input in [
                "2*x + y - 3",
                "-x + 5",
                "x - 2*y",
                "4*a - 3*b + 2*c - 1",
                "0",
                "-7",
                "z",
            ] {
                let once = complete(input, |p| p.linear_expr());
                let twice = complete(&once.to_string(), |p| p.linear_expr());
                assert_eq!(once, twice, "round trip diverged for {input:?}");
            }
        }

        #[test]
        fn offset_overflow_fails() {
            let mut p = Parser::new("9223372036854775807 + 1");
            assert!(matches!(p.linear_expr(), Err(ParseError::Syntax { .. })));
        }

        #[test]
        fn negated_min_coefficient_fails() {
            let mut p = Parser::new("x - -9223372036854775808*y");
            assert!(matches!(p.linear_expr(), Err(ParseError::Syntax { .. })));
        }

        #[test]
        fn list() {
            let es = complete("2*x + 1, y", |p| p.linear_exprs());
            assert_eq!(es.len(), 2);
            assert_eq!(es[0].to_string(), "2*x + 1");
            assert_eq!(es[1].to_string(), "y");
        }
    }

    mod enforcement_clauses {
        use super::*;

        #[test]
        fn single_literal() {
            let e = complete("if b", |p| p.enforcement());
            assert_eq!(e.literals.len(), 1);
            assert_eq!(e.to_string(), "if b");
        }

        #[test]
        fn conjunction_with_negation() {
            let e = complete("if a ∧ ¬b ∧ c", |p| p.enforcement());
            assert_eq!(e.literals.len(), 3);
            assert!(e.literals[1].negated);
            assert_eq!(e.to_string(), "if a ∧ ¬b ∧ c");
        }

        #[test]
        fn requires_keyword() {
            let mut p = Parser::new("a ∧ b");
            assert!(matches!(p.enforcement(), Err(ParseError::Syntax { .. })));
        }
    }

    mod methods {
        use super::*;
        use crate::ast::Operand;

        #[test]
        fn no_arguments() {
            let m = complete("model.validate()", |p| p.method());
            assert_eq!(m.receiver, "model");
            assert_eq!(m.name, "validate");
            assert!(m.args.is_empty());
        }

        #[test]
        fn mixed_operands() {
            let m = complete(
                "model.add(2*x + 1, [0, 5], [s, e | sz], true)",
                |p| p.method(),
            );
            assert_eq!(m.args.len(), 4);
            assert!(matches!(m.args[0], Operand::Expr(_)));
            assert!(matches!(m.args[1], Operand::Domain(_)));
            assert!(matches!(m.args[2], Operand::Interval(_)));
            assert!(matches!(m.args[3], Operand::Bool(true)));
            assert_eq!(
                m.to_string(),
                "model.add(2*x + 1, [0, 5], [s, e | sz], true)"
            );
        }

        #[test]
        fn missing_dot_fails() {
            let mut p = Parser::new("model validate()");
            assert!(matches!(p.method(), Err(ParseError::Syntax { .. })));
        }

        #[test]
        fn unclosed_parenthesis_fails() {
            let mut p = Parser::new("model.add(x");
            assert!(matches!(p.method(), Err(ParseError::Syntax { .. })));
        }
    }

    mod statements {
        use super::*;

        #[test]
        fn bare_invocation() {
            let s = complete("model.all_different(x, y)", |p| p.statement());
            assert!(s.targets.is_empty());
            assert!(s.enforcement.is_none());
            assert_eq!(s.to_string(), "model.all_different(x, y)");
        }

        #[test]
        fn single_assignment() {
            let s = complete("x = model.new_int_var([0, 10])", |p| p.statement());
            assert_eq!(s.targets, vec!["x".to_string()]);
            assert_eq!(s.to_string(), "x = model.new_int_var([0, 10])");
        }

        #[test]
        fn multi_assignment() {
            let s = complete("a, b = model.new_literals(2)", |p| p.statement());
            assert_eq!(s.targets, vec!["a".to_string(), "b".to_string()]);
            assert_eq!(s.to_string(), "a, b = model.new_literals(2)");
        }

        #[test]
        fn guarded_invocation() {
            let s = complete("model.all_different(x, y) if b ∧ ¬c", |p| p.statement());
            let enforcement = s.enforcement.as_ref().expect("guarded");
            assert_eq!(enforcement.literals.len(), 2);
            assert_eq!(s.to_string(), "model.all_different(x, y) if b ∧ ¬c");
        }

        #[test]
        fn targets_without_assignment_fail() {
            let mut p = Parser::new("x, y model.foo()");
            assert!(matches!(p.statement(), Err(ParseError::Syntax { .. })));
        }
    }

    mod argument_forms {
        use super::*;
        use crate::ast::BinaryOperator;

        #[test]
        fn assignments() {
            let a = complete("x, y ∈ [0, 1] ∪ [2, 3]", |p| p.assignments_argument());
            assert_eq!(a.variables, vec!["x".to_string(), "y".to_string()]);
            assert_eq!(a.allowed, vec![vec![0, 1], vec![2, 3]]);
            assert_eq!(a.to_string(), "x, y ∈ [0, 1] ∪ [2, 3]");
        }

        #[test]
        fn binary_op() {
            let b = complete("t == x / y", |p| p.binary_op_argument());
            assert_eq!(b.op, BinaryOperator::Div);
            assert_eq!(b.to_string(), "t == x / y");

            let b = complete("t == x % y", |p| p.binary_op_argument());
            assert_eq!(b.op, BinaryOperator::Mod);
        }

        #[test]
        fn binary_op_requires_double_equals() {
            let mut p = Parser::new("t = x / y");
            assert!(matches!(
                p.binary_op_argument(),
                Err(ParseError::Syntax { .. })
            ));
        }

        #[test]
        fn constants() {
            let c = complete("x, y == 1, 2", |p| p.constants_argument());
            assert_eq!(c.values, vec![1, 2]);
            assert_eq!(c.to_string(), "x, y == 1, 2");
        }

        #[test]
        fn constants_arity_mismatch_fails() {
            let mut p = Parser::new("x, y == 1");
            let err = p.constants_argument().expect_err("arity must match");
            assert!(matches!(err, ParseError::Syntax { .. }));
        }

        #[test]
        fn cumulative() {
            let c = complete("[s, e | sz]: 2, [s2, e2 | sz2]: 3 ≤ 4", |p| {
                p.cumulative_argument()
            });
            assert_eq!(c.demands.len(), 2);
            assert_eq!(c.capacity, 4);
            assert_eq!(c.to_string(), "[s, e | sz]: 2, [s2, e2 | sz2]: 3 ≤ 4");
        }

        #[test]
        fn cumulative_missing_capacity_fails() {
            let mut p = Parser::new("[s, e | sz]: 2");
            let err = p.cumulative_argument().expect_err("capacity is mandatory");
            match err {
                ParseError::Syntax { expected, .. } => assert!(expected.contains('≤')),
                other => panic!("expected a syntax error, got {other:?}"),
            }
        }

        #[test]
        fn k_threshold() {
            let k = complete("a, b, c | 2", |p| p.k_argument());
            assert_eq!(k.literals.len(), 3);
            assert_eq!(k.k, 2);
            assert_eq!(k.to_string(), "a, b, c | 2");
        }

        #[test]
        fn expression_in_domain() {
            let d = complete("2*x + y ∈ [0, 5] ∪ [10, 20]", |p| p.domain_argument());
            assert_eq!(d.expr.terms.len(), 2);
            assert_eq!(d.domain.ranges.len(), 2);
            assert_eq!(d.to_string(), "2*x + y ∈ [0, 5] ∪ [10, 20]");
        }

        #[test]
        fn element() {
            let e = complete("t == [x, y, z][i]", |p| p.element_argument());
            assert_eq!(e.variables.len(), 3);
            assert_eq!(e.index, "i");
            assert_eq!(e.to_string(), "t == [x, y, z][i]");
        }
    }

    mod end_of_input {
        use super::*;

        #[test]
        fn trailing_tokens_are_a_distinct_condition() {
            let mut p = Parser::new("5 x");
            assert_eq!(p.number().expect("number matches"), 5);
            let err = p.expect_eof().expect_err("x is left over");
            assert!(matches!(err, ParseError::TrailingInput { position: 2, .. }));
        }

        #[test]
        fn clean_input_passes() {
            let mut p = Parser::new("  5  ");
            assert_eq!(p.number().expect("number matches"), 5);
            p.expect_eof().expect("nothing left");
        }

        #[test]
        fn repeated_checks_stay_ok() {
            let mut p = Parser::new("x");
            p.variable().expect("variable matches");
            p.expect_eof().expect("nothing left");
            p.expect_eof().expect("still nothing left");
        }
    }

    mod error_reporting {
        use super::*;

        #[test]
        fn lexical_errors_surface_lazily() {
            let mut p = Parser::new("x, $");
            let err = p.variables().expect_err("$ is not a token");
            assert_eq!(
                err,
                ParseError::Lexical {
                    position: 3,
                    character: '$',
                }
            );
        }

        #[test]
        fn syntax_errors_carry_position_and_description() {
            let mut p = Parser::new("[0, 5] ∪ x");
            let err = p.domain().expect_err("x is not a range");
            match err {
                ParseError::Syntax {
                    position,
                    expected,
                    found,
                } => {
                    assert_eq!(position, 11);
                    assert_eq!(expected, "`[`");
                    assert_eq!(found, "x");
                }
                other => panic!("expected a syntax error, got {other:?}"),
            }
        }

        #[test]
        fn empty_input_names_end_of_input() {
            let mut p = Parser::new("");
            let err = p.number().expect_err("nothing to parse");
            match err {
                ParseError::Syntax { found, .. } => assert_eq!(found, "end of input"),
                other => panic!("expected a syntax error, got {other:?}"),
            }
        }

        #[test]
        fn double_negation_of_a_literal_fails() {
            let mut p = Parser::new("- -3");
            assert!(matches!(p.number(), Err(ParseError::Syntax { .. })));
        }
    }
}
