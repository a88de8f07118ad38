//! Abstract syntax tree for the model-entity notation.
//!
//! Every node is plain data, immutable once built, and renders itself back
//! to canonical text through [`std::fmt::Display`]. Round-trip tests compare
//! these renderings, so the output here is the normalized form of the
//! notation regardless of incidental whitespace in the original input.

use std::fmt;

/// A closed integer sub-range of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    /// Inclusive lower bound.
    pub lo: i64,
    /// Inclusive upper bound.
    pub hi: i64,
}

impl Range {
    /// Creates a closed range `[lo, hi]`.
    pub fn new(lo: i64, hi: i64) -> Self {
        Self { lo, hi }
    }

    /// Creates a singleton range `[v]`.
    pub fn value(v: i64) -> Self {
        Self { lo: v, hi: v }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lo == self.hi {
            write!(f, "[{}]", self.lo)
        } else {
            write!(f, "[{}, {}]", self.lo, self.hi)
        }
    }
}

/// A set of admissible integer values: an ordered union of disjoint
/// sub-ranges, ascending by lower bound.
///
/// Example: `[0, 5] ∪ [10, 20]`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Domain {
    /// The sub-ranges, sorted ascending and pairwise non-overlapping.
    pub ranges: Vec<Range>,
}

impl Domain {
    /// Creates a single-range domain `[lo, hi]`.
    pub fn new(lo: i64, hi: i64) -> Self {
        Self {
            ranges: vec![Range::new(lo, hi)],
        }
    }

    /// Creates a domain from already-ordered sub-ranges.
    pub fn from_ranges(ranges: Vec<Range>) -> Self {
        Self { ranges }
    }

    /// Returns true if `value` falls inside one of the sub-ranges.
    pub fn contains(&self, value: i64) -> bool {
        self.ranges
            .iter()
            .any(|r| r.lo <= value && value <= r.hi)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join(&self.ranges, " ∪ "))
    }
}

/// A scheduling interval: `[start, end | size]`.
///
/// The bound relationship between the fields is a model-level concern; the
/// node only records the three variable references.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    /// Variable holding the interval's start.
    pub start: String,
    /// Variable holding the interval's end.
    pub end: String,
    /// Variable holding the interval's size.
    pub size: String,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {} | {}]", self.start, self.end, self.size)
    }
}

/// An interval paired with the resource demand it exerts while active.
///
/// Example: `[s, e | sz]: 2`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntervalDemand {
    /// The demanding interval.
    pub interval: Interval,
    /// Units of the shared resource consumed while the interval runs.
    pub demand: i64,
}

impl fmt::Display for IntervalDemand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.interval, self.demand)
    }
}

/// A coefficient-weighted variable, `coefficient*variable`.
///
/// A coefficient of 1 renders as the bare variable, -1 as its negation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearTerm {
    /// The (possibly negative) coefficient.
    pub coefficient: i64,
    /// The variable the coefficient scales.
    pub variable: String,
}

impl LinearTerm {
    /// Creates a term `coefficient*variable`.
    pub fn new(coefficient: i64, variable: impl Into<String>) -> Self {
        Self {
            coefficient,
            variable: variable.into(),
        }
    }

    fn fmt_magnitude(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.coefficient.unsigned_abs() {
            1 => write!(f, "{}", self.variable),
            mag => write!(f, "{}*{}", mag, self.variable),
        }
    }
}

impl fmt::Display for LinearTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coefficient < 0 {
            write!(f, "-")?;
        }
        self.fmt_magnitude(f)
    }
}

/// A sum of linear terms plus a constant offset.
///
/// Term order is preserved exactly as written; bare constants encountered
/// while parsing are folded into `offset`. Example: `2*x + y - 3`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearExpr {
    /// The terms, in input order.
    pub terms: Vec<LinearTerm>,
    /// The constant offset.
    pub offset: i64,
}

impl LinearExpr {
    /// Creates a constant expression with no terms.
    pub fn constant(offset: i64) -> Self {
        Self {
            terms: Vec::new(),
            offset,
        }
    }

    /// Creates a single-variable expression with coefficient 1.
    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            terms: vec![LinearTerm::new(1, name)],
            offset: 0,
        }
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "{}", self.offset);
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", term)?;
            } else if term.coefficient < 0 {
                write!(f, " - ")?;
                term.fmt_magnitude(f)?;
            } else {
                write!(f, " + {}", term)?;
            }
        }
        if self.offset < 0 {
            write!(f, " - {}", self.offset.unsigned_abs())?;
        } else if self.offset > 0 {
            write!(f, " + {}", self.offset)?;
        }
        Ok(())
    }
}

/// One guard literal of an enforcement clause, optionally negated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnforcementLiteral {
    /// The literal's variable name.
    pub name: String,
    /// Whether the literal is negated (`¬name`).
    pub negated: bool,
}

impl fmt::Display for EnforcementLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "¬")?;
        }
        write!(f, "{}", self.name)
    }
}

/// A conjunction of guard literals gating a constraint's activation.
///
/// Example: `if a ∧ ¬b`. An empty literal list is the unconditional case
/// and renders as nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Enforcement {
    /// The guard literals, in input order.
    pub literals: Vec<EnforcementLiteral>,
}

impl Enforcement {
    /// Creates the unconditional (empty) enforcement.
    pub fn unconditional() -> Self {
        Self::default()
    }

    /// Returns true if no literal gates the constraint.
    pub fn is_unconditional(&self) -> bool {
        self.literals.is_empty()
    }
}

impl fmt::Display for Enforcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.literals.is_empty() {
            return Ok(());
        }
        write!(f, "if {}", join(&self.literals, " ∧ "))
    }
}

/// One argument of a method invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// A boolean literal.
    Bool(bool),
    /// A domain.
    Domain(Domain),
    /// An interval.
    Interval(Interval),
    /// A linear expression; bare variables and bare numbers land here.
    Expr(LinearExpr),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Bool(b) => write!(f, "{}", b),
            Operand::Domain(d) => write!(f, "{}", d),
            Operand::Interval(i) => write!(f, "{}", i),
            Operand::Expr(e) => write!(f, "{}", e),
        }
    }
}

/// A `receiver.method(args)` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Method {
    /// The object the method is called on.
    pub receiver: String,
    /// The method name.
    pub name: String,
    /// The ordered argument list. Arity and types per method name are a
    /// caller-side contract, not enforced here.
    pub args: Vec<Operand>,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.receiver, self.name, join(&self.args, ", "))
    }
}

/// A top-level declaration or constraint invocation line.
///
/// Examples: `x = model.new_int_var([0, 10])`,
/// `model.all_different(x, y) if b`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statement {
    /// Assignment targets; empty for a bare invocation.
    pub targets: Vec<String>,
    /// The invoked method.
    pub method: Method,
    /// Optional enforcement clause gating the invocation.
    pub enforcement: Option<Enforcement>,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.targets.is_empty() {
            write!(f, "{} = ", self.targets.join(", "))?;
        }
        write!(f, "{}", self.method)?;
        if let Some(e) = &self.enforcement {
            if !e.is_unconditional() {
                write!(f, " {}", e)?;
            }
        }
        Ok(())
    }
}

/// Arithmetic operator of a [`BinaryOpArgument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
        };
        write!(f, "{}", text)
    }
}

/// Payload of an allowed-assignments constraint.
///
/// Example: `x, y ∈ [0, 1] ∪ [2, 3]`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignmentsArgument {
    /// The constrained variables.
    pub variables: Vec<String>,
    /// The admissible value tuples, one inner list per tuple.
    pub allowed: Vec<Vec<i64>>,
}

impl fmt::Display for AssignmentsArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ∈ {}",
            self.variables.join(", "),
            render_numbers_list(&self.allowed)
        )
    }
}

/// Payload of a binary-operation equality constraint.
///
/// Example: `t == x / y`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryOpArgument {
    /// Variable receiving the operation's result.
    pub target: String,
    /// Left operand.
    pub lhs: String,
    /// The operator.
    pub op: BinaryOperator,
    /// Right operand.
    pub rhs: String,
}

impl fmt::Display for BinaryOpArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == {} {} {}", self.target, self.lhs, self.op, self.rhs)
    }
}

/// Payload fixing variables to constants, pairwise.
///
/// Example: `x, y == 1, 2`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstantsArgument {
    /// The fixed variables.
    pub variables: Vec<String>,
    /// The constants, one per variable.
    pub values: Vec<i64>,
}

impl fmt::Display for ConstantsArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == {}", self.variables.join(", "), join(&self.values, ", "))
    }
}

/// Payload of a cumulative resource constraint: demanding intervals whose
/// concurrent demands may not exceed the capacity.
///
/// Example: `[s, e | sz]: 2, [s2, e2 | sz2]: 3 ≤ 4`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CumulativeArgument {
    /// The demanding intervals.
    pub demands: Vec<IntervalDemand>,
    /// The shared resource capacity.
    pub capacity: i64,
}

impl fmt::Display for CumulativeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ≤ {}", join(&self.demands, ", "), self.capacity)
    }
}

/// Payload of an at-least-K/at-most-K/exactly-K constraint; which of the
/// three applies is decided by the invoking method name.
///
/// Example: `a, b, c | 2`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KArgument {
    /// The counted literals.
    pub literals: Vec<String>,
    /// The threshold K.
    pub k: i64,
}

impl fmt::Display for KArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.literals.join(", "), self.k)
    }
}

/// Payload constraining a linear expression to a domain.
///
/// Example: `2*x + y ∈ [0, 5] ∪ [10, 20]`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DomainArgument {
    /// The constrained expression.
    pub expr: LinearExpr,
    /// The admissible values.
    pub domain: Domain,
}

impl fmt::Display for DomainArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ∈ {}", self.expr, self.domain)
    }
}

/// Payload of an element constraint: `target == [variables][index]`.
///
/// Example: `t == [x, y, z][i]`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementArgument {
    /// Variable receiving the selected element.
    pub target: String,
    /// The indexed variables.
    pub variables: Vec<String>,
    /// The index variable.
    pub index: String,
}

impl fmt::Display for ElementArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} == [{}][{}]",
            self.target,
            self.variables.join(", "),
            self.index
        )
    }
}

/// Joins displayable items with a separator.
pub(crate) fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Renders a list of number lists as bracketed groups joined by `∪`.
pub(crate) fn render_numbers_list(groups: &[Vec<i64>]) -> String {
    groups
        .iter()
        .map(|g| format!("[{}]", join(g, ", ")))
        .collect::<Vec<_>>()
        .join(" ∪ ")
}

/// Renders a list of boolean lists as bracketed groups joined by `∪`.
pub(crate) fn render_booleans_list(groups: &[Vec<bool>]) -> String {
    groups
        .iter()
        .map(|g| format!("[{}]", join(g, ", ")))
        .collect::<Vec<_>>()
        .join(" ∪ ")
}
