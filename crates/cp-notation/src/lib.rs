//! # cp-notation
//!
//! A parser for the canonical textual notation of constraint-programming
//! model entities: variables, domains, intervals, linear expressions, and
//! the typed argument payloads of global constraints.
//!
//! The notation is what a model's own string serialization emits; this
//! crate accepts exactly that notation and materializes typed, inspectable
//! nodes that re-render to canonical text, so fixtures can be checked by
//! round-trip equality regardless of incidental whitespace.
//!
//! ## Usage
//!
//! ```rust
//! use cp_notation::Parser;
//!
//! let mut parser = Parser::new("[0, 5] ∪ [10, 20]");
//! let domain = parser.domain().unwrap();
//! parser.expect_eof().unwrap();
//!
//! assert_eq!(domain.ranges.len(), 2);
//! assert_eq!(domain.to_string(), "[0, 5] ∪ [10, 20]");
//! ```
//!
//! Test harnesses can drive the parser through its command vocabulary
//! instead of naming entry points directly:
//!
//! ```rust
//! use cp_notation::run_command;
//!
//! let out = run_command("linear-expr", "2*x + y - 3").unwrap();
//! assert_eq!(out, "2*x + y - 3");
//! ```
//!
//! ## Notation quick reference
//!
//! | Entity | Example |
//! |--------|---------|
//! | Domain | `[0, 5] ∪ [10, 20]` |
//! | Interval | `[start, end \| size]` |
//! | Interval with demand | `[start, end \| size]: 2` |
//! | Linear expression | `2*x + y - 3` |
//! | Enforcement clause | `if a ∧ ¬b` |
//! | Statement | `x = model.new_int_var([0, 10])` |
//! | Allowed assignments | `x, y ∈ [0, 1] ∪ [2, 3]` |
//! | Binary operation | `t == x / y` |
//! | Cumulative | `[s, e \| sz]: 2 ≤ 4` |
//! | Element | `t == [x, y, z][i]` |
//!
//! The normative grammar lives in `grammar.ebnf`, mirrored by the
//! declarative table in [`grammar`] and checked once at test time for
//! well-formedness and reachability from the `Statement` root.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod ast;
mod dispatch;
mod error;
pub mod grammar;
mod parser;
mod token;

pub use ast::{
    AssignmentsArgument, BinaryOpArgument, BinaryOperator, ConstantsArgument,
    CumulativeArgument, Domain, DomainArgument, ElementArgument, Enforcement,
    EnforcementLiteral, Interval, IntervalDemand, KArgument, LinearExpr, LinearTerm, Method,
    Operand, Range, Statement,
};
pub use dispatch::{run_command, HarnessError, COMMANDS};
pub use error::{ParseError, ParseResult};
pub use parser::Parser;
pub use token::{Spanned, Symbol, Token, Tokenizer};
