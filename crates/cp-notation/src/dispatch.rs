//! Command-name dispatch over the parser's entry points.
//!
//! Test harnesses drive the parser through a fixed vocabulary of command
//! names, each mapping 1:1 to one entry point. The mapping lives here so
//! the parser itself stays free of any knowledge of the vocabulary. Every
//! invocation parses, renders the result canonically, and then runs the
//! end-of-input check, so leftover fixture text surfaces as
//! [`ParseError::TrailingInput`].

use thiserror::Error;

use crate::ast;
use crate::error::ParseError;
use crate::parser::Parser;

/// Errors produced when driving the parser by command name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// The command is not part of the vocabulary. A harness-level mistake,
    /// distinct from any parse failure.
    #[error("unrecognized command: {0}")]
    UnknownCommand(String),

    /// The input failed to parse, or left trailing tokens.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The command vocabulary, in the order the entry points are defined.
pub const COMMANDS: &[&str] = &[
    "receiver",
    "identifier",
    "method",
    "variable",
    "variables",
    "enforcement",
    "interval",
    "boolean",
    "booleans",
    "number",
    "numbers",
    "intervals",
    "interval-demand",
    "domain",
    "linear-term",
    "linear-expr",
    "linear-exprs",
    "domains",
    "statement",
    "numbers-list",
    "booleans-list",
    "assignments-argument",
    "binary-op-argument",
    "constants-argument",
    "cumulative-argument",
    "k-argument",
    "domain-argument",
    "element-argument",
];

/// Parses `input` with the entry point named by `command` and returns the
/// canonical rendering of the result.
pub fn run_command(command: &str, input: &str) -> Result<String, HarnessError> {
    let mut p = Parser::new(input);
    let out = match command {
        "receiver" => p.receiver()?,
        "identifier" => p.identifier()?,
        "method" => p.method()?.to_string(),
        "variable" => p.variable()?,
        "variables" => p.variables()?.join(", "),
        "enforcement" => p.enforcement()?.to_string(),
        "interval" => p.interval()?.to_string(),
        "boolean" => p.boolean()?.to_string(),
        "booleans" => ast::join(&p.booleans()?, ", "),
        "number" => p.number()?.to_string(),
        "numbers" => ast::join(&p.numbers()?, ", "),
        "intervals" => ast::join(&p.intervals()?, ", "),
        "interval-demand" => p.interval_demand()?.to_string(),
        "domain" => p.domain()?.to_string(),
        "linear-term" => p.linear_term()?.to_string(),
        "linear-expr" => p.linear_expr()?.to_string(),
        "linear-exprs" => ast::join(&p.linear_exprs()?, ", "),
        "domains" => ast::join(&p.domains()?, ", "),
        "statement" => p.statement()?.to_string(),
        "numbers-list" => ast::render_numbers_list(&p.numbers_list()?),
        "booleans-list" => ast::render_booleans_list(&p.booleans_list()?),
        "assignments-argument" => p.assignments_argument()?.to_string(),
        "binary-op-argument" => p.binary_op_argument()?.to_string(),
        "constants-argument" => p.constants_argument()?.to_string(),
        "cumulative-argument" => p.cumulative_argument()?.to_string(),
        "k-argument" => p.k_argument()?.to_string(),
        "domain-argument" => p.domain_argument()?.to_string(),
        "element-argument" => p.element_argument()?.to_string(),
        other => return Err(HarnessError::UnknownCommand(other.to_string())),
    };
    p.expect_eof()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_commands() {
        assert_eq!(run_command("identifier", "model").expect("parses"), "model");
        assert_eq!(run_command("boolean", "true").expect("parses"), "true");
        assert_eq!(run_command("number", "-42").expect("parses"), "-42");
    }

    #[test]
    fn list_commands_join_with_commas() {
        assert_eq!(
            run_command("booleans", "true,false,  true").expect("parses"),
            "true, false, true"
        );
        assert_eq!(
            run_command("domains", "[0, 1] ∪ [3, 4],[7, 9]").expect("parses"),
            "[0, 1] ∪ [3, 4], [7, 9]"
        );
    }

    #[test]
    fn list_of_list_commands_join_groups_with_union() {
        assert_eq!(
            run_command("numbers-list", "[1,2] ∪ [3,4]").expect("parses"),
            "[1, 2] ∪ [3, 4]"
        );
        assert_eq!(
            run_command("booleans-list", "[true] ∪ []").expect("parses"),
            "[true] ∪ []"
        );
    }

    #[test]
    fn argument_commands() {
        assert_eq!(
            run_command("cumulative-argument", "[s,e|sz]:2 ≤ 4").expect("parses"),
            "[s, e | sz]: 2 ≤ 4"
        );
        assert_eq!(
            run_command("element-argument", "t==[x,y,z][i]").expect("parses"),
            "t == [x, y, z][i]"
        );
    }

    #[test]
    fn unknown_commands_are_a_harness_error() {
        assert_eq!(
            run_command("objective", "x"),
            Err(HarnessError::UnknownCommand("objective".to_string()))
        );
    }

    #[test]
    fn trailing_input_is_checked_after_the_production() {
        let err = run_command("number", "5 x").expect_err("x is left over");
        assert!(matches!(
            err,
            HarnessError::Parse(ParseError::TrailingInput { .. })
        ));
    }

    #[test]
    fn every_command_is_recognized() {
        for &command in COMMANDS {
            // An empty input never parses, but it must fail in the parser,
            // not as an unknown command.
            match run_command(command, "") {
                Err(HarnessError::UnknownCommand(_)) => {
                    panic!("{command} fell through the dispatch table")
                }
                Ok(_) | Err(HarnessError::Parse(_)) => {}
            }
        }
    }
}
