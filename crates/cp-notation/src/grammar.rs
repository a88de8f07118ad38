//! Declarative grammar for the notation, with a one-time verification pass.
//!
//! [`GRAMMAR`] mirrors `grammar.ebnf`, the human-readable contract binding
//! tokenizer output to valid production shapes. Runtime parsing never walks
//! it; [`verify`] checks it once, at test time, for the properties a usable
//! grammar must have: every referenced nonterminal is defined, everything
//! is reachable from the root, and no production can loop without consuming
//! input.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// A grammar expression.
#[derive(Debug)]
pub enum Expr {
    /// A terminal: a literal token or a lexical class name.
    Term(&'static str),
    /// A reference to another production.
    Rule(&'static str),
    /// All parts in order.
    Seq(&'static [Expr]),
    /// Exactly one of the alternatives.
    Alt(&'static [Expr]),
    /// Zero or one occurrence.
    Opt(&'static Expr),
    /// Zero or more occurrences.
    Rep(&'static Expr),
}

/// A named production.
#[derive(Debug)]
pub struct Production {
    /// The nonterminal's name.
    pub name: &'static str,
    /// Its right-hand side.
    pub expr: Expr,
}

/// Problems [`verify`] can find in a grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A production name appears more than once.
    #[error("production {name} is defined more than once")]
    Duplicate {
        /// The duplicated name.
        name: String,
    },

    /// A production references an undefined nonterminal.
    #[error("production {within} references undefined production {referenced}")]
    Undefined {
        /// The referencing production.
        within: String,
        /// The missing nonterminal.
        referenced: String,
    },

    /// The requested root production does not exist.
    #[error("root production {root} is not defined")]
    MissingRoot {
        /// The requested root.
        root: String,
    },

    /// A production cannot be derived from the root.
    #[error("production {name} is not reachable from {root}")]
    Unreachable {
        /// The orphaned production.
        name: String,
        /// The root it should be reachable from.
        root: String,
    },

    /// A production can re-enter itself without consuming a token.
    #[error("production {name} is left-recursive without progress")]
    LeftRecursive {
        /// The offending production.
        name: String,
    },

    /// A repetition wraps a body that can match the empty string, which
    /// would admit infinitely many empty matches.
    #[error("production {name} repeats a body that can match nothing")]
    EmptyRepetition {
        /// The offending production.
        name: String,
    },
}

use Expr::{Alt, Opt, Rep, Rule, Seq, Term};

/// The grammar, one entry per production in `grammar.ebnf`. Root:
/// `Statement`.
pub static GRAMMAR: &[Production] = &[
    Production {
        name: "Statement",
        expr: Seq(&[
            Opt(&Seq(&[Rule("Variables"), Term("=")])),
            Rule("Method"),
            Opt(&Rule("Enforcement")),
        ]),
    },
    Production {
        name: "Method",
        expr: Seq(&[
            Rule("Receiver"),
            Term("."),
            Term("identifier"),
            Term("("),
            Opt(&Rule("Argument")),
            Term(")"),
        ]),
    },
    Production {
        name: "Receiver",
        expr: Term("identifier"),
    },
    Production {
        name: "Argument",
        expr: Alt(&[
            Rule("AssignmentsArgument"),
            Rule("BinaryOpArgument"),
            Rule("ConstantsArgument"),
            Rule("CumulativeArgument"),
            Rule("KArgument"),
            Rule("DomainArgument"),
            Rule("ElementArgument"),
            Rule("BooleansList"),
            Rule("NumbersList"),
            Rule("Booleans"),
            Rule("Numbers"),
            Rule("Intervals"),
            Rule("Domains"),
            Rule("LinearExprs"),
            Rule("Variables"),
        ]),
    },
    Production {
        name: "Enforcement",
        expr: Seq(&[
            Term("if"),
            Rule("Literal"),
            Rep(&Seq(&[Term("∧"), Rule("Literal")])),
        ]),
    },
    Production {
        name: "Literal",
        expr: Seq(&[Opt(&Term("¬")), Rule("Variable")]),
    },
    Production {
        name: "Variable",
        expr: Term("identifier"),
    },
    Production {
        name: "Variables",
        expr: Seq(&[Rule("Variable"), Rep(&Seq(&[Term(","), Rule("Variable")]))]),
    },
    Production {
        name: "Boolean",
        expr: Alt(&[Term("true"), Term("false")]),
    },
    Production {
        name: "Booleans",
        expr: Seq(&[Rule("Boolean"), Rep(&Seq(&[Term(","), Rule("Boolean")]))]),
    },
    Production {
        name: "BooleansList",
        expr: Seq(&[
            Rule("BooleansGroup"),
            Rep(&Seq(&[Term("∪"), Rule("BooleansGroup")])),
        ]),
    },
    Production {
        name: "BooleansGroup",
        expr: Seq(&[Term("["), Opt(&Rule("Booleans")), Term("]")]),
    },
    Production {
        name: "Number",
        expr: Seq(&[Opt(&Term("-")), Term("integer")]),
    },
    Production {
        name: "Numbers",
        expr: Seq(&[Rule("Number"), Rep(&Seq(&[Term(","), Rule("Number")]))]),
    },
    Production {
        name: "NumbersList",
        expr: Seq(&[
            Rule("NumbersGroup"),
            Rep(&Seq(&[Term("∪"), Rule("NumbersGroup")])),
        ]),
    },
    Production {
        name: "NumbersGroup",
        expr: Seq(&[Term("["), Opt(&Rule("Numbers")), Term("]")]),
    },
    Production {
        name: "Interval",
        expr: Seq(&[
            Term("["),
            Rule("Variable"),
            Term(","),
            Rule("Variable"),
            Term("|"),
            Rule("Variable"),
            Term("]"),
        ]),
    },
    Production {
        name: "Intervals",
        expr: Seq(&[Rule("Interval"), Rep(&Seq(&[Term(","), Rule("Interval")]))]),
    },
    Production {
        name: "IntervalDemand",
        expr: Seq(&[Rule("Interval"), Term(":"), Rule("Number")]),
    },
    Production {
        name: "IntervalDemands",
        expr: Seq(&[
            Rule("IntervalDemand"),
            Rep(&Seq(&[Term(","), Rule("IntervalDemand")])),
        ]),
    },
    Production {
        name: "Domain",
        expr: Seq(&[Rule("Range"), Rep(&Seq(&[Term("∪"), Rule("Range")]))]),
    },
    Production {
        name: "Range",
        expr: Seq(&[
            Term("["),
            Rule("Number"),
            Opt(&Seq(&[Term(","), Rule("Number")])),
            Term("]"),
        ]),
    },
    Production {
        name: "Domains",
        expr: Seq(&[Rule("Domain"), Rep(&Seq(&[Term(","), Rule("Domain")]))]),
    },
    Production {
        name: "LinearTerm",
        expr: Alt(&[
            Seq(&[Rule("Number"), Term("*"), Rule("Variable")]),
            Seq(&[Rule("Variable"), Opt(&Seq(&[Term("*"), Rule("Number")]))]),
        ]),
    },
    Production {
        name: "Summand",
        expr: Alt(&[Rule("LinearTerm"), Rule("Number")]),
    },
    Production {
        name: "LinearExpr",
        expr: Seq(&[
            Opt(&Term("-")),
            Rule("Summand"),
            Rep(&Seq(&[Alt(&[Term("+"), Term("-")]), Rule("Summand")])),
        ]),
    },
    Production {
        name: "LinearExprs",
        expr: Seq(&[
            Rule("LinearExpr"),
            Rep(&Seq(&[Term(","), Rule("LinearExpr")])),
        ]),
    },
    Production {
        name: "AssignmentsArgument",
        expr: Seq(&[Rule("Variables"), Term("∈"), Rule("NumbersList")]),
    },
    Production {
        name: "BinaryOpArgument",
        expr: Seq(&[
            Rule("Variable"),
            Term("=="),
            Rule("Variable"),
            Rule("Operator"),
            Rule("Variable"),
        ]),
    },
    Production {
        name: "Operator",
        expr: Alt(&[Term("+"), Term("-"), Term("*"), Term("/"), Term("%")]),
    },
    Production {
        name: "ConstantsArgument",
        expr: Seq(&[Rule("Variables"), Term("=="), Rule("Numbers")]),
    },
    Production {
        name: "CumulativeArgument",
        expr: Seq(&[Rule("IntervalDemands"), Term("≤"), Rule("Number")]),
    },
    Production {
        name: "KArgument",
        expr: Seq(&[Rule("Variables"), Term("|"), Rule("Number")]),
    },
    Production {
        name: "DomainArgument",
        expr: Seq(&[Rule("LinearExpr"), Term("∈"), Rule("Domain")]),
    },
    Production {
        name: "ElementArgument",
        expr: Seq(&[
            Rule("Variable"),
            Term("=="),
            Term("["),
            Rule("Variables"),
            Term("]"),
            Term("["),
            Rule("Variable"),
            Term("]"),
        ]),
    },
];

/// Checks a grammar once for well-formedness: no duplicate or undefined
/// productions, full reachability from `root`, no left recursion without
/// progress, and no repetition over a body that can match nothing.
pub fn verify(grammar: &[Production], root: &str) -> Result<(), GrammarError> {
    let mut productions: HashMap<&str, &Production> = HashMap::new();
    for p in grammar {
        if productions.insert(p.name, p).is_some() {
            return Err(GrammarError::Duplicate {
                name: p.name.to_string(),
            });
        }
    }

    for p in grammar {
        check_defined(p.name, &p.expr, &productions)?;
    }

    if !productions.contains_key(root) {
        return Err(GrammarError::MissingRoot {
            root: root.to_string(),
        });
    }

    let mut reached: HashSet<&str> = HashSet::new();
    let mut queue: Vec<&str> = vec![root];
    while let Some(name) = queue.pop() {
        if !reached.insert(name) {
            continue;
        }
        if let Some(p) = productions.get(name) {
            collect_rules(&p.expr, &mut queue);
        }
    }
    for p in grammar {
        if !reached.contains(p.name) {
            return Err(GrammarError::Unreachable {
                name: p.name.to_string(),
                root: root.to_string(),
            });
        }
    }

    let nullable = nullable_set(grammar);

    for p in grammar {
        if repeats_nullable(&p.expr, &nullable) {
            return Err(GrammarError::EmptyRepetition {
                name: p.name.to_string(),
            });
        }
    }

    check_left_recursion(grammar, &nullable)
}

fn check_defined(
    within: &str,
    expr: &Expr,
    productions: &HashMap<&str, &Production>,
) -> Result<(), GrammarError> {
    match expr {
        Term(_) => Ok(()),
        Rule(name) => {
            if productions.contains_key(name) {
                Ok(())
            } else {
                Err(GrammarError::Undefined {
                    within: within.to_string(),
                    referenced: name.to_string(),
                })
            }
        }
        Seq(items) | Alt(items) => {
            for item in *items {
                check_defined(within, item, productions)?;
            }
            Ok(())
        }
        Opt(inner) | Rep(inner) => check_defined(within, inner, productions),
    }
}

fn collect_rules<'g>(expr: &'g Expr, out: &mut Vec<&'g str>) {
    match expr {
        Term(_) => {}
        Rule(name) => out.push(*name),
        Seq(items) | Alt(items) => {
            for item in *items {
                collect_rules(item, out);
            }
        }
        Opt(inner) | Rep(inner) => collect_rules(inner, out),
    }
}

/// Computes, to a fixpoint, which productions can derive the empty string.
fn nullable_set(grammar: &[Production]) -> HashSet<&'static str> {
    let mut nullable: HashSet<&'static str> = HashSet::new();
    loop {
        let before = nullable.len();
        for p in grammar {
            if !nullable.contains(p.name) && expr_nullable(&p.expr, &nullable) {
                nullable.insert(p.name);
            }
        }
        if nullable.len() == before {
            return nullable;
        }
    }
}

fn expr_nullable(expr: &Expr, nullable: &HashSet<&'static str>) -> bool {
    match expr {
        Term(_) => false,
        Rule(name) => nullable.contains(name),
        Seq(items) => items.iter().all(|item| expr_nullable(item, nullable)),
        Alt(items) => items.iter().any(|item| expr_nullable(item, nullable)),
        Opt(_) | Rep(_) => true,
    }
}

fn repeats_nullable(expr: &Expr, nullable: &HashSet<&'static str>) -> bool {
    match expr {
        Term(_) | Rule(_) => false,
        Seq(items) | Alt(items) => items.iter().any(|item| repeats_nullable(item, nullable)),
        Opt(inner) => repeats_nullable(inner, nullable),
        Rep(inner) => expr_nullable(inner, nullable) || repeats_nullable(inner, nullable),
    }
}

/// Collects the nonterminals reachable at an expression's left edge, i.e.
/// before any token must have been consumed. Returns whether the whole
/// expression can itself match nothing.
fn leftmost_rules(
    expr: &Expr,
    nullable: &HashSet<&'static str>,
    out: &mut Vec<&'static str>,
) -> bool {
    match expr {
        Term(_) => false,
        Rule(name) => {
            out.push(*name);
            nullable.contains(name)
        }
        Seq(items) => {
            for item in *items {
                if !leftmost_rules(item, nullable, out) {
                    return false;
                }
            }
            true
        }
        Alt(items) => {
            let mut any_nullable = false;
            for item in *items {
                if leftmost_rules(item, nullable, out) {
                    any_nullable = true;
                }
            }
            any_nullable
        }
        Opt(inner) | Rep(inner) => {
            leftmost_rules(inner, nullable, out);
            true
        }
    }
}

fn check_left_recursion(
    grammar: &[Production],
    nullable: &HashSet<&'static str>,
) -> Result<(), GrammarError> {
    let mut edges: HashMap<&str, Vec<&'static str>> = HashMap::new();
    for p in grammar {
        let mut left = Vec::new();
        leftmost_rules(&p.expr, nullable, &mut left);
        edges.insert(p.name, left);
    }

    // Depth-first cycle search over the left-edge graph; a cycle means a
    // production can re-enter itself with no token consumed.
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }
    fn visit(
        name: &'static str,
        edges: &HashMap<&str, Vec<&'static str>>,
        marks: &mut HashMap<&'static str, Mark>,
    ) -> Result<(), GrammarError> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                return Err(GrammarError::LeftRecursive {
                    name: name.to_string(),
                })
            }
            None => {}
        }
        marks.insert(name, Mark::Visiting);
        if let Some(next) = edges.get(name) {
            for n in next {
                visit(*n, edges, marks)?;
            }
        }
        marks.insert(name, Mark::Done);
        Ok(())
    }

    let mut marks = HashMap::new();
    for p in grammar {
        visit(p.name, &edges, &mut marks)?;
    }
    Ok(())
}
