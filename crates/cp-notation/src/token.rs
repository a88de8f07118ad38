//! Tokenizer for the model-entity notation.
//!
//! Converts raw input text into a lazily-produced stream of classified
//! tokens consumed by the parser. Whitespace is insignificant and skipped;
//! any character outside the lexical classes below is a
//! [`ParseError::Lexical`] carrying its byte offset.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit1, satisfy},
    combinator::{map, opt, recognize, value},
    sequence::pair,
    IResult,
};

use crate::error::{ParseError, ParseResult};

/// Punctuation marks recognized by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Symbol {
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `|`
    Pipe,
    /// `=`
    Assign,
    /// `==`
    EqEq,
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `:`
    Colon,
    /// `∪`, joining domain sub-ranges and list-of-list groups
    Union,
    /// `∧`, joining enforcement literals
    Wedge,
    /// `¬`, negating an enforcement literal
    Negation,
    /// `≤`, preceding a cumulative capacity
    AtMost,
    /// `∈`, relating an expression to its admissible values
    In,
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Symbol::Dot => ".",
            Symbol::Comma => ",",
            Symbol::LParen => "(",
            Symbol::RParen => ")",
            Symbol::LBracket => "[",
            Symbol::RBracket => "]",
            Symbol::Pipe => "|",
            Symbol::Assign => "=",
            Symbol::EqEq => "==",
            Symbol::Star => "*",
            Symbol::Plus => "+",
            Symbol::Minus => "-",
            Symbol::Slash => "/",
            Symbol::Percent => "%",
            Symbol::Colon => ":",
            Symbol::Union => "∪",
            Symbol::Wedge => "∧",
            Symbol::Negation => "¬",
            Symbol::AtMost => "≤",
            Symbol::In => "∈",
        };
        write!(f, "{}", text)
    }
}

/// A classified lexical unit.
///
/// Integer tokens carry their raw text: a leading `-` is captured when it
/// is immediately followed by a digit, and magnitude is deliberately not
/// bound-checked here; the `Number` production owns overflow detection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    /// An identifier: `[A-Za-z_][A-Za-z0-9_]*`, excluding `true`/`false`.
    Ident(String),
    /// An integer literal, kept as raw text.
    Int(String),
    /// The keyword `true` or `false`.
    Bool(bool),
    /// A punctuation mark.
    Symbol(Symbol),
    /// End-of-input sentinel.
    Eof,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "{}", name),
            Token::Int(text) => write!(f, "{}", text),
            Token::Bool(b) => write!(f, "{}", b),
            Token::Symbol(s) => write!(f, "{}", s),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// A token together with the byte offset where it begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    /// The classified token.
    pub token: Token,
    /// Byte offset of the token's first character in the original input.
    pub position: usize,
}

/// Lazily yields [`Spanned`] tokens over an input buffer.
///
/// Purely a function of its input; a fresh tokenizer is created per buffer
/// and owned by one parser for its lifetime.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer over `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, rest: input }
    }

    fn offset(&self) -> usize {
        self.input.len() - self.rest.len()
    }

    /// Produces the next token, or the [`Token::Eof`] sentinel once the
    /// input is exhausted. Repeated calls at end of input keep returning
    /// the sentinel.
    pub fn next_token(&mut self) -> ParseResult<Spanned> {
        self.rest = self.rest.trim_start();
        let position = self.offset();
        let character = match self.rest.chars().next() {
            Some(c) => c,
            None => {
                return Ok(Spanned {
                    token: Token::Eof,
                    position,
                })
            }
        };
        match scan(self.rest) {
            Ok((rest, token)) => {
                self.rest = rest;
                Ok(Spanned { token, position })
            }
            Err(_) => Err(ParseError::Lexical {
                position,
                character,
            }),
        }
    }
}

fn scan(input: &str) -> IResult<&str, Token> {
    // Integers before symbols so that `-3` lexes as one literal while a
    // bare `-` still falls through to the minus symbol.
    alt((word, integer, symbol))(input)
}

fn word(input: &str) -> IResult<&str, Token> {
    let (rest, text) = recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)?;
    let token = match text {
        "true" => Token::Bool(true),
        "false" => Token::Bool(false),
        _ => Token::Ident(text.to_string()),
    };
    Ok((rest, token))
}

fn integer(input: &str) -> IResult<&str, Token> {
    let (rest, text) = recognize(pair(opt(char('-')), digit1))(input)?;
    Ok((rest, Token::Int(text.to_string())))
}

fn symbol(input: &str) -> IResult<&str, Token> {
    map(
        alt((
            value(Symbol::EqEq, tag("==")),
            value(Symbol::Assign, tag("=")),
            value(Symbol::Dot, tag(".")),
            value(Symbol::Comma, tag(",")),
            value(Symbol::LParen, tag("(")),
            value(Symbol::RParen, tag(")")),
            value(Symbol::LBracket, tag("[")),
            value(Symbol::RBracket, tag("]")),
            value(Symbol::Pipe, tag("|")),
            value(Symbol::Star, tag("*")),
            value(Symbol::Plus, tag("+")),
            value(Symbol::Minus, tag("-")),
            value(Symbol::Slash, tag("/")),
            value(Symbol::Percent, tag("%")),
            value(Symbol::Colon, tag(":")),
            value(Symbol::Union, tag("∪")),
            value(Symbol::Wedge, tag("∧")),
            value(Symbol::Negation, tag("¬")),
            value(Symbol::AtMost, tag("≤")),
            value(Symbol::In, tag("∈")),
        )),
        Token::Symbol,
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(input);
        let mut tokens = Vec::new();
        loop {
            let spanned = tokenizer.next_token().expect("input lexes cleanly");
            if spanned.token == Token::Eof {
                return tokens;
            }
            tokens.push(spanned.token);
        }
    }

    #[test]
    fn classifies_words() {
        assert_eq!(
            lex("model x_1 true false iff"),
            vec![
                Token::Ident("model".to_string()),
                Token::Ident("x_1".to_string()),
                Token::Bool(true),
                Token::Bool(false),
                Token::Ident("iff".to_string()),
            ]
        );
    }

    #[test]
    fn attaches_sign_only_before_digit() {
        assert_eq!(
            lex("y-3"),
            vec![
                Token::Ident("y".to_string()),
                Token::Int("-3".to_string()),
            ]
        );
        assert_eq!(
            lex("y - 3"),
            vec![
                Token::Ident("y".to_string()),
                Token::Symbol(Symbol::Minus),
                Token::Int("3".to_string()),
            ]
        );
        assert_eq!(
            lex("x - y"),
            vec![
                Token::Ident("x".to_string()),
                Token::Symbol(Symbol::Minus),
                Token::Ident("y".to_string()),
            ]
        );
    }

    #[test]
    fn keeps_raw_integer_text() {
        // Magnitude checks belong to the Number production, not the lexer.
        assert_eq!(
            lex("99999999999999999999"),
            vec![Token::Int("99999999999999999999".to_string())]
        );
    }

    #[test]
    fn recognizes_unicode_symbols() {
        assert_eq!(
            lex("[0, 5] ∪ [10, 20]"),
            vec![
                Token::Symbol(Symbol::LBracket),
                Token::Int("0".to_string()),
                Token::Symbol(Symbol::Comma),
                Token::Int("5".to_string()),
                Token::Symbol(Symbol::RBracket),
                Token::Symbol(Symbol::Union),
                Token::Symbol(Symbol::LBracket),
                Token::Int("10".to_string()),
                Token::Symbol(Symbol::Comma),
                Token::Int("20".to_string()),
                Token::Symbol(Symbol::RBracket),
            ]
        );
        assert_eq!(
            lex("if a ∧ ¬b"),
            vec![
                Token::Ident("if".to_string()),
                Token::Ident("a".to_string()),
                Token::Symbol(Symbol::Wedge),
                Token::Symbol(Symbol::Negation),
                Token::Ident("b".to_string()),
            ]
        );
    }

    #[test]
    fn splits_assign_from_equality() {
        assert_eq!(
            lex("= =="),
            vec![
                Token::Symbol(Symbol::Assign),
                Token::Symbol(Symbol::EqEq),
            ]
        );
    }

    #[test]
    fn reports_byte_offsets() {
        let mut tokenizer = Tokenizer::new("  x ∪ y");
        let first = tokenizer.next_token().expect("ident");
        assert_eq!(first.position, 2);
        let second = tokenizer.next_token().expect("union");
        assert_eq!(second.position, 4);
        // ∪ is three bytes long.
        let third = tokenizer.next_token().expect("ident");
        assert_eq!(third.position, 8);
        let end = tokenizer.next_token().expect("eof");
        assert_eq!(end.token, Token::Eof);
        assert_eq!(end.position, 9);
    }

    #[test]
    fn rejects_unrecognized_characters() {
        let mut tokenizer = Tokenizer::new("x @ y");
        assert!(tokenizer.next_token().is_ok());
        assert_eq!(
            tokenizer.next_token(),
            Err(ParseError::Lexical {
                position: 2,
                character: '@',
            })
        );
    }

    #[test]
    fn empty_input_is_eof() {
        let mut tokenizer = Tokenizer::new("   ");
        let spanned = tokenizer.next_token().expect("eof");
        assert_eq!(spanned.token, Token::Eof);
        assert_eq!(spanned.position, 3);
    }
}
