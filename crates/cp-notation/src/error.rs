//! Error types for notation parsing.

use thiserror::Error;

/// Errors that can occur while parsing notation text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The tokenizer hit a character outside every lexical class.
    #[error("lexical error at offset {position}: unrecognized character {character:?}")]
    Lexical {
        /// Byte offset of the offending character.
        position: usize,
        /// The character that could not be classified.
        character: char,
    },

    /// The token sequence does not match the invoked production.
    #[error("syntax error at offset {position}: expected {expected}, found {found}")]
    Syntax {
        /// Byte offset of the token that failed to match.
        position: usize,
        /// What the production required at this point.
        expected: String,
        /// What was found instead.
        found: String,
    },

    /// Input remained after an entry point consumed its production.
    ///
    /// Distinct from [`ParseError::Syntax`]: the production itself matched,
    /// but the fixture contained more than it was meant to cover.
    #[error("unexpected trailing input at offset {position}: found {found}")]
    TrailingInput {
        /// Byte offset of the first unconsumed token.
        position: usize,
        /// The first unconsumed token.
        found: String,
    },
}

/// Result type for parse operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
