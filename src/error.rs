//! Unified error type for every fallible stage: lexing, recognition,
//! derivation, and EBNF grammar compilation. Library consumers match on
//! one `Result` error type regardless of which stage failed.

use std::fmt;

#[derive(Debug, Clone)]
pub enum ParseError {
    /// The lexer could not advance: no entry matched at this character
    /// position.
    UnrecognizedInput(usize),

    /// The recognizer's chart became empty before the end of input. Reports
    /// the index of the first unexpected token and its text.
    ParseFailure { token_index: usize, token_text: Option<String> },

    /// The input was fully tokenized but no derivation of the start symbol
    /// spans it. Purely structural -- there is no single position to blame.
    NoCompleteParse,

    /// A malformed EBNF right-hand side was rejected while desugaring a
    /// grammar, at grammar-construction time rather than at parse time.
    EbnfSyntax(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnrecognizedInput(pos) => {
                write!(f, "unrecognized input at position {pos}")
            }
            ParseError::ParseFailure { token_index, token_text: Some(text) } => {
                write!(f, "parse failure at token {token_index}: unexpected '{text}'")
            }
            ParseError::ParseFailure { token_index, token_text: None } => {
                write!(f, "parse failure at token {token_index}: unexpected end of input")
            }
            ParseError::NoCompleteParse => {
                write!(f, "input tokenized fully but no complete derivation of the start symbol was found")
            }
            ParseError::EbnfSyntax(msg) => write!(f, "malformed EBNF right-hand side: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}
