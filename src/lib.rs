//! A small, general context-free parsing engine built around Earley's
//! algorithm: a regex-driven [`lexicon`], a chart-based [`earley`]
//! recognizer, a [`derivation`] builder that walks completed items
//! invoking user reducer callbacks, a [`nullable`]-production elimination
//! transform, and an [`ebnf`] desugarer for alternation/optional/
//! repetition/grouping right-hand sides.
//!
//! [`parse`] composes the whole pipeline for the common case: scan,
//! recognize, build.

pub mod calculator;
pub mod debug;
pub mod derivation;
pub mod earley;
pub mod ebnf;
pub mod error;
pub mod grammar;
pub mod lexicon;
pub mod node;
pub mod nullable;
pub mod value;

pub use error::ParseError;
pub use grammar::{Grammar, Production, Reducer, Symbol};
pub use lexicon::{Entry, Lexicon, Token};
pub use value::Value;

/// Scan `input` with `lexicon`, recognize it against `grammar` rooted at
/// `start_symbol`, and build the semantic value of the resulting parse.
///
/// `start_symbol` is checked against `grammar.start_symbol()` only in the
/// sense that the recognizer always seeds prediction from whatever start
/// symbol the grammar itself carries -- callers that need a different
/// root should build the grammar with that root in the first place.
pub fn parse(lexicon: &Lexicon, grammar: &Grammar, start_symbol: &str, input: &str) -> Result<Value, ParseError> {
    debug_assert_eq!(grammar.start_symbol(), start_symbol, "grammar built with a different start symbol");

    let tokens = match lexicon.scan(input) {
        Ok(tokens) => tokens,
        Err(err) => {
            report_failure(input, &err, &[]);
            return Err(err);
        }
    };
    let chart = match earley::recognize(grammar, &tokens) {
        Ok(chart) => chart,
        Err(err) => {
            report_failure(input, &err, &tokens);
            return Err(err);
        }
    };
    derivation::build(&chart).inspect_err(|err| report_failure(input, err, &tokens))
}

/// Feed the position-scoped parse-failure report (input, caret, message)
/// when tracing is turned on. Library consumers embedding this engine in a
/// larger program never see this output unless they opted into the
/// engine's own verbose trace format via [`debug::set_debug_level`].
fn report_failure(input: &str, err: &ParseError, tokens: &[lexicon::Token]) {
    let config = debug::get_debug_config();
    if config.level == debug::DebugLevel::Off && !config.failure_only {
        return;
    }
    let position = match err {
        ParseError::UnrecognizedInput(pos) => *pos,
        ParseError::ParseFailure { token_index, .. } => tokens.get(*token_index).map(|t| t.pos).unwrap_or(input.len()),
        ParseError::NoCompleteParse | ParseError::EbnfSyntax(_) => input.len(),
    };
    debug::debug_parse_failure(input, position, &err.to_string());
}
