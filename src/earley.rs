//! Earley recognizer: chart construction over a token stream via the
//! predict/scan/complete inference rules.
//!
//! Items are stored in per-set arenas (`Chart::sets[i]: Vec<Edge>`) and
//! referenced by `(set_index, item_index)` pairs rather than owned
//! pointers, per the arena-with-indices recommendation for a back-pointer
//! structure that is a DAG, not an ownership tree.
//!
//! The recognizer assumes the grammar it is given has already passed
//! through the nullable-production transform: every production has a
//! non-empty right-hand side. This is what lets `complete` only ever look
//! back to an earlier or equal-but-unreachable-same-width set without
//! needing to re-visit predictions made before a same-position completion
//! -- a completed item can only have `origin == i` (the set it completes
//! in) if its production has an empty right-hand side, which cannot occur
//! once the nullable transform has run.

use std::collections::HashSet;
use std::rc::Rc;

use crate::error::ParseError;
use crate::grammar::{identity_reducer, Grammar, Production, Symbol};
use crate::lexicon::Token;
use crate::value::Value;

pub const ACCEPT_SYMBOL: &str = "\u{27e8}ACCEPT\u{27e9}";

/// Index of an item within the chart: `(set_index, item_index)`.
pub type ItemRef = (usize, usize);

#[derive(Clone)]
pub enum Completing {
    Token(Token),
    Item(ItemRef),
}

/// An Earley item (`Edge`): a dotted production plus its origin and the
/// back-pointers that let the derivation builder reconstruct how it was
/// derived.
#[derive(Clone)]
pub struct Edge {
    pub production: Rc<Production>,
    pub dot: usize,
    pub origin: usize,
    pub previous: Option<ItemRef>,
    pub completing: Option<Completing>,
}

impl Edge {
    pub fn is_complete(&self) -> bool {
        self.dot >= self.production.rhs.len()
    }

    fn symbol_after_dot(&self) -> Option<&Symbol> {
        self.production.rhs.get(self.dot)
    }
}

/// `n + 1` ordered, append-only, structurally-deduplicated item sets.
pub struct Chart {
    pub sets: Vec<Vec<Edge>>,
}

impl Chart {
    pub fn item(&self, r: ItemRef) -> &Edge {
        &self.sets[r.0][r.1]
    }
}

fn accept_production(start: &Symbol) -> Rc<Production> {
    Rc::new(Production::new(ACCEPT_SYMBOL, vec![start.clone()], identity_reducer()))
}

/// Identity of an item for deduplication purposes: `(production_identity,
/// dot, origin)`. Production identity is the `Rc` allocation's address --
/// stable within a single grammar since every reference to "the same
/// production" is a clone of the same `Rc`.
fn item_key(edge: &Edge) -> (usize, usize, usize) {
    (Rc::as_ptr(&edge.production) as *const () as usize, edge.dot, edge.origin)
}

fn push(set: &mut Vec<Edge>, seen: &mut HashSet<(usize, usize, usize)>, edge: Edge) {
    let key = item_key(&edge);
    // First-inserted back-pointers win: a duplicate is simply dropped, the
    // existing item (and its back-pointers) is left untouched.
    if seen.insert(key) {
        set.push(edge);
    }
}

/// Build the chart for `tokens` against `grammar`. `grammar` must already
/// be free of empty right-hand sides (run it through the nullable
/// transform first if it has any).
pub fn recognize(grammar: &Grammar, tokens: &[Token]) -> Result<Chart, ParseError> {
    let n = tokens.len();
    log::info!("recognize: {n} tokens against start symbol '{}'", grammar.start_symbol());
    let accept = accept_production(grammar.start_symbol());

    let mut sets: Vec<Vec<Edge>> = (0..=n).map(|_| Vec::new()).collect();
    let mut seen: Vec<HashSet<(usize, usize, usize)>> = (0..=n).map(|_| HashSet::new()).collect();

    push(
        &mut sets[0],
        &mut seen[0],
        Edge { production: accept.clone(), dot: 0, origin: 0, previous: None, completing: None },
    );

    // The nullable transform never emits a production for "the start symbol
    // derives nothing at all" -- that elide-everything variant is dropped
    // as the caller's own responsibility (see nullable::expand_production).
    // When the start symbol is itself nullable, seed an already-complete
    // zero-width ACCEPT item so an empty token stream can still be
    // recognized, yielding the start symbol's recorded null value.
    if let Some(value) = grammar.empty_value().cloned() {
        let epsilon_accept = Rc::new(Production::new(ACCEPT_SYMBOL, vec![], Rc::new(move |_: &[Value]| value.clone())));
        push(
            &mut sets[0],
            &mut seen[0],
            Edge { production: epsilon_accept, dot: 0, origin: 0, previous: None, completing: None },
        );
    }

    for i in 0..=n {
        let mut idx = 0;
        while idx < sets[i].len() {
            let edge = sets[i][idx].clone();
            match edge.symbol_after_dot() {
                None => complete(&mut sets, &mut seen, i, idx, &edge),
                Some(sym) if grammar.is_nonterminal(sym) => predict(grammar, &mut sets[i], &mut seen[i], i, sym),
                Some(sym) => scan(tokens, &mut sets, &mut seen, i, idx, &edge, sym),
            }
            idx += 1;
        }

        if sets[i].is_empty() {
            // Chart set i always corresponds to "after the first i tokens
            // have been considered" -- it can only be empty once at least
            // one token has failed to extend the previous set (the seeded
            // ACCEPT item keeps set 0 non-empty unconditionally), so the
            // token responsible is always i - 1.
            let token_index = i - 1;
            crate::debug_earley_pos!(
                crate::debug::DebugLevel::Basic,
                i,
                "chart set {i} empty -- parse failure at token {token_index}"
            );
            return Err(ParseError::ParseFailure { token_index, token_text: Some(tokens[token_index].text.clone()) });
        }
    }

    log::info!("recognize: accepted, {} chart sets", sets.len());
    Ok(Chart { sets })
}

fn predict(
    grammar: &Grammar,
    set: &mut Vec<Edge>,
    seen: &mut HashSet<(usize, usize, usize)>,
    i: usize,
    symbol: &Symbol,
) {
    crate::debug_earley_pos!(crate::debug::DebugLevel::Trace, i, "predict {symbol}");
    for production in grammar.productions_for(symbol) {
        push(
            set,
            seen,
            Edge { production: production.clone(), dot: 0, origin: i, previous: None, completing: None },
        );
    }
}

fn scan(
    tokens: &[Token],
    sets: &mut [Vec<Edge>],
    seen: &mut [HashSet<(usize, usize, usize)>],
    i: usize,
    idx: usize,
    edge: &Edge,
    expected: &Symbol,
) {
    if i >= tokens.len() || tokens[i].name != *expected {
        return;
    }
    crate::debug_earley_pos!(crate::debug::DebugLevel::Trace, i, "scan {expected} matched '{}'", tokens[i].text);
    let new_edge = Edge {
        production: edge.production.clone(),
        dot: edge.dot + 1,
        origin: edge.origin,
        previous: Some((i, idx)),
        completing: Some(Completing::Token(tokens[i].clone())),
    };
    push(&mut sets[i + 1], &mut seen[i + 1], new_edge);
}

fn complete(
    sets: &mut [Vec<Edge>],
    seen: &mut [HashSet<(usize, usize, usize)>],
    i: usize,
    idx: usize,
    edge: &Edge,
) {
    crate::debug_earley_pos!(crate::debug::DebugLevel::Trace, i, "complete {}", edge.production);
    let j = edge.origin;
    let lhs = edge.production.lhs.clone();
    let completed_ref = (i, idx);

    // Snapshot the length: set j == set i is impossible for a genuinely
    // completed item once the nullable transform has run (see module
    // docs), so this never races against items appended later in set j.
    let predicting_len = sets[j].len();
    for k in 0..predicting_len {
        let predicting = sets[j][k].clone();
        if predicting.symbol_after_dot() == Some(&lhs) {
            let new_edge = Edge {
                production: predicting.production.clone(),
                dot: predicting.dot + 1,
                origin: predicting.origin,
                previous: Some((j, k)),
                completing: Some(Completing::Item(completed_ref)),
            };
            push(&mut sets[i], &mut seen[i], new_edge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Production, Reducer};
    use crate::value::Value;
    use std::rc::Rc;

    fn noop() -> Reducer {
        Rc::new(|_: &[Value]| Value::unit())
    }

    fn tok(name: &str) -> Token {
        Token { name: name.into(), text: name.to_string(), value: Value::unit(), pos: 0 }
    }

    #[test]
    fn accepts_simple_sequence() {
        let grammar = Grammar::new(vec![Production::from_str("S", "a b", noop())], "S");
        let tokens = vec![tok("a"), tok("b")];
        let chart = recognize(&grammar, &tokens).unwrap();
        let last = chart.sets.last().unwrap();
        assert!(last.iter().any(|e| e.production.lhs == ACCEPT_SYMBOL && e.is_complete() && e.origin == 0));
    }

    #[test]
    fn empty_set_reports_parse_failure() {
        let grammar = Grammar::new(vec![Production::from_str("S", "a", noop())], "S");
        let tokens = vec![tok("a"), tok("b")];
        let err = recognize(&grammar, &tokens).unwrap_err();
        match err {
            ParseError::ParseFailure { token_index, .. } => assert_eq!(token_index, 1),
            other => panic!("expected ParseFailure, got {other:?}"),
        }
    }

    #[test]
    fn ambiguous_grammar_still_recognizes() {
        // E -> E plus E | E plus E | n   against  n plus n plus n
        let grammar = Grammar::new(
            vec![
                Production::from_str("E", "E plus E", noop()),
                Production::from_str("E", "E plus E", noop()),
                Production::from_str("E", "n", noop()),
            ],
            "E",
        );
        let tokens = vec![tok("n"), tok("plus"), tok("n"), tok("plus"), tok("n")];
        assert!(recognize(&grammar, &tokens).is_ok());
    }
}
