//! Grammar model: productions indexed by left-hand side, preserving
//! declaration order (the tie-break for ambiguous derivations).
//!
//! A grammar is a flat list of [`Production`]s plus a designated start
//! symbol. Symbols are bare [`SmolStr`] identifiers; a symbol is a
//! *nonterminal* iff it appears as some production's left-hand side,
//! otherwise it is a *terminal* matched against token names.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::value::Value;

pub type Symbol = SmolStr;

/// A reducer takes the semantic values of a production's matched children,
/// left-to-right, and returns the semantic value of the left-hand side.
pub type Reducer = Rc<dyn Fn(&[Value]) -> Value>;

/// `(lhs, rhs, reducer)`. Compared by structural equality of `(lhs, rhs)`
/// only -- the reducer is not part of identity, matching the data model's
/// rule that two productions are "the same production" if they'd expand
/// to the same items regardless of what their reducers compute.
#[derive(Clone)]
pub struct Production {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
    pub reducer: Reducer,
}

impl Production {
    pub fn new(lhs: impl Into<Symbol>, rhs: Vec<Symbol>, reducer: Reducer) -> Self {
        Production { lhs: lhs.into(), rhs, reducer }
    }

    /// Convenience constructor matching the external-interface rule that
    /// `rhs` may be given as a single space-separated string.
    pub fn from_str(lhs: impl Into<Symbol>, rhs: &str, reducer: Reducer) -> Self {
        let rhs = rhs.split_whitespace().map(Symbol::new).collect();
        Production::new(lhs, rhs, reducer)
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl PartialEq for Production {
    fn eq(&self, other: &Self) -> bool {
        self.lhs == other.lhs && self.rhs == other.rhs
    }
}
impl Eq for Production {}

impl fmt::Debug for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.lhs, self.rhs.join(" "))
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rhs.is_empty() {
            write!(f, "{} -> \u{03b5}", self.lhs)
        } else {
            write!(f, "{} -> {}", self.lhs, self.rhs.join(" "))
        }
    }
}

/// Owns every production in the grammar, indexed by left-hand side while
/// preserving declaration order within each nonterminal's entry.
#[derive(Clone)]
pub struct Grammar {
    productions: Vec<Rc<Production>>,
    by_lhs: HashMap<Symbol, Vec<Rc<Production>>>,
    start_symbol: Symbol,
    /// The null value of the start symbol, if it is nullable -- set by the
    /// nullable transform, which alone knows that value. Lets the
    /// recognizer accept empty input directly against a nullable start
    /// symbol without needing a non-empty production to drive through.
    empty_value: Option<Value>,
}

impl Grammar {
    pub fn new(productions: Vec<Production>, start_symbol: impl Into<Symbol>) -> Self {
        let mut by_lhs: HashMap<Symbol, Vec<Rc<Production>>> = HashMap::new();
        let mut all = Vec::with_capacity(productions.len());
        for p in productions {
            let p = Rc::new(p);
            by_lhs.entry(p.lhs.clone()).or_default().push(p.clone());
            all.push(p);
        }
        let start_symbol = start_symbol.into();
        log::debug!("grammar constructed: {} productions, start={start_symbol}", all.len());
        Grammar { productions: all, by_lhs, start_symbol, empty_value: None }
    }

    pub fn start_symbol(&self) -> &Symbol {
        &self.start_symbol
    }

    /// The start symbol's null value, if the nullable transform determined
    /// the start symbol can derive the empty token sequence.
    pub fn empty_value(&self) -> Option<&Value> {
        self.empty_value.as_ref()
    }

    pub(crate) fn with_empty_value(mut self, value: Value) -> Self {
        self.empty_value = Some(value);
        self
    }

    pub fn productions(&self) -> impl Iterator<Item = &Rc<Production>> {
        self.productions.iter()
    }

    /// Productions for `lhs` in declaration order; empty slice if `lhs`
    /// never appears as a left-hand side (it's a terminal, or unreachable).
    pub fn productions_for(&self, lhs: &str) -> &[Rc<Production>] {
        self.by_lhs.get(lhs).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.by_lhs.contains_key(symbol)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = string_builder::Builder::default();
        for p in &self.productions {
            builder.append(p.to_string());
            builder.append("\n");
        }
        write!(f, "{}", builder.string().unwrap_or_default())
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grammar(start={}, {} productions)", self.start_symbol, self.productions.len())
    }
}

/// Builds a `Reducer` that ignores its children and always returns the
/// same precomputed value -- used for constant terminals and the
/// synthetic ACCEPT production's identity reducer.
pub fn identity_reducer() -> Reducer {
    Rc::new(|values: &[Value]| values.first().cloned().unwrap_or_else(Value::unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Reducer {
        Rc::new(|_: &[Value]| Value::unit())
    }

    #[test]
    fn preserves_declaration_order() {
        let g = Grammar::new(
            vec![
                Production::from_str("E", "E plus E", noop()),
                Production::from_str("E", "E plus E", noop()),
                Production::from_str("E", "n", noop()),
            ],
            "E",
        );
        assert_eq!(g.productions_for("E").len(), 3);
        assert_eq!(g.productions_for("E")[0].rhs, g.productions_for("E")[1].rhs);
    }

    #[test]
    fn terminals_are_not_nonterminals() {
        let g = Grammar::new(vec![Production::from_str("E", "n", noop())], "E");
        assert!(g.is_nonterminal("E"));
        assert!(!g.is_nonterminal("n"));
    }
}
