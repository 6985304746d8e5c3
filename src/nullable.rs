//! Nullable-production elimination: rewrites a grammar that may contain
//! empty right-hand sides into an equivalent grammar that doesn't, so the
//! recognizer (which assumes every production consumes at least one
//! position on every derivation step) can run over it directly.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::grammar::{Grammar, Production, Reducer, Symbol};
use crate::value::Value;

/// Step 1: the fixed-point set of nullable nonterminals, and step 1's
/// side effect -- the recorded "null value" reducer result for each of
/// them (first-declared empty production wins, recursively resolved
/// through chains of nullable nonterminals).
fn compute_nullable(by_lhs: &HashMap<Symbol, Vec<Production>>) -> HashSet<Symbol> {
    let mut nullable: HashSet<Symbol> = HashSet::new();
    loop {
        let mut changed = false;
        for (lhs, productions) in by_lhs {
            if nullable.contains(lhs) {
                continue;
            }
            let is_nullable = productions
                .iter()
                .any(|p| p.rhs.iter().all(|s| nullable.contains(s)));
            if is_nullable {
                nullable.insert(lhs.clone());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    nullable
}

fn null_value(
    symbol: &Symbol,
    cache: &mut HashMap<Symbol, Value>,
    by_lhs: &HashMap<Symbol, Vec<Production>>,
    nullable: &HashSet<Symbol>,
) -> Value {
    if let Some(v) = cache.get(symbol) {
        return v.clone();
    }
    let productions = &by_lhs[symbol];
    for production in productions {
        if production.rhs.iter().all(|s| nullable.contains(s)) {
            let args: Vec<Value> = production
                .rhs
                .iter()
                .map(|s| null_value(s, cache, by_lhs, nullable))
                .collect();
            let value = (production.reducer)(&args);
            cache.insert(symbol.clone(), value.clone());
            return value;
        }
    }
    panic!("'{symbol}' is nullable but no all-nullable production was found for it");
}

/// All subsets of `items`, as index lists -- used to enumerate which
/// nullable right-hand-side positions to elide for a given production.
fn powerset(items: &[usize]) -> Vec<Vec<usize>> {
    let mut subsets = vec![Vec::new()];
    for &item in items {
        let grown: Vec<Vec<usize>> = subsets
            .iter()
            .map(|s| {
                let mut s = s.clone();
                s.push(item);
                s
            })
            .collect();
        subsets.extend(grown);
    }
    subsets
}

/// Step 2 for a single production: one output production per subset of
/// its nullable positions, excluding the subset that elides everything
/// (that variant is the nonterminal's own nullability, handled by the
/// caller's predict-time elision rather than re-emitted here).
fn expand_production(production: &Production, nullable: &HashSet<Symbol>, null_values: &HashMap<Symbol, Value>) -> Vec<Production> {
    let nullable_positions: Vec<usize> = production
        .rhs
        .iter()
        .enumerate()
        .filter(|(_, s)| nullable.contains(*s))
        .map(|(i, _)| i)
        .collect();

    let mut variants = Vec::new();
    for elided in powerset(&nullable_positions) {
        if elided.len() == production.rhs.len() {
            continue; // would erase the whole rhs -- dropped
        }
        let elided: HashSet<usize> = elided.into_iter().collect();
        let new_rhs: Vec<Symbol> = production
            .rhs
            .iter()
            .enumerate()
            .filter(|(i, _)| !elided.contains(i))
            .map(|(_, s)| s.clone())
            .collect();

        let elided_values: Vec<(usize, Value)> = elided
            .iter()
            .map(|&i| (i, null_values[&production.rhs[i]].clone()))
            .collect();
        let inner = production.reducer.clone();
        let rhs_len = production.rhs.len();

        let reducer: Reducer = Rc::new(move |args: &[Value]| {
            let mut full = Vec::with_capacity(rhs_len);
            let mut next_arg = args.iter();
            for i in 0..rhs_len {
                if let Some((_, v)) = elided_values.iter().find(|(idx, _)| *idx == i) {
                    full.push(v.clone());
                } else {
                    full.push(next_arg.next().expect("argument count mismatch in elided-position reconstruction").clone());
                }
            }
            inner(&full)
        });

        variants.push(Production::new(production.lhs.clone(), new_rhs, reducer));
    }
    variants
}

/// Eliminate empty right-hand sides from `productions`, returning an
/// equivalent `Grammar` suitable for the recognizer.
pub fn eliminate_nullables(productions: Vec<Production>, start_symbol: impl Into<Symbol>) -> Grammar {
    let start_symbol: Symbol = start_symbol.into();
    let mut by_lhs: HashMap<Symbol, Vec<Production>> = HashMap::new();
    for p in &productions {
        by_lhs.entry(p.lhs.clone()).or_default().push(p.clone());
    }

    let nullable = compute_nullable(&by_lhs);
    let mut null_values = HashMap::new();
    for symbol in &nullable {
        null_value(symbol, &mut null_values, &by_lhs, &nullable);
    }

    let mut output = Vec::new();
    for production in &productions {
        if production.is_empty() {
            continue; // only ever used to seed null_values above
        }
        output.extend(expand_production(production, &nullable, &null_values));
    }

    let grammar = Grammar::new(output, start_symbol.clone());
    // The variant expansion above never re-emits the "elide everything"
    // case for a production whose every symbol was elided -- that's the
    // start symbol's own nullability, which the recognizer has no normal
    // production to derive through. Stash its null value on the grammar so
    // an empty-input parse can short-circuit straight to it (see
    // earley::recognize).
    match null_values.get(&start_symbol) {
        Some(value) => grammar.with_empty_value(value.clone()),
        None => grammar,
    }
}
