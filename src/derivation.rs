//! Derivation builder: walk the chart's back-pointer DAG from the
//! accepted `⟨ACCEPT⟩` item down to tokens, invoking each production's
//! reducer bottom-up to produce the final semantic value.

use crate::earley::{Chart, Completing, Edge, ItemRef, ACCEPT_SYMBOL};
use crate::error::ParseError;
use crate::value::Value;

/// Find the first completed `⟨ACCEPT⟩` item with origin 0 in the chart's
/// final set, then fold the derivation DAG into a single semantic value.
pub fn build(chart: &Chart) -> Result<Value, ParseError> {
    let final_set = chart.sets.len() - 1;
    let accept_idx = chart.sets[final_set]
        .iter()
        .position(|e| is_accept_item(e) && e.is_complete() && e.origin == 0)
        .ok_or(ParseError::NoCompleteParse)?;

    Ok(value_of_item((final_set, accept_idx), chart))
}

fn is_accept_item(edge: &Edge) -> bool {
    edge.production.lhs == ACCEPT_SYMBOL
}

/// `children(s)`: the completed item's matched-child values, left to
/// right, obtained by walking `previous` back to the start of the
/// production and collecting each step's `completing` value.
fn children_of(item_ref: ItemRef, chart: &Chart) -> Vec<Value> {
    let mut values = Vec::new();
    collect_children(item_ref, chart, &mut values);
    values
}

fn collect_children(item_ref: ItemRef, chart: &Chart, out: &mut Vec<Value>) {
    let item = chart.item(item_ref);
    if let Some(previous) = item.previous {
        collect_children(previous, chart, out);
    }
    if let Some(completing) = &item.completing {
        out.push(value_of_completing(completing, chart));
    }
}

fn value_of_completing(completing: &Completing, chart: &Chart) -> Value {
    match completing {
        Completing::Token(token) => token.value.clone(),
        Completing::Item(item_ref) => value_of_item(*item_ref, chart),
    }
}

fn value_of_item(item_ref: ItemRef, chart: &Chart) -> Value {
    let children = children_of(item_ref, chart);
    let item = chart.item(item_ref);
    (item.production.reducer)(&children)
}
