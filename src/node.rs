//! A generic, grammar-agnostic node tree used by demo reducers that want
//! to build a parse tree rather than a typed value -- e.g. the ad-hoc
//! grammar/input test subcommand, which has no grammar-specific type to
//! reduce into and instead renders whatever shape the grammar produced.

use std::fmt::Write as _;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub label: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(label: impl Into<String>) -> Self {
        Node { label: label.into(), children: Vec::new() }
    }

    pub fn with_children(label: impl Into<String>, children: Vec<Node>) -> Self {
        Node { label: label.into(), children }
    }
}

/// Render `node` as an indented tree, two spaces per level.
pub fn stringify(node: &Node) -> String {
    let mut out = String::new();
    write_indented(node, 0, &mut out);
    out
}

fn write_indented(node: &Node, depth: usize, out: &mut String) {
    let _ = writeln!(out, "{}{}", "  ".repeat(depth), node.label);
    for child in &node.children {
        write_indented(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_has_no_children() {
        let n = Node::leaf("a");
        assert!(n.children.is_empty());
    }

    #[test]
    fn stringify_indents_by_depth() {
        let tree = Node::with_children("item", vec![Node::leaf("5"), Node::with_children("item", vec![Node::leaf("3")])]);
        let text = stringify(&tree);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "item");
        assert_eq!(lines[1], "  5");
        assert_eq!(lines[2], "  item");
        assert_eq!(lines[3], "    3");
    }
}
