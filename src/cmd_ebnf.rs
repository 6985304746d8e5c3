//! EBNF-demo subcommand: exercises the EBNF front end directly against
//! the fixed grammar `item ::= NUMBER | (LPAREN|LBRACE) [{item:COMMA}]
//! (RPAREN|RBRACE)`, rendering the resulting nested-list semantic value
//! through the generic node-tree pretty-printer.

use std::rc::Rc;

use argh::FromArgs;

use earleybird::ebnf;
use earleybird::lexicon::{Entry, Lexicon};
use earleybird::node::{self, Node};
use earleybird::value::Value;
use earleybird::{debug, parse, Reducer};

#[derive(FromArgs)]
/// parse an input line against the fixed bracketed-list EBNF demo grammar
#[argh(subcommand, name = "ebnf")]
pub struct Ebnf {
    /// input line to parse
    #[argh(option, short = 'i')]
    input: String,

    /// verbosity level: off, basic, detailed, trace
    #[argh(option, short = 'v', default = "default_verbose()")]
    verbose: String,
}

fn default_verbose() -> String {
    "off".to_string()
}

fn lexicon() -> Lexicon {
    Lexicon::new(vec![
        Entry::skip(r"\s+"),
        Entry::new(Some("NUMBER"), r"[0-9]+(\.[0-9]+)?", Rc::new(|t: &str| Value::new(t.parse::<f64>().unwrap()))),
        Entry::literal("LPAREN", r"\("),
        Entry::literal("RPAREN", r"\)"),
        Entry::literal("LBRACE", r"\{"),
        Entry::literal("RBRACE", r"\}"),
        Entry::literal("COMMA", r","),
    ])
}

fn number_reducer() -> Reducer {
    Rc::new(|vs: &[Value]| vs[0].clone())
}

/// `i and i[0] or []` rendered literally: a present optional yields its
/// inner list, an absent one yields an empty list.
fn items_or_empty(v: &Value) -> Vec<Value> {
    match v.downcast_ref::<Vec<Value>>() {
        Some(tuple) => tuple[0].expect::<Vec<Value>>(),
        None => Vec::new(),
    }
}

fn list_reducer() -> Reducer {
    Rc::new(|vs: &[Value]| Value::new(items_or_empty(&vs[1])))
}

fn value_to_node(v: &Value) -> Node {
    if let Some(n) = v.downcast_ref::<f64>() {
        Node::leaf(n.to_string())
    } else if let Some(items) = v.downcast_ref::<Vec<Value>>() {
        Node::with_children("list", items.iter().map(value_to_node).collect())
    } else {
        Node::leaf("?")
    }
}

impl Ebnf {
    pub fn run(self) {
        let level = debug::DebugLevel::from_str(&self.verbose).unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        });
        debug::set_debug_level(level);

        let grammar = match ebnf::compile(
            vec![
                ("item", "NUMBER", number_reducer()),
                ("item", "(LPAREN|LBRACE) [{item:COMMA}] (RPAREN|RBRACE)", list_reducer()),
            ],
            "item",
        ) {
            Ok(grammar) => grammar,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        };

        match parse(&lexicon(), &grammar, "item", &self.input) {
            Ok(value) => println!("{}", node::stringify(&value_to_node(&value))),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}
