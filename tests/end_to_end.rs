use std::rc::Rc;

use earleybird::grammar::{Grammar, Production};
use earleybird::lexicon::{Entry, Lexicon};
use earleybird::value::Value;
use earleybird::{calculator, derivation, earley, ebnf, parse, ParseError};

#[test]
fn arithmetic_scenario() {
    let lexicon = calculator::lexicon();
    let grammar = calculator::grammar();
    let eval = |input: &str| parse(&lexicon, &grammar, "expression4", input).unwrap().expect::<f64>();

    assert_eq!(eval("1+2*3\n"), 7.0);
    assert_eq!(eval("sin(0)+cos(0)"), 1.0);
    assert_eq!(eval("2^3^2"), 512.0);
}

#[test]
fn unary_minus_scenario() {
    let lexicon = calculator::lexicon();
    let grammar = calculator::grammar();
    assert_eq!(parse(&lexicon, &grammar, "expression4", "-3+4").unwrap().expect::<f64>(), 1.0);
    assert!(parse(&lexicon, &grammar, "expression4", "--3").is_err());
}

#[test]
fn function_arity_scenario() {
    let lexicon = calculator::lexicon();
    let grammar = calculator::grammar();
    assert_eq!(parse(&lexicon, &grammar, "expression4", "log(1)").unwrap().expect::<f64>(), 0.0);
    assert_eq!(parse(&lexicon, &grammar, "expression4", "rt(8,3)").unwrap().expect::<f64>(), 2.0);
}

fn number_reducer() -> earleybird::Reducer {
    Rc::new(|vs: &[Value]| vs[0].clone())
}

fn items_or_empty(v: &Value) -> Vec<Value> {
    match v.downcast_ref::<Vec<Value>>() {
        Some(tuple) => tuple[0].expect::<Vec<Value>>(),
        None => Vec::new(),
    }
}

fn list_reducer() -> earleybird::Reducer {
    Rc::new(|vs: &[Value]| Value::new(items_or_empty(&vs[1])))
}

fn flatten(v: &Value) -> String {
    if let Some(n) = v.downcast_ref::<f64>() {
        n.to_string()
    } else if let Some(items) = v.downcast_ref::<Vec<Value>>() {
        format!("[{}]", items.iter().map(flatten).collect::<Vec<_>>().join(","))
    } else {
        "?".to_string()
    }
}

fn ebnf_demo_lexicon() -> Lexicon {
    Lexicon::new(vec![
        Entry::skip(r"\s+"),
        Entry::new(Some("NUMBER"), r"[0-9]+", Rc::new(|t: &str| Value::new(t.parse::<f64>().unwrap()))),
        Entry::literal("LPAREN", r"\("),
        Entry::literal("RPAREN", r"\)"),
        Entry::literal("LBRACE", r"\{"),
        Entry::literal("RBRACE", r"\}"),
        Entry::literal("COMMA", r","),
    ])
}

#[test]
fn ebnf_demo_scenario_produces_exact_nested_structure() {
    let grammar = ebnf::compile(
        vec![
            ("item", "NUMBER", number_reducer()),
            ("item", "(LPAREN|LBRACE) [{item:COMMA}] (RPAREN|RBRACE)", list_reducer()),
        ],
        "item",
    )
    .unwrap();

    let value = parse(&ebnf_demo_lexicon(), &grammar, "item", "({5, 3}, ((1, 2), (4, 7, {)}))").unwrap();
    assert_eq!(flatten(&value), "[[5,3],[[1,2],[4,7,[]]]]");
}

#[test]
fn epsilon_grammar_scenario() {
    let productions = vec![
        Production::from_str(
            "S",
            "A B",
            Rc::new(|vs: &[Value]| Value::new(format!("S({},{})", vs[0].expect::<String>(), vs[1].expect::<String>()))),
        ),
        Production::new("A", vec![], Rc::new(|_: &[Value]| Value::new("A-empty".to_string()))),
        Production::from_str("A", "a", Rc::new(|vs: &[Value]| Value::new(format!("A({})", vs[0].expect::<String>())))),
        Production::from_str("B", "b", Rc::new(|vs: &[Value]| Value::new(format!("B({})", vs[0].expect::<String>())))),
    ];
    let grammar = earleybird::nullable::eliminate_nullables(productions, "S");
    let lexicon = Lexicon::new(vec![Entry::literal("b", "b")]);

    let value = parse(&lexicon, &grammar, "S", "b").unwrap();
    assert_eq!(value.expect::<String>(), "S(A-empty,B(b))");
}

#[test]
fn ambiguity_tie_break_scenario() {
    let noop: earleybird::Reducer = Rc::new(|vs: &[Value]| {
        Value::new(format!("({}+{})", vs[0].expect::<String>(), vs[2].expect::<String>()))
    });
    let tagged: earleybird::Reducer = Rc::new(|vs: &[Value]| {
        Value::new(format!("second-declared({}+{})", vs[0].expect::<String>(), vs[2].expect::<String>()))
    });
    let grammar = Grammar::new(
        vec![
            Production::from_str("E", "E plus E", noop),
            Production::from_str("E", "E plus E", tagged),
            Production::from_str("E", "n", Rc::new(|vs: &[Value]| vs[0].clone())),
        ],
        "E",
    );
    let lexicon = Lexicon::new(vec![
        Entry::skip(r"\s+"),
        Entry::literal("plus", r"\+"),
        Entry::new(Some("n"), "n", Rc::new(|t: &str| Value::new(t.to_string()))),
    ]);
    let value = parse(&lexicon, &grammar, "E", "n+n+n").unwrap();
    assert!(!value.expect::<String>().starts_with("second-declared"));
}

#[test]
fn empty_input_against_nullable_start_yields_null_value() {
    let productions = vec![Production::new("A", vec![], Rc::new(|_: &[Value]| Value::new("empty".to_string())))];
    let grammar = earleybird::nullable::eliminate_nullables(productions, "A");
    let lexicon = Lexicon::new(vec![]);
    let value = parse(&lexicon, &grammar, "A", "").unwrap();
    assert_eq!(value.expect::<String>(), "empty");
}

#[test]
fn empty_input_against_non_nullable_start_fails() {
    let productions = vec![Production::from_str("A", "a", Rc::new(|_: &[Value]| Value::unit()))];
    let grammar = earleybird::nullable::eliminate_nullables(productions, "A");
    let lexicon = Lexicon::new(vec![Entry::literal("a", "a")]);
    assert!(matches!(parse(&lexicon, &grammar, "A", ""), Err(ParseError::NoCompleteParse)));
}

#[test]
fn zero_width_lexicon_entry_is_rejected() {
    let lexicon = Lexicon::new(vec![Entry::new(Some("empty"), "", Rc::new(|_| Value::unit()))]);
    assert!(lexicon.scan("x").is_err());
}

#[test]
fn grammar_with_no_productions_for_start_fails_at_token_zero() {
    let grammar = Grammar::new(vec![], "S");
    let lexicon = Lexicon::new(vec![Entry::literal("a", "a")]);
    match parse(&lexicon, &grammar, "S", "a") {
        Err(ParseError::ParseFailure { token_index, .. }) => assert_eq!(token_index, 0),
        other => panic!("expected ParseFailure at token 0, got {other:?}"),
    }
}

#[test]
fn lexer_round_trip_invariant() {
    let lexicon = calculator::lexicon();
    let input = "12 + 34 * sin(0)";
    let tokens = lexicon.scan(input).unwrap();
    for token in &tokens {
        assert!(input.contains(&token.text));
    }
}

#[test]
fn determinism_across_runs() {
    let lexicon = calculator::lexicon();
    let grammar = calculator::grammar();
    let a = parse(&lexicon, &grammar, "expression4", "1+2*3").unwrap().expect::<f64>();
    let b = parse(&lexicon, &grammar, "expression4", "1+2*3").unwrap().expect::<f64>();
    assert_eq!(a, b);
}

#[test]
fn recognizer_and_derivation_are_reachable_directly() {
    let grammar = Grammar::new(vec![Production::from_str("S", "a", Rc::new(|vs: &[Value]| vs[0].clone()))], "S");
    let lexicon = Lexicon::new(vec![Entry::new(Some("a"), "a", Rc::new(|t: &str| Value::new(t.to_string())))]);
    let tokens = lexicon.scan("a").unwrap();
    let chart = earley::recognize(&grammar, &tokens).unwrap();
    let value = derivation::build(&chart).unwrap();
    assert_eq!(value.expect::<String>(), "a");
}
