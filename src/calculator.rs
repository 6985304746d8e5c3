//! The arithmetic-expression demonstration grammar: a full floating-point
//! expression evaluator with named constants, named functions, and the
//! usual operator-precedence ladder (unary sign, `+`/`-`, `*`/`/`/`%`/`//`,
//! right-associative `^`).
//!
//! Constants and functions are resolved generically by name at reduce
//! time rather than via one grammar production per name -- a wrong
//! argument count is therefore a reducer-time panic (propagated to the
//! `parse` caller per the engine's error-handling rules), not a distinct
//! grammar-level rejection.

use std::f64::consts as f64c;
use std::rc::Rc;

use crate::grammar::{Grammar, Production, Reducer};
use crate::lexicon::{Entry, Lexicon};
use crate::value::Value;

fn constant(name: &str) -> f64 {
    match name {
        "PI" => f64c::PI,
        "E" => f64c::E,
        "PHI" => 1.618_033_988_749_894_8,
        "GAMMA" => 0.577_215_664_901_532_86,
        other => panic!("unknown constant '{other}'"),
    }
}

/// Lanczos approximation; std has no `gamma` function.
fn gamma_fn(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma_fn(1.0 - x))
    } else {
        let x = x - 1.0;
        let mut a = COEFFS[0];
        let t = x + G + 0.5;
        for (i, c) in COEFFS.iter().enumerate().skip(1) {
            a += c / (x + i as f64);
        }
        (2.0 * std::f64::consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * a
    }
}

/// Abramowitz & Stegun 7.1.26; std has no `erf` function.
fn erf_fn(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let a1 = 0.254_829_592;
    let a2 = -0.284_496_736;
    let a3 = 1.421_413_741;
    let a4 = -1.453_152_027;
    let a5 = 1.061_405_429;
    let p = 0.327_591_1;
    let t = 1.0 / (1.0 + p * x);
    let poly = ((((a5 * t + a4) * t + a3) * t + a2) * t + a1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

fn call_function(name: &str, args: &[f64]) -> f64 {
    match (name, args) {
        ("sin", [x]) => x.sin(),
        ("cos", [x]) => x.cos(),
        ("tan", [x]) => x.tan(),
        ("asin", [x]) => x.asin(),
        ("acos", [x]) => x.acos(),
        ("atan", [x]) => x.atan(),
        ("sqrt", [x]) => x.sqrt(),
        ("exp", [x]) => x.exp(),
        ("log", [x]) => x.ln(),
        ("ln", [x]) => x.ln(),
        ("log10", [x]) => x.log10(),
        ("floor", [x]) => x.floor(),
        ("ceil", [x]) => x.ceil(),
        ("abs", [x]) => x.abs(),
        ("erf", [x]) => erf_fn(*x),
        ("gamma", [x]) => gamma_fn(*x),
        ("rt", [x, n]) => x.powf(1.0 / n),
        (other, _) => panic!("function '{other}' called with {} argument(s)", args.len()),
    }
}

fn binary_op(op: &str, l: f64, r: f64) -> f64 {
    match op {
        "+" => l + r,
        "-" => l - r,
        "*" => l * r,
        "/" => l / r,
        "%" => l % r,
        "//" => (l / r).floor(),
        "^" => l.powf(r),
        other => panic!("unknown operator '{other}'"),
    }
}

fn f64_reducer(f: impl Fn(&[Value]) -> f64 + 'static) -> Reducer {
    Rc::new(move |vs: &[Value]| Value::new(f(vs)))
}

pub fn lexicon() -> Lexicon {
    Lexicon::new(vec![
        Entry::skip(r"\s+"),
        Entry::literal("lparen", r"\("),
        Entry::literal("rparen", r"\)"),
        Entry::literal("comma", r","),
        Entry::new(Some("number"), r"[0-9]+(\.[0-9]+)?", Rc::new(|t: &str| Value::new(t.parse::<f64>().unwrap()))),
        Entry::literal("op0", r"[+-]"),
        Entry::literal("op1", r"//|[*/%]"),
        Entry::literal("op2", r"\^"),
        Entry::new(Some("ident"), r"[a-zA-Z_][a-zA-Z0-9_]*", Rc::new(|t: &str| Value::new(smol_str::SmolStr::new(t)))),
    ])
}

pub fn grammar() -> Grammar {
    use smol_str::SmolStr;

    let number: Reducer = f64_reducer(|vs| vs[0].expect::<f64>());
    let constant_ref: Reducer = f64_reducer(|vs| constant(&vs[0].expect::<SmolStr>()));
    let call_no_args: Reducer = f64_reducer(|vs| call_function(&vs[0].expect::<SmolStr>(), &[]));
    let call_with_args: Reducer = f64_reducer(|vs| call_function(&vs[0].expect::<SmolStr>(), &vs[2].expect::<Vec<f64>>()));
    let parens: Reducer = f64_reducer(|vs| vs[1].expect::<f64>());

    let arglist_one: Reducer = Rc::new(|vs: &[Value]| Value::new(vec![vs[0].expect::<f64>()]));
    let arglist_more: Reducer = Rc::new(|vs: &[Value]| {
        let mut list = vs[0].expect::<Vec<f64>>();
        list.push(vs[2].expect::<f64>());
        Value::new(list)
    });

    let pass_through: Reducer = f64_reducer(|vs| vs[0].expect::<f64>());
    let unary: Reducer = f64_reducer(|vs| {
        let sign = vs[0].expect::<SmolStr>();
        let v = vs[1].expect::<f64>();
        if sign == "-" { -v } else { v }
    });

    let binary: Reducer = f64_reducer(|vs| binary_op(&vs[1].expect::<SmolStr>(), vs[0].expect::<f64>(), vs[2].expect::<f64>()));

    // Precedence climbs unary (expression1) -> exponent, right-associative
    // (expression2) -> mul/div (expression3) -> add/sub (expression4), so
    // `1+2*3` binds the multiplication first and `2^3^2` the right-hand
    // exponent first.
    Grammar::new(
        vec![
            Production::from_str("expression0", "number", number),
            Production::from_str("expression0", "ident", constant_ref),
            Production::from_str("expression0", "ident lparen rparen", call_no_args),
            Production::from_str("expression0", "ident lparen arglist rparen", call_with_args),
            Production::from_str("expression0", "lparen expression4 rparen", parens),
            Production::from_str("arglist", "expression4", arglist_one),
            Production::from_str("arglist", "arglist comma expression4", arglist_more),
            Production::from_str("expression1", "expression0", pass_through.clone()),
            Production::from_str("expression1", "op0 expression0", unary),
            Production::from_str("expression2", "expression1 op2 expression2", binary.clone()),
            Production::from_str("expression2", "expression1", pass_through.clone()),
            Production::from_str("expression3", "expression3 op1 expression2", binary.clone()),
            Production::from_str("expression3", "expression2", pass_through.clone()),
            Production::from_str("expression4", "expression4 op0 expression3", binary),
            Production::from_str("expression4", "expression3", pass_through),
        ],
        "expression4",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn eval(input: &str) -> f64 {
        let lex = lexicon();
        let gram = grammar();
        parse(&lex, &gram, "expression4", input).unwrap().expect::<f64>()
    }

    fn eval_err(input: &str) -> bool {
        let lex = lexicon();
        let gram = grammar();
        parse(&lex, &gram, "expression4", input).is_err()
    }

    #[test]
    fn basic_precedence() {
        assert_eq!(eval("1+2*3"), 7.0);
    }

    #[test]
    fn trig_functions() {
        assert_eq!(eval("sin(0)+cos(0)"), 1.0);
    }

    #[test]
    fn right_associative_exponent() {
        assert_eq!(eval("2^3^2"), 512.0);
    }

    #[test]
    fn unary_minus() {
        assert_eq!(eval("-3+4"), 1.0);
    }

    #[test]
    fn double_unary_minus_rejected() {
        assert!(eval_err("--3"));
    }

    #[test]
    fn function_arity() {
        assert_eq!(eval("log(1)"), 0.0);
        assert_eq!(eval("rt(8,3)"), 2.0);
    }
}
