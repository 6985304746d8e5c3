//! Calculator REPL subcommand: reads lines from standard input, evaluates
//! each against the arithmetic demonstration grammar, and prints the
//! result or a generic error indicator. Exits with status 0 at end of
//! input, treating reducer failures (e.g. wrong function arity) as
//! ordinary, non-fatal per-line outcomes rather than aborting the loop.

use std::io::{self, BufRead};
use std::panic::{catch_unwind, AssertUnwindSafe};

use argh::FromArgs;

use earleybird::{calculator, debug, parse};

#[derive(FromArgs)]
/// evaluate arithmetic expressions read line by line from standard input
#[argh(subcommand, name = "calc")]
pub struct Calc {
    /// verbosity level: off, basic, detailed, trace
    #[argh(option, short = 'v', default = "default_verbose()")]
    verbose: String,
}

fn default_verbose() -> String {
    "off".to_string()
}

impl Calc {
    pub fn run(self) {
        let level = debug::DebugLevel::from_str(&self.verbose).unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        });
        debug::set_debug_level(level);

        let lexicon = calculator::lexicon();
        let grammar = calculator::grammar();
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line.expect("failed to read a line from standard input");
            let result = catch_unwind(AssertUnwindSafe(|| parse(&lexicon, &grammar, "expression4", &line)));
            match result {
                Ok(Ok(value)) => println!("{}", value.expect::<f64>()),
                _ => println!("error"),
            }
        }
    }
}
