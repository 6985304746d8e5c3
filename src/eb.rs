use argh::FromArgs;
mod cmd_calc;
mod cmd_ebnf;
mod cmd_test;

#[derive(FromArgs)]
/// A small, general context-free parsing engine built around Earley's algorithm
struct Args {
    #[argh(subcommand)]
    subcommand: Subcommand,
}

#[derive(FromArgs)]
/// run a demonstration
#[argh(subcommand)]
enum Subcommand {
    Calc(cmd_calc::Calc),
    Ebnf(cmd_ebnf::Ebnf),
    Test(cmd_test::Test),
}

impl Subcommand {
    fn run(self) {
        match self {
            Subcommand::Calc(cmd) => cmd.run(),
            Subcommand::Ebnf(cmd) => cmd.run(),
            Subcommand::Test(cmd) => cmd.run(),
        }
    }
}

fn main() {
    env_logger::init();
    argh::from_env::<Args>().subcommand.run();
}
