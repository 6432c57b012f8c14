use clap::Parser;
use infix_solve::{Arithmetic, Solver, Trailing};
use std::process::ExitCode;

// > echo "(1 - 2 - 3) * sqrt(4) / 6" | cargo run --example calc
// -1.3333333333333333
// > cargo run --example calc -- --checked "2pi / (1-1)"

/// Evaluate an arithmetic expression.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The expression. Read from stdin if omitted.
    expression: Option<String>,

    /// Reject input left over after a complete expression.
    #[arg(long)]
    strict: bool,

    /// Report division by zero and out-of-domain function calls as errors.
    #[arg(long)]
    checked: bool,
}

fn main() -> ExitCode {
    use std::io;

    let args = Args::parse();

    let mut solver = Solver::new();
    if args.strict {
        solver.trailing(Trailing::Strict);
    }
    if args.checked {
        solver.arithmetic(Arithmetic::Checked);
    }

    let (filename, input) = match args.expression {
        Some(expression) => ("argument", expression),
        None => match io::read_to_string(io::stdin()) {
            Ok(input) => ("stdin", input),
            Err(err) => {
                eprintln!("could not read stdin: {}", err);
                return ExitCode::FAILURE;
            }
        },
    };

    match solver.evaluate(filename, input.trim_end()) {
        Ok(Some(n)) => {
            println!("{}", n);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("no expression");
            ExitCode::FAILURE
        }
        Err(err) => {
            println!("{}", err);
            ExitCode::FAILURE
        }
    }
}
