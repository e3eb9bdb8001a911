use std::fs;

use argand::interpreter::runspace::core::{Outcome, Runspace};
use clap::Parser;

/// argand is an embeddable scripting language built around complex-number
/// arithmetic and collection types.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Treat the input as a file path instead of script text.
    #[arg(short, long)]
    file: bool,

    /// Store each statement result in 'ans' and print the final one.
    #[arg(short, long)]
    ans: bool,

    contents: String,
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                             .with_writer(std::io::stderr)
                             .init();

    let args = Args::parse();

    let script = if args.file {
        fs::read_to_string(&args.contents).unwrap_or_else(|_| {
            eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                      &args.contents);
            std::process::exit(1);
        })
    } else {
        args.contents
    };

    let mut runspace = Runspace::new();
    runspace.store_ans = args.ans;

    match runspace.execute(&script) {
        Ok(Outcome::Finished(value)) => {
            if args.ans && let Some(value) = value {
                println!("{value}");
            }
        },
        Ok(Outcome::Exited(code)) => std::process::exit(code),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        },
    }
}
