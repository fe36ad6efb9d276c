use std::fs;

use clap::Parser;
use selva::run_program;

/// Selva is a small dynamically-typed scripting language with first-class
/// arrays and maps.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path of the script file to run.
    #[arg(short, long)]
    script: String,

    /// Pipe mode automatically prints out the last printable value of a
    /// Selva script.
    #[arg(short, long)]
    pipe_mode: bool,
}

fn main() {
    let args = Args::parse();

    let source = fs::read_to_string(&args.script).unwrap_or_else(|_| {
        eprintln!(
            "Failed to read the input file '{}'. Perhaps this file does not exist?",
            &args.script
        );
        std::process::exit(1);
    });

    if let Err(e) = run_program(&source, args.pipe_mode) {
        eprintln!("{e}");
        std::process::exit(2);
    }
}
