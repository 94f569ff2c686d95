//! Waxwing CLI entry point.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use waxwing_runtime::{Repl, Session};

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    files: Vec<PathBuf>,
    show_help: bool,
    show_version: bool,
    trace: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: &[String]) -> Result<CliConfig, String> {
    let mut config = CliConfig::default();
    for arg in &args[1..] {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--trace" => config.trace = true,
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {other}"));
            }
            file => config.files.push(PathBuf::from(file)),
        }
    }
    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(&args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }
    if config.show_version {
        println!("waxwing {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if config.files.is_empty() {
        let mut repl = Repl::new()?;
        repl.session_mut().set_trace(config.trace);
        repl.run()?;
        return Ok(());
    }

    // Batch mode: evaluate each file in one shared session; the first error
    // terminates the process.
    let mut session = Session::new();
    session.set_trace(config.trace);
    for path in &config.files {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        session.eval_source(&path.display().to_string(), &text)?;
    }
    Ok(())
}

fn print_help() {
    println!("waxwing - an s-expression language with cooperative tasks");
    println!();
    println!("Usage: waxwing [OPTIONS] [FILES...]");
    println!();
    println!("With no files, starts an interactive REPL.");
    println!();
    println!("Options:");
    println!("  -h, --help     Show this help");
    println!("  -V, --version  Show version");
    println!("  --trace        Print each instruction as it executes");
}
