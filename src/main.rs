use std::{
    io::{stdout, Write},
    process,
};

use colored::Colorize;
use log::debug;
use miette::{IntoDiagnostic, Report, Result};
use rustyline::error::ReadlineError;

use treelox::{ErrorReporter, Lox, LoxError, LoxOptions, RunStatus, SourceReference};

const USAGE: &str = "Usage: treelox [--no-depth-limit] [script]";
const EXIT_USAGE: i32 = 64;
const EXIT_STATIC_ERROR: i32 = 65;
const EXIT_RUNTIME_ERROR: i32 = 70;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args: Vec<_> = std::env::args().skip(1).collect();
    let no_depth_limit = consume_arg(&mut args, |arg| (arg == "--no-depth-limit").then(|| true))
        .unwrap_or(false);
    let file = consume_arg(&mut args, |arg| {
        if arg.starts_with("--") {
            None
        } else {
            Some(arg.to_string())
        }
    });
    if !args.is_empty() {
        eprintln!("Unrecognized arguments: {:?}", args);
        eprintln!("{}", USAGE);
        process::exit(EXIT_USAGE);
    }

    let mut options = LoxOptions::default();
    if no_depth_limit {
        options.interpreter = options.interpreter.with_max_call_depth(None);
    }

    let exit_code = match file {
        Some(file) => run_file(&file, options)?,
        None => run_prompt(options.for_repl())?,
    };

    if exit_code != 0 {
        process::exit(exit_code);
    }
    Ok(())
}

fn consume_arg<T, F: Fn(&str) -> Option<T>>(args: &mut Vec<String>, predicate: F) -> Option<T> {
    let (idx, val) = args
        .iter()
        .enumerate()
        .find_map(|(idx, arg)| predicate(arg).map(|val| (idx, val)))?;
    args.remove(idx);
    Some(val)
}

/// Renders each diagnostic against the source it came from, as it arrives.
struct StderrReporter {
    source: SourceReference,
}
impl StderrReporter {
    fn new(name: &str, source: &str) -> Self {
        Self {
            source: SourceReference::new(name, source),
        }
    }
}
impl ErrorReporter for StderrReporter {
    fn report(&mut self, error: LoxError) {
        eprintln!(
            "{:?}",
            Report::new(error).with_source_code(self.source.clone())
        );
    }
}

fn run_file(file_name: &str, options: LoxOptions) -> Result<i32> {
    let source = std::fs::read_to_string(file_name).into_diagnostic()?;
    let mut reporter = StderrReporter::new(file_name, &source);
    let mut lox = Lox::with_options(stdout(), options);

    let status = lox.run(&source, &mut reporter);
    lox.into_output().flush().into_diagnostic()?;
    debug!("{} finished: {:?}", file_name, status);

    Ok(match status {
        RunStatus::Completed => 0,
        RunStatus::StaticErrors => EXIT_STATIC_ERROR,
        RunStatus::RuntimeError => EXIT_RUNTIME_ERROR,
    })
}

fn run_prompt(options: LoxOptions) -> Result<i32> {
    let mut lox = Lox::with_options(stdout(), options);
    let mut rl = rustyline::Editor::<()>::new();
    println!("{}", "treelox (Ctrl-D to exit)".dimmed());

    let mut repl_line: usize = 1;
    loop {
        match rl.readline(&format!("{}> ", repl_line)) {
            Ok(line) => {
                rl.add_history_entry(line.as_str());
                let mut reporter = StderrReporter::new(&format!("<repl-{}>", repl_line), &line);
                let status = lox.run(&line, &mut reporter);
                if !status.is_complete() {
                    debug!("repl line {}: {:?}", repl_line, status);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(0),
            Err(err) => return Err(err).into_diagnostic(),
        }
        repl_line += 1;
    }
}
