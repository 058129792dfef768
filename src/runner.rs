use crate::{
    diagnostics::{ErrorReporter, LoxError},
    parser::{Parser, ParserOpts},
    scanner::scan,
    tree_walk_interpreter::{Interpreter, InterpreterOptions},
};
use log::info;
use std::io::Write;

#[derive(Debug, Default, Clone, Copy)]
pub struct LoxOptions {
    pub parser: ParserOpts,
    pub interpreter: InterpreterOptions,
}
impl LoxOptions {
    pub fn for_repl(self) -> Self {
        Self {
            parser: self.parser.for_repl(),
            ..self
        }
    }
}

/// How far a call to [`Lox::run`] got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// Scanning, parsing or resolution reported errors; nothing ran.
    StaticErrors,
    /// Execution started and was abandoned at the first runtime error.
    RuntimeError,
}
impl RunStatus {
    pub fn is_complete(self) -> bool {
        self == RunStatus::Completed
    }
}

/// A session over one interpreter. Globals, functions and resolved scope
/// distances carry over from one `run` to the next.
pub struct Lox<W: Write> {
    interpreter: Interpreter<W>,
    parser_opts: ParserOpts,
}

impl<W: Write> Lox<W> {
    pub fn new(out: W) -> Self {
        Self::with_options(out, LoxOptions::default())
    }
    pub fn with_options(out: W, options: LoxOptions) -> Self {
        Self {
            interpreter: Interpreter::with_options(out, options.interpreter),
            parser_opts: options.parser,
        }
    }

    pub fn run(&mut self, source: &str, reporter: &mut impl ErrorReporter) -> RunStatus {
        let (tokens, scan_errors) = scan(source);
        let (program, parse_errors) = Parser::parse(tokens, self.parser_opts);
        if !scan_errors.is_empty() || !parse_errors.is_empty() {
            info!(
                "not running: {} scan errors, {} parse errors",
                scan_errors.len(),
                parse_errors.len()
            );
            reporter.report_all(scan_errors);
            reporter.report_all(parse_errors);
            return RunStatus::StaticErrors;
        }

        let program = match self.interpreter.prepare(program) {
            Ok(program) => program,
            Err(errors) => {
                info!("not running: {} resolution errors", errors.len());
                reporter.report_all(errors);
                return RunStatus::StaticErrors;
            }
        };

        match self.interpreter.interpret(&program) {
            Ok(()) => RunStatus::Completed,
            Err(err) => {
                reporter.report(err.into());
                RunStatus::RuntimeError
            }
        }
    }

    pub fn interpreter(&self) -> &Interpreter<W> {
        &self.interpreter
    }
    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }
}

/// Runs `source` in a fresh session writing to `out`.
pub fn run_source<W: Write>(source: &str, out: W) -> (Vec<LoxError>, RunStatus) {
    let mut errors = Vec::new();
    let status = Lox::new(out).run(source, &mut errors);
    (errors, status)
}
