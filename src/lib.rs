pub mod ast;
mod diagnostics;
mod parser;
mod resolver;
mod runner;
mod scanner;
mod side_table;
mod source;
mod source_reference;
mod stack;
mod tree_walk_interpreter;

pub use diagnostics::{ErrorLocation, ErrorReporter, ErrorSite, LoxError};
pub use parser::{Parser, ParserError, ParserOpts};
pub use resolver::{Resolutions, ResolverError};
pub use runner::{run_source, Lox, LoxOptions, RunStatus};
pub use scanner::{scan, Literal, Scanner, ScannerError, Token, TokenKind};
pub use side_table::{SideTable, Unique, UniqueId};
pub use source::SourceSpan;
pub use source_reference::SourceReference;
pub use tree_walk_interpreter::{
    Callable, Interpreter, InterpreterOptions, PreparedProgram, RuntimeError, RuntimeValue,
    ValueType, DEFAULT_MAX_CALL_DEPTH,
};
