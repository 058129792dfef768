use std::fmt::Display;

use miette::{Diagnostic, LabeledSpan};

use crate::{
    parser::ParserError, resolver::ResolverError, scanner::Token,
    tree_walk_interpreter::RuntimeError, ScannerError,
};

/// Where on its line a token-anchored diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLocation {
    End,
    Lexeme(String),
}
impl ErrorLocation {
    pub fn of(token: &Token) -> Self {
        if token.is_eof() {
            Self::End
        } else {
            Self::Lexeme(token.lexeme.clone())
        }
    }
}
impl Display for ErrorLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::End => f.write_str(" at end"),
            Self::Lexeme(lexeme) => write!(f, " at '{}'", lexeme),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSite {
    pub line: usize,
    pub location: ErrorLocation,
}
impl ErrorSite {
    pub fn of(token: &Token) -> Self {
        Self {
            line: token.line,
            location: ErrorLocation::of(token),
        }
    }
}

/// One entry handed to an [`ErrorReporter`].
///
/// `Display` renders the canonical one-line form used by the fixture
/// expectations and the plain (non-miette) driver output:
///
/// * static: `[line 3] Error at 'x': Expect ';' after value.`
/// * scanner: `[line 3] Error: Unexpected character.`
/// * runtime: `Operands must be numbers.\n[line 3]`
#[derive(Debug)]
pub enum LoxError {
    Scan(ScannerError),
    Parse(ParserError),
    Resolve(ResolverError),
    Runtime(RuntimeError),
}

impl LoxError {
    pub fn line(&self) -> usize {
        match self {
            Self::Scan(err) => err.line(),
            Self::Parse(err) => err.site().line,
            Self::Resolve(err) => err.site().line,
            Self::Runtime(err) => err.line(),
        }
    }
    /// Scanner and runtime errors are not anchored to a token location.
    pub fn location(&self) -> Option<&ErrorLocation> {
        match self {
            Self::Parse(err) => Some(&err.site().location),
            Self::Resolve(err) => Some(&err.site().location),
            Self::Scan(_) | Self::Runtime(_) => None,
        }
    }
    pub fn message(&self) -> String {
        self.inner().to_string()
    }
    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime(_))
    }
    fn inner(&self) -> &(dyn Diagnostic + 'static) {
        match self {
            Self::Scan(err) => err,
            Self::Parse(err) => err,
            Self::Resolve(err) => err,
            Self::Runtime(err) => err,
        }
    }
}

impl Display for LoxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_runtime() {
            return write!(f, "{}\n[line {}]", self.message(), self.line());
        }
        match self.location() {
            Some(location) => write!(
                f,
                "[line {}] Error{}: {}",
                self.line(),
                location,
                self.message()
            ),
            None => write!(f, "[line {}] Error: {}", self.line(), self.message()),
        }
    }
}

impl std::error::Error for LoxError {}

// Labels and codes come from the wrapped stage error; only the headline
// message differs.
impl Diagnostic for LoxError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.inner().code()
    }
    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.inner().labels()
    }
}

impl From<ScannerError> for LoxError {
    fn from(err: ScannerError) -> Self {
        Self::Scan(err)
    }
}
impl From<ParserError> for LoxError {
    fn from(err: ParserError) -> Self {
        Self::Parse(err)
    }
}
impl From<ResolverError> for LoxError {
    fn from(err: ResolverError) -> Self {
        Self::Resolve(err)
    }
}
impl From<RuntimeError> for LoxError {
    fn from(err: RuntimeError) -> Self {
        Self::Runtime(err)
    }
}

/// Sink for diagnostics. The core only appends; printing and exit codes are
/// left to the host.
pub trait ErrorReporter {
    fn report(&mut self, error: LoxError);

    fn report_all<E: Into<LoxError>, I: IntoIterator<Item = E>>(&mut self, errors: I)
    where
        Self: Sized,
    {
        for error in errors {
            self.report(error.into());
        }
    }
}

impl ErrorReporter for Vec<LoxError> {
    fn report(&mut self, error: LoxError) {
        self.push(error);
    }
}
