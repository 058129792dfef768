use super::ValueType;
use crate::{scanner::Token, SourceSpan};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum RuntimeError {
    #[error("Operand must be a number.")]
    #[diagnostic(code(lox::runtime::operand_type))]
    OperandMustBeNumber {
        operator: String,
        line: usize,
        #[label("the '{operator}' operator expected a number")]
        span: SourceSpan,
    },
    #[error("Operands must be numbers.")]
    #[diagnostic(code(lox::runtime::operand_type))]
    OperandsMustBeNumbers {
        operator: String,
        line: usize,
        #[label("the '{operator}' operator expected two numbers")]
        span: SourceSpan,
    },
    #[error("Operands must be two numbers or two strings.")]
    #[diagnostic(code(lox::runtime::operand_type))]
    OperandsMustBeNumbersOrStrings {
        line: usize,
        #[label("'+' needs matching operand types")]
        span: SourceSpan,
    },
    #[error("Undefined variable '{name}'.")]
    #[diagnostic(code(lox::runtime::undefined_variable))]
    UndefinedVariable {
        name: String,
        line: usize,
        #[label("found here")]
        span: SourceSpan,
    },
    #[error("Can only call functions and classes.")]
    #[diagnostic(code(lox::runtime::not_callable))]
    NotCallable {
        actual_type: ValueType,
        line: usize,
        #[label("attempted to call {} here", .actual_type.fmt_a())]
        span: SourceSpan,
    },
    #[error("Expected {expected} arguments but got {actual}.")]
    #[diagnostic(code(lox::runtime::arity_mismatch))]
    ArityMismatch {
        expected: usize,
        actual: usize,
        line: usize,
        #[label("on this call")]
        span: SourceSpan,
    },
    #[error("Only instances have properties.")]
    #[diagnostic(code(lox::runtime::not_an_instance))]
    NotAnInstance {
        actual_type: ValueType,
        line: usize,
        #[label("attempted to read a property of {} here", .actual_type.fmt_a())]
        span: SourceSpan,
    },
    #[error("Only instances have fields.")]
    #[diagnostic(code(lox::runtime::not_an_instance))]
    FieldsOnNonInstance {
        actual_type: ValueType,
        line: usize,
        #[label("attempted to set a field on {} here", .actual_type.fmt_a())]
        span: SourceSpan,
    },
    #[error("Undefined property '{name}'.")]
    #[diagnostic(code(lox::runtime::undefined_property))]
    UndefinedProperty {
        name: String,
        line: usize,
        #[label("this property is unknown")]
        span: SourceSpan,
    },
    #[error("Stack overflow.")]
    #[diagnostic(
        code(lox::runtime::stack_overflow),
        help("the call depth limit can be raised through InterpreterOptions")
    )]
    StackOverflow {
        line: usize,
        #[label("call depth exceeded here")]
        span: SourceSpan,
    },
    #[error("Could not write output: {source}")]
    #[diagnostic(code(lox::runtime::output))]
    Output {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

impl RuntimeError {
    pub fn line(&self) -> usize {
        match self {
            Self::OperandMustBeNumber { line, .. }
            | Self::OperandsMustBeNumbers { line, .. }
            | Self::OperandsMustBeNumbersOrStrings { line, .. }
            | Self::UndefinedVariable { line, .. }
            | Self::NotCallable { line, .. }
            | Self::ArityMismatch { line, .. }
            | Self::NotAnInstance { line, .. }
            | Self::FieldsOnNonInstance { line, .. }
            | Self::UndefinedProperty { line, .. }
            | Self::StackOverflow { line, .. }
            | Self::Output { line, .. } => *line,
        }
    }

    pub(crate) fn operand_must_be_number(operator: &Token) -> Self {
        Self::OperandMustBeNumber {
            operator: operator.lexeme.clone(),
            line: operator.line,
            span: operator.span,
        }
    }
    pub(crate) fn operands_must_be_numbers(operator: &Token) -> Self {
        Self::OperandsMustBeNumbers {
            operator: operator.lexeme.clone(),
            line: operator.line,
            span: operator.span,
        }
    }
    pub(crate) fn undefined_variable(name: &Token) -> Self {
        Self::UndefinedVariable {
            name: name.lexeme.clone(),
            line: name.line,
            span: name.span,
        }
    }
    pub(crate) fn undefined_property(name: &Token) -> Self {
        Self::UndefinedProperty {
            name: name.lexeme.clone(),
            line: name.line,
            span: name.span,
        }
    }
}
