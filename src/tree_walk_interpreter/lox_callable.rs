use super::{
    lox_class::LoxClass, lox_function::LoxFunction, lox_native_function::LoxNativeFunction,
    Interpreter, RuntimeValue,
};
use crate::RuntimeError;
use std::{fmt::Display, io::Write};

pub trait LoxCallable {
    fn arity(&self) -> usize;
    fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        args: &[RuntimeValue],
    ) -> Result<RuntimeValue, RuntimeError>;
}

/// Every runtime value that can appear before `(...)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Callable {
    Native(LoxNativeFunction),
    Function(LoxFunction),
    Class(LoxClass),
}

impl LoxCallable for Callable {
    fn arity(&self) -> usize {
        match self {
            Self::Native(native) => native.arity(),
            Self::Function(function) => function.arity(),
            Self::Class(class) => class.arity(),
        }
    }

    fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        args: &[RuntimeValue],
    ) -> Result<RuntimeValue, RuntimeError> {
        match self {
            Self::Native(native) => native.call(interpreter, args),
            Self::Function(function) => function.call(interpreter, args),
            Self::Class(class) => class.call(interpreter, args),
        }
    }
}

impl Display for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native(native) => Display::fmt(native, f),
            Self::Function(function) => Display::fmt(function, f),
            Self::Class(class) => Display::fmt(class, f),
        }
    }
}
