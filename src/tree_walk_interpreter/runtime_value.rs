use super::{
    lox_callable::Callable, lox_class::LoxClass, lox_function::LoxFunction,
    lox_instance::LoxInstance, lox_native_function::LoxNativeFunction,
};
use crate::ast;
use std::{
    fmt::{Debug, Display},
    rc::Rc,
};

#[derive(PartialEq, Clone)]
pub enum RuntimeValue {
    Nil,
    Boolean(bool),
    Number(f64),
    String(Rc<String>),
    Callable(Callable),
    Instance(LoxInstance),
}

impl Debug for RuntimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(string) => write!(f, "{:?}", string.as_str()),
            other => Display::fmt(other, f),
        }
    }
}
/// The text `print` writes.
impl Display for RuntimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Boolean(b) => match b {
                true => f.write_str("true"),
                false => f.write_str("false"),
            },
            Self::Number(n) => fmt_number(*n, f),
            Self::String(string) => f.write_str(string),
            Self::Callable(value) => Display::fmt(value, f),
            Self::Instance(value) => Display::fmt(value, f),
        }
    }
}

/// Integral numbers print without a fractional part (`3`, not `3.0`).
fn fmt_number(n: f64, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{}", n)
    }
}

impl From<f64> for RuntimeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}
impl From<bool> for RuntimeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
impl From<String> for RuntimeValue {
    fn from(value: String) -> Self {
        Self::String(Rc::new(value))
    }
}
impl From<&ast::LiteralValue> for RuntimeValue {
    fn from(value: &ast::LiteralValue) -> Self {
        use ast::LiteralValue::*;
        match value {
            Nil => Self::Nil,
            Boolean(value) => (*value).into(),
            Number(value) => (*value).into(),
            String(value) => Self::String(value.clone()),
        }
    }
}
impl From<LoxClass> for RuntimeValue {
    fn from(value: LoxClass) -> Self {
        Self::Callable(Callable::Class(value))
    }
}
impl From<LoxFunction> for RuntimeValue {
    fn from(value: LoxFunction) -> Self {
        Self::Callable(Callable::Function(value))
    }
}
impl From<LoxNativeFunction> for RuntimeValue {
    fn from(value: LoxNativeFunction) -> Self {
        Self::Callable(Callable::Native(value))
    }
}
impl From<LoxInstance> for RuntimeValue {
    fn from(value: LoxInstance) -> Self {
        Self::Instance(value)
    }
}

impl RuntimeValue {
    pub fn type_of(&self) -> ValueType {
        match self {
            Self::Nil => ValueType::Nil,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Number(_) => ValueType::Number,
            Self::String(_) => ValueType::String,
            Self::Callable(Callable::Native(_) | Callable::Function(_)) => ValueType::Function,
            Self::Callable(Callable::Class(_)) => ValueType::Class,
            Self::Instance(_) => ValueType::Instance,
        }
    }
    /// `nil` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Boolean(false))
    }
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Nil,
    Boolean,
    Number,
    String,
    Function,
    Class,
    Instance,
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValueType::Nil => "nil",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Function => "function",
            ValueType::Class => "class",
            ValueType::Instance => "instance",
        })
    }
}

impl ValueType {
    pub fn fmt_a(&self) -> &str {
        match self {
            ValueType::Nil => "nil",
            ValueType::Boolean => "a boolean",
            ValueType::Number => "a number",
            ValueType::String => "a string",
            ValueType::Function => "a function",
            ValueType::Class => "a class",
            ValueType::Instance => "an instance",
        }
    }
}
