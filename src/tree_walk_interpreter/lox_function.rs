use super::{
    completion::Completion, environment::Environment, lox_callable::LoxCallable,
    lox_instance::LoxInstance, EnvironmentRef, Interpreter, RuntimeError, RuntimeValue,
};
use crate::ast;
use log::debug;
use std::{
    fmt::{Debug, Display},
    io::Write,
    rc::Rc,
};

/// A user-defined function closed over the frame it was declared in.
#[derive(Clone)]
pub struct LoxFunction(Rc<LoxFunctionImpl>);
struct LoxFunctionImpl {
    declaration: Rc<ast::FunctionDecl>,
    closure: EnvironmentRef,
}
impl LoxFunction {
    pub fn new(declaration: Rc<ast::FunctionDecl>, closure: EnvironmentRef) -> Self {
        Self(Rc::new(LoxFunctionImpl {
            declaration,
            closure,
        }))
    }
    pub fn name(&self) -> &str {
        &self.0.declaration.name.lexeme
    }
    /// A new function over the same declaration whose closure has `this`
    /// bound to `instance`. The original is left untouched.
    pub fn bind(&self, instance: LoxInstance) -> LoxFunction {
        let mut environment = Environment::new_with_parent(self.0.closure.clone());
        environment.define("this", instance.into());
        LoxFunction::new(self.0.declaration.clone(), environment.wrap())
    }
}
impl LoxCallable for LoxFunction {
    fn arity(&self) -> usize {
        self.0.declaration.params.len()
    }

    fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        args: &[RuntimeValue],
    ) -> Result<RuntimeValue, RuntimeError> {
        debug!("calling {} with {} arguments", self, args.len());
        let mut params_env = Environment::new_with_parent(self.0.closure.clone());
        for (param, value) in self.0.declaration.params.iter().zip(args) {
            params_env.define(&param.lexeme, value.clone());
        }
        let body_env = Environment::new_with_parent(params_env.wrap());
        match interpreter.execute_block(&self.0.declaration.body, body_env.wrap())? {
            Completion::Return(value) => Ok(value),
            Completion::Normal => Ok(RuntimeValue::Nil),
        }
    }
}
impl Display for LoxFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}
impl Debug for LoxFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
impl PartialEq for LoxFunction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
