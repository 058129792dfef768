use super::{lox_class::LoxClass, RuntimeError, RuntimeValue};
use crate::scanner::Token;
use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::{Debug, Display},
    rc::Rc,
};

#[derive(Clone)]
pub struct LoxInstance(Rc<LoxInstanceImpl>);
struct LoxInstanceImpl {
    class: LoxClass,
    fields: RefCell<HashMap<String, RuntimeValue>>,
}

impl LoxInstance {
    pub fn new(class: LoxClass) -> Self {
        Self(Rc::new(LoxInstanceImpl {
            class,
            fields: RefCell::new(HashMap::new()),
        }))
    }
    /// Fields shadow methods; a method is bound to this instance on access.
    pub fn get(&self, name: &Token) -> Result<RuntimeValue, RuntimeError> {
        if let Some(value) = self.0.fields.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }
        self.0
            .class
            .find_method(&name.lexeme)
            .map(|method| method.bind(self.clone()).into())
            .ok_or_else(|| RuntimeError::undefined_property(name))
    }
    pub fn set(&self, name: &Token, value: RuntimeValue) {
        self.0
            .fields
            .borrow_mut()
            .insert(name.lexeme.clone(), value);
    }
}
impl Display for LoxInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} instance", self.0.class.name())
    }
}
impl Debug for LoxInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
impl PartialEq for LoxInstance {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
