use super::{
    lox_callable::LoxCallable, lox_function::LoxFunction, lox_instance::LoxInstance, Interpreter,
    RuntimeValue,
};
use crate::RuntimeError;
use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    io::Write,
    rc::Rc,
};

#[derive(Clone)]
pub struct LoxClass(Rc<LoxClassImpl>);
struct LoxClassImpl {
    name: String,
    methods: HashMap<String, LoxFunction>,
}
impl LoxClass {
    pub fn new(name: &str, methods: Vec<LoxFunction>) -> Self {
        Self(Rc::new(LoxClassImpl {
            name: name.to_string(),
            methods: methods
                .into_iter()
                .map(|method| (method.name().to_string(), method))
                .collect(),
        }))
    }
    pub fn name(&self) -> &str {
        &self.0.name
    }
    /// The unbound method; callers bind it to an instance.
    pub fn find_method(&self, name: &str) -> Option<&LoxFunction> {
        self.0.methods.get(name)
    }
}
impl Display for LoxClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.name)
    }
}
impl Debug for LoxClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.0.name)
    }
}
impl PartialEq for LoxClass {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
/// Calling a class constructs a fresh, field-less instance.
impl LoxCallable for LoxClass {
    fn arity(&self) -> usize {
        0
    }

    fn call<W: Write>(
        &self,
        _: &mut Interpreter<W>,
        _: &[RuntimeValue],
    ) -> Result<RuntimeValue, RuntimeError> {
        Ok(LoxInstance::new(self.clone()).into())
    }
}
