use super::{lox_callable::LoxCallable, Interpreter, RuntimeValue};
use crate::RuntimeError;
use std::{
    fmt::{Debug, Display},
    io::Write,
    rc::Rc,
};

pub type NativeImplementation = fn(&[RuntimeValue]) -> Result<RuntimeValue, RuntimeError>;

#[derive(Clone)]
pub struct LoxNativeFunction(Rc<LoxNativeFunctionImpl>);
struct LoxNativeFunctionImpl {
    name: &'static str,
    arity: usize,
    implementation: NativeImplementation,
}
impl LoxNativeFunction {
    pub fn new(name: &'static str, arity: usize, implementation: NativeImplementation) -> Self {
        Self(Rc::new(LoxNativeFunctionImpl {
            name,
            arity,
            implementation,
        }))
    }
}
impl LoxCallable for LoxNativeFunction {
    fn arity(&self) -> usize {
        self.0.arity
    }

    fn call<W: Write>(
        &self,
        _: &mut Interpreter<W>,
        args: &[RuntimeValue],
    ) -> Result<RuntimeValue, RuntimeError> {
        (self.0.implementation)(args)
    }
}
impl Display for LoxNativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<native fn>")
    }
}
impl Debug for LoxNativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.0.name)
    }
}
impl PartialEq for LoxNativeFunction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

pub(super) mod natives {
    use super::super::{RuntimeError, RuntimeValue};
    use std::time::SystemTime;

    type In = [RuntimeValue];
    type Out = Result<RuntimeValue, RuntimeError>;

    /// Seconds since the Unix epoch.
    pub fn clock(_: &In) -> Out {
        Ok(RuntimeValue::Number(
            SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs_f64(),
        ))
    }
}
