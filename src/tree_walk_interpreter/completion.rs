use super::RuntimeValue;

/// How a statement finished. Runtime errors travel separately as the `Err`
/// side of `Result<Completion, RuntimeError>`.
#[derive(Debug, PartialEq)]
pub enum Completion {
    Normal,
    /// A `return` unwinding towards the nearest call boundary.
    Return(RuntimeValue),
}
impl Completion {
    pub fn is_normal(&self) -> bool {
        matches!(self, Completion::Normal)
    }
}
