use crate::{Result, interpreter::Interpreter, object::Object};

/// Anything that can appear as the callee of a `()` expression: a user
/// function, a bound method, a class, or a native.
pub trait LoxCallable: std::fmt::Display + std::fmt::Debug {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object>;
    fn arity(&self) -> usize;
    fn name(&self) -> &str;
}
