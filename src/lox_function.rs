use crate::{
    LoxError, Result,
    interpreter::{
        Interpreter,
        environment::{Environment, RcCell},
    },
    lox_callable::LoxCallable,
    lox_instance::LoxInstance,
    object::Object,
    stmt::Function,
};

/// `{ declaration, closure, isMethod }` from the data model: a closure's
/// captured environment, plus whether this is a bound method (affects nothing
/// about `call` itself — `bind` is what actually wires up `this`).
#[derive(Clone, Debug)]
pub struct LoxFunction {
    declaration: Function,
    closure: RcCell<Environment>,
    is_method: bool,
}

impl LoxFunction {
    pub fn new(declaration: Function, closure: RcCell<Environment>, is_method: bool) -> Self {
        Self {
            declaration,
            closure,
            is_method,
        }
    }

    pub fn is_method(&self) -> bool {
        self.is_method
    }

    /// A bound method: a new `LoxFunction` sharing the same declaration whose
    /// closure is a fresh child scope defining `this` to `instance`.
    pub fn bind(&self, instance: RcCell<LoxInstance>) -> LoxFunction {
        let env = Environment::with_enclosing(self.closure.clone());
        env.borrow_mut().define("this".to_string(), Object::Instance(instance));
        LoxFunction::new(self.declaration.clone(), env, true)
    }
}

impl std::fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

impl LoxCallable for LoxFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object> {
        let environment = Environment::with_enclosing(self.closure.clone());
        for (param, arg) in self.declaration.params.iter().zip(arguments) {
            environment.borrow_mut().define(param.lexeme.clone(), arg);
        }

        match interpreter.execute_block(&self.declaration.body, environment) {
            Ok(()) => Ok(Object::Null),
            Err(LoxError::Return { value }) => Ok(value),
            Err(other) => Err(other),
        }
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }
}
