use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::{
    Result,
    interpreter::Interpreter,
    lox_callable::LoxCallable,
    lox_function::LoxFunction,
    lox_instance::LoxInstance,
    object::Object,
};

/// `{ name, methods }` from the data model. Calling a class constructs an
/// instance — there is no constructor arity in this language, so `arity` is
/// always 0.
#[derive(Clone, Debug)]
pub struct LoxClass {
    pub name: String,
    methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new<T>(name: T, methods: HashMap<String, Rc<LoxFunction>>) -> Self
    where
        T: Into<String>,
    {
        Self {
            name: name.into(),
            methods,
        }
    }

    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        self.methods.get(name).cloned()
    }
}

impl LoxCallable for LoxClass {
    fn call(&self, _interpreter: &mut Interpreter, _arguments: Vec<Object>) -> Result<Object> {
        let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::new(self.clone()))));
        Ok(Object::Instance(instance))
    }

    fn arity(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for LoxClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}
