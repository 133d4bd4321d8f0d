use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::{LoxError, Result, lox_class::LoxClass, object::Object, token::Token};

/// `{ class, fields }` from the data model.
#[derive(Clone, Debug)]
pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: HashMap<String, Object>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    /// A field wins over a method of the same name. Falling through to the
    /// class's method table returns a bound method: a fresh closure with
    /// `this` wired to `self_cell`.
    pub fn get(&self, name: &Token, self_cell: Rc<RefCell<LoxInstance>>) -> Result<Object> {
        if let Some(value) = self.fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = self.class.find_method(&name.lexeme) {
            let bound = method.bind(self_cell);
            return Ok(Object::Callable(Rc::new(bound)));
        }

        Err(LoxError::Runtime {
            expected: format!("Undefined property '{}'.", name.lexeme),
            found: "undefined".to_string(),
            token: name.clone(),
        })
    }

    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl std::fmt::Display for LoxInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}
