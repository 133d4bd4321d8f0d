use std::cell::RefCell;
use std::collections::{HashMap, hash_map::Entry};
use std::rc::Rc;

use tracing::trace;

use crate::{LoxError, Result, object::Object, token::Token};

/// Shared, mutable handle to an [`Environment`]. Cloning an `RcCell<Environment>`
/// clones the handle, not the scope — this is how a closure keeps its defining
/// scope alive after the block that created it exits, and how two closures
/// over the same scope observe each other's assignments.
pub type RcCell<T> = Rc<RefCell<T>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Object>,
    enclosing: Option<RcCell<Environment>>,
}

impl Environment {
    pub fn new() -> RcCell<Environment> {
        Rc::new(RefCell::new(Self {
            values: HashMap::new(),
            enclosing: None,
        }))
    }

    pub fn with_enclosing(enclosing: RcCell<Environment>) -> RcCell<Environment> {
        Rc::new(RefCell::new(Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }))
    }

    pub fn define(&mut self, name: String, value: Object) {
        trace!(?name, ?value, "defining");
        self.values.insert(name, value);
    }

    pub fn assign(&mut self, name: &Token, value: Object) -> Result<()> {
        trace!(?name, ?value, ">> assign()");
        match self.values.entry(name.lexeme.clone()) {
            Entry::Occupied(mut entry) => {
                entry.insert(value);
                Ok(())
            }
            Entry::Vacant(_) => {
                if let Some(ref outer) = self.enclosing {
                    outer.borrow_mut().assign(name, value)
                } else {
                    Err(LoxError::Runtime {
                        expected: format!("Undefined variable '{}'.", name.lexeme),
                        found: "undefined".to_string(),
                        token: name.clone(),
                    })
                }
            }
        }
    }

    pub fn get(&self, name: &Token) -> Result<Object> {
        trace!(?name, ">> Environment.get()");
        match self.values.get(&name.lexeme) {
            Some(val) => Ok(val.clone()),
            None => match &self.enclosing {
                Some(outer) => outer.borrow().get(name),
                None => Err(LoxError::Runtime {
                    expected: format!("Undefined variable '{}'.", name.lexeme),
                    found: "undefined".to_string(),
                    token: name.clone(),
                }),
            },
        }
    }

    /// Walk `distance` enclosing links up from `env`. The resolver guarantees
    /// a binding exists at exactly this distance for any node it resolved.
    fn ancestor(env: &RcCell<Environment>, distance: usize) -> RcCell<Environment> {
        let mut current = env.clone();
        for _ in 0..distance {
            let next = current
                .borrow()
                .enclosing
                .clone()
                .expect("resolver-assigned distance exceeded the environment chain");
            current = next;
        }
        current
    }

    pub fn get_at(env: &RcCell<Environment>, distance: usize, key: &str) -> Result<Object> {
        trace!(distance, key, "get_at");
        let target = Self::ancestor(env, distance);
        let value = target.borrow().values.get(key).cloned();
        value.ok_or_else(|| LoxError::Internal {
            message: format!("Expected variable '{key}' at distance {distance}"),
        })
    }

    pub fn assign_at(env: &RcCell<Environment>, distance: usize, name: &str, value: Object) -> Result<()> {
        trace!(distance, name, "assign_at");
        Self::ancestor(env, distance).borrow_mut().values.insert(name.to_string(), value);
        Ok(())
    }
}
