use std::rc::Rc;

use ordered_float::OrderedFloat;

use crate::lox_callable::LoxCallable;
use crate::lox_instance::LoxInstance;

pub type RcCell<T> = std::rc::Rc<std::cell::RefCell<T>>;

/// The narrow value a token literal can carry — only `NUMBER` and `STRING`
/// tokens populate this; every other token has `Literal::Null`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Literal {
    Null,
    Number(OrderedFloat<f32>),
    String(String),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => write!(f, "nil"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => write!(f, "{s}"),
        }
    }
}

/// The full universe of runtime values.
#[derive(Clone)]
pub enum Object {
    String(String),
    Number(OrderedFloat<f32>),
    Boolean(bool),
    Null,
    Callable(Rc<dyn LoxCallable>),
    Instance(RcCell<LoxInstance>),
}

impl Object {
    /// `nil` and `false` are falsy; everything else, including `0` and `""`,
    /// is truthy. This is the spec-level rule, not the original interpreter's
    /// (buggy) "zero and empty string are falsy" behavior — see spec §9.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::String(_) => "string",
            Object::Number(_) => "number",
            Object::Boolean(_) => "boolean",
            Object::Null => "nil",
            Object::Callable(_) => "function",
            Object::Instance(_) => "instance",
        }
    }

    fn as_number(&self) -> Result<OrderedFloat<f32>, ObjectRuntimeError> {
        match self {
            Object::Number(n) => Ok(*n),
            _ => Err(ObjectRuntimeError {
                found: self.type_name().to_string(),
                expected: "Operand must be a number.".to_string(),
            }),
        }
    }

    pub fn into_number(self) -> Result<OrderedFloat<f32>, ObjectRuntimeError> {
        self.as_number()
    }

    /// The explicit number/number check the comparison operators need —
    /// unlike `<`/`<=`/`>`/`>=` on a derived `PartialOrd`, this rejects mixed
    /// or non-number operands with a proper runtime error instead of
    /// silently comparing by discriminant.
    pub fn compare(&self, other: &Object, op: CompareOp) -> Result<bool, ObjectRuntimeError> {
        let (lhs, rhs) = match (self, other) {
            (Object::Number(l), Object::Number(r)) => (*l, *r),
            _ => {
                return Err(ObjectRuntimeError {
                    found: format!("{} and {}", self.type_name(), other.type_name()),
                    expected: "Operands must be numbers.".to_string(),
                });
            }
        };
        Ok(match op {
            CompareOp::Greater => lhs > rhs,
            CompareOp::GreaterEqual => lhs >= rhs,
            CompareOp::Less => lhs < rhs,
            CompareOp::LessEqual => lhs <= rhs,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub enum CompareOp {
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl From<Literal> for Object {
    fn from(value: Literal) -> Self {
        match value {
            Literal::Null => Object::Null,
            Literal::Number(n) => Object::Number(n),
            Literal::String(s) => Object::String(s),
        }
    }
}

impl From<f32> for Object {
    fn from(value: f32) -> Self {
        Object::Number(OrderedFloat(value))
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Boolean(value)
    }
}

impl From<String> for Object {
    fn from(value: String) -> Self {
        Object::String(value)
    }
}

/// A lightweight error for a bad operand to an arithmetic/unary operator.
/// Carries no token — the call site (`Interpreter`) attaches the offending
/// token via [`ObjectRuntimeError::into_lox`] to build a proper
/// [`crate::error::LoxError::Runtime`].
#[derive(Clone, Debug)]
pub struct ObjectRuntimeError {
    pub found: String,
    pub expected: String,
}

impl ObjectRuntimeError {
    pub fn into_lox(self, token: &crate::token::Token) -> crate::error::LoxError {
        crate::error::LoxError::Runtime {
            found: self.found,
            expected: self.expected,
            token: token.clone(),
        }
    }
}

impl std::ops::Add for Object {
    type Output = Result<Object, ObjectRuntimeError>;

    fn add(self, rhs: Object) -> Self::Output {
        match (self, rhs) {
            (Object::Number(l), Object::Number(r)) => Ok(Object::Number(l + r)),
            (Object::String(l), Object::String(r)) => Ok(Object::String(l + &r)),
            (l, r) => Err(ObjectRuntimeError {
                found: format!("{} and {}", l.type_name(), r.type_name()),
                expected: "Operands must be two numbers or two strings.".to_string(),
            }),
        }
    }
}

macro_rules! numeric_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl std::ops::$trait for Object {
            type Output = Result<Object, ObjectRuntimeError>;

            fn $method(self, rhs: Object) -> Self::Output {
                match (&self, &rhs) {
                    (Object::Number(l), Object::Number(r)) => Ok(Object::Number(*l $op *r)),
                    _ => Err(ObjectRuntimeError {
                        found: format!("{} and {}", self.type_name(), rhs.type_name()),
                        expected: "Operands must be numbers.".to_string(),
                    }),
                }
            }
        }
    };
}

numeric_op!(Sub, sub, -);
numeric_op!(Mul, mul, *);
numeric_op!(Div, div, /);

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Null, Object::Null) => true,
            (Object::Number(l), Object::Number(r)) => l == r,
            (Object::String(l), Object::String(r)) => l == r,
            (Object::Boolean(l), Object::Boolean(r)) => l == r,
            (Object::Callable(l), Object::Callable(r)) => Rc::ptr_eq(l, r),
            (Object::Instance(l), Object::Instance(r)) => Rc::ptr_eq(l, r),
            // values of different runtime kinds are never equal
            _ => false,
        }
    }
}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::String(s) => write!(f, "{s}"),
            Object::Null => write!(f, "nil"),
            Object::Boolean(b) => write!(f, "{}", if *b { "1" } else { "0" }),
            Object::Number(n) => {
                let n = n.into_inner();
                if n == n.trunc() {
                    write!(f, "{}", n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Object::Callable(c) => write!(f, "{c}"),
            Object::Instance(i) => write!(f, "{}", i.borrow()),
        }
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::String(s) => write!(f, "String({s:?})"),
            Object::Number(n) => write!(f, "Number({n})"),
            Object::Boolean(b) => write!(f, "Boolean({b})"),
            Object::Null => write!(f, "Null"),
            Object::Callable(c) => write!(f, "Callable({c})"),
            Object::Instance(i) => write!(f, "Instance({})", i.borrow()),
        }
    }
}
