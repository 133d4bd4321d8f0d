pub mod environment;
pub mod resolver;
pub mod type_checker;

use std::collections::HashMap;
use std::rc::Rc;

use environment::{Environment, RcCell};
use tracing::instrument;

use super::{LoxError, Result};
use crate::{
    expr::{self, Expr, NodeId},
    lox_callable::LoxCallable as _,
    lox_class::LoxClass,
    lox_function::LoxFunction,
    native::clock::LoxClock,
    object::{CompareOp, Object},
    stmt::{self, Stmt},
    token_type::TokenType,
};

pub struct Interpreter {
    environment: RcCell<Environment>,
    pub globals: RcCell<Environment>,
    locals: HashMap<NodeId, usize>,
    /// Every line a `print` statement has written, in order. Lets tests
    /// assert on program output without going through real stdout.
    output: Vec<String>,
}

impl Interpreter {
    pub fn new() -> Interpreter {
        let globals = Environment::new();
        globals
            .borrow_mut()
            .define("clock".to_string(), Object::Callable(Rc::new(LoxClock {})));
        Self {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            output: Vec::new(),
        }
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Records the resolver's distance for a `Variable`/`Assign`/`This` node.
    pub fn resolve(&mut self, id: NodeId, depth: usize) {
        self.locals.insert(id, depth);
    }

    #[instrument(skip(self, statements), err, level = "trace")]
    pub fn interpret(&mut self, statements: Vec<Stmt>) -> Result<()> {
        for statement in &statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Print(stmt) => self.execute_print_stmt(stmt),
            Stmt::Block(stmt) => self.execute_block(&stmt.statements, Environment::with_enclosing(self.environment.clone())),
            Stmt::Expression(stmt) => self.evaluate(&stmt.expression).map(|_| ()),
            Stmt::Var(stmt) => self.execute_var_stmt(stmt),
            Stmt::If(stmt) => self.execute_if_stmt(stmt),
            Stmt::While(stmt) => self.execute_while_stmt(stmt),
            Stmt::Break(_) => Err(LoxError::Break),
            Stmt::Function(stmt) => self.execute_fn_stmt(stmt),
            Stmt::Return(stmt) => self.execute_return_stmt(stmt),
            Stmt::Class(stmt) => self.execute_class_stmt(stmt),
        }
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object> {
        match expr {
            Expr::Binary(expr) => self.eval_binary(expr),
            Expr::Logical(expr) => self.eval_logical(expr),
            Expr::Grouping(expr) => self.eval_grouping(expr),
            Expr::Literal(expr) => self.eval_literal(expr),
            Expr::Unary(expr) => self.eval_unary(expr),
            Expr::Variable(expr) => self.eval_variable(expr),
            Expr::Assign(expr) => self.eval_assign(expr),
            Expr::Call(expr) => self.eval_call(expr),
            Expr::Get(expr) => self.eval_get(expr),
            Expr::Set(expr) => self.eval_set(expr),
            Expr::This(expr) => self.eval_this(expr),
        }
    }

    /// Runs `statements` in a scope rooted at `environment`, restoring the
    /// previous scope on every exit path (normal, `break`, `return`, or
    /// runtime error).
    pub fn execute_block(&mut self, statements: &Vec<Stmt>, environment: RcCell<Environment>) -> Result<()> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let mut result = Ok(());
        for statement in statements {
            if let Err(e) = self.execute(statement) {
                result = Err(e);
                break;
            }
        }
        self.environment = previous;
        result
    }

    fn execute_print_stmt(&mut self, stmt: &stmt::Print) -> Result<()> {
        let text = self.evaluate(&stmt.expression)?.to_string();
        println!("{text}");
        self.output.push(text);
        Ok(())
    }

    fn execute_var_stmt(&mut self, stmt: &stmt::Var) -> Result<()> {
        let value = match &stmt.initializer {
            Some(init) => self.evaluate(init)?,
            None => Object::Null,
        };

        self.environment.borrow_mut().define(stmt.name.lexeme.clone(), value);
        Ok(())
    }

    fn execute_if_stmt(&mut self, stmt: &stmt::If) -> Result<()> {
        let condition = self.evaluate(&stmt.condition)?;
        if condition.is_truthy() {
            self.execute(&stmt.then_branch)?;
        } else if let Some(ref else_branch) = stmt.else_branch {
            self.execute(else_branch)?;
        }

        Ok(())
    }

    fn execute_while_stmt(&mut self, stmt: &stmt::While) -> Result<()> {
        while self.evaluate(&stmt.condition)?.is_truthy() {
            match self.execute(&stmt.body) {
                Ok(()) => (),
                Err(LoxError::Break) => break,
                Err(other) => return Err(other),
            }
        }

        Ok(())
    }

    fn execute_fn_stmt(&mut self, stmt: &stmt::Function) -> Result<()> {
        let function = LoxFunction::new(stmt.clone(), self.environment.clone(), false);
        self.environment
            .borrow_mut()
            .define(stmt.name.lexeme.clone(), Object::Callable(Rc::new(function)));
        Ok(())
    }

    fn execute_return_stmt(&mut self, stmt: &stmt::Return) -> Result<()> {
        let value = if let Some(ref val) = stmt.value {
            self.evaluate(val)?
        } else {
            Object::Null
        };
        Err(LoxError::Return { value })
    }

    /// Defines the class name as `nil` first so a method body can close over
    /// it (e.g. to construct another instance of its own class), then
    /// redefines it once the class object exists.
    fn execute_class_stmt(&mut self, stmt: &stmt::Class) -> Result<()> {
        self.environment.borrow_mut().define(stmt.name.lexeme.clone(), Object::Null);

        let mut methods = HashMap::new();
        for method in &stmt.methods {
            let is_method = true;
            let function = LoxFunction::new(method.clone(), self.environment.clone(), is_method);
            methods.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class = LoxClass::new(stmt.name.lexeme.clone(), methods);
        self.environment
            .borrow_mut()
            .define(stmt.name.lexeme.clone(), Object::Callable(Rc::new(class)));
        Ok(())
    }

    fn eval_binary(&mut self, expr: &expr::Binary) -> Result<Object> {
        let left = self.evaluate(&expr.left)?;
        let right = self.evaluate(&expr.right)?;

        let obj = match expr.operator.typ {
            TokenType::Greater => Object::Boolean(left.compare(&right, CompareOp::Greater).map_err(|e| e.into_lox(&expr.operator))?),
            TokenType::GreaterEqual => Object::Boolean(
                left.compare(&right, CompareOp::GreaterEqual)
                    .map_err(|e| e.into_lox(&expr.operator))?,
            ),
            TokenType::Less => Object::Boolean(left.compare(&right, CompareOp::Less).map_err(|e| e.into_lox(&expr.operator))?),
            TokenType::LessEqual => Object::Boolean(
                left.compare(&right, CompareOp::LessEqual)
                    .map_err(|e| e.into_lox(&expr.operator))?,
            ),
            TokenType::Minus => (left - right).map_err(|e| e.into_lox(&expr.operator))?,
            TokenType::Plus => (left + right).map_err(|e| e.into_lox(&expr.operator))?,
            TokenType::Slash => (left / right).map_err(|e| e.into_lox(&expr.operator))?,
            TokenType::Star => (left * right).map_err(|e| e.into_lox(&expr.operator))?,
            TokenType::EqualEqual => Object::Boolean(left == right),
            TokenType::BangEqual => Object::Boolean(left != right),
            _ => {
                return Err(LoxError::Internal {
                    message: format!("'{}' is not a binary operator", expr.operator.lexeme),
                });
            }
        };

        Ok(obj)
    }

    fn eval_logical(&mut self, expr: &expr::Logical) -> Result<Object> {
        let left = self.evaluate(&expr.left)?;

        let truthy_left = left.is_truthy();
        match (&expr.operator.typ, truthy_left) {
            (&TokenType::Or, true) | (&TokenType::And, false) => Ok(left),
            _ => self.evaluate(&expr.right),
        }
    }

    fn eval_grouping(&mut self, expr: &expr::Grouping) -> Result<Object> {
        self.evaluate(&expr.expression)
    }

    fn eval_literal(&mut self, expr: &expr::Literal) -> Result<Object> {
        Ok(expr.value.clone())
    }

    fn eval_unary(&mut self, expr: &expr::Unary) -> Result<Object> {
        let right = self.evaluate(&expr.right)?;
        let obj = match expr.operator.typ {
            TokenType::Minus => {
                let n = right.into_number().map_err(|e| e.into_lox(&expr.operator))?;
                Object::Number(-n)
            }
            TokenType::Bang => Object::Boolean(!right.is_truthy()),
            _ => {
                return Err(LoxError::Internal {
                    message: format!("'{}' is not a unary operator", expr.operator.lexeme),
                });
            }
        };

        Ok(obj)
    }

    fn eval_variable(&mut self, expr: &expr::Variable) -> Result<Object> {
        self.lookup_variable(&expr.name, expr.id)
    }

    fn eval_assign(&mut self, expr: &expr::Assign) -> Result<Object> {
        let value = self.evaluate(&expr.value)?;
        match self.locals.get(&expr.id) {
            Some(distance) => Environment::assign_at(&self.environment, *distance, &expr.name.lexeme, value.clone())?,
            None => self.globals.borrow_mut().assign(&expr.name, value.clone())?,
        }
        Ok(value)
    }

    fn eval_call(&mut self, expr: &expr::Call) -> Result<Object> {
        let callee = self.evaluate(&expr.callee)?;
        let mut arguments = Vec::new();
        for argument in expr.arguments.iter() {
            arguments.push(self.evaluate(argument)?);
        }

        let function = match callee {
            Object::Callable(f) => f,
            other => {
                return Err(LoxError::Runtime {
                    expected: "Can only call functions and classes.".to_string(),
                    found: other.type_name().to_string(),
                    token: expr.paren.clone(),
                });
            }
        };

        if arguments.len() != function.arity() {
            return Err(LoxError::Runtime {
                token: expr.paren.clone(),
                expected: format!("Expected {} arguments but got {}.", function.arity(), arguments.len()),
                found: format!("{} arguments", arguments.len()),
            });
        }
        function.call(self, arguments)
    }

    fn eval_get(&mut self, expr: &expr::Get) -> Result<Object> {
        let object = self.evaluate(&expr.object)?;
        match object {
            Object::Instance(instance) => {
                let value = instance.borrow().get(&expr.name, instance.clone())?;
                Ok(value)
            }
            other => Err(LoxError::Runtime {
                expected: "Only instances have properties.".to_string(),
                found: other.type_name().to_string(),
                token: expr.name.clone(),
            }),
        }
    }

    fn eval_set(&mut self, expr: &expr::Set) -> Result<Object> {
        let object = self.evaluate(&expr.object)?;
        match object {
            Object::Instance(instance) => {
                let value = self.evaluate(&expr.value)?;
                instance.borrow_mut().set(&expr.name, value.clone());
                Ok(value)
            }
            other => Err(LoxError::Runtime {
                expected: "Only instances have fields.".to_string(),
                found: other.type_name().to_string(),
                token: expr.name.clone(),
            }),
        }
    }

    fn eval_this(&mut self, expr: &expr::This) -> Result<Object> {
        self.lookup_variable(&expr.keyword, expr.id)
    }

    fn lookup_variable(&self, name: &crate::token::Token, id: NodeId) -> Result<Object> {
        match self.locals.get(&id) {
            Some(distance) => Environment::get_at(&self.environment, *distance, &name.lexeme),
            None => self.globals.borrow().get(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{parser::Parser, scanner::Scanner};

    fn run(source: &str) -> Vec<String> {
        let tokens = Scanner::new(source.to_string()).scan_tokens().expect("scan should succeed");
        let statements = Parser::new(tokens).parse().expect("parse should succeed");
        let mut interpreter = Interpreter::new();
        resolver::Resolver::new(&mut interpreter)
            .resolve_all(&statements)
            .expect("resolve should succeed");
        interpreter.interpret(statements).expect("interpret should succeed");
        interpreter.output().to_vec()
    }

    fn run_err(source: &str) -> LoxError {
        let tokens = Scanner::new(source.to_string()).scan_tokens().expect("scan should succeed");
        let statements = Parser::new(tokens).parse().expect("parse should succeed");
        let mut interpreter = Interpreter::new();
        resolver::Resolver::new(&mut interpreter)
            .resolve_all(&statements)
            .expect("resolve should succeed");
        interpreter.interpret(statements).unwrap_err()
    }

    #[test]
    fn closure_counter() {
        let output = run(
            "fun makeCounter() { var i = 0; fun count() { i = i + 1; print i; } return count; }
             var c = makeCounter(); c(); c(); c();",
        );
        assert_eq!(output, vec!["1", "2", "3"]);
    }

    #[test]
    fn fibonacci() {
        let output = run("fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);");
        assert_eq!(output, vec!["55"]);
    }

    #[test]
    fn resolver_fixes_closure_scope() {
        let output = run(
            r#"var a = "global";
               { fun show() { print a; } show(); var a = "block"; show(); }"#,
        );
        assert_eq!(output, vec!["global", "global"]);
    }

    #[test]
    fn method_with_this() {
        let output = run(
            r#"class Greeter { greet() { print "hi " + this.who; } }
               var g = Greeter(); g.who = "world"; g.greet();"#,
        );
        assert_eq!(output, vec!["hi world"]);
    }

    #[test]
    fn loop_break() {
        let output = run("for (var i = 0; i < 5; i = i + 1) { if (i == 3) break; print i; }");
        assert_eq!(output, vec!["0", "1", "2"]);
    }

    #[test]
    fn arithmetic_and_strings() {
        assert_eq!(run("print 1 + 2;"), vec!["3"]);
        assert_eq!(run(r#"print "foo" + "bar";"#), vec!["foobar"]);
        assert_eq!(run("print 10 / 4;"), vec!["2.5"]);
    }

    #[test]
    fn truthiness_and_equality() {
        assert_eq!(run("print !nil;"), vec!["1"]);
        assert_eq!(run("print !0;"), vec!["0"]);
        assert_eq!(run("print nil == nil;"), vec!["1"]);
        assert_eq!(run("print 1 == \"1\";"), vec!["0"]);
    }

    #[test]
    fn adding_string_and_number_is_a_runtime_error() {
        let err = run_err(r#"print "a" + 1;"#);
        assert!(matches!(err, LoxError::Runtime { .. }));
    }

    #[test]
    fn comparing_mismatched_types_is_a_runtime_error() {
        let err = run_err(r#"print "a" < 1;"#);
        assert!(matches!(err, LoxError::Runtime { .. }));
    }
}
