use std::collections::HashMap;

use snafu::whatever;
use tracing::trace;

use super::Interpreter;
use crate::{
    Result,
    expr::{Expr, NodeId},
    stmt::{self, Stmt},
};

pub struct Resolver<'a> {
    interpreter: &'a mut Interpreter,
    scopes: Vec<HashMap<String, bool>>,
    current_function: FunctionType,
    current_class: ClassType,
    in_loop: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
}

impl<'a> Resolver<'a> {
    pub fn new(interpreter: &'a mut Interpreter) -> Self {
        Self {
            interpreter,
            scopes: vec![],
            current_function: FunctionType::None,
            current_class: ClassType::None,
            in_loop: false,
        }
    }

    #[tracing::instrument(skip(self, statements), level = "trace")]
    pub fn resolve_all(&mut self, statements: &Vec<Stmt>) -> Result<()> {
        let mut had_error = false;
        for statement in statements {
            if let Err(err) = self.resolve_stmt(statement).inspect_err(|_| had_error = true) {
                // Keep going with the analysis, error at the end
                eprintln!("{}", err);
            }
        }

        if had_error {
            whatever!("One or more errors during static analysis")
        }
        Ok(())
    }
}

// Expressions
impl Resolver<'_> {
    fn resolve_expr(&mut self, expr: &Expr) -> Result<()> {
        trace!(?expr, "Resolving expression");
        match expr {
            Expr::Variable(var) => {
                if let Some(peeked) = self.scopes.last() {
                    if peeked.get(&var.name.lexeme) == Some(&false) {
                        whatever!("Can't read local variable in its own initializer.");
                    }
                }

                self.resolve_local(&var.name.lexeme, var.id);
            }
            Expr::Assign(assign) => {
                self.resolve_expr(&assign.value)?;
                self.resolve_local(&assign.name.lexeme, assign.id);
            }
            Expr::Binary(binary) => {
                self.resolve_expr(&binary.left)?;
                self.resolve_expr(&binary.right)?;
            }
            Expr::Call(call) => {
                self.resolve_expr(&call.callee)?;
                for arg in call.arguments.iter() {
                    self.resolve_expr(arg)?;
                }
            }
            Expr::Get(get) => {
                self.resolve_expr(&get.object)?;
            }
            Expr::Set(set) => {
                self.resolve_expr(&set.value)?;
                self.resolve_expr(&set.object)?;
            }
            Expr::This(this) => {
                if self.current_class == ClassType::None {
                    whatever!("Can't use 'this' outside of a class.");
                }
                self.resolve_local("this", this.id);
            }
            Expr::Grouping(group) => {
                self.resolve_expr(&group.expression)?;
            }
            Expr::Literal(_) => (),
            Expr::Logical(logic) => {
                self.resolve_expr(&logic.left)?;
                self.resolve_expr(&logic.right)?;
            }
            Expr::Unary(unary) => self.resolve_expr(&unary.right)?,
        }
        Ok(())
    }
}

// Statements
impl Resolver<'_> {
    fn resolve_stmt(&mut self, statement: &Stmt) -> Result<()> {
        trace!(?statement, "Resolving statement");
        match statement {
            Stmt::Var(var) => {
                self.declare(&var.name.lexeme)?;
                if let Some(initializer) = &var.initializer {
                    self.resolve_expr(initializer)?;
                }
                self.define(&var.name.lexeme);
            }
            Stmt::Function(func) => {
                self.declare(&func.name.lexeme)?;
                self.define(&func.name.lexeme);

                self.resolve_func(func, FunctionType::Function)?;
            }
            Stmt::Expression(expr) => self.resolve_expr(&expr.expression)?,
            Stmt::If(stmt) => {
                self.resolve_expr(&stmt.condition)?;
                self.resolve_stmt(&stmt.then_branch)?;
                if let Some(else_branch) = &stmt.else_branch {
                    self.resolve_stmt(else_branch)?;
                }
            }
            Stmt::Print(stmt) => {
                self.resolve_expr(&stmt.expression)?;
            }
            Stmt::Return(stmt) => {
                if self.current_function == FunctionType::None {
                    whatever!("Return statement outside of a function.");
                }
                if let Some(val) = &stmt.value {
                    self.resolve_expr(val)?;
                }
            }
            Stmt::While(stmt) => {
                self.resolve_expr(&stmt.condition)?;
                let enclosing_loop = self.in_loop;
                self.in_loop = true;
                self.resolve_stmt(&stmt.body)?;
                self.in_loop = enclosing_loop;
            }
            Stmt::Break(_) => {
                if !self.in_loop {
                    whatever!("'break' statement outside of a loop.");
                }
            }
            Stmt::Block(block) => {
                self.begin_scope();
                self.resolve_all(&block.statements)?;
                self.end_scope()?;
            }
            Stmt::Class(stmt) => {
                let enclosing_class = self.current_class;
                self.current_class = ClassType::Class;

                self.declare(&stmt.name.lexeme)?;
                self.define(&stmt.name.lexeme);

                self.begin_scope();
                self.scopes.last_mut().expect("just pushed").insert("this".to_string(), true);

                for method in stmt.methods.iter() {
                    self.resolve_func(method, FunctionType::Method)?;
                }

                self.end_scope()?;
                self.current_class = enclosing_class;
            }
        }
        Ok(())
    }

    fn resolve_func(&mut self, func: &stmt::Function, typ: FunctionType) -> Result<()> {
        let enclosing_fn = self.current_function;
        let enclosing_loop = self.in_loop;
        self.current_function = typ;
        // a function body starts its own loop context: a `break` can't reach
        // through a function boundary to an enclosing `while`
        self.in_loop = false;
        self.begin_scope();
        for param in func.params.iter() {
            self.declare(&param.lexeme)?;
            self.define(&param.lexeme);
        }
        self.resolve_all(&func.body)?;
        self.end_scope()?;
        self.current_function = enclosing_fn;
        self.in_loop = enclosing_loop;
        Ok(())
    }
}

// Helpers
impl Resolver<'_> {
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) -> Result<()> {
        if self.scopes.pop().is_none() {
            whatever!("Ended a scope when there was no stack")
        }
        Ok(())
    }

    fn declare(&mut self, name: &str) -> Result<()> {
        if self.scopes.is_empty() {
            return Ok(());
        }

        if let Some(peeked) = self.scopes.last_mut() {
            if peeked.contains_key(name) {
                whatever!("Already a variable with this name in this scope.");
            }
            peeked.insert(name.to_string(), false);
        }
        Ok(())
    }

    fn define(&mut self, name: &str) {
        if self.scopes.is_empty() {
            return;
        }

        if let Some(peeked) = self.scopes.last_mut() {
            peeked.insert(name.to_string(), true);
        }
    }

    fn resolve_local(&mut self, name: &str, id: NodeId) {
        let top = self.scopes.len();
        for i in (0..top).rev() {
            if self.scopes[i].contains_key(name) {
                let depth = self.scopes.len() - 1 - i;
                self.interpreter.resolve(id, depth);
                return;
            }
        }
        // not found in any scope: treat as global, leave unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn resolve(source: &str) -> Result<()> {
        let tokens = Scanner::new(source.to_string()).scan_tokens().expect("scan should succeed");
        let statements = Parser::new(tokens).parse().expect("parse should succeed");
        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter).resolve_all(&statements)
    }

    #[test]
    fn global_self_initializer_is_fine() {
        assert!(resolve("var x = x;").is_ok());
    }

    #[test]
    fn local_self_initializer_is_a_static_error() {
        assert!(resolve("{ var x = x; }").is_err());
    }

    #[test]
    fn redeclaring_a_local_name_is_a_static_error() {
        assert!(resolve("{ var x = 1; var x = 2; }").is_err());
    }

    #[test]
    fn this_outside_a_class_is_a_static_error() {
        assert!(resolve("print this;").is_err());
    }

    #[test]
    fn this_inside_a_method_is_fine() {
        assert!(resolve("class Foo { bar() { print this; } }").is_ok());
    }

    #[test]
    fn break_outside_a_loop_is_a_static_error() {
        assert!(resolve("break;").is_err());
    }

    #[test]
    fn break_inside_a_loop_is_fine() {
        assert!(resolve("while (true) { break; }").is_ok());
    }

    #[test]
    fn return_outside_a_function_is_a_static_error() {
        assert!(resolve("return 1;").is_err());
    }

    #[test]
    fn break_inside_nested_function_within_a_loop_is_still_an_error() {
        // `fun`'s own body is not "inside the loop" for break purposes
        assert!(resolve("while (true) { fun f() { break; } }").is_err());
    }
}
