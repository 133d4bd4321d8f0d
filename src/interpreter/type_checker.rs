use crate::{
    expr::Expr,
    stmt::{self, Stmt},
};

/// Optional advisory pre-pass. Reproduces only the two checks the original
/// `TypeChecker` actually performs: binary operand type agreement, and the
/// `if`-condition must be boolean. Everything else in that checker is a stub
/// that always reports "no opinion" (`Type::NIL`), so this pass stays silent
/// on anything it can't determine statically rather than inheriting that
/// stub's tendency to flag every variable read as a type mismatch.
pub fn check(statements: &[Stmt]) {
    for statement in statements {
        check_stmt(statement);
    }
}

/// The type of an expression when it's knowable without running the program:
/// literals, and unary/grouping/binary combinations of literals. Anything
/// else (variable reads, calls, property access) returns `None`, meaning "no
/// opinion" rather than a guess.
fn static_type(expr: &Expr) -> Option<&'static str> {
    match expr {
        Expr::Literal(lit) => Some(lit.value.type_name()),
        Expr::Unary(unary) => static_type(&unary.right),
        Expr::Grouping(group) => static_type(&group.expression),
        Expr::Binary(binary) => {
            let left = static_type(&binary.left)?;
            let right = static_type(&binary.right)?;
            (left == right).then_some(left)
        }
        _ => None,
    }
}

fn check_stmt(statement: &Stmt) {
    match statement {
        Stmt::Expression(stmt) => check_expr(&stmt.expression),
        Stmt::Print(stmt) => check_expr(&stmt.expression),
        Stmt::Var(stmt) => {
            if let Some(init) = &stmt.initializer {
                check_expr(init);
            }
        }
        Stmt::Block(stmt) => check(&stmt.statements),
        Stmt::If(stmt) => {
            check_expr(&stmt.condition);
            if let Some(cond_ty) = static_type(&stmt.condition) {
                if cond_ty != "boolean" {
                    eprintln!("Warning: condition must be of boolean type, found {cond_ty}.");
                }
            }
            check_stmt(&stmt.then_branch);
            if let Some(else_branch) = &stmt.else_branch {
                check_stmt(else_branch);
            }
        }
        Stmt::While(stmt) => {
            check_expr(&stmt.condition);
            check_stmt(&stmt.body);
        }
        Stmt::Function(stmt) => check(&stmt.body),
        Stmt::Class(stmt) => {
            for method in &stmt.methods {
                check_function(method);
            }
        }
        Stmt::Return(stmt) => {
            if let Some(value) = &stmt.value {
                check_expr(value);
            }
        }
        Stmt::Break(_) => (),
    }
}

fn check_function(func: &stmt::Function) {
    check(&func.body);
}

fn check_expr(expr: &Expr) {
    match expr {
        Expr::Binary(binary) => {
            check_expr(&binary.left);
            check_expr(&binary.right);
            if let (Some(left), Some(right)) = (static_type(&binary.left), static_type(&binary.right)) {
                if left != right {
                    eprintln!(
                        "Warning: [line {}] cannot '{}' between {} and {}.",
                        binary.operator.line, binary.operator.lexeme, left, right
                    );
                }
            }
        }
        Expr::Logical(logical) => {
            check_expr(&logical.left);
            check_expr(&logical.right);
        }
        Expr::Unary(unary) => check_expr(&unary.right),
        Expr::Grouping(group) => check_expr(&group.expression),
        Expr::Assign(assign) => check_expr(&assign.value),
        Expr::Call(call) => {
            check_expr(&call.callee);
            for arg in &call.arguments {
                check_expr(arg);
            }
        }
        Expr::Get(get) => check_expr(&get.object),
        Expr::Set(set) => {
            check_expr(&set.object);
            check_expr(&set.value);
        }
        Expr::Literal(_) | Expr::Variable(_) | Expr::This(_) => (),
    }
}
