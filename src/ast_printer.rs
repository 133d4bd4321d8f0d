use crate::expr::Expr;

/// Debug-only S-expression printer, not wired into the interpret pipeline.
pub struct AstPrinter {}

impl AstPrinter {
    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Binary(e) => self.parenthesize(&e.operator.lexeme, &[&e.left, &e.right]),
            Expr::Logical(e) => self.parenthesize(&e.operator.lexeme, &[&e.left, &e.right]),
            Expr::Grouping(e) => self.parenthesize("group", &[&e.expression]),
            Expr::Literal(e) => e.value.to_string(),
            Expr::Unary(e) => self.parenthesize(&e.operator.lexeme, &[&e.right]),
            Expr::Variable(e) => e.name.lexeme.clone(),
            Expr::Assign(e) => self.parenthesize(&format!("assign {}", e.name.lexeme), &[&e.value]),
            Expr::Call(e) => {
                let mut parts: Vec<&Expr> = vec![&e.callee];
                parts.extend(e.arguments.iter());
                self.parenthesize("call", &parts)
            }
            Expr::Get(e) => self.parenthesize(&format!("get {}", e.name.lexeme), &[&e.object]),
            Expr::Set(e) => self.parenthesize(&format!("set {}", e.name.lexeme), &[&e.object, &e.value]),
            Expr::This(_) => "this".to_string(),
        }
    }

    fn parenthesize(&self, name: &str, exprs: &[&Expr]) -> String {
        let parts: Vec<_> = exprs.iter().map(|expr| self.print(expr)).collect();
        format!("({} {})", name, parts.join(" "))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        expr::{Binary, Grouping, Literal, NodeIdGen, Unary, Variable},
        object::Object,
        token::Token,
        token_type::TokenType,
    };

    #[test]
    fn parenthesizes_nested_binary_expression() {
        let expr = Binary::expr(
            Unary::expr(
                Token::new(TokenType::Minus, "-", crate::object::Literal::Null, 1),
                Literal::expr(Object::from(123_f32)),
            ),
            Token::new(TokenType::Star, "*", crate::object::Literal::Null, 1),
            Grouping::expr(Literal::expr(Object::from(45.67_f32))),
        );
        let printer = AstPrinter {};
        assert_eq!(printer.print(&expr), "(* (- 123) (group 45.67))".to_string());
    }

    #[test]
    fn prints_variable_by_lexeme() {
        let ids = NodeIdGen::default();
        let expr = Variable::expr(Token::new(TokenType::Identifier, "x", crate::object::Literal::Null, 1), ids.next());
        let printer = AstPrinter {};
        assert_eq!(printer.print(&expr), "x".to_string());
    }
}
