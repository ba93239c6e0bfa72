use crate::ast::{BinaryOp, Expr};

/// Receives the nodes of an expression tree in post order.
pub trait ExprVisitor<'source> {
    type Error;

    fn visit_number(&mut self, value: f32) -> Result<(), Self::Error>;
    fn visit_identifier(&mut self, name: &'source str) -> Result<(), Self::Error>;
    /// Called after both operands have been visited.
    fn visit_binary(&mut self, operator: BinaryOp) -> Result<(), Self::Error>;
}

/// Visits children before their parent, left operand first.
pub fn walk_expr<'source, V>(expr: &Expr<'source>, visitor: &mut V) -> Result<(), V::Error>
where
    V: ExprVisitor<'source> + ?Sized,
{
    match expr {
        Expr::NumberLiteral(value) => visitor.visit_number(*value),
        Expr::Identifier(name) => visitor.visit_identifier(name),
        Expr::Binary { operator, lhs, rhs } => {
            walk_expr(lhs, visitor)?;
            walk_expr(rhs, visitor)?;
            visitor.visit_binary(*operator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Rpn(Vec<String>);

    impl<'source> ExprVisitor<'source> for Rpn {
        type Error = std::convert::Infallible;

        fn visit_number(&mut self, value: f32) -> Result<(), Self::Error> {
            self.0.push(value.to_string());
            Ok(())
        }
        fn visit_identifier(&mut self, name: &'source str) -> Result<(), Self::Error> {
            self.0.push(name.to_string());
            Ok(())
        }
        fn visit_binary(&mut self, operator: BinaryOp) -> Result<(), Self::Error> {
            self.0.push(operator.to_string());
            Ok(())
        }
    }

    #[test]
    fn post_order() {
        // ((a + 2) < (b * 3))
        let expr = Expr::binary(
            BinaryOp::LessThan,
            Expr::binary(BinaryOp::Add, Expr::Identifier("a"), Expr::NumberLiteral(2.0)),
            Expr::binary(BinaryOp::Multiply, Expr::Identifier("b"), Expr::NumberLiteral(3.0)),
        );
        let mut rpn = Rpn::default();
        walk_expr(&expr, &mut rpn).unwrap();
        assert_eq!(rpn.0.join(" "), "a 2 + b 3 * <");
    }
}
