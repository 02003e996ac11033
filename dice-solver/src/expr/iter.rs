use super::Expr;

/// Visits every node of an expression tree, children before parents and left before right.
///
/// Created by [`Expr::post_order_iter`].
pub struct ExprIter<'a> {
    /// Nodes still to visit, with whether their children have already been scheduled.
    pending: Vec<(&'a Expr, bool)>,
}

impl<'a> ExprIter<'a> {
    pub fn new(expr: &'a Expr) -> Self {
        Self { pending: vec![(expr, false)] }
    }
}

impl<'a> Iterator for ExprIter<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (expr, expanded) = self.pending.pop()?;
            if expanded {
                return Some(expr);
            }

            self.pending.push((expr, true));
            match expr {
                Expr::Die(_) => (),
                Expr::Unary(_, operand) => self.pending.push((&**operand, false)),
                Expr::Binary(_, lhs, rhs) => {
                    self.pending.push((&**rhs, false));
                    self.pending.push((&**lhs, false));
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::expr::{BinOp, UnaryOp};

    #[test]
    fn post_order() {
        // (1 + -2) * 3
        let expr = Expr::binary(
            BinOp::Mul,
            Expr::binary(BinOp::Add, Expr::Die(1), Expr::unary(UnaryOp::Neg, Expr::Die(2))),
            Expr::Die(3),
        );

        let visited = expr.post_order_iter()
            .map(|expr| match expr {
                Expr::Die(value) => value.to_string(),
                Expr::Unary(op, _) => op.to_string(),
                Expr::Binary(op, ..) => op.symbol().to_string(),
            })
            .collect::<Vec<_>>();
        assert_eq!(visited, vec!["1", "2", "neg", "+", "3", "*"]);
    }
}
