//! Construction of expressions from a flat sequence of placements.

use super::{BinOp, Expr, UnaryOp};
use crate::dice::FACES;
use thiserror::Error;

/// One step of building an expression in postfix order: push a die, or apply an operator to the
/// expressions built so far.
///
/// `[Die(1), Die(2), Binary(Add), Unary(Factorial)]` builds `(1 + 2)!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Die(u8),
    Unary(UnaryOp),
    Binary(BinOp),
}

/// A sequence of placements does not describe exactly one expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("placement {position} is the die value {value}, which is not in 1..=6")]
    InvalidDie {
        position: usize,
        value: u8,
    },

    #[error("placement {position} is an operator with too few operands before it")]
    MissingOperand {
        position: usize,
    },

    #[error("the placements build {0} separate expressions instead of one")]
    Disconnected(usize),

    #[error("there are no placements")]
    Empty,
}

impl Expr {
    /// Builds an expression from placements in postfix order.
    pub fn from_postfix(placements: &[Placement]) -> Result<Self, PlacementError> {
        let mut stack = Vec::new();

        for (position, placement) in placements.iter().enumerate() {
            let missing = || PlacementError::MissingOperand { position };
            match *placement {
                Placement::Die(value) => {
                    if !FACES.contains(&value) {
                        return Err(PlacementError::InvalidDie { position, value });
                    }
                    stack.push(Expr::Die(value));
                },
                Placement::Unary(op) => {
                    let operand = stack.pop().ok_or_else(missing)?;
                    stack.push(Expr::unary(op, operand));
                },
                Placement::Binary(op) => {
                    let rhs = stack.pop().ok_or_else(missing)?;
                    let lhs = stack.pop().ok_or_else(missing)?;
                    stack.push(Expr::binary(op, lhs, rhs));
                },
            }
        }

        match (stack.pop(), stack.len()) {
            (Some(expr), 0) => Ok(expr),
            (Some(_), rest) => Err(PlacementError::Disconnected(rest + 1)),
            (None, _) => Err(PlacementError::Empty),
        }
    }

    /// Returns the placements that build this expression, in postfix order.
    pub fn to_postfix(&self) -> Vec<Placement> {
        self.post_order_iter()
            .map(|expr| match expr {
                Expr::Die(value) => Placement::Die(*value),
                Expr::Unary(op, _) => Placement::Unary(*op),
                Expr::Binary(op, ..) => Placement::Binary(*op),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn builds_expression() {
        let placements = [
            Placement::Die(1),
            Placement::Die(2),
            Placement::Binary(BinOp::Add),
            Placement::Unary(UnaryOp::Factorial),
            Placement::Die(4),
            Placement::Binary(BinOp::Mul),
        ];
        let expr = Expr::from_postfix(&placements).unwrap();
        assert_eq!(expr.to_string(), "(1 + 2)! * 4");
        assert_eq!(expr.eval().unwrap(), 24);
        assert_eq!(expr.to_postfix(), placements.to_vec());
    }

    #[test]
    fn rejects_malformed_sequences() {
        assert_eq!(Expr::from_postfix(&[]), Err(PlacementError::Empty));
        assert_eq!(
            Expr::from_postfix(&[Placement::Die(1), Placement::Binary(BinOp::Add)]),
            Err(PlacementError::MissingOperand { position: 1 }),
        );
        assert_eq!(
            Expr::from_postfix(&[Placement::Die(1), Placement::Die(2)]),
            Err(PlacementError::Disconnected(2)),
        );
        assert_eq!(
            Expr::from_postfix(&[Placement::Die(9)]),
            Err(PlacementError::InvalidDie { position: 0, value: 9 }),
        );
    }
}
