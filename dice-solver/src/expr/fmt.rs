//! Infix rendering of expressions with minimal parentheses.

use super::{BinOp, Expr, UnaryOp};
use std::fmt::{self, Display, Formatter};

/// Binding strength of a node when rendered as infix text. Higher binds tighter.
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Binary(op, ..) => op.precedence(),
        Expr::Unary(UnaryOp::Neg, _) => 3,
        Expr::Unary(UnaryOp::Factorial, _) => 4,
        // `sqrt(x)` is self-delimiting
        Expr::Unary(UnaryOp::Sqrt, _) | Expr::Die(_) => 5,
    }
}

/// Writes `expr`, surrounded by parentheses if `paren` is true.
fn write_operand(f: &mut Formatter, expr: &Expr, paren: bool) -> fmt::Result {
    if paren {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl Display for BinOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Expr::Die(value) => write!(f, "{}", value),
            Expr::Unary(UnaryOp::Neg, operand) => {
                write!(f, "-")?;
                write_operand(f, operand, precedence(operand) <= 3)
            },
            Expr::Unary(UnaryOp::Factorial, operand) => {
                write_operand(f, operand, precedence(operand) < 4)?;
                write!(f, "!")
            },
            Expr::Unary(UnaryOp::Sqrt, operand) => write!(f, "sqrt({})", operand),
            Expr::Binary(op, lhs, rhs) => {
                let prec = op.precedence();
                write_operand(f, lhs, precedence(lhs) < prec)?;
                write!(f, " {} ", op)?;

                // operators are left-associative: an equal-precedence right operand only keeps
                // its meaning without parentheses after `+` and `*`
                let rhs_paren = precedence(rhs) < prec
                    || (precedence(rhs) == prec && matches!(op, BinOp::Sub | BinOp::Div));
                write_operand(f, rhs, rhs_paren)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn die(value: u8) -> Expr {
        Expr::Die(value)
    }

    fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(op, lhs, rhs)
    }

    #[test]
    fn left_chains_need_no_parens() {
        let expr = bin(BinOp::Sub, bin(BinOp::Add, die(1), die(2)), die(3));
        assert_eq!(expr.to_string(), "1 + 2 - 3");

        let expr = bin(BinOp::Div, bin(BinOp::Mul, die(4), die(5)), die(6));
        assert_eq!(expr.to_string(), "4 * 5 / 6");
    }

    #[test]
    fn right_operands() {
        let expr = bin(BinOp::Sub, die(1), bin(BinOp::Sub, die(2), die(3)));
        assert_eq!(expr.to_string(), "1 - (2 - 3)");

        let expr = bin(BinOp::Add, die(1), bin(BinOp::Sub, die(2), die(3)));
        assert_eq!(expr.to_string(), "1 + 2 - 3");

        let expr = bin(BinOp::Div, die(6), bin(BinOp::Mul, die(2), die(3)));
        assert_eq!(expr.to_string(), "6 / (2 * 3)");

        let expr = bin(BinOp::Mul, bin(BinOp::Add, die(1), die(2)), die(3));
        assert_eq!(expr.to_string(), "(1 + 2) * 3");
    }

    #[test]
    fn unary() {
        let expr = Expr::unary(UnaryOp::Neg, bin(BinOp::Add, die(1), die(2)));
        assert_eq!(expr.to_string(), "-(1 + 2)");

        let expr = Expr::unary(UnaryOp::Neg, Expr::unary(UnaryOp::Neg, die(2)));
        assert_eq!(expr.to_string(), "-(-2)");

        let expr = Expr::unary(UnaryOp::Factorial, Expr::unary(UnaryOp::Neg, die(3)));
        assert_eq!(expr.to_string(), "(-3)!");

        let expr = Expr::unary(UnaryOp::Factorial, Expr::unary(UnaryOp::Factorial, die(3)));
        assert_eq!(expr.to_string(), "3!!");

        let expr = Expr::unary(UnaryOp::Neg, Expr::unary(UnaryOp::Factorial, die(3)));
        assert_eq!(expr.to_string(), "-3!");

        let expr = bin(
            BinOp::Sub,
            Expr::unary(UnaryOp::Sqrt, bin(BinOp::Add, die(1), die(3))),
            Expr::unary(UnaryOp::Neg, die(2)),
        );
        assert_eq!(expr.to_string(), "sqrt(1 + 3) - -2");
    }
}
