use std::ops::Range;
use crate::parser::{
    ast::{expr::Expr, unary::Unary},
    error::{kind, Error},
    token::op::BinOp,
    Parser,
    Precedence,
};

/// A binary expression, such as `1 + 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    /// The left-hand side.
    pub lhs: Box<Expr>,

    /// The operator.
    pub op: BinOp,

    /// The right-hand side.
    pub rhs: Box<Expr>,

    /// The region of the source code that this binary expression was parsed from.
    pub span: Range<usize>,
}

impl Binary {
    /// Returns the span of the binary expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses the next binary operator, without consuming it, if it binds at least as tightly as
    /// `min`.
    fn peek_op<'source>(input: &Parser<'source>, min: Precedence) -> Option<(BinOp, Parser<'source>)> {
        let mut ahead = input.clone();
        ahead.try_parse_then::<BinOp, _>(|op, input| {
            if op.precedence() >= min {
                Ok(())
            } else {
                Err(input.error(kind::NonFatal))
            }
        })
            .ok()
            .map(|op| (op, ahead))
    }

    /// Precedence climbing: extends `lhs` with every following operator that binds at least as
    /// tightly as `min`.
    ///
    /// In `1 + 2 * 3 - 4` with `min` at its lowest, `1 + _` is read first. Since `*` binds more
    /// tightly than `+`, its right-hand side is extended recursively into `2 * 3` before
    /// `1 + 2 * 3` is built. The `-` does not bind more tightly than `+`, so it is left for the
    /// outer loop, which builds `(1 + 2 * 3) - 4`, keeping the operators left-associative.
    pub fn parse_expr(input: &mut Parser, mut lhs: Expr, min: Precedence) -> Result<Expr, Error> {
        while let Some((op, ahead)) = Self::peek_op(input, min) {
            input.set_cursor(&ahead);
            let mut rhs = Unary::parse_or_lower(input)?;

            while let Some((next, _)) = Self::peek_op(input, min) {
                if next.precedence() <= op.precedence() {
                    break;
                }
                rhs = Self::parse_expr(input, rhs, next.precedence())?;
            }

            let span = lhs.span().start..rhs.span().end;
            lhs = Expr::Binary(Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
                span,
            });
        }

        Ok(lhs)
    }
}
