use std::ops::Range;
use crate::parser::{
    ast::{binary::Binary, expr::{Expr, Primary}},
    error::{kind, Error},
    token::op::UnaryOp,
    Associativity,
    Parse,
    Parser,
};

/// Attempt to parse a unary operator with the correct associativity. Returns a non-fatal error if
/// the operator is not of the correct associativity.
fn try_parse_unary_op(input: &mut Parser, associativity: Associativity) -> Result<UnaryOp, Error> {
    input.try_parse_then::<UnaryOp, _>(|op, input| {
        if op.associativity() == associativity {
            Ok(())
        } else {
            Err(input.error(kind::NonFatal))
        }
    })
}

/// A unary expression, such as `-2` or `3!`. Unary expressions can include nested expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    /// The operand of the unary expression (left or right, depending on the associativity).
    pub operand: Box<Expr>,

    /// The operator of the unary expression.
    pub op: UnaryOp,

    /// The region of the source code that this unary expression was parsed from.
    pub span: Range<usize>,
}

impl Unary {
    /// Returns the span of the unary expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses a unary expression whose operators have the given associativity.
    ///
    /// Postfix operators follow a primary expression and may repeat, as in `3!!`. A prefix
    /// operator applies to everything after it that binds tighter than the operator itself, so
    /// `-3!` negates `3!` while `√4 + 5` takes the root of `4` alone.
    pub fn parse_with_associativity(
        input: &mut Parser,
        associativity: Associativity,
    ) -> Result<Self, Error> {
        match associativity {
            Associativity::Left => Self::parse_postfix(input),
            Associativity::Right => Self::parse_prefix(input),
        }
    }

    fn parse_postfix(input: &mut Parser) -> Result<Self, Error> {
        // the operand is parsed first, otherwise this would recurse forever
        let mut operand = Expr::from(input.try_parse::<Primary>()?);
        let mut op = try_parse_unary_op(input, Associativity::Left)?;

        loop {
            let unary = Self {
                span: operand.span().start..op.span.end,
                operand: Box::new(operand),
                op,
            };
            match try_parse_unary_op(input, Associativity::Left) {
                Ok(next) => {
                    operand = Expr::Unary(unary);
                    op = next;
                },
                Err(_) => return Ok(unary),
            }
        }
    }

    fn parse_prefix(input: &mut Parser) -> Result<Self, Error> {
        let op = try_parse_unary_op(input, Associativity::Right)?;
        let first = Unary::parse_or_lower(input)?;
        let operand = Binary::parse_expr(input, first, op.precedence())?;
        Ok(Self {
            span: op.span.start..operand.span().end,
            operand: Box::new(operand),
            op,
        })
    }

    /// Parses a unary expression, or lower precedence expressions.
    pub fn parse_or_lower(input: &mut Parser) -> Result<Expr, Error> {
        input.try_parse_first(&[
            |input| Unary::parse(input).map(Expr::Unary),
            |input| Primary::parse(input).map(Expr::from),
        ])
    }
}

impl Parse for Unary {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        input.try_parse_first(&[
            |input| Self::parse_with_associativity(input, Associativity::Right),
            |input| Self::parse_with_associativity(input, Associativity::Left),
        ])
    }
}
