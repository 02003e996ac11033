use std::ops::Range;
use crate::parser::{
    ast::{binary::Binary, call::Call, literal::LitNum, paren::Paren, unary::Unary},
    error::{kind, Error},
    token::CloseParen,
    Parse,
    Parser,
    Precedence,
};

/// Any expression a player can write.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LitNum),
    Paren(Paren),
    Call(Call),

    /// `-1`, `3!` or `√4`.
    Unary(Unary),

    /// `1 + 2` and the like.
    Binary(Binary),
}

impl Expr {
    pub fn span(&self) -> Range<usize> {
        match self {
            Self::Literal(node) => node.span(),
            Self::Paren(node) => node.span(),
            Self::Call(node) => node.span(),
            Self::Unary(node) => node.span(),
            Self::Binary(node) => node.span(),
        }
    }
}

impl Parse for Expr {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        // a stray `)` can never start an expression
        if input.clone().try_parse::<CloseParen>().is_ok() {
            return Err(input.error_fatal(kind::UnclosedParenthesis { opening: false }));
        }

        let first = input.try_parse_with_fn(Unary::parse_or_lower)?;
        Binary::parse_expr(input, first, Precedence::Any)
    }
}

/// The expressions that need no operator precedence to parse: they either are a single token or
/// are delimited by parentheses.
#[derive(Debug, Clone, PartialEq)]
pub enum Primary {
    Literal(LitNum),
    Paren(Paren),
    Call(Call),
}

impl Parse for Primary {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        input.try_parse_first(&[
            |input| Call::parse(input).map(Self::Call),
            |input| LitNum::parse(input).map(Self::Literal),
            |input| Paren::parse(input).map(Self::Paren),
        ])
    }
}

impl From<Primary> for Expr {
    fn from(primary: Primary) -> Self {
        match primary {
            Primary::Literal(node) => Self::Literal(node),
            Primary::Paren(node) => Self::Paren(node),
            Primary::Call(node) => Self::Call(node),
        }
    }
}
