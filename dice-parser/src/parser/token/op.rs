//! Operator tokens.

use crate::{
    parser::{
        error::{kind, Error},
        Associativity,
        Parse,
        Parser,
        Precedence,
    },
    tokenizer::TokenKind,
};
use std::{fmt, ops::Range};

/// Reads one token and converts it with `convert`, reporting the `expected` tokens if it is not
/// an operator of the wanted kind.
fn parse_op<K>(
    input: &mut Parser,
    convert: fn(TokenKind) -> Option<K>,
    expected: &'static [TokenKind],
) -> Result<(K, Range<usize>), Error> {
    let token = input.next_token()?;
    match convert(token.kind) {
        Some(kind) => Ok((kind, token.span)),
        None => Err(Error::new(vec![token.span], kind::UnexpectedToken {
            expected,
            found: token.kind,
        })),
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOpKind {
    /// Prefix `-`.
    Neg,

    /// Prefix `√`. The `sqrt(x)` spelling is a [`Call`](crate::parser::ast::call::Call).
    Sqrt,

    /// Postfix `!`.
    Factorial,
}

impl UnaryOpKind {
    fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Sub => Some(Self::Neg),
            TokenKind::Sqrt => Some(Self::Sqrt),
            TokenKind::Factorial => Some(Self::Factorial),
            _ => None,
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Neg => Precedence::Neg,
            Self::Sqrt => Precedence::Root,
            Self::Factorial => Precedence::Factorial,
        }
    }

    /// Prefix operators are right-associative and postfix operators are left-associative.
    pub fn associativity(&self) -> Associativity {
        match self {
            Self::Factorial => Associativity::Left,
            Self::Neg | Self::Sqrt => Associativity::Right,
        }
    }
}

/// A unary operator and where it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOp {
    pub kind: UnaryOpKind,
    pub span: Range<usize>,
}

impl UnaryOp {
    pub fn precedence(&self) -> Precedence {
        self.kind.precedence()
    }

    pub fn associativity(&self) -> Associativity {
        self.kind.associativity()
    }
}

impl Parse for UnaryOp {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let (kind, span) = parse_op(
            input,
            UnaryOpKind::from_token,
            &[TokenKind::Sub, TokenKind::Sqrt, TokenKind::Factorial],
        )?;
        Ok(Self { kind, span })
    }
}

/// A binary operator. All of them are left-associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOpKind {
    fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Add => Some(Self::Add),
            TokenKind::Sub => Some(Self::Sub),
            TokenKind::Mul => Some(Self::Mul),
            TokenKind::Div => Some(Self::Div),
            _ => None,
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Add | Self::Sub => Precedence::Term,
            Self::Mul | Self::Div => Precedence::Factor,
        }
    }
}

impl fmt::Display for BinOpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        })
    }
}

/// A binary operator and where it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct BinOp {
    pub kind: BinOpKind,
    pub span: Range<usize>,
}

impl BinOp {
    pub fn precedence(&self) -> Precedence {
        self.kind.precedence()
    }
}

impl Parse for BinOp {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let (kind, span) = parse_op(
            input,
            BinOpKind::from_token,
            &[TokenKind::Add, TokenKind::Sub, TokenKind::Mul, TokenKind::Div],
        )?;
        Ok(Self { kind, span })
    }
}
