pub mod ast;
pub mod error;
pub mod token;

use dice_error::ErrorKind;
use error::{kind, Error};
use super::tokenizer::{tokenize_complete, Token, TokenKind};
use std::ops::Range;

/// A parsing function, as accepted by [`Parser::try_parse_first`].
pub type ParseFn<'source, T> = fn(&mut Parser<'source>) -> Result<T, Error>;

/// A backtracking parser over the tokens of one answer.
///
/// Every `try_parse*` method restores the cursor when it fails, so alternatives can be tried one
/// after another on the same parser. Peeking is done by parsing from a clone and then moving
/// the cursor with [`Parser::set_cursor`] if the result is wanted.
#[derive(Debug, Clone)]
pub struct Parser<'source> {
    tokens: Box<[Token<'source>]>,

    /// Index of the next token to read.
    cursor: usize,
}

impl<'source> Parser<'source> {
    /// Tokenizes the source.
    pub fn new(source: &'source str) -> Self {
        Self {
            tokens: tokenize_complete(source),
            cursor: 0,
        }
    }

    /// An error at the current token.
    pub fn error(&self, kind: impl ErrorKind + 'static) -> Error {
        Error::new(vec![self.span()], kind)
    }

    /// A fatal error at the current token.
    pub fn error_fatal(&self, kind: impl ErrorKind + 'static) -> Error {
        Error::new_fatal(vec![self.span()], kind)
    }

    /// The empty span just past the last token.
    pub fn eof_span(&self) -> Range<usize> {
        let end = self.tokens.last().map_or(0, |token| token.span.end);
        end..end
    }

    /// The span of the token under the cursor, or [`Parser::eof_span`] past the end.
    pub fn span(&self) -> Range<usize> {
        match self.tokens.get(self.cursor) {
            Some(token) => token.span.clone(),
            None => self.eof_span(),
        }
    }

    /// Moves the cursor to where a clone of this parser has got to.
    pub fn set_cursor(&mut self, other: &Parser) {
        self.cursor = other.cursor;
    }

    /// The next token that is not whitespace, without moving the cursor.
    pub fn current_token(&self) -> Option<&Token<'source>> {
        self.tokens
            .iter()
            .skip(self.cursor)
            .find(|token| !token.is_whitespace())
    }

    /// Reads the next token that is not whitespace.
    pub fn next_token(&mut self) -> Result<Token<'source>, Error> {
        while let Some(token) = self.tokens.get(self.cursor) {
            self.cursor += 1;
            if !token.is_whitespace() {
                return Ok(token.clone());
            }
        }

        Err(self.error(kind::UnexpectedEof))
    }

    /// Parses a `T`, restoring the cursor on failure.
    pub fn try_parse<T: Parse>(&mut self) -> Result<T, Error> {
        self.try_parse_with_fn(T::parse)
    }

    /// Runs a parsing function, restoring the cursor on failure.
    pub fn try_parse_with_fn<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Parser<'source>) -> Result<T, Error>,
    {
        let start = self.cursor;
        let result = f(self);
        if result.is_err() {
            self.cursor = start;
        }
        result
    }

    /// Parses a `T` and checks it with `predicate`. If either step fails, the cursor is restored.
    pub fn try_parse_then<T: Parse, F>(&mut self, predicate: F) -> Result<T, Error>
    where
        F: FnOnce(&T, &Parser) -> Result<(), Error>,
    {
        self.try_parse_with_fn(|input| {
            let value = T::parse(input)?;
            predicate(&value, input)?;
            Ok(value)
        })
    }

    /// Tries each parsing function in order and returns the first success.
    ///
    /// A fatal error ends the search at once. If every function fails, the error of the last one
    /// is returned.
    pub fn try_parse_first<T>(&mut self, parsers: &[ParseFn<'source, T>]) -> Result<T, Error> {
        let mut last = None;
        for parse in parsers {
            match self.try_parse_with_fn(*parse) {
                Ok(value) => return Ok(value),
                Err(err) if err.fatal => return Err(err),
                Err(err) => last = Some(err),
            }
        }
        Err(last.unwrap_or_else(|| self.error(kind::NonFatal)))
    }

    /// Parses one or more `T`s separated by `delimiter`, restoring the cursor on failure.
    pub fn try_parse_delimited<T: Parse>(&mut self, delimiter: TokenKind) -> Result<Vec<T>, Error> {
        self.try_parse_with_fn(|input| {
            let mut values = vec![input.try_parse::<T>()?];
            loop {
                let mut ahead = input.clone();
                if !matches!(ahead.next_token(), Ok(token) if token.kind == delimiter) {
                    return Ok(values);
                }
                match ahead.try_parse::<T>() {
                    Ok(value) => {
                        values.push(value);
                        input.set_cursor(&ahead);
                    },
                    Err(err) if err.fatal => return Err(err),
                    Err(_) => return Ok(values),
                }
            }
        })
    }

    /// Parses a `T` that must span the whole source, apart from trailing whitespace.
    pub fn try_parse_full<T: Parse>(&mut self) -> Result<T, Error> {
        let value = T::parse(self)?;
        match self.current_token() {
            None => Ok(value),
            Some(token) => Err(Error::new(vec![token.span.start..self.eof_span().end], kind::ExpectedEof)),
        }
    }
}

/// Any syntax tree node that can be parsed.
pub trait Parse: Sized {
    /// Parses the node, advancing past it. On failure the cursor may be anywhere; use
    /// [`Parser::try_parse`] to backtrack.
    fn parse(input: &mut Parser) -> Result<Self, Error>;
}

/// Which side of its operand a unary operator is written on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Associativity {
    /// Postfix: `3!!` is `(3!)!`.
    Left,

    /// Prefix: `--3` is `-(-3)`.
    Right,
}

/// How tightly an operator binds, from loosest to tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Accepts any operator; the starting point of an expression.
    Any,

    /// `+` and `-`.
    Term,

    /// `*` and `/`.
    Factor,

    /// Prefix `-`.
    Neg,

    /// Prefix `√`.
    Root,

    /// Postfix `!`.
    Factorial,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    use ast::{
        binary::Binary,
        call::Call,
        expr::Expr,
        literal::LitNum,
        paren::Paren,
        unary::Unary,
    };
    use token::op::{BinOp, BinOpKind, UnaryOp, UnaryOpKind};

    /// Shorthand for a number literal.
    fn num(value: u64, span: Range<usize>) -> Expr {
        Expr::Literal(LitNum { value, span })
    }

    #[test]
    fn literal_int() {
        let mut parser = Parser::new("6");
        let expr = parser.try_parse_full::<Expr>().unwrap();

        assert_eq!(expr, num(6, 0..1));
    }

    #[test]
    fn binary_left_associativity() {
        let mut parser = Parser::new("1 - 2 - 3");
        let expr = parser.try_parse_full::<Expr>().unwrap();

        assert_eq!(expr, Expr::Binary(Binary {
            lhs: Box::new(Expr::Binary(Binary {
                lhs: Box::new(num(1, 0..1)),
                op: BinOp { kind: BinOpKind::Sub, span: 2..3 },
                rhs: Box::new(num(2, 4..5)),
                span: 0..5,
            })),
            op: BinOp { kind: BinOpKind::Sub, span: 6..7 },
            rhs: Box::new(num(3, 8..9)),
            span: 0..9,
        }));
    }

    #[test]
    fn binary_precedence() {
        let mut parser = Parser::new("1 + 2 * 3");
        let expr = parser.try_parse_full::<Expr>().unwrap();

        assert_eq!(expr, Expr::Binary(Binary {
            lhs: Box::new(num(1, 0..1)),
            op: BinOp { kind: BinOpKind::Add, span: 2..3 },
            rhs: Box::new(Expr::Binary(Binary {
                lhs: Box::new(num(2, 4..5)),
                op: BinOp { kind: BinOpKind::Mul, span: 6..7 },
                rhs: Box::new(num(3, 8..9)),
                span: 4..9,
            })),
            span: 0..9,
        }));
    }

    #[test]
    fn mixed_precedence_chain() {
        // (1 + (2 * 3)) - 4
        let mut parser = Parser::new("1+2*3-4");
        let expr = parser.try_parse_full::<Expr>().unwrap();

        let Expr::Binary(outer) = expr else { panic!("expected a binary expression") };
        assert_eq!(outer.op.kind, BinOpKind::Sub);
        assert_eq!(*outer.rhs, num(4, 6..7));

        let Expr::Binary(inner) = *outer.lhs else { panic!("expected a binary expression") };
        assert_eq!(inner.op.kind, BinOpKind::Add);
        assert!(matches!(*inner.rhs, Expr::Binary(Binary { op: BinOp { kind: BinOpKind::Mul, .. }, .. })));
    }

    #[test]
    fn parenthesized() {
        let mut parser = Parser::new("(1 + 2) * 3");
        let expr = parser.try_parse_full::<Expr>().unwrap();

        assert_eq!(expr, Expr::Binary(Binary {
            lhs: Box::new(Expr::Paren(Paren {
                expr: Box::new(Expr::Binary(Binary {
                    lhs: Box::new(num(1, 1..2)),
                    op: BinOp { kind: BinOpKind::Add, span: 3..4 },
                    rhs: Box::new(num(2, 5..6)),
                    span: 1..6,
                })),
                span: 0..7,
            })),
            op: BinOp { kind: BinOpKind::Mul, span: 8..9 },
            rhs: Box::new(num(3, 10..11)),
            span: 0..11,
        }));
    }

    #[test]
    fn negated_factorial() {
        // factorial binds tighter than negation
        let mut parser = Parser::new("-3!");
        let expr = parser.try_parse_full::<Expr>().unwrap();

        assert_eq!(expr, Expr::Unary(Unary {
            operand: Box::new(Expr::Unary(Unary {
                operand: Box::new(num(3, 1..2)),
                op: UnaryOp { kind: UnaryOpKind::Factorial, span: 2..3 },
                span: 1..3,
            })),
            op: UnaryOp { kind: UnaryOpKind::Neg, span: 0..1 },
            span: 0..3,
        }));
    }

    #[test]
    fn double_factorial_is_repeated() {
        let mut parser = Parser::new("3!!");
        let expr = parser.try_parse_full::<Expr>().unwrap();

        assert_eq!(expr, Expr::Unary(Unary {
            operand: Box::new(Expr::Unary(Unary {
                operand: Box::new(num(3, 0..1)),
                op: UnaryOp { kind: UnaryOpKind::Factorial, span: 1..2 },
                span: 0..2,
            })),
            op: UnaryOp { kind: UnaryOpKind::Factorial, span: 2..3 },
            span: 0..3,
        }));
    }

    #[test]
    fn negation_in_binary() {
        let mut parser = Parser::new("2 * -3");
        let expr = parser.try_parse_full::<Expr>().unwrap();

        assert_eq!(expr, Expr::Binary(Binary {
            lhs: Box::new(num(2, 0..1)),
            op: BinOp { kind: BinOpKind::Mul, span: 2..3 },
            rhs: Box::new(Expr::Unary(Unary {
                operand: Box::new(num(3, 5..6)),
                op: UnaryOp { kind: UnaryOpKind::Neg, span: 4..5 },
                span: 4..6,
            })),
            span: 0..6,
        }));
    }

    #[test]
    fn sqrt_prefix_and_call() {
        let mut parser = Parser::new("√4 + sqrt(9)");
        let expr = parser.try_parse_full::<Expr>().unwrap();

        // `√` is three bytes long
        assert_eq!(expr, Expr::Binary(Binary {
            lhs: Box::new(Expr::Unary(Unary {
                operand: Box::new(num(4, 3..4)),
                op: UnaryOp { kind: UnaryOpKind::Sqrt, span: 0..3 },
                span: 0..4,
            })),
            op: BinOp { kind: BinOpKind::Add, span: 5..6 },
            rhs: Box::new(Expr::Call(Call {
                name: "sqrt".to_string(),
                name_span: 7..11,
                args: vec![num(9, 12..13)],
                span: 7..14,
            })),
            span: 0..14,
        }));
    }

    #[test]
    fn trailing_whitespace() {
        let mut parser = Parser::new("1 + 2   ");
        assert!(parser.try_parse_full::<Expr>().is_ok());
    }

    #[test]
    fn unclosed_parenthesis_is_fatal() {
        let mut parser = Parser::new("(1 + 2");
        let err = parser.try_parse_full::<Expr>().unwrap_err();
        assert!(err.fatal);
        assert_eq!(err.spans, vec![0..1]);
    }

    #[test]
    fn unopened_parenthesis() {
        let mut parser = Parser::new("1 + 2)");
        let err = parser.try_parse_full::<Expr>().unwrap_err();
        assert_eq!(err.spans, vec![5..6]);
    }

    #[test]
    fn empty_parenthesis() {
        let mut parser = Parser::new("1 + ()");
        let err = parser.try_parse_full::<Expr>().unwrap_err();
        assert!(err.fatal);
        assert_eq!(err.spans, vec![4..6]);
    }

    #[test]
    fn dangling_operator() {
        let mut parser = Parser::new("1 +");
        assert!(parser.try_parse_full::<Expr>().is_err());
    }

    #[test]
    fn unknown_symbol() {
        let mut parser = Parser::new("2 ^ 3");
        let err = parser.try_parse_full::<Expr>().unwrap_err();
        assert_eq!(err.spans, vec![2..5]);
    }
}
