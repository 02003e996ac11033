use std::ops::Range;
use crate::parser::{
    error::{kind, Error},
    ast::expr::Expr,
    token::{CloseParen, OpenParen},
    Parse,
    Parser,
};

/// Consumes the `)` matching the `(` at `open`. A missing `)` is fatal.
pub(crate) fn close(input: &mut Parser, open: &OpenParen) -> Result<CloseParen, Error> {
    input.try_parse::<CloseParen>()
        .map_err(|_| Error::new_fatal(vec![open.span.clone()], kind::UnclosedParenthesis { opening: true }))
}

/// An expression in parentheses, such as `(1 + 2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Paren {
    pub expr: Box<Expr>,

    /// Covers both parentheses.
    pub span: Range<usize>,
}

impl Paren {
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Looks through any further parentheses directly inside these, so `((1 + 2))` gives `1 + 2`.
    pub fn innermost(&self) -> &Expr {
        match &*self.expr {
            Expr::Paren(inner) => inner.innermost(),
            expr => expr,
        }
    }
}

impl Parse for Paren {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let open = input.try_parse::<OpenParen>()?;

        if let Ok(empty) = input.clone().try_parse::<CloseParen>() {
            let span = open.span.start..empty.span.end;
            return Err(Error::new_fatal(vec![span], kind::EmptyParenthesis));
        }

        let expr = input.try_parse::<Expr>()?;
        let end = close(input, &open)?.span.end;
        Ok(Self {
            expr: Box::new(expr),
            span: open.span.start..end,
        })
    }
}
