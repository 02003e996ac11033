use std::ops::Range;
use crate::{
    parser::{
        error::Error,
        ast::{expr::Expr, paren},
        token::{CloseParen, Name, OpenParen},
        Parse,
        Parser,
    },
    tokenizer::TokenKind,
};

/// A function call, such as `sqrt(4)`.
///
/// Any name and any number of arguments parse; the consumer of the tree decides which functions
/// exist.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub name_span: Range<usize>,
    pub args: Vec<Expr>,

    /// Covers the name through the closing parenthesis.
    pub span: Range<usize>,
}

impl Call {
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

impl Parse for Call {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let Name { lexeme, span: name_span } = input.try_parse::<Name>()?;
        let open = input.try_parse::<OpenParen>()?;

        let args = match input.clone().try_parse::<CloseParen>() {
            Ok(_) => Vec::new(),
            Err(_) => input.try_parse_delimited::<Expr>(TokenKind::Comma)?,
        };
        let end = paren::close(input, &open)?.span.end;

        Ok(Self {
            name: lexeme,
            span: name_span.start..end,
            name_span,
            args,
        })
    }
}
