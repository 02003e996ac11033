pub mod op;

use crate::{
    parser::{error::{kind, Error}, Parser, Parse},
    tokenizer::{Token, TokenKind},
};
use std::ops::Range;

/// Consumes the next token if it has the given kind.
fn expect<'source>(input: &mut Parser<'source>, expected: &'static [TokenKind; 1]) -> Result<Token<'source>, Error> {
    let token = input.next_token()?;
    if token.kind == expected[0] {
        Ok(token)
    } else {
        Err(Error::new(vec![token.span], kind::UnexpectedToken {
            expected,
            found: token.kind,
        }))
    }
}

/// Declares a type for each listed token kind, parsed by consuming exactly one token of that kind.
macro_rules! single_tokens {
    ($($name:ident)*) => {
        $(
            #[derive(Clone, Debug, PartialEq)]
            pub struct $name {
                pub lexeme: String,
                pub span: Range<usize>,
            }

            impl Parse for $name {
                fn parse(input: &mut Parser) -> Result<Self, Error> {
                    expect(input, &[TokenKind::$name]).map(|token| Self {
                        lexeme: token.lexeme.to_owned(),
                        span: token.span,
                    })
                }
            }
        )*
    };
}

single_tokens!(Name Comma OpenParen CloseParen Int);
