use std::ops::Range;
use crate::parser::{
    error::{kind, Error},
    token::Int,
    Parse,
    Parser,
};

/// An integer written in the answer, such as the `4` in `4 * 3`.
#[derive(Debug, Clone, PartialEq)]
pub struct LitNum {
    pub value: u64,
    pub span: Range<usize>,
}

impl LitNum {
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

impl Parse for LitNum {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let Int { lexeme, span } = input.try_parse::<Int>()?;
        match lexeme.parse() {
            Ok(value) => Ok(Self { value, span }),
            Err(_) => Err(Error::new_fatal(vec![span], kind::NumberTooLarge)),
        }
    }
}
