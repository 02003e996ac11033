use logos::Logos;
use std::ops::Range;

/// The kinds of token in an answer.
#[derive(Logos, Clone, Copy, Debug, PartialEq)]
pub enum TokenKind {
    #[regex(r"[\n\r]+")]
    NewLine,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[token("+")]
    Add,

    /// Subtraction or negation. The printed minus sign `−` is accepted too.
    #[token("-")]
    #[token("−")]
    Sub,

    #[token("*")]
    #[token("×")]
    Mul,

    #[token("/")]
    #[token("÷")]
    Div,

    #[token("!")]
    Factorial,

    #[token("√")]
    Sqrt,

    /// A function name, such as `sqrt`.
    #[regex(r"[a-zA-Z_]+")]
    Name,

    #[token(",")]
    Comma,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[regex(r"[0-9]+")]
    Int,

    /// Any other single character. The parser rejects these where they appear.
    #[regex(r".", priority = 0)]
    Symbol,
}

impl TokenKind {
    pub fn is_whitespace(self) -> bool {
        matches!(self, Self::Whitespace | Self::NewLine)
    }
}

/// A token and the text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'source> {
    pub span: Range<usize>,
    pub kind: TokenKind,
    pub lexeme: &'source str,
}

impl Token<'_> {
    pub fn is_whitespace(&self) -> bool {
        self.kind.is_whitespace()
    }
}
