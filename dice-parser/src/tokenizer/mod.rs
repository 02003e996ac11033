pub mod token;

use logos::{Lexer, Logos};
pub use token::{Token, TokenKind};

/// Lexes the input lazily.
pub fn tokenize(input: &str) -> Lexer<TokenKind> {
    TokenKind::lexer(input)
}

/// Lexes the whole input up front, so the parser can move back and forth through the tokens.
pub fn tokenize_complete(input: &str) -> Box<[Token]> {
    let mut lexer = tokenize(input);
    let mut tokens = Vec::new();

    while let Some(Ok(kind)) = lexer.next() {
        tokens.push(Token {
            span: lexer.span(),
            kind,
            lexeme: lexer.slice(),
        });
    }

    tokens.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    /// The kinds and lexemes of every token in the input, whitespace included.
    fn lex(input: &str) -> Vec<(TokenKind, &str)> {
        tokenize_complete(input)
            .iter()
            .map(|token| (token.kind, token.lexeme))
            .collect()
    }

    #[test]
    fn sum() {
        use TokenKind::*;
        assert_eq!(lex("1 + 2"), vec![(Int, "1"), (Whitespace, " "), (Add, "+"), (Whitespace, " "), (Int, "2")]);
    }

    #[test]
    fn printed_operator_symbols() {
        use TokenKind::*;
        assert_eq!(
            lex("6×5÷√4−3!"),
            vec![
                (Int, "6"), (Mul, "×"), (Int, "5"), (Div, "÷"), (Sqrt, "√"),
                (Int, "4"), (Sub, "−"), (Int, "3"), (Factorial, "!"),
            ],
        );
    }

    #[test]
    fn names_and_stray_symbols() {
        use TokenKind::*;
        assert_eq!(
            lex("sqrt(4)^2"),
            vec![(Name, "sqrt"), (OpenParen, "("), (Int, "4"), (CloseParen, ")"), (Symbol, "^"), (Int, "2")],
        );
    }

    #[test]
    fn spans_count_bytes() {
        let spans = tokenize_complete("12×(3)")
            .iter()
            .map(|token| token.span.clone())
            .collect::<Vec<_>>();
        assert_eq!(spans, vec![0..2, 2..4, 4..5, 5..6, 6..7]);
    }
}
