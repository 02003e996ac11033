use ariadne::Fmt;
use dice_attrs::ErrorKind;
use dice_error::{DICE, EXPR};
use crate::tokenizer::TokenKind;

/// Signals that a parser did not match, so that the caller can try something else. Never shown to
/// players.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "the parser backtracked past this point",
    labels = ["here"],
    help = "this is a bug in the parser",
)]
pub struct NonFatal;

/// The answer ended in the middle of an expression.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "the answer ends too early",
    labels = [format!("an {} is missing here", "expression".fg(EXPR))],
)]
pub struct UnexpectedEof;

/// The answer was complete, but more text followed it.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected text after the answer",
    labels = ["this is not part of the answer"],
    help = format!("an answer is a single {}", "expression".fg(EXPR)),
)]
pub struct ExpectedEof;

/// A token of the wrong kind was found.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("did not expect {:?} here", self.found),
    labels = [format!(
        "expected {}",
        self.expected.iter().map(|kind| format!("{:?}", kind)).collect::<Vec<_>>().join(" or "),
    )],
)]
pub struct UnexpectedToken {
    /// The kinds of token that would have been accepted.
    pub expected: &'static [TokenKind],

    /// The kind of token that was found.
    pub found: TokenKind,
}

/// A number is too large to be stored.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "this number is far too large",
    labels = ["here"],
    help = format!("each {} shows a value from 1 to 6", "die".fg(DICE)),
)]
pub struct NumberTooLarge;

/// A parenthesis has no partner.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unbalanced parentheses",
    labels = ["this parenthesis has no partner"],
    help = match self.opening {
        true => "add a `)` after it",
        false => "add a `(` before it",
    },
)]
pub struct UnclosedParenthesis {
    /// Whether the unmatched parenthesis is `(` rather than `)`.
    pub opening: bool,
}

/// A pair of parentheses holds nothing.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "empty parentheses",
    labels = ["an expression belongs here"],
)]
pub struct EmptyParenthesis;
