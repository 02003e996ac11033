//! Tokenizer and parser for infix arithmetic over dice values.
//!
//! The grammar is deliberately small: non-negative integer literals, the binary operators `+`,
//! `-`, `*` (or `×`), `/` (or `÷`), prefix negation `-`, prefix square root `√`, postfix
//! factorial `!`, parentheses, and function calls such as `sqrt(4)`. Which functions exist is
//! decided by consumers of the syntax tree, not by the parser.

pub mod parser;
pub mod tokenizer;
