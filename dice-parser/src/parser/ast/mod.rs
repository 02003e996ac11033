//! Abstract syntax tree for infix math dice expressions.

pub mod binary;
pub mod call;
pub mod expr;
pub mod literal;
pub mod paren;
pub mod unary;

pub use binary::Binary;
pub use call::Call;
pub use expr::{Expr, Primary};
pub use literal::LitNum;
pub use paren::Paren;
pub use unary::Unary;
