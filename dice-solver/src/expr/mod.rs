//! The expression model: trees over white dice values, binary operators and unary operators.
//!
//! The parser's syntax tree (see [`dice_parser::parser::ast`]) keeps every detail of what the
//! player typed, including redundant parentheses and the span of every token. That is what we
//! want for error reporting, but not for searching or comparing expressions. The [`Expr`] type
//! defined here only keeps the structure that affects the value: dice at the leaves, operators
//! at the internal nodes.
//!
//! Expressions are evaluated exactly with [`Rational`] arithmetic, so `6 / 4 * 2` is `3`, not
//! something close to `3`.

mod convert;
mod error;
mod fmt;
mod iter;
mod placement;

pub use convert::{evaluate, parse_to_tree, ParsedExpr};
pub use error::{kind, ArithmeticError};
pub use iter::ExprIter;
pub use placement::{Placement, PlacementError};

use crate::primitive::{exact_sqrt, factorial, rational};
use rug::Rational;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    /// Every binary operator.
    pub const ALL: [BinOp; 4] = [BinOp::Add, BinOp::Sub, BinOp::Mul, BinOp::Div];

    /// Returns the binding strength of the operator. Higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }

    /// Returns true if the operands can be swapped without changing the result.
    pub fn is_commutative(self) -> bool {
        matches!(self, Self::Add | Self::Mul)
    }

    /// Returns the ASCII symbol of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    /// Applies the operator to the given operands.
    pub fn apply(self, lhs: &Rational, rhs: &Rational) -> Result<Rational, ArithmeticError> {
        Ok(match self {
            Self::Add => rational(lhs + rhs),
            Self::Sub => rational(lhs - rhs),
            Self::Mul => rational(lhs * rhs),
            Self::Div => {
                if rhs.cmp0().is_eq() {
                    return Err(ArithmeticError::DivisionByZero);
                }
                rational(lhs / rhs)
            },
        })
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryOp {
    /// Negation, written `-x`.
    Neg,

    /// Factorial, written `x!`.
    Factorial,

    /// Square root, written `sqrt(x)` or `√x`.
    Sqrt,
}

impl UnaryOp {
    /// Every unary operator.
    pub const ALL: [UnaryOp; 3] = [UnaryOp::Neg, UnaryOp::Factorial, UnaryOp::Sqrt];

    /// Returns the lowercase name of the operator.
    pub fn name(self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::Factorial => "factorial",
            Self::Sqrt => "sqrt",
        }
    }

    /// Applies the operator to the given operand.
    pub fn apply(self, operand: &Rational) -> Result<Rational, ArithmeticError> {
        match self {
            Self::Neg => Ok(rational(-operand)),
            Self::Factorial => factorial(operand),
            Self::Sqrt => exact_sqrt(operand),
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::Neg => 1,
            Self::Factorial => 2,
            Self::Sqrt => 4,
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnaryOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neg" | "-" => Ok(Self::Neg),
            "factorial" | "fact" | "!" => Ok(Self::Factorial),
            "sqrt" | "√" => Ok(Self::Sqrt),
            other => Err(format!("unknown unary operator `{}`", other)),
        }
    }
}

/// The set of unary operators allowed by the house rules.
///
/// Serialized as a list of operator names, such as `["neg", "sqrt"]`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<UnaryOp>", into = "Vec<UnaryOp>")]
pub struct UnarySet(u8);

impl UnarySet {
    /// The empty set: only the four binary operators are allowed.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Every unary operator.
    pub fn all() -> Self {
        UnaryOp::ALL.into_iter().collect()
    }

    /// Returns the set with the given operator added.
    pub fn with(mut self, op: UnaryOp) -> Self {
        self.insert(op);
        self
    }

    /// Adds an operator to the set.
    pub fn insert(&mut self, op: UnaryOp) {
        self.0 |= op.bit();
    }

    /// Returns true if the operator is in the set.
    pub fn contains(&self, op: UnaryOp) -> bool {
        self.0 & op.bit() != 0
    }

    /// Returns true if no unary operator is allowed.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates over the operators in the set, in the order of [`UnaryOp::ALL`].
    pub fn iter(self) -> impl Iterator<Item = UnaryOp> {
        UnaryOp::ALL.into_iter().filter(move |&op| self.contains(op))
    }
}

impl std::fmt::Debug for UnarySet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<UnaryOp> for UnarySet {
    fn from_iter<I: IntoIterator<Item = UnaryOp>>(iter: I) -> Self {
        let mut set = Self::empty();
        for op in iter {
            set.insert(op);
        }
        set
    }
}

impl From<Vec<UnaryOp>> for UnarySet {
    fn from(ops: Vec<UnaryOp>) -> Self {
        ops.into_iter().collect()
    }
}

impl From<UnarySet> for Vec<UnaryOp> {
    fn from(set: UnarySet) -> Self {
        set.iter().collect()
    }
}

impl FromStr for UnarySet {
    type Err = String;

    /// Parses a comma-separated list of operator names. `none` and the empty string are the empty
    /// set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(Self::empty());
        }
        s.split(',').map(|op| op.parse::<UnaryOp>()).collect()
    }
}

/// An arithmetic expression over dice values.
///
/// Every leaf is a single die; the expression is a solution for a configuration when its leaves
/// are exactly that configuration's white dice and it evaluates to the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// A single die.
    Die(u8),

    /// A unary operator applied to a subexpression.
    Unary(UnaryOp, Box<Expr>),

    /// A binary operator applied to two subexpressions.
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Creates a unary expression.
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Self::Unary(op, Box::new(operand))
    }

    /// Creates a binary expression.
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Iterates over every subexpression, children first, leftmost first.
    pub fn post_order_iter(&self) -> ExprIter {
        ExprIter::new(self)
    }

    /// Evaluates the expression exactly.
    pub fn eval(&self) -> Result<Rational, ArithmeticError> {
        match self {
            Self::Die(value) => Ok(rational(*value)),
            Self::Unary(op, operand) => op.apply(&operand.eval()?),
            Self::Binary(op, lhs, rhs) => op.apply(&lhs.eval()?, &rhs.eval()?),
        }
    }

    /// Returns the dice used by the expression, from left to right.
    pub fn dice(&self) -> Vec<u8> {
        self.post_order_iter()
            .filter_map(|expr| match expr {
                Self::Die(value) => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Returns true if the leaves of the expression are exactly the given dice, in any order.
    pub fn uses_exactly(&self, white: &[u8]) -> bool {
        let mut dice = self.dice();
        let mut white = white.to_vec();
        dice.sort_unstable();
        white.sort_unstable();
        dice == white
    }

    /// Returns the number of unary operators in the expression.
    pub fn unary_count(&self) -> usize {
        self.post_order_iter()
            .filter(|expr| matches!(expr, Self::Unary(..)))
            .count()
    }

    /// Returns the number of binary operators in the expression.
    pub fn binary_count(&self) -> usize {
        self.post_order_iter()
            .filter(|expr| matches!(expr, Self::Binary(..)))
            .count()
    }

    /// Returns the unary operators in the expression, in post-order.
    pub fn unary_ops(&self) -> impl Iterator<Item = UnaryOp> + '_ {
        self.post_order_iter().filter_map(|expr| match expr {
            Self::Unary(op, _) => Some(*op),
            _ => None,
        })
    }

    /// Renders the expression as infix text with the fewest parentheses needed to parse back to
    /// the same value. This is the same as the [`Display`](std::fmt::Display) implementation.
    pub fn to_infix(&self) -> String {
        self.to_string()
    }
}
