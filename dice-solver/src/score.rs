//! Complexity scoring of expressions.
//!
//! The score ranks solutions: fewer and simpler operators mean a lower score, and the solutions
//! with the lowest score for a roll are its optimal solutions. The score only depends on the
//! structure of the expression, never on its value.

use crate::expr::{Expr, UnaryOp};
use serde::{Deserialize, Serialize};

/// The cost of each kind of operator.
///
/// Every weight must be at least `1`, so that adding an operator never lowers the score. See
/// [`ScoreWeights::zero_weight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// The cost of each binary operator.
    pub binary: u32,

    /// The cost of each negation.
    pub neg: u32,

    /// The cost of each factorial.
    pub factorial: u32,

    /// The cost of each square root.
    pub sqrt: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            binary: 1,
            neg: 2,
            factorial: 3,
            sqrt: 3,
        }
    }
}

impl ScoreWeights {
    /// Returns the name of the first weight that is `0`, if any.
    pub fn zero_weight(&self) -> Option<&'static str> {
        [
            ("binary", self.binary),
            ("neg", self.neg),
            ("factorial", self.factorial),
            ("sqrt", self.sqrt),
        ]
            .into_iter()
            .find_map(|(name, weight)| (weight == 0).then_some(name))
    }

    /// Returns the cost of the given unary operator.
    pub fn unary(&self, op: UnaryOp) -> u32 {
        match op {
            UnaryOp::Neg => self.neg,
            UnaryOp::Factorial => self.factorial,
            UnaryOp::Sqrt => self.sqrt,
        }
    }
}

/// Scores the expression with the default weights.
///
/// Every solution uses five dice and therefore exactly four binary operators, so the lowest
/// possible score is `4`.
pub fn default_score(expr: &Expr) -> u32 {
    score_with(expr, &ScoreWeights::default())
}

/// Scores the expression with the given weights.
pub fn score_with(expr: &Expr, weights: &ScoreWeights) -> u32 {
    expr.post_order_iter()
        .map(|expr| match expr {
            Expr::Die(_) => 0,
            Expr::Unary(op, _) => weights.unary(*op),
            Expr::Binary(..) => weights.binary,
        })
        .sum()
}
