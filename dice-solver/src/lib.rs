//! Solution search and bookkeeping for the math dice game.
//!
//! A round of math dice rolls five white dice and two black dice. The black dice form a two-digit
//! target, and the player combines every white die exactly once with `+`, `-`, `*` and `/` (and,
//! depending on the house rules, a few unary operators) to hit the target.
//!
//! This crate provides:
//!
//! - [`dice`]: the [`DiceConfig`](dice::DiceConfig) type describing one roll.
//! - [`expr`]: the expression model, exact evaluation, and parsing of typed answers.
//! - [`canonical`]: a normal form that identifies algebraically equivalent expressions.
//! - [`score`]: the complexity score used to rank solutions.
//! - [`search`]: the exhaustive solution search.
//! - [`database`]: persistent storage of solutions, and incremental generation runs.
//! - [`analyze`]: checking a player's answer against a roll.
//! - [`config`]: solver configuration loaded from JSON and the environment.

pub mod analyze;
pub mod canonical;
pub mod config;
pub mod database;
pub mod dice;
pub mod expr;
pub mod primitive;
pub mod score;
pub mod search;

pub use analyze::{analyze, Analysis, Verdict};
pub use canonical::{group_by_equivalence, normalize, CanonicalForm, EquivalenceClass};
pub use database::{CancelToken, SolutionDatabase, SolutionEntry, SolutionSet};
pub use dice::DiceConfig;
pub use expr::{BinOp, Expr, UnaryOp, UnarySet};
pub use score::{default_score, score_with, ScoreWeights};
pub use search::{search, solve, SearchOptions, SearchOptionsBuilder};
