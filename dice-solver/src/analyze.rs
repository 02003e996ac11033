//! Checking a player's answer.

use crate::{
    canonical::{normalize, CanonicalForm},
    database::SolutionSet,
    dice::DiceConfig,
    expr::{kind::EvaluationFailed, parse_to_tree, Expr, UnarySet},
    primitive::rational,
    score::{score_with, ScoreWeights},
};
use dice_error::Error;
use rug::Rational;

/// Errors about the dice used by an answer.
pub mod kind {
    use ariadne::Fmt;
    use dice_attrs::ErrorKind;
    use dice_error::DICE;

    /// The answer uses dice that were not rolled, or uses a die more often than it was rolled.
    #[derive(Debug, Clone, ErrorKind, PartialEq)]
    #[error(
        message = "this answer uses dice that were not rolled",
        labels = vec!["this die is not available"; self.count],
        help = format!("the white dice are {}", self.white.as_str().fg(DICE)),
        color = DICE,
    )]
    pub struct WrongDice {
        /// The number of offending dice.
        pub count: usize,

        /// The white dice that were rolled.
        pub white: String,
    }

    /// The answer does not use every die.
    #[derive(Debug, Clone, ErrorKind, PartialEq)]
    #[error(
        message = "this answer does not use every die",
        labels = ["this answer"],
        help = format!("the answer must also use {}", self.missing.as_str().fg(DICE)),
    )]
    pub struct MissingDice {
        /// The unused dice.
        pub missing: String,
    }
}

/// How an answer compares to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The answer does not evaluate to the target.
    Incorrect,

    /// The answer evaluates to the target.
    Correct {
        /// Whether no known solution has a lower score, or [`None`] if no solution is known.
        optimal: Option<bool>,

        /// Whether the answer is equivalent to a known solution.
        known: bool,
    },
}

/// The result of checking an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// The parsed answer.
    pub expr: Expr,

    /// The value of the answer.
    pub value: Rational,

    /// The canonical form of the answer.
    pub canonical: CanonicalForm,

    /// The score of the answer.
    pub score: u32,

    /// Whether the answer hits the target.
    pub verdict: Verdict,
}

fn digits(dice: impl IntoIterator<Item = u8>) -> String {
    dice.into_iter()
        .map(|die| die.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checks that the dice in the answer are exactly the white dice of the configuration.
fn check_dice(input: &str, config: &DiceConfig, dice: &[u8], spans: &[std::ops::Range<usize>]) -> Result<(), Error> {
    let mut available = config.face_counts();
    let mut extra = Vec::new();

    for (&die, span) in dice.iter().zip(spans) {
        let count = &mut available[usize::from(die - 1)];
        if *count == 0 {
            extra.push(span.clone());
        } else {
            *count -= 1;
        }
    }

    if !extra.is_empty() {
        return Err(Error::new(extra.clone(), kind::WrongDice {
            count: extra.len(),
            white: digits(config.white()),
        }));
    }

    let missing = (1..=6u8)
        .flat_map(|die| std::iter::repeat(die).take(usize::from(available[usize::from(die - 1)])))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(Error::new(vec![0..input.len()], kind::MissingDice {
            missing: digits(missing),
        }));
    }

    Ok(())
}

/// Checks a player's answer for the configuration.
///
/// The answer must use each white die exactly once and only the unary operators in `ops`.
/// The verdict compares it with `known`, the solutions known for the configuration.
pub fn analyze(
    input: &str,
    config: &DiceConfig,
    ops: &UnarySet,
    weights: &ScoreWeights,
    known: &SolutionSet,
) -> Result<Analysis, Error> {
    let parsed = parse_to_tree(input, ops)?;
    check_dice(input, config, &parsed.expr.dice(), &parsed.die_spans)?;

    let value = parsed.expr
        .eval()
        .map_err(|reason| Error::new(vec![0..input.len()], EvaluationFailed { reason }))?;
    let canonical = normalize(&parsed.expr);
    let score = score_with(&parsed.expr, weights);

    let verdict = if value == rational(config.black()) {
        Verdict::Correct {
            optimal: known.min_score().map(|min| score <= min),
            known: known.get(&canonical).is_some(),
        }
    } else {
        Verdict::Incorrect
    };

    Ok(Analysis {
        expr: parsed.expr,
        value,
        canonical,
        score,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::{expr::UnaryOp, search::{solve, SearchOptions}};

    fn config() -> DiceConfig {
        "12345-15".parse().unwrap()
    }

    fn known() -> SolutionSet {
        solve(&config(), &SearchOptions::default(), &ScoreWeights::default())
    }

    fn check(input: &str, known: &SolutionSet) -> Result<Analysis, Error> {
        analyze(input, &config(), &UnarySet::all(), &ScoreWeights::default(), known)
    }

    #[test]
    fn optimal_answer() {
        let analysis = check("5 + 4 + 3 + 2 + 1", &known()).unwrap();
        assert_eq!(analysis.value, 15);
        assert_eq!(analysis.canonical.as_str(), "1 + 2 + 3 + 4 + 5");
        assert_eq!(analysis.score, 4);
        assert_eq!(analysis.verdict, Verdict::Correct { optimal: Some(true), known: true });
    }

    #[test]
    fn correct_but_costly() {
        let analysis = check("-(-1) + 2 + 3 + 4 + 5", &known()).unwrap();
        assert_eq!(analysis.canonical.as_str(), "1 + 2 + 3 + 4 + 5");
        assert_eq!(analysis.score, 8);
        assert_eq!(analysis.verdict, Verdict::Correct { optimal: Some(false), known: true });
    }

    #[test]
    fn nothing_known() {
        let analysis = check("(1 + 2) * 5 * (4 - 3)", &SolutionSet::default()).unwrap();
        assert_eq!(analysis.verdict, Verdict::Correct { optimal: None, known: false });
    }

    #[test]
    fn incorrect_answer() {
        let analysis = check("1 + 2 + 3 + 4 * 5", &known()).unwrap();
        assert_eq!(analysis.value, 26);
        assert_eq!(analysis.verdict, Verdict::Incorrect);
    }

    #[test]
    fn wrong_dice() {
        let err = check("1 + 2 + 3 + 4 + 6", &known()).unwrap_err();
        assert_eq!(err.spans, vec![16..17]);

        let err = check("1 + 1 + 3 + 4 + 5", &known()).unwrap_err();
        assert_eq!(err.spans, vec![4..5]);

        let err = check("1 + 2 + 3 + 4 + 5 - 5 + 6", &known()).unwrap_err();
        assert_eq!(err.spans, vec![20..21, 24..25]);
    }

    #[test]
    fn missing_dice() {
        let err = check("1 + 2 + 3 + 4", &known()).unwrap_err();
        assert_eq!(err.spans, vec![0..13]);
    }

    #[test]
    fn operator_not_allowed() {
        let ops = UnarySet::empty().with(UnaryOp::Neg);
        let err = analyze("3! + 1 + 2 + 4 + 5", &config(), &ops, &ScoreWeights::default(), &known());
        assert_eq!(err.unwrap_err().spans, vec![1..2]);
    }

    #[test]
    fn evaluation_failure() {
        let err = check("1 / (5 - 4 - 3 + 2)", &known()).unwrap_err();
        assert_eq!(err.spans, vec![0..19]);
    }
}
