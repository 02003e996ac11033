//! Conversion of typed text into the expression model.

use dice_error::Error;
use dice_parser::parser::{
    ast::{expr::Expr as AstExpr, unary::Unary},
    token::op::{BinOpKind, UnaryOpKind},
    Parser,
};
use rug::Rational;
use std::ops::Range;
use super::{kind, BinOp, Expr, UnaryOp, UnarySet};

/// An expression parsed from text, with the span of every die in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpr {
    /// The parsed expression.
    pub expr: Expr,

    /// The span of each die, in the same left-to-right order as [`Expr::dice`].
    pub die_spans: Vec<Range<usize>>,
}

/// Converts a unary operator from the parser.
fn unary_op(kind: UnaryOpKind) -> UnaryOp {
    match kind {
        UnaryOpKind::Neg => UnaryOp::Neg,
        UnaryOpKind::Sqrt => UnaryOp::Sqrt,
        UnaryOpKind::Factorial => UnaryOp::Factorial,
    }
}

/// Converts a binary operator from the parser.
fn bin_op(kind: BinOpKind) -> BinOp {
    match kind {
        BinOpKind::Add => BinOp::Add,
        BinOpKind::Sub => BinOp::Sub,
        BinOpKind::Mul => BinOp::Mul,
        BinOpKind::Div => BinOp::Div,
    }
}

/// Checks that the operator is allowed, returning an error pointing at `span` if not.
fn check_allowed(op: UnaryOp, ops: &UnarySet, span: Range<usize>) -> Result<(), Error> {
    if ops.contains(op) {
        Ok(())
    } else {
        Err(Error::new(vec![span], kind::UnaryNotAllowed { op }))
    }
}

/// Converts a syntax tree node into an [`Expr`], recording the span of every die.
fn convert(ast: &AstExpr, ops: &UnarySet, die_spans: &mut Vec<Range<usize>>) -> Result<Expr, Error> {
    match ast {
        AstExpr::Literal(lit) => {
            let value = u8::try_from(lit.value)
                .ok()
                .filter(|value| (1..=6).contains(value))
                .ok_or_else(|| Error::new(vec![lit.span()], kind::NotADie { value: lit.value }))?;
            die_spans.push(lit.span());
            Ok(Expr::Die(value))
        },
        AstExpr::Paren(paren) => convert(paren.innermost(), ops, die_spans),
        AstExpr::Call(call) => {
            if call.name != "sqrt" {
                return Err(Error::new(vec![call.name_span.clone()], kind::UnknownFunction {
                    name: call.name.clone(),
                }));
            }
            let [arg] = call.args.as_slice() else {
                return Err(Error::new(vec![call.span()], kind::WrongArgumentCount {
                    name: call.name.clone(),
                    expected: 1,
                    given: call.args.len(),
                }));
            };
            check_allowed(UnaryOp::Sqrt, ops, call.name_span.clone())?;
            Ok(Expr::unary(UnaryOp::Sqrt, convert(arg, ops, die_spans)?))
        },
        AstExpr::Unary(Unary { operand, op, .. }) => {
            let unary = unary_op(op.kind);
            check_allowed(unary, ops, op.span.clone())?;
            Ok(Expr::unary(unary, convert(operand, ops, die_spans)?))
        },
        AstExpr::Binary(binary) => {
            let lhs = convert(&binary.lhs, ops, die_spans)?;
            let rhs = convert(&binary.rhs, ops, die_spans)?;
            Ok(Expr::binary(bin_op(binary.op.kind), lhs, rhs))
        },
    }
}

/// Parses the text of an expression into the expression model.
///
/// Only the unary operators in `ops` are accepted; using any other is an error pointing at the
/// operator.
pub fn parse_to_tree(text: &str, ops: &UnarySet) -> Result<ParsedExpr, Error> {
    let ast = Parser::new(text).try_parse_full::<AstExpr>()?;
    let mut die_spans = Vec::new();
    let expr = convert(&ast, ops, &mut die_spans)?;
    Ok(ParsedExpr { expr, die_spans })
}

/// Parses and evaluates the text of an expression.
pub fn evaluate(text: &str, ops: &UnarySet) -> Result<Rational, Error> {
    let parsed = parse_to_tree(text, ops)?;
    parsed.expr
        .eval()
        .map_err(|reason| Error::new(vec![0..text.len()], kind::EvaluationFailed { reason }))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use super::*;

    #[test]
    fn parses_and_evaluates() {
        let all = UnarySet::all();
        assert_eq!(evaluate("1 + 2 + 3 + 4 + 5", &all).unwrap(), 15);
        assert_eq!(evaluate("(6 - 4) * 5 + 3! / √4", &all).unwrap(), 13);
        assert_eq!(evaluate("sqrt(4) * 6 - -1", &all).unwrap(), 13);
        assert_eq!(evaluate("6 ÷ 4 × 2", &all).unwrap(), 3);
    }

    #[test]
    fn die_spans() {
        let parsed = parse_to_tree("((3)) * 2 - 1", &UnarySet::empty()).unwrap();
        assert_eq!(parsed.expr.dice(), vec![3, 2, 1]);
        assert_eq!(parsed.die_spans, vec![2..3, 8..9, 12..13]);
        assert_eq!(parsed.expr.to_string(), "3 * 2 - 1");
    }

    #[test]
    fn not_a_die() {
        let err = parse_to_tree("12 + 3", &UnarySet::all()).unwrap_err();
        assert_eq!(err.spans, vec![0..2]);

        let err = parse_to_tree("0 + 3", &UnarySet::all()).unwrap_err();
        assert_eq!(err.spans, vec![0..1]);
    }

    #[test]
    fn unary_not_allowed() {
        let ops = UnarySet::empty().with(UnaryOp::Neg);
        assert!(parse_to_tree("-3 + 2", &ops).is_ok());

        let err = parse_to_tree("3! + 2", &ops).unwrap_err();
        assert_eq!(err.spans, vec![1..2]);

        let err = parse_to_tree("sqrt(4) + 2", &ops).unwrap_err();
        assert_eq!(err.spans, vec![0..4]);
    }

    #[test]
    fn bad_calls() {
        let err = parse_to_tree("cbrt(4)", &UnarySet::all()).unwrap_err();
        assert_eq!(err.spans, vec![0..4]);

        let err = parse_to_tree("sqrt(4, 1)", &UnarySet::all()).unwrap_err();
        assert_eq!(err.spans, vec![0..10]);
    }

    #[test]
    fn evaluation_failure() {
        let err = evaluate("3 / (2 - 2)", &UnarySet::all()).unwrap_err();
        assert_eq!(err.spans, vec![0..11]);
    }

    #[test]
    fn syntax_error() {
        assert!(evaluate("3 +", &UnarySet::all()).is_err());
        assert!(evaluate("(3 + 2", &UnarySet::all()).is_err());
    }

    /// Strategy producing random expressions over dice values, nested up to four levels deep.
    fn expr_strategy() -> impl Strategy<Value = Expr> {
        let leaf = (1u8..=6).prop_map(Expr::Die);
        leaf.prop_recursive(4, 16, 2, |inner| {
            prop_oneof![
                (prop::sample::select(BinOp::ALL.to_vec()), inner.clone(), inner.clone())
                    .prop_map(|(op, lhs, rhs)| Expr::binary(op, lhs, rhs)),
                (prop::sample::select(UnaryOp::ALL.to_vec()), inner)
                    .prop_map(|(op, operand)| Expr::unary(op, operand)),
            ]
        })
    }

    proptest! {
        #[test]
        fn infix_round_trip(expr in expr_strategy()) {
            let text = expr.to_string();
            let parsed = parse_to_tree(&text, &UnarySet::all()).unwrap();
            prop_assert_eq!(parsed.expr.dice(), expr.dice());
            prop_assert_eq!(parsed.expr.eval(), expr.eval());
        }
    }
}
