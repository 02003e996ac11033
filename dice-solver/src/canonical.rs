//! A normal form for expressions, used to decide when two solutions are the same solution.
//!
//! Two expressions are considered equivalent if one can be turned into the other by:
//!
//! - reordering the operands of `+` or `*`, such as `1 + 2` and `2 + 1`;
//! - reassociating a chain of additions and subtractions, or of multiplications and divisions,
//! such as `(1 + 2) + 3` and `1 + (2 + 3)`, or `6 / (2 * 3)` and `6 / 2 / 3`;
//! - removing a double negation, such as `-(-3)` and `3`.
//!
//! The normal form ([`Canonical`]) flattens chains of additions and subtractions into a single
//! sum with positive and negative terms, and chains of multiplications and divisions into a
//! single product with a numerator and a denominator. Terms and factors are then sorted by their
//! own normal form. Subtracting a sum flips the sign of each of its terms, and dividing by a
//! product moves each of its factors to the other side of the fraction bar.
//!
//! The normal form is built bottom-up from the normal forms of subexpressions, so the normal form
//! of an expression only depends on the normal forms of its parts. The search engine relies on
//! this to deduplicate partial results.
//!
//! Equivalence here is purely structural; the value of an expression is never consulted. `2 + 2`
//! and `2 * 2` have the same value, but are different solutions.

use crate::{
    expr::{BinOp, Expr, UnaryOp},
    score::{score_with, ScoreWeights},
};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// The structure of a [`Canonical`] expression.
#[derive(Debug)]
pub enum Node {
    /// A single die.
    Die(u8),

    /// A sum of at least two terms: `positive[0] + positive[1] + ... - negative[0] - ...`.
    ///
    /// No term is itself a sum.
    Sum {
        positive: Vec<Canonical>,
        negative: Vec<Canonical>,
    },

    /// A product of at least two factors: `numerator[0] * ... / denominator[0] / ...`.
    ///
    /// No factor is itself a product.
    Product {
        numerator: Vec<Canonical>,
        denominator: Vec<Canonical>,
    },

    /// A unary operator applied to an expression. The operand of a negation is never another
    /// negation.
    Unary(UnaryOp, Canonical),
}

#[derive(Debug)]
struct Inner {
    node: Node,
    text: String,
}

/// An expression in normal form.
///
/// Cloning is cheap; the tree is shared. Equality, ordering and hashing all use the canonical
/// text, which is a valid infix expression with the same value as the original.
#[derive(Debug, Clone)]
pub struct Canonical(Arc<Inner>);

impl Canonical {
    fn new(node: Node) -> Self {
        let text = render(&node);
        Self(Arc::new(Inner { node, text }))
    }

    /// The normal form of a single die.
    pub fn die(value: u8) -> Self {
        Self::new(Node::Die(value))
    }

    /// The normal form of a unary operator applied to an expression in normal form.
    pub fn unary(op: UnaryOp, operand: &Canonical) -> Self {
        match (op, operand.node()) {
            (UnaryOp::Neg, Node::Unary(UnaryOp::Neg, inner)) => inner.clone(),
            _ => Self::new(Node::Unary(op, operand.clone())),
        }
    }

    /// The normal form of a binary operator applied to two expressions in normal form.
    pub fn binary(op: BinOp, lhs: &Canonical, rhs: &Canonical) -> Self {
        let (mut first, mut second) = (Vec::new(), Vec::new());
        match op {
            BinOp::Add | BinOp::Sub => {
                lhs.push_terms(false, &mut first, &mut second);
                rhs.push_terms(op == BinOp::Sub, &mut first, &mut second);
                first.sort();
                second.sort();
                Self::new(Node::Sum { positive: first, negative: second })
            },
            BinOp::Mul | BinOp::Div => {
                lhs.push_factors(false, &mut first, &mut second);
                rhs.push_factors(op == BinOp::Div, &mut first, &mut second);
                first.sort();
                second.sort();
                Self::new(Node::Product { numerator: first, denominator: second })
            },
        }
    }

    /// Adds the terms of this expression to the given lists, swapping the lists if `flip` is
    /// true.
    fn push_terms(&self, flip: bool, positive: &mut Vec<Canonical>, negative: &mut Vec<Canonical>) {
        let (positive, negative) = if flip { (negative, positive) } else { (positive, negative) };
        match self.node() {
            Node::Sum { positive: p, negative: n } => {
                positive.extend(p.iter().cloned());
                negative.extend(n.iter().cloned());
            },
            _ => positive.push(self.clone()),
        }
    }

    /// Adds the factors of this expression to the given lists, swapping the lists if `flip` is
    /// true.
    fn push_factors(&self, flip: bool, numerator: &mut Vec<Canonical>, denominator: &mut Vec<Canonical>) {
        let (numerator, denominator) = if flip { (denominator, numerator) } else { (numerator, denominator) };
        match self.node() {
            Node::Product { numerator: n, denominator: d } => {
                numerator.extend(n.iter().cloned());
                denominator.extend(d.iter().cloned());
            },
            _ => numerator.push(self.clone()),
        }
    }

    /// The structure of the expression.
    pub fn node(&self) -> &Node {
        &self.0.node
    }

    /// The canonical text.
    pub fn text(&self) -> &str {
        &self.0.text
    }

    /// The canonical text, as an owned key.
    pub fn form(&self) -> CanonicalForm {
        CanonicalForm(self.0.text.clone())
    }
}

impl PartialEq for Canonical {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.text() == other.text()
    }
}

impl Eq for Canonical {}

impl PartialOrd for Canonical {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Canonical {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text().cmp(other.text())
    }
}

impl Hash for Canonical {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text().hash(state);
    }
}

impl fmt::Display for Canonical {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Renders a term of a sum. Terms are never sums themselves, and everything else binds tighter
/// than `+` and `-`.
fn term(c: &Canonical) -> &str {
    c.text()
}

/// Renders a factor of a product, parenthesizing sums.
fn factor(c: &Canonical) -> String {
    match c.node() {
        Node::Sum { .. } => format!("({})", c.text()),
        _ => c.text().to_owned(),
    }
}

/// Renders the text of a node.
///
/// Sums and products built by [`Canonical::binary`] always have at least one positive term or
/// numerator factor. The other cases are still rendered with the right value, as a leading
/// negation or a numerator of `1`.
fn render(node: &Node) -> String {
    match node {
        Node::Die(value) => value.to_string(),
        Node::Sum { positive, negative } => {
            let mut text = match positive.split_first() {
                Some((first, rest)) => rest.iter().fold(term(first).to_owned(), |mut text, c| {
                    text.push_str(" + ");
                    text.push_str(term(c));
                    text
                }),
                None => String::new(),
            };
            for (i, c) in negative.iter().enumerate() {
                if text.is_empty() && i == 0 {
                    text.push_str(&format!("-({})", c.text()));
                } else {
                    text.push_str(" - ");
                    text.push_str(term(c));
                }
            }
            text
        },
        Node::Product { numerator, denominator } => {
            let mut text = numerator.iter()
                .map(factor)
                .collect::<Vec<_>>()
                .join(" * ");
            if text.is_empty() {
                text.push('1');
            }
            for c in denominator {
                text.push_str(" / ");
                text.push_str(&factor(c));
            }
            text
        },
        Node::Unary(UnaryOp::Neg, operand) => match operand.node() {
            Node::Sum { .. } | Node::Product { .. } => format!("-({})", operand.text()),
            _ => format!("-{}", operand.text()),
        },
        Node::Unary(UnaryOp::Factorial, operand) => match operand.node() {
            Node::Die(_) | Node::Unary(UnaryOp::Factorial | UnaryOp::Sqrt, _) => format!("{}!", operand.text()),
            _ => format!("({})!", operand.text()),
        },
        Node::Unary(UnaryOp::Sqrt, operand) => format!("sqrt({})", operand.text()),
    }
}

/// The canonical text of an expression: the key identifying its equivalence class.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalForm(String);

impl CanonicalForm {
    /// The canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalForm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Canonical> for CanonicalForm {
    fn from(c: &Canonical) -> Self {
        c.form()
    }
}

/// Returns the normal form of the expression.
pub fn canonicalize(expr: &Expr) -> Canonical {
    match expr {
        Expr::Die(value) => Canonical::die(*value),
        Expr::Unary(op, operand) => Canonical::unary(*op, &canonicalize(operand)),
        Expr::Binary(op, lhs, rhs) => Canonical::binary(*op, &canonicalize(lhs), &canonicalize(rhs)),
    }
}

/// Returns the canonical text of the expression.
pub fn normalize(expr: &Expr) -> CanonicalForm {
    canonicalize(expr).form()
}

/// A group of equivalent expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct EquivalenceClass {
    /// The canonical text shared by every member.
    pub canonical: CanonicalForm,

    /// The member with the lowest score. Ties go to the member with the lowest infix text.
    pub best: Expr,

    /// The score of [`EquivalenceClass::best`].
    pub score: u32,

    /// The distinct infix texts of the members, sorted, excluding the canonical text itself.
    pub alternatives: Vec<String>,
}

struct Group {
    best: Expr,
    best_text: String,
    score: u32,
    members: BTreeSet<String>,
}

/// Partitions the expressions into equivalence classes.
///
/// The classes are sorted by score, then by canonical text. The result does not depend on the
/// order of the input.
pub fn group_by_equivalence<I>(exprs: I, weights: &ScoreWeights) -> Vec<EquivalenceClass>
where
    I: IntoIterator<Item = Expr>,
{
    let mut groups = BTreeMap::<CanonicalForm, Group>::new();

    for expr in exprs {
        let form = normalize(&expr);
        let score = score_with(&expr, weights);
        let text = expr.to_string();

        match groups.entry(form) {
            Entry::Vacant(entry) => {
                entry.insert(Group {
                    best: expr,
                    best_text: text.clone(),
                    score,
                    members: BTreeSet::from([text]),
                });
            },
            Entry::Occupied(mut entry) => {
                let group = entry.get_mut();
                if (score, text.as_str()) < (group.score, group.best_text.as_str()) {
                    group.best = expr;
                    group.best_text = text.clone();
                    group.score = score;
                }
                group.members.insert(text);
            },
        }
    }

    let mut classes = groups.into_iter()
        .map(|(canonical, group)| {
            let alternatives = group.members
                .into_iter()
                .filter(|member| member != canonical.as_str())
                .collect();
            EquivalenceClass {
                canonical,
                best: group.best,
                score: group.score,
                alternatives,
            }
        })
        .collect::<Vec<_>>();
    classes.sort_by(|a, b| (a.score, &a.canonical).cmp(&(b.score, &b.canonical)));
    classes
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use super::*;
    use crate::expr::{parse_to_tree, UnarySet};

    fn parse(text: &str) -> Expr {
        parse_to_tree(text, &UnarySet::all()).unwrap().expr
    }

    fn form(text: &str) -> String {
        normalize(&parse(text)).as_str().to_owned()
    }

    #[test]
    fn commutative_reordering() {
        assert_eq!(form("1 + 2"), form("2 + 1"));
        assert_eq!(form("3 * 5 * 2"), form("2 * (5 * 3)"));
        assert_eq!(form("(1 + 2) * 3"), form("3 * (2 + 1)"));
    }

    #[test]
    fn reassociation() {
        assert_eq!(form("(1 + 2) + 3"), form("1 + (2 + 3)"));
        assert_eq!(form("6 / (2 * 3)"), form("6 / 2 / 3"));
        assert_eq!(form("5 - (4 - 3)"), form("5 - 4 + 3"));
        assert_eq!(form("6 / (4 / 2)"), form("6 * 2 / 4"));
    }

    #[test]
    fn non_commutative_stay_distinct() {
        assert_ne!(form("3 - 2"), form("2 - 3"));
        assert_ne!(form("6 / 3"), form("3 / 6"));
        assert_ne!(form("2 + 2"), form("2 * 2"));
        assert_ne!(form("1 - 2 + 3"), form("1 + 2 - 3"));
    }

    #[test]
    fn double_negation() {
        assert_eq!(form("-(-3)"), "3");
        assert_eq!(form("1 + -(-(2 * 3))"), form("2 * 3 + 1"));
        assert_ne!(form("-3"), form("3"));
    }

    #[test]
    fn canonical_text() {
        assert_eq!(form("5 + 4 * 3 - 2 - 1"), "3 * 4 + 5 - 1 - 2");
        assert_eq!(form("(2 + 1) * 3 / 6"), "(1 + 2) * 3 / 6");
        assert_eq!(form("6 / -(2 + 3)"), "6 / -(2 + 3)");
        assert_eq!(form("(3 - 1)! + sqrt(4 * 1)"), "(3 - 1)! + sqrt(1 * 4)");
        assert_eq!(form("-(3!)"), "-3!");
        assert_eq!(form("(-3)!"), "(-3)!");
    }

    #[test]
    fn groups_equivalent_expressions() {
        let exprs = ["1 + 2 + 3 + 4 + 5", "5 + 4 + 3 + 2 + 1", "(1 + 2) + (3 + 4) + 5", "1 * 2 * 3 + 4 + 5"]
            .into_iter()
            .map(parse)
            .collect::<Vec<_>>();
        let classes = group_by_equivalence(exprs, &ScoreWeights::default());

        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].canonical.as_str(), "1 * 2 * 3 + 4 + 5");
        assert_eq!(classes[0].alternatives, Vec::<String>::new());

        assert_eq!(classes[1].canonical.as_str(), "1 + 2 + 3 + 4 + 5");
        assert_eq!(classes[1].score, 4);
        assert_eq!(classes[1].best.to_string(), "1 + 2 + 3 + 4 + 5");
        assert_eq!(classes[1].alternatives, vec!["5 + 4 + 3 + 2 + 1".to_owned()]);
    }

    #[test]
    fn best_member_has_lowest_score() {
        let exprs = ["-(-6) * 2 - 1", "6 * 2 - 1"].into_iter().map(parse);
        let classes = group_by_equivalence(exprs, &ScoreWeights::default());

        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].best.to_string(), "6 * 2 - 1");
        assert_eq!(classes[0].score, 2);
        assert_eq!(classes[0].canonical.as_str(), "2 * 6 - 1");
        assert_eq!(classes[0].alternatives, vec!["-(-6) * 2 - 1".to_owned(), "6 * 2 - 1".to_owned()]);
    }

    fn expr_strategy() -> impl Strategy<Value = Expr> {
        let leaf = (1u8..=6).prop_map(Expr::Die);
        leaf.prop_recursive(4, 16, 2, |inner| {
            prop_oneof![
                3 => (prop::sample::select(BinOp::ALL.to_vec()), inner.clone(), inner.clone())
                    .prop_map(|(op, lhs, rhs)| Expr::binary(op, lhs, rhs)),
                1 => (prop::sample::select(UnaryOp::ALL.to_vec()), inner)
                    .prop_map(|(op, operand)| Expr::unary(op, operand)),
            ]
        })
    }

    /// Rewrites the expression with commutative and associative rewrites chosen by `choices`,
    /// consuming one choice per rewrite site.
    fn shuffle(expr: &Expr, choices: &mut impl Iterator<Item = bool>) -> Expr {
        match expr {
            Expr::Die(_) => expr.clone(),
            Expr::Unary(op, operand) => Expr::unary(*op, shuffle(operand, choices)),
            Expr::Binary(op, lhs, rhs) => {
                let (lhs, rhs) = (shuffle(lhs, choices), shuffle(rhs, choices));
                let swap = choices.next().unwrap_or(false);
                let rotate = choices.next().unwrap_or(false);
                match (op, rhs) {
                    // a op (b op c) -> (a op b) op c
                    (BinOp::Add | BinOp::Mul, Expr::Binary(inner, b, c)) if rotate && inner == *op => {
                        Expr::binary(*op, Expr::binary(*op, lhs, *b), *c)
                    },
                    (BinOp::Add | BinOp::Mul, rhs) if swap => Expr::binary(*op, rhs, lhs),
                    (_, rhs) => Expr::binary(*op, lhs, rhs),
                }
            },
        }
    }

    proptest! {
        #[test]
        fn invariant_under_commutative_rewrites(
            expr in expr_strategy(),
            choices in prop::collection::vec(any::<bool>(), 64),
        ) {
            let shuffled = shuffle(&expr, &mut choices.into_iter());
            prop_assert_eq!(normalize(&shuffled), normalize(&expr));
        }

        #[test]
        fn canonical_text_is_equivalent(expr in expr_strategy()) {
            let canonical = normalize(&expr);
            let reparsed = parse(canonical.as_str());
            prop_assert_eq!(normalize(&reparsed), canonical);
            if let Ok(value) = expr.eval() {
                prop_assert_eq!(reparsed.eval(), Ok(value));
            }
            prop_assert_eq!(reparsed.dice().len(), expr.dice().len());
        }
    }
}
