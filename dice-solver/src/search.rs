//! Exhaustive search for the solutions of a dice configuration.
//!
//! Enumerating every expression tree over five dice directly is hopeless once unary operators
//! are involved, so the search is a dynamic program over sub-multisets of the white dice:
//!
//! 1. For every sub-multiset with one to four dice, build a table of every expression over
//! exactly those dice, combining the tables of each way to split the sub-multiset in two, then
//! closing the table under the allowed unary operators. Candidates that fail to evaluate are
//! dropped immediately.
//! 2. Each table keeps one expression per canonical form (see [`crate::canonical`]). Since the
//! canonical form of an expression only depends on the canonical forms of its parts, this loses
//! no solution. When two equivalent expressions are found, the one with fewer unary operators
//! is kept, so the unary budget is spent as late as possible.
//! 3. For all five dice, every split is combined again, but only results whose value can still
//! reach the target with the remaining unary budget are kept. The set of such values is computed
//! backwards from the target before the search starts.
//!
//! Sub-multisets are keyed by how many times each face appears, so dice showing the same value
//! are never permuted against each other.

use crate::{
    canonical::{group_by_equivalence, Canonical},
    database::SolutionSet,
    dice::DiceConfig,
    expr::{BinOp, Expr, UnaryOp, UnarySet},
    primitive::{factorial_preimages, rational},
    score::ScoreWeights,
};
use rug::Rational;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{instrument, trace};

/// Options that control how far a search goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchOptions {
    /// The maximum number of unary operators in one solution.
    pub unary_budget: u32,

    /// The unary operators that may be used.
    pub unary_ops: UnarySet,
}

impl Default for SearchOptions {
    /// Searches without unary operators; every unary operator is allowed once the budget is
    /// raised.
    fn default() -> Self {
        Self {
            unary_budget: 0,
            unary_ops: UnarySet::all(),
        }
    }
}

impl SearchOptions {
    /// Wraps the given [`SearchOptions`] into a builder for further customization.
    pub fn into_builder(self) -> SearchOptionsBuilder {
        SearchOptionsBuilder(self)
    }
}

/// Helper struct to build a [`SearchOptions`] struct.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SearchOptionsBuilder(SearchOptions);

impl SearchOptionsBuilder {
    /// Creates a new builder with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of unary operators in one solution.
    pub fn unary_budget(mut self, unary_budget: u32) -> Self {
        self.0.unary_budget = unary_budget;
        self
    }

    /// Sets the unary operators that may be used.
    pub fn unary_ops(mut self, unary_ops: UnarySet) -> Self {
        self.0.unary_ops = unary_ops;
        self
    }

    /// Builds the [`SearchOptions`] struct.
    pub fn build(self) -> SearchOptions {
        self.0
    }
}

/// How many times each face appears in a sub-multiset of dice. Index `0` counts the ones.
type Counts = [u8; 6];

/// Index of a node in the arena.
type NodeId = usize;

#[derive(Debug, Clone, Copy)]
enum Kind {
    Die(u8),
    Unary(UnaryOp, NodeId),
    Binary(BinOp, NodeId, NodeId),
}

/// A partial expression, with the subexpressions referenced by index.
#[derive(Debug)]
struct Node {
    kind: Kind,
    value: Rational,
    canonical: Canonical,
    unary_count: u32,
}

/// The expressions over one sub-multiset of dice, one per canonical form.
#[derive(Debug, Default)]
struct Table {
    ids: Vec<NodeId>,
    slots: HashMap<Canonical, usize>,
}

/// Returns the number of dice in the sub-multiset.
fn size(counts: &Counts) -> u8 {
    counts.iter().sum()
}

/// Returns every sub-multiset of the given multiset, including the empty one and itself.
fn sub_multisets(counts: &Counts) -> Vec<Counts> {
    let mut subs = vec![[0; 6]];
    for face in 0..6 {
        subs = subs.into_iter()
            .flat_map(|sub| (0..=counts[face]).map(move |n| {
                let mut sub = sub;
                sub[face] = n;
                sub
            }))
            .collect();
    }
    subs
}

/// Returns every way to split the multiset into two non-empty parts, each unordered pair once.
fn splits(counts: &Counts) -> Vec<(Counts, Counts)> {
    sub_multisets(counts)
        .into_iter()
        .filter_map(|a| {
            let mut b = *counts;
            for face in 0..6 {
                b[face] -= a[face];
            }
            (size(&a) > 0 && size(&b) > 0 && a <= b).then_some((a, b))
        })
        .collect()
}

/// Returns the values `v` such that applying `op` to `v` gives `w`.
fn preimages(op: UnaryOp, w: &Rational) -> Vec<Rational> {
    match op {
        UnaryOp::Neg => vec![rational(-w)],
        UnaryOp::Sqrt if w.cmp0().is_ge() => vec![rational(w * w)],
        UnaryOp::Sqrt => Vec::new(),
        UnaryOp::Factorial => factorial_preimages(w).into_iter().map(rational).collect(),
    }
}

/// Returns, for every value that can be turned into `target` by applying at most
/// `options.unary_budget` unary operators, the fewest operators needed.
fn reachability(target: &Rational, options: &SearchOptions) -> HashMap<Rational, u32> {
    let mut depth = HashMap::from([(target.clone(), 0)]);
    let mut frontier = vec![target.clone()];

    for d in 1..=options.unary_budget {
        let mut next = Vec::new();
        for w in &frontier {
            for op in options.unary_ops.iter() {
                for v in preimages(op, w) {
                    if !depth.contains_key(&v) {
                        depth.insert(v.clone(), d);
                        next.push(v);
                    }
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    depth
}

/// The state of one search.
struct Search<'a> {
    options: &'a SearchOptions,
    nodes: Vec<Node>,
    tables: HashMap<Counts, Table>,
}

impl<'a> Search<'a> {
    fn new(options: &'a SearchOptions) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            tables: HashMap::new(),
        }
    }

    /// Adds the node to the table, unless the table already holds an equivalent node with at
    /// most as many unary operators. Returns the ID of the node if it was added.
    fn offer(&mut self, table: &mut Table, node: Node) -> Option<NodeId> {
        match table.slots.get(&node.canonical) {
            Some(&slot) if self.nodes[table.ids[slot]].unary_count <= node.unary_count => None,
            Some(&slot) => {
                let id = self.nodes.len();
                self.nodes.push(node);
                table.ids[slot] = id;
                Some(id)
            },
            None => {
                let id = self.nodes.len();
                table.slots.insert(node.canonical.clone(), table.ids.len());
                table.ids.push(id);
                self.nodes.push(node);
                Some(id)
            },
        }
    }

    /// Builds the node `lhs op rhs`, if it evaluates.
    fn binary_node(&self, op: BinOp, lhs: NodeId, rhs: NodeId) -> Option<Node> {
        let (l, r) = (&self.nodes[lhs], &self.nodes[rhs]);
        let value = op.apply(&l.value, &r.value).ok()?;
        Some(Node {
            kind: Kind::Binary(op, lhs, rhs),
            value,
            canonical: Canonical::binary(op, &l.canonical, &r.canonical),
            unary_count: l.unary_count + r.unary_count,
        })
    }

    /// Calls `f` with every pair of nodes from the tables of `a` and `b`, and every binary
    /// operator, whose combined unary count fits in the budget.
    fn for_each_pair(&self, a: &Counts, b: &Counts, mut f: impl FnMut(&Self, BinOp, NodeId, NodeId)) {
        let (Some(left), Some(right)) = (self.tables.get(a), self.tables.get(b)) else {
            return;
        };

        for &l in &left.ids {
            for &r in &right.ids {
                if self.nodes[l].unary_count + self.nodes[r].unary_count > self.options.unary_budget {
                    continue;
                }
                for op in BinOp::ALL {
                    f(self, op, l, r);

                    // when both sides come from the same table, the reversed pair is visited by
                    // the loops anyway
                    if a != b && !op.is_commutative() {
                        f(self, op, r, l);
                    }
                }
            }
        }
    }

    /// Builds the table of every expression over exactly the dice in `counts`. The tables of
    /// every smaller sub-multiset must already exist.
    fn build_table(&mut self, counts: &Counts) {
        let mut table = Table::default();

        if size(counts) == 1 {
            if let Some(face) = counts.iter().position(|&n| n == 1) {
                let value = face as u8 + 1;
                self.offer(&mut table, Node {
                    kind: Kind::Die(value),
                    value: rational(value),
                    canonical: Canonical::die(value),
                    unary_count: 0,
                });
            }
        } else {
            for (a, b) in splits(counts) {
                let mut candidates = Vec::new();
                self.for_each_pair(&a, &b, |search, op, l, r| {
                    candidates.extend(search.binary_node(op, l, r));
                });
                for node in candidates {
                    self.offer(&mut table, node);
                }
            }
        }

        self.close_under_unary(&mut table);
        trace!(?counts, entries = table.ids.len(), "built table");
        self.tables.insert(*counts, table);
    }

    /// Adds every unary operator application that fits in the budget to the table, repeatedly.
    fn close_under_unary(&mut self, table: &mut Table) {
        let mut worklist = table.ids.clone();

        while let Some(id) = worklist.pop() {
            if self.nodes[id].unary_count >= self.options.unary_budget {
                continue;
            }

            for op in self.options.unary_ops.iter() {
                let node = &self.nodes[id];
                let Ok(value) = op.apply(&node.value) else {
                    continue;
                };
                let node = Node {
                    kind: Kind::Unary(op, id),
                    value,
                    canonical: Canonical::unary(op, &node.canonical),
                    unary_count: node.unary_count + 1,
                };
                if let Some(new_id) = self.offer(table, node) {
                    worklist.push(new_id);
                }
            }
        }
    }

    /// Rebuilds the expression tree of a node.
    fn expr(&self, id: NodeId) -> Expr {
        match self.nodes[id].kind {
            Kind::Die(value) => Expr::Die(value),
            Kind::Unary(op, operand) => Expr::unary(op, self.expr(operand)),
            Kind::Binary(op, lhs, rhs) => Expr::binary(op, self.expr(lhs), self.expr(rhs)),
        }
    }

    /// Records `expr` if it hits the target, then tries to reach the target by applying further
    /// unary operators on top of it.
    fn finish(&self, expr: Expr, value: Rational, remaining: u32, goal: &Goal, found: &mut BTreeMap<String, Expr>) {
        if value == goal.target {
            found.entry(expr.to_string()).or_insert_with(|| expr.clone());
        }
        if remaining == 0 {
            return;
        }

        for op in self.options.unary_ops.iter() {
            // a double negation is always equivalent to the expression without it
            if op == UnaryOp::Neg && matches!(expr, Expr::Unary(UnaryOp::Neg, _)) {
                continue;
            }
            let Ok(next) = op.apply(&value) else {
                continue;
            };
            if goal.reaches(&next, remaining - 1) {
                self.finish(Expr::unary(op, expr.clone()), next, remaining - 1, goal, found);
            }
        }
    }
}

/// The target of a search, with the values from which it can still be reached.
struct Goal {
    target: Rational,
    reachable: HashMap<Rational, u32>,
}

impl Goal {
    /// Returns true if `value` can be turned into the target with at most `budget` unary
    /// operators.
    fn reaches(&self, value: &Rational, budget: u32) -> bool {
        self.reachable.get(value).is_some_and(|&depth| depth <= budget)
    }
}

/// Finds every solution of the configuration that uses at most `options.unary_budget` unary
/// operators from `options.unary_ops`.
///
/// The result holds at least one expression of every equivalence class of solutions within the
/// budget. Expressions with the same infix text are only returned once, and the result is
/// sorted by infix text, so it does not depend on anything but the arguments.
#[instrument(level = "debug", skip(options), fields(budget = options.unary_budget))]
pub fn search(config: &DiceConfig, options: &SearchOptions) -> Vec<Expr> {
    let full = config.face_counts();
    let goal = Goal {
        target: rational(config.black()),
        reachable: reachability(&rational(config.black()), options),
    };

    let mut search = Search::new(options);
    let mut subs = sub_multisets(&full);
    subs.retain(|sub| (1..size(&full)).contains(&size(sub)));
    subs.sort_by_key(size);
    for sub in &subs {
        search.build_table(sub);
    }

    let mut found = BTreeMap::new();
    for (a, b) in splits(&full) {
        search.for_each_pair(&a, &b, |search, op, l, r| {
            let (lhs, rhs) = (&search.nodes[l], &search.nodes[r]);
            let Ok(value) = op.apply(&lhs.value, &rhs.value) else {
                return;
            };
            let remaining = options.unary_budget - lhs.unary_count - rhs.unary_count;
            if goal.reaches(&value, remaining) {
                let expr = Expr::binary(op, search.expr(l), search.expr(r));
                search.finish(expr, value, remaining, &goal, &mut found);
            }
        });
    }

    trace!(nodes = search.nodes.len(), solutions = found.len(), "search complete");
    found.into_values().collect()
}

/// Searches the configuration, then groups and scores the solutions.
pub fn solve(config: &DiceConfig, options: &SearchOptions, weights: &ScoreWeights) -> SolutionSet {
    let classes = group_by_equivalence(search(config, options), weights);
    SolutionSet::from_classes(options.unary_budget, classes)
}
