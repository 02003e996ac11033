use crate::canonical::{CanonicalForm, EquivalenceClass};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One equivalence class of solutions, as it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionEntry {
    /// The canonical text of the class. It is itself a solution.
    pub representative: CanonicalForm,

    /// The score of the best member of the class.
    pub score: u32,

    /// Other ways the solution was written during the search, sorted.
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl From<EquivalenceClass> for SolutionEntry {
    fn from(class: EquivalenceClass) -> Self {
        Self {
            representative: class.canonical,
            score: class.score,
            alternatives: class.alternatives,
        }
    }
}

/// The known solutions of one dice configuration.
///
/// Entries are sorted by score, then by representative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionSet {
    /// The largest unary budget this configuration has been searched with, or [`None`] if it
    /// has never been searched.
    ///
    /// An empty set with a budget is unsolvable within that budget; an empty set without one is
    /// simply unknown.
    pub budget: Option<u32>,

    /// The solutions.
    pub entries: Vec<SolutionEntry>,
}

impl SolutionSet {
    /// Creates the solution set found by a search with the given budget.
    pub fn from_classes(budget: u32, classes: Vec<EquivalenceClass>) -> Self {
        let mut set = Self {
            budget: Some(budget),
            entries: classes.into_iter().map(SolutionEntry::from).collect(),
        };
        set.sort();
        set
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| {
            (a.score, &a.representative).cmp(&(b.score, &b.representative))
        });
    }

    /// Returns true if no solution is known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the lowest score of any solution, if there is one.
    pub fn min_score(&self) -> Option<u32> {
        self.entries.first().map(|entry| entry.score)
    }

    /// Returns the solutions with the lowest score.
    pub fn optimal(&self) -> &[SolutionEntry] {
        let count = match self.min_score() {
            Some(min) => self.entries.iter().take_while(|entry| entry.score == min).count(),
            None => 0,
        };
        &self.entries[..count]
    }

    /// Returns the entry with the given representative.
    pub fn get(&self, representative: &CanonicalForm) -> Option<&SolutionEntry> {
        self.entries.iter().find(|entry| &entry.representative == representative)
    }

    /// Combines two solution sets of the same configuration.
    ///
    /// Entries with the same representative are combined into one, keeping the lower score and
    /// every alternative. The budget is the larger of the two.
    pub fn merge(self, other: SolutionSet) -> SolutionSet {
        let mut union = BTreeMap::<CanonicalForm, (u32, BTreeSet<String>)>::new();

        for entry in self.entries.into_iter().chain(other.entries) {
            let (score, alternatives) = union
                .entry(entry.representative)
                .or_insert((entry.score, BTreeSet::new()));
            *score = (*score).min(entry.score);
            alternatives.extend(entry.alternatives);
        }

        let mut set = SolutionSet {
            budget: self.budget.max(other.budget),
            entries: union.into_iter()
                .map(|(representative, (score, alternatives))| SolutionEntry {
                    representative,
                    score,
                    alternatives: alternatives.into_iter().collect(),
                })
                .collect(),
        };
        set.sort();
        set
    }
}
