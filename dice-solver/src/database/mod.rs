//! The solution database: a persistent record of the solutions of every dice configuration.
//!
//! A [`SolutionDatabase`] is a named view into a [`Store`]. It only ever reads from the store
//! when asked for solutions; solutions are produced in bulk by [`SolutionDatabase::generate`],
//! which searches many configurations in parallel and writes each result back as soon as it is
//! found.
//!
//! Runs sharing one [`SolutionDatabase`] may overlap: the read, merge and write of a
//! configuration happen under a lock on that configuration. Separate databases opened on the
//! same store (or the same directory from another process) are not coordinated.

mod entry;
pub mod store;

pub use entry::{SolutionEntry, SolutionSet};
pub use store::{FileStore, MemoryStore, Store, StoreError};

use crate::{
    dice::DiceConfig,
    score::ScoreWeights,
    search::{solve, SearchOptions},
};
use rayon::prelude::*;
use std::{
    collections::{hash_map::DefaultHasher, BTreeSet},
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
        Mutex,
    },
    time::Instant,
};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// A flag that stops a generation run between two configurations.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the run stops. Configurations already being searched are finished.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true if the run should stop.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Which configurations a generation run searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every configuration of the game.
    All,

    /// Every configuration that has no stored solution. Configurations that were never
    /// searched count as unsolved.
    Unsolved,

    /// The given configurations.
    Only(BTreeSet<DiceConfig>),
}

/// The parameters of a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// The configurations to search.
    pub scope: Scope,

    /// How to search each configuration.
    pub options: SearchOptions,

    /// How to score the solutions.
    pub weights: ScoreWeights,

    /// The number of worker threads, or [`None`] to use rayon's global pool.
    pub threads: Option<usize>,
}

impl GenerateRequest {
    /// Creates a request with the default weights on the global thread pool.
    pub fn new(scope: Scope, options: SearchOptions) -> Self {
        Self {
            scope,
            options,
            weights: ScoreWeights::default(),
            threads: None,
        }
    }
}

/// What a generation run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// The configurations that now have at least one solution.
    pub solved: Vec<DiceConfig>,

    /// The configurations that still have no solution.
    pub unsolved: Vec<DiceConfig>,

    /// The configurations that were skipped because the run was cancelled.
    pub cancelled: Vec<DiceConfig>,
}

/// A generation run failed.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not start the worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// What happened to one configuration during a run.
enum Outcome {
    Solved,
    Unsolved,
    Skipped,
    Cancelled,
}

/// The number of locks configurations are spread over.
const LOCK_SHARDS: usize = 64;

/// A named solution database kept in a [`Store`].
#[derive(Debug)]
pub struct SolutionDatabase<S> {
    store: S,
    name: String,

    /// Held while a configuration is read, merged and written back.
    locks: Box<[Mutex<()>]>,
}

impl<S: Store> SolutionDatabase<S> {
    /// Opens the database with the given name in the store.
    pub fn new(store: S, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            locks: (0..LOCK_SHARDS).map(|_| Mutex::new(())).collect(),
        }
    }

    fn lock_for(&self, config: &DiceConfig) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        config.hash(&mut hasher);
        &self.locks[hasher.finish() as usize % self.locks.len()]
    }

    /// The name of the database.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the stored solutions of the configuration, or an empty set if it has never been
    /// searched. Never searches.
    pub fn solutions(&self, config: &DiceConfig) -> Result<SolutionSet, StoreError> {
        Ok(self.store.get(&self.name, config)?.unwrap_or_default())
    }

    /// Returns every stored configuration without a solution.
    pub fn unsolved(&self) -> Result<BTreeSet<DiceConfig>, StoreError> {
        let mut unsolved = BTreeSet::new();
        for config in self.store.keys(&self.name)? {
            if self.solutions(&config)?.is_empty() {
                unsolved.insert(config);
            }
        }
        Ok(unsolved)
    }

    /// Returns the configurations in scope, in ascending order.
    fn configs_in_scope(&self, scope: &Scope) -> Vec<DiceConfig> {
        match scope {
            Scope::All | Scope::Unsolved => DiceConfig::all(),
            Scope::Only(configs) => configs.iter().copied().collect(),
        }
    }

    /// Searches, scores and stores one configuration.
    fn generate_one(
        &self,
        config: &DiceConfig,
        request: &GenerateRequest,
        cancel: &CancelToken,
    ) -> Result<Outcome, StoreError> {
        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        let _guard = self.lock_for(config).lock().map_err(|_| StoreError::Poisoned)?;
        let prior = self.store.get(&self.name, config)?;
        if request.scope == Scope::Unsolved && prior.as_ref().is_some_and(|set| !set.is_empty()) {
            return Ok(Outcome::Skipped);
        }

        let found = solve(config, &request.options, &request.weights);
        let set = match prior {
            Some(prior) => prior.merge(found),
            None => found,
        };
        self.store.put(&self.name, config, &set)?;

        debug!(%config, classes = set.entries.len(), min_score = ?set.min_score(), "solved configuration");
        Ok(if set.is_empty() { Outcome::Unsolved } else { Outcome::Solved })
    }

    /// Searches every configuration in scope and stores the results, in parallel.
    ///
    /// A configuration that already has stored solutions keeps them: the new solutions are
    /// merged in, so raising the budget never loses a solution. With [`Scope::Unsolved`],
    /// configurations with stored solutions are not searched at all.
    ///
    /// Cancelling the token stops the run before the next configuration; configurations that
    /// were not searched are left untouched and listed in the report.
    #[instrument(level = "info", skip_all, fields(db = %self.name, budget = request.options.unary_budget))]
    pub fn generate(
        &self,
        request: &GenerateRequest,
        cancel: &CancelToken,
    ) -> Result<GenerateReport, GenerateError> {
        let configs = self.configs_in_scope(&request.scope);
        info!(configs = configs.len(), scope = ?request.scope, "starting generation run");
        let start = Instant::now();

        let run = || {
            configs.par_iter()
                .map(|config| self.generate_one(config, request, cancel).map(|outcome| (*config, outcome)))
                .collect::<Result<Vec<_>, _>>()
        };
        let outcomes = match request.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(run)?,
            None => run()?,
        };

        let mut report = GenerateReport::default();
        for (config, outcome) in outcomes {
            match outcome {
                Outcome::Solved => report.solved.push(config),
                Outcome::Unsolved => report.unsolved.push(config),
                Outcome::Skipped => {},
                Outcome::Cancelled => report.cancelled.push(config),
            }
        }

        if !report.cancelled.is_empty() {
            warn!(skipped = report.cancelled.len(), "generation run cancelled");
        }
        info!(
            solved = report.solved.len(),
            unsolved = report.unsolved.len(),
            elapsed = ?start.elapsed(),
            "generation run finished",
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::{expr::UnaryOp, search::SearchOptionsBuilder};

    fn config(key: &str) -> DiceConfig {
        key.parse().unwrap()
    }

    fn only(keys: &[&str]) -> Scope {
        Scope::Only(keys.iter().map(|key| config(key)).collect())
    }

    fn budget(unary_budget: u32) -> SearchOptions {
        SearchOptionsBuilder::new()
            .unary_budget(unary_budget)
            .unary_ops([UnaryOp::Neg, UnaryOp::Factorial].into_iter().collect())
            .build()
    }

    #[test]
    fn absent_configuration_is_empty() {
        let db = SolutionDatabase::new(MemoryStore::new(), "test");
        let set = db.solutions(&config("12345-15")).unwrap();
        assert_eq!(set, SolutionSet::default());
        assert!(db.unsolved().unwrap().is_empty());
    }

    #[test]
    fn five_ones_are_unsolved() {
        let db = SolutionDatabase::new(MemoryStore::new(), "test");
        let request = GenerateRequest::new(only(&["11111-11", "12345-15"]), budget(0));
        let report = db.generate(&request, &CancelToken::new()).unwrap();

        assert_eq!(report.solved, vec![config("12345-15")]);
        assert_eq!(report.unsolved, vec![config("11111-11")]);
        assert!(report.cancelled.is_empty());

        let unsolved = db.solutions(&config("11111-11")).unwrap();
        assert!(unsolved.is_empty());
        assert_eq!(unsolved.budget, Some(0));
        assert_eq!(db.unsolved().unwrap(), BTreeSet::from([config("11111-11")]));
        assert_eq!(db.solutions(&config("12345-15")).unwrap().min_score(), Some(4));
    }

    #[test]
    fn widening_keeps_solutions() {
        let db = SolutionDatabase::new(MemoryStore::new(), "test");
        let scope = only(&["12345-15", "12236-31"]);
        let cancel = CancelToken::new();

        db.generate(&GenerateRequest::new(scope.clone(), budget(0)), &cancel).unwrap();
        let narrow = db.solutions(&config("12345-15")).unwrap();

        db.generate(&GenerateRequest::new(scope, budget(1)), &cancel).unwrap();
        let wide = db.solutions(&config("12345-15")).unwrap();

        assert_eq!(wide.budget, Some(1));
        assert!(wide.min_score() <= narrow.min_score());
        assert!(wide.entries.len() > narrow.entries.len());
        for entry in &narrow.entries {
            let widened = wide.get(&entry.representative).unwrap();
            assert!(widened.score <= entry.score);
        }
    }

    #[test]
    fn unsolved_scope_leaves_solved_alone() {
        let db = SolutionDatabase::new(MemoryStore::new(), "test");
        let cancel = CancelToken::new();
        db.generate(&GenerateRequest::new(only(&["11111-11", "12345-15"]), budget(0)), &cancel).unwrap();
        let before = db.solutions(&config("12345-15")).unwrap();

        // one configuration at a time, since the unsolved scope covers the whole game
        let request = GenerateRequest::new(Scope::Unsolved, budget(1));
        let outcome = db.generate_one(&config("12345-15"), &request, &cancel).unwrap();
        assert!(matches!(outcome, Outcome::Skipped));
        assert_eq!(db.solutions(&config("12345-15")).unwrap(), before);

        let outcome = db.generate_one(&config("11111-11"), &request, &cancel).unwrap();
        assert!(matches!(outcome, Outcome::Unsolved));
        assert_eq!(db.solutions(&config("11111-11")).unwrap().budget, Some(1));
    }

    #[test]
    fn overlapping_runs_merge() {
        let db = SolutionDatabase::new(MemoryStore::new(), "test");
        let scope = only(&["12345-15", "12236-31"]);
        let narrow = GenerateRequest::new(scope.clone(), budget(0));
        let wide = GenerateRequest::new(scope, budget(1));

        std::thread::scope(|s| {
            for request in [&narrow, &wide, &narrow, &wide] {
                let db = &db;
                s.spawn(move || db.generate(request, &CancelToken::new()).unwrap());
            }
        });

        let weights = ScoreWeights::default();
        for key in ["12345-15", "12236-31"] {
            let config = config(key);
            let expected = solve(&config, &narrow.options, &weights).merge(solve(&config, &wide.options, &weights));
            assert_eq!(db.solutions(&config).unwrap(), expected, "{key}");
        }
    }

    #[test]
    fn cancelled_run_touches_nothing() {
        let db = SolutionDatabase::new(MemoryStore::new(), "test");
        let cancel = CancelToken::new();
        cancel.clone().cancel();

        let request = GenerateRequest::new(only(&["11111-11", "12345-15"]), budget(0));
        let report = db.generate(&request, &cancel).unwrap();

        assert_eq!(report.cancelled, vec![config("11111-11"), config("12345-15")]);
        assert!(report.solved.is_empty());
        assert!(db.store().keys("test").unwrap().is_empty());
    }

    #[test]
    fn dedicated_thread_pool() {
        let db = SolutionDatabase::new(MemoryStore::new(), "test");
        let mut request = GenerateRequest::new(only(&["12345-15", "66666-66", "11111-11"]), budget(0));
        request.threads = Some(2);

        let report = db.generate(&request, &CancelToken::new()).unwrap();
        assert_eq!(report.solved, vec![config("12345-15"), config("66666-66")]);
        assert_eq!(report.unsolved, vec![config("11111-11")]);
    }

    #[test]
    fn deterministic_files() {
        let request = GenerateRequest::new(only(&["12345-15", "12236-31"]), budget(1));
        let mut runs = Vec::new();

        for _ in 0..2 {
            let dir = tempfile::tempdir().unwrap();
            let db = SolutionDatabase::new(FileStore::new(dir.path()), "test");
            db.generate(&request, &CancelToken::new()).unwrap();

            let files = ["12345-15", "12236-31"]
                .map(|key| std::fs::read(db.store().path("test", &config(key))).unwrap());
            runs.push(files);
        }

        assert_eq!(runs[0], runs[1]);
    }
}
