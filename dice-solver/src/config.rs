//! Settings for the solver, read from a JSON file and the environment.
//!
//! Every setting has a default, so an empty file (or no file at all) is a valid configuration.
//! After the file is read, these environment variables override it:
//!
//! - `DICE_DB_DIR`: the directory holding the solution databases
//! - `DICE_DB_NAME`: the name of the database to use
//! - `DICE_UNARY_BUDGET`: the unary budget of generation runs and live searches
//! - `DICE_THREADS`: the number of worker threads of generation runs (`0` for one per core)

use crate::{
    database::{FileStore, GenerateRequest, Scope, SolutionDatabase},
    expr::UnarySet,
    score::ScoreWeights,
    search::{SearchOptions, SearchOptionsBuilder},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

/// The configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{path}` is not a valid configuration: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("the `{0}` weight is 0, but every weight must be at least 1")]
    ZeroWeight(&'static str),

    #[error("invalid value `{value}` for `{var}`: expected {expected}")]
    InvalidOverride {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Settings for the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// The directory holding the solution databases.
    pub database_dir: PathBuf,

    /// The name of the database to use.
    pub database_name: String,

    /// The unary budget of generation runs and live searches.
    pub unary_budget: u32,

    /// The permitted unary operators.
    pub unary_ops: UnarySet,

    /// The number of worker threads of generation runs, or [`None`] for one per core.
    pub threads: Option<usize>,

    /// The weights used to score solutions.
    pub weights: ScoreWeights,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            database_dir: PathBuf::from("./solutions"),
            database_name: "default".to_owned(),
            unary_budget: 1,
            unary_ops: UnarySet::all(),
            threads: None,
            weights: ScoreWeights::default(),
        }
    }
}

impl SolverConfig {
    /// Reads the configuration from a JSON file, without applying the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|source| ConfigError::Json { path: path.to_owned(), source })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings that the file format cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.weights.zero_weight() {
            Some(name) => Err(ConfigError::ZeroWeight(name)),
            None => Ok(()),
        }
    }

    /// Loads the configuration: from the file if one is given, otherwise the defaults, then
    /// overridden by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        debug!(?config, "loaded configuration");
        Ok(config)
    }

    /// Overrides settings with the values `lookup` returns for the environment variables.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(dir) = lookup("DICE_DB_DIR") {
            self.database_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("DICE_DB_NAME") {
            self.database_name = name;
        }
        if let Some(value) = lookup("DICE_UNARY_BUDGET") {
            self.unary_budget = value.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                var: "DICE_UNARY_BUDGET",
                value,
                expected: "a non-negative integer",
            })?;
        }
        if let Some(value) = lookup("DICE_THREADS") {
            let threads: usize = value.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                var: "DICE_THREADS",
                value,
                expected: "a non-negative integer",
            })?;
            self.threads = (threads > 0).then_some(threads);
        }
        Ok(())
    }

    /// The search options these settings describe.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptionsBuilder::new()
            .unary_budget(self.unary_budget)
            .unary_ops(self.unary_ops)
            .build()
    }

    /// Opens the configured solution database.
    pub fn database(&self) -> SolutionDatabase<FileStore> {
        SolutionDatabase::new(FileStore::new(&self.database_dir), self.database_name.clone())
    }

    /// A generation request over the given scope with these settings.
    pub fn generate_request(&self, scope: Scope) -> GenerateRequest {
        GenerateRequest {
            scope,
            options: self.search_options(),
            weights: self.weights,
            threads: self.threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::expr::UnaryOp;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config: SolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SolverConfig::default());
        assert_eq!(config.database_dir, PathBuf::from("./solutions"));
        assert_eq!(config.unary_budget, 1);
        assert_eq!(config.search_options().unary_ops, UnarySet::all());
    }

    #[test]
    fn partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dice.json");
        fs::write(&path, r#"{ "unary_budget": 2, "unary_ops": ["neg"], "weights": { "neg": 5 } }"#).unwrap();

        let config = SolverConfig::from_file(&path).unwrap();
        assert_eq!(config.unary_budget, 2);
        assert_eq!(config.unary_ops, UnarySet::empty().with(UnaryOp::Neg));
        assert_eq!(config.weights.neg, 5);
        assert_eq!(config.weights.binary, 1);
        assert_eq!(config.database_name, "default");
    }

    #[test]
    fn bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(SolverConfig::from_file(&missing), Err(ConfigError::Io { .. })));

        let path = dir.path().join("dice.json");
        fs::write(&path, r#"{ "unary_ops": ["cube"] }"#).unwrap();
        assert!(matches!(SolverConfig::from_file(&path), Err(ConfigError::Json { .. })));
    }

    #[test]
    fn zero_weight() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dice.json");
        fs::write(&path, r#"{ "weights": { "neg": 0 } }"#).unwrap();

        let err = SolverConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroWeight("neg")));
        assert!(matches!(SolverConfig::load(Some(&path)), Err(ConfigError::ZeroWeight("neg"))));
    }

    #[test]
    fn overrides() {
        let env = HashMap::from([
            ("DICE_DB_DIR", "/tmp/dice"),
            ("DICE_DB_NAME", "house"),
            ("DICE_UNARY_BUDGET", "3"),
            ("DICE_THREADS", "4"),
        ]);
        let mut config = SolverConfig::default();
        config.apply_overrides(|var| env.get(var).map(|value| value.to_string())).unwrap();

        assert_eq!(config.database_dir, PathBuf::from("/tmp/dice"));
        assert_eq!(config.database_name, "house");
        assert_eq!(config.unary_budget, 3);
        assert_eq!(config.threads, Some(4));
        assert_eq!(config.database().name(), "house");
    }

    #[test]
    fn zero_threads_means_default() {
        let mut config = SolverConfig { threads: Some(2), ..SolverConfig::default() };
        config.apply_overrides(|var| (var == "DICE_THREADS").then(|| "0".to_owned())).unwrap();
        assert_eq!(config.threads, None);
    }

    #[test]
    fn invalid_override() {
        let mut config = SolverConfig::default();
        let err = config
            .apply_overrides(|var| (var == "DICE_UNARY_BUDGET").then(|| "lots".to_owned()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { var: "DICE_UNARY_BUDGET", .. }));
        assert_eq!(config.unary_budget, 1);
    }
}
