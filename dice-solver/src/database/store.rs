//! Where solution sets are kept.

use crate::dice::{DiceConfig, MalformedConfig};
use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::RwLock,
};
use super::SolutionSet;
use tempfile::NamedTempFile;
use thiserror::Error;

/// A store could not be read or written.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{path}` does not hold a valid solution set: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{path}` is not named after a dice configuration: {source}")]
    CorruptKey {
        path: PathBuf,
        #[source]
        source: MalformedConfig,
    },

    #[error("the store was poisoned by a panicking writer")]
    Poisoned,
}

/// A key-value store from dice configurations to solution sets, partitioned into named
/// databases.
///
/// Writes to different configurations never conflict, so a store may be written from many
/// threads at once.
pub trait Store: Send + Sync {
    /// Returns the solution set stored for the configuration, if any.
    fn get(&self, name: &str, config: &DiceConfig) -> Result<Option<SolutionSet>, StoreError>;

    /// Replaces the solution set stored for the configuration.
    fn put(&self, name: &str, config: &DiceConfig, set: &SolutionSet) -> Result<(), StoreError>;

    /// Returns every configuration with a stored solution set, in ascending order.
    fn keys(&self, name: &str) -> Result<Vec<DiceConfig>, StoreError>;
}

/// A store that lives in memory, for tests and one-off sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sets: RwLock<BTreeMap<(String, DiceConfig), SolutionSet>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, name: &str, config: &DiceConfig) -> Result<Option<SolutionSet>, StoreError> {
        let sets = self.sets.read().map_err(|_| StoreError::Poisoned)?;
        Ok(sets.get(&(name.to_owned(), *config)).cloned())
    }

    fn put(&self, name: &str, config: &DiceConfig, set: &SolutionSet) -> Result<(), StoreError> {
        let mut sets = self.sets.write().map_err(|_| StoreError::Poisoned)?;
        sets.insert((name.to_owned(), *config), set.clone());
        Ok(())
    }

    fn keys(&self, name: &str) -> Result<Vec<DiceConfig>, StoreError> {
        let sets = self.sets.read().map_err(|_| StoreError::Poisoned)?;
        Ok(sets.keys()
            .filter(|(set_name, _)| set_name == name)
            .map(|(_, config)| *config)
            .collect())
    }
}

/// A store that keeps one JSON file per configuration, at `<root>/<name>/<key>.json`.
///
/// Files are replaced atomically, so a reader never sees a partially written set.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at the given directory. Nothing is created until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory holding the named database.
    pub fn dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// The file holding the set of the configuration.
    pub fn path(&self, name: &str, config: &DiceConfig) -> PathBuf {
        self.dir(name).join(format!("{}.json", config.key()))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io { path: path.to_owned(), source }
}

impl Store for FileStore {
    fn get(&self, name: &str, config: &DiceConfig) -> Result<Option<SolutionSet>, StoreError> {
        let path = self.path(name, config);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(&path)(err)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Json { path, source })
    }

    fn put(&self, name: &str, config: &DiceConfig, set: &SolutionSet) -> Result<(), StoreError> {
        let dir = self.dir(name);
        let path = self.path(name, config);
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;

        let mut json = serde_json::to_string_pretty(set)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        json.push('\n');

        let mut file = NamedTempFile::new_in(&dir).map_err(io_error(&dir))?;
        file.write_all(json.as_bytes()).map_err(io_error(file.path()))?;
        file.persist(&path).map_err(|err| io_error(&path)(err.error))?;
        Ok(())
    }

    fn keys(&self, name: &str) -> Result<Vec<DiceConfig>, StoreError> {
        let dir = self.dir(name);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_error(&dir)(err)),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry.map_err(io_error(&dir))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            // a file is only found again by `path` if its name is the key itself
            match stem.parse::<DiceConfig>() {
                Ok(config) if config.key() == stem => keys.push(config),
                Ok(_) => {
                    let source = MalformedConfig::InvalidKey(stem.to_owned());
                    return Err(StoreError::CorruptKey { path, source });
                },
                Err(source) => return Err(StoreError::CorruptKey { path, source }),
            }
        }

        keys.sort();
        Ok(keys)
    }
}
