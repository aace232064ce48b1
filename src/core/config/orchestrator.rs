use crate::core::config::data::Config;
use crate::core::config::io::ConfigError;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::SystemTime;

/// The last parsed file and the mtime it was read at.
struct Snapshot {
    config: Config,
    modified: Option<SystemTime>,
}

/// Owns one config path. Loads are served from the snapshot until the
/// file's mtime moves; writes go through `mutate` so the snapshot never lags
/// what this process saved.
pub(crate) struct ConfigOrchestrator {
    path: PathBuf,
    snapshot: Mutex<Option<Snapshot>>,
}

pub(crate) static CONFIG_ORCHESTRATOR: LazyLock<ConfigOrchestrator> =
    LazyLock::new(|| ConfigOrchestrator::new(Config::get_config_path()));

#[cfg(test)]
pub(crate) static TEST_ORCHESTRATOR: LazyLock<Mutex<Option<ConfigOrchestrator>>> =
    LazyLock::new(|| Mutex::new(None));

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

impl ConfigOrchestrator {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            snapshot: Mutex::new(None),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn load_with_cache(&self) -> Result<Config, ConfigError> {
        let mut snapshot = lock(&self.snapshot);
        let modified = mtime(&self.path);
        match snapshot.as_ref() {
            Some(cached) if cached.modified == modified => Ok(cached.config.clone()),
            _ => {
                let config = Config::load_from_path(&self.path)?;
                *snapshot = Some(Snapshot {
                    config: config.clone(),
                    modified,
                });
                Ok(config)
            }
        }
    }

    /// Applies `mutator` to a fresh copy and saves it. Nothing is written
    /// when the mutator fails.
    pub(crate) fn mutate<F, T>(&self, mutator: F) -> Result<T, Box<dyn Error>>
    where
        F: FnOnce(&mut Config) -> Result<T, Box<dyn Error>>,
    {
        let mut working = self.load_with_cache()?;
        let result = mutator(&mut working)?;
        working.save_to_path(&self.path)?;
        *lock(&self.snapshot) = Some(Snapshot {
            config: working,
            modified: mtime(&self.path),
        });
        Ok(result)
    }
}

impl Config {
    #[cfg(not(test))]
    pub fn load() -> Result<Config, Box<dyn Error>> {
        Ok(CONFIG_ORCHESTRATOR.load_with_cache()?)
    }

    /// Reads the override path installed with `set_test_config_path`, or
    /// returns defaults so tests never see the user's real file.
    #[cfg(test)]
    pub fn load() -> Result<Config, Box<dyn Error>> {
        match lock(&TEST_ORCHESTRATOR).as_ref() {
            Some(orchestrator) => Ok(orchestrator.load_with_cache()?),
            None => Ok(Config::default()),
        }
    }

    #[cfg(not(test))]
    pub fn mutate<F, T>(mutator: F) -> Result<T, Box<dyn Error>>
    where
        F: FnOnce(&mut Config) -> Result<T, Box<dyn Error>>,
    {
        CONFIG_ORCHESTRATOR.mutate(mutator)
    }

    #[cfg(test)]
    pub fn mutate<F, T>(mutator: F) -> Result<T, Box<dyn Error>>
    where
        F: FnOnce(&mut Config) -> Result<T, Box<dyn Error>>,
    {
        match lock(&TEST_ORCHESTRATOR).as_ref() {
            Some(orchestrator) => orchestrator.mutate(mutator),
            None => mutator(&mut Config::default()),
        }
    }

    /// Path of the file `load` and `mutate` use.
    pub fn active_path() -> PathBuf {
        #[cfg(test)]
        {
            if let Some(orchestrator) = lock(&TEST_ORCHESTRATOR).as_ref() {
                return orchestrator.path().to_path_buf();
            }
        }
        CONFIG_ORCHESTRATOR.path().to_path_buf()
    }

    #[cfg(test)]
    pub(crate) fn set_test_config_path(path: PathBuf) {
        *lock(&TEST_ORCHESTRATOR) = Some(ConfigOrchestrator::new(path));
    }

    #[cfg(test)]
    pub(crate) fn clear_test_config_override() {
        lock(&TEST_ORCHESTRATOR).take();
    }
}
