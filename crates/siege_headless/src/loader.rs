//! Balance and progression loading from RON files.
//!
//! The core never touches the filesystem; this module reads the text and
//! hands it to [`Balance::from_ron_str`] / [`Progression::from_ron_str`].

use std::fs;
use std::path::{Path, PathBuf};

use siege_core::config::{Balance, Progression};
use siege_core::error::GameError;
use thiserror::Error;

/// Error type for loading configuration files.
#[derive(Error, Debug)]
pub enum LoadError {
    /// File could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// File was read but its contents were rejected.
    #[error("Invalid config in {path}: {source}")]
    Config {
        /// File that failed.
        path: PathBuf,
        /// Parse or validation error from the core.
        #[source]
        source: GameError,
    },
}

/// Default balance file shipped with the workspace.
#[must_use]
pub fn default_balance_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/balance.ron")
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a balance file; parsing also validates it.
pub fn load_balance(path: &Path) -> Result<Balance, LoadError> {
    let text = read(path)?;
    let balance = Balance::from_ron_str(&text).map_err(|source| LoadError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Loaded balance");
    Ok(balance)
}

/// Load a meta-progression file.
pub fn load_progression(path: &Path) -> Result<Progression, LoadError> {
    let text = read(path)?;
    let progression = Progression::from_ron_str(&text).map_err(|source| LoadError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Loaded progression");
    Ok(progression)
}

/// Load `path` when given, otherwise use the built-in table.
pub fn balance_or_default(path: Option<&Path>) -> Result<Balance, LoadError> {
    path.map_or_else(|| Ok(Balance::default()), load_balance)
}

/// Load `path` when given, otherwise start with no progression.
pub fn progression_or_default(path: Option<&Path>) -> Result<Progression, LoadError> {
    path.map_or_else(|| Ok(Progression::default()), load_progression)
}
