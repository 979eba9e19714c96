//! Fatal error taxonomy.
//!
//! Only scanner failures, unreadable cache files and artifact write failures
//! end a run. Resolution misses and failed network probes are not errors; they
//! degrade inside the cascade and show up in the logs.

use std::path::PathBuf;

use thiserror::Error;

pub type GenResult<T> = Result<T, GenError>;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Dependency scan of {path} failed: {reason}")]
    Scan { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid license JSON: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl GenError {
    pub fn scan(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        GenError::Scan {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Write an artifact, mapping I/O failure onto [`GenError::Write`].
pub fn write_artifact(path: PathBuf, contents: &str) -> GenResult<PathBuf> {
    std::fs::write(&path, contents).map_err(|source| GenError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
