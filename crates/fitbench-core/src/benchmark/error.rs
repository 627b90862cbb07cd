use crate::core::config::ConfigError;
use crate::core::io::chain_list::ChainListError;
use crate::core::io::pdb::PdbError;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures of the sweep harness itself. Any of these aborts the run, except
/// `MissingInput` raised while preparing a point, which only drops that point.
#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("Invalid sweep configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid parameter grid: {0}")]
    InvalidGrid(String),

    #[error("Configuration point {point} is missing parameter '{name}' of the expected type")]
    MissingParameter { point: String, name: &'static str },

    #[error("Required input for {point} not found: {path}")]
    MissingInput { point: String, path: PathBuf },

    #[error("Failed to read chain list for {point}: {source}")]
    ChainList {
        point: String,
        #[source]
        source: ChainListError,
    },

    #[error("Failed to read curated directory {path}: {source}")]
    CuratedDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse motif {path}: {source}")]
    Motif {
        path: PathBuf,
        #[source]
        source: PdbError,
    },

    #[error("Invalid query motif {path}: {reason}")]
    QueryMotif { path: PathBuf, reason: String },

    #[error("Report row has {found} fields but the header has {expected}")]
    RowShape { expected: usize, found: usize },

    #[error("Failed to encode report: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures of a single search invocation. These only ever drop one trial.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Failed to launch search program '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Search program exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Search was cancelled")]
    Cancelled,

    #[error("Search did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("Search worker panicked")]
    Panicked,

    #[error("I/O error during search: {0}")]
    Io(#[from] io::Error),
}
