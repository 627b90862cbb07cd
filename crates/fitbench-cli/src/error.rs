use fitbench::benchmark::error::BenchmarkError;
use fitbench::curation::error::CurationError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Curation(#[from] CurationError),

    #[error(transparent)]
    Benchmark(#[from] BenchmarkError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{} suite(s) failed: {}", .0.len(), .0.join(", "))]
    SuitesFailed(Vec<String>),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
