use crate::core::config::ConfigError;
use crate::core::io::pdb::PdbError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurationError {
    #[error("Invalid curation configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Motif corpus directory not found: {0}")]
    CorpusNotFound(PathBuf),

    #[error("Failed to read motif corpus at {path}: {source}")]
    CorpusRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create output directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write curated motif {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: PdbError,
    },
}
