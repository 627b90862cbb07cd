use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainListError {
    #[error("Failed to read chain list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Chain list {0} contains no entries")]
    Empty(PathBuf),
}

/// One line of a chain list: a structure identifier and, optionally, a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainListEntry {
    pub pdb_id: String,
    pub chain_id: Option<String>,
}

/// The set of target chains a search runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainList {
    path: PathBuf,
    entries: Vec<ChainListEntry>,
}

impl ChainList {
    /// Reads a chain list where each non-empty line holds a structure identifier,
    /// optionally followed by `separator` and a chain identifier.
    pub fn from_path<P: AsRef<Path>>(path: P, separator: char) -> Result<Self, ChainListError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ChainListError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries = parse_entries(&content, separator);
        if entries.is_empty() {
            return Err(ChainListError::Empty(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ChainListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entries(content: &str, separator: char) -> Vec<ChainListEntry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split(separator).map(str::trim);
            let pdb_id = fields.next().filter(|id| !id.is_empty())?;
            let chain_id = fields.next().filter(|c| !c.is_empty()).map(str::to_string);
            Some(ChainListEntry {
                pdb_id: pdb_id.to_string(),
                chain_id,
            })
        })
        .collect()
}
