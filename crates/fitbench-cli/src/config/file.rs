use crate::cli::LayoutArg;
use crate::error::{CliError, Result};
use fitbench::benchmark::search::{AtomFilter, DataSource};
use fitbench::core::io::options::Setting;
use fitbench::core::utils::geometry::ReferencePoint;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The TOML configuration file. Every key is optional; absent keys fall back to
/// command-line flags or built-in defaults.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub curation: Option<FileCurationConfig>,
    pub sweep: Option<FileSweepConfig>,
    pub search: Option<FileSearchConfig>,
    pub data: Option<FileDataConfig>,
    pub suites: Option<FileSuitesConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileCurationConfig {
    pub output: Option<PathBuf>,
    pub extent_cutoff: Option<f64>,
    pub min_size: Option<usize>,
    pub max_size: Option<usize>,
    pub reference_point: Option<ReferencePoint>,
    pub modes: Option<Vec<LayoutArg>>,
    pub parser_settings: Option<Vec<Setting>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSweepConfig {
    pub output: Option<PathBuf>,
    pub warmup_iterations: Option<usize>,
    pub measurement_iterations: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSearchConfig {
    pub program: Option<PathBuf>,
    pub args: Option<Vec<String>>,
    pub environment_args: Option<Vec<String>>,
    pub atom_filter: Option<AtomFilter>,
    /// Absent means one thread per hardware thread.
    pub threads: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileDataConfig {
    pub data_root: Option<PathBuf>,
    pub curated_root: Option<PathBuf>,
    pub pdb_root: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSuitesConfig {
    pub single_motif: Option<FileSingleMotifSuite>,
    pub motif_by_size: Option<FileBinnedSuite>,
    pub motif_by_extent: Option<FileBinnedSuite>,
    pub environment_filtering: Option<FileEnvironmentSuite>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSingleMotifSuite {
    pub query: Option<PathBuf>,
    pub sources: Option<Vec<DataSource>>,
    pub dataset_sizes: Option<Vec<u32>>,
    pub environment_radius: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileBinnedSuite {
    pub bins: Option<Vec<u32>>,
    pub rank_cutoff: Option<usize>,
    pub chain_list_size: Option<u32>,
    pub source: Option<DataSource>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileEnvironmentSuite {
    /// Absent means every rank found under `enumerated/`.
    pub ranks: Option<Vec<u32>>,
    pub environment_radius: Option<f64>,
    pub chain_list_size: Option<u32>,
    pub source: Option<DataSource>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
