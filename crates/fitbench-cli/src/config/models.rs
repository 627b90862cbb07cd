use crate::cli::SuiteArg;
use fitbench::benchmark::config::SweepSettings;
use fitbench::benchmark::inputs::DataLayout;
use fitbench::benchmark::search::{AtomFilter, CommandSearch, Parallelism};
use fitbench::benchmark::suites::{BinnedMotifSuite, EnvironmentFilteringSuite, SingleMotifSuite};
use fitbench::core::io::options::ParserOptions;
use fitbench::curation::config::CurationConfig;
use std::path::PathBuf;

pub struct CurateConfig {
    pub corpus: PathBuf,
    pub curation: CurationConfig,
}

pub struct BenchConfig {
    pub output_dir: PathBuf,
    pub settings: SweepSettings,
    pub layout: DataLayout,
    pub search: CommandSearch,
    pub parser_options: ParserOptions,
    pub atom_filter: AtomFilter,
    pub parallelism: Parallelism,
    /// In the order they run.
    pub selected: Vec<SuiteArg>,
    pub suites: SuiteConfigs,
}

pub struct SuiteConfigs {
    pub single_motif: SingleMotifSuite,
    pub motif_by_size: BinnedMotifSuite,
    pub motif_by_extent: BinnedMotifSuite,
    /// Ranks are left empty when they should be discovered from the curated tree.
    pub environment_filtering: EnvironmentFilteringSuite,
}
