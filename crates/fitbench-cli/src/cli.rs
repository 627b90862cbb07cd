use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "fitbench - Curate structural motif datasets and benchmark motif search over them.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used for curation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter a motif corpus and write the grouped and enumerated datasets.
    Curate(CurateArgs),
    /// Run benchmark suites against an external search program and write CSV reports.
    Bench(BenchArgs),
}

/// Arguments for the `curate` subcommand.
#[derive(Args, Debug)]
pub struct CurateArgs {
    /// Directory containing the raw motif corpus (`.pdb` / `.ent` files, searched recursively).
    #[arg(short, long, required = true, value_name = "DIR")]
    pub input: PathBuf,

    /// Root directory the curated datasets are written to.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the maximum motif extent in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub extent_cutoff: Option<f64>,

    /// Override the minimum number of residues.
    #[arg(long, value_name = "INT")]
    pub min_size: Option<usize>,

    /// Override the maximum number of residues.
    #[arg(long, value_name = "INT")]
    pub max_size: Option<usize>,

    /// Output layouts to write. Can be given multiple times; defaults to all.
    #[arg(short, long = "mode", value_enum, value_name = "MODE")]
    pub modes: Vec<LayoutArg>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S curation.extent-cutoff=12.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutArg {
    Size,
    Extent,
    Enumerated,
}

/// Arguments for the `bench` subcommand.
#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory the CSV reports are written to.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Suites to run. Can be given multiple times; defaults to all.
    #[arg(short, long = "suite", value_enum, value_name = "SUITE")]
    pub suites: Vec<SuiteArg>,

    /// Override the executable invoked for every search.
    #[arg(long, value_name = "PATH")]
    pub search_program: Option<PathBuf>,

    /// Override the directory holding chain lists and query motifs.
    #[arg(long, value_name = "DIR")]
    pub data_root: Option<PathBuf>,

    /// Override the output root of a previous curation run.
    #[arg(long, value_name = "DIR")]
    pub curated_root: Option<PathBuf>,

    /// Override the local structure archive.
    #[arg(long, value_name = "DIR")]
    pub pdb_root: Option<PathBuf>,

    /// Override the number of warm-up trials per configuration point.
    #[arg(long, value_name = "INT")]
    pub warmup: Option<usize>,

    /// Override the number of measured trials per configuration point.
    #[arg(long, value_name = "INT")]
    pub iterations: Option<usize>,

    /// Override the per-trial timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S sweep.measurement-iterations=10
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuiteArg {
    SingleMotif,
    MotifBySize,
    MotifByExtent,
    EnvironmentFiltering,
}

impl SuiteArg {
    pub const ALL: [SuiteArg; 4] = [
        SuiteArg::SingleMotif,
        SuiteArg::MotifBySize,
        SuiteArg::MotifByExtent,
        SuiteArg::EnvironmentFiltering,
    ];
}
