use super::defaults::DefaultsConfig;
use super::file::{FileBinnedSuite, FileConfig, FileEnvironmentSuite, FileSuitesConfig};
use super::models::{BenchConfig, CurateConfig, SuiteConfigs};
use crate::cli::{BenchArgs, CurateArgs, LayoutArg, SuiteArg};
use crate::error::{CliError, Result};
use crate::utils::parser;
use fitbench::benchmark::config::SweepSettingsBuilder;
use fitbench::benchmark::inputs::DataLayout;
use fitbench::benchmark::search::{CommandSearch, DataSource, Parallelism};
use fitbench::benchmark::suites::{BinnedMotifSuite, EnvironmentFilteringSuite, SingleMotifSuite};
use fitbench::core::io::options::ParserOptions;
use fitbench::curation::classify::Dimension;
use fitbench::curation::config::{CurationConfigBuilder, CurationMode, DEFAULT_EXTENT_CUTOFF};
use std::path::PathBuf;
use std::time::Duration;

pub fn build_curate_config(args: &CurateArgs) -> Result<CurateConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::load(args.config.as_deref())?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;
    let curation_file = file_config.curation.take().unwrap_or_default();

    let mut builder = CurationConfigBuilder::new().output_root(
        args.output
            .clone()
            .or(curation_file.output)
            .unwrap_or_else(|| PathBuf::from(defaults.curated_output)),
    );
    if let Some(cutoff) = args.extent_cutoff.or(curation_file.extent_cutoff) {
        builder = builder.extent_cutoff(cutoff);
    }
    if let Some(size) = args.min_size.or(curation_file.min_size) {
        builder = builder.min_size(size);
    }
    if let Some(size) = args.max_size.or(curation_file.max_size) {
        builder = builder.max_size(size);
    }
    if let Some(reference) = curation_file.reference_point {
        builder = builder.reference_point(reference);
    }
    if let Some(settings) = curation_file.parser_settings {
        builder = builder.parser_options(ParserOptions::with_settings(&settings));
    }

    let layouts = if args.modes.is_empty() {
        curation_file.modes
    } else {
        Some(args.modes.clone())
    };
    if let Some(layouts) = layouts {
        builder = builder.modes(layouts.into_iter().map(curation_mode).collect());
    }

    let curation = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(CurateConfig {
        corpus: args.input.clone(),
        curation,
    })
}

fn curation_mode(layout: LayoutArg) -> CurationMode {
    match layout {
        LayoutArg::Size => CurationMode::Grouped(Dimension::Size),
        LayoutArg::Extent => CurationMode::Grouped(Dimension::Extent),
        LayoutArg::Enumerated => CurationMode::Enumerated,
    }
}

pub fn build_bench_config(args: &BenchArgs) -> Result<BenchConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::load(args.config.as_deref())?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let sweep_file = file_config.sweep.take().unwrap_or_default();
    let mut settings = SweepSettingsBuilder::new();
    if let Some(n) = args.warmup.or(sweep_file.warmup_iterations) {
        settings = settings.warmup_iterations(n);
    }
    if let Some(n) = args.iterations.or(sweep_file.measurement_iterations) {
        settings = settings.measurement_iterations(n);
    }
    if let Some(secs) = args.timeout.or(sweep_file.timeout_secs) {
        settings = settings.timeout(Duration::from_secs(secs));
    }
    let settings = settings
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;
    let output_dir = args
        .output
        .clone()
        .or(sweep_file.output)
        .unwrap_or_else(|| PathBuf::from(defaults.report_output));

    let data_file = file_config.data.take().unwrap_or_default();
    let data_root = args
        .data_root
        .clone()
        .or(data_file.data_root)
        .unwrap_or_else(|| PathBuf::from(defaults.data_root));
    let curated_root = args
        .curated_root
        .clone()
        .or(data_file.curated_root)
        .unwrap_or_else(|| data_root.join(defaults.curated_subdirectory));
    let pdb_root = args
        .pdb_root
        .clone()
        .or(data_file.pdb_root)
        .unwrap_or_else(|| PathBuf::from(defaults.pdb_root));
    let curation_file = file_config.curation.take().unwrap_or_default();
    let layout = DataLayout::new(data_root, curated_root, pdb_root)
        .with_reference_point(curation_file.reference_point.unwrap_or_default());
    let extent_cutoff = curation_file.extent_cutoff.unwrap_or(DEFAULT_EXTENT_CUTOFF);

    let search_file = file_config.search.take().unwrap_or_default();
    let program = args
        .search_program
        .clone()
        .or(search_file.program)
        .ok_or_else(|| {
            CliError::Config(
                "No search program configured. Pass --search-program or set `search.program`."
                    .to_string(),
            )
        })?;
    let search = CommandSearch::new(
        program,
        search_file
            .args
            .unwrap_or_else(|| owned(defaults.search_args)),
    )
    .with_environment_args(
        search_file
            .environment_args
            .unwrap_or_else(|| owned(defaults.environment_args)),
    );
    let parallelism = match search_file.threads {
        None => Parallelism::Maximal,
        Some(0) => {
            return Err(CliError::Config(
                "`search.threads` must be at least 1".to_string(),
            ));
        }
        Some(1) => Parallelism::Sequential,
        Some(n) => Parallelism::Threads(n),
    };

    let mut selected = Vec::new();
    let requested: &[SuiteArg] = if args.suites.is_empty() {
        &SuiteArg::ALL
    } else {
        &args.suites
    };
    for suite in requested {
        if !selected.contains(suite) {
            selected.push(*suite);
        }
    }

    let suites = merge_suites(
        file_config.suites.take().unwrap_or_default(),
        &layout,
        extent_cutoff,
        &defaults,
    );

    Ok(BenchConfig {
        output_dir,
        settings,
        layout,
        search,
        parser_options: ParserOptions::benchmark(),
        atom_filter: search_file.atom_filter.unwrap_or_default(),
        parallelism,
        selected,
        suites,
    })
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn merge_suites(
    file: FileSuitesConfig,
    layout: &DataLayout,
    extent_cutoff: f64,
    defaults: &DefaultsConfig,
) -> SuiteConfigs {
    let single_file = file.single_motif.unwrap_or_default();
    let mut single_motif = SingleMotifSuite::new(
        single_file
            .query
            .unwrap_or_else(|| layout.data_root.join(defaults.single_motif_query)),
    );
    if let Some(sources) = single_file.sources {
        single_motif.sources = sources;
    }
    if let Some(sizes) = single_file.dataset_sizes {
        single_motif.dataset_sizes = sizes;
    }
    if let Some(radius) = single_file.environment_radius {
        single_motif.environment_radius = radius;
    }

    SuiteConfigs {
        single_motif,
        motif_by_size: merge_binned(BinnedMotifSuite::by_size(), file.motif_by_size),
        motif_by_extent: merge_binned(
            BinnedMotifSuite::by_extent_up_to(extent_cutoff),
            file.motif_by_extent,
        ),
        environment_filtering: merge_environment(file.environment_filtering.unwrap_or_default()),
    }
}

fn merge_binned(mut suite: BinnedMotifSuite, file: Option<FileBinnedSuite>) -> BinnedMotifSuite {
    let file = file.unwrap_or_default();
    if let Some(bins) = file.bins {
        suite.bins = bins;
    }
    if let Some(cutoff) = file.rank_cutoff {
        suite.rank_cutoff = cutoff;
    }
    if let Some(size) = file.chain_list_size {
        suite.chain_list_size = size;
    }
    if let Some(source) = file.source {
        suite.source = source;
    }
    suite
}

fn merge_environment(file: FileEnvironmentSuite) -> EnvironmentFilteringSuite {
    let mut suite = EnvironmentFilteringSuite::new(file.ranks.unwrap_or_default());
    if let Some(radius) = file.environment_radius {
        suite.environment_radius = radius;
    }
    if let Some(size) = file.chain_list_size {
        suite.chain_list_size = size;
    }
    if let Some(source) = file.source {
        suite.source = source;
    }
    if let Some(secs) = file.timeout_secs {
        suite.timeout = Some(Duration::from_secs(secs));
    }
    suite
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) =
            parser::parse_assignment(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;
        apply_set_value(&mut config, key, value).map_err(|e| CliError::Config(e.to_string()))?;
    }
    Ok(config)
}

fn apply_set_value(
    config: &mut FileConfig,
    key: &str,
    value: &str,
) -> std::result::Result<(), SetError> {
    let (section, field) = key.split_once('.').ok_or_else(|| SetError::unsupported(key))?;
    match section {
        "curation" => {
            let c = config.curation.get_or_insert_with(Default::default);
            match field {
                "output" => c.output = Some(PathBuf::from(value)),
                "extent-cutoff" => c.extent_cutoff = Some(parser::parse_value(key, value)?),
                "min-size" => c.min_size = Some(parser::parse_value(key, value)?),
                "max-size" => c.max_size = Some(parser::parse_value(key, value)?),
                "reference-point" => c.reference_point = Some(parser::parse_keyword(key, value)?),
                "modes" => {
                    c.modes = Some(
                        value
                            .split(',')
                            .map(|m| parser::parse_keyword(key, m.trim()))
                            .collect::<std::result::Result<_, _>>()?,
                    )
                }
                _ => return Err(SetError::unsupported(key)),
            }
        }
        "sweep" => {
            let s = config.sweep.get_or_insert_with(Default::default);
            match field {
                "output" => s.output = Some(PathBuf::from(value)),
                "warmup-iterations" => s.warmup_iterations = Some(parser::parse_value(key, value)?),
                "measurement-iterations" => {
                    s.measurement_iterations = Some(parser::parse_value(key, value)?)
                }
                "timeout-secs" => s.timeout_secs = Some(parser::parse_value(key, value)?),
                _ => return Err(SetError::unsupported(key)),
            }
        }
        "search" => {
            let s = config.search.get_or_insert_with(Default::default);
            match field {
                "program" => s.program = Some(PathBuf::from(value)),
                "atom-filter" => s.atom_filter = Some(parser::parse_keyword(key, value)?),
                "threads" => s.threads = Some(parser::parse_value(key, value)?),
                _ => return Err(SetError::unsupported(key)),
            }
        }
        "data" => {
            let d = config.data.get_or_insert_with(Default::default);
            let path = Some(PathBuf::from(value));
            match field {
                "data-root" => d.data_root = path,
                "curated-root" => d.curated_root = path,
                "pdb-root" => d.pdb_root = path,
                _ => return Err(SetError::unsupported(key)),
            }
        }
        "suites" => apply_suite_value(
            config.suites.get_or_insert_with(Default::default),
            key,
            field,
            value,
        )?,
        _ => return Err(SetError::unsupported(key)),
    }
    Ok(())
}

fn apply_suite_value(
    suites: &mut FileSuitesConfig,
    key: &str,
    field: &str,
    value: &str,
) -> std::result::Result<(), SetError> {
    let (suite, field) = field.split_once('.').ok_or_else(|| SetError::unsupported(key))?;
    match suite {
        "single-motif" => {
            let s = suites.single_motif.get_or_insert_with(Default::default);
            match field {
                "query" => s.query = Some(PathBuf::from(value)),
                "sources" => {
                    s.sources = Some(parser::parse_list::<DataSource>(key, value)?);
                }
                "dataset-sizes" => s.dataset_sizes = Some(parser::parse_list(key, value)?),
                "environment-radius" => {
                    s.environment_radius = Some(parser::parse_value(key, value)?)
                }
                _ => return Err(SetError::unsupported(key)),
            }
        }
        "motif-by-size" | "motif-by-extent" => {
            let slot = if suite == "motif-by-size" {
                &mut suites.motif_by_size
            } else {
                &mut suites.motif_by_extent
            };
            let s = slot.get_or_insert_with(Default::default);
            match field {
                "bins" => s.bins = Some(parser::parse_list(key, value)?),
                "rank-cutoff" => s.rank_cutoff = Some(parser::parse_value(key, value)?),
                "chain-list-size" => s.chain_list_size = Some(parser::parse_value(key, value)?),
                "source" => s.source = Some(parser::parse_value(key, value)?),
                _ => return Err(SetError::unsupported(key)),
            }
        }
        "environment-filtering" => {
            let s = suites
                .environment_filtering
                .get_or_insert_with(Default::default);
            match field {
                "ranks" => s.ranks = Some(parser::parse_list(key, value)?),
                "environment-radius" => {
                    s.environment_radius = Some(parser::parse_value(key, value)?)
                }
                "chain-list-size" => s.chain_list_size = Some(parser::parse_value(key, value)?),
                "source" => s.source = Some(parser::parse_value(key, value)?),
                "timeout-secs" => s.timeout_secs = Some(parser::parse_value(key, value)?),
                _ => return Err(SetError::unsupported(key)),
            }
        }
        _ => return Err(SetError::unsupported(key)),
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
enum SetError {
    #[error("Unsupported configuration key for --set: '{0}'")]
    Unsupported(String),
    #[error(transparent)]
    Parse(#[from] parser::ParseError),
}

impl SetError {
    fn unsupported(key: &str) -> Self {
        SetError::Unsupported(key.to_string())
    }
}
