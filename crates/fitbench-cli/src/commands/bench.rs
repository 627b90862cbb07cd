use crate::cli::{BenchArgs, SuiteArg};
use crate::config::{BenchConfig, build_bench_config};
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use fitbench::benchmark::search::SearchAlgorithm;
use fitbench::benchmark::suites::{Suite, SuiteContext};
use fitbench::benchmark::sweep::{SweepDriver, SweepOutcome};
use fitbench::progress::ProgressReporter;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn run(args: BenchArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<Vec<SweepOutcome>> {
    info!("Merging configuration from file and CLI arguments...");
    let mut config = build_bench_config(&args)?;

    if config.selected.contains(&SuiteArg::EnvironmentFiltering)
        && config.suites.environment_filtering.ranks.is_empty()
    {
        let ranks = config.layout.enumerated_ranks()?;
        info!(count = ranks.len(), "Discovered enumerated query motifs.");
        config.suites.environment_filtering.ranks = ranks;
    }

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let search: Arc<dyn SearchAlgorithm> = Arc::new(config.search.clone());
    let context = SuiteContext {
        layout: config.layout.clone(),
        search,
        parser_options: config.parser_options,
        atom_filter: config.atom_filter,
        parallelism: config.parallelism,
    };
    let driver = SweepDriver::new(config.settings.clone());

    let mut outcomes = Vec::with_capacity(config.selected.len());
    let mut failed = Vec::new();
    for selected in &config.selected {
        let suite = suite_for(&config, *selected);
        let class = suite.report_class();
        let path = config.output_dir.join(class.default_file_name());

        println!("Running suite '{}'...", class.name());
        let result = tokio::task::block_in_place(|| {
            driver.run_to_file(suite, &context, &path, &reporter)
        });
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(suite = class.name(), error = %e, "Suite failed, continuing with the remaining suites.");
                println!("✗ Suite '{}' failed: {}", class.name(), e);
                failed.push(class.name().to_string());
                continue;
            }
        };

        println!(
            "✓ {} row(s) written to {}",
            outcome.rows.len(),
            path.display()
        );
        for missing in &outcome.missing {
            warn!(suite = class.name(), point = %missing.point, reason = %missing.reason, "Point missing from report.");
            println!("  Missing: {} ({})", missing.point, missing.reason);
        }
        outcomes.push(outcome);
    }

    if !failed.is_empty() {
        return Err(CliError::SuitesFailed(failed));
    }
    Ok(outcomes)
}

fn suite_for(config: &BenchConfig, selected: SuiteArg) -> &dyn Suite {
    match selected {
        SuiteArg::SingleMotif => &config.suites.single_motif,
        SuiteArg::MotifBySize => &config.suites.motif_by_size,
        SuiteArg::MotifByExtent => &config.suites.motif_by_extent,
        SuiteArg::EnvironmentFiltering => &config.suites.environment_filtering,
    }
}
