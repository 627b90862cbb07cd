use crate::cli::CurateArgs;
use crate::config::build_curate_config;
use crate::error::Result;
use crate::ui::{CliProgressHandler, UiEvent};
use fitbench::curation::curator::{CurationSummary, DatasetCurator};
use fitbench::progress::ProgressReporter;
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(args: CurateArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<CurationSummary> {
    info!("Merging configuration from file and CLI arguments...");
    let config = build_curate_config(&args)?;
    let output_root = config.curation.output_root.clone();

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Curating motifs from {}...", config.corpus.display());
    let curator = DatasetCurator::new(config.curation);
    let summary =
        tokio::task::block_in_place(|| curator.run(&config.corpus, &reporter))?;

    info!(?summary, "Curation finished.");
    println!(
        "Scanned {} file(s): {} accepted, {} rejected ({} by extent, {} by size), {} unreadable.",
        summary.scanned,
        summary.accepted,
        summary.rejected(),
        summary.rejected_extent,
        summary.rejected_size,
        summary.failed
    );
    println!(
        "✓ {} curated file(s) written below {}",
        summary.written,
        output_root.display()
    );

    Ok(summary)
}
