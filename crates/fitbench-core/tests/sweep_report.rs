use fitbench::benchmark::config::SweepSettings;
use fitbench::benchmark::error::SearchError;
use fitbench::benchmark::inputs::DataLayout;
use fitbench::benchmark::report::{ReportClass, STATISTICS_COLUMNS};
use fitbench::benchmark::sampling::Cancellation;
use fitbench::benchmark::search::{
    AtomFilter, MatchSet, Parallelism, SearchAlgorithm, SearchRequest,
};
use fitbench::benchmark::suites::{BinnedMotifSuite, SuiteContext};
use fitbench::benchmark::sweep::{MissingReason, SweepDriver};
use fitbench::core::io::options::ParserOptions;
use fitbench::core::io::pdb::PdbFile;
use fitbench::core::io::traits::StructureFile;
use fitbench::core::models::atom::Atom;
use fitbench::core::models::motif::Motif;
use fitbench::core::models::residue::{LeafIdentifier, Residue};
use fitbench::curation::config::CurationConfigBuilder;
use fitbench::curation::curator::DatasetCurator;
use fitbench::progress::ProgressReporter;
use nalgebra::Point3;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn linear_motif(id: &str, size: usize, extent: f64) -> Motif {
    let step = extent / (size - 1) as f64;
    let residues = (0..size)
        .map(|i| {
            Residue::new(LeafIdentifier::new('A', i as isize + 1), "HIS", false).with_atoms(vec![
                Atom::new(i + 1, "CA", "C", Point3::new(step * i as f64, 0.0, 0.0)),
            ])
        })
        .collect();
    Motif::new(id, residues)
}

/// Finds one match per query and fails every search on the size-3 bin.
struct BinAwareSearch {
    calls: AtomicUsize,
}

impl SearchAlgorithm for BinAwareSearch {
    fn run(&self, request: &SearchRequest, _: &Cancellation) -> Result<MatchSet, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.query_path.to_string_lossy().contains("size_3") {
            return Err(SearchError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "no targets".to_string(),
            });
        }
        std::thread::sleep(Duration::from_millis(2));
        Ok(MatchSet {
            match_count: Some(1),
        })
    }
}

fn curated_fixture(root: &Path) -> DataLayout {
    let corpus = root.join("corpus");
    fs::create_dir_all(&corpus).unwrap();
    let motifs = [
        ("1AAA", 2, 3.0),
        ("1AAB", 2, 4.0),
        ("3CCC", 3, 5.5),
        ("5EEE", 4, 14.9),
    ];
    for (id, size, extent) in motifs {
        PdbFile::write_to_path(&linear_motif(id, size, extent), corpus.join(format!("{}.pdb", id)))
            .unwrap();
    }

    let curated = root.join("data/structural_motifs");
    let config = CurationConfigBuilder::new()
        .output_root(curated.clone())
        .build()
        .unwrap();
    DatasetCurator::new(config)
        .run(&corpus, &ProgressReporter::new())
        .unwrap();

    let data = root.join("data");
    fs::write(
        data.join("nrpdb_041416_BLAST_e-7_pdb-mmtf_mutual_subset_500.txt"),
        "1abc\tA\n2xyz\tB\n",
    )
    .unwrap();
    DataLayout::new(data, curated, root.join("pdb"))
}

#[test]
fn size_sweep_reports_points_with_samples_and_lists_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let layout = curated_fixture(dir.path());
    let search = Arc::new(BinAwareSearch {
        calls: AtomicUsize::new(0),
    });
    let context = SuiteContext {
        layout,
        search: search.clone(),
        parser_options: ParserOptions::benchmark(),
        atom_filter: AtomFilter::Arbitrary,
        parallelism: Parallelism::Maximal,
    };
    let suite = BinnedMotifSuite {
        bins: vec![2, 3, 4],
        ..BinnedMotifSuite::by_size()
    };
    let driver = SweepDriver::new(SweepSettings {
        warmup_iterations: 1,
        measurement_iterations: 3,
        timeout: Duration::from_secs(30),
    });
    let report = dir.path().join("reports").join(ReportClass::MotifBySize.default_file_name());

    let outcome = driver
        .run_to_file(&suite, &context, &report, &ProgressReporter::new())
        .unwrap();

    assert_eq!(outcome.rows.len(), 2);
    assert_eq!(outcome.missing.len(), 1);
    assert_eq!(outcome.missing[0].reason, MissingReason::NoSuccessfulTrials);
    // Bin 2 holds two motifs and bin 4 one: (2 + 1) searches per trial, 4 trials each.
    // Bin 3 fails on its first search in each of its 4 trials.
    assert_eq!(search.calls.load(Ordering::SeqCst), 4 * 3 + 4);

    let text = fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    let header = format!("extent,{}", STATISTICS_COLUMNS.join(","));
    assert_eq!(lines[0], header);
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("2,"));
    assert!(lines[2].starts_with("4,"));

    for measured in &outcome.measured {
        let stats = measured.statistics;
        assert_eq!(stats.count, 3);
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        assert!(stats.ci_lower <= stats.mean && stats.mean <= stats.ci_upper);
        // Samples are divided by the rank cutoff.
        assert!(stats.min > 0.0);
    }
}

#[test]
fn sweep_lists_absent_bin_and_still_reports_curated_ones() {
    let dir = tempfile::tempdir().unwrap();
    let layout = curated_fixture(dir.path());
    let curated_root = layout.curated_root.clone();
    let context = SuiteContext {
        layout,
        search: Arc::new(BinAwareSearch {
            calls: AtomicUsize::new(0),
        }),
        parser_options: ParserOptions::benchmark(),
        atom_filter: AtomFilter::Arbitrary,
        parallelism: Parallelism::Sequential,
    };
    let suite = BinnedMotifSuite {
        bins: vec![2, 6],
        ..BinnedMotifSuite::by_size()
    };
    let driver = SweepDriver::new(SweepSettings {
        warmup_iterations: 0,
        measurement_iterations: 2,
        timeout: Duration::from_secs(30),
    });
    let report = dir.path().join("results_size.csv");

    let outcome = driver
        .run_to_file(&suite, &context, &report, &ProgressReporter::new())
        .unwrap();

    assert_eq!(outcome.rows.len(), 1);
    assert_eq!(outcome.missing.len(), 1);
    assert_eq!(outcome.missing[0].point.to_string(), "size=6");
    assert_eq!(
        outcome.missing[0].reason,
        MissingReason::MissingInput(curated_root.join("size").join("size_6"))
    );

    let text = fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("2,"));
}

#[test]
fn sweep_without_chain_list_fails_before_writing_a_report() {
    let dir = tempfile::tempdir().unwrap();
    let layout = curated_fixture(dir.path());
    let context = SuiteContext {
        layout,
        search: Arc::new(BinAwareSearch {
            calls: AtomicUsize::new(0),
        }),
        parser_options: ParserOptions::benchmark(),
        atom_filter: AtomFilter::Arbitrary,
        parallelism: Parallelism::Sequential,
    };
    let suite = BinnedMotifSuite {
        bins: vec![2],
        chain_list_size: 250,
        ..BinnedMotifSuite::by_size()
    };
    let report = dir.path().join("results_size.csv");

    let result = SweepDriver::new(SweepSettings::default()).run_to_file(
        &suite,
        &context,
        &report,
        &ProgressReporter::new(),
    );

    assert!(result.is_err());
    assert!(!report.exists());
}
