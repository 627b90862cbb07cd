use super::classify::{ClassifiedMotif, Dimension};
use super::config::{CurationConfig, CurationMode};
use super::error::CurationError;
use super::filter::{MotifFilter, Rejection};
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::{LocalStructureSource, StructureFile, StructureSource};
use crate::progress::{Progress, ProgressReporter};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const MOTIF_EXTENSIONS: [&str; 2] = ["pdb", "ent"];
const ENUMERATED_DIRECTORY: &str = "enumerated";

/// Counts gathered over one curation run. Rejections are only counted here and in the
/// log; they are never written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurationSummary {
    pub scanned: usize,
    pub accepted: usize,
    pub rejected_extent: usize,
    pub rejected_size: usize,
    pub failed: usize,
    pub written: usize,
}

impl CurationSummary {
    pub fn rejected(&self) -> usize {
        self.rejected_extent + self.rejected_size
    }
}

/// What happened to a single corpus file.
#[derive(Debug)]
pub enum Outcome {
    Accepted(Box<ClassifiedMotif>),
    Rejected(Rejection),
    Failed(String),
}

/// A curated motif and the file it is written to.
#[derive(Debug, Clone)]
pub struct CuratedEntry<'a> {
    pub motif: &'a ClassifiedMotif,
    pub destination: PathBuf,
}

/// Drives Structure Source → filter → classifier → serialization over a whole corpus.
pub struct DatasetCurator<S = LocalStructureSource> {
    config: CurationConfig,
    filter: MotifFilter,
    source: S,
}

impl DatasetCurator<LocalStructureSource> {
    pub fn new(config: CurationConfig) -> Self {
        Self::with_source(config, LocalStructureSource)
    }
}

impl<S: StructureSource> DatasetCurator<S> {
    pub fn with_source(config: CurationConfig, source: S) -> Self {
        Self {
            filter: MotifFilter::from_config(&config),
            config,
            source,
        }
    }

    pub fn config(&self) -> &CurationConfig {
        &self.config
    }

    /// Curates every motif file below `corpus` into the configured output layouts.
    ///
    /// Unparsable files and rejected motifs are logged and counted; only failures to
    /// read the corpus directory or to write curated files abort the run.
    #[instrument(skip_all, name = "curation_workflow")]
    pub fn run(
        &self,
        corpus: &Path,
        reporter: &ProgressReporter,
    ) -> Result<CurationSummary, CurationError> {
        reporter.report(Progress::PhaseStart {
            name: "Scanning Corpus",
        });
        let files = collect_corpus(corpus, Some(self.config.output_root.as_path()))?;
        info!(corpus = %corpus.display(), files = files.len(), "Collected motif corpus.");
        reporter.report(Progress::PhaseFinish);

        reporter.report(Progress::PhaseStart { name: "Filtering" });
        reporter.report(Progress::TaskStart {
            total: files.len() as u64,
        });
        let outcomes: Vec<Outcome> = files
            .par_iter()
            .map(|path| {
                let outcome = self.process(path);
                reporter.report(Progress::TaskIncrement { amount: 1 });
                outcome
            })
            .collect();
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);

        let mut summary = CurationSummary {
            scanned: files.len(),
            ..Default::default()
        };
        let mut accepted = Vec::new();
        for outcome in outcomes {
            match outcome {
                Outcome::Accepted(motif) => accepted.push(*motif),
                Outcome::Rejected(Rejection::ExtentExceeded { .. }) => {
                    summary.rejected_extent += 1
                }
                Outcome::Rejected(Rejection::SizeOutOfBounds { .. }) => summary.rejected_size += 1,
                Outcome::Failed(_) => summary.failed += 1,
            }
        }
        summary.accepted = accepted.len();
        info!(
            accepted = summary.accepted,
            rejected = summary.rejected(),
            failed = summary.failed,
            "Filtering complete."
        );

        for &mode in &self.config.modes {
            let entries = plan(&accepted, mode, &self.config.output_root);
            reporter.report(Progress::PhaseStart {
                name: phase_name(mode),
            });
            reporter.report(Progress::TaskStart {
                total: entries.len() as u64,
            });
            summary.written += write_entries(&entries, reporter)?;
            reporter.report(Progress::TaskFinish);
            reporter.report(Progress::PhaseFinish);
        }

        info!(
            written = summary.written,
            output = %self.config.output_root.display(),
            "Curation complete."
        );
        Ok(summary)
    }

    /// Parses, filters and classifies one corpus file.
    pub fn process(&self, path: &Path) -> Outcome {
        let motif = match self.source.parse(path, &self.config.parser_options) {
            Ok(motif) => motif,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse motif, skipping.");
                return Outcome::Failed(e.to_string());
            }
        };

        let extent = motif.extent_with(self.filter.reference());
        if let Err(rejection) = self.filter.evaluate_measured(motif.size(), extent) {
            info!(
                path = %path.display(),
                reason = %rejection,
                "Skipping motif that does not meet filter criteria."
            );
            return Outcome::Rejected(rejection);
        }

        match ClassifiedMotif::new(path.to_path_buf(), motif, extent) {
            Ok(classified) => {
                debug!(
                    path = %path.display(),
                    size = classified.size,
                    extent = classified.extent,
                    "Accepted motif."
                );
                Outcome::Accepted(Box::new(classified))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to serialize motif, skipping.");
                Outcome::Failed(e.to_string())
            }
        }
    }
}

fn phase_name(mode: CurationMode) -> &'static str {
    match mode {
        CurationMode::Grouped(Dimension::Size) => "Writing Size Buckets",
        CurationMode::Grouped(Dimension::Extent) => "Writing Extent Buckets",
        CurationMode::Enumerated => "Writing Enumeration",
    }
}

/// Lists motif files below `corpus` in sorted order, skipping anything under `exclude`.
///
/// Directories are compared by canonical path, so differently spelled paths to the
/// excluded directory still match.
pub fn collect_corpus(corpus: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>, CurationError> {
    if !corpus.is_dir() {
        return Err(CurationError::CorpusNotFound(corpus.to_path_buf()));
    }

    // An exclusion that does not exist yet cannot contain corpus files.
    let excluded = exclude.and_then(|path| fs::canonicalize(path).ok());

    let mut files = Vec::new();
    let mut pending = vec![corpus.to_path_buf()];
    while let Some(dir) = pending.pop() {
        if let Some(excluded) = &excluded {
            if fs::canonicalize(&dir).is_ok_and(|canonical| canonical.starts_with(excluded)) {
                debug!(path = %dir.display(), "Skipping curation output inside the corpus.");
                continue;
            }
        }
        let read_dir = fs::read_dir(&dir).map_err(|source| CurationError::CorpusRead {
            path: dir.clone(),
            source,
        })?;
        for entry in read_dir {
            let path = entry
                .map_err(|source| CurationError::CorpusRead {
                    path: dir.clone(),
                    source,
                })?
                .path();
            if path.is_dir() {
                pending.push(path);
            } else if has_motif_extension(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn has_motif_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MOTIF_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Assigns every accepted motif its destination path for one output layout.
///
/// Grouped layouts name files by motif identity; identities shared by several motifs
/// in one bucket get the first eight hex digits of the content digest appended.
/// Enumerated layouts name files by 1-based rank in enumeration order.
pub fn plan<'a>(
    accepted: &'a [ClassifiedMotif],
    mode: CurationMode,
    output_root: &Path,
) -> Vec<CuratedEntry<'a>> {
    match mode {
        CurationMode::Grouped(dimension) => plan_grouped(accepted, dimension, output_root),
        CurationMode::Enumerated => plan_enumerated(accepted, output_root),
    }
}

fn plan_grouped<'a>(
    accepted: &'a [ClassifiedMotif],
    dimension: Dimension,
    output_root: &Path,
) -> Vec<CuratedEntry<'a>> {
    let mut buckets: BTreeMap<u64, Vec<(String, &'a ClassifiedMotif)>> = BTreeMap::new();
    for motif in accepted {
        buckets
            .entry(motif.bucket_key(dimension))
            .or_default()
            .push((sanitize_file_stem(&motif.motif.identity()), motif));
    }

    let mut entries = Vec::with_capacity(accepted.len());
    for (key, mut members) in buckets {
        let directory = output_root.join(dimension.bucket_directory(key));
        members.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.digest.cmp(&b.1.digest)));

        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for (identity, _) in &members {
            *occurrences.entry(identity.as_str()).or_default() += 1;
        }

        let start = entries.len();
        for (identity, motif) in &members {
            let stem = if occurrences[identity.as_str()] > 1 {
                format!("{}_{}", identity, motif.digest.short())
            } else {
                identity.clone()
            };
            entries.push(CuratedEntry {
                motif: *motif,
                destination: directory.join(format!("{}.pdb", stem)),
            });
        }
        // Identical content yields identical paths; keep one copy.
        let mut bucket_entries = entries.split_off(start);
        bucket_entries.dedup_by(|a, b| a.destination == b.destination);
        entries.extend(bucket_entries);
    }
    entries
}

fn plan_enumerated<'a>(accepted: &'a [ClassifiedMotif], output_root: &Path) -> Vec<CuratedEntry<'a>> {
    let mut ordered: Vec<&ClassifiedMotif> = accepted.iter().collect();
    ordered.sort_by_key(|motif| motif.enumeration_key());

    let directory = output_root.join(ENUMERATED_DIRECTORY);
    ordered
        .into_iter()
        .enumerate()
        .map(|(index, motif)| CuratedEntry {
            motif,
            destination: directory.join(format!("{}.pdb", index + 1)),
        })
        .collect()
}

fn sanitize_file_stem(identity: &str) -> String {
    identity
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Writes the entries, one rayon task per destination directory.
fn write_entries(
    entries: &[CuratedEntry],
    reporter: &ProgressReporter,
) -> Result<usize, CurationError> {
    let mut by_directory: BTreeMap<&Path, Vec<&CuratedEntry>> = BTreeMap::new();
    for entry in entries {
        let directory = entry.destination.parent().unwrap_or(Path::new("."));
        by_directory.entry(directory).or_default().push(entry);
    }
    let groups: Vec<(&Path, Vec<&CuratedEntry>)> = by_directory.into_iter().collect();

    let written = groups
        .par_iter()
        .map(|(directory, group)| {
            fs::create_dir_all(directory).map_err(|source| CurationError::CreateDirectory {
                path: directory.to_path_buf(),
                source,
            })?;
            for entry in group {
                PdbFile::write_to_path(&entry.motif.motif, &entry.destination).map_err(
                    |source| CurationError::Write {
                        path: entry.destination.clone(),
                        source,
                    },
                )?;
                reporter.report(Progress::TaskIncrement { amount: 1 });
            }
            debug!(directory = %directory.display(), files = group.len(), "Wrote bucket.");
            Ok(group.len())
        })
        .collect::<Result<Vec<usize>, CurationError>>()?;

    Ok(written.into_iter().sum())
}
