//! The external search algorithm, consumed through [`SearchAlgorithm`].
//!
//! [`CommandSearch`] runs any executable as the search collaborator, rendering its
//! arguments from a template. [`SearchOperation`] adapts a search plus its prepared
//! requests into the [`MeasuredOperation`] the sampler times.

use super::error::SearchError;
use super::sampling::{Cancellation, MeasuredOperation};
use crate::core::models::motif::Motif;
use serde::Deserialize;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Where target structures are loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataSource {
    Pdb,
    Mmtf,
}

impl DataSource {
    pub fn name(self) -> &'static str {
        match self {
            DataSource::Pdb => "PDB",
            DataSource::Mmtf => "MMTF",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PDB" => Ok(DataSource::Pdb),
            "MMTF" => Ok(DataSource::Mmtf),
            other => Err(format!("Unknown data source '{}'. Expected PDB or MMTF.", other)),
        }
    }
}

/// Which atoms of each residue take part in the superposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AtomFilter {
    #[default]
    Arbitrary,
    AlphaCarbon,
    Backbone,
    SideChain,
}

impl AtomFilter {
    pub fn name(self) -> &'static str {
        match self {
            AtomFilter::Arbitrary => "arbitrary",
            AtomFilter::AlphaCarbon => "alpha-carbon",
            AtomFilter::Backbone => "backbone",
            AtomFilter::SideChain => "side-chain",
        }
    }
}

/// Thread budget the search may use internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    Sequential,
    Threads(usize),
    /// One thread per available hardware thread.
    #[default]
    Maximal,
}

impl Parallelism {
    pub fn threads(self) -> usize {
        match self {
            Parallelism::Sequential => 1,
            Parallelism::Threads(n) => n.max(1),
            Parallelism::Maximal => thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Everything one search invocation needs.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query_path: PathBuf,
    pub query: Arc<Motif>,
    pub chain_list: PathBuf,
    pub source: DataSource,
    pub pdb_root: PathBuf,
    pub atom_filter: AtomFilter,
    pub environment_radius: Option<f64>,
    pub parallelism: Parallelism,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchSet {
    /// Number of matches, when the search reports it.
    pub match_count: Option<usize>,
}

pub trait SearchAlgorithm: Send + Sync {
    fn run(&self, request: &SearchRequest, cancel: &Cancellation) -> Result<MatchSet, SearchError>;
}

/// Runs an external program per search.
///
/// Arguments are rendered from templates with the placeholders `{query}`,
/// `{chain-list}`, `{source}`, `{pdb-root}`, `{atom-filter}`, `{exchanges}`,
/// `{radius}` and `{threads}`. `environment_args` are appended only when the request
/// carries an environment radius. The match count is the last integer printed on
/// standard output, if any.
#[derive(Debug, Clone)]
pub struct CommandSearch {
    program: PathBuf,
    args: Vec<String>,
    environment_args: Vec<String>,
    poll_interval: Duration,
}

impl CommandSearch {
    pub fn new(program: PathBuf, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            environment_args: Vec::new(),
            poll_interval: Duration::from_millis(10),
        }
    }

    pub fn with_environment_args(mut self, args: Vec<String>) -> Self {
        self.environment_args = args;
        self
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    pub fn render_args(&self, request: &SearchRequest) -> Vec<String> {
        let radius = request
            .environment_radius
            .map(|r| format!("{:?}", r))
            .unwrap_or_default();
        let substitutions = [
            ("{query}", request.query_path.display().to_string()),
            ("{chain-list}", request.chain_list.display().to_string()),
            ("{source}", request.source.name().to_string()),
            ("{pdb-root}", request.pdb_root.display().to_string()),
            ("{atom-filter}", request.atom_filter.name().to_string()),
            ("{exchanges}", render_exchanges(&request.query)),
            ("{radius}", radius),
            ("{threads}", request.parallelism.threads().to_string()),
        ];

        let environment: &[String] = if request.environment_radius.is_some() {
            &self.environment_args
        } else {
            &[]
        };
        self.args
            .iter()
            .chain(environment)
            .map(|template| {
                substitutions
                    .iter()
                    .fold(template.clone(), |arg, (placeholder, value)| {
                        arg.replace(placeholder, value)
                    })
            })
            .collect()
    }
}

/// `A-164:H;A-247:DN` for the exchangeable families of a query motif.
fn render_exchanges(motif: &Motif) -> String {
    motif
        .exchangeable_families()
        .iter()
        .map(|(leaf, families)| {
            let codes: String = families.iter().map(|f| f.one_letter_code()).collect();
            format!("{}:{}", leaf, codes)
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn read_to_string_in_background<R: Read + Send + 'static>(
    stream: Option<R>,
) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_string(&mut buffer);
        }
        buffer
    })
}

/// The last whitespace-separated token of `output` that parses as an integer.
pub fn parse_match_count(output: &str) -> Option<usize> {
    output
        .split_whitespace()
        .rev()
        .find_map(|token| token.parse().ok())
}

impl SearchAlgorithm for CommandSearch {
    fn run(&self, request: &SearchRequest, cancel: &Cancellation) -> Result<MatchSet, SearchError> {
        let args = self.render_args(request);
        debug!(program = %self.program.display(), ?args, "Launching search.");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SearchError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;
        let stdout = read_to_string_in_background(child.stdout.take());
        let stderr = read_to_string_in_background(child.stderr.take());

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SearchError::Cancelled);
            }
            thread::sleep(self.poll_interval);
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        if !status.success() {
            return Err(SearchError::Failed {
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(MatchSet {
            match_count: parse_match_count(&stdout),
        })
    }
}

/// Searches with every prepared request in turn as one measured invocation.
pub struct SearchOperation {
    algorithm: Arc<dyn SearchAlgorithm>,
    requests: Vec<SearchRequest>,
}

impl SearchOperation {
    pub fn new(algorithm: Arc<dyn SearchAlgorithm>, requests: Vec<SearchRequest>) -> Self {
        Self {
            algorithm,
            requests,
        }
    }

    pub fn requests(&self) -> &[SearchRequest] {
        &self.requests
    }
}

impl MeasuredOperation for SearchOperation {
    fn invoke(&self, cancel: &Cancellation) -> Result<Option<usize>, SearchError> {
        let mut total = Some(0);
        for request in &self.requests {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }
            let matches = self.algorithm.run(request, cancel)?;
            total = total.zip(matches.match_count).map(|(a, b)| a + b);
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::{LeafIdentifier, Residue, ResidueFamily};
    use std::sync::Mutex;

    fn request(radius: Option<f64>) -> SearchRequest {
        let mut motif = Motif::new(
            "KDEEH",
            vec![
                Residue::new(LeafIdentifier::new('A', 164), "GLU", false),
                Residue::new(LeafIdentifier::new('A', 247), "ASP", false),
            ],
        );
        motif
            .add_exchangeable_family(LeafIdentifier::new('A', 164), ResidueFamily::Histidine)
            .unwrap();
        motif
            .add_exchangeable_family(LeafIdentifier::new('A', 247), ResidueFamily::AsparticAcid)
            .unwrap();
        motif
            .add_exchangeable_family(LeafIdentifier::new('A', 247), ResidueFamily::Asparagine)
            .unwrap();
        SearchRequest {
            query_path: PathBuf::from("motif_KDEEH.pdb"),
            query: Arc::new(motif),
            chain_list: PathBuf::from("chains_250.txt"),
            source: DataSource::Mmtf,
            pdb_root: PathBuf::from("/srv/pdb"),
            atom_filter: AtomFilter::Arbitrary,
            environment_radius: radius,
            parallelism: Parallelism::Threads(4),
        }
    }

    fn search() -> CommandSearch {
        CommandSearch::new(
            PathBuf::from("fit3d"),
            vec![
                "--query={query}".into(),
                "--targets".into(),
                "{chain-list}".into(),
                "--source={source}".into(),
                "--pdb={pdb-root}".into(),
                "--atoms={atom-filter}".into(),
                "--exchanges={exchanges}".into(),
                "--threads={threads}".into(),
            ],
        )
        .with_environment_args(vec!["--filter-environments".into(), "{radius}".into()])
    }

    #[test]
    fn render_args_substitutes_placeholders() {
        let args = search().render_args(&request(None));
        assert_eq!(
            args,
            vec![
                "--query=motif_KDEEH.pdb",
                "--targets",
                "chains_250.txt",
                "--source=MMTF",
                "--pdb=/srv/pdb",
                "--atoms=arbitrary",
                "--exchanges=A-164:H;A-247:ND",
                "--threads=4",
            ]
        );
    }

    #[test]
    fn render_args_appends_environment_args_only_with_radius() {
        let args = search().render_args(&request(Some(8.0)));
        assert_eq!(&args[args.len() - 2..], ["--filter-environments", "8.0"]);
        assert_eq!(search().render_args(&request(None)).len(), 8);
    }

    #[test]
    fn parse_match_count_takes_last_integer() {
        assert_eq!(parse_match_count("found 3 candidates\nmatches: 17\n"), Some(17));
        assert_eq!(parse_match_count("done"), None);
        assert_eq!(parse_match_count(""), None);
    }

    #[test]
    fn data_source_parses_case_insensitively() {
        assert_eq!("mmtf".parse::<DataSource>(), Ok(DataSource::Mmtf));
        assert_eq!("PDB".parse::<DataSource>(), Ok(DataSource::Pdb));
        assert!("cif".parse::<DataSource>().is_err());
    }

    #[test]
    fn parallelism_always_has_at_least_one_thread() {
        assert_eq!(Parallelism::Sequential.threads(), 1);
        assert_eq!(Parallelism::Threads(0).threads(), 1);
        assert!(Parallelism::Maximal.threads() >= 1);
    }

    struct RecordingSearch {
        seen: Mutex<Vec<PathBuf>>,
        matches: Option<usize>,
    }

    impl SearchAlgorithm for RecordingSearch {
        fn run(&self, request: &SearchRequest, _: &Cancellation) -> Result<MatchSet, SearchError> {
            self.seen.lock().unwrap().push(request.query_path.clone());
            Ok(MatchSet {
                match_count: self.matches,
            })
        }
    }

    #[test]
    fn search_operation_runs_every_request_and_sums_matches() {
        let algorithm = Arc::new(RecordingSearch {
            seen: Mutex::new(Vec::new()),
            matches: Some(2),
        });
        let mut second = request(None);
        second.query_path = PathBuf::from("second.pdb");
        let operation = SearchOperation::new(algorithm.clone(), vec![request(None), second]);

        assert_eq!(operation.invoke(&Cancellation::new()).unwrap(), Some(4));
        assert_eq!(algorithm.seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn search_operation_reports_unknown_count_when_search_does_not() {
        let algorithm = Arc::new(RecordingSearch {
            seen: Mutex::new(Vec::new()),
            matches: None,
        });
        let operation = SearchOperation::new(algorithm, vec![request(None)]);
        assert_eq!(operation.invoke(&Cancellation::new()).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn command_search_reads_match_count_from_stdout() {
        let search = CommandSearch::new(
            PathBuf::from("sh"),
            vec!["-c".into(), "echo matches: 12".into()],
        );
        let matches = search.run(&request(None), &Cancellation::new()).unwrap();
        assert_eq!(matches.match_count, Some(12));
    }

    #[cfg(unix)]
    #[test]
    fn command_search_reports_non_zero_exit() {
        let search = CommandSearch::new(
            PathBuf::from("sh"),
            vec!["-c".into(), "echo broken >&2; exit 3".into()],
        );
        match search.run(&request(None), &Cancellation::new()) {
            Err(SearchError::Failed { stderr, .. }) => assert_eq!(stderr, "broken"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn command_search_kills_child_when_cancelled() {
        let search = CommandSearch::new(PathBuf::from("sleep"), vec!["30".into()]);
        let cancel = Cancellation::new();
        let trigger = cancel.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            trigger.cancel();
        });
        let started = std::time::Instant::now();
        let result = search.run(&request(None), &cancel);
        handle.join().unwrap();
        assert!(matches!(result, Err(SearchError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn command_search_reports_missing_program() {
        let search = CommandSearch::new(PathBuf::from("/nonexistent/fitbench-search"), Vec::new());
        assert!(matches!(
            search.run(&request(None), &Cancellation::new()),
            Err(SearchError::Spawn { .. })
        ));
    }
}
