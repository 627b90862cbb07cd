//! The four sweep classes of the harness.
//!
//! A [`Suite`] declares its parameter grid and, per configuration point, prepares a
//! [`PreparedPoint`]: the measured operation with all inputs already loaded, plus the
//! point's report fields. A point whose curated input is absent is reported as
//! missing; other preparation failures abort the sweep before any trial runs.

use super::config::{
    DEFAULT_ENVIRONMENT_RADIUS, DEFAULT_ENVIRONMENT_TIMEOUT, DEFAULT_EXTENT_RANK_CUTOFF,
    DEFAULT_SINGLE_MOTIF_RADIUS,
};
use super::error::BenchmarkError;
use super::grid::{ConfigurationPoint, ParamValue, ParameterGrid};
use super::inputs::{DataLayout, QueryMotif};
use super::report::ReportClass;
use super::sampling::MeasuredOperation;
use super::search::{AtomFilter, DataSource, Parallelism, SearchAlgorithm, SearchOperation, SearchRequest};
use crate::core::io::options::ParserOptions;
use crate::core::models::residue::{LeafIdentifier, ResidueFamily};
use crate::curation::classify::Dimension;
use crate::curation::config::DEFAULT_EXTENT_CUTOFF;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A report column value; `MatchCount` is filled in after measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum RowField {
    Value(ParamValue),
    MatchCount,
}

pub struct PreparedPoint {
    pub operation: Arc<dyn MeasuredOperation>,
    pub operations_per_invocation: u32,
    pub fields: Vec<RowField>,
}

/// Shared collaborators and settings available while preparing points.
pub struct SuiteContext {
    pub layout: DataLayout,
    pub search: Arc<dyn SearchAlgorithm>,
    pub parser_options: ParserOptions,
    pub atom_filter: AtomFilter,
    pub parallelism: Parallelism,
}

impl SuiteContext {
    fn request(
        &self,
        query: &QueryMotif,
        chain_list: PathBuf,
        source: DataSource,
        environment_radius: Option<f64>,
    ) -> SearchRequest {
        SearchRequest {
            query_path: query.path.clone(),
            query: Arc::new(query.motif.clone()),
            chain_list,
            source,
            pdb_root: self.layout.pdb_root.clone(),
            atom_filter: self.atom_filter,
            environment_radius,
            parallelism: self.parallelism,
        }
    }
}

pub trait Suite: Send + Sync {
    fn report_class(&self) -> ReportClass;

    fn grid(&self) -> Result<ParameterGrid, BenchmarkError>;

    fn prepare(
        &self,
        point: &ConfigurationPoint,
        context: &SuiteContext,
    ) -> Result<PreparedPoint, BenchmarkError>;

    /// Per-trial timeout overriding the sweep default.
    fn timeout(&self) -> Option<Duration> {
        None
    }
}

fn to_u32(value: i64, point: &ConfigurationPoint, name: &'static str) -> Result<u32, BenchmarkError> {
    u32::try_from(value).map_err(|_| BenchmarkError::MissingParameter {
        point: point.to_string(),
        name,
    })
}

/// One query motif with substitution sets against chain lists of growing size.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleMotifSuite {
    pub query: PathBuf,
    pub exchanges: Vec<(LeafIdentifier, ResidueFamily)>,
    pub sources: Vec<DataSource>,
    pub dataset_sizes: Vec<u32>,
    pub environment_radius: f64,
}

impl SingleMotifSuite {
    pub fn default_dataset_sizes() -> Vec<u32> {
        (1..=8).map(|i| i * 250).collect()
    }

    /// Exchanges of the KDEEH enolase motif.
    pub fn default_exchanges() -> Vec<(LeafIdentifier, ResidueFamily)> {
        vec![
            (LeafIdentifier::new('A', 164), ResidueFamily::Histidine),
            (LeafIdentifier::new('A', 247), ResidueFamily::AsparticAcid),
            (LeafIdentifier::new('A', 247), ResidueFamily::Asparagine),
            (LeafIdentifier::new('A', 297), ResidueFamily::Lysine),
        ]
    }

    pub fn new(query: PathBuf) -> Self {
        Self {
            query,
            exchanges: Self::default_exchanges(),
            sources: vec![DataSource::Pdb, DataSource::Mmtf],
            dataset_sizes: Self::default_dataset_sizes(),
            environment_radius: DEFAULT_SINGLE_MOTIF_RADIUS,
        }
    }
}

impl Suite for SingleMotifSuite {
    fn report_class(&self) -> ReportClass {
        ReportClass::SingleMotif
    }

    fn grid(&self) -> Result<ParameterGrid, BenchmarkError> {
        ParameterGrid::new()
            .axis("parsing", self.sources.iter().map(|s| s.name()))?
            .axis("dataset_size", self.dataset_sizes.iter().copied())
    }

    fn prepare(
        &self,
        point: &ConfigurationPoint,
        context: &SuiteContext,
    ) -> Result<PreparedPoint, BenchmarkError> {
        let source: DataSource = point
            .require_text("parsing")?
            .parse()
            .map_err(|_| BenchmarkError::MissingParameter {
                point: point.to_string(),
                name: "parsing",
            })?;
        let dataset_size = to_u32(point.require_int("dataset_size")?, point, "dataset_size")?;

        let chain_list = context.layout.load_chain_list(dataset_size, point)?;
        let mut query = context
            .layout
            .load_motif(&self.query, &context.parser_options, point)?;
        for &(leaf, family) in &self.exchanges {
            query
                .motif
                .add_exchangeable_family(leaf, family)
                .map_err(|e| BenchmarkError::QueryMotif {
                    path: self.query.clone(),
                    reason: e.to_string(),
                })?;
        }

        let request = context.request(
            &query,
            chain_list.path().to_path_buf(),
            source,
            Some(self.environment_radius),
        );
        Ok(PreparedPoint {
            operation: Arc::new(SearchOperation::new(Arc::clone(&context.search), vec![request])),
            operations_per_invocation: 1,
            fields: vec![
                RowField::Value(ParamValue::Text(source.name().to_string())),
                RowField::Value(ParamValue::Int(dataset_size.into())),
            ],
        })
    }
}

/// Curated size or extent bins, each measured as a batch of its smallest-extent motifs.
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedMotifSuite {
    pub dimension: Dimension,
    pub bins: Vec<u32>,
    pub rank_cutoff: usize,
    pub chain_list_size: u32,
    pub source: DataSource,
}

impl BinnedMotifSuite {
    pub fn by_size() -> Self {
        Self {
            dimension: Dimension::Size,
            bins: (2..=6).collect(),
            rank_cutoff: DEFAULT_EXTENT_RANK_CUTOFF,
            chain_list_size: 500,
            source: DataSource::Mmtf,
        }
    }

    pub fn by_extent() -> Self {
        Self::by_extent_up_to(DEFAULT_EXTENT_CUTOFF)
    }

    /// Extent bins from 5 up to the last bin a curation run with `extent_cutoff` can fill.
    pub fn by_extent_up_to(extent_cutoff: f64) -> Self {
        let last = if extent_cutoff.is_finite() && extent_cutoff >= 0.0 {
            extent_cutoff.floor().min(f64::from(u32::MAX)) as u32
        } else {
            0
        };
        Self {
            dimension: Dimension::Extent,
            bins: (5..=last).collect(),
            ..Self::by_size()
        }
    }

    fn axis_name(&self) -> &'static str {
        match self.dimension {
            Dimension::Size => "size",
            Dimension::Extent => "extent",
        }
    }
}

impl Suite for BinnedMotifSuite {
    fn report_class(&self) -> ReportClass {
        match self.dimension {
            Dimension::Size => ReportClass::MotifBySize,
            Dimension::Extent => ReportClass::MotifByExtent,
        }
    }

    fn grid(&self) -> Result<ParameterGrid, BenchmarkError> {
        ParameterGrid::new().axis(self.axis_name(), self.bins.iter().copied())
    }

    fn prepare(
        &self,
        point: &ConfigurationPoint,
        context: &SuiteContext,
    ) -> Result<PreparedPoint, BenchmarkError> {
        let name = self.axis_name();
        let bin = to_u32(point.require_int(name)?, point, name)?;

        let chain_list = context.layout.load_chain_list(self.chain_list_size, point)?;
        let motifs = context.layout.load_bin(
            self.dimension,
            bin.into(),
            self.rank_cutoff,
            &context.parser_options,
            point,
        )?;
        let requests = motifs
            .iter()
            .map(|query| context.request(query, chain_list.path().to_path_buf(), self.source, None))
            .collect();

        Ok(PreparedPoint {
            operation: Arc::new(SearchOperation::new(Arc::clone(&context.search), requests)),
            operations_per_invocation: u32::try_from(self.rank_cutoff).unwrap_or(u32::MAX),
            fields: vec![RowField::Value(ParamValue::Int(bin.into()))],
        })
    }
}

/// Enumerated motifs searched with and without environment filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentFilteringSuite {
    pub ranks: Vec<u32>,
    pub environment_radius: f64,
    pub chain_list_size: u32,
    pub source: DataSource,
    pub timeout: Option<Duration>,
}

impl EnvironmentFilteringSuite {
    pub fn new(ranks: Vec<u32>) -> Self {
        Self {
            ranks,
            environment_radius: DEFAULT_ENVIRONMENT_RADIUS,
            chain_list_size: 10,
            source: DataSource::Mmtf,
            timeout: Some(DEFAULT_ENVIRONMENT_TIMEOUT),
        }
    }
}

impl Suite for EnvironmentFilteringSuite {
    fn report_class(&self) -> ReportClass {
        ReportClass::EnvironmentFiltering
    }

    fn grid(&self) -> Result<ParameterGrid, BenchmarkError> {
        ParameterGrid::new()
            .axis("enumeration", self.ranks.iter().copied())?
            .axis("environment_filtering", [true, false])
    }

    fn prepare(
        &self,
        point: &ConfigurationPoint,
        context: &SuiteContext,
    ) -> Result<PreparedPoint, BenchmarkError> {
        let rank = to_u32(point.require_int("enumeration")?, point, "enumeration")?;
        let filtering = point.require_bool("environment_filtering")?;

        let chain_list = context.layout.load_chain_list(self.chain_list_size, point)?;
        let path = context.layout.enumerated_motif_path(rank);
        let query = context
            .layout
            .load_motif(&path, &context.parser_options, point)?;

        let radius = filtering.then_some(self.environment_radius);
        let request = context.request(&query, chain_list.path().to_path_buf(), self.source, radius);

        let size = i64::try_from(query.motif.size()).unwrap_or(i64::MAX);
        let label_count = i64::try_from(query.motif.label_count()).unwrap_or(i64::MAX);
        Ok(PreparedPoint {
            operation: Arc::new(SearchOperation::new(Arc::clone(&context.search), vec![request])),
            operations_per_invocation: 1,
            fields: vec![
                RowField::Value(ParamValue::Int(rank.into())),
                RowField::Value(ParamValue::Bool(filtering)),
                RowField::MatchCount,
                RowField::Value(ParamValue::Int(size)),
                RowField::Value(ParamValue::Float(query.extent)),
                RowField::Value(ParamValue::Int(label_count)),
            ],
        })
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::error::SearchError;
    use crate::benchmark::sampling::Cancellation;
    use crate::benchmark::search::MatchSet;
    use crate::core::io::pdb::PdbFile;
    use crate::core::io::traits::StructureFile;
    use crate::core::models::atom::Atom;
    use crate::core::models::motif::Motif;
    use crate::core::models::residue::Residue;
    use nalgebra::Point3;
    use std::fs;
    use std::path::Path;

    struct NoSearch;

    impl SearchAlgorithm for NoSearch {
        fn run(&self, _: &SearchRequest, _: &Cancellation) -> Result<MatchSet, SearchError> {
            Ok(MatchSet::default())
        }
    }

    fn context(root: &Path) -> SuiteContext {
        SuiteContext {
            layout: DataLayout::new(root.join("data"), root.join("curated"), root.join("pdb")),
            search: Arc::new(NoSearch),
            parser_options: ParserOptions::benchmark(),
            atom_filter: AtomFilter::Arbitrary,
            parallelism: Parallelism::Sequential,
        }
    }

    fn write_chain_list(context: &SuiteContext, size: u32) {
        let path = context.layout.chain_list_path(size);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "1abc\tA\n2xyz\tB\n").unwrap();
    }

    fn write_motif(path: &Path, residues: &[(isize, &str, f64)]) {
        let residues = residues
            .iter()
            .map(|&(serial, name, x)| {
                Residue::new(LeafIdentifier::new('A', serial), name, false).with_atoms(vec![
                    Atom::new(serial as usize, "CA", "C", Point3::new(x, 0.0, 0.0)),
                ])
            })
            .collect();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        PdbFile::write_to_path(&Motif::new("1KDE", residues), path).unwrap();
    }

    #[test]
    fn single_motif_grid_covers_sources_and_dataset_sizes() {
        let grid = SingleMotifSuite::new(PathBuf::from("motif_KDEEH.pdb"))
            .grid()
            .unwrap();
        let points = grid.points();
        assert_eq!(points.len(), 16);
        assert_eq!(points[0].to_string(), "parsing=PDB, dataset_size=250");
        assert_eq!(points[15].to_string(), "parsing=MMTF, dataset_size=2000");
    }

    #[test]
    fn binned_grids_use_declared_bins() {
        assert_eq!(BinnedMotifSuite::by_size().grid().unwrap().len(), 5);
        let extent = BinnedMotifSuite::by_extent();
        assert_eq!(extent.bins, (5..=15).collect::<Vec<_>>());
        assert_eq!(extent.grid().unwrap().len(), 11);
        assert_eq!(extent.report_class(), ReportClass::MotifByExtent);
        assert_eq!(extent.grid().unwrap().axis_names(), vec!["extent"]);
    }

    #[test]
    fn extent_bins_stop_at_the_curation_cutoff() {
        assert_eq!(BinnedMotifSuite::by_extent_up_to(12.5).bins, vec![5, 6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(BinnedMotifSuite::by_extent_up_to(20.0).bins.last(), Some(&20));
        assert!(BinnedMotifSuite::by_extent_up_to(4.0).bins.is_empty());
    }

    #[test]
    fn environment_grid_pairs_each_rank_with_both_filter_settings() {
        let suite = EnvironmentFilteringSuite::new(vec![1, 2]);
        let rendered: Vec<String> = suite
            .grid()
            .unwrap()
            .points()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(
            rendered,
            vec![
                "enumeration=1, environment_filtering=true",
                "enumeration=1, environment_filtering=false",
                "enumeration=2, environment_filtering=true",
                "enumeration=2, environment_filtering=false",
            ]
        );
        assert_eq!(suite.timeout(), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn single_motif_prepare_attaches_exchanges_and_radius() {
        let dir = tempfile::tempdir().unwrap();
        let context = context(dir.path());
        write_chain_list(&context, 250);
        let query = dir.path().join("data/motif_KDEEH.pdb");
        write_motif(
            &query,
            &[(164, "GLU", 0.0), (247, "GLU", 3.0), (297, "LYS", 6.0)],
        );

        let suite = SingleMotifSuite::new(query);
        let point = suite.grid().unwrap().points().remove(0);
        let prepared = suite.prepare(&point, &context).unwrap();
        assert_eq!(prepared.operations_per_invocation, 1);
        assert_eq!(
            prepared.fields,
            vec![
                RowField::Value(ParamValue::Text("PDB".into())),
                RowField::Value(ParamValue::Int(250)),
            ]
        );
        assert_eq!(prepared.operation.invoke(&Cancellation::new()).unwrap(), None);
    }

    #[test]
    fn single_motif_prepare_rejects_exchange_on_absent_leaf() {
        let dir = tempfile::tempdir().unwrap();
        let context = context(dir.path());
        write_chain_list(&context, 250);
        let query = dir.path().join("data/motif.pdb");
        write_motif(&query, &[(1, "GLU", 0.0), (2, "GLU", 3.0)]);

        let suite = SingleMotifSuite::new(query);
        let point = suite.grid().unwrap().points().remove(0);
        assert!(matches!(
            suite.prepare(&point, &context),
            Err(BenchmarkError::QueryMotif { .. })
        ));
    }

    #[test]
    fn binned_prepare_uses_fixed_operations_per_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let context = context(dir.path());
        write_chain_list(&context, 500);
        let bin = context.layout.bin_directory(Dimension::Size, 2);
        write_motif(&bin.join("only.pdb"), &[(1, "SER", 0.0), (2, "HIS", 4.0)]);

        let suite = BinnedMotifSuite {
            bins: vec![2],
            ..BinnedMotifSuite::by_size()
        };
        let point = suite.grid().unwrap().points().remove(0);
        let prepared = suite.prepare(&point, &context).unwrap();
        assert_eq!(prepared.operations_per_invocation, 3);
        assert_eq!(prepared.fields, vec![RowField::Value(ParamValue::Int(2))]);
    }

    #[test]
    fn environment_prepare_describes_query_motif() {
        let dir = tempfile::tempdir().unwrap();
        let context = context(dir.path());
        write_chain_list(&context, 10);
        write_motif(
            &context.layout.enumerated_motif_path(1),
            &[(1, "ASP", 0.0), (2, "ASP", 2.5), (3, "GLU", 5.5)],
        );

        let suite = EnvironmentFilteringSuite::new(vec![1]);
        let point = suite.grid().unwrap().points().remove(0);
        let prepared = suite.prepare(&point, &context).unwrap();
        assert_eq!(
            prepared.fields,
            vec![
                RowField::Value(ParamValue::Int(1)),
                RowField::Value(ParamValue::Bool(true)),
                RowField::MatchCount,
                RowField::Value(ParamValue::Int(3)),
                RowField::Value(ParamValue::Float(5.5)),
                RowField::Value(ParamValue::Int(2)),
            ]
        );
    }

    #[test]
    fn prepare_fails_when_chain_list_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let context = context(dir.path());
        let suite = EnvironmentFilteringSuite::new(vec![1]);
        let point = suite.grid().unwrap().points().remove(0);
        assert!(matches!(
            suite.prepare(&point, &context),
            Err(BenchmarkError::ChainList { .. })
        ));
    }
}
