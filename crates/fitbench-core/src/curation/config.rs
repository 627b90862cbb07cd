use super::classify::Dimension;
use crate::core::config::ConfigError;
use crate::core::io::options::ParserOptions;
use crate::core::utils::geometry::ReferencePoint;
use std::path::PathBuf;

pub const DEFAULT_EXTENT_CUTOFF: f64 = 15.0;
pub const DEFAULT_MIN_SIZE: usize = 2;
pub const DEFAULT_MAX_SIZE: usize = 6;

/// One output layout the curator writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CurationMode {
    /// `<output_root>/<dimension>/<dimension>_<key>/<identity>.pdb`
    Grouped(Dimension),
    /// `<output_root>/enumerated/<rank>.pdb`
    Enumerated,
}

impl CurationMode {
    pub const ALL: [CurationMode; 3] = [
        CurationMode::Grouped(Dimension::Size),
        CurationMode::Grouped(Dimension::Extent),
        CurationMode::Enumerated,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurationConfig {
    pub extent_cutoff: f64,
    pub min_size: usize,
    pub max_size: usize,
    pub output_root: PathBuf,
    pub parser_options: ParserOptions,
    pub reference_point: ReferencePoint,
    pub modes: Vec<CurationMode>,
}

#[derive(Default)]
pub struct CurationConfigBuilder {
    extent_cutoff: Option<f64>,
    min_size: Option<usize>,
    max_size: Option<usize>,
    output_root: Option<PathBuf>,
    parser_options: Option<ParserOptions>,
    reference_point: Option<ReferencePoint>,
    modes: Option<Vec<CurationMode>>,
}

impl CurationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extent_cutoff(mut self, cutoff: f64) -> Self {
        self.extent_cutoff = Some(cutoff);
        self
    }
    pub fn min_size(mut self, size: usize) -> Self {
        self.min_size = Some(size);
        self
    }
    pub fn max_size(mut self, size: usize) -> Self {
        self.max_size = Some(size);
        self
    }
    pub fn output_root(mut self, path: PathBuf) -> Self {
        self.output_root = Some(path);
        self
    }
    pub fn parser_options(mut self, options: ParserOptions) -> Self {
        self.parser_options = Some(options);
        self
    }
    pub fn reference_point(mut self, reference: ReferencePoint) -> Self {
        self.reference_point = Some(reference);
        self
    }
    pub fn modes(mut self, modes: Vec<CurationMode>) -> Self {
        self.modes = Some(modes);
        self
    }

    pub fn build(self) -> Result<CurationConfig, ConfigError> {
        let extent_cutoff = self.extent_cutoff.unwrap_or(DEFAULT_EXTENT_CUTOFF);
        if !extent_cutoff.is_finite() || extent_cutoff < 0.0 {
            return Err(ConfigError::invalid(
                "extent_cutoff",
                format!("must be a finite, non-negative distance (got {})", extent_cutoff),
            ));
        }

        let min_size = self.min_size.unwrap_or(DEFAULT_MIN_SIZE);
        let max_size = self.max_size.unwrap_or(DEFAULT_MAX_SIZE);
        if min_size == 0 {
            return Err(ConfigError::invalid("min_size", "must be at least 1"));
        }
        if min_size > max_size {
            return Err(ConfigError::invalid(
                "max_size",
                format!("must not be smaller than min_size ({} < {})", max_size, min_size),
            ));
        }

        let mut modes = self.modes.unwrap_or_else(|| CurationMode::ALL.to_vec());
        modes.sort_unstable();
        modes.dedup();
        if modes.is_empty() {
            return Err(ConfigError::invalid("modes", "at least one output layout is required"));
        }

        Ok(CurationConfig {
            extent_cutoff,
            min_size,
            max_size,
            output_root: self
                .output_root
                .ok_or(ConfigError::MissingParameter("output_root"))?,
            parser_options: self.parser_options.unwrap_or_default(),
            reference_point: self.reference_point.unwrap_or_default(),
            modes,
        })
    }
}
