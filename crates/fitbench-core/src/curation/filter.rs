use super::config::{CurationConfig, DEFAULT_EXTENT_CUTOFF, DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE};
use crate::core::models::motif::Motif;
use crate::core::utils::geometry::ReferencePoint;
use std::fmt;

/// Why a motif did not pass the [`MotifFilter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    ExtentExceeded { extent: f64, cutoff: f64 },
    SizeOutOfBounds { size: usize, min: usize, max: usize },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::ExtentExceeded { extent, cutoff } => {
                write!(f, "extent exceeded ({:?} > {:?})", extent, cutoff)
            }
            Rejection::SizeOutOfBounds { size, min, max } => {
                write!(f, "size out of bounds ({} not in [{}, {}])", size, min, max)
            }
        }
    }
}

/// Accepts a motif iff `extent <= extent_cutoff` and `min_size <= size <= max_size`.
///
/// Both bounds are inclusive. An extent that is not a number never passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotifFilter {
    extent_cutoff: f64,
    min_size: usize,
    max_size: usize,
    reference: ReferencePoint,
}

impl Default for MotifFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENT_CUTOFF, DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE)
    }
}

impl MotifFilter {
    pub fn new(extent_cutoff: f64, min_size: usize, max_size: usize) -> Self {
        Self {
            extent_cutoff,
            min_size,
            max_size,
            reference: ReferencePoint::default(),
        }
    }

    pub fn from_config(config: &CurationConfig) -> Self {
        Self::new(config.extent_cutoff, config.min_size, config.max_size)
            .with_reference(config.reference_point)
    }

    pub fn with_reference(mut self, reference: ReferencePoint) -> Self {
        self.reference = reference;
        self
    }

    pub fn reference(&self) -> ReferencePoint {
        self.reference
    }

    pub fn accept(&self, motif: &Motif) -> bool {
        self.evaluate(motif).is_ok()
    }

    pub fn evaluate(&self, motif: &Motif) -> Result<(), Rejection> {
        self.evaluate_measured(motif.size(), motif.extent_with(self.reference))
    }

    /// Applies the filter to an already measured size and extent.
    pub fn evaluate_measured(&self, size: usize, extent: f64) -> Result<(), Rejection> {
        if extent.is_nan() || extent > self.extent_cutoff {
            return Err(Rejection::ExtentExceeded {
                extent,
                cutoff: self.extent_cutoff,
            });
        }
        if size < self.min_size || size > self.max_size {
            return Err(Rejection::SizeOutOfBounds {
                size,
                min: self.min_size,
                max: self.max_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::residue::{LeafIdentifier, Residue};
    use nalgebra::Point3;

    fn linear_motif(size: usize, extent: f64) -> Motif {
        let step = if size > 1 { extent / (size - 1) as f64 } else { 0.0 };
        let residues = (0..size)
            .map(|i| {
                let serial = i as isize + 1;
                Residue::new(LeafIdentifier::new('A', serial), "ALA", false).with_atoms(vec![
                    Atom::new(i + 1, "CA", "C", Point3::new(step * i as f64, 0.0, 0.0)),
                ])
            })
            .collect();
        Motif::new("1ABC", residues)
    }

    #[test]
    fn accept_returns_false_when_extent_exceeds_cutoff() {
        let filter = MotifFilter::default();
        assert!(!filter.accept(&linear_motif(3, 15.01)));
        assert!(matches!(
            filter.evaluate(&linear_motif(3, 20.0)),
            Err(Rejection::ExtentExceeded { .. })
        ));
    }

    #[test]
    fn accept_is_inclusive_at_the_boundaries() {
        let filter = MotifFilter::default();
        assert!(filter.accept(&linear_motif(2, 15.0)));
        assert!(filter.accept(&linear_motif(6, 15.0)));
    }

    #[test]
    fn accept_returns_false_when_size_is_out_of_bounds() {
        let filter = MotifFilter::default();
        assert_eq!(
            filter.evaluate(&linear_motif(1, 0.0)),
            Err(Rejection::SizeOutOfBounds {
                size: 1,
                min: 2,
                max: 6
            })
        );
        assert!(!filter.accept(&linear_motif(7, 4.0)));
    }

    #[test]
    fn extent_is_checked_before_size() {
        let filter = MotifFilter::default();
        assert!(matches!(
            filter.evaluate(&linear_motif(7, 30.0)),
            Err(Rejection::ExtentExceeded { .. })
        ));
    }

    #[test]
    fn evaluate_measured_rejects_nan_extent() {
        let filter = MotifFilter::default();
        assert!(filter.evaluate_measured(3, f64::NAN).is_err());
    }

    #[test]
    fn custom_thresholds_are_honored() {
        let filter = MotifFilter::new(5.0, 3, 3);
        assert!(filter.accept(&linear_motif(3, 5.0)));
        assert!(!filter.accept(&linear_motif(3, 5.5)));
        assert!(!filter.accept(&linear_motif(2, 1.0)));
    }

    #[test]
    fn rejection_reasons_read_naturally() {
        let extent = Rejection::ExtentExceeded {
            extent: 20.0,
            cutoff: 15.0,
        };
        assert_eq!(extent.to_string(), "extent exceeded (20.0 > 15.0)");
        let size = Rejection::SizeOutOfBounds {
            size: 7,
            min: 2,
            max: 6,
        };
        assert_eq!(size.to_string(), "size out of bounds (7 not in [2, 6])");
    }
}
