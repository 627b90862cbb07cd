use super::residue::{LeafIdentifier, Residue, ResidueFamily};
use crate::core::utils::geometry::{self, ReferencePoint};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MotifError {
    #[error("Leaf residue {0} is not part of the motif")]
    UnknownLeaf(LeafIdentifier),
}

/// A bond between two atoms, stored as the pair of atom serial numbers (lower first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub atom1_serial: usize,
    pub atom2_serial: usize,
}

impl Edge {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            atom1_serial: a.min(b),
            atom2_serial: a.max(b),
        }
    }
}

/// A structural motif: an ordered collection of labeled leaf residues with 3-D positions.
///
/// A motif is immutable once parsed. The only permitted change is attaching
/// exchangeable families, which the search collaborator uses to accept substitutions
/// at a position; curation ignores them.
#[derive(Debug, Clone, PartialEq)]
pub struct Motif {
    structure_id: String,
    residues: Vec<Residue>,
    edges: Vec<Edge>,
    exchangeable_families: BTreeMap<LeafIdentifier, BTreeSet<ResidueFamily>>,
}

impl Motif {
    pub fn new(structure_id: &str, residues: Vec<Residue>) -> Self {
        Self {
            structure_id: structure_id.trim().to_string(),
            residues,
            edges: Vec::new(),
            exchangeable_families: BTreeMap::new(),
        }
    }

    pub fn with_edges(mut self, mut edges: Vec<Edge>) -> Self {
        edges.sort_unstable();
        edges.dedup();
        self.edges = edges;
        self
    }

    pub fn structure_id(&self) -> &str {
        &self.structure_id
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn residue(&self, identifier: &LeafIdentifier) -> Option<&Residue> {
        self.residues.iter().find(|r| &r.identifier == identifier)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of leaf residues.
    pub fn size(&self) -> usize {
        self.residues.len()
    }

    /// Maximum distance between the centroids of any two residues, in Angstroms.
    /// A motif with fewer than two residues has an extent of `0.0`.
    pub fn extent(&self) -> f64 {
        self.extent_with(ReferencePoint::Centroid)
    }

    pub fn extent_with(&self, reference: ReferencePoint) -> f64 {
        geometry::calculate_extent(&self.residues, reference)
    }

    /// Residue family per position, in motif order.
    pub fn labels(&self) -> Vec<ResidueFamily> {
        self.residues.iter().map(|r| r.family).collect()
    }

    /// Number of distinct residue families. Unknown residues are told apart by
    /// their residue name.
    pub fn label_count(&self) -> usize {
        self.residues
            .iter()
            .map(|r| match r.family {
                ResidueFamily::Unknown => r.name.as_str(),
                family => family.to_three_letter(),
            })
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Renders the motif identity used as the file-name stem of curated output,
    /// e.g. `1GL0_E-H57_E-D102_E-S195`.
    pub fn identity(&self) -> String {
        let mut identity = if self.structure_id.is_empty() {
            "motif".to_string()
        } else {
            self.structure_id.clone()
        };
        for residue in &self.residues {
            let id = residue.identifier;
            identity.push('_');
            identity.push(id.chain_id);
            identity.push('-');
            identity.push(residue.family.one_letter_code());
            identity.push_str(&id.serial.to_string());
            if let Some(code) = id.insertion_code {
                identity.push(code);
            }
        }
        identity
    }

    /// Allows `family` as a substitute for the residue at `leaf` during searches.
    ///
    /// # Errors
    ///
    /// Returns [`MotifError::UnknownLeaf`] if `leaf` is not a residue of this motif.
    pub fn add_exchangeable_family(
        &mut self,
        leaf: LeafIdentifier,
        family: ResidueFamily,
    ) -> Result<(), MotifError> {
        if self.residue(&leaf).is_none() {
            return Err(MotifError::UnknownLeaf(leaf));
        }
        self.exchangeable_families
            .entry(leaf)
            .or_default()
            .insert(family);
        Ok(())
    }

    pub fn exchangeable_families(&self) -> &BTreeMap<LeafIdentifier, BTreeSet<ResidueFamily>> {
        &self.exchangeable_families
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn residue(chain: char, serial: isize, name: &str, x: f64) -> Residue {
        Residue::new(LeafIdentifier::new(chain, serial), name, false)
            .with_atoms(vec![Atom::new(serial as usize, "CA", "C", Point3::new(x, 0.0, 0.0))])
    }

    fn triad() -> Motif {
        Motif::new(
            "1GL0",
            vec![
                residue('E', 57, "HIS", 0.0),
                residue('E', 102, "ASP", 4.0),
                residue('E', 195, "SER", 9.5),
            ],
        )
    }

    #[test]
    fn size_and_extent_reflect_residues() {
        let motif = triad();
        assert_eq!(motif.size(), 3);
        assert!((motif.extent() - 9.5).abs() < 1e-12);
    }

    #[test]
    fn extent_of_single_residue_motif_is_zero() {
        let motif = Motif::new("X", vec![residue('A', 1, "ALA", 3.0)]);
        assert_eq!(motif.extent(), 0.0);
    }

    #[test]
    fn identity_uses_one_letter_codes_and_serials() {
        assert_eq!(triad().identity(), "1GL0_E-H57_E-D102_E-S195");
    }

    #[test]
    fn identity_falls_back_when_structure_id_is_missing() {
        let motif = Motif::new("", vec![residue('A', 5, "LYS", 0.0)]);
        assert_eq!(motif.identity(), "motif_A-K5");
    }

    #[test]
    fn label_count_counts_distinct_families() {
        let motif = Motif::new(
            "1ABC",
            vec![
                residue('A', 1, "ASP", 0.0),
                residue('A', 2, "ASP", 1.0),
                residue('A', 3, "GLU", 2.0),
            ],
        );
        assert_eq!(motif.label_count(), 2);
        assert_eq!(
            motif.labels(),
            vec![
                ResidueFamily::AsparticAcid,
                ResidueFamily::AsparticAcid,
                ResidueFamily::GlutamicAcid
            ]
        );
    }

    #[test]
    fn add_exchangeable_family_accumulates_per_leaf() {
        let mut motif = triad();
        let leaf = LeafIdentifier::new('E', 102);
        motif
            .add_exchangeable_family(leaf, ResidueFamily::Asparagine)
            .unwrap();
        motif
            .add_exchangeable_family(leaf, ResidueFamily::GlutamicAcid)
            .unwrap();
        let families = &motif.exchangeable_families()[&leaf];
        assert_eq!(families.len(), 2);
        assert!(families.contains(&ResidueFamily::Asparagine));
    }

    #[test]
    fn add_exchangeable_family_rejects_unknown_leaf() {
        let mut motif = triad();
        let result =
            motif.add_exchangeable_family(LeafIdentifier::new('A', 1), ResidueFamily::Lysine);
        assert_eq!(result, Err(MotifError::UnknownLeaf(LeafIdentifier::new('A', 1))));
    }

    #[test]
    fn with_edges_normalizes_and_deduplicates() {
        let motif = triad().with_edges(vec![Edge::new(3, 1), Edge::new(1, 3), Edge::new(2, 5)]);
        assert_eq!(motif.edges(), &[Edge::new(1, 3), Edge::new(2, 5)]);
    }
}
