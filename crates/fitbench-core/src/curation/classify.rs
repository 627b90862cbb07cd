use crate::core::io::pdb::{PdbError, PdbFile};
use crate::core::io::traits::StructureFile;
use crate::core::models::motif::Motif;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

/// The attribute a grouped dataset is partitioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    Size,
    Extent,
}

impl Dimension {
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Size => "size",
            Dimension::Extent => "extent",
        }
    }

    /// `size` for [`Dimension::Size`], `floor(extent)` for [`Dimension::Extent`].
    ///
    /// Only meaningful for motifs that passed the filter, whose extent is finite and
    /// non-negative.
    pub fn bucket_key(self, size: usize, extent: f64) -> u64 {
        match self {
            Dimension::Size => size as u64,
            Dimension::Extent => extent.floor() as u64,
        }
    }

    /// `<dimension>/<dimension>_<key>`, relative to an output root.
    pub fn bucket_directory(self, key: u64) -> PathBuf {
        Path::new(self.name()).join(format!("{}_{}", self.name(), key))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// SHA-256 digest of a motif's canonical PDB serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn of(motif: &Motif) -> Result<Self, PdbError> {
        let mut buffer = Vec::new();
        PdbFile::write_to(motif, &mut buffer)?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&Sha256::digest(&buffer));
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The first eight hex digits, used to tell apart motifs with the same identity.
    pub fn short(&self) -> String {
        self.to_string()[..8].to_string()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Total order for enumeration: size, then extent, then content digest.
#[derive(Debug, Clone, Copy)]
pub struct EnumerationKey {
    pub size: usize,
    pub extent: f64,
    pub digest: ContentDigest,
}

impl Ord for EnumerationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.size
            .cmp(&other.size)
            .then_with(|| self.extent.total_cmp(&other.extent))
            .then_with(|| self.digest.cmp(&other.digest))
    }
}

impl PartialOrd for EnumerationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for EnumerationKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EnumerationKey {}

/// An accepted motif together with everything needed to place it in the output tree.
#[derive(Debug, Clone)]
pub struct ClassifiedMotif {
    pub source: PathBuf,
    pub motif: Motif,
    pub size: usize,
    pub extent: f64,
    pub digest: ContentDigest,
}

impl ClassifiedMotif {
    pub fn new(source: PathBuf, motif: Motif, extent: f64) -> Result<Self, PdbError> {
        let digest = ContentDigest::of(&motif)?;
        Ok(Self {
            source,
            size: motif.size(),
            extent,
            digest,
            motif,
        })
    }

    pub fn bucket_key(&self, dimension: Dimension) -> u64 {
        dimension.bucket_key(self.size, self.extent)
    }

    pub fn enumeration_key(&self) -> EnumerationKey {
        EnumerationKey {
            size: self.size,
            extent: self.extent,
            digest: self.digest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::residue::{LeafIdentifier, Residue};
    use nalgebra::Point3;

    fn motif(id: &str, xs: &[f64]) -> Motif {
        let residues = xs
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                Residue::new(LeafIdentifier::new('A', i as isize + 1), "GLY", false)
                    .with_atoms(vec![Atom::new(i + 1, "CA", "C", Point3::new(x, 0.0, 0.0))])
            })
            .collect();
        Motif::new(id, residues)
    }

    fn key(size: usize, extent: f64, id: &str) -> EnumerationKey {
        EnumerationKey {
            size,
            extent,
            digest: ContentDigest::of(&motif(id, &[0.0])).unwrap(),
        }
    }

    #[test]
    fn bucket_key_uses_size_or_floor_of_extent() {
        assert_eq!(Dimension::Size.bucket_key(4, 14.9), 4);
        assert_eq!(Dimension::Extent.bucket_key(4, 14.9), 14);
        assert_eq!(Dimension::Extent.bucket_key(2, 3.0), 3);
        assert_eq!(Dimension::Extent.bucket_key(2, 0.4), 0);
    }

    #[test]
    fn bucket_directory_nests_dimension_name() {
        assert_eq!(
            Dimension::Extent.bucket_directory(5),
            Path::new("extent").join("extent_5")
        );
        assert_eq!(Dimension::Size.bucket_directory(3), Path::new("size").join("size_3"));
    }

    #[test]
    fn enumeration_key_orders_by_size_before_extent() {
        assert!(key(2, 14.0, "A") < key(3, 1.0, "B"));
        assert!(key(3, 1.0, "A") < key(3, 2.0, "B"));
    }

    #[test]
    fn enumeration_key_breaks_ties_by_digest() {
        let a = key(3, 5.0, "1AAA");
        let b = key(3, 5.0, "2BBB");
        assert_ne!(a, b);
        assert_eq!(a < b, a.digest < b.digest);
    }

    #[test]
    fn content_digest_is_stable_and_content_sensitive() {
        let first = ContentDigest::of(&motif("1ABC", &[0.0, 3.0])).unwrap();
        let again = ContentDigest::of(&motif("1ABC", &[0.0, 3.0])).unwrap();
        let moved = ContentDigest::of(&motif("1ABC", &[0.0, 3.5])).unwrap();
        assert_eq!(first, again);
        assert_ne!(first, moved);
        assert_eq!(first.to_string().len(), 64);
        assert_eq!(first.short(), first.to_string()[..8]);
    }

    #[test]
    fn classified_motif_caches_size_and_extent() {
        let classified =
            ClassifiedMotif::new(PathBuf::from("a.pdb"), motif("1ABC", &[0.0, 5.5, 2.0]), 5.5)
                .unwrap();
        assert_eq!(classified.size, 3);
        assert_eq!(classified.bucket_key(Dimension::Extent), 5);
        assert_eq!(classified.bucket_key(Dimension::Size), 3);
    }
}
