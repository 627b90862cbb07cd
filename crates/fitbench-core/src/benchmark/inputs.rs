use super::error::BenchmarkError;
use super::grid::ConfigurationPoint;
use crate::core::io::chain_list::ChainList;
use crate::core::io::options::ParserOptions;
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::StructureFile;
use crate::core::models::motif::Motif;
use crate::core::utils::geometry::ReferencePoint;
use crate::curation::classify::Dimension;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CHAIN_LIST_SEPARATOR: char = '\t';
pub const DEFAULT_PDB_ROOT: &str = "/srv/pdb";

/// A curated motif loaded as a benchmark query.
#[derive(Debug, Clone)]
pub struct QueryMotif {
    pub path: PathBuf,
    pub motif: Motif,
    pub extent: f64,
}

/// Where the sweep finds its inputs on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct DataLayout {
    /// Chain lists and hand-picked query motifs.
    pub data_root: PathBuf,
    /// Output root of a previous curation run.
    pub curated_root: PathBuf,
    /// Local structure archive the search reads targets from.
    pub pdb_root: PathBuf,
    /// Reference point the curated extents were measured with.
    pub reference: ReferencePoint,
}

impl DataLayout {
    pub fn new(data_root: PathBuf, curated_root: PathBuf, pdb_root: PathBuf) -> Self {
        Self {
            data_root,
            curated_root,
            pdb_root,
            reference: ReferencePoint::default(),
        }
    }

    pub fn with_reference_point(mut self, reference: ReferencePoint) -> Self {
        self.reference = reference;
        self
    }

    pub fn chain_list_path(&self, dataset_size: u32) -> PathBuf {
        self.data_root.join(format!(
            "nrpdb_041416_BLAST_e-7_pdb-mmtf_mutual_subset_{}.txt",
            dataset_size
        ))
    }

    /// Loads and validates the chain list with `dataset_size` entries.
    pub fn load_chain_list(
        &self,
        dataset_size: u32,
        point: &ConfigurationPoint,
    ) -> Result<ChainList, BenchmarkError> {
        let path = self.chain_list_path(dataset_size);
        let list = ChainList::from_path(&path, CHAIN_LIST_SEPARATOR).map_err(|source| {
            BenchmarkError::ChainList {
                point: point.to_string(),
                source,
            }
        })?;
        debug!(path = %path.display(), chains = list.len(), "Loaded chain list.");
        Ok(list)
    }

    pub fn enumerated_motif_path(&self, rank: u32) -> PathBuf {
        self.curated_root
            .join("enumerated")
            .join(format!("{}.pdb", rank))
    }

    /// Ranks of every `enumerated/<rank>.pdb` file, ascending.
    pub fn enumerated_ranks(&self) -> Result<Vec<u32>, BenchmarkError> {
        let directory = self.curated_root.join("enumerated");
        let read_error = |source| BenchmarkError::CuratedDirectory {
            path: directory.clone(),
            source,
        };
        let mut ranks = Vec::new();
        for entry in fs::read_dir(&directory).map_err(read_error)? {
            let path = entry.map_err(read_error)?.path();
            if path.extension().is_some_and(|ext| ext == "pdb") {
                if let Some(rank) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| stem.parse::<u32>().ok())
                {
                    ranks.push(rank);
                }
            }
        }
        ranks.sort_unstable();
        Ok(ranks)
    }

    pub fn bin_directory(&self, dimension: Dimension, key: u64) -> PathBuf {
        self.curated_root.join(dimension.bucket_directory(key))
    }

    /// Parses a single query motif, failing if the file is absent.
    pub fn load_motif(
        &self,
        path: &Path,
        options: &ParserOptions,
        point: &ConfigurationPoint,
    ) -> Result<QueryMotif, BenchmarkError> {
        if !path.is_file() {
            return Err(BenchmarkError::MissingInput {
                point: point.to_string(),
                path: path.to_path_buf(),
            });
        }
        let motif = PdbFile::read_from_path(path, options).map_err(|source| {
            BenchmarkError::Motif {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(QueryMotif {
            path: path.to_path_buf(),
            extent: motif.extent_with(self.reference),
            motif,
        })
    }

    /// Loads the `rank_cutoff` smallest-extent motifs of one curated bin.
    ///
    /// Motifs are ordered by extent, ties by file path.
    pub fn load_bin(
        &self,
        dimension: Dimension,
        key: u64,
        rank_cutoff: usize,
        options: &ParserOptions,
        point: &ConfigurationPoint,
    ) -> Result<Vec<QueryMotif>, BenchmarkError> {
        let directory = self.bin_directory(dimension, key);
        if !directory.is_dir() {
            return Err(BenchmarkError::MissingInput {
                point: point.to_string(),
                path: directory,
            });
        }

        let read_error = |source| BenchmarkError::CuratedDirectory {
            path: directory.clone(),
            source,
        };
        let mut paths = Vec::new();
        for entry in fs::read_dir(&directory).map_err(read_error)? {
            let path = entry.map_err(read_error)?.path();
            if path.is_file() {
                paths.push(path);
            }
        }

        let mut motifs = paths
            .iter()
            .map(|path| self.load_motif(path, options, point))
            .collect::<Result<Vec<_>, _>>()?;
        motifs.sort_by(|a, b| a.extent.total_cmp(&b.extent).then_with(|| a.path.cmp(&b.path)));
        motifs.truncate(rank_cutoff);

        if motifs.is_empty() {
            return Err(BenchmarkError::MissingInput {
                point: point.to_string(),
                path: directory,
            });
        }
        debug!(
            directory = %directory.display(),
            selected = motifs.len(),
            available = paths.len(),
            "Selected bin motifs."
        );
        Ok(motifs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::residue::{LeafIdentifier, Residue};
    use nalgebra::Point3;

    fn write_motif(path: &Path, id: &str, extent: f64) {
        let residues = [0.0, extent]
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                Residue::new(LeafIdentifier::new('A', i as isize + 1), "CYS", false).with_atoms(
                    vec![Atom::new(i + 1, "CA", "C", Point3::new(x, 0.0, 0.0))],
                )
            })
            .collect();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        PdbFile::write_to_path(&Motif::new(id, residues), path).unwrap();
    }

    fn point() -> ConfigurationPoint {
        ConfigurationPoint::new(vec![("extent".into(), 5_i64.into())])
    }

    fn layout(root: &Path) -> DataLayout {
        DataLayout::new(root.join("data"), root.join("curated"), PathBuf::from(DEFAULT_PDB_ROOT))
    }

    #[test]
    fn chain_list_path_follows_dataset_naming() {
        let layout = layout(Path::new("/bench"));
        assert_eq!(
            layout.chain_list_path(250),
            Path::new("/bench/data/nrpdb_041416_BLAST_e-7_pdb-mmtf_mutual_subset_250.txt")
        );
        assert_eq!(
            layout.enumerated_motif_path(3),
            Path::new("/bench/curated/enumerated/3.pdb")
        );
    }

    #[test]
    fn load_chain_list_fails_at_setup_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = layout(dir.path()).load_chain_list(500, &point());
        assert!(matches!(result, Err(BenchmarkError::ChainList { .. })));
    }

    #[test]
    fn load_bin_keeps_smallest_extents_up_to_cutoff() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let bin = layout.bin_directory(Dimension::Size, 2);
        write_motif(&bin.join("a.pdb"), "1AAA", 9.0);
        write_motif(&bin.join("b.pdb"), "2BBB", 3.0);
        write_motif(&bin.join("c.pdb"), "3CCC", 6.0);
        write_motif(&bin.join("d.pdb"), "4DDD", 12.0);

        let motifs = layout
            .load_bin(Dimension::Size, 2, 3, &ParserOptions::default(), &point())
            .unwrap();
        let ids: Vec<&str> = motifs.iter().map(|m| m.motif.structure_id()).collect();
        assert_eq!(ids, vec!["2BBB", "3CCC", "1AAA"]);
    }

    #[test]
    fn load_bin_ranks_by_the_curation_reference_point() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("curated/size/size_2");
        // Side chain pulls the first centroid to x=5: alpha-carbon extent 4.0, centroid 1.0.
        let bulky = Motif::new(
            "1BLK",
            vec![
                Residue::new(LeafIdentifier::new('A', 1), "LYS", false).with_atoms(vec![
                    Atom::new(1, "CA", "C", Point3::new(0.0, 0.0, 0.0)),
                    Atom::new(2, "NZ", "N", Point3::new(10.0, 0.0, 0.0)),
                ]),
                Residue::new(LeafIdentifier::new('A', 2), "GLY", false)
                    .with_atoms(vec![Atom::new(3, "CA", "C", Point3::new(4.0, 0.0, 0.0))]),
            ],
        );
        fs::create_dir_all(&bin).unwrap();
        PdbFile::write_to_path(&bulky, bin.join("bulky.pdb")).unwrap();
        write_motif(&bin.join("plain.pdb"), "2PLN", 3.5);

        let by_centroid = layout(dir.path())
            .load_bin(Dimension::Size, 2, 1, &ParserOptions::default(), &point())
            .unwrap();
        assert_eq!(by_centroid[0].motif.structure_id(), "1BLK");
        assert_eq!(by_centroid[0].extent, 1.0);

        let by_alpha_carbon = layout(dir.path())
            .with_reference_point(ReferencePoint::AlphaCarbon)
            .load_bin(Dimension::Size, 2, 1, &ParserOptions::default(), &point())
            .unwrap();
        assert_eq!(by_alpha_carbon[0].motif.structure_id(), "2PLN");
        assert_eq!(by_alpha_carbon[0].extent, 3.5);
    }

    #[test]
    fn load_bin_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            layout(dir.path()).load_bin(Dimension::Extent, 7, 3, &ParserOptions::default(), &point());
        assert!(matches!(result, Err(BenchmarkError::MissingInput { .. })));
    }

    #[test]
    fn load_motif_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let result = layout.load_motif(
            &layout.enumerated_motif_path(1),
            &ParserOptions::default(),
            &point(),
        );
        assert!(matches!(result, Err(BenchmarkError::MissingInput { .. })));
    }

    #[test]
    fn enumerated_ranks_lists_numeric_stems_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let enumerated = dir.path().join("curated").join("enumerated");
        fs::create_dir_all(&enumerated).unwrap();
        for name in ["10.pdb", "2.pdb", "1.pdb", "notes.txt", "x.pdb"] {
            fs::write(enumerated.join(name), "").unwrap();
        }

        let ranks = layout(dir.path()).enumerated_ranks().unwrap();
        assert_eq!(ranks, vec![1, 2, 10]);
    }
}
