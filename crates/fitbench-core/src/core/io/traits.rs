use super::options::ParserOptions;
use crate::core::models::motif::Motif;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing motif structure files.
///
/// Implementors handle format-specific parsing and serialization; the provided
/// path-based methods take care of opening files and writing them atomically.
pub trait StructureFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a motif from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    /// * `options` - Which data to keep.
    /// * `fallback_id` - The structure identifier to use when the content carries none,
    ///   or when `options.identifier_from_filename` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the reader fails.
    fn read_from(
        reader: &mut impl BufRead,
        options: &ParserOptions,
        fallback_id: Option<&str>,
    ) -> Result<Motif, Self::Error>;

    /// Writes a motif to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(motif: &Motif, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a motif from a file path, using the file stem as the fallback identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P, options: &ParserOptions) -> Result<Motif, Self::Error> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        Self::read_from(&mut reader, options, stem.as_deref())
    }

    /// Writes a motif to a file path.
    ///
    /// The content goes to a temporary file in the destination directory first and is
    /// renamed into place afterwards, so a failed write never leaves a partial file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(motif: &Motif, path: P) -> Result<(), Self::Error> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let temp = tempfile::NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            Self::write_to(motif, &mut writer)?;
            writer.flush()?;
        }
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// A source of parsed motifs, addressed by file path.
///
/// This is the seam through which the curation pipeline and the benchmark suites obtain
/// motifs; [`LocalStructureSource`] reads local PDB files.
pub trait StructureSource: Send + Sync {
    type Error: Error + Send + Sync + 'static;

    fn parse(&self, path: &Path, options: &ParserOptions) -> Result<Motif, Self::Error>;
}

/// Reads motifs from local PDB files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStructureSource;

impl StructureSource for LocalStructureSource {
    type Error = super::pdb::PdbError;

    fn parse(&self, path: &Path, options: &ParserOptions) -> Result<Motif, Self::Error> {
        use super::pdb::PdbFile;
        PdbFile::read_from_path(path, options)
    }
}
