use serde::Deserialize;

/// A single toggle recognized by structure parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Setting {
    /// Do not read bonds (`CONECT` records).
    OmitEdges,
    /// Drop hydrogen and deuterium atoms.
    OmitHydrogens,
    /// Drop `HETATM` residues that are not standard amino acids.
    OmitLigandInformation,
    /// Take the structure identifier from the file name instead of the file header.
    IdentifierFromFilename,
}

/// The set of options controlling what a structure parser exposes.
///
/// Data omitted here is never reachable through the resulting
/// [`Motif`](crate::core::models::motif::Motif).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
    pub omit_edges: bool,
    pub omit_hydrogens: bool,
    pub omit_ligand_information: bool,
    pub identifier_from_filename: bool,
}

impl ParserOptions {
    pub fn with_settings(settings: &[Setting]) -> Self {
        let mut options = Self::default();
        for setting in settings {
            options.enable(*setting);
        }
        options
    }

    /// The options used for every benchmark run: no edges, no hydrogens, no ligands,
    /// identifiers taken from file names.
    pub fn benchmark() -> Self {
        Self::with_settings(&[
            Setting::OmitEdges,
            Setting::OmitHydrogens,
            Setting::OmitLigandInformation,
            Setting::IdentifierFromFilename,
        ])
    }

    pub fn enable(&mut self, setting: Setting) {
        match setting {
            Setting::OmitEdges => self.omit_edges = true,
            Setting::OmitHydrogens => self.omit_hydrogens = true,
            Setting::OmitLigandInformation => self.omit_ligand_information = true,
            Setting::IdentifierFromFilename => self.identifier_from_filename = true,
        }
    }
}
