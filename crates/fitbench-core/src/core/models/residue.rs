use super::atom::Atom;
use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The family label of a leaf residue.
///
/// Standard amino acids get their own variant; everything else (ligands, waters,
/// modified residues) is labeled [`ResidueFamily::Unknown`] and keeps its original
/// three-letter name on the owning [`Residue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResidueFamily {
    // --- Aliphatic, Nonpolar ---
    Alanine,
    Glycine,
    Isoleucine,
    Leucine,
    Proline,
    Valine,

    // --- Aromatic ---
    Phenylalanine,
    Tryptophan,
    Tyrosine,

    // --- Polar, Uncharged ---
    Asparagine,
    Cysteine,
    Glutamine,
    Serine,
    Threonine,
    Methionine,

    // --- Positively Charged (Basic) ---
    Arginine,
    Histidine,
    Lysine,

    // --- Negatively Charged (Acidic) ---
    AsparticAcid,
    GlutamicAcid,

    Unknown,
}

static THREE_LETTER_CODES: Map<&'static str, ResidueFamily> = phf_map! {
    "ALA" => ResidueFamily::Alanine,
    "GLY" => ResidueFamily::Glycine,
    "ILE" => ResidueFamily::Isoleucine,
    "LEU" => ResidueFamily::Leucine,
    "PRO" => ResidueFamily::Proline,
    "VAL" => ResidueFamily::Valine,
    "PHE" => ResidueFamily::Phenylalanine,
    "TRP" => ResidueFamily::Tryptophan,
    "TYR" => ResidueFamily::Tyrosine,
    "ASN" => ResidueFamily::Asparagine,
    "CYS" => ResidueFamily::Cysteine,
    "GLN" => ResidueFamily::Glutamine,
    "SER" => ResidueFamily::Serine,
    "THR" => ResidueFamily::Threonine,
    "MET" => ResidueFamily::Methionine,
    "ARG" => ResidueFamily::Arginine,
    "HIS" => ResidueFamily::Histidine,
    "HSE" => ResidueFamily::Histidine,
    "HSD" => ResidueFamily::Histidine,
    "HSP" => ResidueFamily::Histidine,
    "LYS" => ResidueFamily::Lysine,
    "ASP" => ResidueFamily::AsparticAcid,
    "GLU" => ResidueFamily::GlutamicAcid,
};

impl ResidueFamily {
    /// Looks up the family of a three-letter residue name. Unrecognized names map to
    /// [`ResidueFamily::Unknown`].
    pub fn from_three_letter(name: &str) -> Self {
        THREE_LETTER_CODES
            .get(name.trim().to_ascii_uppercase().as_str())
            .copied()
            .unwrap_or(ResidueFamily::Unknown)
    }

    pub fn to_three_letter(self) -> &'static str {
        match self {
            ResidueFamily::Alanine => "ALA",
            ResidueFamily::Glycine => "GLY",
            ResidueFamily::Isoleucine => "ILE",
            ResidueFamily::Leucine => "LEU",
            ResidueFamily::Proline => "PRO",
            ResidueFamily::Valine => "VAL",
            ResidueFamily::Phenylalanine => "PHE",
            ResidueFamily::Tryptophan => "TRP",
            ResidueFamily::Tyrosine => "TYR",
            ResidueFamily::Asparagine => "ASN",
            ResidueFamily::Cysteine => "CYS",
            ResidueFamily::Glutamine => "GLN",
            ResidueFamily::Serine => "SER",
            ResidueFamily::Threonine => "THR",
            ResidueFamily::Methionine => "MET",
            ResidueFamily::Arginine => "ARG",
            ResidueFamily::Histidine => "HIS",
            ResidueFamily::Lysine => "LYS",
            ResidueFamily::AsparticAcid => "ASP",
            ResidueFamily::GlutamicAcid => "GLU",
            ResidueFamily::Unknown => "UNK",
        }
    }

    pub fn one_letter_code(self) -> char {
        match self {
            ResidueFamily::Alanine => 'A',
            ResidueFamily::Glycine => 'G',
            ResidueFamily::Isoleucine => 'I',
            ResidueFamily::Leucine => 'L',
            ResidueFamily::Proline => 'P',
            ResidueFamily::Valine => 'V',
            ResidueFamily::Phenylalanine => 'F',
            ResidueFamily::Tryptophan => 'W',
            ResidueFamily::Tyrosine => 'Y',
            ResidueFamily::Asparagine => 'N',
            ResidueFamily::Cysteine => 'C',
            ResidueFamily::Glutamine => 'Q',
            ResidueFamily::Serine => 'S',
            ResidueFamily::Threonine => 'T',
            ResidueFamily::Methionine => 'M',
            ResidueFamily::Arginine => 'R',
            ResidueFamily::Histidine => 'H',
            ResidueFamily::Lysine => 'K',
            ResidueFamily::AsparticAcid => 'D',
            ResidueFamily::GlutamicAcid => 'E',
            ResidueFamily::Unknown => 'X',
        }
    }

    pub fn is_amino_acid(self) -> bool {
        self != ResidueFamily::Unknown
    }
}

impl fmt::Display for ResidueFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_three_letter())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid residue family: '{0}'")]
pub struct ParseResidueFamilyError(pub String);

impl FromStr for ResidueFamily {
    type Err = ParseResidueFamilyError;

    /// Parses a three-letter name ("HIS") or a one-letter code ("H").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let family = if trimmed.len() == 1 {
            let code = trimmed.chars().next().unwrap_or('X').to_ascii_uppercase();
            THREE_LETTER_CODES
                .values()
                .copied()
                .find(|family| family.one_letter_code() == code)
                .unwrap_or(ResidueFamily::Unknown)
        } else {
            ResidueFamily::from_three_letter(trimmed)
        };
        if family.is_amino_acid() {
            Ok(family)
        } else {
            Err(ParseResidueFamilyError(s.to_string()))
        }
    }
}

/// Identifies a leaf residue inside its structure: chain, sequence number and an
/// optional insertion code. Rendered as `A-164` or `A-164B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafIdentifier {
    pub chain_id: char,
    pub serial: isize,
    pub insertion_code: Option<char>,
}

impl LeafIdentifier {
    pub fn new(chain_id: char, serial: isize) -> Self {
        Self {
            chain_id,
            serial,
            insertion_code: None,
        }
    }

    pub fn with_insertion_code(mut self, code: char) -> Self {
        self.insertion_code = Some(code);
        self
    }
}

impl fmt::Display for LeafIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.chain_id, self.serial)?;
        if let Some(code) = self.insertion_code {
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid leaf identifier '{0}'. Expected 'CHAIN-NUMBER' (e.g., 'A-164').")]
pub struct ParseLeafIdentifierError(pub String);

impl FromStr for LeafIdentifier {
    type Err = ParseLeafIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseLeafIdentifierError(s.to_string());
        let (chain, rest) = s.trim().split_once('-').ok_or_else(err)?;
        let mut chain_chars = chain.chars();
        let chain_id = chain_chars.next().ok_or_else(err)?;
        if chain_chars.next().is_some() {
            return Err(err());
        }

        let (number, insertion_code) = match rest.chars().last() {
            Some(c) if c.is_ascii_alphabetic() => (&rest[..rest.len() - 1], Some(c)),
            _ => (rest, None),
        };
        let serial = number.parse::<isize>().map_err(|_| err())?;
        Ok(Self {
            chain_id,
            serial,
            insertion_code,
        })
    }
}

/// A leaf residue of a motif: identifier, original residue name, family label and atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub identifier: LeafIdentifier,
    pub name: String,
    pub family: ResidueFamily,
    /// `true` for residues read from `HETATM` records that are not standard amino acids.
    pub is_ligand: bool,
    atoms: Vec<Atom>,
}

impl Residue {
    pub fn new(identifier: LeafIdentifier, name: &str, is_ligand: bool) -> Self {
        let name = name.trim().to_ascii_uppercase();
        Self {
            identifier,
            family: ResidueFamily::from_three_letter(&name),
            name,
            is_ligand,
            atoms: Vec::new(),
        }
    }

    pub fn with_atoms(mut self, atoms: Vec<Atom>) -> Self {
        self.atoms = atoms;
        self
    }

    pub(crate) fn push_atom(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom_by_name(&self, name: &str) -> Option<&Atom> {
        self.atoms.iter().find(|atom| atom.name == name)
    }
}
