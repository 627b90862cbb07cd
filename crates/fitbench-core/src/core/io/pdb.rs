use super::options::ParserOptions;
use super::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::motif::{Edge, Motif};
use crate::core::models::residue::{LeafIdentifier, Residue, ResidueFamily};
use crate::core::utils::identifiers::is_water_residue;
use nalgebra::Point3;
use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_float(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
    default: Option<f64>,
) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    if value.is_empty() {
        if let Some(default) = default {
            return Ok(default);
        }
    }
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn parse_int<T: std::str::FromStr>(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
) -> Result<T, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

/// Reader and writer for motifs stored in the PDB text format.
///
/// Only the records a motif needs are interpreted: `HEADER` (identifier), `ATOM`/`HETATM`
/// (residues and atoms of the first model, first alternate location) and `CONECT`
/// (edges). Everything else is skipped.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
        options: &ParserOptions,
        fallback_id: Option<&str>,
    ) -> Result<Motif, Self::Error> {
        let mut header_id: Option<String> = None;
        let mut residues: Vec<Residue> = Vec::new();
        let mut residue_index: HashMap<LeafIdentifier, usize> = HashMap::new();
        let mut kept_serials: HashSet<usize> = HashSet::new();
        let mut edges: Vec<Edge> = Vec::new();
        let mut seen_atoms = false;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "HEADER" => {
                    header_id = line
                        .get(62..)
                        .and_then(|rest| rest.split_whitespace().next())
                        .map(str::to_string);
                }
                record @ ("ATOM" | "HETATM") => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }
                    seen_atoms = true;

                    let alt_loc = line.get(16..17).unwrap_or(" ");
                    if !matches!(alt_loc, " " | "A") {
                        continue;
                    }

                    let serial: usize = parse_int(&line, line_num, 6, 11)?;
                    let name = slice_and_trim(&line, 12, 16);
                    if name.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "13-16".into(),
                            },
                        });
                    }
                    let res_name = slice_and_trim(&line, 17, 20);
                    let chain_id = slice_and_trim(&line, 21, 22).chars().next().unwrap_or('A');
                    let res_seq: isize = parse_int(&line, line_num, 22, 26)?;
                    let insertion_code = slice_and_trim(&line, 26, 27).chars().next();
                    let x = parse_float(&line, line_num, 30, 38, None)?;
                    let y = parse_float(&line, line_num, 38, 46, None)?;
                    let z = parse_float(&line, line_num, 46, 54, None)?;
                    let occupancy = parse_float(&line, line_num, 54, 60, Some(1.0))?;
                    let b_factor = parse_float(&line, line_num, 60, 66, Some(0.0))?;
                    let element = slice_and_trim(&line, 76, 78);

                    let family = ResidueFamily::from_three_letter(res_name);
                    let is_ligand = (record == "HETATM" && !family.is_amino_acid())
                        || is_water_residue(res_name);
                    if is_ligand && options.omit_ligand_information {
                        continue;
                    }

                    let mut atom = Atom::new(serial, name, element, Point3::new(x, y, z));
                    atom.occupancy = occupancy;
                    atom.b_factor = b_factor;
                    if options.omit_hydrogens && atom.is_hydrogen() {
                        continue;
                    }

                    let mut identifier = LeafIdentifier::new(chain_id, res_seq);
                    identifier.insertion_code = insertion_code;
                    let idx = *residue_index.entry(identifier).or_insert_with(|| {
                        residues.push(Residue::new(identifier, res_name, is_ligand));
                        residues.len() - 1
                    });
                    residues[idx].push_atom(atom);
                    kept_serials.insert(serial);
                }
                "CONECT" if !options.omit_edges => {
                    let serials: Vec<usize> = line
                        .get(6..)
                        .unwrap_or("")
                        .split_whitespace()
                        .filter_map(|s| s.parse().ok())
                        .collect();
                    if let Some((&origin, bonded)) = serials.split_first() {
                        edges.extend(bonded.iter().map(|&other| Edge::new(origin, other)));
                    }
                }
                "ENDMDL" | "END" => break,
                _ => {}
            }
        }

        if !seen_atoms {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }

        let structure_id = if options.identifier_from_filename {
            fallback_id.map(str::to_string).or(header_id)
        } else {
            header_id.or_else(|| fallback_id.map(str::to_string))
        }
        .unwrap_or_default();

        edges.retain(|e| {
            e.atom1_serial != e.atom2_serial
                && kept_serials.contains(&e.atom1_serial)
                && kept_serials.contains(&e.atom2_serial)
        });

        Ok(Motif::new(&structure_id, residues).with_edges(edges))
    }

    fn write_to(motif: &Motif, writer: &mut impl Write) -> Result<(), Self::Error> {
        if !motif.structure_id().is_empty() {
            writeln!(
                writer,
                "HEADER    {:<40}{:<9}   {}",
                "STRUCTURAL MOTIF",
                "",
                motif.structure_id()
            )?;
        }
        writeln!(writer, "REMARK   1 MOTIF {}", motif.identity())?;

        for residue in motif.residues() {
            let record_type = if residue.is_ligand { "HETATM" } else { "ATOM" };
            let id = residue.identifier;
            for atom in residue.atoms() {
                let name_field = if atom.name.len() < 4 && atom.element.len() == 1 {
                    format!(" {:<3}", atom.name)
                } else {
                    format!("{:<4}", atom.name)
                };
                writeln!(
                    writer,
                    "{:<6}{:>5} {} {:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
                    record_type,
                    atom.serial,
                    name_field,
                    residue.name,
                    id.chain_id,
                    id.serial,
                    id.insertion_code.unwrap_or(' '),
                    atom.position.x,
                    atom.position.y,
                    atom.position.z,
                    atom.occupancy,
                    atom.b_factor,
                    atom.element
                )?;
            }
        }

        for edge in motif.edges() {
            writeln!(
                writer,
                "CONECT{:>5}{:>5}",
                edge.atom1_serial, edge.atom2_serial
            )?;
        }

        writeln!(writer, "END")?;
        Ok(())
    }
}
