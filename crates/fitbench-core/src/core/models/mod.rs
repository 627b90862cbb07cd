//! # Motif Models
//!
//! Data structures describing a structural motif: an ordered collection of leaf residues,
//! each labeled with a residue family and carrying its atoms' 3-D positions.
//!
//! - [`atom`] - A single atom with name, element and position
//! - [`residue`] - Residue families, leaf identifiers and leaf residues
//! - [`motif`] - The motif itself plus its optional exchangeable-family annotations
//!
//! Motifs are produced by a structure source and never mutated afterwards, except for
//! attaching exchangeable families used by the search collaborator.

pub mod atom;
pub mod motif;
pub mod residue;
