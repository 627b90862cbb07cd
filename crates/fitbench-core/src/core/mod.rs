//! # Core Module
//!
//! The foundation shared by the curation pipeline and the benchmark harness.
//!
//! - **Motif Representation** ([`models`]) - Leaf residues, atoms, residue families and the
//!   immutable [`Motif`](models::motif::Motif) built from them
//! - **File I/O** ([`io`]) - The structure source interface, a PDB motif reader/writer,
//!   parser options and chain-list files
//! - **Utilities** ([`utils`]) - Reference points, pairwise distances and atom-name rules
//! - **Configuration Errors** ([`config`]) - Validation failures shared by the config builders

pub mod config;
pub mod io;
pub mod models;
pub mod utils;
