//! Provides input/output for motif structure files and benchmark input lists.
//!
//! Motif files are read through the [`traits::StructureFile`] interface, which takes
//! [`options::ParserOptions`] to decide which data is kept. [`pdb::PdbFile`] is the
//! implementation for the PDB text format; [`chain_list`] reads the tab-separated
//! structure lists that bound a benchmark's dataset size.

pub mod chain_list;
pub mod options;
pub mod pdb;
pub mod traits;
