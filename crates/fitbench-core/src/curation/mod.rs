//! # Curation Module
//!
//! Turns a raw corpus of motif files into the curated datasets the benchmark suites read.
//!
//! The pipeline is Structure Source → [`filter::MotifFilter`] → [`classify`] →
//! serialization, driven by [`curator::DatasetCurator`]. Accepted motifs are written
//! either grouped by a [`classify::Dimension`]:
//!
//! ```text
//! <output_root>/size/size_<N>/<motif_identity>.pdb
//! <output_root>/extent/extent_<N>/<motif_identity>.pdb
//! ```
//!
//! or enumerated in `(size, extent, content hash)` order:
//!
//! ```text
//! <output_root>/enumerated/<rank>.pdb
//! ```
//!
//! Destination paths depend only on the motifs' content, so curating an unchanged corpus
//! twice produces byte-identical trees.

pub mod classify;
pub mod config;
pub mod curator;
pub mod error;
pub mod filter;
