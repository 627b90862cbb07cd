//! # fitbench Core Library
//!
//! Dataset curation and benchmark harness for structural motif search over large
//! collections of biomolecular structures.
//!
//! ## Architectural Philosophy
//!
//! The library is split into three layers:
//!
//! - **[`core`]: The Foundation.** Immutable motif models, the PDB motif reader/writer,
//!   chain lists and the geometry needed to measure a motif's extent.
//!
//! - **[`curation`]: The Dataset Pipeline.** Filters a raw motif corpus by extent and size,
//!   groups it into size or extent buckets or enumerates it in a total order, and writes
//!   the selected motifs into a reproducible directory layout.
//!
//! - **[`benchmark`]: The Sweep Harness.** Expands parameter grids into configuration
//!   points, times an external search collaborator for each point, reduces the timings to
//!   summary statistics and writes one CSV report per suite.
//!
//! Long-running workflows report their progress through [`progress::ProgressReporter`].

pub mod benchmark;
pub mod core;
pub mod curation;
pub mod progress;
