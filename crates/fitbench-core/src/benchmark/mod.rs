//! # Benchmark Module
//!
//! Times an external motif-search collaborator over parameter grids and reduces the
//! timings to one CSV report per suite.
//!
//! A [`suites::Suite`] declares its [`grid::ParameterGrid`] and prepares one measured
//! operation per configuration point from the curated datasets described by
//! [`inputs::DataLayout`]. [`sweep::SweepDriver`] prepares every point up front, hands each
//! operation to a [`sampling::Sampler`] for warm-up and measurement trials, summarizes the
//! retained samples with [`stats::Statistics`] and renders the rows through
//! [`report::ReportWriter`].
//!
//! Points whose trials time out, or whose trials all fail, are left out of the report and
//! listed in [`sweep::SweepOutcome::missing`].

pub mod config;
pub mod error;
pub mod grid;
pub mod inputs;
pub mod report;
pub mod sampling;
pub mod search;
pub mod stats;
pub mod suites;
pub mod sweep;
