pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;

pub use builder::{build_bench_config, build_curate_config};
pub use models::{BenchConfig, CurateConfig};
