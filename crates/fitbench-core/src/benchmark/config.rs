use crate::core::config::ConfigError;
use std::time::Duration;

pub const DEFAULT_WARMUP_ITERATIONS: usize = 5;
pub const DEFAULT_MEASUREMENT_ITERATIONS: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

pub const DEFAULT_EXTENT_RANK_CUTOFF: usize = 3;
pub const DEFAULT_SINGLE_MOTIF_RADIUS: f64 = 5.0;
pub const DEFAULT_ENVIRONMENT_RADIUS: f64 = 8.0;
pub const DEFAULT_ENVIRONMENT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Iteration counts and the hard per-trial timeout shared by every point of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSettings {
    pub warmup_iterations: usize,
    pub measurement_iterations: usize,
    pub timeout: Duration,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            warmup_iterations: DEFAULT_WARMUP_ITERATIONS,
            measurement_iterations: DEFAULT_MEASUREMENT_ITERATIONS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Default)]
pub struct SweepSettingsBuilder {
    warmup_iterations: Option<usize>,
    measurement_iterations: Option<usize>,
    timeout: Option<Duration>,
}

impl SweepSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warmup_iterations(mut self, n: usize) -> Self {
        self.warmup_iterations = Some(n);
        self
    }
    pub fn measurement_iterations(mut self, n: usize) -> Self {
        self.measurement_iterations = Some(n);
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<SweepSettings, ConfigError> {
        let measurement_iterations = self
            .measurement_iterations
            .unwrap_or(DEFAULT_MEASUREMENT_ITERATIONS);
        if measurement_iterations == 0 {
            return Err(ConfigError::invalid(
                "measurement_iterations",
                "at least one measured trial is required",
            ));
        }
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::invalid("timeout", "must be longer than zero"));
        }
        Ok(SweepSettings {
            warmup_iterations: self.warmup_iterations.unwrap_or(DEFAULT_WARMUP_ITERATIONS),
            measurement_iterations,
            timeout,
        })
    }
}
