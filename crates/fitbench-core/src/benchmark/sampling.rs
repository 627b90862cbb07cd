use super::config::SweepSettings;
use super::error::SearchError;
use super::grid::ConfigurationPoint;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Shared flag telling a running operation to stop as soon as it can.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The unit of work timed by one trial.
///
/// Only `invoke` is timed; setup belongs in the constructor of the implementor.
/// Returns the number of matches found, when the operation knows it.
pub trait MeasuredOperation: Send + Sync {
    fn invoke(&self, cancel: &Cancellation) -> Result<Option<usize>, SearchError>;
}

impl<F> MeasuredOperation for F
where
    F: Fn(&Cancellation) -> Result<Option<usize>, SearchError> + Send + Sync,
{
    fn invoke(&self, cancel: &Cancellation) -> Result<Option<usize>, SearchError> {
        self(cancel)
    }
}

#[derive(Debug)]
pub enum TrialOutcome {
    Completed {
        elapsed: Duration,
        match_count: Option<usize>,
    },
    Failed(SearchError),
    TimedOut,
}

/// Runs single invocations on a worker thread and abandons them after a hard timeout.
#[derive(Debug, Clone, Copy)]
pub struct TrialRunner {
    timeout: Duration,
}

impl TrialRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn run(&self, operation: &Arc<dyn MeasuredOperation>) -> TrialOutcome {
        let cancel = Cancellation::new();
        let (sender, receiver) = mpsc::channel();
        let worker_operation = Arc::clone(operation);
        let worker_cancel = cancel.clone();

        let spawned = thread::Builder::new()
            .name("fitbench-trial".into())
            .spawn(move || {
                let start = Instant::now();
                let result = worker_operation.invoke(&worker_cancel);
                let elapsed = start.elapsed();
                // The receiver is gone once the trial timed out.
                let _ = sender.send((result, elapsed));
            });
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => return TrialOutcome::Failed(SearchError::Io(e)),
        };

        match receiver.recv_timeout(self.timeout) {
            Ok((result, elapsed)) => {
                let _ = handle.join();
                match result {
                    Ok(match_count) => TrialOutcome::Completed {
                        elapsed,
                        match_count,
                    },
                    Err(e) => TrialOutcome::Failed(e),
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                cancel.cancel();
                TrialOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                TrialOutcome::Failed(SearchError::Panicked)
            }
        }
    }
}

/// Retained samples of one configuration point, in milliseconds per operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PointMeasurement {
    Sampled {
        samples: Vec<f64>,
        failures: usize,
        match_count: Option<usize>,
    },
    TimedOut,
}

/// Runs the warm-up and measurement phases for one configuration point.
#[derive(Debug, Clone)]
pub struct Sampler {
    settings: SweepSettings,
    runner: TrialRunner,
}

impl Sampler {
    pub fn new(settings: SweepSettings) -> Self {
        let runner = TrialRunner::new(settings.timeout);
        Self { settings, runner }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self.runner = TrialRunner::new(timeout);
        self
    }

    pub fn settings(&self) -> &SweepSettings {
        &self.settings
    }

    /// Measures `operation` at `point`.
    ///
    /// Each retained sample is the invocation latency divided by
    /// `operations_per_invocation`. A failed trial is dropped on its own; a timed-out
    /// trial abandons the whole point and discards every sample collected for it.
    pub fn measure(
        &self,
        point: &ConfigurationPoint,
        operation: &Arc<dyn MeasuredOperation>,
        operations_per_invocation: u32,
    ) -> PointMeasurement {
        let divisor = f64::from(operations_per_invocation.max(1));

        for iteration in 1..=self.settings.warmup_iterations {
            match self.runner.run(operation) {
                TrialOutcome::Completed { elapsed, .. } => {
                    debug!(%point, iteration, elapsed_ms = elapsed.as_secs_f64() * 1e3, "Warm-up trial finished.");
                }
                TrialOutcome::Failed(e) => {
                    warn!(%point, iteration, error = %e, "Warm-up trial failed.");
                }
                TrialOutcome::TimedOut => {
                    warn!(%point, iteration, timeout = ?self.settings.timeout, "Warm-up trial timed out, abandoning point.");
                    return PointMeasurement::TimedOut;
                }
            }
        }

        let mut samples = Vec::with_capacity(self.settings.measurement_iterations);
        let mut failures = 0;
        let mut match_count = None;
        for iteration in 1..=self.settings.measurement_iterations {
            match self.runner.run(operation) {
                TrialOutcome::Completed {
                    elapsed,
                    match_count: matches,
                } => {
                    let sample = elapsed.as_secs_f64() * 1e3 / divisor;
                    debug!(%point, iteration, sample_ms = sample, "Measurement trial finished.");
                    samples.push(sample);
                    if matches.is_some() {
                        match_count = matches;
                    }
                }
                TrialOutcome::Failed(e) => {
                    warn!(%point, iteration, error = %e, "Measurement trial failed, dropping sample.");
                    failures += 1;
                }
                TrialOutcome::TimedOut => {
                    warn!(%point, iteration, timeout = ?self.settings.timeout, "Measurement trial timed out, abandoning point.");
                    return PointMeasurement::TimedOut;
                }
            }
        }

        PointMeasurement::Sampled {
            samples,
            failures,
            match_count,
        }
    }
}
