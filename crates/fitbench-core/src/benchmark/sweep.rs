use super::config::SweepSettings;
use super::error::BenchmarkError;
use super::grid::ConfigurationPoint;
use super::report::{ReportClass, ReportRow, ReportWriter};
use super::sampling::{PointMeasurement, Sampler};
use super::stats::Statistics;
use super::suites::{PreparedPoint, RowField, Suite, SuiteContext};
use crate::progress::{Progress, ProgressReporter};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingReason {
    /// The curated input of this point does not exist.
    MissingInput(PathBuf),
    TimedOut,
    NoSuccessfulTrials,
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingReason::MissingInput(path) => write!(f, "missing input {}", path.display()),
            MissingReason::TimedOut => f.write_str("timed out"),
            MissingReason::NoSuccessfulTrials => f.write_str("no successful trials"),
        }
    }
}

/// A configuration point left out of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingPoint {
    pub point: ConfigurationPoint,
    pub reason: MissingReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredPoint {
    pub point: ConfigurationPoint,
    pub statistics: Statistics,
    pub failures: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    pub class: ReportClass,
    pub measured: Vec<MeasuredPoint>,
    pub rows: Vec<ReportRow>,
    pub missing: Vec<MissingPoint>,
}

/// Expands a suite's grid, measures every point and aggregates the samples.
pub struct SweepDriver {
    settings: SweepSettings,
}

impl SweepDriver {
    pub fn new(settings: SweepSettings) -> Self {
        Self { settings }
    }

    /// Runs the sweep. All points are prepared before the first trial.
    ///
    /// A point whose curated input is absent is reported as missing and the other points
    /// are still measured; any other setup failure fails the run before measuring anything.
    #[instrument(skip_all, name = "sweep_workflow", fields(suite = suite.report_class().name()))]
    pub fn run(
        &self,
        suite: &dyn Suite,
        context: &SuiteContext,
        reporter: &ProgressReporter,
    ) -> Result<SweepOutcome, BenchmarkError> {
        let points = suite.grid()?.points();
        info!(points = points.len(), "Starting sweep.");

        reporter.report(Progress::PhaseStart {
            name: "Preparing Inputs",
        });
        let mut prepared = Vec::with_capacity(points.len());
        for point in &points {
            match suite.prepare(point, context) {
                Ok(ready) => prepared.push(Ok(ready)),
                Err(BenchmarkError::MissingInput { path, .. }) => {
                    warn!(%point, path = %path.display(), "Curated input not found, omitting point from report.");
                    prepared.push(Err(path));
                }
                Err(e) => return Err(e),
            }
        }
        reporter.report(Progress::PhaseFinish);

        let mut sampler = Sampler::new(self.settings.clone());
        if let Some(timeout) = suite.timeout() {
            sampler = sampler.with_timeout(timeout);
        }

        reporter.report(Progress::PhaseStart { name: "Measuring" });
        reporter.report(Progress::TaskStart {
            total: points.len() as u64,
        });

        let mut outcome = SweepOutcome {
            class: suite.report_class(),
            measured: Vec::new(),
            rows: Vec::new(),
            missing: Vec::new(),
        };
        for (point, prepared) in points.into_iter().zip(prepared) {
            reporter.report(Progress::StatusUpdate {
                text: point.to_string(),
            });
            let prepared = match prepared {
                Ok(prepared) => prepared,
                Err(path) => {
                    outcome.missing.push(MissingPoint {
                        point,
                        reason: MissingReason::MissingInput(path),
                    });
                    reporter.report(Progress::TaskIncrement { amount: 1 });
                    continue;
                }
            };
            let measurement = sampler.measure(
                &point,
                &prepared.operation,
                prepared.operations_per_invocation,
            );
            record(&mut outcome, point, &prepared, measurement);
            reporter.report(Progress::TaskIncrement { amount: 1 });
        }

        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);
        info!(
            rows = outcome.rows.len(),
            missing = outcome.missing.len(),
            "Sweep complete."
        );
        Ok(outcome)
    }

    /// Runs the sweep and writes its report to `path`.
    pub fn run_to_file(
        &self,
        suite: &dyn Suite,
        context: &SuiteContext,
        path: &Path,
        reporter: &ProgressReporter,
    ) -> Result<SweepOutcome, BenchmarkError> {
        let outcome = self.run(suite, context, reporter)?;
        ReportWriter::new(outcome.class).write(&outcome.rows, path)?;
        Ok(outcome)
    }
}

fn record(
    outcome: &mut SweepOutcome,
    point: ConfigurationPoint,
    prepared: &PreparedPoint,
    measurement: PointMeasurement,
) {
    let (samples, failures, match_count) = match measurement {
        PointMeasurement::TimedOut => {
            outcome.missing.push(MissingPoint {
                point,
                reason: MissingReason::TimedOut,
            });
            return;
        }
        PointMeasurement::Sampled {
            samples,
            failures,
            match_count,
        } => (samples, failures, match_count),
    };

    let Some(statistics) = Statistics::from_samples(&samples) else {
        warn!(%point, failures, "Every trial failed, omitting point from report.");
        outcome.missing.push(MissingPoint {
            point,
            reason: MissingReason::NoSuccessfulTrials,
        });
        return;
    };

    let fields = prepared
        .fields
        .iter()
        .map(|field| match field {
            RowField::Value(value) => value.to_string(),
            RowField::MatchCount => match_count.map(|n| n.to_string()).unwrap_or_default(),
        })
        .collect();
    outcome.rows.push(ReportRow::new(fields, &statistics));
    outcome.measured.push(MeasuredPoint {
        point,
        statistics,
        failures,
    });
}
