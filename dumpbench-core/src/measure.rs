//! Measurement loop
//!
//! Turns a benchmark unit body into timed samples under a [`JobConfig`]:
//! warm-up rounds first, then timed rounds of `iteration_duration` each,
//! bounded by the job's min/max iteration counts. This is the shared
//! implementation used both in-process and by worker processes.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::job::JobConfig;

/// Relative standard deviation below which a run is considered settled and
/// may stop before `max_iterations` (never before `min_iterations`).
const SETTLED_RSD: f64 = 0.02;

/// Iteration control handed to a benchmark unit body.
///
/// The body calls [`Bencher::iter`] once per operation; the surrounding round
/// keeps invoking the body until the round's time budget is spent.
pub struct Bencher {
    ops: u64,
    elapsed: Duration,
}

impl Bencher {
    fn new() -> Self {
        Self {
            ops: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Time one operation.
    #[inline]
    pub fn iter<T, F>(&mut self, f: F)
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let _ = std::hint::black_box(f());
        self.elapsed += start.elapsed();
        self.ops += 1;
    }

    /// Operations timed so far in this round.
    pub fn ops(&self) -> u64 {
        self.ops
    }
}

/// One timed round: how many operations ran and how long they took.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Operations completed in this round.
    pub ops: u64,
    /// Time spent inside [`Bencher::iter`] during this round, in nanoseconds.
    pub elapsed_ns: u64,
}

impl SamplePoint {
    /// Mean nanoseconds per operation for this round.
    pub fn ns_per_op(&self) -> f64 {
        if self.ops == 0 {
            0.0
        } else {
            self.elapsed_ns as f64 / self.ops as f64
        }
    }
}

/// Completed measurement of a single unit.
///
/// Serialized as one JSON line when crossing the worker process boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitMeasurement {
    /// Id of the measured unit.
    pub unit_id: String,
    /// One entry per timed round.
    pub samples: Vec<SamplePoint>,
    /// Operations across all timed rounds.
    pub total_ops: u64,
    /// Nanoseconds across all timed rounds.
    pub total_elapsed_ns: u64,
}

impl UnitMeasurement {
    /// Number of timed rounds performed.
    pub fn iterations(&self) -> usize {
        self.samples.len()
    }

    /// Mean nanoseconds per operation across all rounds.
    pub fn mean_ns_per_op(&self) -> f64 {
        if self.total_ops == 0 {
            0.0
        } else {
            self.total_elapsed_ns as f64 / self.total_ops as f64
        }
    }
}

/// Run one round: invoke the unit body until the wall-clock budget is spent.
fn run_round(runner_fn: fn(&mut Bencher), budget: Duration) -> SamplePoint {
    let mut bencher = Bencher::new();
    let start = Instant::now();
    loop {
        runner_fn(&mut bencher);
        if start.elapsed() >= budget {
            break;
        }
    }
    SamplePoint {
        ops: bencher.ops,
        elapsed_ns: bencher.elapsed.as_nanos() as u64,
    }
}

/// Whether the per-round means have settled enough to stop early.
fn spread_settled(samples: &[SamplePoint]) -> bool {
    let means: Vec<f64> = samples.iter().map(SamplePoint::ns_per_op).collect();
    let n = means.len() as f64;
    let mean = means.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return true;
    }
    let variance = means.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean < SETTLED_RSD
}

/// Run the full measurement for one unit: warm-up, then bounded timed rounds.
///
/// Always performs at least `min_iterations` rounds and never more than
/// `max_iterations`; between the two it stops once the sample spread settles.
pub fn run_measurement(
    job: &JobConfig,
    unit_id: &str,
    runner_fn: fn(&mut Bencher),
) -> UnitMeasurement {
    for round in 0..job.warmup_count {
        tracing::debug!(unit = unit_id, round, "warm-up round");
        let _ = run_round(runner_fn, job.iteration_duration);
    }

    let min = job.min_iterations.max(1) as usize;
    let max = job.max_iterations.max(job.min_iterations) as usize;

    let mut samples = Vec::with_capacity(max);
    loop {
        samples.push(run_round(runner_fn, job.iteration_duration));
        if samples.len() >= max {
            break;
        }
        if samples.len() >= min && spread_settled(&samples) {
            break;
        }
    }

    let total_ops = samples.iter().map(|s| s.ops).sum();
    let total_elapsed_ns = samples.iter().map(|s| s.elapsed_ns).sum();
    tracing::debug!(
        unit = unit_id,
        rounds = samples.len(),
        total_ops,
        "measurement complete"
    );

    UnitMeasurement {
        unit_id: unit_id.to_string(),
        samples,
        total_ops,
        total_elapsed_ns,
    }
}
