//! Execution engine
//!
//! Dispatches benchmark units under a shared job configuration. Units run
//! strictly sequentially: benchmark timing requires isolation from cross-unit
//! interference, so there is no overlap and no worker pool.
//!
//! Two modes exist. In-process runs the measurement loop directly. Isolated
//! mode (the default) spawns one worker process per unit; the worker inherits
//! the parent environment, reconstructs the whole run context from it, and
//! hands its measurement back as a single JSON line on stdout.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use dumpbench_core::{run_measurement, BenchmarkDef, JobConfig, UnitMeasurement};
use thiserror::Error;

/// Hidden flag that switches a spawned binary into worker mode.
pub const WORKER_FLAG: &str = "--dump-worker";

/// Errors from dispatching units.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The worker process could not be started.
    #[error("failed to spawn worker: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// The worker exited with a failure status.
    #[error("worker for '{unit}' exited with status {code:?}")]
    WorkerFailed {
        /// Unit the worker was running.
        unit: String,
        /// Worker exit code, if one was available.
        code: Option<i32>,
    },

    /// The worker exited successfully but produced no measurement.
    #[error("worker for '{unit}' produced no output")]
    EmptyWorkerOutput {
        /// Unit the worker was running.
        unit: String,
    },

    /// The worker's output line was not a valid measurement.
    #[error("worker for '{unit}' produced malformed output: {source}")]
    MalformedWorkerOutput {
        /// Unit the worker was running.
        unit: String,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Sequential dispatcher for benchmark units.
pub struct ExecutionEngine {
    job: JobConfig,
    isolated: bool,
}

impl ExecutionEngine {
    /// Create an engine over an already-built job configuration.
    pub fn new(job: JobConfig, isolated: bool) -> Self {
        Self { job, isolated }
    }

    /// The shared job configuration.
    pub fn job(&self) -> &JobConfig {
        &self.job
    }

    /// Run every registered unit, sorted by id, each exactly once.
    pub fn run_all(&self) -> Result<Vec<UnitMeasurement>, EngineError> {
        let units = dumpbench_core::registered_units();
        let mut results = Vec::with_capacity(units.len());
        for def in units {
            results.push(self.run_unit(def)?);
        }
        Ok(results)
    }

    /// Run a single unit and report its summary line.
    pub fn run_unit(&self, def: &BenchmarkDef) -> Result<UnitMeasurement, EngineError> {
        tracing::info!(unit = def.id, isolated = self.isolated, "dispatching unit");
        let measurement = if self.isolated {
            self.run_isolated(def)?
        } else {
            run_measurement(&self.job, def.id, def.runner_fn)
        };
        println!(
            "{:<28} {:>12.1} ns/op  ({} rounds, {} ops)",
            measurement.unit_id,
            measurement.mean_ns_per_op(),
            measurement.iterations(),
            measurement.total_ops
        );
        Ok(measurement)
    }

    /// Run one unit in a fresh worker process and wait for it to finish.
    fn run_isolated(&self, def: &BenchmarkDef) -> Result<UnitMeasurement, EngineError> {
        let binary = self.worker_binary()?;
        // The child inherits the environment; the DUMPBENCH_* variables are
        // the entire context hand-off.
        let output = Command::new(&binary)
            .arg(WORKER_FLAG)
            .arg(def.id)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()?;

        if !output.status.success() {
            return Err(EngineError::WorkerFailed {
                unit: def.id.to_string(),
                code: output.status.code(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| EngineError::EmptyWorkerOutput {
                unit: def.id.to_string(),
            })?;
        serde_json::from_str(line).map_err(|source| EngineError::MalformedWorkerOutput {
            unit: def.id.to_string(),
            source,
        })
    }

    /// The binary to spawn for worker runs: the job's bound toolchain runtime
    /// when one was resolved, otherwise this executable again.
    fn worker_binary(&self) -> Result<PathBuf, EngineError> {
        match self.job.toolchain.runtime() {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(std::env::current_exe()?),
        }
    }
}
