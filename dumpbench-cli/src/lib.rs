#![warn(missing_docs)]
//! dumpbench CLI library
//!
//! Orchestrates a benchmark run against a crash dump: records the run context
//! in the environment, resolves the target architecture from the dump, builds
//! the platform job configuration, resolves the selected units, and
//! dispatches them to the execution engine.
//!
//! The flow is a straight line; any failure is terminal for the whole run:
//!
//! ```text
//! Start → ContextRecorded → ArchitectureResolved → ConfigurationBuilt
//!       → UnitsResolved → Dispatched
//! ```

pub mod arch;
pub mod executor;
pub mod platform;
pub mod selector;

pub use executor::{EngineError, ExecutionEngine};
pub use platform::{PlatformError, PlatformStrategy};
pub use selector::{SelectError, UNKNOWN_UNIT_EXIT_CODE};

use std::path::PathBuf;

use clap::Parser;
use dumpbench_core::env;

/// dumpbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "dumpbench")]
#[command(version, about = "Crash-dump benchmark harness")]
pub struct Cli {
    /// Crash dump to benchmark against. Recorded into the environment so
    /// worker processes see the same dump; when omitted, the path is read
    /// from DUMPBENCH_DUMP_FILE instead.
    pub dump: Option<PathBuf>,

    /// Explicit benchmark unit names to run. Empty means every registered
    /// unit.
    pub units: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run units in-process instead of in isolated worker processes
    #[arg(long)]
    pub in_process: bool,

    /// Internal: run a single unit as a worker process
    #[arg(long = "dump-worker", hide = true, value_name = "UNIT")]
    pub dump_worker: Option<String>,
}

/// Parse arguments and run the orchestrator. Entry point for the binary.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(Cli::parse())
}

/// Run the orchestrator with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Worker mode first, before logging or any other initialization.
    if let Some(unit) = &cli.dump_worker {
        return run_worker(unit);
    }

    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    // ContextRecorded: an explicit dump argument is published to the
    // environment so that it also reaches any spawned worker.
    if let Some(path) = &cli.dump {
        env::set_dump_path(path);
    }
    let dump_path = env::dump_path()?;

    // ArchitectureResolved. This runs even though single-architecture hosts
    // never branch on the width: loading the dump is the validation step,
    // and skipping it would defer failure detection to a less diagnosable
    // point later in the run.
    let width = arch::resolve_width(&dump_path, arch::os_memory_features_available())?;
    tracing::info!(
        pointer_size = width.pointer_size(),
        dump = %dump_path.display(),
        "target architecture resolved"
    );

    // ConfigurationBuilt: immutable from here on.
    let job = platform::build_job(width, env::runtime_override())?;
    tracing::info!(label = %job.id_label, "job configuration built");
    println!("job: {}", job.id_label);

    // UnitsResolved before any dispatch; one bad name aborts everything.
    let engine = ExecutionEngine::new(job, !cli.in_process);
    if cli.units.is_empty() {
        engine.run_all()?;
    } else {
        let units = selector::resolve(&cli.units)?;
        for def in units {
            engine.run_unit(def)?;
        }
    }

    Ok(())
}

/// Exit code for a failed run: the distinguished selection code for unknown
/// units, 1 for everything else.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<SelectError>().is_some() {
        UNKNOWN_UNIT_EXIT_CODE
    } else {
        1
    }
}

/// Worker-mode body: rebuild the whole run context from the inherited
/// environment, exactly as the parent built it, run the one requested unit
/// in-process, and emit the measurement as a single JSON line on stdout.
fn run_worker(unit_id: &str) -> anyhow::Result<()> {
    let dump_path = env::dump_path()?;
    let width = arch::resolve_width(&dump_path, arch::os_memory_features_available())?;
    let job = platform::build_job(width, env::runtime_override())?;
    let def = selector::resolve(&[unit_id])?[0];

    let measurement = dumpbench_core::run_measurement(&job, def.id, def.runner_fn);
    println!("{}", serde_json::to_string(&measurement)?);
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_distinguishes_selection_failures() {
        let select: anyhow::Error = SelectError::UnknownUnit("Foo".to_string()).into();
        assert_eq!(exit_code(&select), UNKNOWN_UNIT_EXIT_CODE);

        let other = anyhow::anyhow!("anything else");
        assert_eq!(exit_code(&other), 1);
    }

    #[test]
    fn cli_parses_dump_and_unit_names() {
        let cli = Cli::parse_from(["dumpbench", "crash.dmp", "alpha", "beta"]);
        assert_eq!(cli.dump, Some(PathBuf::from("crash.dmp")));
        assert_eq!(cli.units, vec!["alpha".to_string(), "beta".to_string()]);
        assert!(cli.dump_worker.is_none());
    }

    #[test]
    fn cli_parses_bare_invocation() {
        let cli = Cli::parse_from(["dumpbench"]);
        assert_eq!(cli.dump, None);
        assert!(cli.units.is_empty());
    }

    #[test]
    fn cli_parses_hidden_worker_flag() {
        let cli = Cli::parse_from(["dumpbench", "--dump-worker", "spin"]);
        assert_eq!(cli.dump_worker.as_deref(), Some("spin"));
    }
}
