//! Platform job builder
//!
//! Builds the run configuration for the host OS and the resolved pointer
//! width. Windows supports both 32- and 64-bit targets, so there the builder
//! must bind a worker runtime matching the dump's width; every other host is
//! treated as single-architecture and uses the default toolchain.

use std::path::PathBuf;
use std::time::Duration;

use dumpbench_core::{ArchWidth, JobConfig, Toolchain};
use thiserror::Error;

/// Fixed worker-runtime location probed under the per-architecture program
/// directory on multi-architecture hosts.
const RUNTIME_SUBPATH: [&str; 2] = ["dumpbench", "dumpbench.exe"];

/// Errors from job configuration.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// No usable worker runtime exists for the resolved architecture. Covers
    /// both a missing override path and a missing standard installation; an
    /// override that does not exist never silently falls back.
    #[error("worker runtime not found: {path}")]
    RuntimeNotFound {
        /// The path that was probed.
        path: PathBuf,
    },
}

/// How the host OS maps onto target architectures.
///
/// A closed set: either the host can execute both widths and the job must
/// pick a runtime for the dump's width, or it runs a single architecture and
/// no branching applies. New platforms get a new variant, not scattered
/// conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformStrategy {
    /// Host executes both 32- and 64-bit targets (Windows).
    MultiArch {
        /// Width resolved from the dump; selects the runtime directory.
        width: ArchWidth,
    },
    /// Host executes a single architecture; default toolchain applies.
    SingleArch,
}

impl PlatformStrategy {
    /// Strategy for the current host OS.
    pub fn host(width: ArchWidth) -> Self {
        if cfg!(windows) {
            PlatformStrategy::MultiArch { width }
        } else {
            PlatformStrategy::SingleArch
        }
    }
}

/// Build the job configuration for the current host and resolved width.
pub fn build_job(
    width: ArchWidth,
    runtime_override: Option<PathBuf>,
) -> Result<JobConfig, PlatformError> {
    build_job_with(PlatformStrategy::host(width), width, runtime_override)
}

/// Strategy-explicit variant of [`build_job`]; lets tests exercise the
/// multi-architecture path on any host.
pub(crate) fn build_job_with(
    strategy: PlatformStrategy,
    width: ArchWidth,
    runtime_override: Option<PathBuf>,
) -> Result<JobConfig, PlatformError> {
    let toolchain = match strategy {
        PlatformStrategy::MultiArch { width } => {
            let runtime = resolve_runtime(width, runtime_override)?;
            match width {
                ArchWidth::Bits32 => Toolchain::X86 { runtime },
                ArchWidth::Bits64 => Toolchain::X64 { runtime },
            }
        }
        PlatformStrategy::SingleArch => Toolchain::Default,
    };

    let id_label = format!(
        "{} {} {}",
        os_description(),
        toolchain.description(),
        width.suffix()
    );

    // Fixed timing policy: this is a comparative harness, not a
    // statistical-significance tool. Bounded counts keep total run time
    // predictable across repeated automated invocations.
    Ok(JobConfig {
        id_label,
        toolchain,
        warmup_count: 1,
        min_iterations: 10,
        max_iterations: 20,
        iteration_duration: Duration::from_secs(1),
        enforce_power_plan: false,
    })
}

/// Resolve the worker runtime for a multi-architecture host.
///
/// An explicit override wins but must exist on disk; otherwise the standard
/// per-architecture program directory is probed for the fixed binary name.
fn resolve_runtime(
    width: ArchWidth,
    runtime_override: Option<PathBuf>,
) -> Result<PathBuf, PlatformError> {
    if let Some(path) = runtime_override {
        if path.exists() {
            return Ok(path);
        }
        return Err(PlatformError::RuntimeNotFound { path });
    }

    let mut candidate = program_files_dir(width);
    for part in RUNTIME_SUBPATH {
        candidate.push(part);
    }
    if candidate.exists() {
        Ok(candidate)
    } else {
        Err(PlatformError::RuntimeNotFound { path: candidate })
    }
}

/// The per-architecture program directory: 4-byte targets install under the
/// 32-bit program directory, 8-byte targets under the 64-bit one.
fn program_files_dir(width: ArchWidth) -> PathBuf {
    let (var, fallback) = match width {
        ArchWidth::Bits32 => ("ProgramFiles(x86)", "C:\\Program Files (x86)"),
        ArchWidth::Bits64 => ("ProgramFiles", "C:\\Program Files"),
    };
    std::env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(fallback))
}

/// Short description of the host OS for the job label.
fn os_description() -> String {
    format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)
}
