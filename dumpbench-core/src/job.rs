//! Job configuration
//!
//! The immutable bundle of timing and toolchain parameters applied uniformly
//! to every benchmark unit in a run. Built once by the platform job builder,
//! never mutated afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pointer width of the process that produced the dump.
///
/// This is the single source of truth for 32- vs 64-bit decisions downstream;
/// a dump can only ever report one of these two widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchWidth {
    /// 4-byte pointers.
    Bits32,
    /// 8-byte pointers.
    Bits64,
}

impl ArchWidth {
    /// Map a reported pointer size in bytes onto a width, if it is one of
    /// the two valid values.
    pub fn from_pointer_size(bytes: u8) -> Option<Self> {
        match bytes {
            4 => Some(ArchWidth::Bits32),
            8 => Some(ArchWidth::Bits64),
            _ => None,
        }
    }

    /// Pointer size in bytes.
    pub fn pointer_size(self) -> u8 {
        match self {
            ArchWidth::Bits32 => 4,
            ArchWidth::Bits64 => 8,
        }
    }

    /// Human-readable suffix used in job labels.
    pub fn suffix(self) -> &'static str {
        match self {
            ArchWidth::Bits32 => "32bit",
            ArchWidth::Bits64 => "64bit",
        }
    }
}

/// Toolchain descriptor bound to a job.
///
/// On hosts that support more than one target architecture the toolchain
/// carries the resolved worker-runtime executable for the dump's width.
/// Everywhere else the host default applies and worker processes re-run the
/// current executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toolchain {
    /// Host default; single architecture assumed, no bound runtime.
    Default,
    /// 32-bit code generation bound to an explicit runtime executable.
    X86 {
        /// Resolved worker-runtime path.
        runtime: PathBuf,
    },
    /// 64-bit code generation bound to an explicit runtime executable.
    X64 {
        /// Resolved worker-runtime path.
        runtime: PathBuf,
    },
}

impl Toolchain {
    /// The bound runtime executable, when one was resolved.
    pub fn runtime(&self) -> Option<&Path> {
        match self {
            Toolchain::Default => None,
            Toolchain::X86 { runtime } | Toolchain::X64 { runtime } => Some(runtime),
        }
    }

    /// Short description used in the job label.
    pub fn description(&self) -> String {
        match self {
            Toolchain::Default => "default".to_string(),
            Toolchain::X86 { runtime } => format!("x86 ({})", runtime.display()),
            Toolchain::X64 { runtime } => format!("x64 ({})", runtime.display()),
        }
    }
}

/// Run configuration consumed by the execution engine for every unit.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Identifying label combining OS, runtime, and architecture suffix.
    pub id_label: String,
    /// Toolchain matched to the resolved architecture.
    pub toolchain: Toolchain,
    /// Untimed warm-up rounds before measurement.
    pub warmup_count: u32,
    /// Minimum timed iterations per unit.
    pub min_iterations: u32,
    /// Maximum timed iterations per unit.
    pub max_iterations: u32,
    /// Target wall-clock duration of a single timed iteration.
    pub iteration_duration: Duration,
    /// Whether the engine should enforce an OS power plan. Always false here:
    /// the execution environment is assumed pre-tuned, and enforcement would
    /// need elevated privileges.
    pub enforce_power_plan: bool,
}

impl JobConfig {
    /// Validate configuration values, returning a description of the first
    /// error found.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_iterations == 0 {
            return Err("min_iterations must be >= 1".to_string());
        }
        if self.max_iterations < self.min_iterations {
            return Err(format!(
                "max_iterations ({}) must be >= min_iterations ({})",
                self.max_iterations, self.min_iterations
            ));
        }
        if self.iteration_duration.is_zero() {
            return Err("iteration_duration must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JobConfig {
        JobConfig {
            id_label: "linux default 64bit".to_string(),
            toolchain: Toolchain::Default,
            warmup_count: 1,
            min_iterations: 10,
            max_iterations: 20,
            iteration_duration: Duration::from_secs(1),
            enforce_power_plan: false,
        }
    }

    #[test]
    fn width_from_pointer_size() {
        assert_eq!(ArchWidth::from_pointer_size(4), Some(ArchWidth::Bits32));
        assert_eq!(ArchWidth::from_pointer_size(8), Some(ArchWidth::Bits64));
        assert_eq!(ArchWidth::from_pointer_size(0), None);
        assert_eq!(ArchWidth::from_pointer_size(2), None);
        assert_eq!(ArchWidth::from_pointer_size(16), None);
    }

    #[test]
    fn width_round_trip() {
        for width in [ArchWidth::Bits32, ArchWidth::Bits64] {
            assert_eq!(ArchWidth::from_pointer_size(width.pointer_size()), Some(width));
        }
    }

    #[test]
    fn suffixes() {
        assert_eq!(ArchWidth::Bits32.suffix(), "32bit");
        assert_eq!(ArchWidth::Bits64.suffix(), "64bit");
    }

    #[test]
    fn toolchain_runtime_binding() {
        assert_eq!(Toolchain::Default.runtime(), None);
        let tc = Toolchain::X64 {
            runtime: PathBuf::from("/opt/dumpbench/dumpbench"),
        };
        assert_eq!(tc.runtime(), Some(Path::new("/opt/dumpbench/dumpbench")));
        assert!(tc.description().starts_with("x64"));
    }

    #[test]
    fn validate_accepts_fixed_policy() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_min() {
        let mut c = config();
        c.min_iterations = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_max_below_min() {
        let mut c = config();
        c.max_iterations = 5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_duration() {
        let mut c = config();
        c.iteration_duration = Duration::ZERO;
        assert!(c.validate().is_err());
    }
}
