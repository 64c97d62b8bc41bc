//! Environment context
//!
//! Run state that has to survive a process boundary is carried in environment
//! variables: the execution engine spawns worker processes that inherit the
//! parent environment and re-derive the same context from it. There is no
//! separate IPC channel for configuration.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable carrying the crash dump path.
pub const DUMP_FILE_ENV: &str = "DUMPBENCH_DUMP_FILE";

/// Environment variable carrying an optional worker-runtime override path.
pub const RUNTIME_ENV: &str = "DUMPBENCH_RUNTIME";

/// Errors raised when required context is absent.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The dump path was neither passed as an argument nor present in the
    /// environment. There is no safe default: architecture resolution is
    /// meaningless without a dump.
    #[error("no crash dump configured; pass a dump path or set '{DUMP_FILE_ENV}'")]
    DumpPathNotSet,
}

/// Record the dump path in the process environment.
///
/// Child processes spawned afterwards inherit the value, which is how the
/// context crosses process boundaries.
pub fn set_dump_path(path: &Path) {
    std::env::set_var(DUMP_FILE_ENV, path);
}

/// The configured dump path.
///
/// Fails with [`EnvError::DumpPathNotSet`] when the variable is unset or
/// blank; this is a hard requirement, not a recoverable condition.
pub fn dump_path() -> Result<PathBuf, EnvError> {
    match std::env::var(DUMP_FILE_ENV) {
        Ok(value) if !value.trim().is_empty() => Ok(PathBuf::from(value)),
        _ => Err(EnvError::DumpPathNotSet),
    }
}

/// The optional worker-runtime override, if one is configured.
///
/// Absence is valid; a blank or whitespace-only value counts as absent.
pub fn runtime_override() -> Option<PathBuf> {
    match std::env::var(RUNTIME_ENV) {
        Ok(value) if !value.trim().is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests in this module mutate process-wide environment state and must
    // not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn lock() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn dump_path_round_trips_exactly() {
        let _guard = lock();
        set_dump_path(Path::new("C:\\x.dmp"));
        assert_eq!(dump_path().unwrap(), PathBuf::from("C:\\x.dmp"));
        std::env::remove_var(DUMP_FILE_ENV);
    }

    #[test]
    fn missing_dump_path_is_an_error() {
        let _guard = lock();
        std::env::remove_var(DUMP_FILE_ENV);
        assert!(matches!(dump_path(), Err(EnvError::DumpPathNotSet)));
    }

    #[test]
    fn blank_dump_path_is_an_error() {
        let _guard = lock();
        std::env::set_var(DUMP_FILE_ENV, "   ");
        assert!(matches!(dump_path(), Err(EnvError::DumpPathNotSet)));
        std::env::remove_var(DUMP_FILE_ENV);
    }

    #[test]
    fn runtime_override_absent_is_valid() {
        let _guard = lock();
        std::env::remove_var(RUNTIME_ENV);
        assert_eq!(runtime_override(), None);
    }

    #[test]
    fn blank_runtime_override_counts_as_absent() {
        let _guard = lock();
        std::env::set_var(RUNTIME_ENV, "  ");
        assert_eq!(runtime_override(), None);
        std::env::set_var(RUNTIME_ENV, "/usr/local/bin/dumpbench");
        assert_eq!(
            runtime_override(),
            Some(PathBuf::from("/usr/local/bin/dumpbench"))
        );
        std::env::remove_var(RUNTIME_ENV);
    }
}
