//! Benchmark selection
//!
//! Maps explicitly requested unit names onto registered units. Selection is
//! all-or-nothing: one unknown name aborts the whole run before anything is
//! dispatched, with a distinguished exit code so automation can tell bad
//! input from a bad environment.

use dumpbench_core::BenchmarkDef;
use thiserror::Error;

/// Exit code for a selection failure (unknown unit name).
pub const UNKNOWN_UNIT_EXIT_CODE: i32 = 2;

/// Errors from benchmark selection.
#[derive(Debug, Error)]
pub enum SelectError {
    /// A requested name matched no registered unit.
    #[error("benchmark '{0}' not found")]
    UnknownUnit(String),
}

/// Resolve explicit unit names against the registry.
///
/// Names match unit ids case-insensitively and exactly; order of the result
/// follows the order of the request. The empty request is not handled here:
/// the orchestrator maps it to "run everything".
pub fn resolve<S: AsRef<str>>(names: &[S]) -> Result<Vec<&'static BenchmarkDef>, SelectError> {
    let units = dumpbench_core::registered_units();
    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        let def = units
            .iter()
            .find(|def| def.id.eq_ignore_ascii_case(name))
            .ok_or_else(|| SelectError::UnknownUnit(name.to_string()))?;
        resolved.push(*def);
    }
    Ok(resolved)
}
