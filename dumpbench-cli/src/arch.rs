//! Architecture resolution
//!
//! Opens the dump once to learn the pointer width of the captured process.
//! This is the single source of truth for 32- vs 64-bit decisions downstream,
//! and the open itself doubles as eager validation of the artifact.

use std::path::Path;

use dumpbench_core::ArchWidth;
use dumpbench_dump::{CacheOptions, Dump, DumpError};
use thiserror::Error;

/// Errors from architecture resolution.
#[derive(Debug, Error)]
pub enum ArchError {
    /// The dump could not be loaded.
    #[error(transparent)]
    Dump(#[from] DumpError),

    /// The dump reported a pointer size that is neither 4 nor 8 bytes.
    /// This is an internal inconsistency, not a user error.
    #[error("dump reports pointer size {0}, expected 4 or 8")]
    UnsupportedPointerSize(u8),
}

/// Resolve the pointer width of the process captured in `dump_path`.
///
/// Opens the dump exactly once through the dump reader. Callers invoke this
/// even when the width will not influence the job: a malformed or missing
/// dump must surface as a fatal startup error here, not later in the run.
pub fn resolve_width(dump_path: &Path, use_os_memory_features: bool) -> Result<ArchWidth, ArchError> {
    let dump = Dump::load(
        dump_path,
        &CacheOptions {
            use_os_memory_features,
        },
    )?;
    ArchWidth::from_pointer_size(dump.pointer_size())
        .ok_or(ArchError::UnsupportedPointerSize(dump.pointer_size()))
}

/// Whether the OS-memory-features read path makes a behavioral difference on
/// this host. Only Windows qualifies; testing the mapped path elsewhere would
/// mislabel results as having exercised it.
pub fn os_memory_features_available() -> bool {
    cfg!(windows)
}
