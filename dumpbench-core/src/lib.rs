#![warn(missing_docs)]
//! dumpbench core - unit registry and measurement runtime
//!
//! This crate provides the pieces shared between the orchestrating process and
//! any worker process it spawns:
//! - the benchmark unit registry (`BenchmarkDef` + [`benchmark_unit!`])
//! - the environment context that carries run state across process boundaries
//! - the job configuration consumed by the execution engine
//! - the measurement loop that turns a unit body into timed samples

pub mod env;
pub mod job;
pub mod measure;

pub use job::{ArchWidth, JobConfig, Toolchain};
pub use measure::{run_measurement, Bencher, SamplePoint, UnitMeasurement};

// Re-exported for the `benchmark_unit!` macro expansion.
#[doc(hidden)]
pub use inventory;

/// A registered benchmark unit.
///
/// Units are registered at link time via [`benchmark_unit!`]; the set of known
/// units is whatever the final binary linked in. The orchestrator only maps
/// requested names onto these definitions, it never discovers units by other
/// means.
#[derive(Debug, Clone)]
pub struct BenchmarkDef {
    /// Unique unit identifier; matched case-insensitively by the selector.
    pub id: &'static str,
    /// The measured body. Called repeatedly by the measurement loop.
    pub runner_fn: fn(&mut Bencher),
    /// Source file the unit was registered in.
    pub file: &'static str,
    /// Source line of the registration.
    pub line: u32,
}

inventory::collect!(BenchmarkDef);

/// All registered benchmark units, sorted by id.
///
/// Sorting gives a deterministic dispatch order regardless of link order.
pub fn registered_units() -> Vec<&'static BenchmarkDef> {
    let mut units: Vec<_> = inventory::iter::<BenchmarkDef>.into_iter().collect();
    units.sort_by_key(|u| u.id);
    units
}

/// Register a benchmark unit under a fixed id.
///
/// ```ignore
/// fn my_unit(b: &mut Bencher) {
///     b.iter(|| expensive_operation());
/// }
/// dumpbench_core::benchmark_unit!("my_unit", my_unit);
/// ```
#[macro_export]
macro_rules! benchmark_unit {
    ($id:literal, $runner:path) => {
        $crate::inventory::submit! {
            $crate::BenchmarkDef {
                id: $id,
                runner_fn: $runner,
                file: file!(),
                line: line!(),
            }
        }
    };
}

/// Anchor to prevent LTO from stripping inventory entries
#[used]
#[doc(hidden)]
pub static REGISTRY_ANCHOR: fn() = || {
    for _ in inventory::iter::<BenchmarkDef> {}
};
