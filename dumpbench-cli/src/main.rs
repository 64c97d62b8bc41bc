//! dumpbench binary
//!
//! Runs the built-in benchmark units against a crash dump:
//!
//! ```text
//! dumpbench <dump-file> [unit ...]
//! ```

mod units;

fn main() {
    if let Err(err) = dumpbench_cli::run() {
        eprintln!("dumpbench: {err:#}");
        std::process::exit(dumpbench_cli::exit_code(&err));
    }
}
