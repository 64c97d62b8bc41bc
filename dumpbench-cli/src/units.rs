//! Built-in benchmark units.
//!
//! Every unit works against the configured crash dump; bodies read the dump
//! path from the environment context, which is how they also find it when
//! running inside a worker process.

use std::fs::File;
use std::io::Read;

use dumpbench_core::{benchmark_unit, env, Bencher};
use dumpbench_dump::{CacheOptions, Dump};

/// Load the dump from scratch and read the captured pointer size.
fn dump_open(b: &mut Bencher) {
    let path = env::dump_path().expect("dump path is recorded before dispatch");
    b.iter(|| {
        Dump::load(&path, &CacheOptions::default())
            .map(|dump| dump.pointer_size())
            .expect("dump was validated at startup")
    });
}
benchmark_unit!("dump_open", dump_open);

/// Load the dump through a memory mapping instead of plain reads.
fn dump_open_mapped(b: &mut Bencher) {
    let path = env::dump_path().expect("dump path is recorded before dispatch");
    let options = CacheOptions {
        use_os_memory_features: true,
    };
    b.iter(|| {
        Dump::load(&path, &options)
            .map(|dump| dump.pointer_size())
            .expect("dump was validated at startup")
    });
}
benchmark_unit!("dump_open_mapped", dump_open_mapped);

/// Checksum the leading bytes of the dump file.
fn header_checksum(b: &mut Bencher) {
    let path = env::dump_path().expect("dump path is recorded before dispatch");
    let mut buf = vec![0u8; 64 * 1024];
    b.iter(|| {
        let mut file = File::open(&path).expect("dump was validated at startup");
        let read = file.read(&mut buf).unwrap_or(0);
        buf[..read]
            .iter()
            .fold(0u64, |sum, byte| sum.wrapping_add(u64::from(*byte)))
    });
}
benchmark_unit!("header_checksum", header_checksum);
