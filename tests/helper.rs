#![allow(unused)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use microbench::discovery::BenchmarkCase;
use microbench::{BenchFn, Config, Params, RunMetadata};

/// Canned environment snapshot so tests do not depend on the host machine.
pub fn canned_metadata() -> RunMetadata {
    RunMetadata {
        timestamp: 1_700_000_000,
        host: "testhost".to_owned(),
        platform: "Test OS 1.0 (x86_64)".to_owned(),
        processor: "Test CPU".to_owned(),
        cpu_count: 8,
        ram_bytes: 16 << 30,
        commit: Some("abc123".to_owned()),
        branch: Some("main".to_owned()),
        version: Some("0.1.0".to_owned()),
        rustc: "1.75.0 (stable)".to_owned(),
        extra: BTreeMap::new(),
    }
}

/// A bare runnable case around `func`, no skip, no parameters.
pub fn make_case(func: BenchFn, config: Config) -> BenchmarkCase {
    BenchmarkCase {
        label: "counted".to_owned(),
        function: "counted".to_owned(),
        module: PathBuf::from("benchmarks/bench_counted.rs"),
        func,
        skip: None,
        args: Params::empty(),
        parametrized: false,
        setup: None,
        config,
    }
}
