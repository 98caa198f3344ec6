//! Discovery-based micro benchmark runner.
//!
//! Scans a directory tree for `bench_*.rs` modules, pairs them with
//! registered `bench_*` functions, expands parametrized input combinations,
//! and times each case under controlled repetition. Raw timing samples are
//! recorded together with a per-run environment snapshot so results can be
//! tracked across commits.
//!
//! # Example
//!
//! ```no_run
//! use microbench::{benchmark, black_box, register, ConfigPatch, ParametrizeSpec, Params};
//!
//! fn bench_sum(p: &Params) {
//!     let n = p.int("n") as u64;
//!     black_box((0..n).sum::<u64>());
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     register(
//!         benchmark!(bench_sum)
//!             .config(ConfigPatch::new().repeat(10))
//!             .parametrize(ParametrizeSpec::matrix([("n", vec![1_000, 1_000_000])])),
//!     );
//!     microbench::commands::main()
//! }
//! ```

#[macro_use]
pub mod utils;

pub mod commands;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod exec;
pub mod meta;
pub mod params;
pub mod registry;
pub mod session;
pub mod sink;

pub use config::{load_from_cargo_toml, parse_cargo_metadata, Config, ConfigPatch};
pub use discovery::{build_cases, discover, BenchmarkCase, BenchmarkSpec, Discovery};
pub use errors::{ConfigError, DiscoveryError, ParametrizeError};
pub use exec::{Collector, Engine, NoopCollector, ResultRecord};
pub use meta::{collect_metadata, RunMetadata};
pub use params::{ParamValue, ParametrizeSpec, Params};
pub use registry::{register, BenchFn, Benchmark, Registry, SetupFn, SkipSpec, SkipWhen};
pub use session::{RunOutcome, RunSummary, Session};
pub use sink::{save_results, CsvSink, ResultSink};
pub use std::hint::black_box;
