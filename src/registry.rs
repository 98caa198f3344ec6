use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::config::ConfigPatch;
use crate::params::{ParametrizeSpec, Params};

/// A benchmark function. Takes its resolved argument binding (empty when the
/// function is not parametrized) and performs the work to be timed.
pub type BenchFn = fn(&Params);

/// Optional transform applied to a raw parameter binding before it is bound
/// for warmup and timing. Labels and saved records keep the raw binding.
pub type SetupFn = fn(&Params) -> Params;

/// Skip condition: either decided at registration time or deferred to a
/// zero-argument predicate evaluated when the case is about to run, never
/// earlier, so it may consult the runtime environment.
#[derive(Debug, Clone, Copy)]
pub enum SkipWhen {
    Literal(bool),
    Deferred(fn() -> bool),
}

#[derive(Debug, Clone)]
pub struct SkipSpec {
    pub when: SkipWhen,
    pub reason: String,
}

impl SkipSpec {
    pub fn should_skip(&self) -> bool {
        match self.when {
            SkipWhen::Literal(skip) => skip,
            SkipWhen::Deferred(predicate) => predicate(),
        }
    }
}

/// One registered benchmark function together with its side-table metadata.
///
/// The metadata never wraps the callable: the execution engine invokes the
/// registered `fn` pointer directly. Each builder method writes one metadata
/// slot; applying the same slot twice keeps the last value.
#[derive(Clone)]
pub struct Benchmark {
    pub(crate) name: &'static str,
    pub(crate) module: &'static str,
    pub(crate) func: BenchFn,
    pub(crate) config: ConfigPatch,
    pub(crate) skip: Option<SkipSpec>,
    pub(crate) params: Option<ParametrizeSpec>,
    pub(crate) setup: Option<SetupFn>,
}

impl Benchmark {
    /// `module` is the source file the function lives in, as produced by
    /// `file!()`; discovery pairs it with the on-disk module tree. Prefer the
    /// [`benchmark!`](crate::benchmark) macro, which fills both in.
    pub fn new(name: &'static str, module: &'static str, func: BenchFn) -> Self {
        Self {
            name,
            module,
            func,
            config: ConfigPatch::default(),
            skip: None,
            params: None,
            setup: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Per-benchmark configuration override layer.
    pub fn config(mut self, patch: ConfigPatch) -> Self {
        self.config = patch;
        self
    }

    /// Skip this benchmark when `condition` is true.
    pub fn skip_if(mut self, condition: bool, reason: impl Into<String>) -> Self {
        self.skip = Some(SkipSpec {
            when: SkipWhen::Literal(condition),
            reason: reason.into(),
        });
        self
    }

    /// Skip this benchmark when `predicate` returns true at execution time.
    pub fn skip_when(mut self, predicate: fn() -> bool, reason: impl Into<String>) -> Self {
        self.skip = Some(SkipSpec {
            when: SkipWhen::Deferred(predicate),
            reason: reason.into(),
        });
        self
    }

    /// Expand this benchmark into one case per binding of `spec`.
    pub fn parametrize(mut self, spec: ParametrizeSpec) -> Self {
        self.params = Some(spec);
        self
    }

    /// Transform each raw binding into the arguments actually bound for
    /// warmup and timing.
    pub fn setup(mut self, setup: SetupFn) -> Self {
        self.setup = Some(setup);
        self
    }
}

/// The side table mapping function identity to benchmark metadata.
///
/// Registration order is preserved; within one module it decides the order
/// functions run in.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Benchmark>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a benchmark. Re-registering the same `(module, function)`
    /// replaces the earlier entry, so the last applied metadata wins.
    pub fn add(&mut self, bench: Benchmark) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.name == bench.name && e.module == bench.module)
        {
            *existing = bench;
        } else {
            self.entries.push(bench);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[Benchmark] {
        &self.entries
    }

    /// The process-global registry backing the CLI entry point.
    pub fn global() -> &'static Mutex<Registry> {
        static GLOBAL: Lazy<Mutex<Registry>> = Lazy::new(|| Mutex::new(Registry::new()));
        &GLOBAL
    }
}

/// Register into the process-global registry.
pub fn register(bench: Benchmark) {
    Registry::global().lock().unwrap().add(bench);
}

/// Build a [`Benchmark`] from a function item, capturing its name and source
/// file for discovery.
///
/// ```
/// use microbench::{benchmark, register, ConfigPatch, Params};
///
/// fn bench_sum(_p: &Params) {
///     let _ = (0..1000u64).sum::<u64>();
/// }
///
/// register(benchmark!(bench_sum).config(ConfigPatch::new().number(10)));
/// ```
#[macro_export]
macro_rules! benchmark {
    ($func:ident) => {
        $crate::Benchmark::new(stringify!($func), file!(), $func)
    };
}
