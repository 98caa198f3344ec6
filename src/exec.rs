use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::discovery::BenchmarkCase;
use crate::meta::RunMetadata;

/// Process-wide collector control. The engine pauses the collector around
/// each timed sample (unless the case config keeps it running) and resumes it
/// through an RAII guard, so no case can leak a paused collector into the
/// next one even when the benchmark panics mid-sample.
pub trait Collector: Send + Sync {
    fn pause(&self);
    fn resume(&self);
}

/// Default collector handle for programs with nothing to pause.
pub struct NoopCollector;

impl Collector for NoopCollector {
    fn pause(&self) {}
    fn resume(&self) {}
}

struct CollectorGuard<'a> {
    collector: &'a dyn Collector,
}

impl<'a> CollectorGuard<'a> {
    fn pause(collector: &'a dyn Collector) -> Self {
        collector.pause();
        Self { collector }
    }
}

impl Drop for CollectorGuard<'_> {
    fn drop(&mut self) {
        self.collector.resume();
    }
}

/// Everything measured (or decided) about one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Stable case identifier, function name plus rendered binding
    pub case: String,
    pub function: String,
    /// JSON rendering of the binding; `None` when not parametrized
    pub parameters: Option<String>,
    /// Elapsed seconds per sample, in invocation order, length `repeat`.
    /// Empty for skipped and errored cases. Never aggregated here.
    pub timings: Vec<f64>,
    pub skipped: bool,
    pub skip_reason: Option<String>,
    /// Captured panic message when the function failed during warmup or
    /// timing
    pub error: Option<String>,
    pub config: Config,
    pub metadata: RunMetadata,
}

impl ResultRecord {
    pub fn completed(&self) -> bool {
        !self.skipped && self.error.is_none()
    }

    fn base(case: &BenchmarkCase, metadata: &RunMetadata) -> Self {
        Self {
            case: case.label.clone(),
            function: case.function.clone(),
            parameters: case.parametrized.then(|| case.args.render_json()),
            timings: Vec::new(),
            skipped: false,
            skip_reason: None,
            error: None,
            config: case.config.clone(),
            metadata: metadata.clone(),
        }
    }
}

/// Times one case at a time: skip check, warmups, then `repeat` samples of
/// `number` back-to-back calls each.
pub struct Engine {
    collector: Box<dyn Collector>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            collector: Box::new(NoopCollector),
        }
    }

    pub fn with_collector(collector: Box<dyn Collector>) -> Self {
        Self { collector }
    }

    /// Run one case to completion and produce its record.
    ///
    /// The skip predicate is evaluated here, with no arguments, before the
    /// function is ever invoked. A panic during warmup or timing aborts this
    /// case only; whatever samples were already taken are discarded and the
    /// panic message is captured instead.
    pub fn execute(&self, case: &BenchmarkCase, metadata: &RunMetadata) -> ResultRecord {
        let mut record = ResultRecord::base(case, metadata);
        if let Some(skip) = &case.skip {
            if skip.should_skip() {
                record.skipped = true;
                record.skip_reason = Some(skip.reason.clone());
                return record;
            }
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_case(case)));
        match outcome {
            Ok(timings) => record.timings = timings,
            Err(payload) => record.error = Some(panic_message(payload)),
        }
        record
    }

    fn run_case(&self, case: &BenchmarkCase) -> Vec<f64> {
        let args = match case.setup {
            Some(setup) => setup(&case.args),
            None => case.args.clone(),
        };
        for _ in 0..case.config.warmups {
            (case.func)(&args);
        }
        let mut timings = Vec::with_capacity(case.config.repeat);
        for _ in 0..case.config.repeat {
            let guard = (!case.config.garbage_collection)
                .then(|| CollectorGuard::pause(self.collector.as_ref()));
            let start = Instant::now();
            for _ in 0..case.config.number {
                (case.func)(&args);
            }
            let elapsed = start.elapsed();
            drop(guard);
            timings.push(elapsed.as_secs_f64());
        }
        timings
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "benchmark panicked".to_owned()
    }
}
