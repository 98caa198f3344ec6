use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::Colorize;

use crate::config::{Config, ConfigPatch};
use crate::discovery::{self, ModuleFailure, SpecFailure};
use crate::exec::{Engine, ResultRecord};
use crate::meta::{self, RunMetadata};
use crate::registry::Registry;

/// Per-run outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub skipped: usize,
    pub errored: usize,
    /// True when the run stopped early at a case boundary
    pub interrupted: bool,
}

/// Everything a finished run produced, records in discovery order.
pub struct RunOutcome {
    pub records: Vec<ResultRecord>,
    pub metadata: RunMetadata,
    pub config: Config,
    pub summary: RunSummary,
    pub module_failures: Vec<ModuleFailure>,
    pub spec_failures: Vec<SpecFailure>,
}

/// One benchmark run session: owns the resolved session configuration, the
/// execution engine, and the interrupt flag. Cases run strictly one at a
/// time, in discovery order; concurrent execution would put scheduler noise
/// into the samples.
pub struct Session {
    file_config: ConfigPatch,
    config: Config,
    engine: Engine,
    interrupt: Arc<AtomicBool>,
    extra_metadata: BTreeMap<String, String>,
}

impl Session {
    /// Create a session over the project-file configuration layer.
    /// Validates the session-level merge up front: a bad configuration
    /// aborts before anything is discovered or run.
    pub fn new(file_config: ConfigPatch) -> anyhow::Result<Self> {
        let config = Config::resolve(&Config::default(), &file_config, &ConfigPatch::default())?;
        Ok(Self {
            file_config,
            config,
            engine: Engine::new(),
            interrupt: Arc::new(AtomicBool::new(false)),
            extra_metadata: BTreeMap::new(),
        })
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    /// Session-level configuration (defaults plus project file, before any
    /// per-benchmark override).
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Flag checked between cases only; setting it stops the run at the next
    /// case boundary. A case that is already timing runs to completion.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    /// Merge an extra key into the per-run metadata snapshot.
    pub fn extra_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra_metadata.insert(key.into(), value.into());
    }

    /// Discover, expand, and execute every benchmark under `benchpath`
    /// (defaulting to the configured one), producing records in discovery
    /// order.
    pub fn run(
        &self,
        registry: &Registry,
        benchpath: Option<&Path>,
        filter: Option<&str>,
    ) -> anyhow::Result<RunOutcome> {
        let root: PathBuf = benchpath
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.benchpath.clone());
        let metadata = meta::collect_metadata(&self.extra_metadata);
        self.print_banner(&root, &metadata);

        let found = discovery::discover(&root, registry)?;
        let (cases, spec_failures) = discovery::build_cases(&found, &self.file_config, filter)?;
        if cases.is_empty() {
            anyhow::bail!("no benchmark cases to run");
        }

        let label_len = cases.iter().map(|c| c.label.len()).max().unwrap_or(0) + 3;
        let mut records = Vec::with_capacity(cases.len());
        let mut summary = RunSummary::default();
        for case in &cases {
            if self.interrupt.load(Ordering::SeqCst) {
                summary.interrupted = true;
                log::warn!("interrupted; stopping at case boundary");
                break;
            }
            print!("{}", case.label.blue().bold());
            (0..label_len - case.label.len()).for_each(|_| print!(" "));
            io::stdout().flush()?;
            let record = self.engine.execute(case, &metadata);
            if record.skipped {
                summary.skipped += 1;
                println!("{}", "skipped".yellow());
            } else if let Some(error) = &record.error {
                summary.errored += 1;
                println!("{}", "✘".red());
                log::warn!("`{}` failed: {}", case.label, error);
            } else {
                summary.completed += 1;
                println!("{}", "✔".green());
            }
            records.push(record);
        }

        self.print_summary(&summary, &found.failures, &spec_failures);
        Ok(RunOutcome {
            records,
            metadata,
            config: self.config.clone(),
            summary,
            module_failures: found.failures,
            spec_failures,
        })
    }

    fn print_banner(&self, root: &Path, metadata: &RunMetadata) {
        println!("{}", "starting benchmark session ...".blue());
        println!(
            "benchmarks: `{}`  repeat: {}  number: {}  warmups: {}",
            root.display(),
            self.config.repeat,
            self.config.number,
            self.config.warmups,
        );
        println!(
            "running on {}, {} cpus, RAM: {} MB, commit: {}\n",
            metadata.platform,
            metadata.cpu_count,
            metadata.ram_bytes >> 20,
            metadata.commit.as_deref().unwrap_or("<none>"),
        );
    }

    fn print_summary(
        &self,
        summary: &RunSummary,
        module_failures: &[ModuleFailure],
        spec_failures: &[SpecFailure],
    ) {
        println!(
            "\n{} completed, {} skipped, {} errored",
            summary.completed.to_string().green(),
            summary.skipped.to_string().yellow(),
            summary.errored.to_string().red(),
        );
        for failure in module_failures {
            println!(
                "{} {}: {}",
                "module load failure".red(),
                failure.module.display(),
                failure.error
            );
        }
        for failure in spec_failures {
            println!(
                "{} `{}`: {}",
                "parametrize failure".red(),
                failure.function,
                failure.error
            );
        }
    }
}
