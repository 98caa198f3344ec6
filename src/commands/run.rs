use std::path::PathBuf;

use clap::Parser;

use crate::commands::report;
use crate::config;
use crate::print_md;
use crate::registry::Registry;
use crate::session::Session;
use crate::sink;

/// Run all discovered benchmarks
#[derive(Parser)]
pub struct RunArgs {
    /// Path to a benchmark directory or a single benchmark module file.
    /// Defaults to the configured benchpath.
    pub benchpath: Option<PathBuf>,
    /// Disable saving of results
    #[arg(short = 'n', long)]
    pub no_save: bool,
    /// Print an aggregated view of this run
    #[arg(short = 'p', long)]
    pub print: bool,
    /// Only run benchmark functions whose name contains this substring
    #[arg(long)]
    pub filter: Option<String>,
}

impl RunArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let file_config = config::load_from_cargo_toml()?;
        let session = Session::new(file_config)?;
        let registry = Registry::global().lock().unwrap();
        let outcome = session.run(&registry, self.benchpath.as_deref(), self.filter.as_deref())?;
        if !self.no_save {
            let path = sink::save_results(&outcome.records, &outcome.config, &outcome.metadata)?;
            print_md!("\nRaw benchmark results at:\n* `{}`\n", path.display());
        }
        if self.print {
            report::print_records(&outcome.records)?;
        }
        Ok(())
    }
}
