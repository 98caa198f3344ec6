use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;

use crate::config::{self, Config, ConfigPatch};
use crate::exec::ResultRecord;
use crate::meta::RunMetadata;
use crate::sink::RESULTS_FILE;
use crate::utils::md::MarkdownPrinter;

pub(crate) mod data;

/// Analyze and report saved benchmark results
#[derive(Parser)]
pub struct ReportArgs {
    /// Path to a results directory or results.csv. Defaults to the latest
    /// saved run under the configured benchpath.
    #[arg(long)]
    pub results: Option<PathBuf>,
}

impl ReportArgs {
    fn find_results_csv(&self) -> anyhow::Result<PathBuf> {
        let csv = match &self.results {
            Some(path) if path.is_dir() => path.join(RESULTS_FILE),
            Some(path) => path.clone(),
            None => {
                let file_config = config::load_from_cargo_toml()?;
                let config =
                    Config::resolve(&Config::default(), &file_config, &ConfigPatch::default())?;
                config.benchpath.join("results").join(RESULTS_FILE)
            }
        };
        if !csv.exists() {
            anyhow::bail!("Benchmark results not found: {}", csv.display());
        }
        Ok(csv)
    }

    fn load_metadata(csv: &PathBuf) -> Option<RunMetadata> {
        let path = csv.parent()?.join("metadata.toml");
        let content = std::fs::read_to_string(path).ok()?;
        toml::from_str(&content).ok()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let csv = self.find_results_csv()?;
        let df = data::get_data(&csv)?;
        let summary = data::summarize(&df)?;

        let mut printer = MarkdownPrinter::new();
        printer.add("# Benchmark Results Summary\n\n");
        if let Some(meta) = Self::load_metadata(&csv) {
            if let Some(time) = DateTime::<Utc>::from_timestamp(meta.timestamp, 0) {
                printer.add(format!(
                    "* Run Time (UTC): `{}`\n",
                    time.format("%Y-%m-%d %H:%M:%S")
                ));
            }
            printer.add(format!("* Platform: `{}`\n", meta.platform));
            printer.add(format!(
                "* Commit: `{}`\n",
                meta.commit.as_deref().unwrap_or("<none>")
            ));
            if let Some(version) = &meta.version {
                printer.add(format!("* Version: `{}`\n", version));
            }
        }
        printer.add("\n");
        printer.add_dataframe(&summary);
        printer.dump();
        Ok(())
    }
}

/// Aggregated view of an in-memory run, used by `run --print`.
pub(crate) fn print_records(records: &[ResultRecord]) -> anyhow::Result<()> {
    let df = data::records_frame(records)?;
    if df.height() == 0 {
        println!("no timing samples to report");
        return Ok(());
    }
    let summary = data::summarize(&df)?;
    let mut printer = MarkdownPrinter::new();
    printer.add("\n## This Run\n\n");
    printer.add_dataframe(&summary);
    printer.dump();
    Ok(())
}
