use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::exec::ResultRecord;
use crate::meta::RunMetadata;

/// Consumes the run's record stream, in discovery order. The engine has no
/// knowledge of the storage format behind `append`.
pub trait ResultSink {
    fn append(&mut self, record: &ResultRecord) -> anyhow::Result<()>;

    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

const CSV_HEADER: &str = "function,parameters,case,sample,time,repeat,number,warmups,\
                          garbage_collection,skipped,skip_reason,error";

/// Long-format CSV sink: one row per timing sample, plus one row per skipped
/// or errored case so those outcomes stay visible in the saved data.
pub struct CsvSink {
    file: File,
}

impl CsvSink {
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(path)?;
        writeln!(file, "{}", CSV_HEADER)?;
        Ok(Self { file })
    }

    fn write_row(
        &mut self,
        record: &ResultRecord,
        sample: Option<usize>,
        time: Option<f64>,
    ) -> anyhow::Result<()> {
        let fields = [
            escape(&record.function),
            record.parameters.as_deref().map(escape).unwrap_or_default(),
            escape(&record.case),
            sample.map(|s| s.to_string()).unwrap_or_default(),
            time.map(|t| t.to_string()).unwrap_or_default(),
            record.config.repeat.to_string(),
            record.config.number.to_string(),
            record.config.warmups.to_string(),
            record.config.garbage_collection.to_string(),
            record.skipped.to_string(),
            record.skip_reason.as_deref().map(escape).unwrap_or_default(),
            record.error.as_deref().map(escape).unwrap_or_default(),
        ];
        writeln!(self.file, "{}", fields.join(","))?;
        Ok(())
    }
}

impl ResultSink for CsvSink {
    fn append(&mut self, record: &ResultRecord) -> anyhow::Result<()> {
        if record.timings.is_empty() {
            self.write_row(record, None, None)?;
        } else {
            for (sample, time) in record.timings.iter().enumerate() {
                self.write_row(record, Some(sample), Some(*time))?;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.file.flush()?;
        Ok(())
    }
}

fn escape(field: &str) -> String {
    if field.contains(['"', ',', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

/// Result file name inside a results directory.
pub const RESULTS_FILE: &str = "results.csv";
const METADATA_FILE: &str = "metadata.toml";

/// Persist a run: records go to
/// `<benchpath>/results/historical/<key>=<value>/results.csv` (one partition
/// directory level per `partition_by` key), with a copy at
/// `<benchpath>/results/results.csv` as the latest snapshot. The metadata
/// snapshot is written beside both CSVs. Returns the latest-snapshot path.
pub fn save_results(
    records: &[ResultRecord],
    config: &Config,
    metadata: &RunMetadata,
) -> anyhow::Result<PathBuf> {
    let results_dir = config.benchpath.join("results");
    let mut save_dir = results_dir.join("historical");
    for key in &config.partition_by {
        let value = metadata
            .partition_value(key)
            .unwrap_or_else(|| "unknown".to_owned());
        save_dir = save_dir.join(format!("{}={}", key, sanitize(&value)));
    }
    std::fs::create_dir_all(&save_dir)?;

    let save_path = save_dir.join(RESULTS_FILE);
    let mut sink = CsvSink::create(&save_path)?;
    for record in records {
        sink.append(record)?;
    }
    sink.finish()?;
    std::fs::write(save_dir.join(METADATA_FILE), toml::to_string(metadata)?)?;

    let latest = results_dir.join(RESULTS_FILE);
    std::fs::copy(&save_path, &latest)?;
    std::fs::write(results_dir.join(METADATA_FILE), toml::to_string(metadata)?)?;
    Ok(latest)
}

/// Partition values become path components; strip the separators out.
fn sanitize(value: &str) -> String {
    value.replace(['/', '\\'], "-")
}
