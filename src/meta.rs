use std::collections::BTreeMap;

use cargo_metadata::MetadataCommand;
use serde::{Deserialize, Serialize};
use sysinfo::{CpuExt, System, SystemExt};

/// Static environment facts collected once per run and merged into every
/// result record of that run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Run start, seconds since the epoch
    pub timestamp: i64,
    pub host: String,
    pub platform: String,
    pub processor: String,
    pub cpu_count: usize,
    pub ram_bytes: u64,
    /// Current commit id, `-dirty` suffixed when the working tree has
    /// uncommitted changes
    pub commit: Option<String>,
    pub branch: Option<String>,
    /// Root package version of the project under benchmark
    pub version: Option<String>,
    pub rustc: String,
    /// User-supplied extra keys, usable as partition keys
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl RunMetadata {
    /// Value of a partition key for building the result save path.
    pub fn partition_value(&self, key: &str) -> Option<String> {
        match key {
            "timestamp" => Some(self.timestamp.to_string()),
            "host" => Some(self.host.clone()),
            "commit" => self.commit.clone(),
            "branch" => self.branch.clone(),
            "version" => self.version.clone(),
            _ => self.extra.get(key).cloned(),
        }
    }
}

fn get_commit(git_info: &git_info2::types::GitInfo) -> Option<String> {
    let mut hash = git_info.head.last_commit_hash.clone()?;
    if git_info.dirty.unwrap_or_default() {
        hash += "-dirty";
    }
    Some(hash)
}

fn get_project_version() -> Option<String> {
    let meta = MetadataCommand::new()
        .manifest_path("./Cargo.toml")
        .exec()
        .ok()?;
    meta.root_package().map(|pkg| pkg.version.to_string())
}

fn get_rustc_version() -> Option<String> {
    let vmeta = rustc_version::version_meta().ok()?;
    Some(format!(
        "{} ({})",
        vmeta.semver,
        format!("{:?}", vmeta.channel).to_lowercase()
    ))
}

/// Take the per-run environment snapshot. Called once per run, not per case.
pub fn collect_metadata(extra: &BTreeMap<String, String>) -> RunMetadata {
    let mut sys = System::new_all();
    sys.refresh_all();
    let git_info = git_info2::get();
    const UNKNOWN: &str = "<unknown>";
    RunMetadata {
        timestamp: chrono::Local::now().timestamp(),
        host: sys.host_name().unwrap_or(UNKNOWN.to_string()),
        platform: format!(
            "{} ({})",
            sys.long_os_version().unwrap_or(UNKNOWN.to_string()),
            std::env::consts::ARCH
        ),
        processor: sys.global_cpu_info().brand().to_owned(),
        cpu_count: sys.cpus().len(),
        ram_bytes: sys.available_memory(),
        commit: get_commit(&git_info),
        branch: git_info.current_branch.clone(),
        version: get_project_version(),
        rustc: get_rustc_version().unwrap_or_else(|| UNKNOWN.to_string()),
        extra: extra.clone(),
    }
}
