use std::{collections::HashMap, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

const DEFAULT_REPEAT: usize = 30;

/// Fully resolved benchmark settings.
///
/// Built once per case by [`Config::resolve`] from three precedence layers
/// (built-in defaults, project file, per-benchmark override) and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory (or single module file) scanned for benchmarks
    pub benchpath: PathBuf,
    /// Number of timing samples per case
    pub repeat: usize,
    /// Calls per timing sample
    pub number: usize,
    /// Untimed calls before the first sample
    pub warmups: usize,
    /// Leave the collector running while sampling
    pub garbage_collection: bool,
    /// Metadata keys the result sink partitions saved records by
    pub partition_by: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            benchpath: PathBuf::from("benchmarks"),
            repeat: DEFAULT_REPEAT,
            number: 1,
            warmups: 0,
            garbage_collection: false,
            partition_by: vec!["commit".to_owned()],
        }
    }
}

impl Config {
    /// Merge the three precedence layers field by field. Decorator values win
    /// over file values, which win over `defaults`; unset fields fall
    /// through. Pure: no layer is modified.
    pub fn resolve(
        defaults: &Config,
        file: &ConfigPatch,
        decorator: &ConfigPatch,
    ) -> Result<Config, ConfigError> {
        let resolved = defaults.apply(file).apply(decorator);
        resolved.validate()?;
        Ok(resolved)
    }

    fn apply(&self, patch: &ConfigPatch) -> Config {
        Config {
            benchpath: patch.benchpath.clone().unwrap_or_else(|| self.benchpath.clone()),
            repeat: patch.repeat.unwrap_or(self.repeat),
            number: patch.number.unwrap_or(self.number),
            warmups: patch.warmups.unwrap_or(self.warmups),
            garbage_collection: patch.garbage_collection.unwrap_or(self.garbage_collection),
            partition_by: patch
                .partition_by
                .clone()
                .unwrap_or_else(|| self.partition_by.clone()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repeat == 0 {
            return Err(ConfigError::ZeroRepeat);
        }
        if self.number == 0 {
            return Err(ConfigError::ZeroNumber);
        }
        Ok(())
    }
}

/// One precedence layer: every field optional, unset fields fall through to
/// the layer below. Used both for the project file settings and for
/// per-benchmark overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigPatch {
    pub benchpath: Option<PathBuf>,
    pub repeat: Option<usize>,
    pub number: Option<usize>,
    pub warmups: Option<usize>,
    pub garbage_collection: Option<bool>,
    pub partition_by: Option<Vec<String>>,
}

impl ConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn benchpath(mut self, path: impl Into<PathBuf>) -> Self {
        self.benchpath = Some(path.into());
        self
    }

    pub fn repeat(mut self, repeat: usize) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn number(mut self, number: usize) -> Self {
        self.number = Some(number);
        self
    }

    pub fn warmups(mut self, warmups: usize) -> Self {
        self.warmups = Some(warmups);
        self
    }

    pub fn garbage_collection(mut self, enabled: bool) -> Self {
        self.garbage_collection = Some(enabled);
        self
    }

    pub fn partition_by<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.partition_by = Some(keys.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Deserialize)]
struct CargoManifest {
    package: Option<CargoPackage>,
    #[serde(flatten)]
    _others: HashMap<String, toml::Value>,
}

#[derive(Deserialize)]
struct CargoPackage {
    metadata: Option<CargoPackageMetadata>,
    #[serde(flatten)]
    _others: HashMap<String, toml::Value>,
}

#[derive(Deserialize)]
struct CargoPackageMetadata {
    microbench: Option<ConfigPatch>,
    #[serde(flatten)]
    _others: HashMap<String, toml::Value>,
}

/// Parse the `[package.metadata.microbench]` section out of a Cargo.toml
/// document. A missing section is an empty patch, not an error.
pub fn parse_cargo_metadata(manifest: &str) -> anyhow::Result<ConfigPatch> {
    let parsed = toml::from_str::<CargoManifest>(manifest)?;
    Ok(parsed
        .package
        .and_then(|p| p.metadata)
        .and_then(|m| m.microbench)
        .unwrap_or_default())
}

/// Load the project-level configuration layer from `./Cargo.toml`.
pub fn load_from_cargo_toml() -> anyhow::Result<ConfigPatch> {
    if !PathBuf::from("./Cargo.toml").is_file() {
        anyhow::bail!("Failed to load ./Cargo.toml");
    }
    let s = std::fs::read_to_string("./Cargo.toml")?;
    parse_cargo_metadata(&s)
}
