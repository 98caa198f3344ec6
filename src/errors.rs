use std::path::PathBuf;

use thiserror::Error;

/// Errors from resolving a benchmark configuration.
///
/// A `ConfigError` is fatal for the whole run: no case executes with a
/// configuration that failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`repeat` must be at least 1")]
    ZeroRepeat,

    #[error("`number` must be at least 1")]
    ZeroNumber,
}

/// Errors from expanding a parametrization spec.
///
/// Raised while cases are being built, before anything executes. A failing
/// spec drops its whole case group; the run continues with other functions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParametrizeError {
    #[error("no values declared for parameter `{0}`")]
    MissingName(String),

    #[error("row {index} has {found} values, expected {expected}")]
    ArityMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// Run-level discovery failures.
///
/// Per-module load failures are not errors of this type: they are recorded in
/// the discovery result and the run continues.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("benchmark path `{}` does not exist", .0.display())]
    RootNotFound(PathBuf),

    #[error("no benchmark modules found under `{}`", .0.display())]
    NoModules(PathBuf),

    #[error("failed to read benchmark directory: {0}")]
    Io(#[from] std::io::Error),
}
