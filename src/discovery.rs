use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigPatch};
use crate::errors::{ConfigError, DiscoveryError, ParametrizeError};
use crate::params::{ParametrizeSpec, Params};
use crate::registry::{BenchFn, Registry, SetupFn, SkipSpec};

const MODULE_PREFIX: &str = "bench_";

/// Static description of one discovered benchmark function.
#[derive(Debug)]
pub struct BenchmarkSpec {
    /// Registered function name, `bench_` prefix included
    pub fn_name: String,
    /// Reported name, prefix stripped
    pub name: String,
    /// The on-disk module file the function was discovered in
    pub module: PathBuf,
    pub func: BenchFn,
    pub config: ConfigPatch,
    pub skip: Option<SkipSpec>,
    pub params: Option<ParametrizeSpec>,
    pub setup: Option<SetupFn>,
}

/// A module that was found on disk but could not be loaded. Non-fatal: the
/// run continues and the failure is surfaced in the end-of-run summary.
#[derive(Debug, Clone)]
pub struct ModuleFailure {
    pub module: PathBuf,
    pub error: String,
}

/// A spec whose parametrization failed to expand. The whole case group is
/// dropped; the run continues with other specs.
#[derive(Debug, Clone)]
pub struct SpecFailure {
    pub function: String,
    pub module: PathBuf,
    pub error: ParametrizeError,
}

#[derive(Debug)]
pub struct Discovery {
    /// Eligible module files, in traversal order
    pub modules: Vec<PathBuf>,
    /// Specs in traversal order: modules lexicographic, functions in
    /// registration order within a module
    pub specs: Vec<BenchmarkSpec>,
    pub failures: Vec<ModuleFailure>,
}

/// One concrete runnable unit, consumed read-only by the execution engine.
pub struct BenchmarkCase {
    /// Reported function name plus a stable rendering of the binding,
    /// e.g. `my_func[a=1,b=5]`. Reproducible across runs with identical
    /// inputs.
    pub label: String,
    pub function: String,
    pub module: PathBuf,
    pub func: BenchFn,
    pub skip: Option<SkipSpec>,
    /// The raw binding, empty when not parametrized. This is what labels and
    /// saved records show.
    pub args: Params,
    pub parametrized: bool,
    pub setup: Option<SetupFn>,
    pub config: Config,
}

/// Walk `root` and pair every eligible module with the registered benchmark
/// functions it contains.
///
/// A module is eligible when its file name starts with `bench_` and ends in
/// `.rs`; `root` may also name a single module file directly. Directories and
/// files are visited in lexicographic path order so an unchanged tree always
/// yields the same spec sequence.
pub fn discover(root: &Path, registry: &Registry) -> Result<Discovery, DiscoveryError> {
    if !root.exists() {
        return Err(DiscoveryError::RootNotFound(root.to_owned()));
    }
    let mut modules = Vec::new();
    if root.is_file() {
        modules.push(root.to_owned());
    } else {
        walk(root, &mut modules)?;
    }
    if modules.is_empty() {
        return Err(DiscoveryError::NoModules(root.to_owned()));
    }

    let mut specs = Vec::new();
    let mut failures = Vec::new();
    for module in &modules {
        let entries: Vec<_> = registry
            .entries()
            .iter()
            .filter(|e| same_module(module, Path::new(e.module)))
            .collect();
        if entries.is_empty() {
            log::warn!("module {} failed to load", module.display());
            failures.push(ModuleFailure {
                module: module.clone(),
                error: "no registered benchmark functions; module not linked into this runner"
                    .to_owned(),
            });
            continue;
        }
        for entry in entries {
            let Some(stripped) = entry.name.strip_prefix(MODULE_PREFIX) else {
                continue;
            };
            specs.push(BenchmarkSpec {
                fn_name: entry.name.to_owned(),
                name: stripped.to_owned(),
                module: module.clone(),
                func: entry.func,
                config: entry.config.clone(),
                skip: entry.skip.clone(),
                params: entry.params.clone(),
                setup: entry.setup,
            });
        }
    }
    Ok(Discovery {
        modules,
        specs,
        failures,
    })
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    paths.sort();
    for path in paths {
        if path.is_dir() {
            walk(&path, out)?;
        } else if is_module(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_module(path: &Path) -> bool {
    let stem_eligible = path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.starts_with(MODULE_PREFIX));
    stem_eligible && path.extension().and_then(|e| e.to_str()) == Some("rs")
}

/// Registration records the module via `file!()` (crate-relative), while
/// discovery may hand out absolute paths, so two paths refer to the same
/// module when one is a component suffix of the other.
fn same_module(discovered: &Path, registered: &Path) -> bool {
    is_component_suffix(registered, discovered) || is_component_suffix(discovered, registered)
}

fn is_component_suffix(shorter: &Path, longer: &Path) -> bool {
    let s: Vec<_> = shorter.components().collect();
    let l: Vec<_> = longer.components().collect();
    !s.is_empty() && s.len() <= l.len() && l[l.len() - s.len()..] == s[..]
}

/// Expand every spec into concrete cases with fully resolved configuration.
///
/// Configuration failures are fatal (no case may run without a valid
/// `Config`); expansion failures drop only the owning spec's case group and
/// are returned for the run summary.
pub fn build_cases(
    discovery: &Discovery,
    file_config: &ConfigPatch,
    filter: Option<&str>,
) -> Result<(Vec<BenchmarkCase>, Vec<SpecFailure>), ConfigError> {
    let defaults = Config::default();
    let mut cases = Vec::new();
    let mut failures = Vec::new();
    for spec in &discovery.specs {
        if let Some(filter) = filter {
            if !spec.name.contains(filter) {
                continue;
            }
        }
        let resolved = Config::resolve(&defaults, file_config, &spec.config)?;
        let bindings = match &spec.params {
            None => None,
            Some(params) => match params.expand() {
                Ok(bindings) => Some(bindings),
                Err(error) => {
                    log::warn!("cannot expand parameters of `{}`: {}", spec.fn_name, error);
                    failures.push(SpecFailure {
                        function: spec.fn_name.clone(),
                        module: spec.module.clone(),
                        error,
                    });
                    continue;
                }
            },
        };
        match bindings {
            None => cases.push(BenchmarkCase {
                label: spec.name.clone(),
                function: spec.name.clone(),
                module: spec.module.clone(),
                func: spec.func,
                skip: spec.skip.clone(),
                args: Params::empty(),
                parametrized: false,
                setup: spec.setup,
                config: resolved,
            }),
            Some(bindings) => {
                for binding in bindings {
                    cases.push(BenchmarkCase {
                        label: format!("{}[{}]", spec.name, binding.label_fragment()),
                        function: spec.name.clone(),
                        module: spec.module.clone(),
                        func: spec.func,
                        skip: spec.skip.clone(),
                        args: binding,
                        parametrized: true,
                        setup: spec.setup,
                        config: resolved.clone(),
                    });
                }
            }
        }
    }
    Ok((cases, failures))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_paths_match_by_component_suffix() {
        assert!(same_module(
            Path::new("/tmp/x/benchmarks/bench_a.rs"),
            Path::new("benchmarks/bench_a.rs"),
        ));
        assert!(!same_module(
            Path::new("/tmp/x/benchmarks/bench_a.rs"),
            Path::new("other/bench_a.rs"),
        ));
    }

    #[test]
    fn module_eligibility_requires_prefix_and_extension() {
        assert!(is_module(Path::new("b/bench_x.rs")));
        assert!(!is_module(Path::new("b/test_x.rs")));
        assert!(!is_module(Path::new("b/bench_x.txt")));
    }
}
