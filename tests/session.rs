use std::path::Path;
use std::sync::atomic::Ordering;

use microbench::{
    Benchmark, ConfigPatch, ParametrizeSpec, Params, Registry, Session,
};
use tempdir::TempDir;

fn quick(_p: &Params) {
    std::hint::black_box((0..100u64).sum::<u64>());
}

fn faulty(_p: &Params) {
    panic!("deliberate failure");
}

fn write_tree(root: &Path, files: &[&str]) -> anyhow::Result<()> {
    for file in files {
        let path = root.join(file);
        std::fs::create_dir_all(path.parent().unwrap())?;
        std::fs::write(path, "")?;
    }
    Ok(())
}

fn demo_registry() -> Registry {
    let mut registry = Registry::new();
    registry.add(
        Benchmark::new("bench_alpha", "benchmarks/bench_one.rs", quick)
            .parametrize(ParametrizeSpec::matrix([("n", vec![1, 2])])),
    );
    registry.add(
        Benchmark::new("bench_beta", "benchmarks/bench_two.rs", quick)
            .skip_if(true, "not on this machine"),
    );
    registry.add(Benchmark::new("bench_gamma", "benchmarks/bench_two.rs", faulty));
    registry
}

#[test]
fn full_run_produces_records_in_discovery_order() -> anyhow::Result<()> {
    let td = TempDir::new("microbench")?;
    write_tree(
        td.path(),
        &["benchmarks/bench_one.rs", "benchmarks/bench_two.rs"],
    )?;
    let registry = demo_registry();
    let session = Session::new(ConfigPatch::new().repeat(2))?;
    let outcome = session.run(&registry, Some(&td.path().join("benchmarks")), None)?;

    let labels: Vec<_> = outcome.records.iter().map(|r| r.case.clone()).collect();
    assert_eq!(labels, vec!["alpha[n=1]", "alpha[n=2]", "beta", "gamma"]);
    assert_eq!(outcome.summary.completed, 2);
    assert_eq!(outcome.summary.skipped, 1);
    assert_eq!(outcome.summary.errored, 1);
    assert!(!outcome.summary.interrupted);

    // Completed cases carry `repeat` samples; the others carry none
    assert_eq!(outcome.records[0].timings.len(), 2);
    assert_eq!(outcome.records[1].timings.len(), 2);
    assert!(outcome.records[2].skipped);
    assert!(outcome.records[3].error.is_some());

    // One metadata snapshot shared by every record of the run
    assert!(outcome
        .records
        .iter()
        .all(|r| r.metadata == outcome.metadata));
    Ok(())
}

#[test]
fn two_runs_over_an_unchanged_tree_are_identical() -> anyhow::Result<()> {
    let td = TempDir::new("microbench")?;
    write_tree(
        td.path(),
        &["benchmarks/bench_one.rs", "benchmarks/bench_two.rs"],
    )?;
    let registry = demo_registry();
    let session = Session::new(ConfigPatch::new().repeat(1))?;
    let root = td.path().join("benchmarks");
    let first = session.run(&registry, Some(&root), None)?;
    let second = session.run(&registry, Some(&root), None)?;
    let labels = |records: &[microbench::ResultRecord]| {
        records.iter().map(|r| r.case.clone()).collect::<Vec<_>>()
    };
    assert_eq!(labels(&first.records), labels(&second.records));
    Ok(())
}

#[test]
fn filter_without_matches_fails_the_run() -> anyhow::Result<()> {
    let td = TempDir::new("microbench")?;
    write_tree(td.path(), &["benchmarks/bench_one.rs"])?;
    let mut registry = Registry::new();
    registry.add(Benchmark::new("bench_alpha", "benchmarks/bench_one.rs", quick));
    let session = Session::new(ConfigPatch::default())?;
    let result = session.run(
        &registry,
        Some(&td.path().join("benchmarks")),
        Some("nomatch"),
    );
    assert!(result.is_err());
    Ok(())
}

#[test]
fn missing_root_fails_the_run() -> anyhow::Result<()> {
    let registry = Registry::new();
    let session = Session::new(ConfigPatch::default())?;
    assert!(session
        .run(&registry, Some(Path::new("/nonexistent/path")), None)
        .is_err());
    Ok(())
}

#[test]
fn interrupt_stops_at_the_case_boundary() -> anyhow::Result<()> {
    let td = TempDir::new("microbench")?;
    write_tree(td.path(), &["benchmarks/bench_one.rs"])?;
    let mut registry = Registry::new();
    registry.add(Benchmark::new("bench_alpha", "benchmarks/bench_one.rs", quick));
    let session = Session::new(ConfigPatch::default())?;
    session.interrupt_flag().store(true, Ordering::SeqCst);
    let outcome = session.run(&registry, Some(&td.path().join("benchmarks")), None)?;
    assert!(outcome.summary.interrupted);
    assert!(outcome.records.is_empty());
    Ok(())
}

#[test]
fn extra_metadata_is_merged_into_the_snapshot() -> anyhow::Result<()> {
    let td = TempDir::new("microbench")?;
    write_tree(td.path(), &["benchmarks/bench_one.rs"])?;
    let mut registry = Registry::new();
    registry.add(Benchmark::new("bench_alpha", "benchmarks/bench_one.rs", quick));
    let mut session = Session::new(ConfigPatch::new().repeat(1))?;
    session.extra_metadata("suite", "nightly");
    let outcome = session.run(&registry, Some(&td.path().join("benchmarks")), None)?;
    assert_eq!(
        outcome.metadata.extra.get("suite").map(String::as_str),
        Some("nightly")
    );
    assert_eq!(
        outcome.records[0].metadata.extra.get("suite").map(String::as_str),
        Some("nightly")
    );
    Ok(())
}
