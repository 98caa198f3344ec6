use std::path::PathBuf;

use polars::prelude::*;

use crate::exec::ResultRecord;

pub fn get_data(csv: &PathBuf) -> anyhow::Result<DataFrame> {
    Ok(CsvReader::from_path(csv)?.finish()?)
}

/// Build a long-format frame straight from in-memory records, one row per
/// timing sample. Skipped and errored cases carry no samples and contribute
/// no rows.
pub fn records_frame(records: &[ResultRecord]) -> anyhow::Result<DataFrame> {
    let mut function = Vec::new();
    let mut parameters: Vec<Option<String>> = Vec::new();
    let mut time = Vec::new();
    for record in records {
        for sample in &record.timings {
            function.push(record.function.clone());
            parameters.push(record.parameters.clone());
            time.push(*sample);
        }
    }
    Ok(DataFrame::new(vec![
        Series::new("function", function),
        Series::new("parameters", parameters),
        Series::new("time", time),
    ])?)
}

/// Aggregate raw samples per (function, parameters). Aggregation lives here,
/// downstream of the engine; saved records keep every raw sample.
pub fn summarize(df: &DataFrame) -> anyhow::Result<DataFrame> {
    let time = || col("time");
    let q = |f: f64| time().quantile(lit(f), QuantileInterpolOptions::Nearest);
    Ok(df
        .clone()
        .lazy()
        .filter(time().is_not_null())
        .group_by(["function", "parameters"])
        .agg([
            len().alias("samples"),
            time().mean().alias("mean"),
            time().min().alias("min"),
            time().max().alias("max"),
            time().median().alias("median"),
            time().std(1).alias("std"),
            q(0.05).alias("p5"),
            q(0.95).alias("p95"),
            q(0.01).alias("p1"),
            q(0.99).alias("p99"),
        ])
        .sort_by_exprs(
            [col("function"), col("parameters")],
            [false, false],
            false,
            true,
        )
        .collect()?)
}
