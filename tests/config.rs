use microbench::{parse_cargo_metadata, Config, ConfigError, ConfigPatch};

#[test]
fn built_in_defaults() {
    let config = Config::default();
    assert_eq!(config.benchpath.to_str(), Some("benchmarks"));
    assert_eq!(config.repeat, 30);
    assert_eq!(config.number, 1);
    assert_eq!(config.warmups, 0);
    assert!(!config.garbage_collection);
    assert_eq!(config.partition_by, vec!["commit".to_owned()]);
}

#[test]
fn file_layer_overrides_defaults() -> anyhow::Result<()> {
    let file = ConfigPatch::new().repeat(5).garbage_collection(true);
    let resolved = Config::resolve(&Config::default(), &file, &ConfigPatch::default())?;
    assert_eq!(resolved.repeat, 5);
    assert!(resolved.garbage_collection);
    // Unset fields fall through
    assert_eq!(resolved.number, 1);
    assert_eq!(resolved.warmups, 0);
    Ok(())
}

#[test]
fn decorator_layer_overrides_file_layer() -> anyhow::Result<()> {
    let file = ConfigPatch::new().repeat(5).number(7).warmups(2);
    let decorator = ConfigPatch::new().repeat(9);
    let resolved = Config::resolve(&Config::default(), &file, &decorator)?;
    // Decorator wins where set, file wins where the decorator is silent,
    // defaults fill the rest
    assert_eq!(resolved.repeat, 9);
    assert_eq!(resolved.number, 7);
    assert_eq!(resolved.warmups, 2);
    assert!(!resolved.garbage_collection);
    Ok(())
}

#[test]
fn every_field_merges_independently() -> anyhow::Result<()> {
    let file = ConfigPatch::new()
        .benchpath("perf")
        .partition_by(["commit", "branch"]);
    let decorator = ConfigPatch::new().number(4);
    let resolved = Config::resolve(&Config::default(), &file, &decorator)?;
    assert_eq!(resolved.benchpath.to_str(), Some("perf"));
    assert_eq!(
        resolved.partition_by,
        vec!["commit".to_owned(), "branch".to_owned()]
    );
    assert_eq!(resolved.number, 4);
    assert_eq!(resolved.repeat, 30);
    Ok(())
}

#[test]
fn zero_repeat_is_rejected() {
    let decorator = ConfigPatch::new().repeat(0);
    let err = Config::resolve(&Config::default(), &ConfigPatch::default(), &decorator);
    assert_eq!(err.unwrap_err(), ConfigError::ZeroRepeat);
}

#[test]
fn zero_number_is_rejected() {
    let file = ConfigPatch::new().number(0);
    let err = Config::resolve(&Config::default(), &file, &ConfigPatch::default());
    assert_eq!(err.unwrap_err(), ConfigError::ZeroNumber);
}

#[test]
fn metadata_section_parses_from_cargo_toml() -> anyhow::Result<()> {
    let manifest = r#"
[package]
name = "some-crate"
version = "0.3.0"
edition = "2021"

[package.metadata.microbench]
repeat = 50
number = 10
warmups = 3
garbage_collection = true
partition_by = ["commit", "host"]
benchpath = "perf"

[dependencies]
serde = "1"
"#;
    let patch = parse_cargo_metadata(manifest)?;
    assert_eq!(patch.repeat, Some(50));
    assert_eq!(patch.number, Some(10));
    assert_eq!(patch.warmups, Some(3));
    assert_eq!(patch.garbage_collection, Some(true));
    assert_eq!(
        patch.partition_by,
        Some(vec!["commit".to_owned(), "host".to_owned()])
    );
    assert_eq!(
        patch.benchpath.as_deref().and_then(|p| p.to_str()),
        Some("perf")
    );
    Ok(())
}

#[test]
fn missing_metadata_section_is_empty_patch() -> anyhow::Result<()> {
    let manifest = r#"
[package]
name = "some-crate"
version = "0.3.0"
"#;
    let patch = parse_cargo_metadata(manifest)?;
    assert_eq!(patch, ConfigPatch::default());
    Ok(())
}

#[test]
fn unknown_config_key_is_an_error() {
    let manifest = r#"
[package]
name = "some-crate"

[package.metadata.microbench]
repeats = 50
"#;
    assert!(parse_cargo_metadata(manifest).is_err());
}
