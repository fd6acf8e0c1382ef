//! Integration tests for the goanalyze facade

use std::fs;

use anyhow::Result;
use camino::Utf8PathBuf;
use goanalyze::{AnalyzerConfig, ConfigError, Severity, analyze_package, analyze_sources};
use tempfile::TempDir;

const DEMO: &str = r#"package demo

import "fmt"

func pair() (int, int) { return 1, 2 }

func run(name string) {
	a, b, c := pair()
	fmt.Printf("%d\n", name)
	_, _, _ = a, b, c
}
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn temp_package(files: &[(&str, &str)]) -> Result<(TempDir, Utf8PathBuf)> {
    let temp_dir = TempDir::new()?;
    let dir = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
        .map_err(|_| anyhow::anyhow!("non-utf8 path"))?;
    for (name, text) in files {
        fs::write(dir.join(name), text)?;
    }
    Ok((temp_dir, dir))
}

#[test]
fn package_directory_end_to_end() -> Result<()> {
    init_tracing();
    let (_guard, dir) = temp_package(&[
        ("demo.go", DEMO),
        ("util.go", "package demo\n\nfunc helper() {}\n"),
        ("NOTES.txt", "not go\n"),
    ])?;

    let report = analyze_package(&dir, "example.com/demo", None)?;
    assert_eq!(report.reports.len(), 2);
    assert_eq!(report.diagnostic_count(), 3);

    let human = report.render_human();
    let lines: Vec<&str> = human.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(
        "demo.go:8:2: error assignment-count/count-mismatch: \
         Assignment count mismatch: 2 element(s) assigned to 3 element(s)"
    ));
    assert!(lines[1].ends_with(
        "demo.go:8:13: error assignment-count/multiple-value: \
         Multiple-value pair() in single-value context"
    ));
    assert!(lines[2].ends_with(
        "demo.go:9:21: warning printf/wrong-type: Arg name for printf verb %d of wrong type: string"
    ));
    Ok(())
}

#[test]
fn json_output_carries_locations() -> Result<()> {
    let report = analyze_sources("example.com/demo", &[("demo.go", DEMO)], None)?;
    let json: serde_json::Value = serde_json::from_str(&report.render_json()?)?;
    let items = json.as_array().ok_or_else(|| anyhow::anyhow!("expected an array"))?;
    assert_eq!(items.len(), 3);

    let printf = &items[2];
    assert_eq!(printf["path"], "demo.go");
    assert_eq!(printf["line"], 9);
    assert_eq!(printf["col"], 21);
    assert_eq!(printf["rule"], "printf/wrong-type");
    assert_eq!(printf["severity"], "warning");
    assert_eq!(printf["span"]["end"].as_u64(), printf["span"]["start"].as_u64().map(|s| s + 4));
    Ok(())
}

#[test]
fn configuration_file_shapes_the_run() -> Result<()> {
    let (_guard, dir) = temp_package(&[])?;
    let config_path = dir.join(".goanalyze.toml");
    fs::write(
        &config_path,
        r#"
[inspection.assignment-count]
severity = "warning"

[inspection.printf]
enabled = false

[analysis]
max_inference_depth = 64
"#,
    )?;

    let config = AnalyzerConfig::from_file(config_path.as_std_path())?;
    let report = analyze_sources("example.com/demo", &[("demo.go", DEMO)], Some(&config))?;
    let diags: Vec<_> = report
        .reports
        .iter()
        .flat_map(|r| &r.diagnostics)
        .collect();

    assert_eq!(diags.len(), 2);
    assert!(diags.iter().all(|d| d.rule.starts_with("assignment-count/")));
    assert!(diags.iter().all(|d| d.severity == Severity::Warning));
    Ok(())
}

#[test]
fn invalid_configuration_is_rejected() -> Result<()> {
    let (_guard, dir) = temp_package(&[])?;
    let config_path = dir.join(".goanalyze.toml");
    fs::write(&config_path, "[inspection.printf]\nseverity = \"fatal\"\n")?;

    let err = AnalyzerConfig::from_file(config_path.as_std_path())
        .expect_err("severity must be validated");
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(err.to_string().contains("fatal"));
    Ok(())
}

#[test]
fn missing_directory_is_an_error() {
    let dir = Utf8PathBuf::from("/definitely/not/a/go/package");
    let err = analyze_package(&dir, "example.com/none", None)
        .err()
        .map(|e| e.to_string());
    assert!(err.is_some_and(|e| e.contains("failed to read package directory")));
}

#[test]
fn long_operator_chains_run_through_every_inspection() -> Result<()> {
    let mut src = String::from("package demo\n\nfunc f() int { return 1 }\n\nvar total = f()");
    for _ in 1..10_000 {
        src.push_str(" + f()");
    }
    src.push_str("\n\nvar text = \"a\" + total\n");

    let report = analyze_sources("example.com/demo", &[("long.go", &src)], None)?;
    let diags: Vec<_> = report
        .reports
        .iter()
        .flat_map(|r| &r.diagnostics)
        .collect();
    // the operand type is past the inference depth limit, so nothing is claimed about it
    assert!(diags.is_empty(), "{diags:?}");
    Ok(())
}
