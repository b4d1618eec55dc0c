//! CLI integration tests
//!
//! These run the built binary and parse its stdout the way a dashboard
//! harness would.

use serde_json::Value;
use std::collections::HashSet;
use std::process::{Command, Output};
use tempfile::TempDir;

fn producer(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_synthetic-data-producer"))
        .args(args)
        .env_remove("PRODUCER_CATALOG")
        .env_remove("PRODUCER_LOG_LEVEL")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute producer")
}

fn parse_document(output: &Output) -> Vec<Value> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let document: Value =
        serde_json::from_str(&stdout).expect("stdout should be a single JSON document");
    document.as_array().expect("document should be an array").clone()
}

fn triples(records: &[Value]) -> HashSet<(String, Option<String>, String)> {
    records
        .iter()
        .map(|r| {
            (
                r["metric"].as_str().unwrap().to_string(),
                r.get("parameter").and_then(Value::as_str).map(str::to_string),
                r["entity"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

/// Test that schema mode prints definitions
#[test]
fn test_initialize_prints_schema() {
    let output = producer(&["--initialize"]);

    assert!(output.status.success(), "Schema mode should succeed");
    let records = parse_document(&output);
    assert!(!records.is_empty());

    for record in &records {
        assert!(record.get("value").is_none(), "Definitions carry no value");
        assert!(record["class"].is_string());
    }
    assert!(output.stderr.is_empty(), "Default log level should keep stderr quiet");
}

/// Test that sample mode prints values for the same triples
#[test]
fn test_sample_matches_schema() {
    let schema = parse_document(&producer(&["--initialize"]));
    let output = producer(&[]);

    assert!(output.status.success(), "Sample mode should succeed");
    let samples = parse_document(&output);

    assert_eq!(schema.len(), samples.len());
    assert_eq!(triples(&schema), triples(&samples));
    for sample in &samples {
        assert!(sample["value"].is_number());
        assert!(sample.get("unit").is_none());
        assert!(sample.get("class").is_none());
    }
}

/// Test that unrecognized arguments fall back to sample mode
#[test]
fn test_unknown_arguments_fall_back() {
    let output = producer(&["--bogus", "positional"]);

    assert!(output.status.success(), "Unknown arguments should not fail");
    let samples = parse_document(&output);
    assert!(samples.iter().all(|s| s.get("value").is_some()));
}

/// Test that switches always report healthy
#[test]
fn test_switch_status_is_ok() {
    let samples = parse_document(&producer(&[]));

    let status: Vec<&Value> = samples
        .iter()
        .filter(|s| s["metric"] == "DeviceStatusOk")
        .collect();
    assert_eq!(status.len(), 6);
    assert!(status.iter().all(|s| s["value"] == 1));
}

/// Test that a catalog file replaces the built-in catalog
#[test]
fn test_catalog_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("catalog.json");
    let catalog = serde_json::json!({
        "groups": [{
            "kind": "rack",
            "entities": ["A05", "A06", "A07"],
            "metrics": [
                {
                    "metric": "totalnodepowerusage",
                    "unit": "W",
                    "class": "Power/Rack",
                    "source": {
                        "kind": "uniform",
                        "default": {"lo": 50000.0, "hi": 60000.0},
                        "overrides": [{"entity": "A05", "lo": 130000.0, "hi": 135000.0}]
                    }
                },
                {
                    "metric": "TotalGPUTemperature",
                    "unit": "C",
                    "class": "Temperature/Rack",
                    "source": {"kind": "uniform", "default": {"lo": 50.0, "hi": 65.0}}
                }
            ]
        }]
    });
    std::fs::write(&path, catalog.to_string()).unwrap();
    let path = path.to_str().unwrap();

    let schema = parse_document(&producer(&["--catalog", path, "--initialize"]));
    assert_eq!(schema.len(), 6);

    let samples = parse_document(&producer(&["--catalog", path]));
    assert_eq!(samples.len(), 6);
    let power = samples
        .iter()
        .find(|s| s["metric"] == "totalnodepowerusage" && s["entity"] == "A05")
        .and_then(|s| s["value"].as_f64())
        .unwrap();
    assert!((130_000.0..=135_000.0).contains(&power));
}

/// Test that an unreadable catalog file is fatal
#[test]
fn test_missing_catalog_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");

    let output = producer(&["--catalog", path.to_str().unwrap()]);

    assert!(!output.status.success(), "Missing catalog should fail");
    assert!(output.stdout.is_empty(), "No partial document on failure");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to load catalog") && stderr.contains("absent.toml"),
        "Error should name the catalog: {stderr}"
    );
}

/// Test that help and version flags still produce a sample document
#[test]
fn test_help_and_version_flags_emit_samples() {
    for flag in ["-h", "--help", "-V", "--version"] {
        let output = producer(&[flag]);

        assert!(output.status.success(), "{flag} should not fail");
        let samples = parse_document(&output);
        assert!(!samples.is_empty(), "{flag} should emit records");
        assert!(
            samples.iter().all(|s| s["value"].is_number()),
            "{flag} should emit sampled values"
        );
    }
}

/// Test that a help flag does not cancel schema mode
#[test]
fn test_help_flag_with_initialize_emits_schema() {
    let output = producer(&["--help", "--initialize"]);

    assert!(output.status.success());
    let records = parse_document(&output);
    assert!(records.iter().all(|r| r.get("value").is_none()));
}
