//! Tests for CLI argument parsing and the end-to-end binary

use assert_cmd::Command;
use clap::Parser;
use liftfit::cli::Cli;
use liftfit::pipeline::{NzvPolicy, PipelineError, ReductionMode, SchemaError};
use predicates::prelude::*;
use std::path::PathBuf;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_cli_defaults_match_pipeline_defaults() {
    let cli = Cli::parse_from(["liftfit", "-i", "pml-training.csv"]);
    let config = cli.to_config().unwrap();

    assert_eq!(config.label_column, "classe");
    assert_eq!(config.missing_threshold, 0.9);
    assert_eq!(config.train_fraction, 0.9);
    assert_eq!(config.folds, 5);
    assert_eq!(config.forest_trees, 100);
    assert_eq!(config.importance_threshold, 33.0);
    assert_eq!(config.reduction_mode, ReductionMode::Keep);
    assert_eq!(config.nzv_policy, NzvPolicy::ZeroVariance);
    assert!(!cli.no_report);
    assert!(cli.threads.is_none());
}

#[test]
fn test_cli_flags_override_defaults() {
    let cli = Cli::parse_from([
        "liftfit",
        "-i",
        "data.csv",
        "-l",
        "activity",
        "--missing-threshold",
        "0.5",
        "--train-fraction",
        "0.75",
        "--folds",
        "10",
        "--trees",
        "250",
        "--importance-threshold",
        "50",
        "--reduction-mode",
        "drop",
        "--seed",
        "7",
    ]);
    let config = cli.to_config().unwrap();

    assert_eq!(config.label_column, "activity");
    assert_eq!(config.missing_threshold, 0.5);
    assert_eq!(config.train_fraction, 0.75);
    assert_eq!(config.folds, 10);
    assert_eq!(config.forest_trees, 250);
    assert_eq!(config.importance_threshold, 50.0);
    assert_eq!(config.reduction_mode, ReductionMode::Drop);
    assert_eq!(config.seed, 7);
}

#[test]
fn test_cli_flags_override_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_path = dir.path().join("study.json");
    std::fs::write(
        &config_path,
        r#"{"folds": 4, "seed": 99, "reduction_mode": "drop"}"#,
    )
    .unwrap();

    let cli = Cli::parse_from([
        "liftfit",
        "-i",
        "data.csv",
        "-c",
        config_path.to_str().unwrap(),
        "--seed",
        "1",
    ]);
    let config = cli.to_config().unwrap();

    assert_eq!(config.folds, 4, "file value survives");
    assert_eq!(config.reduction_mode, ReductionMode::Drop);
    assert_eq!(config.seed, 1, "flag wins over file");
    assert_eq!(config.forest_trees, 100, "unset fields keep defaults");
}

#[test]
fn test_cli_rejects_unparseable_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_path = dir.path().join("broken.json");
    std::fs::write(&config_path, "{ folds: ").unwrap();

    let cli = Cli::parse_from(["liftfit", "-i", "data.csv", "-c", config_path.to_str().unwrap()]);
    let err = cli.to_config().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Schema(SchemaError::InvalidConfig(_))
    ));
}

#[test]
fn test_cli_nzv_flags_switch_policy() {
    let cli = Cli::parse_from(["liftfit", "-i", "data.csv", "--nzv-unique-cut", "20"]);
    let config = cli.to_config().unwrap();
    assert_eq!(
        config.nzv_policy,
        NzvPolicy::NearZero {
            freq_cut: 19.0,
            unique_cut: 20.0
        }
    );

    let cli = Cli::parse_from(["liftfit", "-i", "data.csv", "--nzv-freq-cut", "4"]);
    let config = cli.to_config().unwrap();
    assert_eq!(
        config.nzv_policy,
        NzvPolicy::NearZero {
            freq_cut: 4.0,
            unique_cut: 10.0
        }
    );
}

#[test]
fn test_cli_drop_columns_extend_identifiers() {
    let cli = Cli::parse_from([
        "liftfit",
        "-i",
        "data.csv",
        "--drop-columns",
        "session_id,X,device",
    ]);
    let config = cli.to_config().unwrap();

    let ids = &config.identifier_columns;
    assert!(ids.contains(&"session_id".to_string()));
    assert!(ids.contains(&"device".to_string()));
    assert_eq!(ids.iter().filter(|c| *c == "X").count(), 1, "no duplicates");
}

#[test]
fn test_cli_report_paths() {
    let cli = Cli::parse_from(["liftfit", "-i", "/data/pml-training.csv"]);
    assert_eq!(
        cli.report_path(),
        Some(PathBuf::from("/data/pml-training_study.json"))
    );

    let cli = Cli::parse_from(["liftfit", "-i", "data.csv", "-r", "out/report.json"]);
    assert_eq!(cli.report_path(), Some(PathBuf::from("out/report.json")));

    let cli = Cli::parse_from(["liftfit", "-i", "data.csv", "--no-report"]);
    assert_eq!(cli.report_path(), None);
}

#[test]
fn test_cli_report_conflicts_with_no_report() {
    let result = Cli::try_parse_from([
        "liftfit",
        "-i",
        "data.csv",
        "-r",
        "out.json",
        "--no-report",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_value_validators() {
    let bad = [
        ["--missing-threshold", "1.5"],
        ["--train-fraction", "1.0"],
        ["--train-fraction", "0"],
        ["--importance-threshold", "101"],
        ["--reduction-mode", "shuffle"],
        ["--trees", "-3"],
    ];
    for [flag, value] in bad {
        let result = Cli::try_parse_from(["liftfit", "-i", "data.csv", flag, value]);
        assert!(result.is_err(), "{} {} should be rejected", flag, value);
    }

    let cli = Cli::parse_from(["liftfit", "-i", "data.csv", "--missing-threshold", "1.0"]);
    assert_eq!(cli.missing_threshold, Some(1.0));
}

#[test]
fn test_cli_invalid_fold_count_fails_validation() {
    let cli = Cli::parse_from(["liftfit", "-i", "data.csv", "--folds", "1"]);
    assert!(cli.to_config().is_err());
}

#[test]
fn test_cli_requires_input() {
    assert!(Cli::try_parse_from(["liftfit"]).is_err());
}

#[test]
fn test_binary_runs_study_and_writes_report() {
    let mut df = create_quadrant_dataframe(200, 5);
    let (dir, path) = create_temp_csv(&mut df);
    let report = dir.path().join("report.json");

    Command::cargo_bin("liftfit")
        .unwrap()
        .args(["-i", path.to_str().unwrap()])
        .args(["--folds", "3", "--trees", "10"])
        .args(["-r", report.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Study report saved"));

    let text = std::fs::read_to_string(&report).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["models"].as_array().unwrap().len(), 3);
    let train = json["partition"]["train_rows"].as_u64().unwrap();
    let test = json["partition"]["test_rows"].as_u64().unwrap();
    assert_eq!(train + test, 200);
}

#[test]
fn test_binary_fails_on_missing_label_column() {
    let (_dir, path) = create_temp_csv_text("a,b\n1,2\n3,4\n");

    Command::cargo_bin("liftfit")
        .unwrap()
        .args(["-i", path.to_str().unwrap(), "--no-report"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Label column 'classe' not found"));
}
