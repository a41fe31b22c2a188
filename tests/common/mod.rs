//! Shared test utilities and fixture generators

#![allow(dead_code)]

use liftfit::pipeline::PipelineConfig;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

pub const CLASSES: [&str; 5] = ["A", "B", "C", "D", "E"];

/// A small frame shaped like the raw accelerometer export.
///
/// This DataFrame includes:
/// - `X`, `user_name`, `new_window`, `num_window`: identifier columns
/// - `roll_belt`, `pitch_arm`: clean numeric features
/// - `kurtosis_roll_belt`: 95% missing
/// - `amplitude_yaw_belt`: constant
/// - `classe`: five balanced classes
pub fn create_activity_dataframe() -> DataFrame {
    let rows = 20;
    let x: Vec<i64> = (1..=rows as i64).collect();
    let users: Vec<&str> = (0..rows)
        .map(|i| if i % 2 == 0 { "carlitos" } else { "pedro" })
        .collect();
    let new_window: Vec<&str> = (0..rows).map(|i| if i == 7 { "yes" } else { "no" }).collect();
    let num_window: Vec<i64> = (0..rows as i64).map(|i| 10 + i / 4).collect();
    let roll_belt: Vec<f64> = (0..rows).map(|i| 1.0 + i as f64 * 0.5).collect();
    let pitch_arm: Vec<f64> = (0..rows).map(|i| ((i * 7) % 11) as f64).collect();
    let kurtosis: Vec<Option<f64>> = (0..rows)
        .map(|i| if i == 3 { Some(-1.2) } else { None })
        .collect();
    let amplitude: Vec<f64> = vec![0.0; rows];
    let classe: Vec<&str> = (0..rows).map(|i| CLASSES[i % 5]).collect();

    df! {
        "X" => x,
        "user_name" => users,
        "new_window" => new_window,
        "num_window" => num_window,
        "roll_belt" => roll_belt,
        "pitch_arm" => pitch_arm,
        "kurtosis_roll_belt" => kurtosis,
        "amplitude_yaw_belt" => amplitude,
        "classe" => classe,
    }
    .unwrap()
}

/// 1000 rows, 200 per class, nine random features and one constant.
pub fn create_balanced_dataframe() -> DataFrame {
    let rows = 1000;
    let mut rng = StdRng::seed_from_u64(1);
    let mut columns: Vec<Column> = Vec::with_capacity(11);

    for i in 0..9 {
        let values: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
        columns.push(Column::new(format!("f{}", i).into(), values));
    }
    columns.push(Column::new("f_const".into(), vec![1.5f64; rows]));

    let classe: Vec<&str> = (0..rows).map(|i| CLASSES[i % 5]).collect();
    columns.push(Column::new("classe".into(), classe));

    DataFrame::new(columns).unwrap()
}

/// Three classes where one is an axis-aligned cut and the other two are split
/// by an oblique boundary over six features, with 5% label noise.
pub fn create_oblique_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let features: Vec<Vec<f64>> = (0..8)
        .map(|_| (0..rows).map(|_| rng.gen::<f64>()).collect())
        .collect();

    let classe: Vec<&str> = (0..rows)
        .map(|r| {
            let label = if features[0][r] < 0.2 {
                0
            } else if (1..=6).map(|f| features[f][r]).sum::<f64>() < 3.0 {
                1
            } else {
                2
            };
            let label = if rng.gen::<f64>() < 0.05 {
                (label + rng.gen_range(1..3)) % 3
            } else {
                label
            };
            CLASSES[label]
        })
        .collect();

    let mut columns: Vec<Column> = features
        .into_iter()
        .enumerate()
        .map(|(i, values)| Column::new(format!("x{}", i).into(), values))
        .collect();
    columns.push(Column::new("classe".into(), classe));
    DataFrame::new(columns).unwrap()
}

/// `x0` perfectly separates A from B and is noise for C and D, which are split
/// by an oblique boundary over `x1..x6` with 5% of C/D labels swapped.
pub fn create_split_feature_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let group: Vec<bool> = (0..rows).map(|_| rng.gen::<bool>()).collect();
    let features: Vec<Vec<f64>> = (0..7)
        .map(|_| (0..rows).map(|_| rng.gen::<f64>()).collect())
        .collect();

    let classe: Vec<&str> = (0..rows)
        .map(|r| {
            if group[r] {
                if features[0][r] < 0.5 {
                    "A"
                } else {
                    "B"
                }
            } else {
                let upper = (1..=6).map(|f| features[f][r]).sum::<f64>() >= 3.0;
                let upper = upper ^ (rng.gen::<f64>() < 0.05);
                if upper {
                    "D"
                } else {
                    "C"
                }
            }
        })
        .collect();

    let mut columns: Vec<Column> = features
        .into_iter()
        .enumerate()
        .map(|(i, values)| Column::new(format!("x{}", i).into(), values))
        .collect();
    columns.push(Column::new("classe".into(), classe));
    DataFrame::new(columns).unwrap()
}

/// Two classes decided by `x0` alone; there is no other feature.
pub fn create_single_signal_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let x0: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
    let classe: Vec<&str> = x0.iter().map(|&v| if v < 0.5 { "A" } else { "B" }).collect();
    df! {
        "x0" => x0,
        "classe" => classe,
    }
    .unwrap()
}

/// Four quadrant classes decided by `x0` and `x1`; `noise0..noise7` carry no signal.
pub fn create_quadrant_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let x0: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
    let x1: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
    let classe: Vec<&str> = (0..rows)
        .map(|r| {
            let code = (x0[r] > 0.5) as usize * 2 + (x1[r] > 0.5) as usize;
            CLASSES[code]
        })
        .collect();

    let mut columns = vec![
        Column::new("x0".into(), x0),
        Column::new("x1".into(), x1),
    ];
    for i in 0..8 {
        let values: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
        columns.push(Column::new(format!("noise{}", i).into(), values));
    }
    columns.push(Column::new("classe".into(), classe));
    DataFrame::new(columns).unwrap()
}

/// Default config with fewer folds and trees so model tests stay quick.
pub fn fast_config() -> PipelineConfig {
    PipelineConfig {
        folds: 3,
        forest_trees: 40,
        ..Default::default()
    }
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a raw CSV body
pub fn create_temp_csv_text(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("raw.csv");
    std::fs::write(&csv_path, contents).unwrap();
    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}
