//! Stratified train/test partitioning and stratified k-fold assignment

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use super::error::{PipelineResult, SchemaError};

/// Disjoint train/test row indices covering every row, both sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Group row indices by class code.
fn rows_by_class(labels: &[u32]) -> Vec<Vec<usize>> {
    let n_classes = labels.iter().max().map(|&m| m as usize + 1).unwrap_or(0);
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (row, &label) in labels.iter().enumerate() {
        groups[label as usize].push(row);
    }
    groups
}

/// Split rows so each class keeps its share in both subsets.
///
/// Every class contributes `round(train_fraction * n_class)` rows to train
/// after a seeded shuffle within the class; the rest go to test.
pub fn stratified_partition(
    labels: &[u32],
    train_fraction: f64,
    seed: u64,
) -> PipelineResult<Partition> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(SchemaError::InvalidFraction {
            name: "train_fraction",
            value: train_fraction,
        }
        .into());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::with_capacity(labels.len());

    for mut rows in rows_by_class(labels) {
        rows.shuffle(&mut rng);
        let n_train = ((rows.len() as f64 * train_fraction).round() as usize).min(rows.len());
        test.extend_from_slice(&rows[n_train..]);
        rows.truncate(n_train);
        train.extend(rows);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(Partition { train, test })
}

/// Assign the given rows to `k` folds, stratified by class.
///
/// Rows of each class are shuffled and dealt round-robin, continuing from
/// where the previous class stopped so fold sizes stay within one row of
/// each other. Returns the rows held out by each fold. Every row must index
/// into `labels`.
pub fn stratified_folds(
    rows: &[usize],
    labels: &[u32],
    k: usize,
    seed: u64,
) -> PipelineResult<Vec<Vec<usize>>> {
    if k < 2 || k > rows.len() {
        return Err(SchemaError::InvalidFoldCount {
            folds: k,
            rows: rows.len(),
        }
        .into());
    }

    if let Some(&max_row) = rows.iter().max() {
        if max_row >= labels.len() {
            return Err(SchemaError::LabelCountMismatch {
                expected: max_row + 1,
                got: labels.len(),
            }
            .into());
        }
    }

    let subset_labels: Vec<u32> = rows.iter().map(|&r| labels[r]).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut folds: Vec<Vec<usize>> = vec![Vec::new(); k];
    let mut next = 0usize;

    for mut positions in rows_by_class(&subset_labels) {
        positions.shuffle(&mut rng);
        for position in positions {
            folds[next].push(rows[position]);
            next = (next + 1) % k;
        }
    }

    for fold in &mut folds {
        fold.sort_unstable();
    }
    Ok(folds)
}
