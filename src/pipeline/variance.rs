//! Per-column frequency statistics and near-zero variance detection

use std::collections::HashMap;

use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

use super::config::NzvPolicy;

/// Frequency profile of a single column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub name: String,
    /// Count of the most common value over the second most common; 0 with
    /// fewer than two distinct values.
    pub freq_ratio: f64,
    /// Distinct non-missing values as a percentage of all rows.
    pub percent_unique: f64,
    pub distinct: usize,
    pub missing_ratio: f64,
    pub zero_variance: bool,
    pub near_zero_variance: bool,
}

/// Compute frequency statistics for every column, in frame order.
///
/// Values are compared by their text rendering so numeric and string columns
/// go through the same counting path.
pub fn column_statistics(df: &DataFrame, policy: NzvPolicy) -> PolarsResult<Vec<ColumnStats>> {
    let height = df.height();

    df.get_columns()
        .par_iter()
        .map(|column| -> PolarsResult<ColumnStats> {
            let as_text = column.cast(&DataType::String)?;
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for value in as_text.str()?.into_iter().flatten() {
                *counts.entry(value).or_insert(0) += 1;
            }
            Ok(summarize(
                column.name().as_str(),
                &counts,
                column.null_count(),
                height,
                policy,
            ))
        })
        .collect()
}

fn summarize(
    name: &str,
    counts: &HashMap<&str, usize>,
    null_count: usize,
    height: usize,
    policy: NzvPolicy,
) -> ColumnStats {
    let distinct = counts.len();

    let mut frequencies: Vec<usize> = counts.values().copied().collect();
    frequencies.sort_unstable_by(|a, b| b.cmp(a));
    let freq_ratio = match frequencies.as_slice() {
        [first, second, ..] => *first as f64 / *second as f64,
        _ => 0.0,
    };

    let (percent_unique, missing_ratio) = if height == 0 {
        (0.0, 0.0)
    } else {
        (
            100.0 * distinct as f64 / height as f64,
            null_count as f64 / height as f64,
        )
    };

    let zero_variance = distinct <= 1;
    let near_zero_variance = match policy {
        NzvPolicy::ZeroVariance => zero_variance,
        NzvPolicy::NearZero {
            freq_cut,
            unique_cut,
        } => zero_variance || (freq_ratio > freq_cut && percent_unique <= unique_cut),
    };

    ColumnStats {
        name: name.to_string(),
        freq_ratio,
        percent_unique,
        distinct,
        missing_ratio,
        zero_variance,
        near_zero_variance,
    }
}

/// Names of columns flagged by the policy, label excluded.
pub fn get_near_zero_variance_features(stats: &[ColumnStats], label_column: &str) -> Vec<String> {
    stats
        .iter()
        .filter(|s| s.near_zero_variance && s.name != label_column)
        .map(|s| s.name.clone())
        .collect()
}
