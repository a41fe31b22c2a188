//! Missing value analysis

use polars::prelude::*;

/// Missing ratio per column, sorted by ratio descending.
///
/// The ratio is `null_count / row_count`; an empty frame yields no entries.
pub fn analyze_missing_values(df: &DataFrame) -> Vec<(String, f64)> {
    let height = df.height();
    if height == 0 {
        return Vec::new();
    }

    let mut missing_ratios: Vec<(String, f64)> = df
        .get_columns()
        .iter()
        .map(|column| {
            let ratio = column.null_count() as f64 / height as f64;
            (column.name().to_string(), ratio)
        })
        .collect();

    missing_ratios.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    missing_ratios
}

/// Columns whose missing ratio is strictly above `threshold`, label excluded.
pub fn get_features_above_threshold(
    missing_ratios: &[(String, f64)],
    threshold: f64,
    label_column: &str,
) -> Vec<String> {
    missing_ratios
        .iter()
        .filter(|(name, ratio)| *ratio > threshold && name != label_column)
        .map(|(name, _)| name.clone())
        .collect()
}
