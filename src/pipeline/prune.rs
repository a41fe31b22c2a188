//! Feature pruning: near-zero variance, high missingness and identifier columns
//!
//! All statistics are measured on the full dataset before it is partitioned,
//! so the kept column set does not depend on the split. This lets the test
//! rows influence column selection.

use std::collections::BTreeSet;

use log::{debug, info};

use super::config::PipelineConfig;
use super::error::PipelineResult;
use super::loader::Dataset;
use super::missing::{analyze_missing_values, get_features_above_threshold};
use super::variance::{column_statistics, get_near_zero_variance_features, ColumnStats};

/// The three exclusion sets, each a subset of the dataset's columns.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ExclusionSets {
    pub near_zero_variance: Vec<String>,
    pub high_missing: Vec<String>,
    pub identifiers: Vec<String>,
}

impl ExclusionSets {
    /// Every excluded column, deduplicated and sorted.
    pub fn union(&self) -> Vec<String> {
        let all: BTreeSet<&String> = self
            .near_zero_variance
            .iter()
            .chain(&self.high_missing)
            .chain(&self.identifiers)
            .collect();
        all.into_iter().cloned().collect()
    }
}

/// Result of pruning a dataset.
#[derive(Debug, Clone)]
pub struct PruneOutcome {
    pub dataset: Dataset,
    pub exclusions: ExclusionSets,
    /// Statistics for every column of the input, label included.
    pub stats: Vec<ColumnStats>,
    pub initial_columns: usize,
}

/// Compute the exclusion sets for `dataset` without modifying it.
pub fn find_exclusions(
    dataset: &Dataset,
    config: &PipelineConfig,
) -> PipelineResult<(ExclusionSets, Vec<ColumnStats>)> {
    let label = dataset.label_column();
    let stats = column_statistics(dataset.frame(), config.nzv_policy)?;

    let near_zero_variance = get_near_zero_variance_features(&stats, label);

    let missing_ratios = analyze_missing_values(dataset.frame());
    let mut high_missing =
        get_features_above_threshold(&missing_ratios, config.missing_threshold, label);
    high_missing.sort();

    let present = dataset.column_names();
    let identifiers: Vec<String> = config
        .identifier_columns
        .iter()
        .filter(|name| *name != label && present.contains(name))
        .cloned()
        .collect();

    debug!("near-zero variance columns: {:?}", near_zero_variance);
    debug!("high-missing columns: {:?}", high_missing);
    debug!("identifier columns: {:?}", identifiers);

    Ok((
        ExclusionSets {
            near_zero_variance,
            high_missing,
            identifiers,
        },
        stats,
    ))
}

/// Remove every excluded column, always retaining the label.
pub fn prune_features(dataset: &Dataset, config: &PipelineConfig) -> PipelineResult<PruneOutcome> {
    let initial_columns = dataset.frame().width();
    let (exclusions, stats) = find_exclusions(dataset, config)?;
    let dropped = exclusions.union();
    let pruned = dataset.without_columns(&dropped);

    info!(
        "pruned {} of {} columns ({} near-zero variance, {} high missing, {} identifiers)",
        dropped.len(),
        initial_columns,
        exclusions.near_zero_variance.len(),
        exclusions.high_missing.len(),
        exclusions.identifiers.len()
    );

    Ok(PruneOutcome {
        dataset: pruned,
        exclusions,
        stats,
        initial_columns,
    })
}
