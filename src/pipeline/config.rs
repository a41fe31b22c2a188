//! Pipeline configuration
//!
//! Every constant the study depends on lives here so a run is fully described
//! by one value. Configs can be read from JSON; absent fields take defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{PipelineResult, SchemaError};

/// Literal tokens read as missing in every column.
pub const DEFAULT_MISSING_TOKENS: [&str; 3] = ["", "#DIV/0!", "NA"];

/// Columns that identify rows or sessions rather than describe movement.
pub const DEFAULT_IDENTIFIER_COLUMNS: [&str; 7] = [
    "X",
    "user_name",
    "raw_timestamp_part_1",
    "raw_timestamp_part_2",
    "cvtd_timestamp",
    "new_window",
    "num_window",
];

/// Most/second-most frequency ratio above which a column counts as near-zero variance.
pub const DEFAULT_NZV_FREQ_CUT: f64 = 95.0 / 5.0;

/// Percent-unique value at or below which a skewed column counts as near-zero variance.
pub const DEFAULT_NZV_UNIQUE_CUT: f64 = 10.0;

/// How near-constant columns are detected.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NzvPolicy {
    /// Flag only columns with at most one distinct non-missing value.
    #[default]
    ZeroVariance,
    /// Also flag columns whose most/second-most frequency ratio exceeds
    /// `freq_cut` while the percentage of distinct values is at most `unique_cut`.
    NearZero { freq_cut: f64, unique_cut: f64 },
}

impl NzvPolicy {
    /// The conventional 95/5 frequency cut with a 10% uniqueness cut.
    pub fn near_zero_defaults() -> Self {
        NzvPolicy::NearZero {
            freq_cut: DEFAULT_NZV_FREQ_CUT,
            unique_cut: DEFAULT_NZV_UNIQUE_CUT,
        }
    }
}

/// Whether the reduced model keeps or drops the high-importance features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionMode {
    /// Retrain on the features scoring above the importance threshold.
    #[default]
    Keep,
    /// Retrain on everything except the features above the threshold.
    Drop,
}

impl std::str::FromStr for ReductionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep" => Ok(ReductionMode::Keep),
            "drop" => Ok(ReductionMode::Drop),
            other => Err(format!(
                "unknown reduction mode '{}': expected 'keep' or 'drop'",
                other
            )),
        }
    }
}

impl std::fmt::Display for ReductionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReductionMode::Keep => write!(f, "keep"),
            ReductionMode::Drop => write!(f, "drop"),
        }
    }
}

/// Settings for one end-to-end study run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub label_column: String,
    pub missing_tokens: Vec<String>,
    pub nzv_policy: NzvPolicy,
    /// Columns with a missing ratio strictly above this are dropped.
    pub missing_threshold: f64,
    pub identifier_columns: Vec<String>,
    pub train_fraction: f64,
    pub folds: usize,
    pub forest_trees: u16,
    /// Normalized importance (0-100) a feature must exceed to count as important.
    pub importance_threshold: f64,
    pub reduction_mode: ReductionMode,
    pub seed: u64,
    /// Rows used for CSV schema inference; 0 scans the whole file.
    pub infer_schema_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label_column: "classe".to_string(),
            missing_tokens: DEFAULT_MISSING_TOKENS.iter().map(|s| s.to_string()).collect(),
            nzv_policy: NzvPolicy::default(),
            missing_threshold: 0.9,
            identifier_columns: DEFAULT_IDENTIFIER_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            train_fraction: 0.9,
            folds: 5,
            forest_trees: 100,
            importance_threshold: 33.0,
            reduction_mode: ReductionMode::default(),
            seed: 42,
            infer_schema_length: 10000,
        }
    }
}

impl PipelineConfig {
    /// Read a config from a JSON file. Fields not present keep their defaults.
    pub fn from_json_file(path: &Path) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SchemaError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: PipelineConfig = serde_json::from_str(&text).map_err(|e| {
            SchemaError::InvalidConfig(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.label_column.is_empty() {
            return Err(SchemaError::InvalidConfig("label column name is empty".into()).into());
        }
        if !(0.0..=1.0).contains(&self.missing_threshold) {
            return Err(SchemaError::InvalidConfig(format!(
                "missing_threshold must be between 0.0 and 1.0, got {}",
                self.missing_threshold
            ))
            .into());
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(SchemaError::InvalidFraction {
                name: "train_fraction",
                value: self.train_fraction,
            }
            .into());
        }
        if self.folds < 2 {
            return Err(SchemaError::InvalidConfig(format!(
                "folds must be at least 2, got {}",
                self.folds
            ))
            .into());
        }
        if self.forest_trees == 0 {
            return Err(SchemaError::InvalidConfig("forest_trees must be at least 1".into()).into());
        }
        if !(0.0..=100.0).contains(&self.importance_threshold) {
            return Err(SchemaError::InvalidConfig(format!(
                "importance_threshold must be between 0 and 100, got {}",
                self.importance_threshold
            ))
            .into());
        }
        if let NzvPolicy::NearZero {
            freq_cut,
            unique_cut,
        } = self.nzv_policy
        {
            if freq_cut < 1.0 || !(0.0..=100.0).contains(&unique_cut) {
                return Err(SchemaError::InvalidConfig(format!(
                    "near-zero variance cuts out of range: freq_cut={}, unique_cut={}",
                    freq_cut, unique_cut
                ))
                .into());
            }
        }
        Ok(())
    }

    /// The trainer-facing subset of this config.
    pub fn trainer(&self) -> super::trainer::TrainerConfig {
        super::trainer::TrainerConfig {
            folds: self.folds,
            forest_trees: self.forest_trees,
            seed: self.seed,
        }
    }
}
