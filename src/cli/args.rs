//! Command-line argument definitions using clap

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::pipeline::config::{DEFAULT_NZV_FREQ_CUT, DEFAULT_NZV_UNIQUE_CUT};
use crate::pipeline::{NzvPolicy, PipelineConfig, PipelineResult, ReductionMode};
use crate::report::default_report_path;

/// Liftfit - Prune accelerometer features and compare tree-based exercise classifiers
#[derive(Parser, Debug)]
#[command(name = "liftfit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// JSON config file. Fields it omits take their defaults;
    /// flags given on the command line override it.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Label column holding the exercise class
    #[arg(short, long)]
    pub label: Option<String>,

    /// Missing value threshold - drop columns whose missing ratio is above this value
    #[arg(long, value_parser = validate_unit_interval)]
    pub missing_threshold: Option<f64>,

    /// Share of each class assigned to the training partition, in (0, 1)
    #[arg(long, value_parser = validate_open_unit_interval)]
    pub train_fraction: Option<f64>,

    /// Number of cross-validation folds
    #[arg(long)]
    pub folds: Option<usize>,

    /// Number of trees per random forest
    #[arg(long)]
    pub trees: Option<u16>,

    /// Normalized importance (0-100) a feature must exceed to be considered important
    #[arg(long, value_parser = validate_percentage)]
    pub importance_threshold: Option<f64>,

    /// What the reduced model does with the important features.
    /// Options: "keep" (train on them only) or "drop" (train on everything else)
    #[arg(long)]
    pub reduction_mode: Option<ReductionMode>,

    /// Seed for partitioning, fold assignment and model fitting
    #[arg(long)]
    pub seed: Option<u64>,

    /// Switch to the near-zero variance rule with this most/second-most frequency cut
    #[arg(long)]
    pub nzv_freq_cut: Option<f64>,

    /// Percent-unique cut for the near-zero variance rule (default 10)
    #[arg(long, value_parser = validate_percentage)]
    pub nzv_unique_cut: Option<f64>,

    /// Extra identifier columns to exclude (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub drop_columns: Vec<String>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long)]
    pub infer_schema_length: Option<usize>,

    /// Path of the JSON study report.
    /// Defaults to the input directory with a '_study.json' suffix.
    #[arg(short, long, conflicts_with = "no_report")]
    pub report: Option<PathBuf>,

    /// Do not write the JSON study report
    #[arg(long, default_value = "false")]
    pub no_report: bool,

    /// Worker threads for model fitting (defaults to all cores)
    #[arg(long)]
    pub threads: Option<usize>,
}

impl Cli {
    /// Build the run configuration: defaults, then the config file, then flags.
    pub fn to_config(&self) -> PipelineResult<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(label) = &self.label {
            config.label_column = label.clone();
        }
        if let Some(v) = self.missing_threshold {
            config.missing_threshold = v;
        }
        if let Some(v) = self.train_fraction {
            config.train_fraction = v;
        }
        if let Some(v) = self.folds {
            config.folds = v;
        }
        if let Some(v) = self.trees {
            config.forest_trees = v;
        }
        if let Some(v) = self.importance_threshold {
            config.importance_threshold = v;
        }
        if let Some(v) = self.reduction_mode {
            config.reduction_mode = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.infer_schema_length {
            config.infer_schema_length = v;
        }

        if self.nzv_freq_cut.is_some() || self.nzv_unique_cut.is_some() {
            let (default_freq, default_unique) = match config.nzv_policy {
                NzvPolicy::NearZero {
                    freq_cut,
                    unique_cut,
                } => (freq_cut, unique_cut),
                NzvPolicy::ZeroVariance => (DEFAULT_NZV_FREQ_CUT, DEFAULT_NZV_UNIQUE_CUT),
            };
            config.nzv_policy = NzvPolicy::NearZero {
                freq_cut: self.nzv_freq_cut.unwrap_or(default_freq),
                unique_cut: self.nzv_unique_cut.unwrap_or(default_unique),
            };
        }

        for column in &self.drop_columns {
            if !config.identifier_columns.contains(column) {
                config.identifier_columns.push(column.clone());
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Where the JSON report goes, or `None` when disabled.
    pub fn report_path(&self) -> Option<PathBuf> {
        if self.no_report {
            return None;
        }
        Some(
            self.report
                .clone()
                .unwrap_or_else(|| default_report_path(&self.input)),
        )
    }

    pub fn input(&self) -> &Path {
        &self.input
    }
}

fn parse_f64(s: &str) -> Result<f64, String> {
    s.parse()
        .map_err(|_| format!("'{}' is not a valid number", s))
}

/// Validator for ratios in [0, 1]
fn validate_unit_interval(s: &str) -> Result<f64, String> {
    let value = parse_f64(s)?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!("value must be between 0.0 and 1.0, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for fractions strictly between 0 and 1
fn validate_open_unit_interval(s: &str) -> Result<f64, String> {
    let value = parse_f64(s)?;
    if value <= 0.0 || value >= 1.0 {
        Err(format!(
            "value must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    } else {
        Ok(value)
    }
}

/// Validator for percentages in [0, 100]
fn validate_percentage(s: &str) -> Result<f64, String> {
    let value = parse_f64(s)?;
    if !(0.0..=100.0).contains(&value) {
        Err(format!("value must be between 0 and 100, got {}", value))
    } else {
        Ok(value)
    }
}
