//! JSON study report
//!
//! Documents every input column with its pruning statistics and the reason it
//! was dropped or kept, then each model's selection, metrics and confusion
//! matrix, and the importance ranking that drove the reduced model.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::evaluate::ClassMetrics;
use crate::pipeline::trainer::CandidateScore;
use crate::pipeline::{
    ColumnStats, ConfusionMatrix, ExclusionSets, FeatureSelection, Hyperparams, ImportanceRanking,
    ModelRun, PipelineConfig, StudyModel, StudyOutcome,
};

/// Why a column was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    NearZeroVariance,
    HighMissing,
    Identifier,
}

/// One input column with its statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnReportEntry {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped_for: Vec<DropReason>,
    pub stats: ColumnStats,
}

/// One trained configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReportEntry {
    pub model: StudyModel,
    pub selection: FeatureSelection,
    pub features: Vec<String>,
    pub selected: Hyperparams,
    pub cv_accuracy: f64,
    pub fold_accuracies: Vec<f64>,
    pub grid: Vec<CandidateScore>,
    pub test_accuracy: f64,
    pub kappa: f64,
    pub class_metrics: Vec<ClassMetrics>,
    pub confusion_matrix: ConfusionMatrix,
}

impl ModelReportEntry {
    fn from_run(run: &ModelRun) -> Self {
        Self {
            model: run.kind,
            selection: run.trained.selection.clone(),
            features: run.trained.model.feature_names().to_vec(),
            selected: run.trained.chosen.params,
            cv_accuracy: run.cv_accuracy(),
            fold_accuracies: run.trained.chosen.fold_accuracies.clone(),
            grid: run.trained.grid.clone(),
            test_accuracy: run.test_accuracy(),
            kappa: run.evaluation.kappa,
            class_metrics: run.evaluation.class_metrics.clone(),
            confusion_matrix: run.evaluation.confusion.clone(),
        }
    }
}

/// Partition sizes.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub classes: Vec<String>,
}

/// Timing information in milliseconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingInfo {
    pub load_ms: u64,
    pub study_ms: u64,
    pub total_ms: u64,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub liftfit_version: String,
    pub input_file: String,
    pub config: PipelineConfig,
}

/// Complete study report
#[derive(Debug, Clone, Serialize)]
pub struct StudyReport {
    pub metadata: ReportMetadata,
    pub timing: TimingInfo,
    pub exclusions: ExclusionSets,
    pub columns: Vec<ColumnReportEntry>,
    pub partition: PartitionSummary,
    pub models: Vec<ModelReportEntry>,
    pub importance: ImportanceRanking,
    pub reduced_features: Vec<String>,
    pub reduction_fallback: bool,
}

impl StudyReport {
    pub fn build(input: &Path, outcome: &StudyOutcome, timing: TimingInfo) -> Self {
        let exclusions = &outcome.prune.exclusions;
        let label = outcome.prune.dataset.label_column();

        let mut columns: Vec<ColumnReportEntry> = outcome
            .prune
            .stats
            .iter()
            .filter(|s| s.name != label)
            .map(|s| {
                let dropped_for = drop_reasons(&s.name, exclusions);
                ColumnReportEntry {
                    name: s.name.clone(),
                    status: if dropped_for.is_empty() {
                        "kept".to_string()
                    } else {
                        "dropped".to_string()
                    },
                    dropped_for,
                    stats: s.clone(),
                }
            })
            .collect();

        // Kept columns first, then alphabetical
        columns.sort_by(|a, b| {
            a.dropped_for
                .is_empty()
                .cmp(&b.dropped_for.is_empty())
                .reverse()
                .then_with(|| a.name.cmp(&b.name))
        });

        Self {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                liftfit_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: input.display().to_string(),
                config: outcome.config.clone(),
            },
            timing,
            exclusions: exclusions.clone(),
            columns,
            partition: PartitionSummary {
                train_rows: outcome.partition.train.len(),
                test_rows: outcome.partition.test.len(),
                classes: outcome.prune.dataset.domain().classes().to_vec(),
            },
            models: outcome
                .runs()
                .into_iter()
                .map(ModelReportEntry::from_run)
                .collect(),
            importance: outcome.ranking.clone(),
            reduced_features: outcome.reduced_features.clone(),
            reduction_fallback: outcome.reduction_fallback,
        }
    }
}

fn drop_reasons(name: &str, exclusions: &ExclusionSets) -> Vec<DropReason> {
    let has = |set: &[String]| set.iter().any(|n| n == name);
    let mut reasons = Vec::new();
    if has(&exclusions.near_zero_variance) {
        reasons.push(DropReason::NearZeroVariance);
    }
    if has(&exclusions.high_missing) {
        reasons.push(DropReason::HighMissing);
    }
    if has(&exclusions.identifiers) {
        reasons.push(DropReason::Identifier);
    }
    reasons
}

/// `<input stem>_study.json` next to the input file.
pub fn default_report_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "liftfit".to_string());
    input.with_file_name(format!("{}_study.json", stem))
}

/// Export the study report to a JSON file
pub fn export_study_report(report: &StudyReport, output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(report).context("Failed to serialize study report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write study report to {}", output_path.display()))?;

    Ok(())
}
