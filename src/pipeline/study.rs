//! End-to-end study: prune, split, then fit and evaluate the three model
//! configurations, the last on features chosen by the forest's importance.

use std::fmt;
use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use super::config::PipelineConfig;
use super::error::{PipelineResult, TrainingError};
use super::evaluate::{evaluate, Evaluation};
use super::features::{FeatureSelection, FeatureTable};
use super::importance::{reduced_selection, ImportanceRanking};
use super::loader::{load_dataset, Dataset};
use super::model::ModelFamily;
use super::partition::{stratified_partition, Partition};
use super::prune::{prune_features, PruneOutcome};
use super::trainer::{train_model, TrainedModel, TrainerConfig};

/// The three configurations compared by a study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyModel {
    FullTree,
    FullForest,
    ReducedForest,
}

impl StudyModel {
    pub fn family(&self) -> ModelFamily {
        match self {
            StudyModel::FullTree => ModelFamily::DecisionTree,
            StudyModel::FullForest | StudyModel::ReducedForest => ModelFamily::RandomForest,
        }
    }
}

impl fmt::Display for StudyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudyModel::FullTree => write!(f, "Decision tree (all features)"),
            StudyModel::FullForest => write!(f, "Random forest (all features)"),
            StudyModel::ReducedForest => write!(f, "Random forest (reduced features)"),
        }
    }
}

/// Progress notifications emitted while a study runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyStage {
    Pruning,
    Partitioning,
    Training(StudyModel),
    Ranking,
}

impl fmt::Display for StudyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudyStage::Pruning => write!(f, "Pruning features"),
            StudyStage::Partitioning => write!(f, "Partitioning rows"),
            StudyStage::Training(model) => write!(f, "Training {}", model),
            StudyStage::Ranking => write!(f, "Ranking feature importance"),
        }
    }
}

/// One configuration's trained model and its held-out evaluation.
#[derive(Debug)]
pub struct ModelRun {
    pub kind: StudyModel,
    pub trained: TrainedModel,
    pub evaluation: Evaluation,
}

impl ModelRun {
    pub fn cv_accuracy(&self) -> f64 {
        self.trained.chosen.mean_accuracy
    }

    pub fn test_accuracy(&self) -> f64 {
        self.evaluation.accuracy
    }
}

/// Everything a study produced, in stage order.
#[derive(Debug)]
pub struct StudyOutcome {
    pub config: PipelineConfig,
    pub prune: PruneOutcome,
    pub partition: Partition,
    pub tree: ModelRun,
    pub forest: ModelRun,
    pub ranking: ImportanceRanking,
    pub reduced: ModelRun,
    /// Features the reduced forest was trained on.
    pub reduced_features: Vec<String>,
    /// Set when the importance selection left no features and the reduced
    /// forest was trained on all of them instead.
    pub reduction_fallback: bool,
}

impl StudyOutcome {
    pub fn runs(&self) -> [&ModelRun; 3] {
        [&self.tree, &self.forest, &self.reduced]
    }
}

/// Load `path` and run the full study on it.
pub fn run_study(path: &Path, config: &PipelineConfig) -> PipelineResult<StudyOutcome> {
    config.validate()?;
    let dataset = load_dataset(path, config)?;
    run_study_on(&dataset, config, |_| {})
}

/// Run the study on an already loaded dataset, reporting each stage to
/// `on_stage` before it starts.
pub fn run_study_on<F>(
    dataset: &Dataset,
    config: &PipelineConfig,
    mut on_stage: F,
) -> PipelineResult<StudyOutcome>
where
    F: FnMut(StudyStage),
{
    config.validate()?;

    on_stage(StudyStage::Pruning);
    let prune = prune_features(dataset, config)?;

    on_stage(StudyStage::Partitioning);
    let pruned = &prune.dataset;
    let partition = stratified_partition(pruned.labels(), config.train_fraction, config.seed)?;
    info!(
        "partitioned {} rows into {} train / {} test",
        pruned.height(),
        partition.train.len(),
        partition.test.len()
    );

    let table = FeatureTable::from_dataset(pruned)?;
    let ctx = RunContext {
        table: &table,
        dataset: pruned,
        partition: &partition,
        trainer: config.trainer(),
    };

    on_stage(StudyStage::Training(StudyModel::FullTree));
    let tree = ctx.fit_and_evaluate(StudyModel::FullTree, &FeatureSelection::All)?;

    on_stage(StudyStage::Training(StudyModel::FullForest));
    let forest = ctx.fit_and_evaluate(StudyModel::FullForest, &FeatureSelection::All)?;

    on_stage(StudyStage::Ranking);
    let ranking = ImportanceRanking::from_raw(
        forest.trained.model.feature_names(),
        forest.trained.model.raw_importance(),
    );
    let selection = reduced_selection(&ranking, config.importance_threshold, config.reduction_mode);
    let (selection, reduction_fallback) = match table.resolve(&selection) {
        Ok(_) => (selection, false),
        Err(TrainingError::NoFeatures) => {
            warn!(
                "{} selection at importance {} leaves no features; reduced model uses all features",
                config.reduction_mode, config.importance_threshold
            );
            (FeatureSelection::All, true)
        }
        Err(e) => return Err(e.into()),
    };
    info!(
        "{} feature(s) above importance {}; reduced model uses {}",
        ranking.above(config.importance_threshold).len(),
        config.importance_threshold,
        selection
    );

    on_stage(StudyStage::Training(StudyModel::ReducedForest));
    let reduced = ctx.fit_and_evaluate(StudyModel::ReducedForest, &selection)?;
    let reduced_features = reduced.trained.model.feature_names().to_vec();

    Ok(StudyOutcome {
        config: config.clone(),
        prune,
        partition,
        tree,
        forest,
        ranking,
        reduced,
        reduced_features,
        reduction_fallback,
    })
}

struct RunContext<'a> {
    table: &'a FeatureTable,
    dataset: &'a Dataset,
    partition: &'a Partition,
    trainer: TrainerConfig,
}

impl RunContext<'_> {
    fn fit_and_evaluate(
        &self,
        kind: StudyModel,
        selection: &FeatureSelection,
    ) -> PipelineResult<ModelRun> {
        let trained = train_model(
            self.table,
            &self.partition.train,
            self.dataset.labels(),
            kind.family(),
            selection,
            &self.trainer,
        )?;
        let evaluation = evaluate(
            &trained.model,
            self.table,
            &self.partition.test,
            self.dataset.labels(),
            self.dataset.domain(),
        )?;
        info!(
            "{}: cv accuracy {:.4}, test accuracy {:.4}",
            kind, trained.chosen.mean_accuracy, evaluation.accuracy
        );
        Ok(ModelRun {
            kind,
            trained,
            evaluation,
        })
    }
}
