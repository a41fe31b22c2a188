//! Pipeline module - the study stages from loading to evaluation

pub mod config;
pub mod error;
pub mod evaluate;
pub mod features;
pub mod importance;
pub mod label;
pub mod loader;
pub mod missing;
pub mod model;
pub mod partition;
pub mod prune;
pub mod study;
pub mod trainer;
pub mod variance;

pub use config::{NzvPolicy, PipelineConfig, ReductionMode};
pub use error::{LoadError, PipelineError, PipelineResult, SchemaError, TrainingError};
pub use evaluate::{evaluate, ConfusionMatrix, Evaluation};
pub use features::{FeatureSelection, FeatureTable};
pub use importance::{reduced_selection, ImportanceRanking};
pub use label::LabelDomain;
pub use loader::*;
pub use missing::*;
pub use model::{FittedModel, Hyperparams, ModelFamily};
pub use partition::{stratified_folds, stratified_partition, Partition};
pub use prune::{find_exclusions, prune_features, ExclusionSets, PruneOutcome};
pub use study::{run_study, run_study_on, ModelRun, StudyModel, StudyOutcome, StudyStage};
pub use trainer::{train_model, TrainedModel, TrainerConfig};
pub use variance::{column_statistics, ColumnStats};
