//! Error taxonomy for the analysis pipeline.
//!
//! Every stage aborts the run on failure; there is no recovery path, so
//! these types only need to say clearly what went wrong and where.

use std::path::PathBuf;

/// Failures while reading the input file or its label column.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened or parsed.
    #[error("failed to read dataset {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    /// The extension is neither `.csv` nor `.parquet`.
    #[error("unsupported file format '{extension}' for {path}; supported formats: csv, parquet")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The label column does not exist in the header.
    #[error("label column '{label}' not found; available columns: {available:?}")]
    MissingLabel {
        label: String,
        available: Vec<String>,
    },

    /// Some rows carry a missing label.
    #[error("label column '{label}' has {count} missing value(s)")]
    MissingLabelValues { label: String, count: usize },
}

/// A stage received a dataset or parameter it cannot work with.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("expected {expected} label(s), got {got}")]
    LabelCountMismatch { expected: usize, got: usize },

    #[error("{name} must be in (0, 1), got {value}")]
    InvalidFraction { name: &'static str, value: f64 },

    #[error("fold count must be between 2 and {rows}, got {folds}")]
    InvalidFoldCount { folds: usize, rows: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("feature column '{0}' not found")]
    UnknownColumn(String),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
}

/// The estimator could not be fitted or applied.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("training set has {classes} distinct class(es); at least 2 are required")]
    SingleClass { classes: usize },

    #[error("no features left to train on")]
    NoFeatures,

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("{family} fit failed: {message}")]
    Fit { family: String, message: String },

    #[error("prediction failed: {0}")]
    Predict(String),
}

/// Top-level error returned by the library.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Training(#[from] TrainingError),
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::Schema(SchemaError::Polars(err))
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
