//! Dataset loader for CSV and Parquet files

use std::path::Path;

use log::{debug, info};
use polars::prelude::*;

use super::config::PipelineConfig;
use super::error::{LoadError, PipelineResult};
use super::label::{encode_labels, LabelDomain};

/// A loaded table plus its encoded label column.
///
/// Only column removal changes a dataset, and it produces a new value.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    label_column: String,
    labels: Vec<u32>,
    domain: LabelDomain,
}

impl Dataset {
    /// Wrap a frame, encoding `label_column` into a categorical domain.
    pub fn from_frame(frame: DataFrame, label_column: &str) -> PipelineResult<Self> {
        let (domain, labels) = encode_labels(&frame, label_column)?;
        Ok(Self {
            frame,
            label_column: label_column.to_string(),
            labels,
            domain,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn domain(&self) -> &LabelDomain {
        &self.domain
    }

    /// Every column name, label included, in file order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Column names other than the label.
    pub fn feature_names(&self) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|name| name != &self.label_column)
            .collect()
    }

    /// A new dataset without `columns`. The label column is never removed.
    pub fn without_columns(&self, columns: &[String]) -> Self {
        let to_drop: Vec<&str> = columns
            .iter()
            .map(String::as_str)
            .filter(|name| *name != self.label_column)
            .collect();
        Self {
            frame: self.frame.drop_many(to_drop),
            label_column: self.label_column.clone(),
            labels: self.labels.clone(),
            domain: self.domain.clone(),
        }
    }
}

/// Shape and memory footprint shown after loading.
#[derive(Debug, Clone, Copy)]
pub struct DatasetStats {
    pub rows: usize,
    pub columns: usize,
    pub memory_mb: f64,
}

impl DatasetStats {
    pub fn of(dataset: &Dataset) -> Self {
        let (rows, columns) = dataset.frame().shape();
        Self {
            rows,
            columns,
            memory_mb: dataset.frame().estimated_size() as f64 / (1024.0 * 1024.0),
        }
    }
}

/// Load a dataset (CSV or Parquet based on extension) and encode its label.
pub fn load_dataset(path: &Path, config: &PipelineConfig) -> PipelineResult<Dataset> {
    let frame = read_frame(path, &config.missing_tokens, config.infer_schema_length, None)?;
    info!(
        "loaded {} rows x {} columns from {}",
        frame.height(),
        frame.width(),
        path.display()
    );
    Dataset::from_frame(frame, &config.label_column)
}

/// Read only the header of a file, for validating column arguments.
pub fn column_names(path: &Path) -> PipelineResult<Vec<String>> {
    let frame = read_frame(path, &[], 100, Some(1))?;
    Ok(frame
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect())
}

fn read_frame(
    path: &Path,
    missing_tokens: &[String],
    infer_schema_length: usize,
    n_rows: Option<usize>,
) -> Result<DataFrame, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let unreadable = |source: PolarsError| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    let lf = match extension.as_str() {
        "csv" => {
            let null_values = if missing_tokens.is_empty() {
                None
            } else {
                Some(NullValues::AllColumns(
                    missing_tokens.iter().map(|t| t.as_str().into()).collect(),
                ))
            };
            let infer = if infer_schema_length == 0 {
                None
            } else {
                Some(infer_schema_length)
            };
            debug!("csv missing tokens: {:?}", missing_tokens);
            LazyCsvReader::new(path)
                .with_has_header(true)
                .with_infer_schema_length(infer)
                .with_null_values(null_values)
                .with_n_rows(n_rows)
                .finish()
                .map_err(unreadable)?
        }
        "parquet" => {
            let args = ScanArgsParquet {
                n_rows,
                ..Default::default()
            };
            LazyFrame::scan_parquet(path, args).map_err(unreadable)?
        }
        _ => {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            })
        }
    };

    lf.collect().map_err(unreadable)
}
