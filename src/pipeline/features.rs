//! Numeric feature table and model-matrix construction
//!
//! The pruned frame is converted once into column-major numeric data. String
//! columns are ordinal-encoded by sorted distinct value. Cells that are still
//! missing are filled with the training-rows median when a matrix is built.

use std::collections::BTreeSet;
use std::fmt;

use log::warn;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::error::{PipelineError, PipelineResult, SchemaError, TrainingError};
use super::loader::Dataset;

/// Which features a model is trained on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "features", rename_all = "snake_case")]
pub enum FeatureSelection {
    All,
    /// Everything except the named features.
    Without(Vec<String>),
    /// Only the named features.
    Only(Vec<String>),
}

impl fmt::Display for FeatureSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureSelection::All => write!(f, "all features"),
            FeatureSelection::Without(names) => write!(f, "all except {} feature(s)", names.len()),
            FeatureSelection::Only(names) => write!(f, "{} selected feature(s)", names.len()),
        }
    }
}

/// Numeric view of every non-label column of a dataset.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    names: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
    height: usize,
}

impl FeatureTable {
    pub fn from_dataset(dataset: &Dataset) -> PipelineResult<Self> {
        let frame = dataset.frame();
        let names = dataset.feature_names();
        let columns = names
            .iter()
            .map(|name| numeric_values(frame.column(name)?))
            .collect::<PolarsResult<Vec<_>>>()?;

        Ok(Self {
            names,
            columns,
            height: frame.height(),
        })
    }

    /// Build a table directly from named columns of equal length.
    pub fn from_columns(names: Vec<String>, columns: Vec<Vec<Option<f64>>>) -> Self {
        let height = columns.first().map(Vec::len).unwrap_or(0);
        Self {
            names,
            columns,
            height,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Column indices for `names`, failing on the first unknown one.
    pub fn indices_of(&self, names: &[String]) -> PipelineResult<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                self.index_of(name)
                    .ok_or_else(|| PipelineError::from(SchemaError::UnknownColumn(name.clone())))
            })
            .collect()
    }

    /// Resolve a selection into column indices, in table order.
    ///
    /// Names the table does not know are ignored with a warning.
    pub fn resolve(&self, selection: &FeatureSelection) -> Result<Vec<usize>, TrainingError> {
        let warn_unknown = |names: &[String]| {
            for name in names.iter().filter(|n| self.index_of(n).is_none()) {
                warn!("feature '{}' is not in the table and was ignored", name);
            }
        };

        let indices: Vec<usize> = match selection {
            FeatureSelection::All => (0..self.names.len()).collect(),
            FeatureSelection::Without(names) => {
                warn_unknown(names);
                let excluded: BTreeSet<&str> = names.iter().map(String::as_str).collect();
                (0..self.names.len())
                    .filter(|&i| !excluded.contains(self.names[i].as_str()))
                    .collect()
            }
            FeatureSelection::Only(names) => {
                warn_unknown(names);
                let kept: BTreeSet<&str> = names.iter().map(String::as_str).collect();
                (0..self.names.len())
                    .filter(|&i| kept.contains(self.names[i].as_str()))
                    .collect()
            }
        };

        if indices.is_empty() {
            return Err(TrainingError::NoFeatures);
        }
        Ok(indices)
    }

    /// Median of each column over `rows`, ignoring missing cells; 0 if a
    /// column has no observed value in those rows.
    pub fn medians(&self, columns: &[usize], rows: &[usize]) -> Vec<f64> {
        columns
            .iter()
            .map(|&c| {
                let mut observed: Vec<f64> =
                    rows.iter().filter_map(|&r| self.columns[c][r]).collect();
                median(&mut observed)
            })
            .collect()
    }

    /// Gather `rows` x `columns` into a dense matrix, imputing with `fill`.
    pub fn matrix(&self, columns: &[usize], rows: &[usize], fill: &[f64]) -> ModelMatrix {
        let mut values = Vec::with_capacity(columns.len() * rows.len());
        for (&c, &fill_value) in columns.iter().zip(fill) {
            let column = &self.columns[c];
            values.extend(rows.iter().map(|&r| column[r].unwrap_or(fill_value)));
        }
        ModelMatrix {
            nrows: rows.len(),
            ncols: columns.len(),
            values,
        }
    }
}

/// Column-major numeric matrix handed to the estimators.
#[derive(Debug, Clone)]
pub struct ModelMatrix {
    nrows: usize,
    ncols: usize,
    values: Vec<f64>,
}

impl ModelMatrix {
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// A copy with the rows of column `column` shuffled.
    pub fn with_column_permuted<R: Rng>(&self, column: usize, rng: &mut R) -> Self {
        let mut permuted = self.clone();
        let start = column * self.nrows;
        permuted.values[start..start + self.nrows].shuffle(rng);
        permuted
    }

    pub fn to_dense(&self) -> Result<DenseMatrix<f64>, TrainingError> {
        DenseMatrix::new(self.nrows, self.ncols, self.values.clone(), true)
            .map_err(|e| TrainingError::Predict(e.to_string()))
    }
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn numeric_values(column: &Column) -> PolarsResult<Vec<Option<f64>>> {
    let dtype = column.dtype();
    if dtype.is_primitive_numeric() || matches!(dtype, DataType::Boolean) {
        let cast = column.cast(&DataType::Float64)?;
        return Ok(cast.f64()?.into_iter().collect());
    }

    // Ordinal encoding for text-like columns.
    let as_text = column.cast(&DataType::String)?;
    let text = as_text.str()?;
    let levels: Vec<&str> = text
        .into_iter()
        .flatten()
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .collect();
    Ok(text
        .into_iter()
        .map(|v| {
            v.and_then(|s| levels.binary_search(&s).ok())
                .map(|i| i as f64)
        })
        .collect())
}
